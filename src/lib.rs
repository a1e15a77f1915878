pub mod config;
pub mod dispatch;
pub mod errors;
pub mod poll;
pub mod processor;
pub mod queue;
pub mod sqs;
pub mod stats;
pub mod types;
pub mod util;
// Configure a global allocator optimized for throughput.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
