use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::dispatch::{DEFAULT_ERROR_RETRY_DELAY_IN_SECONDS, DEFAULT_RETRY_DELAY_IN_SECONDS};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub queue_url: String,
    pub processor_function_name: String,
    pub retry_delay_secs: u32,
    pub error_retry_delay_secs: u32,
    /// Time budget handed to each poll invocation, in milliseconds.
    pub poll_budget_ms: u64,
    /// Pause between scheduled poll invocations.
    pub poll_interval_secs: u64,
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv().ok();
    let queue_url = env::var("QUEUE_URL")?;
    let processor_function_name = env::var("PROCESSOR_FUNCTION_NAME")?;
    let retry_delay_secs = parse_or("RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_IN_SECONDS)?;
    let error_retry_delay_secs =
        parse_or("ERROR_RETRY_DELAY_SECS", DEFAULT_ERROR_RETRY_DELAY_IN_SECONDS)?;
    let poll_budget_ms = parse_or("POLL_BUDGET_MS", 60_000)?;
    let poll_interval_secs = parse_or("POLL_INTERVAL_SECS", 60)?;
    Ok(Config {
        queue_url,
        processor_function_name,
        retry_delay_secs,
        error_retry_delay_secs,
        poll_budget_ms,
        poll_interval_secs,
    })
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}
