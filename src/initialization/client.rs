//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::HTTP_USER_AGENT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for list downloads.
///
/// Creates a `reqwest::Client` configured with:
/// - The crate User-Agent
/// - An overall request timeout of `timeout`
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(timeout: Duration) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(HTTP_USER_AGENT)
        .build()?;
    Ok(client)
}
