use crate::utils::error::{FetchError, Result};
use reqwest::{Client, Response};

pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("ocean-fetch/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Turns a non-success response into `FetchError::HttpStatus`.
pub fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(FetchError::HttpStatus {
        code: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        url: response.url().to_string(),
    })
}
