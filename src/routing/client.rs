use crate::app_config::AppConfig;
use reqwest::header::HeaderValue;
use reqwest::{Client, header};
use thiserror::Error;

pub fn new_client(config: &AppConfig) -> Result<Client, RoutingClientError> {
    let mut headers = header::HeaderMap::new();
    if let Some(api_key) = config.routing().api_key() {
        let mut api_key_value = HeaderValue::from_str(api_key)?;
        api_key_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, api_key_value);
    }

    let client = Client::builder().timeout(config.routing().timeout_ms()).default_headers(headers).build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum RoutingClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("routing client set an invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}
