use crate::error::{CraftError, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("craft-margin/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET `url` and decode the JSON body into `T`.
///
/// `query` pairs whose key is in `hidden` are sent but not logged.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    hidden: &[&str],
) -> Result<T> {
    let logged: Vec<String> = query
        .iter()
        .filter(|(key, _)| !hidden.contains(key))
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    debug!("GET {} [{}]", url, logged.join("&"));

    let body = client
        .get(url)
        .query(query)
        .send()?
        .error_for_status()?
        .text()?;

    serde_json::from_str(&body).map_err(|source| CraftError::DecodeError {
        url: url.to_string(),
        source,
    })
}
