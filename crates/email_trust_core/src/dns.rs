//! DNS record lookups over a DNS-over-HTTPS JSON endpoint
//!
//! [`DnsTransport`] returns every failure as a [`LookupError`]; [`fetch_records`]
//! is the single place where a failed lookup becomes an empty answer list so
//! the analyzer can carry on with partial information.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Record types the analyzer asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Mx,
    Txt,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a single DNS lookup produced no answers
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("resolver returned non-JSON content type '{0}'")]
    UnexpectedContentType(String),
    #[error("failed to decode resolver response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of raw DNS answers
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Query `name` for `record_type`, returning the answer data strings in
    /// the order the resolver sent them.
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>, LookupError>;
}

/// Look up `name`, turning any failure into an empty answer list.
pub async fn fetch_records(
    transport: &dyn DnsTransport,
    name: &str,
    record_type: RecordType,
) -> Vec<String> {
    match transport.query(name, record_type).await {
        Ok(records) => {
            debug!("Found {} {} record(s) for {}", records.len(), record_type, name);
            records
        }
        Err(e) => {
            warn!("Error fetching {} records for {}: {}", record_type, name, e);
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(default)]
    data: String,
}

/// Extract the answer data strings from a JSON resolver body
pub fn parse_answers(body: &[u8]) -> Result<Vec<String>, LookupError> {
    let response: DohResponse = serde_json::from_slice(body)?;
    Ok(response.answer.into_iter().map(|answer| answer.data).collect())
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("application/json")
}

/// Client for JSON DNS-over-HTTPS resolvers such as `https://dns.google/resolve`
///
/// Wraps a shared [`reqwest::Client`]; clones reuse the same connection pool
/// and the client is safe to use from concurrent lookups.
#[derive(Debug, Clone)]
pub struct DohClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DohClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl DnsTransport for DohClient {
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>, LookupError> {
        debug!("Querying {} records for {}", record_type, name);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", name), ("type", record_type.as_str())])
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_json_content_type(&content_type) {
            return Err(LookupError::UnexpectedContentType(content_type));
        }

        let body = response.bytes().await?;
        parse_answers(&body)
    }
}
