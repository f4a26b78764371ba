//! # email_trust_core
//!
//! Email domain trust analysis: given a syntactically valid address, decide
//! whether its domain can receive mail, publishes SPF and DMARC records, is a
//! known disposable provider, and roughly where its mail server lives.
//!
//! ## Features
//!
//! - **Concurrent DNS fan-out** of MX, SPF (TXT) and DMARC (`_dmarc` TXT) lookups
//!   over DNS-over-HTTPS
//! - **Failure-tolerant lookups**: upstream errors become empty results, never errors
//! - **Disposable domain detection** against a static domain set
//! - **MX geolocation** through hostname resolution and an IP geolocation service
//! - **Fixed-precedence verdicts** folding every signal into one label
//!
//! ## Example
//!
//! ```rust,no_run
//! use email_trust_core::{AnalyzerConfig, DomainAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::default();
//!     let client = email_trust_core::build_http_client(&config)?;
//!     let analyzer = DomainAnalyzer::from_config(&config, client);
//!
//!     let analysis = analyzer.analyze("someone@example.com").await;
//!     println!("{}: {}", analysis.domain(), analysis.verdict());
//!
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod deliverability;
pub mod disposable;
pub mod dns;
pub mod geo;
pub mod syntax;

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Configuration for the outbound collaborators of the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// DNS-over-HTTPS JSON endpoint accepting `name` and `type` query parameters
    pub doh_endpoint: String,
    /// IP geolocation endpoint; the IP is appended as a path segment
    pub geo_endpoint: String,
    /// Timeout applied to every outbound HTTP request and hostname resolution
    pub request_timeout_ms: u64,
    /// User-Agent sent with outbound HTTP requests
    pub user_agent: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            doh_endpoint: "https://dns.google/resolve".to_string(),
            geo_endpoint: "http://ip-api.com/json".to_string(),
            request_timeout_ms: 10_000,
            user_agent: concat!("email-trust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build the shared outbound HTTP client.
///
/// The returned client is cheap to clone and safe to use from many requests
/// at once; clones share one connection pool.
pub fn build_http_client(config: &AnalyzerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Boolean signals the verdict is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainSignals {
    pub has_mx: bool,
    pub has_spf: bool,
    pub has_dmarc: bool,
    pub is_disposable: bool,
}

/// Final trust label for an analyzed domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No MX records, so the domain cannot receive mail
    NoMailExchange,
    /// Domain belongs to a known disposable-mail provider
    Disposable,
    /// SPF or DMARC record missing
    Unauthenticated,
    /// Receives mail, publishes SPF and DMARC, not disposable
    Safe,
}

impl Verdict {
    /// Apply the verdict rules in precedence order; the first match wins.
    pub fn evaluate(signals: DomainSignals) -> Self {
        if !signals.has_mx {
            Verdict::NoMailExchange
        } else if signals.is_disposable {
            Verdict::Disposable
        } else if !signals.has_spf || !signals.has_dmarc {
            Verdict::Unauthenticated
        } else {
            Verdict::Safe
        }
    }

    pub fn is_safe(self) -> bool {
        matches!(self, Verdict::Safe)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::NoMailExchange => "Domain cannot receive email (no MX)",
            Verdict::Disposable => "Disposable/temporary email domain",
            Verdict::Unauthenticated => "Email domain lacks proper authentication",
            Verdict::Safe => "Safe and authenticated email domain",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Inputs gathered by the analyzer before the record is composed
pub(crate) struct AnalysisParts<'a> {
    pub email: &'a str,
    pub domain: &'a str,
    pub mx_records: &'a [String],
    pub spf_record: Option<&'a str>,
    pub dmarc_record: Option<&'a str>,
    pub is_disposable: bool,
    pub mx_geo: String,
}

/// Trust assessment for one email address.
///
/// Built once per request and never mutated; `is_safe` and `verdict` are
/// always derived from the stored signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAnalysis {
    email: String,
    domain: String,
    has_mx: bool,
    has_spf: bool,
    has_dmarc: bool,
    mx_record: String,
    spf_record: String,
    dmarc_record: String,
    is_disposable: bool,
    is_safe: bool,
    verdict: Verdict,
    mx_geo: String,
}

impl EmailAnalysis {
    pub(crate) fn from_parts(parts: AnalysisParts<'_>) -> Self {
        let signals = DomainSignals {
            has_mx: !parts.mx_records.is_empty(),
            has_spf: parts.spf_record.is_some(),
            has_dmarc: parts.dmarc_record.is_some(),
            is_disposable: parts.is_disposable,
        };
        let verdict = Verdict::evaluate(signals);

        Self {
            email: parts.email.to_string(),
            domain: parts.domain.to_string(),
            has_mx: signals.has_mx,
            has_spf: signals.has_spf,
            has_dmarc: signals.has_dmarc,
            mx_record: parts.mx_records.join(", "),
            spf_record: parts.spf_record.unwrap_or_default().to_string(),
            dmarc_record: parts.dmarc_record.unwrap_or_default().to_string(),
            is_disposable: signals.is_disposable,
            is_safe: verdict.is_safe(),
            verdict,
            mx_geo: parts.mx_geo,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn signals(&self) -> DomainSignals {
        DomainSignals {
            has_mx: self.has_mx,
            has_spf: self.has_spf,
            has_dmarc: self.has_dmarc,
            is_disposable: self.is_disposable,
        }
    }

    /// All MX answers joined by `", "`
    pub fn mx_record(&self) -> &str {
        &self.mx_record
    }

    pub fn spf_record(&self) -> &str {
        &self.spf_record
    }

    pub fn dmarc_record(&self) -> &str {
        &self.dmarc_record
    }

    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Location of the first MX host, or the placeholder for the stage that failed
    pub fn mx_geo(&self) -> &str {
        &self.mx_geo
    }
}

/// Errors that can occur while constructing the analyzer
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

// Re-export main types
pub use analyzer::DomainAnalyzer;
