//! Best-effort geolocation of a domain's primary mail server
//!
//! The first MX answer is parsed into a hostname, the hostname is resolved to
//! an address, and the address is sent to an IP geolocation service. Each
//! stage fails with its own [`GeoError`]; [`GeoLocator::describe`] renders the
//! outcome as the human-readable string reported to clients.

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};
use serde::Deserialize;
use std::{fmt, net::IpAddr, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure stage of an MX geolocation attempt.
///
/// The display text is the placeholder returned in place of a location.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoError {
    #[error("")]
    NoMxRecords,
    #[error("invalid MX record format")]
    InvalidMxFormat,
    #[error("IP lookup failed")]
    AddressLookup,
    #[error("geo lookup error")]
    Request,
    #[error("failed to decode geo data")]
    Decode,
}

/// Response of the geolocation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeoRecord {
    #[serde(default)]
    pub city: String,
    #[serde(rename = "regionName", default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    /// Address the service actually located
    #[serde(rename = "query", default)]
    pub ip: String,
}

impl fmt::Display for GeoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} (IP: {})",
            self.city, self.region, self.country, self.ip
        )
    }
}

/// Resolves a hostname to its addresses
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, GeoError>;
}

/// Looks up the location of an address
#[async_trait]
pub trait IpGeolocator: Send + Sync {
    async fn locate(&self, ip: IpAddr) -> Result<GeoRecord, GeoError>;
}

/// Split an MX answer such as `"10 mx.example.com."` and return the
/// hostname without its trailing dot.
pub fn parse_mx_host(record: &str) -> Result<&str, GeoError> {
    let mut fields = record.split_whitespace();
    let _priority = fields.next().ok_or(GeoError::InvalidMxFormat)?;
    let host = fields.next().ok_or(GeoError::InvalidMxFormat)?;
    Ok(host.strip_suffix('.').unwrap_or(host))
}

/// MX geolocation pipeline
#[derive(Clone)]
pub struct GeoLocator {
    resolver: Arc<dyn HostResolver>,
    geolocator: Arc<dyn IpGeolocator>,
}

impl GeoLocator {
    pub fn new(resolver: Arc<dyn HostResolver>, geolocator: Arc<dyn IpGeolocator>) -> Self {
        Self {
            resolver,
            geolocator,
        }
    }

    /// Locate the host named by the first MX answer; later answers are ignored.
    pub async fn locate(&self, mx_records: &[String]) -> Result<GeoRecord, GeoError> {
        let first = mx_records.first().ok_or(GeoError::NoMxRecords)?;
        let host = parse_mx_host(first)?;

        let addresses = self.resolver.resolve(host).await?;
        let ip = *addresses.first().ok_or(GeoError::AddressLookup)?;
        debug!("Resolved MX host {} to {}", host, ip);

        self.geolocator.locate(ip).await
    }

    /// Like [`GeoLocator::locate`], rendered for display. An empty MX list
    /// yields an empty string; other failures yield their stage placeholder.
    pub async fn describe(&self, mx_records: &[String]) -> String {
        match self.locate(mx_records).await {
            Ok(record) => record.to_string(),
            Err(e) => {
                if e != GeoError::NoMxRecords {
                    debug!("MX geolocation stopped: {}", e);
                }
                e.to_string()
            }
        }
    }
}

/// Resolver options for MX host lookups: one attempt, no answer cache, so
/// every analysis resolves the host afresh.
fn resolver_opts(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.cache_size = 0;
    opts
}

/// [`HostResolver`] backed by hickory-resolver
pub struct HickoryHostResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryHostResolver {
    /// Create a resolver querying Cloudflare DNS
    ///
    /// # Arguments
    /// * `timeout` - Per-query timeout
    pub fn new(timeout: Duration) -> Self {
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), resolver_opts(timeout));
        info!("Host resolver initialized - timeout: {:?}", timeout);

        Self { resolver }
    }
}

#[async_trait]
impl HostResolver for HickoryHostResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, GeoError> {
        match self.resolver.lookup_ip(host).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => {
                warn!("Address lookup failed for {}: {}", host, e);
                Err(GeoError::AddressLookup)
            }
        }
    }
}

/// [`IpGeolocator`] for ip-api.com style services (`GET {endpoint}/{ip}`)
#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl IpApiClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn url_for(&self, ip: IpAddr) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), ip)
    }
}

#[async_trait]
impl IpGeolocator for IpApiClient {
    async fn locate(&self, ip: IpAddr) -> Result<GeoRecord, GeoError> {
        let response = self.client.get(self.url_for(ip)).send().await.map_err(|e| {
            warn!("Geolocation request for {} failed: {}", ip, e);
            GeoError::Request
        })?;

        response.json::<GeoRecord>().await.map_err(|e| {
            warn!("Failed to decode geolocation response for {}: {}", ip, e);
            GeoError::Decode
        })
    }
}
