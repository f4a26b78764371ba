//! Domain analysis orchestrating every trust check
//!
//! One analysis spawns three DNS lookups (MX, SPF TXT, DMARC TXT) as their own
//! tasks and waits for all of them, then runs the disposable check and the MX geolocation
//! before folding everything into an [`EmailAnalysis`]. None of the steps can
//! fail the analysis; upstream failures show up as absent signals.

use crate::{
    deliverability::{extract_dmarc, extract_spf},
    disposable::DisposableDetector,
    dns::{fetch_records, DnsTransport, DohClient, RecordType},
    geo::{GeoLocator, HickoryHostResolver, IpApiClient},
    AnalysisParts, AnalyzerConfig, EmailAnalysis,
};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument, Span};

/// Analyzer coordinating DNS, disposable and geolocation checks
#[derive(Clone)]
pub struct DomainAnalyzer {
    dns: Arc<dyn DnsTransport>,
    disposable_detector: DisposableDetector,
    geo_locator: GeoLocator,
}

impl DomainAnalyzer {
    /// Create an analyzer from explicit collaborators
    pub fn new(
        dns: Arc<dyn DnsTransport>,
        disposable_detector: DisposableDetector,
        geo_locator: GeoLocator,
    ) -> Self {
        Self {
            dns,
            disposable_detector,
            geo_locator,
        }
    }

    /// Create an analyzer talking to the configured DoH and geolocation
    /// endpoints through the shared `client`.
    pub fn from_config(config: &AnalyzerConfig, client: reqwest::Client) -> Self {
        info!(
            "Initializing domain analyzer - DoH: {}, geolocation: {}",
            config.doh_endpoint, config.geo_endpoint
        );

        let dns = Arc::new(DohClient::new(client.clone(), config.doh_endpoint.clone()));
        let geo_locator = GeoLocator::new(
            Arc::new(HickoryHostResolver::new(Duration::from_millis(
                config.request_timeout_ms,
            ))),
            Arc::new(IpApiClient::new(client, config.geo_endpoint.clone())),
        );

        Self::new(dns, DisposableDetector::default(), geo_locator)
    }

    /// Analyze a syntactically valid, lower-cased and trimmed address.
    ///
    /// The domain is everything after the first `@`.
    #[instrument(skip(self), fields(domain))]
    pub async fn analyze(&self, email: &str) -> EmailAnalysis {
        let domain = email.split_once('@').map(|(_, domain)| domain).unwrap_or_default();
        Span::current().record("domain", domain);

        debug!("Starting analysis for domain: {}", domain);

        let mx_lookup = self.spawn_lookup(domain.to_string(), RecordType::Mx);
        let txt_lookup = self.spawn_lookup(domain.to_string(), RecordType::Txt);
        let dmarc_lookup = self.spawn_lookup(format!("_dmarc.{}", domain), RecordType::Txt);
        let (mx_records, txt_records, dmarc_records) = tokio::join!(
            join_lookup(mx_lookup),
            join_lookup(txt_lookup),
            join_lookup(dmarc_lookup)
        );

        let spf_record = extract_spf(&txt_records);
        let dmarc_record = extract_dmarc(&dmarc_records);
        let is_disposable = self.disposable_detector.is_disposable(email);
        let mx_geo = self.geo_locator.describe(&mx_records).await;

        let analysis = EmailAnalysis::from_parts(AnalysisParts {
            email,
            domain,
            mx_records: &mx_records,
            spf_record,
            dmarc_record,
            is_disposable,
            mx_geo,
        });

        debug!(
            "Analysis complete for {}: mx={}, spf={}, dmarc={}, disposable={} -> {}",
            domain,
            mx_records.len(),
            spf_record.is_some(),
            dmarc_record.is_some(),
            is_disposable,
            analysis.verdict()
        );

        analysis
    }

    /// Run one lookup on its own task. The task keeps running to completion
    /// even if the analysis awaiting it is dropped.
    fn spawn_lookup(&self, name: String, record_type: RecordType) -> JoinHandle<Vec<String>> {
        let dns = Arc::clone(&self.dns);
        tokio::spawn(
            async move { fetch_records(dns.as_ref(), &name, record_type).await }
                .instrument(Span::current()),
        )
    }
}

async fn join_lookup(lookup: JoinHandle<Vec<String>>) -> Vec<String> {
    lookup.await.unwrap_or_else(|e| {
        warn!("DNS lookup task failed: {}", e);
        Vec::new()
    })
}
