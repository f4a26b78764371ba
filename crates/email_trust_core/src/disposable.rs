//! Disposable domain detection
//!
//! Exact, case-insensitive matching of an address's domain against a set of
//! known throwaway-mail providers. Purely local; no network access.

use std::collections::HashSet;
use tracing::debug;

/// Domains shipped with the detector
pub const DEFAULT_DISPOSABLE_DOMAINS: &[&str] =
    &["mailinator.com", "10minutemail.com", "guerrillamail.com"];

/// Set of known disposable-mail domains, stored lower-cased
#[derive(Debug, Clone)]
pub struct DisposableDetector {
    domains: HashSet<String>,
}

impl DisposableDetector {
    /// Create a detector from a list of domains
    ///
    /// # Example
    /// ```rust
    /// use email_trust_core::disposable::DisposableDetector;
    ///
    /// let detector = DisposableDetector::new(["Trashmail.example"]);
    /// assert!(detector.is_disposable("user@trashmail.example"));
    /// assert!(!detector.is_disposable("user@gmail.com"));
    /// ```
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|domain| domain.as_ref().trim().to_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { domains }
    }

    /// Check the domain part of `email` against the set.
    ///
    /// Addresses without an `@` are never disposable.
    pub fn is_disposable(&self, email: &str) -> bool {
        match email.split('@').nth(1) {
            Some(domain) => self.is_disposable_domain(domain),
            None => false,
        }
    }

    /// Check a bare domain against the set
    pub fn is_disposable_domain(&self, domain: &str) -> bool {
        let result = self.domains.contains(&domain.to_lowercase());
        if result {
            debug!("Domain '{}' matched the disposable list", domain);
        }
        result
    }

    /// Get the number of domains in the set
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

impl Default for DisposableDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DISPOSABLE_DOMAINS.iter().copied())
    }
}
