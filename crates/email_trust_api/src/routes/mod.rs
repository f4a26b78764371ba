//! API Routes Module
//!
//! - `validate`: email trust analysis
//! - `health`: banner and liveness endpoints

pub mod health;
pub mod validate;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build all API routes and return a configured Router
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/validate", post(validate::validate_email_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use email_trust_core::{
        disposable::DisposableDetector,
        dns::{DnsTransport, LookupError, RecordType},
        geo::{GeoError, GeoLocator, GeoRecord, HostResolver, IpGeolocator},
        DomainAnalyzer,
    };
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Answers every domain as fully authenticated and counts queries
    #[derive(Default)]
    struct CountingDns {
        queries: AtomicUsize,
    }

    #[async_trait]
    impl DnsTransport for CountingDns {
        async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>, LookupError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let answer = match (name.starts_with("_dmarc."), record_type) {
                (_, RecordType::Mx) => "10 mx.example.com.",
                (true, RecordType::Txt) => "v=DMARC1; p=reject",
                (false, RecordType::Txt) => "\"v=spf1 -all\"",
            };
            Ok(vec![answer.to_string()])
        }
    }

    struct LoopbackResolver;

    #[async_trait]
    impl HostResolver for LoopbackResolver {
        async fn resolve(&self, _host: &str) -> Result<Vec<IpAddr>, GeoError> {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))])
        }
    }

    struct UnavailableGeolocator;

    #[async_trait]
    impl IpGeolocator for UnavailableGeolocator {
        async fn locate(&self, _ip: IpAddr) -> Result<GeoRecord, GeoError> {
            Err(GeoError::Request)
        }
    }

    fn test_app() -> (Router, Arc<CountingDns>) {
        let dns = Arc::new(CountingDns::default());
        let analyzer = DomainAnalyzer::new(
            dns.clone(),
            DisposableDetector::default(),
            GeoLocator::new(Arc::new(LoopbackResolver), Arc::new(UnavailableGeolocator)),
        );
        let state = AppState {
            analyzer: Arc::new(analyzer),
        };
        (build_routes(Arc::new(state)), dns)
    }

    fn post_validate(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_banner() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], health::INDEX_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_validate_rejects_other_methods() {
        let (app, dns) = test_app();
        let response = app
            .oneshot(Request::builder().uri("/validate").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(dns.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_payloads() {
        for body in [
            "",
            "not json",
            "{\"email\": 7}",
            "[]",
            "[\"user@example.com\"]",
            "\"user@example.com\"",
        ] {
            let (app, dns) = test_app();
            let response = app.oneshot(post_validate(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(body_json(response).await["error_code"], "INVALID_REQUEST");
            assert_eq!(dns.queries.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_content_type() {
        let (app, dns) = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/validate")
            .body(Body::from(r#"{"email":"user@example.com"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(dns.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_email() {
        for body in [r#"{"email":""}"#, "{}"] {
            let (app, dns) = test_app();
            let response = app.oneshot(post_validate(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert_eq!(json["error"], "Email cannot be empty");
            assert_eq!(dns.queries.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_email_without_analysis() {
        for email in ["no-at-sign.example.com", "user@localhost", "a@@b.com", "   "] {
            let (app, dns) = test_app();
            let body = serde_json::json!({ "email": email }).to_string();
            let response = app.oneshot(post_validate(&body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "email: {email:?}");
            assert_eq!(body_json(response).await["error_code"], "INVALID_EMAIL");
            assert_eq!(dns.queries.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_validate_returns_analysis() {
        let (app, dns) = test_app();
        let response = app
            .oneshot(post_validate(r#"{"email":"  User@Example.com "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(dns.queries.load(Ordering::SeqCst), 3);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "email": "user@example.com",
                "domain": "example.com",
                "has_mx": true,
                "has_spf": true,
                "has_dmarc": true,
                "mx_record": "10 mx.example.com.",
                "spf_record": "\"v=spf1 -all\"",
                "dmarc_record": "v=DMARC1; p=reject",
                "is_disposable": false,
                "is_safe": true,
                "verdict": "Safe and authenticated email domain",
                "mx_geo": "geo lookup error"
            })
        );
    }

    #[tokio::test]
    async fn test_validate_flags_disposable_domain() {
        let (app, _) = test_app();
        let response = app
            .oneshot(post_validate(r#"{"email":"throwaway@MAILINATOR.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_disposable"], true);
        assert_eq!(json["is_safe"], false);
        assert_eq!(json["verdict"], "Disposable/temporary email domain");
    }
}
