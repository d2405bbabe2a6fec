//! Registry client tests against a local mock registry.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use liberty_features::sources::{
    BundledDataset, MavenRegistry, RemoteFeatureSource, SourceError,
};
use liberty_features::FeatureCatalog;
use serde_json::json;

/// Serve a handful of release documents on an ephemeral port.
async fn spawn_registry() -> String {
    let app = Router::new()
        .route(
            "/21.0.0.3/features-21.0.0.3.json",
            get(|| async {
                Json(json!([
                    {
                        "name": "com.ibm.websphere.appserver.servlet-4.0",
                        "shortDescription": "Java Servlets 4.0",
                        "wlpInformation": { "shortName": "servlet-4.0", "visibility": "PUBLIC" }
                    },
                    {
                        "name": "com.ibm.websphere.appserver.servlet.api-4.0",
                        "wlpInformation": { "shortName": "servlet.api-4.0", "visibility": "PRIVATE" }
                    },
                    {
                        "name": "io.openliberty.mpHealth-3.0",
                        "wlpInformation": { "shortName": "mpHealth-3.0", "visibility": "PUBLIC" }
                    }
                ]))
            }),
        )
        .route(
            "/22.0.0.1/features-22.0.0.1.json",
            get(|| async { "<html>not json</html>" }),
        )
        .route(
            "/22.0.0.2/features-22.0.0.2.json",
            get(|| async { Json(json!([{ "name": "no wlpInformation" }])) }),
        )
        .route(
            "/23.0.0.1/features-23.0.0.1.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock registry");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock registry failed");
    });
    format!("http://{}", addr)
}

async fn registry() -> MavenRegistry {
    let base = spawn_registry().await;
    MavenRegistry::new(base, "features", Duration::from_secs(5))
        .expect("Failed to build registry client")
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn returns_every_feature_of_the_release() {
        let registry = registry().await;

        let features = registry.fetch("21.0.0.3").await.expect("fetch failed");

        let names: Vec<&str> = features.iter().map(|f| f.short_name()).collect();
        assert_eq!(names, vec!["servlet-4.0", "servlet.api-4.0", "mpHealth-3.0"]);
    }

    #[tokio::test]
    async fn missing_release_is_a_status_error() {
        let registry = registry().await;

        let err = registry.fetch("1.0.0.0").await.unwrap_err();

        assert!(matches!(err, SourceError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let registry = registry().await;

        let err = registry.fetch("23.0.0.1").await.unwrap_err();

        assert!(matches!(err, SourceError::Status { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let registry = registry().await;

        assert!(matches!(
            registry.fetch("22.0.0.1").await,
            Err(SourceError::Parse(_))
        ));
        assert!(matches!(
            registry.fetch("22.0.0.2").await,
            Err(SourceError::Parse(_))
        ));
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn caches_public_features_from_the_registry() {
        let catalog = FeatureCatalog::new(Arc::new(registry().await), Arc::new(BundledDataset));

        let features = catalog.get_features("21.0.0.3", 10, false).await;

        let names: Vec<&str> = features.iter().map(|f| f.short_name()).collect();
        assert_eq!(names, vec!["servlet-4.0", "mpHealth-3.0"]);
        assert_eq!(catalog.cached_versions(), vec!["21.0.0.3".to_string()]);
    }

    #[tokio::test]
    async fn malformed_release_falls_back_to_bundled_dataset() {
        let catalog = FeatureCatalog::new(Arc::new(registry().await), Arc::new(BundledDataset));

        let features = catalog.get_features("22.0.0.1", 10, true).await;

        assert_eq!(features, catalog.default_features());
        assert!(features.iter().any(|f| f.matches("webProfile-8.0")));
        assert!(catalog.cached_versions().is_empty());
    }
}
