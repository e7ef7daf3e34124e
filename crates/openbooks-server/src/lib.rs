//! HTTP API over the aggregate search and the local cache.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context as _;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use openbooks_core::AppConfig;
use openbooks_core::config::ServerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/healthz", get(routes::healthz))
        .route("/api/search", get(routes::search_books))
        .route("/api/books/{id}", get(routes::get_book))
        .route("/api/categorias", get(routes::list_categories))
        .route("/api/categoria/{nome}", get(routes::search_category))
        .route("/api/destaques", get(routes::featured))
        .route("/api/fantasy-destaques", get(routes::fantasy_featured))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn serve(state: AppState, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let app = router(state, &config.server);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use openbooks_core::{BookRecord, Database, FeaturedBooks};
    use openbooks_sources::{Aggregator, BookProvider, SourceError};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    struct FixedProvider {
        name: &'static str,
        books: Vec<BookRecord>,
    }

    #[async_trait]
    impl BookProvider for FixedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, query: &str, limit: usize) -> openbooks_sources::Result<Vec<BookRecord>> {
            if query == "fail" {
                return Err(SourceError::Parse("boom".to_string()));
            }
            Ok(self.books.iter().take(limit).cloned().collect())
        }
    }

    struct Harness {
        app: Router,
        db: Arc<Database>,
        dir: TempDir,
    }

    fn fixed(name: &'static str, prefix: &str) -> Arc<dyn BookProvider> {
        let books = (0..5)
            .map(|i| {
                BookRecord::new(format!("{prefix}{i}"), format!("Livro {i}"), name)
                    .with_language("pt")
            })
            .collect();
        Arc::new(FixedProvider { name, books })
    }

    fn harness() -> Harness {
        harness_with(vec![fixed("Project Gutenberg", "gutenberg_")], |_| {})
    }

    fn harness_with(providers: Vec<Arc<dyn BookProvider>>, tune: impl FnOnce(&mut AppConfig)) -> Harness {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.set_data_dir(dir.path().to_path_buf());
        tune(&mut config);

        let aggregator = Aggregator::new(providers);
        let db = Arc::new(Database::open_in_memory().unwrap());
        let state = AppState::new(Arc::new(aggregator), Arc::clone(&db), &config);

        let featured = FeaturedBooks {
            featured: (0..20)
                .map(|i| BookRecord::new(format!("CSV_DESTAQUE_{i}"), format!("D{i}"), "csv_destaques"))
                .collect(),
            fantasy: (0..40)
                .map(|i| BookRecord::new(format!("CSV_FANTASY_{i}"), format!("F{i}"), "csv_best_books"))
                .collect(),
        };
        featured.save(&config.featured_path()).unwrap();

        Harness {
            app: router(state, &config.server),
            db,
            dir,
        }
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], routes::WELCOME_MESSAGE);

        let response = h
            .app
            .clone()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_caches_results() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/api/search?query=machado&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(h.db.count_books().unwrap(), 3);

        let (status, body) = get_json(&h.app, "/api/books/gutenberg_1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Livro 1");
    }

    #[tokio::test]
    async fn test_search_with_failing_provider_is_empty_not_error() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/api/search?query=fail").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_book_is_404_with_detail() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/api/books/aa_unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Book not found in cache");
    }

    #[tokio::test]
    async fn test_categories_are_seeded() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/api/categorias").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["categorias"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["nome"].as_str())
            .collect();
        assert_eq!(names, vec!["Fantasia", "Dark", "Estudo"]);
    }

    #[tokio::test]
    async fn test_category_search_uses_category_name() {
        let h = harness();
        let (status, body) = get_json(&h.app, "/api/categoria/Fantasia").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_category_returns_all_results_but_caches_limit() {
        let h = harness_with(
            vec![
                fixed("Project Gutenberg", "gutenberg_"),
                fixed("Internet Archive", "ia_"),
            ],
            |config| config.search.category_limit = 3,
        );
        let (status, body) = get_json(&h.app, "/api/categoria/Estudo").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|b| b["id"].as_str())
            .collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[3], "ia_0");
        assert_eq!(h.db.count_books().unwrap(), 3);
        assert!(h.db.get_book("ia_0").is_err());
    }

    #[tokio::test]
    async fn test_featured_lists_are_capped() {
        let h = harness();
        let (_, featured) = get_json(&h.app, "/api/destaques").await;
        assert_eq!(featured.as_array().unwrap().len(), 12);
        let (_, fantasy) = get_json(&h.app, "/api/fantasy-destaques").await;
        assert_eq!(fantasy.as_array().unwrap().len(), 30);
        assert_eq!(fantasy[0]["id"], "CSV_FANTASY_0");
    }

    #[tokio::test]
    async fn test_missing_featured_file_reads_as_empty() {
        let h = harness();
        std::fs::remove_file(h.dir.path().join("preloaded_books.json")).unwrap();
        let (status, body) = get_json(&h.app, "/api/destaques").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }
}
