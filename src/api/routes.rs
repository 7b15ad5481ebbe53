//! API Routes
//!
//! Configures the Axum router with all loyalty endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activity_handler, add_admin_handler, admins_handler, cache_stats_handler, create_user_handler,
    freewash_handler, health_handler, is_admin_handler, nft_handler, points_handler,
    record_transaction_handler, redeem_handler, remove_admin_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /points/:address` - Point balance with derived tier
/// - `GET /nft/:address` - Loyalty NFT metadata
/// - `GET /freewash/:address` - Coupon status with derived active flag
/// - `GET /activity/:address` - Paginated activity log
/// - `GET /admins` / `GET /admins/:address` - Admin list and membership check
/// - `POST /admins` / `DELETE /admins/:address` - Admin mutations
/// - `POST /users` - User registration
/// - `POST /transactions` - Record a wash transaction
/// - `POST /redemptions` - Redeem a wash package
/// - `GET /cache/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/points/:address", get(points_handler))
        .route("/nft/:address", get(nft_handler))
        .route("/freewash/:address", get(freewash_handler))
        .route("/activity/:address", get(activity_handler))
        .route("/admins", get(admins_handler).post(add_admin_handler))
        .route(
            "/admins/:address",
            get(is_admin_handler).delete(remove_admin_handler),
        )
        .route("/users", post(create_user_handler))
        .route("/transactions", post(record_transaction_handler))
        .route("/redemptions", post(redeem_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use crate::cache::{Cache, CacheStore};
    use crate::chain::MemoryChain;
    use crate::ledger::LedgerGateway;
    use crate::notify::{Broadcaster, LogNotifier};
    use crate::orchestrator::{MemoryBlobStore, Orchestrator};
    use crate::store::{MemoryStore, UserStore};

    fn create_test_app() -> Router {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        let cache = Cache::new(CacheStore::new(1000, 600));
        let gateway = LedgerGateway::new(cache, chain);
        let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        let orchestrator = Arc::new(Orchestrator::new(
            gateway.clone(),
            Arc::clone(&store),
            Arc::new(LogNotifier),
            Broadcaster::new(),
            Arc::new(MemoryBlobStore::new()),
            Duration::from_secs(5),
        ));
        create_router(AppState::new(gateway, store, orchestrator))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_points_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/points/0xabc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Unknown addresses read as a zero balance, not an error
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transaction_for_unknown_user_is_404() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transactions")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"address":"0xghost"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_400() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"address":"0xabc","email":"nope"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
