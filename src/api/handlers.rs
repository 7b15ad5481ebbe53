//! API Handlers
//!
//! HTTP request handlers for each loyalty endpoint. Reads go through the
//! ledger gateway (cache-first), writes go through the orchestrator or the
//! gateway's invalidating write paths. Handlers never talk to the chain or
//! the cache directly.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::{AppError, Result};
use crate::ledger::{AdminOp, LedgerGateway};
use crate::loyalty::{now_unix, FreeWashView};
use crate::models::{
    ActivityQuery, ActivityResponse, AddAdminRequest, AdminMutationResponse, AdminsResponse,
    CreateUserRequest, CreateUserResponse, FreeWashResponse, HealthResponse, IsAdminResponse,
    NftResponse, PointsResponse, RecordTransactionRequest, RedeemPackageRequest,
    RedemptionResponse, StatsResponse, TransactionResponse,
};
use crate::orchestrator::Orchestrator;
use crate::store::{UserRecord, UserStore};

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-first view of the chain
    pub gateway: LedgerGateway,
    /// Local user and transaction persistence
    pub store: Arc<dyn UserStore>,
    /// Transaction state machine
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Creates a new AppState over already-wired components.
    pub fn new(
        gateway: LedgerGateway,
        store: Arc<dyn UserStore>,
        orchestrator: Arc<Orchestrator>,
    ) -> Self {
        Self {
            gateway,
            store,
            orchestrator,
        }
    }
}

// == Read Handlers ==

/// Handler for GET /points/:address
///
/// Returns the user's point balance with the tier derived from it.
pub async fn points_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PointsResponse>> {
    let points = state.gateway.read_points(&address).await?;
    Ok(Json(PointsResponse::new(address.to_lowercase(), points)))
}

/// Handler for GET /nft/:address
pub async fn nft_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<NftResponse>> {
    let metadata = state.gateway.read_nft_metadata(&address).await?;
    Ok(Json(NftResponse::new(address.to_lowercase(), metadata)))
}

/// Handler for GET /freewash/:address
///
/// Returns the raw coupon fields plus the derived `active` flag.
pub async fn freewash_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<FreeWashResponse>> {
    let status = state.gateway.read_free_wash_status(&address).await?;
    Ok(Json(FreeWashResponse::new(
        address.to_lowercase(),
        FreeWashView::current(&status),
    )))
}

/// Handler for GET /activity/:address?page=&page_size=
pub async fn activity_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>> {
    let page_size = query.effective_page_size();
    let events = state
        .gateway
        .read_activity_log(&address, query.page, page_size)
        .await?;

    Ok(Json(ActivityResponse {
        address: address.to_lowercase(),
        page: query.page,
        page_size,
        events,
    }))
}

/// Handler for GET /admins
pub async fn admins_handler(State(state): State<AppState>) -> Result<Json<AdminsResponse>> {
    let admins = state.gateway.read_admins().await?;
    Ok(Json(AdminsResponse { admins }))
}

/// Handler for GET /admins/:address
pub async fn is_admin_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<IsAdminResponse>> {
    let is_admin = state.gateway.is_admin(&address).await?;
    Ok(Json(IsAdminResponse {
        address: address.to_lowercase(),
        is_admin,
    }))
}

// == Write Handlers ==

/// Handler for POST /admins
pub async fn add_admin_handler(
    State(state): State<AppState>,
    Json(req): Json<AddAdminRequest>,
) -> Result<Json<AdminMutationResponse>> {
    if let Some(message) = req.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let tx_ref = state.gateway.write_admin(AdminOp::Add, &req.address).await?;
    Ok(Json(AdminMutationResponse::added(req.address, tx_ref)))
}

/// Handler for DELETE /admins/:address
pub async fn remove_admin_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AdminMutationResponse>> {
    let tx_ref = state.gateway.write_admin(AdminOp::Remove, &address).await?;
    Ok(Json(AdminMutationResponse::removed(address, tx_ref)))
}

/// Handler for POST /users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>> {
    if let Some(message) = req.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let user = state
        .store
        .create_user(UserRecord {
            address: req.address,
            email: req.email,
            name: req.name,
            registered_at: now_unix(),
        })
        .await?;

    Ok(Json(CreateUserResponse::new(user)))
}

/// Handler for POST /transactions
///
/// Runs the full orchestration: local pending record, chain write with
/// timeout, confirm or rollback, then background side effects.
pub async fn record_transaction_handler(
    State(state): State<AppState>,
    Json(req): Json<RecordTransactionRequest>,
) -> Result<Json<TransactionResponse>> {
    if let Some(message) = req.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let outcome = state.orchestrator.record_transaction(&req.address).await?;
    Ok(Json(TransactionResponse::new(
        outcome.transaction_id,
        outcome.tx_ref,
    )))
}

/// Handler for POST /redemptions
pub async fn redeem_handler(
    State(state): State<AppState>,
    Json(req): Json<RedeemPackageRequest>,
) -> Result<Json<RedemptionResponse>> {
    if let Some(message) = req.validate() {
        return Err(AppError::InvalidRequest(message));
    }

    let outcome = state
        .orchestrator
        .redeem_package(&req.address, &req.package_id)
        .await?;
    Ok(Json(RedemptionResponse::new(
        outcome.package_id,
        outcome.tx_ref,
        outcome.remaining_points,
    )))
}

// == Observability Handlers ==

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.gateway.cache().stats().await;
    Json(StatsResponse::new(&stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cache::{Cache, CacheStore};
    use crate::chain::MemoryChain;
    use crate::notify::{Broadcaster, LogNotifier};
    use crate::orchestrator::MemoryBlobStore;
    use crate::store::MemoryStore;

    fn test_state(chain: Arc<MemoryChain>) -> AppState {
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
        AppState::new(gateway, store, orchestrator)
    }

    #[tokio::test]
    async fn test_points_handler_derives_tier() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 5000);
        let state = test_state(chain);

        let response = points_handler(State(state), Path("0xABC".to_string()))
            .await
            .unwrap();
        assert_eq!(response.points, 5000);
        assert_eq!(response.tier, crate::loyalty::Tier::Gold);
        assert_eq!(response.address, "0xabc");
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_body() {
        let state = test_state(Arc::new(MemoryChain::new("0xowner")));

        let req = CreateUserRequest {
            address: "not-an-address".to_string(),
            email: "driver@example.com".to_string(),
            name: None,
        };
        let err = create_user_handler(State(state), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_transaction_for_unregistered_user() {
        let state = test_state(Arc::new(MemoryChain::new("0xowner")));

        let req = RecordTransactionRequest {
            address: "0xghost".to_string(),
        };
        let err = record_transaction_handler(State(state), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_admin_roundtrip() {
        let state = test_state(Arc::new(MemoryChain::new("0xowner")));

        let req = AddAdminRequest {
            address: "0xalice".to_string(),
        };
        add_admin_handler(State(state.clone()), Json(req)).await.unwrap();

        let check = is_admin_handler(State(state.clone()), Path("0xALICE".to_string()))
            .await
            .unwrap();
        assert!(check.is_admin);

        remove_admin_handler(State(state.clone()), Path("0xalice".to_string()))
            .await
            .unwrap();
        let check = is_admin_handler(State(state), Path("0xalice".to_string()))
            .await
            .unwrap();
        assert!(!check.is_admin);
    }

    #[tokio::test]
    async fn test_cache_stats_handler_reports_traffic() {
        let chain = Arc::new(MemoryChain::new("0xowner"));
        chain.set_points("0xabc", 100);
        let state = test_state(chain);

        // Miss then hit
        points_handler(State(state.clone()), Path("0xabc".to_string()))
            .await
            .unwrap();
        points_handler(State(state.clone()), Path("0xabc".to_string()))
            .await
            .unwrap();

        let stats = cache_stats_handler(State(state)).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
