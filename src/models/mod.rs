//! Models Module
//!
//! Request and response DTOs for the loyalty API.

pub mod requests;
pub mod responses;

pub use requests::{
    ActivityQuery, AddAdminRequest, CreateUserRequest, RecordTransactionRequest,
    RedeemPackageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use responses::{
    ActivityResponse, AdminMutationResponse, AdminsResponse, CreateUserResponse, FreeWashResponse,
    HealthResponse, IsAdminResponse, NftResponse, PointsResponse, RedemptionResponse,
    StatsResponse, TransactionResponse,
};
