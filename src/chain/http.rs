//! HTTP Chain Client
//!
//! reqwest client against the chain bridge service. The bridge exposes the
//! contract over plain JSON; wide on-chain integers arrive as decimal
//! strings and are parsed with a checked conversion that fails closed
//! instead of truncating.
//!
//! Any transport failure, non-success status, or undecodable body surfaces
//! as `LedgerUnavailable`; the client never retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::{ActiveFreeWash, ActivityEvent, Chain, FreeWashStatus, NftMetadata, TxRef};
use crate::error::{AppError, Result};
use crate::loyalty::Tier;

use async_trait::async_trait;

// == HTTP Chain ==
/// Chain implementation backed by the HTTP bridge.
#[derive(Debug, Clone)]
pub struct HttpChain {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChain {
    /// Creates a client for the given bridge base URL with a per-request
    /// timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build HTTP client: {}", err)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ledger_err(&url, err))?
            .error_for_status()
            .map_err(|err| ledger_err(&url, err))?;

        response.json().await.map_err(|err| ledger_err(&url, err))
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| ledger_err(&url, err))?
            .error_for_status()
            .map_err(|err| ledger_err(&url, err))?;

        response.json().await.map_err(|err| ledger_err(&url, err))
    }
}

fn ledger_err(url: &str, err: impl std::fmt::Display) -> AppError {
    AppError::LedgerUnavailable(format!("{}: {}", url, err))
}

// == Checked Points Conversion ==
/// Parses a chain-reported decimal string into a point balance.
///
/// The contract stores points in a wider integer than we hold; a value that
/// does not fit is a fatal data-integrity error, never a silent rounding.
fn parse_points(raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|_| {
        AppError::DataIntegrity(format!(
            "chain points value '{}' is not representable as a 64-bit balance",
            raw
        ))
    })
}

// == Wire DTOs ==

#[derive(Debug, Deserialize)]
struct PointsDto {
    points: String,
}

#[derive(Debug, Deserialize)]
struct NftMetadataDto {
    token_id: u64,
    metadata_uri: String,
    points: String,
    tier: Tier,
    expiry_time: u64,
    exists: bool,
}

impl NftMetadataDto {
    fn into_metadata(self) -> Result<NftMetadata> {
        Ok(NftMetadata {
            token_id: self.token_id,
            metadata_uri: self.metadata_uri,
            points: parse_points(&self.points)?,
            tier: self.tier,
            expiry_time: self.expiry_time,
            exists: self.exists,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AdminsDto {
    admins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OwnerDto {
    owner: String,
}

#[derive(Debug, Deserialize)]
struct TxRefDto {
    tx_ref: TxRef,
}

#[derive(Debug, Serialize)]
struct RecordTransactionBody<'a> {
    address: &'a str,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
struct UpdateNftBody<'a> {
    address: &'a str,
    uri: &'a str,
    tier: Tier,
    points: u64,
}

#[derive(Debug, Serialize)]
struct AdminBody<'a> {
    address: &'a str,
}

#[derive(Debug, Serialize)]
struct RedeemBody<'a> {
    address: &'a str,
    package_id: &'a str,
    cost: u64,
}

// == Chain Implementation ==
#[async_trait]
impl Chain for HttpChain {
    async fn get_user_points(&self, address: &str) -> Result<u64> {
        let dto: PointsDto = self.get_json(&format!("/users/{}/points", address)).await?;
        parse_points(&dto.points)
    }

    async fn get_nft_metadata(&self, address: &str) -> Result<NftMetadata> {
        let dto: NftMetadataDto = self.get_json(&format!("/users/{}/nft", address)).await?;
        dto.into_metadata()
    }

    async fn get_free_wash_status(&self, address: &str) -> Result<FreeWashStatus> {
        self.get_json(&format!("/users/{}/freewash", address)).await
    }

    async fn get_activity_log(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActivityEvent>> {
        self.get_json(&format!(
            "/users/{}/activity?page={}&page_size={}",
            address, page, page_size
        ))
        .await
    }

    async fn get_admins(&self) -> Result<Vec<String>> {
        let dto: AdminsDto = self.get_json("/admins").await?;
        Ok(dto.admins)
    }

    async fn owner(&self) -> Result<String> {
        let dto: OwnerDto = self.get_json("/owner").await?;
        Ok(dto.owner)
    }

    async fn record_transaction(&self, address: &str, timestamp: u64) -> Result<TxRef> {
        let dto: TxRefDto = self
            .post_json("/transactions", &RecordTransactionBody { address, timestamp })
            .await?;
        Ok(dto.tx_ref)
    }

    async fn update_nft_metadata(
        &self,
        address: &str,
        uri: &str,
        tier: Tier,
        points: u64,
    ) -> Result<TxRef> {
        let dto: TxRefDto = self
            .post_json(
                "/nft",
                &UpdateNftBody {
                    address,
                    uri,
                    tier,
                    points,
                },
            )
            .await?;
        Ok(dto.tx_ref)
    }

    async fn add_admin(&self, address: &str) -> Result<TxRef> {
        let dto: TxRefDto = self.post_json("/admins/add", &AdminBody { address }).await?;
        Ok(dto.tx_ref)
    }

    async fn remove_admin(&self, address: &str) -> Result<TxRef> {
        let dto: TxRefDto = self
            .post_json("/admins/remove", &AdminBody { address })
            .await?;
        Ok(dto.tx_ref)
    }

    async fn redeem_package(&self, address: &str, package_id: &str, cost: u64) -> Result<TxRef> {
        let dto: TxRefDto = self
            .post_json(
                "/redemptions",
                &RedeemBody {
                    address,
                    package_id,
                    cost,
                },
            )
            .await?;
        Ok(dto.tx_ref)
    }

    async fn get_active_free_wash_users(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<ActiveFreeWash>> {
        self.get_json(&format!(
            "/freewash/active?page={}&page_size={}",
            page, page_size
        ))
        .await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points_in_range() {
        assert_eq!(parse_points("0").unwrap(), 0);
        assert_eq!(parse_points("950").unwrap(), 950);
        assert_eq!(parse_points(&u64::MAX.to_string()).unwrap(), u64::MAX);
    }

    #[test]
    fn test_parse_points_overflow_fails_closed() {
        // One past u64::MAX must not wrap or truncate
        let too_big = "18446744073709551616";
        let err = parse_points(too_big).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn test_parse_points_malformed() {
        assert!(matches!(
            parse_points("-5"),
            Err(AppError::DataIntegrity(_))
        ));
        assert!(matches!(
            parse_points("0x10"),
            Err(AppError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let chain = HttpChain::new("http://bridge:8545/", Duration::from_secs(5)).unwrap();
        assert_eq!(chain.url("/owner"), "http://bridge:8545/owner");
    }

    #[test]
    fn test_nft_dto_conversion_checks_points() {
        let dto = NftMetadataDto {
            token_id: 1,
            metadata_uri: "blob://x".to_string(),
            points: "18446744073709551616".to_string(),
            tier: Tier::Gold,
            expiry_time: 0,
            exists: true,
        };
        assert!(matches!(
            dto.into_metadata(),
            Err(AppError::DataIntegrity(_))
        ));
    }
}
