//! HTTP request handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceExt;

use crate::{
    commands::{
        balance::BalanceRequest, charge::ChargeRequest, history::HistoryRequest,
        use_points::UseRequest, Error, PointService,
    },
    domain::{Balance, LedgerEntry, TransactionKind},
    ports::{balance::BalanceStorePort, ledger::LedgerStorePort},
};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub id: u64,
    pub point: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self {
            id: balance.user_id,
            point: balance.amount,
            updated_at: balance.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: u64,
    pub user_id: u64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.entry_id,
            user_id: entry.user_id,
            amount: entry.amount,
            kind: entry.kind,
            timestamp: entry.timestamp,
        }
    }
}

/// Errors returned to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    /// A path parameter could not be parsed
    InvalidParameter { name: &'static str, value: String },
    Command(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Command(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidParameter { name, value } => (
                StatusCode::BAD_REQUEST,
                format!("value '{value}' of '{name}' is not a valid request value"),
            ),
            ApiError::Command(Error::Balance(err)) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Command(err) => {
                // Store details stay in the logs
                tracing::error!("request failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "code": status.as_u16().to_string(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

fn parse_user_id(id: &str) -> Result<u64, ApiError> {
    id.parse().map_err(|_| ApiError::InvalidParameter {
        name: "id",
        value: id.to_string(),
    })
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Current balance of a user.
#[tracing::instrument(skip(service))]
pub async fn get_balance<B, L>(
    State(service): State<PointService<B, L>>,
    Path(id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    let user_id = parse_user_id(&id)?;
    let balance = service.oneshot(BalanceRequest { user_id }).await?;
    Ok(Json(balance.into()))
}

/// Ledger of a user, oldest entry first.
#[tracing::instrument(skip(service))]
pub async fn get_history<B, L>(
    State(service): State<PointService<B, L>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LedgerEntryResponse>>, ApiError>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    let user_id = parse_user_id(&id)?;
    let entries = service.oneshot(HistoryRequest { user_id }).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Add points to a user.
#[tracing::instrument(skip(service))]
pub async fn charge<B, L>(
    State(service): State<PointService<B, L>>,
    Path(id): Path<String>,
    Json(amount): Json<i64>,
) -> Result<Json<BalanceResponse>, ApiError>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    let user_id = parse_user_id(&id)?;
    let balance = service.oneshot(ChargeRequest { user_id, amount }).await?;
    Ok(Json(balance.into()))
}

/// Spend points of a user.
#[tracing::instrument(skip(service))]
pub async fn use_points<B, L>(
    State(service): State<PointService<B, L>>,
    Path(id): Path<String>,
    Json(amount): Json<i64>,
) -> Result<Json<BalanceResponse>, ApiError>
where
    B: BalanceStorePort + 'static,
    L: LedgerStorePort + 'static,
{
    let user_id = parse_user_id(&id)?;
    let balance = service.oneshot(UseRequest { user_id, amount }).await?;
    Ok(Json(balance.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BalanceError;
    use rstest::*;
    use speculoos::prelude::*;

    #[rstest]
    #[case("123", Some(123))]
    #[case("0", Some(0))]
    #[case("STRING", None)]
    #[case("-1", None)]
    fn test_parse_user_id(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_that!(parse_user_id(input).ok()).is_equal_to(expected);
    }

    #[rstest]
    #[case(Error::Balance(BalanceError::InvalidAmount { amount: 0 }), StatusCode::BAD_REQUEST)]
    #[case(
        Error::Balance(BalanceError::InsufficientFunds { current: 1, requested: 2 }),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        Error::BalanceStore(crate::ports::balance::Error::Adapter("down".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_error_status(#[case] err: Error, #[case] expected: StatusCode) {
        let res = ApiError::from(err).into_response();

        assert_that!(res.status()).is_equal_to(expected);
    }

    #[test]
    fn test_balance_response_fields() {
        let balance = Balance::new(123, 950, Utc::now());

        let json = serde_json::to_value(BalanceResponse::from(balance)).unwrap();

        assert_that!(json["id"]).is_equal_to(serde_json::json!(123));
        assert_that!(json["point"]).is_equal_to(serde_json::json!(950));
    }
}
