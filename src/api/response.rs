//! Response bodies and error mapping for the ledger API.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    CommitReport, PaymentOutcome, PersonAggregate, ProjectDue, ScopedTotals,
};
use crate::error::EngineError;
use crate::models::{PayrollTransaction, Person, Role};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a person not found error response.
    pub fn person_not_found(id: &str) -> Self {
        Self::with_details(
            "PERSON_NOT_FOUND",
            format!("Person not found: {}", id),
            "Pass the person record in the request or store it first",
        )
    }

    /// Creates a transaction not found error response.
    pub fn transaction_not_found(id: &str) -> Self {
        Self::with_details(
            "TRANSACTION_NOT_FOUND",
            format!("Transaction not found: {}", id),
            "Only logged transactions can be corrected",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details(
                        "CONFIG_ERROR",
                        "Configuration error",
                        message,
                    ),
                }
            }
            EngineError::InvalidMonth { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_MONTH", message))
            }
            EngineError::PersonMismatch { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("PERSON_MISMATCH", message))
            }
            EngineError::StaleVersion { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "STALE_VERSION",
                    message,
                    "Reload the person and apply the edit again",
                ),
            },
            EngineError::Persistence { .. } => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::new("PERSISTENCE_ERROR", message),
            },
        }
    }
}

/// Body returned by `POST /shifts/daily-pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPayResponse {
    /// The shift count after quantizing and clamping.
    pub clamped_shifts: Decimal,
    /// Pay for the day.
    pub daily_pay: Decimal,
}

/// One entry of the `POST /due` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueEntry {
    /// The person.
    pub person_id: String,
    /// The person's role.
    pub role: Role,
    /// What is still owed.
    pub due_amount: Decimal,
}

/// Body returned by `POST /suppliers/due`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDueResponse {
    /// The supplier.
    pub person_id: String,
    /// The scope the figures were computed for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_project_id: Option<String>,
    /// Paid and total figures for the scope.
    pub totals: ScopedTotals,
    /// What is still owed for the scope.
    pub due_amount: Decimal,
    /// Per-project figures across every material.
    pub projects: Vec<ProjectDue>,
}

/// Body returned by `POST /transactions/aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    /// Totals keyed by person id.
    pub aggregates: BTreeMap<String, PersonAggregate>,
    /// The request's records merged with their aggregates.
    pub records: Vec<Person>,
}

/// Body returned by `POST /payments/apply` and `POST /transactions/compensate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedOutcome {
    /// The computed outcome.
    #[serde(flatten)]
    pub outcome: PaymentOutcome,
    /// What reached the store.
    pub commit: CommitReport,
}

/// Body returned by `POST /transactions/compensate` when the amount is unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoCorrection {
    /// The transaction that needed no correction.
    pub original: PayrollTransaction,
    /// Always `"unchanged"`.
    pub status: String,
}
