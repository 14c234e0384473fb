//! HTTP request handlers for the ledger API.
//!
//! Each endpoint parses a JSON body, runs one engine operation and returns
//! the result as JSON. Payment and correction endpoints also commit their
//! outcome to the state's store.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    SupplierLedger, accrue_shifts, aggregate_by_person, aggregate_month, apply_checked,
    apply_correction, apply_payment, clamp_shift, commit, compensate, compute_due, daily_pay,
    daily_rate, merge_people, merge_supplier_with_aggregate, summarize_month,
};
use crate::error::EngineError;
use crate::models::Role;

use super::request::{
    AccrueShiftsRequest, AggregateRequest, ApplyPaymentRequest, CompensateRequest,
    DailyPayRequest, DueRequest, MonthlyAttendanceRequest, MonthlySummaryRequest,
    ReallocateRequest, SupplierDueRequest, SyncPeopleRequest,
};
use super::response::{
    AggregateResponse, ApiError, ApiErrorResponse, CommittedOutcome, DailyPayResponse, DueEntry,
    NoCorrection, SupplierDueResponse,
};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance/monthly", post(monthly_attendance_handler))
        .route("/attendance/summary", post(monthly_summary_handler))
        .route("/shifts/daily-pay", post(daily_pay_handler))
        .route("/shifts/accrue", post(accrue_shifts_handler))
        .route("/due", post(due_handler))
        .route("/suppliers/due", post(supplier_due_handler))
        .route("/suppliers/reallocate", post(reallocate_handler))
        .route("/transactions/aggregate", post(aggregate_handler))
        .route("/payments/apply", post(apply_payment_handler))
        .route("/transactions/compensate", post(compensate_handler))
        .route("/sync/people", post(sync_people_handler))
        .with_state(state)
}

fn ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps a JSON body, turning a rejection into a 400.
fn parse<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("Invalid month") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn failed(correlation_id: Uuid, error: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        recoverable = error.is_recoverable(),
        "Request failed"
    );
    error.into()
}

/// Handler for POST /attendance/monthly.
async fn monthly_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<MonthlyAttendanceRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let config = state.config();
    let rate = request
        .daily_rate
        .or_else(|| request.person.as_ref().map(|p| daily_rate(p, config)))
        .unwrap_or(Decimal::ZERO);
    let today = request.today.unwrap_or_else(|| Utc::now().date_naive());

    let start_time = Instant::now();
    let result = aggregate_month(
        &request.person_id,
        request.month,
        &request.records,
        rate,
        today,
        config.rest_day,
    );
    info!(
        correlation_id = %correlation_id,
        person_id = %result.person_id,
        month = %result.month,
        effective_days = result.counters.effective_days,
        attendance_rate = result.counters.attendance_rate,
        duration_us = start_time.elapsed().as_micros(),
        "Monthly attendance aggregated"
    );
    Ok(ok(result))
}

/// Handler for POST /attendance/summary.
async fn monthly_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<MonthlySummaryRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;
    let today = request.today.unwrap_or_else(|| Utc::now().date_naive());

    let summaries = summarize_month(
        &request.people,
        &request.records,
        request.month,
        today,
        state.config(),
    );
    info!(
        correlation_id = %correlation_id,
        month = %request.month,
        people = summaries.len(),
        "Monthly summary produced"
    );
    Ok(ok(summaries))
}

/// Handler for POST /shifts/daily-pay.
async fn daily_pay_handler(payload: Result<Json<DailyPayRequest>, JsonRejection>) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let response = DailyPayResponse {
        clamped_shifts: clamp_shift(request.shift_count),
        daily_pay: daily_pay(request.shift_count, request.per_shift_rate),
    };
    info!(
        correlation_id = %correlation_id,
        shift_count = %request.shift_count,
        clamped_shifts = %response.clamped_shifts,
        "Daily pay computed"
    );
    Ok(ok(response))
}

/// Handler for POST /shifts/accrue.
async fn accrue_shifts_handler(
    payload: Result<Json<AccrueShiftsRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let accrual = accrue_shifts(&request.records, &request.person_id, request.from, request.to);
    info!(
        correlation_id = %correlation_id,
        person_id = %accrual.person_id,
        shift_days = accrual.shift_days,
        accrued_amount = %accrual.accrued_amount,
        "Shifts accrued"
    );
    Ok(ok(accrual))
}

/// Handler for POST /due.
async fn due_handler(payload: Result<Json<DueRequest>, JsonRejection>) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let entries: Vec<DueEntry> = request
        .people
        .iter()
        .map(|person| DueEntry {
            person_id: person.id.clone(),
            role: person.role(),
            due_amount: compute_due(person),
        })
        .collect();
    info!(
        correlation_id = %correlation_id,
        people = entries.len(),
        "Due amounts computed"
    );
    Ok(ok(entries))
}

/// Handler for POST /suppliers/due.
async fn supplier_due_handler(
    payload: Result<Json<SupplierDueRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let Some(ledger) = SupplierLedger::of(&request.supplier) else {
        warn!(correlation_id = %correlation_id, person_id = %request.supplier.id, "Not a supplier");
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "Person '{}' is not a supplier",
            request.supplier.id
        ))));
    };
    let scope = request.scope_project_id.clone().or_else(|| {
        request
            .supplier
            .supplier()
            .and_then(|account| account.selected_project_id.clone())
    });

    let totals = ledger.scoped_totals(scope.as_deref());
    let response = SupplierDueResponse {
        person_id: request.supplier.id.clone(),
        due_amount: totals.due(),
        scope_project_id: scope,
        totals,
        projects: ledger.project_breakdown(),
    };
    info!(
        correlation_id = %correlation_id,
        person_id = %response.person_id,
        due_amount = %response.due_amount,
        "Supplier due computed"
    );
    Ok(ok(response))
}

/// Handler for POST /suppliers/reallocate.
async fn reallocate_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReallocateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let Some(ledger) = SupplierLedger::of(&request.supplier) else {
        warn!(correlation_id = %correlation_id, person_id = %request.supplier.id, "Not a supplier");
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "Person '{}' is not a supplier",
            request.supplier.id
        ))));
    };
    let config = state.config();
    let policy = request.policy.unwrap_or(config.allocation_policy).policy();

    let result = ledger.reallocate(
        request.new_total_paid,
        request.scope_project_id.as_deref(),
        policy,
        config.money_scale,
    );
    info!(
        correlation_id = %correlation_id,
        person_id = %request.supplier.id,
        policy = policy.name(),
        allocated = %result.allocated,
        unallocated_credit = %result.unallocated_credit,
        "Supplier payment reallocated"
    );
    Ok(ok(result))
}

/// Handler for POST /transactions/aggregate.
async fn aggregate_handler(payload: Result<Json<AggregateRequest>, JsonRejection>) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let aggregates = aggregate_by_person(&request.transactions, request.role);
    let records = request
        .records
        .iter()
        .map(|record| merge_supplier_with_aggregate(record, aggregates.get(&record.id)))
        .collect();
    info!(
        correlation_id = %correlation_id,
        transactions = request.transactions.len(),
        people = aggregates.len(),
        "Transactions aggregated"
    );
    Ok(ok(AggregateResponse {
        aggregates,
        records,
    }))
}

/// Handler for POST /payments/apply.
///
/// When the store already holds the person, the edit must be based on the
/// stored version.
async fn apply_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<ApplyPaymentRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;
    let config = state.config();
    let now = Utc::now();

    let stored = state
        .store()
        .get_person(&request.original.id)
        .map_err(|err| failed(correlation_id, err))?;
    let outcome = match &stored {
        Some(stored) => apply_checked(stored, &request.original, &request.edited, now, config),
        None => apply_payment(&request.original, &request.edited, now, config),
    }
    .map_err(|err| failed(correlation_id, err))?;

    for warning in &outcome.warnings {
        warn!(
            correlation_id = %correlation_id,
            person_id = %outcome.updated_person.id,
            code = %warning.code,
            "{}",
            warning.message
        );
    }

    let report = commit(state.store(), &outcome);
    info!(
        correlation_id = %correlation_id,
        person_id = %outcome.updated_person.id,
        due_amount = %outcome.updated_person.due_amount,
        transaction = outcome.transaction.is_some(),
        committed = report.is_clean(),
        "Payment applied"
    );
    Ok(ok(CommittedOutcome {
        outcome,
        commit: report,
    }))
}

/// Handler for POST /transactions/compensate.
///
/// The corrected transaction must be in the store's log, and the correction
/// is measured against what that transaction is worth after any earlier
/// corrections. A person supplied alongside must match the stored version.
async fn compensate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompensateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;
    let store = state.store();
    let now = Utc::now();

    let original = store
        .get_transaction(&request.transaction_id)
        .map_err(|err| failed(correlation_id, err))?
        .ok_or_else(|| ApiErrorResponse {
            status: StatusCode::NOT_FOUND,
            error: ApiError::transaction_not_found(&request.transaction_id),
        })?;
    let log = store
        .list_transactions(Some(original.role))
        .map_err(|err| failed(correlation_id, err))?;

    let Some(correction) = compensate(&original, &log, request.corrected_amount, now) else {
        info!(
            correlation_id = %correlation_id,
            transaction_id = %original.id,
            "Correction not needed"
        );
        return Ok(ok(NoCorrection {
            original,
            status: "unchanged".to_string(),
        }));
    };

    let stored = store
        .get_person(&original.person_id)
        .map_err(|err| failed(correlation_id, err))?;
    let person = match (stored, request.person) {
        (Some(stored), Some(supplied)) if supplied.version != stored.version => {
            return Err(failed(
                correlation_id,
                EngineError::StaleVersion {
                    person_id: stored.id,
                    expected: stored.version,
                    found: supplied.version,
                },
            ));
        }
        (Some(stored), _) => stored,
        (None, Some(supplied)) => supplied,
        (None, None) => {
            return Err(ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::person_not_found(&original.person_id),
            });
        }
    };

    let outcome = apply_correction(&person, &correction, now, state.config())
        .map_err(|err| failed(correlation_id, err))?;
    for warning in &outcome.warnings {
        warn!(
            correlation_id = %correlation_id,
            person_id = %person.id,
            code = %warning.code,
            "{}",
            warning.message
        );
    }

    let report = commit(store, &outcome);
    info!(
        correlation_id = %correlation_id,
        person_id = %person.id,
        corrects_id = %original.id,
        amount = %correction.amount,
        committed = report.is_clean(),
        "Correction recorded"
    );
    Ok(ok(CommittedOutcome {
        outcome,
        commit: report,
    }))
}

/// Handler for POST /sync/people.
async fn sync_people_handler(
    payload: Result<Json<SyncPeopleRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = parse(correlation_id, payload)?;

    let mut merged = merge_people(&request.local, &request.remote);
    if !request.transactions.is_empty() {
        let aggregates = aggregate_by_person(&request.transactions, Some(Role::Supplier));
        for person in merged.iter_mut().filter(|p| p.role() == Role::Supplier) {
            *person = merge_supplier_with_aggregate(person, aggregates.get(&person.id));
        }
    }
    info!(
        correlation_id = %correlation_id,
        local = request.local.len(),
        remote = request.remote.len(),
        merged = merged.len(),
        "People reconciled"
    );
    Ok(ok(merged))
}
