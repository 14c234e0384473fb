//! HTTP API module for the site ledger engine.
//!
//! Exposes each engine operation as a JSON `POST` endpoint so the back-office
//! UI calls the engine instead of repeating its arithmetic.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AccrueShiftsRequest, AggregateRequest, ApplyPaymentRequest, CompensateRequest,
    DailyPayRequest, DueRequest, MonthlyAttendanceRequest, MonthlySummaryRequest,
    ReallocateRequest, SupplierDueRequest, SyncPeopleRequest,
};
pub use response::{
    AggregateResponse, ApiError, ApiErrorResponse, CommittedOutcome, DailyPayResponse, DueEntry,
    NoCorrection, SupplierDueResponse,
};
pub use state::AppState;
