//! The persistence boundary.
//!
//! The engine reads and writes plain records through [`PayrollStore`]. Writes
//! are idempotent upserts or appends; the engine never retries them.

mod memory;

pub use memory::MemoryStore;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, PayrollTransaction, Person, Project, Role, ShiftRecord};

/// Read and write contracts the engine needs from a CRUD backend.
pub trait PayrollStore: Send + Sync {
    /// Inserts or replaces a person record.
    fn upsert_person(&self, person: &Person) -> EngineResult<()>;

    /// Appends a transaction to the log. Existing entries are never replaced.
    fn append_transaction(&self, transaction: &PayrollTransaction) -> EngineResult<()>;

    /// Inserts or replaces the shift record for a person and day.
    fn upsert_shift(&self, shift: &ShiftRecord) -> EngineResult<()>;

    /// Fetches one person.
    fn get_person(&self, id: &str) -> EngineResult<Option<Person>>;

    /// Lists people, optionally of one role.
    fn list_people(&self, role: Option<Role>) -> EngineResult<Vec<Person>>;

    /// Lists a person's attendance records between two dates, inclusive.
    fn list_attendance(
        &self,
        person_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Lists the shift records logged for a day.
    fn list_shifts(&self, date: NaiveDate) -> EngineResult<Vec<ShiftRecord>>;

    /// Fetches one transaction from the log.
    fn get_transaction(&self, id: &str) -> EngineResult<Option<PayrollTransaction>>;

    /// Lists transactions in append order, optionally of one role.
    fn list_transactions(&self, role: Option<Role>) -> EngineResult<Vec<PayrollTransaction>>;

    /// Lists the projects materials can be scoped to.
    fn list_projects(&self) -> EngineResult<Vec<Project>>;
}
