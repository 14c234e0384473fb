//! In-process store for tests and callers without a backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, PayrollTransaction, Person, Project, Role, ShiftRecord};

use super::PayrollStore;

#[derive(Debug, Default)]
struct Tables {
    people: BTreeMap<String, Person>,
    transactions: Vec<PayrollTransaction>,
    attendance: Vec<AttendanceRecord>,
    shifts: Vec<ShiftRecord>,
    projects: Vec<Project>,
}

/// A [`PayrollStore`] held in memory.
///
/// Individual write kinds can be switched to fail, which is how the
/// partial-commit paths of the payment applier are exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_person_writes: AtomicBool,
    fail_transaction_writes: AtomicBool,
}

fn poisoned<T>(operation: &str) -> impl FnOnce(PoisonError<T>) -> EngineError + '_ {
    move |_| EngineError::Persistence {
        operation: operation.to_string(),
        message: "store lock poisoned".to_string(),
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `upsert_person` calls fail (or succeed again).
    pub fn fail_person_writes(&self, fail: bool) {
        self.fail_person_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `append_transaction` calls fail (or succeed again).
    pub fn fail_transaction_writes(&self, fail: bool) {
        self.fail_transaction_writes.store(fail, Ordering::SeqCst);
    }

    /// Seeds an attendance record.
    pub fn insert_attendance(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut tables = self.tables.write().map_err(poisoned("insert_attendance"))?;
        tables.attendance.push(record);
        Ok(())
    }

    /// Seeds a project.
    pub fn insert_project(&self, project: Project) -> EngineResult<()> {
        let mut tables = self.tables.write().map_err(poisoned("insert_project"))?;
        tables.projects.push(project);
        Ok(())
    }

    fn check(&self, flag: &AtomicBool, operation: &str) -> EngineResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(EngineError::Persistence {
                operation: operation.to_string(),
                message: "write rejected by store".to_string(),
            });
        }
        Ok(())
    }
}

impl PayrollStore for MemoryStore {
    fn upsert_person(&self, person: &Person) -> EngineResult<()> {
        self.check(&self.fail_person_writes, "upsert_person")?;
        let mut tables = self.tables.write().map_err(poisoned("upsert_person"))?;
        tables.people.insert(person.id.clone(), person.clone());
        Ok(())
    }

    fn append_transaction(&self, transaction: &PayrollTransaction) -> EngineResult<()> {
        self.check(&self.fail_transaction_writes, "append_transaction")?;
        let mut tables = self.tables.write().map_err(poisoned("append_transaction"))?;
        if tables.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(EngineError::Persistence {
                operation: "append_transaction".to_string(),
                message: format!("transaction '{}' already exists", transaction.id),
            });
        }
        tables.transactions.push(transaction.clone());
        Ok(())
    }

    fn upsert_shift(&self, shift: &ShiftRecord) -> EngineResult<()> {
        let mut tables = self.tables.write().map_err(poisoned("upsert_shift"))?;
        match tables
            .shifts
            .iter_mut()
            .find(|s| s.person_id == shift.person_id && s.date == shift.date)
        {
            Some(existing) => *existing = shift.clone(),
            None => tables.shifts.push(shift.clone()),
        }
        Ok(())
    }

    fn get_person(&self, id: &str) -> EngineResult<Option<Person>> {
        let tables = self.tables.read().map_err(poisoned("get_person"))?;
        Ok(tables.people.get(id).cloned())
    }

    fn list_people(&self, role: Option<Role>) -> EngineResult<Vec<Person>> {
        let tables = self.tables.read().map_err(poisoned("list_people"))?;
        Ok(tables
            .people
            .values()
            .filter(|p| role.is_none_or(|r| p.role() == r))
            .cloned()
            .collect())
    }

    fn list_attendance(
        &self,
        person_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let tables = self.tables.read().map_err(poisoned("list_attendance"))?;
        Ok(tables
            .attendance
            .iter()
            .filter(|r| r.person_id == person_id && r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    fn list_shifts(&self, date: NaiveDate) -> EngineResult<Vec<ShiftRecord>> {
        let tables = self.tables.read().map_err(poisoned("list_shifts"))?;
        Ok(tables.shifts.iter().filter(|s| s.date == date).cloned().collect())
    }

    fn get_transaction(&self, id: &str) -> EngineResult<Option<PayrollTransaction>> {
        let tables = self.tables.read().map_err(poisoned("get_transaction"))?;
        Ok(tables.transactions.iter().find(|t| t.id == id).cloned())
    }

    fn list_transactions(&self, role: Option<Role>) -> EngineResult<Vec<PayrollTransaction>> {
        let tables = self.tables.read().map_err(poisoned("list_transactions"))?;
        Ok(tables
            .transactions
            .iter()
            .filter(|t| role.is_none_or(|r| t.role == r))
            .cloned()
            .collect())
    }

    fn list_projects(&self) -> EngineResult<Vec<Project>> {
        let tables = self.tables.read().map_err(poisoned("list_projects"))?;
        Ok(tables.projects.clone())
    }
}
