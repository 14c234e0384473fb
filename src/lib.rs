//! Payroll and attendance reconciliation engine for a construction-site back office.
//!
//! This crate computes monthly attendance and salary, shift pay, and what is
//! owed to employees, supervisors, clients and material suppliers, and keeps
//! those figures consistent with an append-only payment log.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
