//! Configuration loading and management for the ledger engine.
//!
//! Engine settings (money rounding scale, daily-rate divisor, rest day and
//! the default supplier allocation policy) live in a single YAML file.
//!
//! # Example
//!
//! ```no_run
//! use site_ledger::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/engine.yaml").unwrap();
//! println!("Allocation policy: {:?}", loader.config().allocation_policy);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AllocationPolicyKind, EngineConfig};
