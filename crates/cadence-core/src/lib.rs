//! `cadence-core` — shared foundation for the cadence report engine.
//!
//! Holds what every other crate needs: configuration loading, the
//! report-generation and dispatch collaborator traits, and the delivery
//! option types passed between the scheduler and the delivery side.

pub mod config;
pub mod error;
pub mod report;

pub use config::{CadenceConfig, DatabaseConfig, SchedulerConfig};
pub use error::{CoreError, Result};
pub use report::{DispatchOptions, ReportDispatcher, ReportGenerator, ReportSummary, Reporting};
