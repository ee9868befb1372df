pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{engine::ReportEngine, pipeline::TranscriptPipeline};
pub use crate::core::{gpa::Gpa, report::GradeReport, whatif::WorkingLedger};
pub use crate::domain::model::{CourseRecord, Grade, GradeDelta, Term, Transcript};
pub use crate::domain::scale::GradeScale;
pub use crate::utils::error::{LedgerError, Result};
