pub mod engine;
pub mod gpa;
pub mod pipeline;
pub mod progression;
pub mod report;
pub mod whatif;

pub use crate::domain::model::{CourseRecord, Grade, GradeDelta, Term, Transcript};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
