pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::overlay::DEFAULT_OVERLAY_KEY;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::GradeDelta;
#[cfg(feature = "cli")]
use crate::domain::scale::GradeScale;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_storage_key, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gpa-ledger")]
#[command(about = "CGPA statistics and what-if simulation for a saved grade-history page")]
pub struct CliConfig {
    #[arg(long, default_value = "grade_history.html", help = "Saved grade-history page")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "TOML config file; replaces the other options when given")]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_OVERLAY_KEY)]
    pub overlay_key: String,

    #[arg(
        long = "what-if",
        value_parser = parse_delta,
        help = "Override a course: CODE=GRADE, CODE=GRADE:CREDITS or CODE=:CREDITS"
    )]
    pub what_if: Vec<GradeDelta>,

    #[arg(long, help = "Persist the resulting overlay for later runs")]
    pub save_overlay: bool,

    #[arg(long, help = "Do not apply the previously saved overlay")]
    pub ignore_saved: bool,

    #[arg(long, help = "Answer a JSON message (e.g. {\"type\":\"CALCULATE_CGPA\"}) and exit")]
    pub message: Option<String>,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(skip = GradeScale::standard())]
    pub scale: GradeScale,
}

#[cfg(feature = "cli")]
fn parse_delta(raw: &str) -> Result<GradeDelta> {
    raw.parse()
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn overlay_key(&self) -> &str {
        &self.overlay_key
    }

    fn grade_scale(&self) -> &GradeScale {
        &self.scale
    }

    fn what_if(&self) -> &[GradeDelta] {
        &self.what_if
    }

    fn use_saved_overlay(&self) -> bool {
        !self.ignore_saved
    }

    fn save_overlay(&self) -> bool {
        self.save_overlay
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_storage_key("overlay_key", &self.overlay_key)?;
        Ok(())
    }
}
