use crate::adapters::html::parse_grade_history;
use crate::adapters::overlay::OverlayStore;
use crate::core::report::GradeReport;
use crate::core::whatif::{Baseline, WorkingLedger};
use crate::core::{ConfigProvider, Pipeline, Storage, Transcript};
use crate::utils::error::Result;

/// Saved page in, `report.json` + `courses.csv` out.
pub struct TranscriptPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TranscriptPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn overlay_store(&self) -> OverlayStore<'_, S> {
        OverlayStore::new(&self.storage, self.config.overlay_key())
    }

    /// 先套用已保存的 overlay，再套用本次的 what-if
    async fn working_ledger(&self, baseline: Baseline) -> Result<WorkingLedger> {
        let store = self.overlay_store();

        let mut ledger = if self.config.use_saved_overlay() {
            match store.load().await {
                Ok(Some(overlay)) => {
                    tracing::info!("Restored {} saved what-if entries", overlay.len());
                    WorkingLedger::from_overlay(baseline, &overlay)
                }
                Ok(None) => WorkingLedger::new(baseline),
                Err(e) => {
                    tracing::warn!("Ignoring saved overlay '{}': {}", store.key(), e);
                    WorkingLedger::new(baseline)
                }
            }
        } else {
            WorkingLedger::new(baseline)
        };

        ledger.apply(self.config.what_if());

        if self.config.save_overlay() {
            store.save(&ledger.to_overlay()).await?;
            tracing::info!("Saved what-if overlay under '{}'", store.key());
        }

        Ok(ledger)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TranscriptPipeline<S, C> {
    async fn extract(&self) -> Result<Transcript> {
        tracing::debug!("Reading grade history from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        let html = String::from_utf8_lossy(&data);

        let transcript = parse_grade_history(&html);
        if transcript.semesters.is_empty() {
            tracing::warn!("No semester courses found; statistics will be empty");
        }

        Ok(transcript)
    }

    async fn transform(&self, transcript: Transcript) -> Result<GradeReport> {
        let scale = self.config.grade_scale();
        let baseline = Baseline::capture(transcript.semesters.clone());
        let ledger = self.working_ledger(baseline).await?;

        Ok(GradeReport::build(&transcript, &ledger, scale))
    }

    async fn load(&self, report: GradeReport) -> Result<String> {
        let output_path = format!("{}/report.json", self.config.output_path());

        let json = report.to_json()?;
        tracing::debug!("Writing report.json ({} bytes)", json.len());
        self.storage.write_file("report.json", json.as_bytes()).await?;

        let csv = report.courses_csv()?;
        tracing::debug!("Writing courses.csv ({} rows)", report.courses.len());
        self.storage.write_file("courses.csv", csv.as_bytes()).await?;

        Ok(output_path)
    }
}
