use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting grade report...");

        // Extract
        tracing::info!("📄 Reading grade history...");
        let transcript = self.pipeline.extract().await?;
        tracing::info!(
            "Found {} courses ({} semester, {} waived, {} transferred)",
            transcript.course_count(),
            transcript.semesters.len(),
            transcript.waivers.len(),
            transcript.transfers.len()
        );

        // Transform
        tracing::info!("🧮 Computing statistics...");
        let report = self.pipeline.transform(transcript).await?;
        tracing::info!("CGPA: {}", report.summary.cgpa);
        if let Some(what_if) = &report.what_if {
            tracing::info!(
                "What-if CGPA: {} ({} changed)",
                what_if.comparison.what_if,
                what_if.changed_courses
            );
        }

        // Load
        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("✅ Report saved to: {}", output_path);

        Ok(output_path)
    }
}
