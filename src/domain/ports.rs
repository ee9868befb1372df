use crate::core::report::GradeReport;
use crate::domain::model::{GradeDelta, Transcript};
use crate::domain::scale::GradeScale;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn overlay_key(&self) -> &str;
    fn grade_scale(&self) -> &GradeScale;
    fn what_if(&self) -> &[GradeDelta];
    fn use_saved_overlay(&self) -> bool;
    fn save_overlay(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Transcript>;
    async fn transform(&self, transcript: Transcript) -> Result<GradeReport>;
    async fn load(&self, report: GradeReport) -> Result<String>;
}
