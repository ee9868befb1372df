use crate::adapters::overlay::DEFAULT_OVERLAY_KEY;
use crate::core::ConfigProvider;
use crate::domain::model::GradeDelta;
use crate::domain::scale::{GradeScale, ScaleEntry};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{
    validate_path, validate_range, validate_required_field, validate_storage_key, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub scale: Option<ScaleConfig>,
    pub overlay: Option<OverlayConfig>,
    pub what_if: Option<Vec<GradeDelta>>,
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,

    #[serde(skip, default = "GradeScale::standard")]
    grade_scale: GradeScale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub max_points: Option<f64>,
    pub grades: Option<Vec<ScaleEntry>>,
    pub excluded: Option<Vec<String>>,
    pub failing: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub key: Option<String>,
    pub use_saved: Option<bool>,
    pub save: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl ScaleConfig {
    pub fn build(&self) -> Result<GradeScale> {
        let mut builder = GradeScale::builder();
        if let Some(max_points) = self.max_points {
            builder = builder.max_points(max_points);
        }
        // 自訂量表必須列出完整的成績表
        let grades = validate_required_field("scale.grades", &self.grades)?;
        for entry in grades {
            builder = builder.grade(&entry.grade, entry.points);
        }
        for grade in self.excluded.iter().flatten() {
            builder = builder.exclude(grade);
        }
        for grade in self.failing.iter().flatten() {
            builder = builder.failing(grade);
        }
        builder.build()
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LedgerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，並建立成績對照表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        if let Some(scale) = &config.scale {
            config.grade_scale = scale.build()?;
        }
        Ok(config)
    }

    /// 替換環境變數 (例如 ${GRADE_PAGE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LedgerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("source.input", &self.source.input)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_storage_key("overlay.key", self.overlay_key())?;

        for delta in self.what_if() {
            if let Some(credits) = delta.credits {
                validate_range("what_if.credits", credits, 0.0, f64::MAX)?;
            }
        }

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn overlay_key(&self) -> &str {
        self.overlay
            .as_ref()
            .and_then(|o| o.key.as_deref())
            .unwrap_or(DEFAULT_OVERLAY_KEY)
    }

    fn grade_scale(&self) -> &GradeScale {
        &self.grade_scale
    }

    fn what_if(&self) -> &[GradeDelta] {
        self.what_if.as_deref().unwrap_or(&[])
    }

    fn use_saved_overlay(&self) -> bool {
        self.overlay.as_ref().and_then(|o| o.use_saved).unwrap_or(true)
    }

    fn save_overlay(&self) -> bool {
        self.overlay.as_ref().and_then(|o| o.save).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
