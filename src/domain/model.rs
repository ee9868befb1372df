use crate::utils::error::LedgerError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 字母成績（已修剪空白並轉為大寫）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Grade(String);

impl Grade {
    /// 空白儲存格代表尚未評分，回傳 None
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_ascii_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `null`、`""` 與缺欄位一律視為未評分
fn deserialize_optional_grade<'de, D>(deserializer: D) -> Result<Option<Grade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Grade::parse))
}

/// Term a course was taken in, e.g. `Spring 2022`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub session: String,
    pub year: String,
}

impl Term {
    pub fn new(session: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            year: year.into(),
        }
    }

    /// Both cells must be present for a row to carry its own term.
    pub fn from_cells(session: &str, year: &str) -> Option<Self> {
        let session = session.trim();
        let year = year.trim();
        if session.is_empty() || year.is_empty() {
            None
        } else {
            Some(Self::new(session, year))
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.session, self.year)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.session, self.year)
    }
}

/// Extra columns only the semester table carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionInfo {
    pub section: String,
    pub faculty_code: String,
    pub faculty_name: String,
    pub credits_counted: f64,
    pub credits_passed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub title: String,
    pub credits: f64,
    #[serde(default, deserialize_with = "deserialize_optional_grade")]
    pub grade: Option<Grade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionInfo>,
}

impl CourseRecord {
    pub fn new(code: impl Into<String>, title: impl Into<String>, credits: f64) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            credits: sanitize_credits(credits),
            grade: None,
            term: None,
            section: None,
        }
    }

    pub fn with_grade(mut self, grade: &str) -> Self {
        self.grade = Grade::parse(grade);
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.term = Some(term);
        self
    }

    pub fn with_section(mut self, section: SectionInfo) -> Self {
        self.section = Some(section);
        self
    }

    /// 欄位是公開的，聚合時一律經過這裡再清理一次
    pub fn effective_credits(&self) -> f64 {
        sanitize_credits(self.credits)
    }
}

/// Negative, NaN and infinite credit values count as zero.
pub fn sanitize_credits(credits: f64) -> f64 {
    if credits.is_finite() && credits > 0.0 {
        credits
    } else {
        0.0
    }
}

/// Parses a scraped credit cell. Anything unparseable becomes `0.0`.
///
/// Accepts a leading numeric prefix the way browsers' `parseFloat` does, so
/// `"3.0 cr"` reads as `3.0`.
pub fn parse_credits(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return sanitize_credits(value);
    }

    let mut seen_dot = false;
    let prefix: String = trimmed
        .chars()
        .take_while(|c| {
            if c.is_ascii_digit() {
                true
            } else if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                false
            }
        })
        .collect();

    prefix.parse::<f64>().map(sanitize_credits).unwrap_or(0.0)
}

/// 假設情境的單筆覆寫：`None` 表示沿用原值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDelta {
    pub code: String,
    #[serde(default, deserialize_with = "deserialize_optional_grade")]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub credits: Option<f64>,
}

impl GradeDelta {
    pub fn grade(code: impl Into<String>, grade: &str) -> Self {
        Self {
            code: code.into(),
            grade: Grade::parse(grade),
            credits: None,
        }
    }

    pub fn credits(code: impl Into<String>, credits: f64) -> Self {
        Self {
            code: code.into(),
            grade: None,
            credits: Some(credits),
        }
    }

    pub fn with_credits(mut self, credits: f64) -> Self {
        self.credits = Some(credits);
        self
    }
}

impl FromStr for GradeDelta {
    type Err = LedgerError;

    /// `CODE=GRADE`, `CODE=GRADE:CREDITS` or `CODE=:CREDITS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LedgerError::InvalidConfigValueError {
            field: "what_if".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (code, rest) = s
            .split_once('=')
            .ok_or_else(|| invalid("expected CODE=GRADE[:CREDITS]"))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(invalid("course code is empty"));
        }

        let (grade, credits) = match rest.split_once(':') {
            Some((grade, credits)) => {
                let credits: f64 = credits
                    .trim()
                    .parse()
                    .map_err(|_| invalid("credits must be a number"))?;
                if !credits.is_finite() || credits < 0.0 {
                    return Err(invalid("credits must be non-negative"));
                }
                (grade, Some(credits))
            }
            None => (rest, None),
        };

        let grade = Grade::parse(grade);
        if grade.is_none() && credits.is_none() {
            return Err(invalid("nothing to override"));
        }

        Ok(Self {
            code: code.to_string(),
            grade,
            credits,
        })
    }
}

/// Everything the grade-history page lists, table by table, in page order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub waivers: Vec<CourseRecord>,
    pub transfers: Vec<CourseRecord>,
    pub semesters: Vec<CourseRecord>,
}

impl Transcript {
    pub fn course_count(&self) -> usize {
        self.waivers.len() + self.transfers.len() + self.semesters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.course_count() == 0
    }
}
