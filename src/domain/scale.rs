use crate::domain::model::Grade;
use crate::utils::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of a grading table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleEntry {
    pub grade: String,
    pub points: f64,
}

/// Immutable grade-to-points table.
///
/// Excluded grades (withdrawal, incomplete) never contribute credits or
/// points, even when the table stores a placeholder value for them. Failing
/// grades count toward GPA and attempted credits but not completed credits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeScale {
    entries: Vec<ScaleEntry>,
    excluded: BTreeSet<String>,
    failing: BTreeSet<String>,
    max_points: f64,
}

impl GradeScale {
    pub fn builder() -> GradeScaleBuilder {
        GradeScaleBuilder::default()
    }

    /// 標準 4.0 制（W、I 以 0.0 佔位但不計分）
    pub fn standard() -> Self {
        Self {
            entries: [
                ("A", 4.0),
                ("A-", 3.7),
                ("B+", 3.3),
                ("B", 3.0),
                ("B-", 2.7),
                ("C+", 2.3),
                ("C", 2.0),
                ("C-", 1.7),
                ("D+", 1.3),
                ("D", 1.0),
                ("F", 0.0),
                ("I", 0.0),
                ("W", 0.0),
            ]
            .into_iter()
            .map(|(grade, points)| ScaleEntry {
                grade: grade.to_string(),
                points,
            })
            .collect(),
            excluded: ["I", "W"].into_iter().map(String::from).collect(),
            failing: ["F"].into_iter().map(String::from).collect(),
            max_points: 4.0,
        }
    }

    fn entry(&self, grade: &str) -> Option<&ScaleEntry> {
        self.entries.iter().find(|entry| entry.grade == grade)
    }

    /// Points for a grade that counts, `None` for excluded or unknown grades.
    pub fn points(&self, grade: &Grade) -> Option<f64> {
        if self.is_excluded(grade) {
            return None;
        }
        self.entry(grade.as_str()).map(|entry| entry.points)
    }

    /// Grade is in the table and not excluded.
    pub fn counts(&self, grade: &Grade) -> bool {
        self.points(grade).is_some()
    }

    pub fn contains(&self, grade: &Grade) -> bool {
        self.entry(grade.as_str()).is_some()
    }

    pub fn is_excluded(&self, grade: &Grade) -> bool {
        self.excluded.contains(grade.as_str())
    }

    pub fn is_failing(&self, grade: &Grade) -> bool {
        self.failing.contains(grade.as_str())
    }

    pub fn entries(&self) -> &[ScaleEntry] {
        &self.entries
    }

    /// Every grade a record may carry: table order, then excluded grades
    /// that have no table row.
    pub fn grades(&self) -> Vec<&str> {
        let mut grades: Vec<&str> = self.entries.iter().map(|e| e.grade.as_str()).collect();
        for grade in &self.excluded {
            if !grades.contains(&grade.as_str()) {
                grades.push(grade.as_str());
            }
        }
        grades
    }

    pub fn max_points(&self) -> f64 {
        self.max_points
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone)]
pub struct GradeScaleBuilder {
    entries: Vec<ScaleEntry>,
    excluded: Vec<String>,
    failing: Vec<String>,
    max_points: f64,
}

impl Default for GradeScaleBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            excluded: Vec::new(),
            failing: Vec::new(),
            max_points: 4.0,
        }
    }
}

impl GradeScaleBuilder {
    pub fn grade(mut self, grade: &str, points: f64) -> Self {
        self.entries.push(ScaleEntry {
            grade: grade.to_string(),
            points,
        });
        self
    }

    pub fn exclude(mut self, grade: &str) -> Self {
        self.excluded.push(grade.to_string());
        self
    }

    pub fn failing(mut self, grade: &str) -> Self {
        self.failing.push(grade.to_string());
        self
    }

    pub fn max_points(mut self, max_points: f64) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn build(self) -> Result<GradeScale> {
        let scale_error = |message: String| LedgerError::ScaleError { message };

        if !self.max_points.is_finite() || self.max_points <= 0.0 {
            return Err(scale_error(format!(
                "max_points must be positive, got {}",
                self.max_points
            )));
        }
        if self.entries.is_empty() {
            return Err(scale_error("scale has no grades".to_string()));
        }

        let mut entries: Vec<ScaleEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let grade = normalize(&entry.grade)
                .ok_or_else(|| scale_error("grade name cannot be blank".to_string()))?;
            if !entry.points.is_finite() || entry.points < 0.0 || entry.points > self.max_points {
                return Err(scale_error(format!(
                    "points for {} must be between 0 and {}, got {}",
                    grade, self.max_points, entry.points
                )));
            }
            if entries.iter().any(|e| e.grade == grade) {
                return Err(scale_error(format!("grade {} is listed twice", grade)));
            }
            entries.push(ScaleEntry {
                grade,
                points: entry.points,
            });
        }

        let excluded: BTreeSet<String> = self.excluded.iter().filter_map(|g| normalize(g)).collect();
        let failing: BTreeSet<String> = self.failing.iter().filter_map(|g| normalize(g)).collect();

        for grade in &failing {
            if !entries.iter().any(|e| &e.grade == grade) {
                return Err(scale_error(format!(
                    "failing grade {} has no points entry",
                    grade
                )));
            }
            if excluded.contains(grade) {
                return Err(scale_error(format!(
                    "grade {} cannot be both failing and excluded",
                    grade
                )));
            }
        }

        Ok(GradeScale {
            entries,
            excluded,
            failing,
            max_points: self.max_points,
        })
    }
}

fn normalize(grade: &str) -> Option<String> {
    Grade::parse(grade).map(|g| g.as_str().to_string())
}
