use crate::core::gpa::{compute_attempted_credits, compute_completed_credits, compute_gpa, Gpa};
use crate::core::progression::{
    grade_distribution, group_by_term, GradeCount, ProgressionSeries, ProgressionStats, TermGroup,
};
use crate::core::whatif::{RecordStatus, WhatIfComparison, WorkingLedger};
use crate::domain::model::{CourseRecord, Transcript};
use crate::domain::scale::GradeScale;
use crate::utils::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overview figures for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TranscriptSummary {
    pub cgpa: Gpa,
    pub attempted_credits: f64,
    pub completed_credits: f64,
    pub waiver_credits: f64,
    pub transfer_credits: f64,
    /// completed + waived
    pub total_credits: f64,
}

impl TranscriptSummary {
    pub fn compute(semesters: &[CourseRecord], transcript: &Transcript, scale: &GradeScale) -> Self {
        let completed_credits = compute_completed_credits(semesters, scale);
        let waiver_credits = compute_completed_credits(&transcript.waivers, scale);
        Self {
            cgpa: compute_gpa(semesters, scale),
            attempted_credits: compute_attempted_credits(semesters, scale),
            completed_credits,
            waiver_credits,
            // 轉學分頁面上沒有成績欄
            transfer_credits: transcript
                .transfers
                .iter()
                .map(CourseRecord::effective_credits)
                .sum(),
            total_credits: completed_credits + waiver_credits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    pub groups: Vec<TermGroup>,
    pub series: ProgressionSeries,
    pub stats: Option<ProgressionStats>,
}

impl Progression {
    pub fn compute(records: &[CourseRecord], scale: &GradeScale) -> Self {
        let groups = group_by_term(records, scale);
        let series = ProgressionSeries::from_groups(&groups);
        let stats = ProgressionStats::from_series(&series);
        Self {
            groups,
            series,
            stats,
        }
    }
}

/// One line of the exported course table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRow {
    pub code: String,
    pub title: String,
    pub term: String,
    pub credits: f64,
    pub grade: String,
    pub points: Option<f64>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfReport {
    pub comparison: WhatIfComparison,
    pub badge: Option<String>,
    pub summary: TranscriptSummary,
    pub changed_courses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub generated_at: DateTime<Utc>,
    pub summary: TranscriptSummary,
    pub what_if: Option<WhatIfReport>,
    pub progression: Progression,
    pub distribution: Vec<GradeCount>,
    pub courses: Vec<CourseRow>,
}

impl GradeReport {
    /// Baseline figures come from the ledger's baseline; the what-if section
    /// is present only when the working copy differs from it.
    pub fn build(transcript: &Transcript, ledger: &WorkingLedger, scale: &GradeScale) -> Self {
        let baseline = ledger.baseline().records();
        let statuses = ledger.statuses();

        let what_if = ledger.is_modified().then(|| {
            let comparison = ledger.compare(scale);
            WhatIfReport {
                badge: comparison.badge(),
                comparison,
                summary: TranscriptSummary::compute(ledger.records(), transcript, scale),
                changed_courses: statuses
                    .iter()
                    .filter(|s| **s != RecordStatus::Unchanged)
                    .count(),
            }
        });

        // 課程表沿用前一列的學期（與分組規則一致）
        let mut last_term = String::new();
        let courses = ledger
            .records()
            .iter()
            .zip(statuses)
            .map(|(record, status)| {
                if let Some(term) = &record.term {
                    last_term = term.label();
                }
                CourseRow {
                    code: record.code.clone(),
                    title: record.title.clone(),
                    term: last_term.clone(),
                    credits: record.credits,
                    grade: record
                        .grade
                        .as_ref()
                        .map(|g| g.to_string())
                        .unwrap_or_default(),
                    points: record.grade.as_ref().and_then(|g| scale.points(g)),
                    status,
                }
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            summary: TranscriptSummary::compute(baseline, transcript, scale),
            what_if,
            progression: Progression::compute(baseline, scale),
            distribution: grade_distribution(baseline, scale),
            courses,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Course table as CSV, one row per working record.
    pub fn courses_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["code", "title", "term", "credits", "grade", "points", "status"])?;
        for row in &self.courses {
            let credits = row.credits.to_string();
            let points = row.points.map(|p| format!("{:.1}", p)).unwrap_or_default();
            writer.write_record([
                row.code.as_str(),
                row.title.as_str(),
                row.term.as_str(),
                credits.as_str(),
                row.grade.as_str(),
                points.as_str(),
                row.status.label(),
            ])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| LedgerError::IoError(e.into_error()))?;
        String::from_utf8(data).map_err(|e| LedgerError::StorageError {
            message: format!("CSV output is not UTF-8: {}", e),
        })
    }
}
