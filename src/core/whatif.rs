//! What-if overlays over a read-only baseline ledger.

use crate::core::gpa::{compute_gpa, round2, Gpa};
use crate::domain::model::{sanitize_credits, CourseRecord, Grade, GradeDelta};
use crate::domain::scale::GradeScale;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

/// The record set as first scraped. Only shared access is exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    records: Arc<[CourseRecord]>,
}

impl Baseline {
    pub fn capture(records: Vec<CourseRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn gpa(&self, scale: &GradeScale) -> Gpa {
        compute_gpa(self.records.iter(), scale)
    }
}

impl Deref for Baseline {
    type Target = [CourseRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

fn apply_delta(record: &mut CourseRecord, delta: &GradeDelta) {
    if let Some(grade) = &delta.grade {
        record.grade = Some(grade.clone());
    }
    if let Some(credits) = delta.credits {
        record.credits = sanitize_credits(credits);
    }
}

/// Copies `baseline` and overrides the first record matching each delta's
/// code. Deltas with no matching code are ignored.
pub fn apply_what_if(baseline: &[CourseRecord], deltas: &[GradeDelta]) -> Vec<CourseRecord> {
    let mut modified = baseline.to_vec();
    for delta in deltas {
        match modified.iter_mut().find(|r| r.code == delta.code) {
            Some(record) => apply_delta(record, delta),
            None => tracing::debug!("Ignoring what-if delta for unknown course {}", delta.code),
        }
    }
    modified
}

/// Saved entries are replayed as-is: a `None` grade clears the grade.
fn replay_delta(record: &mut CourseRecord, delta: &GradeDelta) {
    record.grade = delta.grade.clone();
    if let Some(credits) = delta.credits {
        record.credits = sanitize_credits(credits);
    }
}

/// Re-applies a persisted overlay to a freshly scraped baseline.
///
/// Delta `i` lands on record `i` when the codes agree; otherwise it falls
/// back to the first record with that code. Unlike `apply_what_if`, the
/// saved grade always replaces the scraped one.
pub fn merge_overlay(baseline: &[CourseRecord], overlay: &[GradeDelta]) -> Vec<CourseRecord> {
    let mut merged = baseline.to_vec();
    for (index, delta) in overlay.iter().enumerate() {
        let target = match merged.get(index) {
            Some(record) if record.code == delta.code => Some(index),
            _ => merged.iter().position(|r| r.code == delta.code),
        };
        match target {
            Some(i) => replay_delta(&mut merged[i], delta),
            None => tracing::debug!("Saved overlay entry {} has no matching course", delta.code),
        }
    }
    merged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    Unchanged,
    Modified {
        grade_changed: bool,
        credits_changed: bool,
    },
    Added,
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Unchanged => "unchanged",
            RecordStatus::Modified { .. } => "modified",
            RecordStatus::Added => "added",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Declined,
    Unchanged,
}

/// Baseline vs. what-if GPA, for the result line and its delta badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfComparison {
    pub baseline: Gpa,
    pub what_if: Gpa,
    pub delta: Option<f64>,
    pub trend: Trend,
}

impl WhatIfComparison {
    pub fn new(baseline: Gpa, what_if: Gpa) -> Self {
        let (delta, trend) = match (baseline.value(), what_if.value()) {
            (Some(before), Some(after)) => {
                // 以顯示值（兩位小數）判斷升降，避免出現 +0.00 的徽章
                let shown = round2(after) - round2(before);
                let trend = if round2(shown) > 0.0 {
                    Trend::Improved
                } else if round2(shown) < 0.0 {
                    Trend::Declined
                } else {
                    Trend::Unchanged
                };
                (Some(after - before), trend)
            }
            _ => (None, Trend::Unchanged),
        };
        Self {
            baseline,
            what_if,
            delta,
            trend,
        }
    }

    /// `+0.25` / `-0.10`, or `None` when nothing visibly changed.
    pub fn badge(&self) -> Option<String> {
        match (self.trend, self.baseline.rounded(), self.what_if.rounded()) {
            (Trend::Unchanged, _, _) => None,
            (_, Some(before), Some(after)) => Some(format!("{:+.2}", after - before)),
            _ => None,
        }
    }
}

/// A mutable copy of the baseline that the user edits.
///
/// Each working row remembers the baseline index it was copied from (`None`
/// for added rows), since course codes repeat on retakes.
#[derive(Debug, Clone)]
pub struct WorkingLedger {
    baseline: Baseline,
    records: Vec<CourseRecord>,
    origins: Vec<Option<usize>>,
}

impl WorkingLedger {
    pub fn new(baseline: Baseline) -> Self {
        let records = baseline.to_vec();
        Self::with_records(baseline, records)
    }

    pub fn from_overlay(baseline: Baseline, overlay: &[GradeDelta]) -> Self {
        let records = merge_overlay(&baseline, overlay);
        Self::with_records(baseline, records)
    }

    // records[i] must be derived from baseline[i]
    fn with_records(baseline: Baseline, records: Vec<CourseRecord>) -> Self {
        let origins = (0..records.len()).map(Some).collect();
        Self {
            baseline,
            records,
            origins,
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn set_grade(&mut self, index: usize, grade: Option<Grade>) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.grade = grade;
                true
            }
            None => false,
        }
    }

    pub fn set_credits(&mut self, index: usize, credits: f64) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.credits = sanitize_credits(credits);
                true
            }
            None => false,
        }
    }

    pub fn add_course(&mut self, mut record: CourseRecord) {
        record.credits = sanitize_credits(record.credits);
        self.records.push(record);
        self.origins.push(None);
    }

    pub fn remove_course(&mut self, index: usize) -> Option<CourseRecord> {
        if index >= self.records.len() {
            return None;
        }
        self.origins.remove(index);
        Some(self.records.remove(index))
    }

    pub fn apply(&mut self, deltas: &[GradeDelta]) {
        if deltas.is_empty() {
            return;
        }
        self.records = apply_what_if(&self.records, deltas);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.baseline.clone());
    }

    pub fn is_modified(&self) -> bool {
        self.records.as_slice() != self.baseline.records()
    }

    /// One status per working record, compared with the baseline record it
    /// was copied from.
    pub fn statuses(&self) -> Vec<RecordStatus> {
        self.records
            .iter()
            .zip(&self.origins)
            .map(|(record, origin)| match origin.and_then(|i| self.baseline.get(i)) {
                None => RecordStatus::Added,
                Some(original) => {
                    let grade_changed = original.grade != record.grade;
                    let credits_changed = original.credits != record.credits;
                    if grade_changed || credits_changed {
                        RecordStatus::Modified {
                            grade_changed,
                            credits_changed,
                        }
                    } else {
                        RecordStatus::Unchanged
                    }
                }
            })
            .collect()
    }

    pub fn gpa(&self, scale: &GradeScale) -> Gpa {
        compute_gpa(&self.records, scale)
    }

    pub fn compare(&self, scale: &GradeScale) -> WhatIfComparison {
        WhatIfComparison::new(self.baseline.gpa(scale), self.gpa(scale))
    }

    /// Full positional overlay, in the shape persistence expects.
    pub fn to_overlay(&self) -> Vec<GradeDelta> {
        self.records
            .iter()
            .map(|record| GradeDelta {
                code: record.code.clone(),
                grade: record.grade.clone(),
                credits: Some(record.credits),
            })
            .collect()
    }
}
