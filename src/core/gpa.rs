//! Credit-weighted GPA and credit totals.
//!
//! Sums are kept in full precision; rounding to two decimals happens only
//! when a value is displayed or exported.

use crate::domain::model::CourseRecord;
use crate::domain::scale::GradeScale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A GPA ratio, or `NoData` when no countable credits exist.
///
/// Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Gpa {
    Value(f64),
    NoData,
}

impl Gpa {
    pub fn from_totals(points: f64, credits: f64) -> Self {
        if credits > 0.0 {
            Gpa::Value(points / credits)
        } else {
            Gpa::NoData
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Gpa::Value(v) => Some(*v),
            Gpa::NoData => None,
        }
    }

    /// Two-decimal presentation value.
    pub fn rounded(&self) -> Option<f64> {
        self.value().map(round2)
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Gpa::NoData)
    }
}

impl From<Option<f64>> for Gpa {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Gpa::Value(v),
            _ => Gpa::NoData,
        }
    }
}

impl From<Gpa> for Option<f64> {
    fn from(gpa: Gpa) -> Self {
        gpa.value()
    }
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gpa::Value(v) => write!(f, "{:.2}", v),
            Gpa::NoData => f.write_str("—"),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running points/credits accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeTally {
    pub points: f64,
    pub credits: f64,
}

impl GradeTally {
    /// 只累計有成績、在表內且未被排除的課程；回傳是否有計入
    pub fn add(&mut self, record: &CourseRecord, scale: &GradeScale) -> bool {
        let Some(points) = record.grade.as_ref().and_then(|g| scale.points(g)) else {
            return false;
        };
        let credits = record.effective_credits();
        self.points += points * credits;
        self.credits += credits;
        true
    }

    pub fn merge(&mut self, other: &GradeTally) {
        self.points += other.points;
        self.credits += other.credits;
    }

    pub fn gpa(&self) -> Gpa {
        Gpa::from_totals(self.points, self.credits)
    }
}

pub fn compute_gpa<'a, I>(records: I, scale: &GradeScale) -> Gpa
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let mut tally = GradeTally::default();
    for record in records {
        tally.add(record, scale);
    }
    tally.gpa()
}

/// Credits of every graded, in-scale, non-excluded record, failing included.
pub fn compute_attempted_credits<'a, I>(records: I, scale: &GradeScale) -> f64
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    records
        .into_iter()
        .filter(|record| record.grade.as_ref().is_some_and(|g| scale.counts(g)))
        .map(CourseRecord::effective_credits)
        .sum()
}

/// Attempted credits minus failing grades.
pub fn compute_completed_credits<'a, I>(records: I, scale: &GradeScale) -> f64
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    records
        .into_iter()
        .filter(|record| {
            record
                .grade
                .as_ref()
                .is_some_and(|g| scale.counts(g) && !scale.is_failing(g))
        })
        .map(CourseRecord::effective_credits)
        .sum()
}
