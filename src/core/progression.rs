//! Per-term grouping and the CGPA-over-time series.

use crate::core::gpa::{round2, Gpa, GradeTally};
use crate::domain::model::{CourseRecord, Term};
use crate::domain::scale::GradeScale;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKey {
    Known(Term),
    Unknown,
}

impl TermKey {
    pub fn label(&self) -> String {
        match self {
            TermKey::Known(term) => term.label(),
            TermKey::Unknown => "Unknown".to_string(),
        }
    }
}

impl Serialize for TermKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermGroup {
    pub term: TermKey,
    #[serde(skip_serializing)]
    pub records: Vec<CourseRecord>,
    pub course_count: usize,
    pub term_gpa: Gpa,
    pub term_credits: f64,
    pub cumulative_gpa: Gpa,
    pub cumulative_credits: f64,
}

/// Groups records by term in first-seen order.
///
/// A record without a term belongs to the last term seen before it; leading
/// records with no term at all go to `Unknown`. Each group gets its own GPA
/// plus the running GPA over every group up to and including it.
pub fn group_by_term(records: &[CourseRecord], scale: &GradeScale) -> Vec<TermGroup> {
    let mut buckets: Vec<(TermKey, Vec<CourseRecord>)> = Vec::new();
    let mut current = TermKey::Unknown;

    for record in records {
        if let Some(term) = &record.term {
            current = TermKey::Known(term.clone());
        }
        match buckets.iter_mut().find(|(key, _)| *key == current) {
            Some((_, members)) => members.push(record.clone()),
            None => buckets.push((current.clone(), vec![record.clone()])),
        }
    }

    let mut cumulative = GradeTally::default();
    buckets
        .into_iter()
        .map(|(term, members)| {
            let mut tally = GradeTally::default();
            for record in &members {
                tally.add(record, scale);
            }
            cumulative.merge(&tally);
            TermGroup {
                term,
                course_count: members.len(),
                records: members,
                term_gpa: tally.gpa(),
                term_credits: tally.credits,
                cumulative_gpa: cumulative.gpa(),
                cumulative_credits: cumulative.credits,
            }
        })
        .collect()
}

/// Chart-ready parallel arrays, rounded for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgressionSeries {
    pub labels: Vec<String>,
    pub cumulative_gpa: Vec<Option<f64>>,
    pub term_gpa: Vec<Option<f64>>,
    pub cumulative_credits: Vec<f64>,
    pub term_credits: Vec<f64>,
    pub course_counts: Vec<usize>,
}

impl ProgressionSeries {
    pub fn from_groups(groups: &[TermGroup]) -> Self {
        let mut series = Self::default();
        for group in groups {
            series.labels.push(group.term.label());
            series.cumulative_gpa.push(group.cumulative_gpa.rounded());
            series.term_gpa.push(group.term_gpa.rounded());
            series.cumulative_credits.push(group.cumulative_credits);
            series.term_credits.push(group.term_credits);
            series.course_counts.push(group.course_count);
        }
        series
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressionStats {
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
}

impl ProgressionStats {
    /// Over the defined points of the cumulative series.
    pub fn from_series(series: &ProgressionSeries) -> Option<Self> {
        let values: Vec<f64> = series.cumulative_gpa.iter().flatten().copied().collect();
        if values.is_empty() {
            return None;
        }
        let highest = values.iter().copied().fold(f64::MIN, f64::max);
        let lowest = values.iter().copied().fold(f64::MAX, f64::min);
        let average = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self {
            highest,
            lowest,
            average: round2(average),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub grade: String,
    pub count: usize,
}

/// Record count per grade, in scale order. Grades outside the scale are
/// not listed.
pub fn grade_distribution(records: &[CourseRecord], scale: &GradeScale) -> Vec<GradeCount> {
    scale
        .grades()
        .into_iter()
        .map(|grade| GradeCount {
            grade: grade.to_string(),
            count: records
                .iter()
                .filter(|r| r.grade.as_ref().is_some_and(|g| g.as_str() == grade))
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, credits: f64, grade: &str, term: Option<(&str, &str)>) -> CourseRecord {
        let record = CourseRecord::new(code, code, credits).with_grade(grade);
        match term {
            Some((session, year)) => record.with_term(Term::new(session, year)),
            None => record,
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let scale = GradeScale::standard();
        let records = vec![
            course("C1", 3.0, "A", Some(("Spring", "2022"))),
            course("C2", 3.0, "B", Some(("Spring", "2022"))),
            course("C3", 3.0, "C", Some(("Fall", "2022"))),
            course("C4", 3.0, "A", Some(("Spring", "2022"))),
        ];

        let groups = group_by_term(&records, &scale);
        let labels: Vec<String> = groups.iter().map(|g| g.term.label()).collect();
        assert_eq!(labels, vec!["Spring 2022", "Fall 2022"]);

        assert_eq!(groups[0].course_count, 3);
        assert_eq!(groups[0].term_credits, 9.0);
        // Fall 2022 is processed last, so its running total covers all four records
        assert_eq!(groups[1].cumulative_credits, 12.0);
        assert_eq!(groups[1].cumulative_gpa, Gpa::Value((12.0 + 9.0 + 6.0 + 12.0) / 12.0));
        assert_eq!(groups[1].term_gpa, Gpa::Value(2.0));
    }

    #[test]
    fn test_forward_fill_and_unknown_bucket() {
        let scale = GradeScale::standard();
        let records = vec![
            course("L1", 3.0, "B", None),
            course("C1", 3.0, "A", Some(("Summer", "2021"))),
            course("C2", 3.0, "C", None),
            course("C3", 3.0, "A", Some(("Fall", "2021"))),
            course("C4", 3.0, "W", None),
        ];

        let groups = group_by_term(&records, &scale);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].term, TermKey::Unknown);
        assert_eq!(groups[0].course_count, 1);
        assert_eq!(groups[1].term.label(), "Summer 2021");
        assert_eq!(groups[1].course_count, 2);
        assert_eq!(groups[1].term_gpa, Gpa::Value(3.0));
        assert_eq!(groups[2].course_count, 2);
        // W contributes nothing
        assert_eq!(groups[2].term_credits, 3.0);
        assert_eq!(groups[2].cumulative_credits, 12.0);
    }

    #[test]
    fn test_term_without_countable_courses() {
        let scale = GradeScale::standard();
        let records = vec![
            course("C1", 3.0, "A", Some(("Spring", "2023"))),
            CourseRecord::new("C2", "In progress", 3.0).with_term(Term::new("Fall", "2023")),
        ];

        let groups = group_by_term(&records, &scale);
        assert!(groups[1].term_gpa.is_no_data());
        assert_eq!(groups[1].cumulative_gpa, Gpa::Value(4.0));

        let series = ProgressionSeries::from_groups(&groups);
        assert_eq!(series.term_gpa, vec![Some(4.0), None]);
        assert_eq!(series.cumulative_gpa, vec![Some(4.0), Some(4.0)]);
    }

    #[test]
    fn test_series_and_stats() {
        let scale = GradeScale::standard();
        let records = vec![
            course("C1", 3.0, "A", Some(("Spring", "2022"))),
            course("C2", 3.0, "C", Some(("Fall", "2022"))),
            course("C3", 3.0, "B", Some(("Spring", "2023"))),
        ];
        let series = ProgressionSeries::from_groups(&group_by_term(&records, &scale));
        assert_eq!(series.labels, vec!["Spring 2022", "Fall 2022", "Spring 2023"]);
        assert_eq!(series.cumulative_gpa, vec![Some(4.0), Some(3.0), Some(3.0)]);
        assert_eq!(series.cumulative_credits, vec![3.0, 6.0, 9.0]);

        let stats = ProgressionStats::from_series(&series).unwrap();
        assert_eq!(stats.highest, 4.0);
        assert_eq!(stats.lowest, 3.0);
        assert_eq!(stats.average, 3.33);

        assert!(ProgressionStats::from_series(&ProgressionSeries::default()).is_none());
    }

    #[test]
    fn test_grade_distribution_in_scale_order() {
        let scale = GradeScale::standard();
        let records = vec![
            course("C1", 3.0, "A", None),
            course("C2", 3.0, "A", None),
            course("C3", 3.0, "W", None),
            course("C4", 3.0, "Q", None),
            CourseRecord::new("C5", "Ungraded", 3.0),
        ];
        let distribution = grade_distribution(&records, &scale);
        assert_eq!(distribution.len(), scale.grades().len());
        assert_eq!(distribution[0], GradeCount { grade: "A".to_string(), count: 2 });
        let withdrawn = distribution.iter().find(|c| c.grade == "W").unwrap();
        assert_eq!(withdrawn.count, 1);
        assert_eq!(distribution.iter().map(|c| c.count).sum::<usize>(), 3);
    }
}
