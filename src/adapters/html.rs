//! Grade-history page scraping.
//!
//! The page lists three tables under `.hist-grades`: waived, transferred and
//! semester courses, in that order. Missing tables or cells never fail the
//! scrape; they come back empty.

use crate::domain::model::{parse_credits, CourseRecord, Grade, SectionInfo, Term, Transcript};
use scraper::{ElementRef, Html, Selector};

const TABLES: &str = ".hist-grades table";
const ROWS: &str = "tbody tr";
const CELLS: &str = "td";
const DIVIDER_CLASS: &str = "divider-td";

pub fn parse_grade_history(html: &str) -> Transcript {
    let document = Html::parse_document(html);

    let Ok(table_sel) = Selector::parse(TABLES) else {
        return Transcript::default();
    };
    let tables: Vec<ElementRef> = document.select(&table_sel).collect();
    tracing::debug!("Found {} grade-history tables", tables.len());

    let transcript = Transcript {
        waivers: tables.first().map(|t| parse_table(*t, waiver_row)).unwrap_or_default(),
        transfers: tables.get(1).map(|t| parse_table(*t, transfer_row)).unwrap_or_default(),
        semesters: tables.get(2).map(|t| parse_table(*t, semester_row)).unwrap_or_default(),
    };

    if tables.len() < 3 {
        tracing::warn!(
            "Expected 3 grade-history tables, found {}; missing tables are treated as empty",
            tables.len()
        );
    }

    transcript
}

fn parse_table(table: ElementRef, map_row: fn(&[String]) -> CourseRecord) -> Vec<CourseRecord> {
    let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse(ROWS), Selector::parse(CELLS)) else {
        return Vec::new();
    };

    table
        .select(&row_sel)
        .filter(|row| !row.value().classes().any(|c| c == DIVIDER_CLASS))
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            // 只有 <th> 的列（或空列）不是課程
            (!cells.is_empty()).then(|| map_row(&cells))
        })
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

// code | credits | title | grade
fn waiver_row(cells: &[String]) -> CourseRecord {
    let mut record = CourseRecord::new(
        cell(cells, 0),
        cell(cells, 2),
        parse_credits(cell(cells, 1)),
    );
    record.grade = Grade::parse(cell(cells, 3));
    record
}

// code | credits | title
fn transfer_row(cells: &[String]) -> CourseRecord {
    CourseRecord::new(cell(cells, 0), cell(cells, 2), parse_credits(cell(cells, 1)))
}

// session | year | code | section | faculty code | faculty name | credits | title | grade | counted | passed
fn semester_row(cells: &[String]) -> CourseRecord {
    let mut record = CourseRecord::new(
        cell(cells, 2),
        cell(cells, 7),
        parse_credits(cell(cells, 6)),
    );
    record.grade = Grade::parse(cell(cells, 8));
    record.term = Term::from_cells(cell(cells, 0), cell(cells, 1));
    record.section = Some(SectionInfo {
        section: cell(cells, 3).to_string(),
        faculty_code: cell(cells, 4).to_string(),
        faculty_name: cell(cells, 5).to_string(),
        credits_counted: parse_credits(cell(cells, 9)),
        credits_passed: parse_credits(cell(cells, 10)),
    });
    record
}
