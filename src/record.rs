// ABOUTME: Normalization of raw spreadsheet rows into problem records
// ABOUTME: Typed parse-with-default per column, blank-row detection and dedup by row id

use std::collections::BTreeMap;

/// Number of cells expected per row (columns A through K).
pub const ROW_WIDTH: usize = 11;

pub const DEFAULT_PROBLEM_NAME: &str = "Unknown Problem";
pub const DEFAULT_PROBLEM_TYPE: &str = "General";
pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_LINK: &str = "https://www.google.com";
pub const DEFAULT_COMPLEXITY: &str = "Unknown";
pub const DEFAULT_EXPLANATION: &str = "No explanation provided";

/// One normalized spreadsheet row, keyed by the row it came from.
///
/// Every field carries a value; blank cells have already been replaced by
/// their column fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRecord {
    pub spreadsheet_row_id: i32,
    pub problem_name: String,
    pub problem_type: String,
    pub difficulty_level: String,
    pub problem_link: String,
    pub problem_html_link: String,
    pub completion_time_minutes: i32,
    pub solution_link: String,
    pub solution_runtime_complexity: String,
    pub solution_space_complexity: String,
    pub complexity_explanation: String,
    pub found_optimal_solution: bool,
}

impl ProblemRecord {
    /// Build a record from the cells of one row.
    ///
    /// Short rows are padded with empty cells; cells beyond [`ROW_WIDTH`] are
    /// ignored. Never fails.
    pub fn from_cells(spreadsheet_row_id: i32, cells: &[String]) -> Self {
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        Self {
            spreadsheet_row_id,
            problem_name: text_or(cell(0), DEFAULT_PROBLEM_NAME),
            problem_type: text_or(cell(1), DEFAULT_PROBLEM_TYPE),
            difficulty_level: text_or(cell(2), DEFAULT_DIFFICULTY),
            problem_link: text_or(cell(3), DEFAULT_LINK),
            problem_html_link: text_or(cell(4), DEFAULT_LINK),
            completion_time_minutes: minutes_or_zero(cell(5)),
            solution_link: text_or(cell(6), DEFAULT_LINK),
            solution_runtime_complexity: text_or(cell(7), DEFAULT_COMPLEXITY),
            solution_space_complexity: text_or(cell(8), DEFAULT_COMPLEXITY),
            complexity_explanation: text_or(cell(9), DEFAULT_EXPLANATION),
            found_optimal_solution: flag_or_false(cell(10)),
        }
    }
}

/// Returns true if the cell is empty or whitespace-only.
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Returns true if the row has no cells or only blank ones.
pub fn is_blank_row(cells: &[String]) -> bool {
    cells.iter().all(|c| is_blank(c))
}

/// Trimmed cell text, or `fallback` when the cell is blank.
pub fn text_or(cell: &str, fallback: &str) -> String {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a non-negative minute count; anything else is 0.
///
/// Only plain ASCII digits are accepted (after trimming), so `"-5"`, `"1.5"`
/// and `"abc"` all normalize to 0, as does a value too large for the column.
pub fn minutes_or_zero(cell: &str) -> i32 {
    let trimmed = cell.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    trimmed.parse::<i32>().unwrap_or(0)
}

/// Interpret a checkbox-like cell; anything unrecognized is false.
pub fn flag_or_false(cell: &str) -> bool {
    matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

/// Collapse records sharing a `spreadsheet_row_id`, keeping the last one seen.
///
/// The result is ordered by row id.
pub fn dedup_by_row_id(records: Vec<ProblemRecord>) -> Vec<ProblemRecord> {
    let mut by_row: BTreeMap<i32, ProblemRecord> = BTreeMap::new();
    for record in records {
        by_row.insert(record.spreadsheet_row_id, record);
    }
    by_row.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_cells_applies_fallbacks() {
        let cells = row(&["", "Arrays", "", "", "", "abc", "", "", "", ""]);
        let record = ProblemRecord::from_cells(7, &cells);

        assert_eq!(record.spreadsheet_row_id, 7);
        assert_eq!(record.problem_name, "Unknown Problem");
        assert_eq!(record.problem_type, "Arrays");
        assert_eq!(record.difficulty_level, "medium");
        assert_eq!(record.problem_link, "https://www.google.com");
        assert_eq!(record.problem_html_link, "https://www.google.com");
        assert_eq!(record.completion_time_minutes, 0);
        assert_eq!(record.solution_link, "https://www.google.com");
        assert_eq!(record.solution_runtime_complexity, "Unknown");
        assert_eq!(record.solution_space_complexity, "Unknown");
        assert_eq!(record.complexity_explanation, "No explanation provided");
        assert!(!record.found_optimal_solution);
    }

    #[test]
    fn test_from_cells_full_row() {
        let cells = row(&[
            "Two Sum",
            "Hash Map",
            "easy",
            "https://leetcode.com/problems/two-sum",
            "https://example.com/two-sum.html",
            "15",
            "https://example.com/solution",
            "O(n)",
            "O(n)",
            "Single pass with a lookup table",
            "TRUE",
        ]);
        let record = ProblemRecord::from_cells(2, &cells);

        assert_eq!(record.problem_name, "Two Sum");
        assert_eq!(record.difficulty_level, "easy");
        assert_eq!(record.completion_time_minutes, 15);
        assert_eq!(record.complexity_explanation, "Single pass with a lookup table");
        assert!(record.found_optimal_solution);
    }

    #[test]
    fn test_from_cells_ignores_extra_cells() {
        let mut cells = row(&["A", "B", "C", "D", "E", "1", "G", "H", "I", "J", "yes"]);
        cells.push("overflow".to_string());
        let record = ProblemRecord::from_cells(3, &cells);
        assert_eq!(record.problem_name, "A");
        assert!(record.found_optimal_solution);
    }

    #[test]
    fn test_from_cells_short_row() {
        let record = ProblemRecord::from_cells(4, &row(&["Only a name"]));
        assert_eq!(record.problem_name, "Only a name");
        assert_eq!(record.problem_type, "General");
        assert_eq!(record.completion_time_minutes, 0);
    }

    #[test]
    fn test_minutes_or_zero() {
        assert_eq!(minutes_or_zero("42"), 42);
        assert_eq!(minutes_or_zero(" 42 "), 42);
        assert_eq!(minutes_or_zero("0"), 0);
        assert_eq!(minutes_or_zero("-5"), 0);
        assert_eq!(minutes_or_zero("+5"), 0);
        assert_eq!(minutes_or_zero("1.5"), 0);
        assert_eq!(minutes_or_zero("abc"), 0);
        assert_eq!(minutes_or_zero(""), 0);
        assert_eq!(minutes_or_zero("99999999999"), 0);
    }

    #[test]
    fn test_text_or_treats_whitespace_as_blank() {
        assert_eq!(text_or("   ", "fallback"), "fallback");
        assert_eq!(text_or("  value ", "fallback"), "value");
    }

    #[test]
    fn test_flag_or_false() {
        assert!(flag_or_false("TRUE"));
        assert!(flag_or_false("Yes"));
        assert!(flag_or_false("1"));
        assert!(!flag_or_false("FALSE"));
        assert!(!flag_or_false("0"));
        assert!(!flag_or_false(""));
        assert!(!flag_or_false("maybe"));
    }

    #[test]
    fn test_is_blank_row() {
        assert!(is_blank_row(&[]));
        assert!(is_blank_row(&row(&["", "  ", "\t"])));
        assert!(!is_blank_row(&row(&["", "x"])));
    }

    #[test]
    fn test_dedup_keeps_last() {
        let first = ProblemRecord::from_cells(5, &row(&["first"]));
        let other = ProblemRecord::from_cells(3, &row(&["other"]));
        let second = ProblemRecord::from_cells(5, &row(&["second"]));

        let deduped = dedup_by_row_id(vec![first, other, second]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].spreadsheet_row_id, 3);
        assert_eq!(deduped[1].spreadsheet_row_id, 5);
        assert_eq!(deduped[1].problem_name, "second");
    }
}
