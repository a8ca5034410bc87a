//! Catalogue cleaning pass: per-column normalizers with a configurable
//! error policy.
//!
//! Two historical workflows are served by the same pipeline. The
//! ISBN-only pass validates nothing but the identifier and drops rows
//! that fail; the full-record pass also normalizes the descriptive
//! columns and keeps failing rows with their best-effort values. Which
//! behavior applies is a policy choice, selected per run.

use std::path::Path;

use crate::domain::PipelineError;
use crate::isbn;
use crate::table::Table;
use crate::text;

/// Which columns a cleaning run validates and emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    /// Only the ISBN column; output schema is `[ISBN]`.
    IsbnOnly,
    /// The five catalogue columns, emitted in fixed order.
    Full,
}

/// What happens to a row that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Omit the row from the output (it is still logged).
    Drop,
    /// Keep the row with whatever partial values were computed.
    Keep,
}

impl CleanMode {
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            CleanMode::IsbnOnly => &["ISBN"],
            CleanMode::Full => &["ISBN", "TITLE", "AUTHOR", "YEAR", "PUBLISHER"],
        }
    }

    /// Historical default: the ISBN-only workflow dropped bad rows, the
    /// full-record workflow kept them alongside the error log.
    pub fn default_policy(&self) -> ErrorPolicy {
        match self {
            CleanMode::IsbnOnly => ErrorPolicy::Drop,
            CleanMode::Full => ErrorPolicy::Keep,
        }
    }
}

/// Validation failures for one input row.
///
/// `row_number` is 1-based and counts the header as row 1, so the first
/// data row reports as row 2.
#[derive(Debug, Clone)]
pub struct RowError {
    pub row_number: usize,
    pub reasons: Vec<String>,
}

#[derive(Debug)]
pub struct CleanOutcome {
    pub table: Table,
    pub errors: Vec<RowError>,
    pub kept: usize,
    pub dropped: usize,
}

/// Run a cleaning pass over `input`.
///
/// A missing required column is a fatal error; everything that can go
/// wrong per row is collected into the outcome instead.
pub fn clean_table(
    input: &Table,
    mode: CleanMode,
    policy: ErrorPolicy,
) -> Result<CleanOutcome, PipelineError> {
    input.require_columns(mode.required_columns())?;

    // require_columns guarantees these resolve
    let indices: Vec<usize> = mode
        .required_columns()
        .iter()
        .filter_map(|c| input.column_index(c))
        .collect();

    let mut output = Table::new(
        mode.required_columns()
            .iter()
            .map(|c| c.to_string())
            .collect(),
    );
    let mut errors = Vec::new();
    let mut dropped = 0usize;

    for (index, row) in input.rows().enumerate() {
        let row_number = index + 2;
        let mut reasons = Vec::new();

        let normalized = isbn::normalize(Some(&row[indices[0]]));
        if let Some(reason) = &normalized.error {
            reasons.push(reason.clone());
        }

        let out_row = match mode {
            CleanMode::IsbnOnly => vec![normalized.value],
            CleanMode::Full => {
                // column order matches required_columns:
                // ISBN, TITLE, AUTHOR, YEAR, PUBLISHER
                let (year, year_error) = text::normalize_year(&row[indices[3]]);
                if let Some(reason) = year_error {
                    reasons.push(reason);
                }

                vec![
                    normalized.value,
                    text::title_case(&row[indices[1]]),
                    text::title_case(&row[indices[2]]),
                    year,
                    text::title_case(&row[indices[4]]),
                ]
            }
        };

        if reasons.is_empty() {
            output.push_row(out_row);
        } else {
            errors.push(RowError {
                row_number,
                reasons,
            });
            match policy {
                ErrorPolicy::Drop => dropped += 1,
                ErrorPolicy::Keep => output.push_row(out_row),
            }
        }
    }

    let kept = output.len();
    tracing::info!(
        "Cleaning complete: {} rows kept, {} dropped, {} with errors",
        kept,
        dropped,
        errors.len()
    );

    Ok(CleanOutcome {
        table: output,
        errors,
        kept,
        dropped,
    })
}

/// Write the row-level error log.
///
/// One line per failed row, or the literal "No errors found" marker so an
/// operator can tell a clean run from a log that was never written.
pub fn write_error_log<P: AsRef<Path>>(path: P, errors: &[RowError]) -> Result<(), PipelineError> {
    let content = if errors.is_empty() {
        "No errors found\n".to_string()
    } else {
        let mut lines: Vec<String> = errors
            .iter()
            .map(|e| format!("Row {}: {}", e.row_number, e.reasons.join(", ")))
            .collect();
        lines.push(String::new());
        lines.join("\n")
    };

    std::fs::write(path.as_ref(), content).map_err(|e| {
        PipelineError::Io(format!(
            "Cannot write error log '{}': {}",
            path.as_ref().display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isbn_only_input() -> Table {
        Table::from_csv_reader(
            "ISBN\n0306406152\nbogus\n9780306406157\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn isbn_only_drop_policy_omits_bad_rows() {
        let outcome = clean_table(&isbn_only_input(), CleanMode::IsbnOnly, ErrorPolicy::Drop).unwrap();

        assert_eq!(outcome.kept, 2);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.table.get(0, 0), "9780306406157");
        assert_eq!(outcome.table.get(1, 0), "9780306406157");

        // header counts as row 1, so the bad second data row is row 3
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].row_number, 3);
        assert_eq!(outcome.errors[0].reasons, vec!["Invalid ISBN format"]);
    }

    #[test]
    fn keep_policy_retains_best_effort_values() {
        let outcome = clean_table(&isbn_only_input(), CleanMode::IsbnOnly, ErrorPolicy::Keep).unwrap();

        assert_eq!(outcome.kept, 3);
        assert_eq!(outcome.dropped, 0);
        // the cleaned-but-invalid remnant is preserved for diagnostics
        assert_eq!(outcome.table.get(1, 0), "");
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn full_mode_normalizes_descriptive_columns() {
        let input = Table::from_csv_reader(
            "ISBN,TITLE,AUTHOR,YEAR,PUBLISHER\n0306406152,the  dispossessed,ursula le guin,1974.0,harper & row\n"
                .as_bytes(),
        )
        .unwrap();

        let outcome = clean_table(&input, CleanMode::Full, ErrorPolicy::Keep).unwrap();
        assert!(outcome.errors.is_empty());

        let headers: Vec<_> = outcome.table.headers().to_vec();
        assert_eq!(headers, vec!["ISBN", "TITLE", "AUTHOR", "YEAR", "PUBLISHER"]);
        assert_eq!(outcome.table.get(0, 0), "9780306406157");
        assert_eq!(outcome.table.get(0, 1), "The Dispossessed");
        assert_eq!(outcome.table.get(0, 2), "Ursula Le Guin");
        assert_eq!(outcome.table.get(0, 3), "1974");
        assert_eq!(outcome.table.get(0, 4), "Harper & Row");
    }

    #[test]
    fn full_mode_collects_multiple_reasons_per_row() {
        let input = Table::from_csv_reader(
            "ISBN,TITLE,AUTHOR,YEAR,PUBLISHER\nbogus,t,a,notayear,p\n".as_bytes(),
        )
        .unwrap();

        let outcome = clean_table(&input, CleanMode::Full, ErrorPolicy::Keep).unwrap();
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].reasons,
            vec!["Invalid ISBN format", "Invalid year"]
        );
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let input = Table::from_csv_reader("TITLE\nDune\n".as_bytes()).unwrap();
        let err = clean_table(&input, CleanMode::IsbnOnly, ErrorPolicy::Drop).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }

    #[test]
    fn empty_isbn_cell_is_reported_missing() {
        let input = Table::from_csv_reader("ISBN\n\u{20}\n".as_bytes()).unwrap();
        // a cell of one space strips to nothing but was not empty
        let outcome = clean_table(&input, CleanMode::IsbnOnly, ErrorPolicy::Drop).unwrap();
        assert_eq!(outcome.errors[0].reasons, vec!["Invalid ISBN format"]);

        let input = Table::from_csv_reader("ISBN,TITLE\n,x\n".as_bytes()).unwrap();
        let outcome = clean_table(&input, CleanMode::IsbnOnly, ErrorPolicy::Drop).unwrap();
        assert_eq!(outcome.errors[0].reasons, vec!["Missing ISBN"]);
    }
}
