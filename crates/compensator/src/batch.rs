//! CSV batch processing.
//!
//! Rows are handled one at a time, in file order: approve, then bonus when the
//! amount is positive. Rejections are tallied and the batch continues; a
//! transport or decoding failure stops it.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::compensator::{ApprovalOutcome, BonusOutcome, Compensator, CompensatorError};

pub const REQUIRED_COLUMNS: [&str; 3] = ["worker_id", "assignment_id", "bonus"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("csv has no column \"{0}\"")]
    MissingColumn(String),

    #[error("Failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} (assignment {assignment_id}): {source}")]
    Row {
        row: usize,
        assignment_id: String,
        #[source]
        source: CompensatorError,
    },
}

/// One input row. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BonusRow {
    pub worker_id: String,
    pub assignment_id: String,
    /// Blank cells read as `None`.
    pub bonus: Option<f64>,
}

impl BonusRow {
    /// Amount to pay, rounded to cents; `None` unless finite and positive.
    pub fn payable_bonus(&self) -> Option<f64> {
        self.bonus
            .filter(|b| b.is_finite() && *b > 0.0)
            .map(round_cents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Approve,
    Bonus,
}

/// A row whose approval or bonus the API rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    /// 1-based data row number
    pub row: usize,
    pub worker_id: String,
    pub assignment_id: String,
    pub action: Action,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub approved: usize,
    pub already_approved: usize,
    pub bonused: usize,
    pub bonus_skipped: usize,
    /// Rows with a blank, non-finite, or non-positive bonus
    pub no_bonus: usize,
    pub failures: Vec<RowFailure>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Load rows from a CSV file, checking the required header columns first.
pub fn load_rows(path: &Path) -> Result<Vec<BonusRow>, BatchError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    collect_rows(reader)
}

/// Like [`load_rows`] over any reader.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<BonusRow>, BatchError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<BonusRow>, BatchError> {
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(BatchError::MissingColumn(column.to_string()));
        }
    }
    reader
        .deserialize()
        .collect::<Result<Vec<BonusRow>, _>>()
        .map_err(BatchError::from)
}

/// Round to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Approve every row, then bonus rows with a positive amount.
pub fn run(
    compensator: &Compensator,
    rows: &[BonusRow],
    repeat: bool,
) -> Result<BatchSummary, BatchError> {
    let mut summary = BatchSummary {
        rows: rows.len(),
        ..Default::default()
    };

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 1;
        let wrap = |source: CompensatorError| BatchError::Row {
            row: row_no,
            assignment_id: row.assignment_id.clone(),
            source,
        };

        match compensator.approve(&row.assignment_id).map_err(wrap)? {
            ApprovalOutcome::Approved => summary.approved += 1,
            ApprovalOutcome::AlreadyApproved => summary.already_approved += 1,
            ApprovalOutcome::Rejected(response) => summary.failures.push(RowFailure {
                row: row_no,
                worker_id: row.worker_id.clone(),
                assignment_id: row.assignment_id.clone(),
                action: Action::Approve,
                message: response.error_message().map(str::to_string),
            }),
        }

        let Some(amount) = row.payable_bonus() else {
            summary.no_bonus += 1;
            continue;
        };

        let outcome = compensator
            .grant_bonus(&row.worker_id, &row.assignment_id, amount, repeat)
            .map_err(wrap)?;
        match outcome {
            BonusOutcome::Granted => summary.bonused += 1,
            BonusOutcome::Skipped => summary.bonus_skipped += 1,
            BonusOutcome::Rejected(response) => summary.failures.push(RowFailure {
                row: row_no,
                worker_id: row.worker_id.clone(),
                assignment_id: row.assignment_id.clone(),
                action: Action::Bonus,
                message: response.error_message().map(str::to_string),
            }),
        }
    }

    info!(
        rows = summary.rows,
        approved = summary.approved,
        already_approved = summary.already_approved,
        bonused = summary.bonused,
        bonus_skipped = summary.bonus_skipped,
        failures = summary.failures.len(),
        "Batch complete"
    );
    Ok(summary)
}
