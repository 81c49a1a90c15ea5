// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prize list parsing.
//!
//! A bounty's prizes are a free-text, comma-separated list of amounts
//! (`"1000, 500, 250"`). The text is stored verbatim; these helpers parse it
//! for validation and for the computed total.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PrizeError {
    #[error("prize #{0} is empty")]
    Empty(usize),
    #[error("prize #{position} ({entry:?}) is not a number")]
    NotANumber { position: usize, entry: String },
    #[error("prize #{position} ({entry:?}) must be a finite, non-negative amount")]
    OutOfRange { position: usize, entry: String },
}

/// Parse every entry of a prize list. Positions in errors are 1-based.
pub fn parse_prizes(raw: &str) -> Result<Vec<f64>, PrizeError> {
    raw.split(',')
        .enumerate()
        .map(|(index, entry)| parse_entry(index + 1, entry.trim()))
        .collect()
}

fn parse_entry(position: usize, entry: &str) -> Result<f64, PrizeError> {
    if entry.is_empty() {
        return Err(PrizeError::Empty(position));
    }

    let amount = entry.parse::<f64>().map_err(|_| PrizeError::NotANumber {
        position,
        entry: entry.to_string(),
    })?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(PrizeError::OutOfRange {
            position,
            entry: entry.to_string(),
        });
    }

    Ok(amount)
}

/// Sum of the parseable entries of a prize list.
///
/// Entries that fail to parse count as zero, so documents written before
/// validation existed still render.
pub fn prize_total(raw: &str) -> f64 {
    raw.split(',')
        .enumerate()
        .filter_map(|(index, entry)| parse_entry(index + 1, entry.trim()).ok())
        .sum()
}
