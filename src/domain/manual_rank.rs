//! Resorting the selection from user-entered page ranks

use super::{FileHandle, SelectionStore};
use crate::error::{PdfStackError, Result};

/// One tile's declared rank paired with the image at that position
#[derive(Debug, Clone)]
pub struct RankEntry {
    pub declared_rank: i64,
    pub handle: FileHandle,
}

/// Parses a rank field the way a lenient integer prompt would.
///
/// Leading whitespace and an optional sign are accepted, then as many digits
/// as follow; anything after them is ignored. Input without leading digits
/// yields 0.
pub fn parse_declared_rank(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        if !input.trim().is_empty() {
            tracing::debug!(input, "malformed rank, using 0");
        }
        return 0;
    }

    let value = digits[..digit_count].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    if negative {
        -value
    } else {
        value
    }
}

/// Stable ascending sort by declared rank
pub fn resolve_order(mut entries: Vec<RankEntry>) -> Vec<FileHandle> {
    entries.sort_by_key(|entry| entry.declared_rank);
    entries.into_iter().map(|entry| entry.handle).collect()
}

/// Reorders the store to match one rank input per tile, in positional order.
///
/// Returns whether anything was applied; an empty selection is left alone.
pub fn apply_manual_sort<S: AsRef<str>>(store: &mut SelectionStore, rank_inputs: &[S]) -> Result<bool> {
    if store.is_empty() {
        return Ok(false);
    }

    if rank_inputs.len() != store.len() {
        return Err(PdfStackError::RankCountMismatch {
            expected: store.len(),
            found: rank_inputs.len(),
        });
    }

    let entries = rank_inputs
        .iter()
        .zip(store.as_slice())
        .map(|(input, handle)| RankEntry {
            declared_rank: parse_declared_rank(input.as_ref()),
            handle: handle.clone(),
        })
        .collect();

    store.reorder_to(resolve_order(entries))?;
    tracing::debug!(count = store.len(), "applied manual sort");
    Ok(true)
}
