//! Dataset assembly and recoding.
//!
//! Merges per-vote [`CastRecord`] batches into one long-form table, drops
//! empty casts, and recodes every cast into a binary signal via [`recode`].

pub mod recode;

use rollcall_shared::{CastRecord, RecodedRecord, RecodedTable, Result, RollCallError};
use tracing::{debug, info};

pub use recode::{CastClass, classify, recode_cast};

/// Concatenate per-vote batches in vote order, keeping within-vote order.
///
/// Casts are trimmed; records whose cast is empty after trimming are dropped.
pub fn assemble(batches: Vec<Vec<CastRecord>>) -> Vec<CastRecord> {
    let mut dropped = 0usize;
    let long: Vec<CastRecord> = batches
        .into_iter()
        .flatten()
        .filter_map(|mut record| {
            let trimmed = record.cast_raw.trim();
            if trimmed.is_empty() {
                dropped += 1;
                return None;
            }
            if trimmed.len() != record.cast_raw.len() {
                record.cast_raw = trimmed.to_string();
            }
            Some(record)
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, "dropped records with empty casts");
    }
    long
}

/// Recode a long-form table. Fails on the first unrecognized cast.
pub fn recode(records: Vec<CastRecord>) -> Result<RecodedTable> {
    let records = records
        .into_iter()
        .map(|r| match recode_cast(&r.cast_raw) {
            Some(cast_binary) => Ok(RecodedRecord {
                senator: r.senator,
                cast_raw: r.cast_raw,
                vote_id: r.vote_id,
                cast_binary,
            }),
            None => Err(RollCallError::UnrecognizedCast {
                vote_id: r.vote_id,
                senator: r.senator,
                cast: r.cast_raw,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RecodedTable { records })
}

/// Assemble batches into a long-form table and recode it.
pub fn assemble_and_recode(batches: Vec<Vec<CastRecord>>) -> Result<RecodedTable> {
    let votes = batches.len();
    let table = recode(assemble(batches))?;

    info!(
        votes,
        rows = table.len(),
        yea = table.records.iter().filter(|r| r.cast_binary == 1).count(),
        "dataset assembled"
    );
    Ok(table)
}
