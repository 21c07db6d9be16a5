//! Senator-by-vote matrix built by pivoting a recoded long table.
//!
//! Cells stay `Option<u8>` until [`SenatorVoteMatrix::materialize`]: an absent
//! cell means the senator has no recorded cast on that vote. The fill policy
//! decides what absent cells become for projection.

use std::collections::{BTreeMap, BTreeSet};

use rollcall_shared::{FillPolicy, ParticipationMeasure, RecodedTable};
use tracing::warn;

/// Wide matrix: rows are senators, columns are votes, both sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenatorVoteMatrix {
    senators: Vec<String>,
    votes: Vec<String>,
    cells: Vec<Vec<Option<u8>>>,
}

impl SenatorVoteMatrix {
    /// Pivot a long table. If a (senator, vote) pair repeats, the first row wins.
    pub fn pivot(table: &RecodedTable) -> Self {
        let senators: Vec<String> = table
            .records
            .iter()
            .map(|r| r.senator.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let votes: Vec<String> = table
            .records
            .iter()
            .map(|r| r.vote_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_of: BTreeMap<&str, usize> =
            senators.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();
        let col_of: BTreeMap<&str, usize> =
            votes.iter().enumerate().map(|(j, v)| (v.as_str(), j)).collect();

        let mut cells = vec![vec![None; votes.len()]; senators.len()];
        for r in &table.records {
            let (i, j) = (row_of[r.senator.as_str()], col_of[r.vote_id.as_str()]);
            match cells[i][j] {
                None => cells[i][j] = Some(r.cast_binary),
                Some(_) => warn!(
                    senator = %r.senator,
                    vote_id = %r.vote_id,
                    "duplicate cast for senator on vote, keeping first"
                ),
            }
        }

        Self {
            senators,
            votes,
            cells,
        }
    }

    /// Row labels.
    pub fn senators(&self) -> &[String] {
        &self.senators
    }

    /// Column labels.
    pub fn votes(&self) -> &[String] {
        &self.votes
    }

    /// (senators, votes)
    pub fn shape(&self) -> (usize, usize) {
        (self.senators.len(), self.votes.len())
    }

    /// Cell by labels; `None` if the pair is absent or a label is unknown.
    pub fn cell(&self, senator: &str, vote_id: &str) -> Option<u8> {
        let i = self.senators.iter().position(|s| s == senator)?;
        let j = self.votes.iter().position(|v| v == vote_id)?;
        self.cells[i][j]
    }

    /// Rows of raw cells, in senator order.
    pub fn rows(&self) -> &[Vec<Option<u8>>] {
        &self.cells
    }

    /// Per-senator participation under `measure`, in senator order.
    pub fn participation(&self, measure: ParticipationMeasure) -> Vec<u32> {
        self.cells
            .iter()
            .map(|row| match measure {
                ParticipationMeasure::SignalMass => {
                    row.iter().flatten().map(|&v| u32::from(v)).sum()
                }
                ParticipationMeasure::VotesCast => row.iter().flatten().count() as u32,
            })
            .collect()
    }

    /// Keep senators whose participation is at least `threshold`.
    ///
    /// Returns the filtered matrix and the names of dropped senators. Vote
    /// columns are kept even if no retained senator cast on them.
    pub fn retain_participating(
        &self,
        threshold: u32,
        measure: ParticipationMeasure,
    ) -> (Self, Vec<String>) {
        let mut senators = Vec::new();
        let mut cells = Vec::new();
        let mut dropped = Vec::new();

        for ((name, row), mass) in self
            .senators
            .iter()
            .zip(&self.cells)
            .zip(self.participation(measure))
        {
            if mass >= threshold {
                senators.push(name.clone());
                cells.push(row.clone());
            } else {
                dropped.push(name.clone());
            }
        }

        let retained = Self {
            senators,
            votes: self.votes.clone(),
            cells,
        };
        (retained, dropped)
    }

    /// Dense numeric rows with absent cells filled per `fill`.
    pub fn materialize(&self, fill: FillPolicy) -> Vec<Vec<f64>> {
        let fills: Vec<f64> = match fill {
            FillPolicy::Zero => vec![0.0; self.votes.len()],
            FillPolicy::VoteMean => (0..self.votes.len())
                .map(|j| {
                    let observed: Vec<f64> = self
                        .cells
                        .iter()
                        .filter_map(|row| row[j])
                        .map(f64::from)
                        .collect();
                    if observed.is_empty() {
                        0.0
                    } else {
                        observed.iter().sum::<f64>() / observed.len() as f64
                    }
                })
                .collect(),
        };

        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&fills)
                    .map(|(cell, &fill)| cell.map_or(fill, f64::from))
                    .collect()
            })
            .collect()
    }
}
