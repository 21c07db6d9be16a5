//! Core domain types for roll-call retrieval and clustering.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollCallError};

/// Path prefix of the per-session vote listing on the records portal.
const LISTING_PATH_PREFIX: &str = "/legislative/LIS/roll_call_lists/vote_menu";

// ---------------------------------------------------------------------------
// SessionRef
// ---------------------------------------------------------------------------

/// Identifies one congressional session and how many of its votes to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRef {
    /// Congress number (e.g. 117).
    pub congress: u32,
    /// Session number within the congress (1 or 2).
    pub session: u32,
    /// Number of votes to keep from the front of the listing; `None` keeps all.
    pub vote_limit: Option<usize>,
}

impl SessionRef {
    /// Build a session reference, translating the `-1` sentinel to "unbounded".
    pub fn new(congress: u32, session: u32, vote_limit: i64) -> Result<Self> {
        let vote_limit = match vote_limit {
            -1 => None,
            n if n >= 0 => Some(n as usize),
            n => {
                return Err(RollCallError::config(format!(
                    "vote_limit must be -1 (unbounded) or >= 0, got {n}"
                )));
            }
        };
        Ok(Self {
            congress,
            session,
            vote_limit,
        })
    }

    /// Origin-relative path of this session's vote listing.
    pub fn listing_path(&self) -> String {
        format!(
            "{LISTING_PATH_PREFIX}_{}_{}.htm",
            self.congress, self.session
        )
    }

    /// Truncate `links` from the front according to `vote_limit`.
    pub fn apply_limit<T>(&self, mut links: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.vote_limit {
            links.truncate(limit);
        }
        links
    }
}

impl std::fmt::Display for SessionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.congress, self.session)
    }
}

// ---------------------------------------------------------------------------
// VoteLink
// ---------------------------------------------------------------------------

/// Reference to one vote's detail page, as found in the listing document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLink(pub String);

impl VoteLink {
    /// Wrap a raw href.
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    /// The raw link target.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Vote identifier: the last path segment without its file extension.
    ///
    /// `/legislative/LIS/roll_call_votes/vote1171/vote_117_1_00042.htm` → `vote_117_1_00042`
    pub fn vote_id(&self) -> String {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        segment.split('.').next().unwrap_or_default().to_string()
    }
}

impl std::fmt::Display for VoteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One senator's cast on one vote, as extracted from a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRecord {
    /// Senator display name, e.g. `Baldwin (D-WI)`.
    pub senator: String,
    /// Trimmed, non-empty cast text, e.g. `Yea` or `Not Voting`.
    pub cast_raw: String,
    /// Identifier of the vote this cast belongs to.
    pub vote_id: String,
}

/// A [`CastRecord`] with its binary recoded signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecodedRecord {
    pub senator: String,
    pub cast_raw: String,
    pub vote_id: String,
    /// 1 for Yea/Guilty, 0 for every other recognized cast.
    pub cast_binary: u8,
}

/// Long-form table of recoded casts in (vote order, extraction order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecodedTable {
    pub records: Vec<RecodedRecord>,
}

impl RecodedTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The binary signal column in row order.
    pub fn signals(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.cast_binary).collect()
    }
}

// ---------------------------------------------------------------------------
// ClusterAssignment
// ---------------------------------------------------------------------------

/// Final per-senator output handed to visualization/export consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub senator: String,
    pub cluster_label: usize,
    /// Principal-component scores, strongest component first.
    pub coordinates: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_listing_path() {
        let session = SessionRef::new(117, 1, -1).unwrap();
        assert_eq!(
            session.listing_path(),
            "/legislative/LIS/roll_call_lists/vote_menu_117_1.htm"
        );
        assert_eq!(session.vote_limit, None);
    }

    #[test]
    fn session_rejects_negative_limits_below_sentinel() {
        assert!(SessionRef::new(117, 1, -2).is_err());
        assert_eq!(SessionRef::new(117, 2, 0).unwrap().vote_limit, Some(0));
    }

    #[test]
    fn apply_limit_truncates_from_front() {
        let session = SessionRef::new(118, 1, 2).unwrap();
        assert_eq!(session.apply_limit(vec!["c", "b", "a"]), vec!["c", "b"]);

        let unbounded = SessionRef::new(118, 1, -1).unwrap();
        assert_eq!(unbounded.apply_limit(vec![1, 2, 3]).len(), 3);
    }

    #[test]
    fn vote_id_from_link() {
        let link = VoteLink::new("/legislative/LIS/roll_call_votes/vote1171/vote_117_1_00042.htm");
        assert_eq!(link.vote_id(), "vote_117_1_00042");

        let absolute =
            VoteLink::new("https://www.senate.gov/legislative/LIS/roll_call_votes/vote1172/vote_117_2_00003.htm?x=1");
        assert_eq!(absolute.vote_id(), "vote_117_2_00003");
    }

    #[test]
    fn recoded_table_signals() {
        let table = RecodedTable {
            records: vec![
                RecodedRecord {
                    senator: "A".into(),
                    cast_raw: "Yea".into(),
                    vote_id: "v1".into(),
                    cast_binary: 1,
                },
                RecodedRecord {
                    senator: "B".into(),
                    cast_raw: "Nay".into(),
                    vote_id: "v1".into(),
                    cast_binary: 0,
                },
            ],
        };
        assert_eq!(table.len(), 2);
        assert_eq!(table.signals(), vec![1, 0]);
    }
}
