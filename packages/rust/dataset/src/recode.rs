//! Cast recoding: categorical cast text to a binary signal.
//!
//! Rules are tried in order and the first match wins:
//!
//! | Rule | Match | Signal |
//! |------|-------|--------|
//! | 1 | contains `Yea` | 1 |
//! | 2 | contains `Guilty`, not `Not Guilty` | 1 |
//! | 3 | contains `Nay` | 0 |
//! | 4 | contains `Not Guilty` | 0 |
//! | 5 | contains `Not Voting`, or is `Present, Giving Live Pair` | 0 |
//! | 6 | is `Present` | 0 |
//!
//! Anything else is an unrecognized cast and must be reported, never defaulted.

/// Which rule recognized a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastClass {
    Yea,
    Guilty,
    Nay,
    NotGuilty,
    NotVoting,
    Present,
}

impl CastClass {
    /// Binary signal for this class.
    pub fn signal(self) -> u8 {
        match self {
            Self::Yea | Self::Guilty => 1,
            Self::Nay | Self::NotGuilty | Self::NotVoting | Self::Present => 0,
        }
    }
}

/// Classify a trimmed cast string, or `None` if no rule matches.
pub fn classify(cast: &str) -> Option<CastClass> {
    if cast.contains("Yea") {
        Some(CastClass::Yea)
    } else if cast.contains("Guilty") && !cast.contains("Not Guilty") {
        Some(CastClass::Guilty)
    } else if cast.contains("Nay") {
        Some(CastClass::Nay)
    } else if cast.contains("Not Guilty") {
        Some(CastClass::NotGuilty)
    } else if cast.contains("Not Voting") || cast == "Present, Giving Live Pair" {
        Some(CastClass::NotVoting)
    } else if cast == "Present" {
        Some(CastClass::Present)
    } else {
        None
    }
}

/// Binary signal for a cast string, or `None` if unrecognized.
pub fn recode_cast(cast: &str) -> Option<u8> {
    classify(cast).map(CastClass::signal)
}
