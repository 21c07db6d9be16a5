//! Roll-call detail page parser.
//!
//! The per-senator roll sits in `<div class="newspaperDisplay_3column">` as a
//! run of units shaped like `Name (P-ST), <b>Cast</b><br/>`. The parser walks
//! the container's nodes: text outside `<b>` accumulates the pending senator
//! name, and each `<b>` closes a unit with its text as the cast.

use std::sync::LazyLock;

use regex::Regex;
use rollcall_shared::{CastRecord, Result, RollCallError, VoteLink};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Element wrapping each cast value.
const CAST_TAG: &str = "b";

static ROLL_CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.newspaperDisplay_3column").expect("roll container selector")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// One repeated (senator, cast) unit of a roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollUnit {
    /// Senator display name, whitespace-collapsed, trailing comma removed.
    pub name: String,
    /// Cast text, whitespace-collapsed; may be empty.
    pub cast: String,
}

impl RollUnit {
    fn is_blank(&self) -> bool {
        self.name.is_empty() && self.cast.is_empty()
    }
}

/// Split the roll container into units, dropping units with neither a name nor a cast.
///
/// Trailing text after the last cast never forms a unit.
pub fn parse_roll_units(html: &str, source_ref: &str) -> Result<Vec<RollUnit>> {
    let doc = Html::parse_document(html);

    let container = doc.select(&ROLL_CONTAINER).next().ok_or_else(|| {
        RollCallError::parse(source_ref, "roll container `.newspaperDisplay_3column` not found")
    })?;
    let container_id = container.id();

    let mut units = Vec::new();
    let mut pending_name = String::new();

    for node in container.descendants() {
        let in_cast = node
            .ancestors()
            .take_while(|a| a.id() != container_id)
            .any(|a| matches!(a.value(), Node::Element(e) if e.name() == CAST_TAG));
        if in_cast {
            continue;
        }

        match node.value() {
            Node::Element(el) if el.name() == CAST_TAG => {
                let cast = ElementRef::wrap(node)
                    .map(|b| b.text().collect::<String>())
                    .unwrap_or_default();
                let unit = RollUnit {
                    name: clean_name(&pending_name),
                    cast: collapse_ws(&cast),
                };
                pending_name.clear();
                if !unit.is_blank() {
                    units.push(unit);
                }
            }
            Node::Text(text) => pending_name.push_str(text),
            _ => {}
        }
    }

    Ok(units)
}

/// Parse a detail page into cast records for `link`.
///
/// Units with a name but an empty cast are not emitted. A cast with no
/// senator name is a `Parse` error.
pub fn parse_roll_call(html: &str, link: &VoteLink) -> Result<Vec<CastRecord>> {
    let vote_id = link.vote_id();
    let units = parse_roll_units(html, link.as_str())?;

    let mut records = Vec::with_capacity(units.len());
    for unit in units {
        if unit.name.is_empty() {
            return Err(RollCallError::parse(
                link.as_str(),
                format!("cast `{}` has no senator name", unit.cast),
            ));
        }
        if unit.cast.is_empty() {
            debug!(%vote_id, senator = %unit.name, "empty cast, skipping");
            continue;
        }
        records.push(CastRecord {
            senator: unit.name,
            cast_raw: unit.cast,
            vote_id: vote_id.clone(),
        });
    }

    Ok(records)
}

fn collapse_ws(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

fn clean_name(raw: &str) -> String {
    collapse_ws(raw).trim_end_matches(',').trim_end().to_string()
}
