//! Vote listing (`vote_menu_<congress>_<session>.htm`) parser.
//!
//! The listing holds one `<table id="listOfVotes">`; each row links to a
//! roll-call detail page under a `roll_call_votes` path. Links elsewhere on
//! the page, and non-vote links inside the table, are ignored.

use std::sync::LazyLock;

use rollcall_shared::{Result, RollCallError, VoteLink};
use scraper::{Html, Selector};

/// Path segment identifying roll-call vote detail pages.
pub const VOTE_PATH_MARKER: &str = "roll_call_votes";

static LISTING_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#listOfVotes").expect("listing table selector"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

/// Extract vote detail links from a listing document, in document order.
///
/// `source_ref` names the document in errors (usually its URL).
pub fn parse_vote_menu(html: &str, source_ref: &str) -> Result<Vec<VoteLink>> {
    let doc = Html::parse_document(html);

    let table = doc.select(&LISTING_TABLE).next().ok_or_else(|| {
        RollCallError::parse(source_ref, "vote listing table `#listOfVotes` not found")
    })?;

    let links = table
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.contains(VOTE_PATH_MARKER))
        .map(VoteLink::new)
        .collect();

    Ok(links)
}
