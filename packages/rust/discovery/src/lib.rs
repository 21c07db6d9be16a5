//! Vote index resolution.
//!
//! Given a [`SessionRef`], fetches the session's vote listing from the
//! records portal and returns the ordered roll-call detail links, newest
//! first, truncated to the session's vote limit.

mod parser;

use rollcall_shared::{Result, SessionRef, SourceClient, VoteLink};
use tracing::{info, instrument};

pub use parser::{VOTE_PATH_MARKER, parse_vote_menu};

/// Fetch the listing for `session` and extract its vote detail links.
///
/// Fails with `Fetch` if the listing cannot be retrieved and with `Parse`
/// if the listing table is missing.
#[instrument(skip_all, fields(session = %session))]
pub async fn resolve_vote_links(
    client: &SourceClient,
    session: &SessionRef,
) -> Result<Vec<VoteLink>> {
    let url = client.resolve(&session.listing_path())?;
    info!(%url, "fetching vote listing");

    let html = client.fetch_document(&url).await?;
    let all = parse_vote_menu(&html, url.as_str())?;
    let listed = all.len();
    let links = session.apply_limit(all);

    info!(
        listed,
        selected = links.len(),
        vote_limit = ?session.vote_limit,
        "vote links resolved"
    );

    Ok(links)
}
