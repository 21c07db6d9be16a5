//! Vote record extraction engine.
//!
//! Fetches roll-call detail pages and parses them into [`CastRecord`]s.
//! Batches run sequentially by default; with `concurrency > 1` pages are
//! fetched in parallel and the results are reassembled in listing order.

use std::sync::Arc;

use rollcall_shared::{CastRecord, Result, RollCallError, SourceClient, VoteLink};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::roll::parse_roll_call;

/// Fetch one vote's detail page and extract its cast records.
#[instrument(skip_all, fields(link = %link))]
pub async fn extract_vote_records(client: &SourceClient, link: &VoteLink) -> Result<Vec<CastRecord>> {
    let url = client.resolve(link.as_str())?;
    let html = client.fetch_document(&url).await?;
    let records = parse_roll_call(&html, link)?;

    debug!(vote_id = %link.vote_id(), records = records.len(), "vote extracted");
    Ok(records)
}

/// Extract every link's records, returned in the same order as `links`.
///
/// `on_vote(link, done, total)` is called as each vote completes, in order.
/// The first failure aborts the batch; no partial result is returned.
#[instrument(skip_all, fields(votes = links.len(), concurrency = concurrency))]
pub async fn extract_all<F>(
    client: &SourceClient,
    links: &[VoteLink],
    concurrency: usize,
    mut on_vote: F,
) -> Result<Vec<Vec<CastRecord>>>
where
    F: FnMut(&VoteLink, usize, usize),
{
    let total = links.len();
    let mut batches = Vec::with_capacity(total);

    if concurrency <= 1 {
        for (i, link) in links.iter().enumerate() {
            pause(client).await;
            batches.push(extract_vote_records(client, link).await?);
            on_vote(link, i + 1, total);
        }
    } else {
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles: Vec<JoinHandle<Result<Vec<CastRecord>>>> = Vec::with_capacity(total);

        for link in links {
            let client = client.clone();
            let link = link.clone();
            let sem = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.map_err(|e| {
                    RollCallError::fetch(link.as_str(), format!("fetch slot unavailable: {e}"))
                })?;
                pause(&client).await;
                extract_vote_records(&client, &link).await
            }));
        }

        let mut pending = handles.into_iter();
        let mut index = 0;
        while let Some(handle) = pending.next() {
            let link = &links[index];
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(RollCallError::fetch(
                    link.as_str(),
                    format!("extraction task failed: {e}"),
                )),
            };
            match outcome {
                Ok(records) => batches.push(records),
                Err(e) => {
                    for rest in pending.by_ref() {
                        rest.abort();
                    }
                    return Err(e);
                }
            }
            index += 1;
            on_vote(link, index, total);
        }
    }

    info!(
        votes = batches.len(),
        records = batches.iter().map(Vec::len).sum::<usize>(),
        "extraction complete"
    );

    Ok(batches)
}

async fn pause(client: &SourceClient) {
    let rate_limit = client.rate_limit();
    if !rate_limit.is_zero() {
        tokio::time::sleep(rate_limit).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_shared::SourceConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SourceClient {
        SourceClient::new(&SourceConfig {
            origin: server.uri(),
            timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 1,
            rate_limit_ms: 0,
            concurrency: 1,
        })
        .unwrap()
    }

    fn roll(units: &[(&str, &str)]) -> String {
        let body: String = units
            .iter()
            .map(|(name, cast)| format!("{name}, <b>{cast}</b><br/>\n"))
            .collect();
        format!(r#"<html><body><div class="newspaperDisplay_3column"><span>{body}</span></div></body></html>"#)
    }

    async fn mount(server: &MockServer, route: &str, body: String, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn extract_single_vote() {
        let server = MockServer::start().await;
        let html = std::fs::read_to_string("../../../fixtures/senate/vote_117_1_00001.htm")
            .expect("read detail fixture");
        mount(&server, "/roll_call_votes/vote_117_1_00001.htm", html, 0).await;

        let link = VoteLink::new("/roll_call_votes/vote_117_1_00001.htm");
        let records = extract_vote_records(&client_for(&server), &link).await.unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].vote_id, "vote_117_1_00001");
    }

    #[tokio::test]
    async fn parallel_results_keep_listing_order() {
        let server = MockServer::start().await;
        // First link answers slowest so completion order differs from listing order
        mount(&server, "/roll_call_votes/v1.htm", roll(&[("A", "Yea"), ("B", "Nay")]), 150).await;
        mount(&server, "/roll_call_votes/v2.htm", roll(&[("C", "Nay"), ("D", "Yea")]), 0).await;

        let links = vec![
            VoteLink::new("/roll_call_votes/v1.htm"),
            VoteLink::new("/roll_call_votes/v2.htm"),
        ];
        let mut seen = Vec::new();
        let batches = extract_all(&client_for(&server), &links, 4, |link, done, total| {
            seen.push((link.vote_id(), done, total));
        })
        .await
        .unwrap();

        let senators: Vec<&str> = batches
            .iter()
            .flatten()
            .map(|r| r.senator.as_str())
            .collect();
        assert_eq!(senators, vec!["A", "B", "C", "D"]);
        assert_eq!(seen, vec![("v1".into(), 1, 2), ("v2".into(), 2, 2)]);
    }

    #[tokio::test]
    async fn sequential_and_parallel_agree() {
        let server = MockServer::start().await;
        mount(&server, "/roll_call_votes/v1.htm", roll(&[("A", "Yea")]), 20).await;
        mount(&server, "/roll_call_votes/v2.htm", roll(&[("B", "Guilty")]), 0).await;
        mount(&server, "/roll_call_votes/v3.htm", roll(&[("C", "Nay")]), 10).await;

        let links: Vec<VoteLink> = ["v1", "v2", "v3"]
            .iter()
            .map(|v| VoteLink::new(format!("/roll_call_votes/{v}.htm")))
            .collect();
        let client = client_for(&server);

        let sequential = extract_all(&client, &links, 1, |_, _, _| {}).await.unwrap();
        let parallel = extract_all(&client, &links, 3, |_, _, _| {}).await.unwrap();
        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn one_failing_vote_aborts_the_batch() {
        let server = MockServer::start().await;
        mount(&server, "/roll_call_votes/v1.htm", roll(&[("A", "Yea")]), 0).await;
        Mock::given(method("GET"))
            .and(path("/roll_call_votes/v2.htm"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let links = vec![
            VoteLink::new("/roll_call_votes/v1.htm"),
            VoteLink::new("/roll_call_votes/v2.htm"),
        ];
        for concurrency in [1, 2] {
            let err = extract_all(&client_for(&server), &links, concurrency, |_, _, _| {})
                .await
                .unwrap_err();
            assert!(matches!(err, RollCallError::Fetch { .. }));
            assert!(err.to_string().contains("v2.htm"));
        }
    }
}
