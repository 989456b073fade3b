//! Batch reconciliation of source responses.
//!
//! Responses sit in a worklist and are either pending (still queued) or
//! finished. The head of the queue is compared against every remaining
//! entry; on the first match the two are merged into the matched slot,
//! otherwise the head is finished. Each response is awaited only when it is
//! first needed, and merges happen strictly one after another.
//!
//! After the main pass, every finished response's citations and references
//! are deduplicated the same way, since several providers often report the
//! same cited work for one paper.

use crate::config::ComparisonWeights;
use crate::equality::records_equal;
use crate::error::{ReconcileError, Result};
use crate::merge::{merge_records, merge_responses};
use crate::model::{Paper, SourceResponse};
use crate::normalize::normalize;
use futures::future;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info, warn};

/// One worklist entry
enum Slot<F> {
    Pending(Pin<Box<F>>),
    Ready(SourceResponse),
    Failed,
}

impl<F> Slot<F>
where
    F: Future<Output = Result<SourceResponse>>,
{
    fn new(fetch: F) -> Self {
        Slot::Pending(Box::pin(fetch))
    }

    fn settle(resolved: Result<SourceResponse>) -> Self {
        match resolved {
            Ok(response) => Slot::Ready(response),
            Err(e) => {
                warn!(error = %e, "Dropping source response that failed to resolve");
                Slot::Failed
            }
        }
    }

    /// Resolve in place and borrow the response, if it resolved.
    async fn ready(&mut self) -> Option<&SourceResponse> {
        if let Slot::Pending(fetch) = self {
            let resolved = fetch.await;
            *self = Self::settle(resolved);
        }
        match self {
            Slot::Ready(response) => Some(response),
            _ => None,
        }
    }

    async fn into_ready(self) -> Option<SourceResponse> {
        let slot = match self {
            Slot::Pending(fetch) => Self::settle(fetch.await),
            settled => settled,
        };
        match slot {
            Slot::Ready(response) => Some(response),
            _ => None,
        }
    }
}

/// Collapse duplicates inside one citation or reference list.
///
/// Greedy first match: each entry is merged into the first later entry it
/// equals, so a chain of duplicates ends up in the last survivor.
pub fn dedupe_child_list(list: Vec<Paper>, weights: &ComparisonWeights) -> Vec<Paper> {
    let mut pending: VecDeque<Paper> = list.into();
    let mut kept = Vec::with_capacity(pending.len());

    while let Some(head) = pending.pop_front() {
        match pending
            .iter()
            .position(|candidate| records_equal(&head, candidate, weights))
        {
            Some(pos) => {
                let candidate = std::mem::take(&mut pending[pos]);
                pending[pos] = merge_records(head, candidate, weights);
            }
            None => kept.push(head),
        }
    }

    kept
}

/// Reconcile a batch of (possibly still in-flight) source responses.
///
/// Returns one response per distinct paper, each with deduplicated citation
/// and reference lists. Responses without a title are dropped. A response
/// whose future fails is logged and skipped.
///
/// The weight vector is validated before any future is polled; an invalid
/// vector fails with [`ReconcileError::Validation`].
///
/// The equality relation is not guaranteed transitive near the threshold,
/// so greedy first-match merging is order-sensitive in borderline cases.
pub async fn reconcile<F>(
    responses: Vec<F>,
    weights: &ComparisonWeights,
) -> Result<Vec<SourceResponse>>
where
    F: Future<Output = Result<SourceResponse>>,
{
    weights.validate()?;
    let total = responses.len();
    info!(total, "Starting reconciliation");

    let mut queue: VecDeque<Slot<F>> = responses.into_iter().map(Slot::new).collect();
    let mut finished = Vec::new();
    let mut merges = 0usize;

    while queue.len() > 1 {
        let Some(head) = queue.pop_front() else {
            break;
        };
        let Some(head) = head.into_ready().await else {
            continue;
        };

        let mut matched = None;
        let mut index = 0;
        while index < queue.len() {
            let equal = queue[index]
                .ready()
                .await
                .map(|candidate| records_equal(&head.paper, &candidate.paper, weights));
            match equal {
                None => {
                    queue.remove(index);
                }
                Some(true) => {
                    matched = Some(index);
                    break;
                }
                Some(false) => index += 1,
            }
        }

        match matched {
            Some(index) => {
                if let Slot::Ready(candidate) = std::mem::replace(&mut queue[index], Slot::Failed) {
                    queue[index] = Slot::Ready(merge_responses(head, candidate, weights));
                    merges += 1;
                }
            }
            None => finished.push(head),
        }
    }

    if let Some(last) = queue.pop_front() {
        if let Some(last) = last.into_ready().await {
            finished.push(last);
        }
    }

    for response in &mut finished {
        let citations = response.citations.len();
        let references = response.references.len();
        response.citations = dedupe_child_list(std::mem::take(&mut response.citations), weights);
        response.references = dedupe_child_list(std::mem::take(&mut response.references), weights);
        debug!(
            title = response.paper.lead_title().unwrap_or_default(),
            citations_before = citations,
            citations_after = response.citations.len(),
            references_before = references,
            references_after = response.references.len(),
            "Deduplicated child lists"
        );
    }

    let before = finished.len();
    finished.retain(|response| response.paper.has_title());

    info!(
        total,
        merges,
        output = finished.len(),
        untitled = before - finished.len(),
        "Reconciliation complete"
    );

    Ok(finished)
}

/// Synchronous wrapper over [`reconcile`] for already-resolved responses.
pub fn reconcile_responses(
    responses: Vec<SourceResponse>,
    weights: &ComparisonWeights,
) -> Result<Vec<SourceResponse>> {
    let ready: Vec<_> = responses
        .into_iter()
        .map(|response| future::ready(Ok::<_, ReconcileError>(response)))
        .collect();
    futures::executor::block_on(reconcile(ready, weights))
}

/// Order responses by normalized lead title, for stable diagnostic output.
pub fn by_title(a: &SourceResponse, b: &SourceResponse) -> Ordering {
    let key = |response: &SourceResponse| {
        response.paper.lead_title().map(normalize).unwrap_or_default()
    };
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, UniqueId};
    use futures::future::Ready;
    use std::sync::{Arc, Mutex};

    fn weights() -> ComparisonWeights {
        ComparisonWeights {
            title_weight: 10.0,
            abstract_weight: 7.0,
            author_weight: 8.0,
            year_weight: 2.0,
            overall_weight: 0.85,
            ..Default::default()
        }
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut all = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let picked = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, picked.clone());
                all.push(tail);
            }
        }
        all
    }

    fn ready(response: SourceResponse) -> Ready<Result<SourceResponse>> {
        future::ready(Ok(response))
    }

    type EventLog = Arc<Mutex<Vec<String>>>;

    async fn logged_fetch(log: EventLog, id: usize, paper: Paper) -> Result<SourceResponse> {
        log.lock().expect("log lock").push(format!("start {id}"));
        tokio::task::yield_now().await;
        log.lock().expect("log lock").push(format!("done {id}"));
        Ok(paper.into())
    }

    const ABSTRACT: &str = "We reconcile bibliographic records from several sources.";

    fn transitive_papers() -> Vec<SourceResponse> {
        let p1 = Paper {
            title: vec!["Reconciling Bibliographic Records".to_string()],
            abstract_text: vec![ABSTRACT.to_string()],
            year: vec![2020],
            author: vec![Author::from_raw("Samuel Idowu"), Author::from_raw("M. Muster")],
            ..Default::default()
        };
        let p2 = Paper {
            title: vec!["reconciling bibliographic records".to_string()],
            abstract_text: vec![ABSTRACT.to_string()],
            year: vec![2021],
            author: vec![
                Author::from_names("Samuel", "Idowu"),
                Author::from_names("Max", "Muster"),
            ],
            ..Default::default()
        };
        let p3 = Paper {
            title: vec!["Reconciling Bibliographic Records".to_string()],
            abstract_text: vec![ABSTRACT.to_string()],
            author: vec![
                Author {
                    raw_string: vec!["samuel idowu".to_string()],
                    first_name: vec!["samuel".to_string()],
                    last_name: vec!["idowu".to_string()],
                    ..Default::default()
                },
                Author::from_raw("Max Muster"),
            ],
            ..Default::default()
        };
        vec![p1.into(), p2.into(), p3.into()]
    }

    #[test]
    fn test_title_tie_break_is_order_independent() {
        let titles = ["I am a Great Paper", "i am a great paper", "I am a Great-Paper"];
        for order in permutations(&titles) {
            let responses = order.iter().map(|t| SourceResponse::new(Paper::titled(*t))).collect();
            let result = reconcile_responses(responses, &weights()).expect("valid weights");
            assert_eq!(result.len(), 1, "order {order:?}");
            assert_eq!(result[0].paper.title, vec!["I am a Great-Paper"], "order {order:?}");
        }
    }

    #[test]
    fn test_three_paper_transitive_merge() {
        for order in permutations(&transitive_papers()) {
            let result = reconcile_responses(order, &weights()).expect("valid weights");
            assert_eq!(result.len(), 1);

            let authors = &result[0].paper.author;
            assert_eq!(authors.len(), 2);
            assert_eq!(authors[0].first_name, vec!["Samuel"]);
            assert_eq!(authors[0].last_name, vec!["Idowu"]);
            assert_eq!(authors[1].first_name, vec!["Max"]);
            assert_eq!(authors[1].last_name, vec!["Muster"]);
            assert_eq!(authors[1].raw_string, vec!["Max Muster"]);
        }
    }

    #[test]
    fn test_unrelated_paper_is_not_merged() {
        let titles = ["I am a great paper", "I am a Great Paper", "i am another paper"];
        for order in permutations(&titles) {
            let responses = order.iter().map(|t| SourceResponse::new(Paper::titled(*t))).collect();
            let result = reconcile_responses(responses, &weights()).expect("valid weights");
            assert_eq!(result.len(), 2, "order {order:?}");
        }
    }

    #[test]
    fn test_shared_doi_merges_different_titles() {
        let a = Paper {
            unique_id: vec![UniqueId::doi("10.1000/XYZ")],
            ..Paper::titled("Deep Learning for Reviews")
        };
        let b = Paper {
            unique_id: vec![UniqueId::doi("10.1000/xyz")],
            ..Paper::titled("A Survey Nobody Would Match By Title")
        };
        let result =
            reconcile_responses(vec![a.into(), b.into()], &weights()).expect("valid weights");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].paper.title.len(), 2);
        assert_eq!(result[0].paper.unique_id, vec![UniqueId::doi("10.1000/XYZ")]);
    }

    #[test]
    fn test_child_lists_are_deduplicated() {
        let first = SourceResponse {
            paper: Paper::titled("Root Paper"),
            citations: vec![Paper::titled("Cited Work"), Paper::titled("Other Work")],
            references: vec![Paper::titled("Shared Reference")],
        };
        let second = SourceResponse {
            paper: Paper::titled("root paper"),
            citations: vec![Paper::titled("cited work")],
            references: vec![Paper::titled("Shared-Reference")],
        };

        let result = reconcile_responses(vec![first, second], &weights()).expect("valid weights");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].citations.len(), 2);
        assert_eq!(result[0].references.len(), 1);
        assert_eq!(result[0].references[0].title, vec!["Shared-Reference"]);
    }

    #[test]
    fn test_dedupe_child_list_chains() {
        let list = vec![
            Paper::titled("a study"),
            Paper::titled("Unrelated Title Here"),
            Paper::titled("A Study"),
            Paper::titled("A-Study"),
        ];
        let deduped = dedupe_child_list(list, &weights());
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, vec!["Unrelated Title Here"]);
        assert_eq!(deduped[1].title, vec!["A-Study"]);
    }

    #[test]
    fn test_untitled_records_are_dropped() {
        let untitled = Paper {
            abstract_text: vec!["No title here".to_string()],
            ..Default::default()
        };
        let result = reconcile_responses(
            vec![untitled.into(), Paper::titled("Has a Title").into()],
            &weights(),
        )
        .expect("valid weights");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].paper.title, vec!["Has a Title"]);
    }

    #[test]
    fn test_empty_and_single_inputs() {
        let empty = reconcile_responses(Vec::new(), &weights()).expect("valid weights");
        assert!(empty.is_empty());
        let single = reconcile_responses(vec![Paper::titled("Alone").into()], &weights())
            .expect("valid weights");
        assert_eq!(single.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetches_are_skipped() {
        let failed = || {
            future::ready(Err(ReconcileError::Fetch {
                source_name: "SemanticScholar".to_string(),
                message: "HTTP 429".to_string(),
            }))
        };
        let responses = vec![
            failed(),
            ready(Paper::titled("A Paper").into()),
            failed(),
            ready(Paper::titled("a paper").into()),
            failed(),
        ];

        let result = reconcile(responses, &weights()).await.expect("valid weights");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].paper.title, vec!["A Paper"]);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let papers = transitive_papers();
        let expected = reconcile_responses(papers.clone(), &weights()).expect("valid weights");
        let actual = reconcile(papers.into_iter().map(ready).collect(), &weights())
            .await
            .expect("valid weights");
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_responses_awaited_one_at_a_time_when_needed() {
        let log = EventLog::default();
        let papers = [
            Paper::titled("Root Paper"),
            Paper::titled("root paper"),
            Paper::titled("Unrelated Title Here"),
        ];
        let fetches = papers
            .into_iter()
            .enumerate()
            .map(|(id, paper)| logged_fetch(log.clone(), id, paper))
            .collect();

        let result = reconcile(fetches, &weights()).await.expect("valid weights");
        assert_eq!(result.len(), 2);

        let events = log.lock().expect("log lock").clone();
        assert_eq!(
            events,
            vec!["start 0", "done 0", "start 1", "done 1", "start 2", "done 2"]
        );
    }

    #[tokio::test]
    async fn test_invalid_weights_fail_before_polling() {
        let log = EventLog::default();
        let nan = ComparisonWeights {
            title_weight: f64::NAN,
            ..weights()
        };
        let fetches = vec![logged_fetch(log.clone(), 0, Paper::titled("A Paper"))];

        let err = reconcile(fetches, &nan).await.expect_err("should reject");
        assert!(matches!(err, ReconcileError::Validation(_)));
        assert!(log.lock().expect("log lock").is_empty());

        let negative = ComparisonWeights {
            year_weight: -1.0,
            ..weights()
        };
        let sync = reconcile_responses(vec![Paper::titled("A Paper").into()], &negative);
        assert!(sync.is_err());
    }

    #[test]
    fn test_by_title() {
        let mut responses: Vec<SourceResponse> = vec![
            Paper::titled("beta").into(),
            Paper::default().into(),
            Paper::titled("Alpha").into(),
        ];
        responses.sort_by(by_title);
        assert_eq!(responses[0].paper.lead_title(), None);
        assert_eq!(responses[1].paper.lead_title(), Some("Alpha"));
        assert_eq!(responses[2].paper.lead_title(), Some("beta"));
    }
}
