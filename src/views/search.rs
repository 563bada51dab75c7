//! Debounced patient search for the doctor dashboard.
//!
//! Each keystroke goes through `input()`. Only the last timer survives;
//! when it fires the term is sent to `/api/patients/search`. Every input
//! bumps a sequence number and a response is applied only if no newer
//! input arrived in the meantime.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::models::PatientSummary;

use super::ViewContext;

pub const NO_RESULTS: &str = "No patients found.";
pub const SEARCH_ERROR: &str = "Error fetching patients";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Empty term: no table at all.
    Unsearched,
    Loading,
    Results(Vec<PatientSummary>),
    Failed(String),
}

impl SearchState {
    /// Line shown in place of the table, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SearchState::Results(rows) if rows.is_empty() => Some(NO_RESULTS),
            SearchState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

struct Inner {
    seq: u64,
    term: String,
    state: SearchState,
}

pub struct PatientSearch {
    ctx: ViewContext,
    debounce: Duration,
    rt: Handle,
    inner: Arc<Mutex<Inner>>,
    pending: Option<JoinHandle<()>>,
}

impl PatientSearch {
    /// Timers and requests run on `rt`, so `input()` may be called from
    /// a thread that is not inside the runtime.
    pub fn new(ctx: ViewContext, debounce: Duration, rt: Handle) -> Self {
        Self {
            ctx,
            debounce,
            rt,
            inner: Arc::new(Mutex::new(Inner {
                seq: 0,
                term: String::new(),
                state: SearchState::Unsearched,
            })),
            pending: None,
        }
    }

    pub fn term(&self) -> String {
        self.inner
            .lock()
            .map(|inner| inner.term.clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> SearchState {
        self.inner
            .lock()
            .map(|inner| inner.state.clone())
            .unwrap_or(SearchState::Unsearched)
    }

    /// Record a new search term and (re)arm the debounce timer.
    pub fn input(&mut self, term: &str) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let seq = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            inner.seq += 1;
            inner.term = term.to_string();
            if term.trim().is_empty() {
                inner.state = SearchState::Unsearched;
                return;
            }
            inner.seq
        };

        let query = term.trim().to_string();
        let inner = Arc::clone(&self.inner);
        let ctx = self.ctx.clone();
        let debounce = self.debounce;

        self.pending = Some(self.rt.spawn(async move {
            tokio::time::sleep(debounce).await;
            if !apply(&inner, seq, SearchState::Loading) {
                return;
            }

            let state = match ctx.client().search_patients(&query).await {
                Ok(rows) => {
                    tracing::debug!(results = rows.len(), "Patient search answered");
                    SearchState::Results(rows)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Patient search failed");
                    ctx.notice(&e);
                    SearchState::Failed(e.user_message(SEARCH_ERROR))
                }
            };
            if !apply(&inner, seq, state) {
                tracing::debug!(seq, "Dropping superseded search response");
            }
        }));
    }

    /// Wait for the pending search (if any) to finish.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Search task failed");
                }
            }
        }
    }
}

impl Drop for PatientSearch {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Store `state` if `seq` is still the latest input.
fn apply(inner: &Mutex<Inner>, seq: u64, state: SearchState) -> bool {
    match inner.lock() {
        Ok(mut inner) if inner.seq == seq => {
            inner.state = state;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{view_context, MockBackend};

    const DEBOUNCE: Duration = Duration::from_millis(40);

    #[tokio::test]
    async fn empty_term_never_hits_network() {
        let backend = MockBackend::start().await;
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, Handle::current());

        search.input("");
        search.input("   ");
        search.settle().await;
        tokio::time::sleep(DEBOUNCE * 3).await;

        assert_eq!(search.state(), SearchState::Unsearched);
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn typing_issues_one_query_after_debounce() {
        let backend = MockBackend::start().await;
        backend.seed_patient("p1", "John", "Smith");
        backend.seed_patient("p2", "Mary", "Jones");
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, Handle::current());

        for term in ["S", "Sm", "Smi", "Smit", "Smith"] {
            search.input(term);
        }
        assert!(backend.requests().is_empty());
        search.settle().await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query.as_deref(), Some("query=Smith"));
        match search.state() {
            SearchState::Results(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].full_name(), "John Smith");
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn clearing_term_resets_results() {
        let backend = MockBackend::start().await;
        backend.seed_patient("p1", "John", "Smith");
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, Handle::current());

        search.input("John");
        search.settle().await;
        assert!(matches!(search.state(), SearchState::Results(_)));

        search.input("");
        assert_eq!(search.state(), SearchState::Unsearched);
        assert_eq!(search.state().message(), None);
    }

    #[tokio::test]
    async fn stale_response_never_overwrites_newer_input() {
        let backend = MockBackend::start().await;
        backend.seed_patient("p1", "John", "Smith");
        backend.seed_patient("p2", "Mary", "Jones");
        backend.delay_search("Smith", Duration::from_millis(300));
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, Handle::current());

        search.input("Smith");
        // Let the slow request reach the backend before typing on.
        tokio::time::sleep(DEBOUNCE * 3).await;
        assert_eq!(search.state(), SearchState::Loading);

        search.input("Jones");
        search.settle().await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        match search.state() {
            SearchState::Results(rows) => assert_eq!(rows[0].full_name(), "Mary Jones"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_matches_and_failures_have_messages() {
        let backend = MockBackend::start().await;
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, Handle::current());

        search.input("Nobody");
        search.settle().await;
        assert_eq!(search.state().message(), Some(NO_RESULTS));

        backend.fail_next(500, None);
        search.input("Nobody else");
        search.settle().await;
        assert_eq!(search.state().message(), Some(SEARCH_ERROR));

        backend.fail_next(500, Some("Search index unavailable"));
        search.input("Anyone");
        search.settle().await;
        assert_eq!(search.state().message(), Some("Search index unavailable"));
    }

    #[test]
    fn input_works_from_a_thread_outside_the_runtime() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let backend = rt.block_on(MockBackend::start());
        backend.seed_patient("p1", "John", "Smith");
        let (ctx, _prompter) = view_context(&backend);
        let mut search = PatientSearch::new(ctx, DEBOUNCE, rt.handle().clone());

        search.input("Smith");
        rt.block_on(search.settle());

        match search.state() {
            SearchState::Results(rows) => assert_eq!(rows[0].full_name(), "John Smith"),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(backend.count("GET", "/api/patients/search"), 1);
    }
}
