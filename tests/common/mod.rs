//! Shared test fixtures for the TED explorer SDK integration tests.
//!
//! Provides a scripted [`FixtureEndpoint`] that replays queued SPARQL
//! replies and records every query it receives, plus helpers building an
//! in-memory explorer around it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ted_explorer_sdk::endpoint::{Binding, BoundTerm, EndpointFailure, SparqlResults};
use ted_explorer_sdk::{QueryEndpoint, TedExplorer};

pub const NOTICE_BASE: &str = "http://data.europa.eu/a4g/resource/notice/";
pub const CPV_BASE: &str = "http://data.europa.eu/cpv/cpv/";
pub const COUNTRY_BASE: &str = "http://publications.europa.eu/resource/authority/country/";

type Reply = Result<SparqlResults, EndpointFailure>;

#[derive(Default)]
struct FixtureState {
    replies: VecDeque<Reply>,
    queries: Vec<String>,
}

/// Endpoint double. Clones share the same script and query log, so a test
/// can keep one handle after giving another to the explorer.
#[derive(Clone, Default)]
pub struct FixtureEndpoint {
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, results: SparqlResults) -> &Self {
        self.state.lock().unwrap().replies.push_back(Ok(results));
        self
    }

    pub fn fail(&self, failure: EndpointFailure) -> &Self {
        self.state.lock().unwrap().replies.push_back(Err(failure));
        self
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn query_count(&self) -> usize {
        self.state.lock().unwrap().queries.len()
    }
}

impl QueryEndpoint for FixtureEndpoint {
    fn select(&self, query: &str) -> Result<SparqlResults, EndpointFailure> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.to_string());
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(EndpointFailure::Transport("no scripted reply".into())))
    }
}

/// An in-memory explorer wired to `endpoint`.
pub fn explorer_with(endpoint: &FixtureEndpoint) -> TedExplorer {
    TedExplorer::builder()
        .endpoint(endpoint.clone())
        .in_memory()
        .build()
        .unwrap()
}

/// Same as [`explorer_with`], with the synthetic fallback switched on.
pub fn explorer_with_fallback(endpoint: &FixtureEndpoint) -> TedExplorer {
    TedExplorer::builder()
        .endpoint(endpoint.clone())
        .fallback_on_error(true)
        .in_memory()
        .build()
        .unwrap()
}

/// An explorer for store-only tests; any endpoint call fails.
pub fn store_explorer() -> TedExplorer {
    explorer_with(&FixtureEndpoint::new())
}

/// A fully bound data-query solution for notice `n`.
pub fn notice_binding(n: usize, date: &str, notice_type: &str) -> Binding {
    let mut b = Binding::new();
    b.insert(
        "notice".into(),
        BoundTerm::uri(&format!("{}{}-2024", NOTICE_BASE, n)),
    );
    b.insert("title".into(), BoundTerm::literal(&format!("Notice {}", n)));
    b.insert(
        "date".into(),
        BoundTerm::typed_literal(date, "http://www.w3.org/2001/XMLSchema#date"),
    );
    b.insert("cpvCode".into(), BoundTerm::uri(&format!("{}72000000", CPV_BASE)));
    b.insert("cpvDescription".into(), BoundTerm::literal("IT services"));
    b.insert("country".into(), BoundTerm::uri(&format!("{}DEU", COUNTRY_BASE)));
    b.insert("countryName".into(), BoundTerm::literal("Germany"));
    b.insert("type".into(), BoundTerm::literal(notice_type));
    b
}

/// `count` solutions numbered from `first`.
pub fn data_page(first: usize, count: usize) -> SparqlResults {
    let vars = [
        "notice",
        "title",
        "date",
        "cpvCode",
        "cpvDescription",
        "country",
        "countryName",
        "type",
    ];
    let bindings = (first..first + count)
        .map(|n| notice_binding(n, "2024-03-01", "notice"))
        .collect();
    SparqlResults::new(&vars, bindings)
}
