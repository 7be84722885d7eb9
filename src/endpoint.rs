//! SPARQL endpoint collaborator.
//!
//! [`QueryEndpoint`] is the seam between query construction and transport:
//! it takes query text and returns the decoded SPARQL JSON results. The
//! production implementation, [`HttpEndpoint`], POSTs the query with
//! `reqwest`; tests substitute a scripted fixture.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{QueryPhase, Result, TedError};

// ---------------------------------------------------------------------------
// SPARQL 1.1 Query Results JSON
// ---------------------------------------------------------------------------

/// One RDF term bound to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl BoundTerm {
    pub fn uri(value: &str) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.to_string(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal(value: &str) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.to_string(),
            lang: None,
            datatype: None,
        }
    }

    pub fn typed_literal(value: &str, datatype: &str) -> Self {
        Self {
            datatype: Some(datatype.to_string()),
            ..Self::literal(value)
        }
    }
}

/// A single solution: variable name (without `?`) to bound term. Variables
/// left unbound by an OPTIONAL are simply absent.
pub type Binding = HashMap<String, BoundTerm>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlBindings {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: SparqlHead,
    #[serde(default)]
    pub results: SparqlBindings,
}

impl SparqlResults {
    pub fn new(vars: &[&str], bindings: Vec<Binding>) -> Self {
        Self {
            head: SparqlHead {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: SparqlBindings { bindings },
        }
    }

    /// Result of a `SELECT (COUNT(..) AS ?total)` query.
    pub fn count(total: usize) -> Self {
        let mut binding = Binding::new();
        binding.insert(
            "total".to_string(),
            BoundTerm::typed_literal(
                &total.to_string(),
                "http://www.w3.org/2001/XMLSchema#integer",
            ),
        );
        Self::new(&["total"], vec![binding])
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }
}

// ---------------------------------------------------------------------------
// EndpointFailure
// ---------------------------------------------------------------------------

/// Why an endpoint call did not produce results.
///
/// Carries no phase; the search protocol attaches one via
/// [`into_error`](Self::into_error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointFailure {
    /// The endpoint answered with a non-success status.
    Status { status: u16, reason: String },
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// Connection-level failure (DNS, refused, reset, TLS).
    Transport(String),
    /// A success status with a body that is not SPARQL results JSON.
    Decode(String),
}

impl EndpointFailure {
    pub fn into_error(self, phase: QueryPhase) -> TedError {
        match self {
            EndpointFailure::Status { status, reason } => TedError::QueryExecution {
                phase,
                status,
                reason,
            },
            EndpointFailure::Timeout(message) => TedError::Timeout { phase, message },
            EndpointFailure::Transport(message) => TedError::Transport { phase, message },
            EndpointFailure::Decode(message) => TedError::InvalidResponse { phase, message },
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EndpointFailure::Timeout(err.to_string())
        } else if err.is_decode() || err.is_body() {
            EndpointFailure::Decode(err.to_string())
        } else {
            EndpointFailure::Transport(err.to_string())
        }
    }
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointFailure::Status { status, reason } => write!(f, "{} {}", status, reason),
            EndpointFailure::Timeout(m) => write!(f, "timeout: {}", m),
            EndpointFailure::Transport(m) => write!(f, "transport: {}", m),
            EndpointFailure::Decode(m) => write!(f, "decode: {}", m),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryEndpoint
// ---------------------------------------------------------------------------

/// Executes SPARQL SELECT queries.
pub trait QueryEndpoint: Send {
    fn select(&self, query: &str) -> std::result::Result<SparqlResults, EndpointFailure>;
}

// ---------------------------------------------------------------------------
// HttpEndpoint
// ---------------------------------------------------------------------------

/// POSTs queries to a SPARQL 1.1 protocol endpoint.
pub struct HttpEndpoint {
    url: String,
    client: Client,
}

impl HttpEndpoint {
    /// Create an endpoint client with a bounded per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl QueryEndpoint for HttpEndpoint {
    fn select(&self, query: &str) -> std::result::Result<SparqlResults, EndpointFailure> {
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/sparql-query")
            .header(ACCEPT, "application/sparql-results+json")
            .body(query.to_string())
            .send()
            .map_err(EndpointFailure::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EndpointFailure::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        resp.json::<SparqlResults>()
            .map_err(EndpointFailure::from_reqwest)
    }
}
