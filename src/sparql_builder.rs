//! SPARQL builder with escaped literal construction.
//!
//! SPARQL over HTTP has no parameter binding, so every caller-supplied value
//! is rendered through [`string_literal`] or [`iri`] before it reaches the
//! query text. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use ted_explorer_sdk::SparqlBuilder;
//! let query = SparqlBuilder::new()
//!     .prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#")
//!     .select(&["?notice", "?title"])
//!     .pattern("?notice rdfs:label ?title .")
//!     .filter_contains_ci("?title", "hospital")
//!     .order_by(&["DESC(?title)"])
//!     .limit(10)
//!     .build();
//! assert!(query.contains("FILTER(CONTAINS(LCASE(STR(?title)), LCASE(\"hospital\")))"));
//! ```

use crate::error::{Result, TedError};

/// Render `value` as a double-quoted SPARQL string literal.
///
/// Backslashes, both quote characters and line breaks are escaped, so the
/// value can never terminate the literal it is placed in.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `value` as an IRI reference (`<...>`).
///
/// IRIs have no escape syntax, so characters that could close the reference
/// or smuggle in further syntax are rejected instead.
pub fn iri(value: &str) -> Result<String> {
    let bad = value.chars().find(|c| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
    });
    match bad {
        Some(c) => Err(TedError::Validation(format!(
            "character {:?} is not allowed in an IRI",
            c
        ))),
        None if value.is_empty() => Err(TedError::Validation("IRI must not be empty".into())),
        None => Ok(format!("<{}>", value)),
    }
}

/// Builds SPARQL SELECT queries.
///
/// Graph patterns are emitted in insertion order, followed by every FILTER.
/// All filters are ANDed by virtue of sharing one group graph pattern.
#[derive(Debug, Clone, Default)]
pub struct SparqlBuilder {
    prefixes: Vec<(String, String)>,
    select_vars: Vec<String>,
    is_distinct: bool,
    patterns: Vec<String>,
    filters: Vec<String>,
    group_by_terms: Vec<String>,
    order_by_terms: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SparqlBuilder {
    /// Create a builder that selects `*` until told otherwise.
    pub fn new() -> Self {
        Self {
            select_vars: vec!["*".to_string()],
            ..Self::default()
        }
    }

    /// Declare a namespace prefix.
    pub fn prefix(&mut self, name: &str, iri: &str) -> &mut Self {
        self.prefixes.push((name.to_string(), iri.to_string()));
        self
    }

    /// Set the projection (replaces the default `*`).
    ///
    /// Entries may be plain variables (`?title`) or projected expressions
    /// (`(COUNT(*) AS ?total)`).
    pub fn select(&mut self, vars: &[&str]) -> &mut Self {
        self.select_vars = vars.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Add DISTINCT to the SELECT clause.
    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add a raw graph pattern line, e.g. `"?notice rdfs:label ?title ."`.
    pub fn pattern(&mut self, triple: &str) -> &mut Self {
        self.patterns.push(triple.to_string());
        self
    }

    /// Add an `OPTIONAL { ... }` block built from the given pattern lines.
    ///
    /// An empty slice is a no-op.
    pub fn optional(&mut self, triples: &[&str]) -> &mut Self {
        if triples.is_empty() {
            return self;
        }
        self.patterns
            .push(format!("OPTIONAL {{ {} }}", triples.join(" ")));
        self
    }

    /// Add `BIND(expr AS var)`.
    pub fn bind(&mut self, expr: &str, var: &str) -> &mut Self {
        self.patterns.push(format!("BIND({} AS {})", expr, var));
        self
    }

    /// Add a raw `FILTER(condition)`.
    ///
    /// The condition is inserted verbatim; use the typed helpers below for
    /// anything carrying caller input.
    pub fn filter(&mut self, condition: &str) -> &mut Self {
        self.filters.push(format!("FILTER({})", condition));
        self
    }

    /// Case-insensitive substring test.
    ///
    /// Generates: `FILTER(CONTAINS(LCASE(STR({expr})), LCASE("{value}")))`
    pub fn filter_contains_ci(&mut self, expr: &str, value: &str) -> &mut Self {
        self.filters.push(format!(
            "FILTER(CONTAINS(LCASE(STR({})), LCASE({})))",
            expr,
            string_literal(value)
        ));
        self
    }

    /// Case-sensitive substring test: `FILTER(CONTAINS(STR({expr}), "{value}"))`.
    pub fn filter_contains(&mut self, expr: &str, value: &str) -> &mut Self {
        self.filters.push(format!(
            "FILTER(CONTAINS(STR({}), {}))",
            expr,
            string_literal(value)
        ));
        self
    }

    /// Prefix test: `FILTER(STRSTARTS({expr}, "{value}"))`.
    pub fn filter_starts_with(&mut self, expr: &str, value: &str) -> &mut Self {
        self.filters.push(format!(
            "FILTER(STRSTARTS({}, {}))",
            expr,
            string_literal(value)
        ));
        self
    }

    /// Resource equality: `FILTER({var} = <{iri}>)`.
    pub fn filter_eq_iri(&mut self, var: &str, value: &str) -> Result<&mut Self> {
        let term = iri(value)?;
        self.filters.push(format!("FILTER({} = {})", var, term));
        Ok(self)
    }

    /// Inclusive lower bound on a date: `FILTER({var} >= "{date}"^^xsd:date)`.
    ///
    /// Requires the `xsd` prefix to be declared.
    pub fn filter_date_gte(&mut self, var: &str, date: &str) -> &mut Self {
        self.filters.push(format!(
            "FILTER({} >= {}^^xsd:date)",
            var,
            string_literal(date)
        ));
        self
    }

    /// Inclusive upper bound on a date: `FILTER({var} <= "{date}"^^xsd:date)`.
    pub fn filter_date_lte(&mut self, var: &str, date: &str) -> &mut Self {
        self.filters.push(format!(
            "FILTER({} <= {}^^xsd:date)",
            var,
            string_literal(date)
        ));
        self
    }

    /// Add GROUP BY terms. Every projected variable outside these terms
    /// must then be an aggregate.
    pub fn group_by(&mut self, terms: &[&str]) -> &mut Self {
        self.group_by_terms
            .extend(terms.iter().map(|t| t.to_string()));
        self
    }

    /// Add ORDER BY terms (e.g. `"DESC(?date)"`, `"?title"`).
    pub fn order_by(&mut self, terms: &[&str]) -> &mut Self {
        self.order_by_terms
            .extend(terms.iter().map(|t| t.to_string()));
        self
    }

    /// Set the maximum number of solutions to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Set the number of solutions to skip.
    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Number of FILTER clauses added so far.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Build the final query text.
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = self
            .prefixes
            .iter()
            .map(|(name, iri)| format!("PREFIX {}: <{}>", name, iri))
            .collect();

        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        parts.push(format!("SELECT {}{}", distinct, self.select_vars.join(" ")));

        parts.push("WHERE {".to_string());
        for p in &self.patterns {
            parts.push(format!("  {}", p));
        }
        for f in &self.filters {
            parts.push(format!("  {}", f));
        }
        parts.push("}".to_string());

        if !self.group_by_terms.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_terms.join(" ")));
        }
        if !self.order_by_terms.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_terms.join(" ")));
        }

        match (self.limit_val, self.offset_val) {
            (Some(l), Some(o)) => parts.push(format!("LIMIT {} OFFSET {}", l, o)),
            (Some(l), None) => parts.push(format!("LIMIT {}", l)),
            (None, Some(o)) => parts.push(format!("OFFSET {}", o)),
            (None, None) => {}
        }

        parts.join("\n")
    }
}
