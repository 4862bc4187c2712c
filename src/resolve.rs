//! Turn user-supplied page and database references into IDs.
//!
//! IDs and URLs are handled by [`crate::reference::classify`]. Names are
//! looked up through a [`SearchProvider`]:
//! - exactly one case-insensitive exact title match wins
//! - several exact matches, or any number of partial matches, are ambiguous
//!   and reported with up to five candidates
//! - no match at all is an error

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::mcp::{NotionClient, ObjectKind, SearchMode, SearchResult, Transport};
use crate::reference::{classify, RefKind};

/// Candidates listed in an ambiguity error
const MAX_CANDIDATES: usize = 5;

/// Anything that can run a workspace search
pub trait SearchProvider {
    fn search_workspace(&mut self, query: &str) -> anyhow::Result<Vec<SearchResult>>;
}

impl<F> SearchProvider for F
where
    F: FnMut(&str) -> anyhow::Result<Vec<SearchResult>>,
{
    fn search_workspace(&mut self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        self(query)
    }
}

impl<T: Transport> SearchProvider for NotionClient<T> {
    fn search_workspace(&mut self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        Ok(self.search(query, Some(SearchMode::Workspace))?)
    }
}

/// One entry in an ambiguity report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    /// URL, or the ID when the result has no URL
    pub locator: String,
}

impl Candidate {
    fn from_result(result: &SearchResult) -> Self {
        let locator = if result.url.is_empty() {
            result.id.clone()
        } else {
            result.url.clone()
        };
        Self {
            title: result.title.clone(),
            locator,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} ({})", self.title, self.locator)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{kind} not found: {name}")]
    NotFound { name: String, kind: ObjectKind },

    #[error(
        "ambiguous {kind} name \"{name}\", matching {kind}s:\n{list}Use a {kind} URL or ID to be specific.",
        list = format_candidates(.candidates, *.remaining)
    )]
    Ambiguous {
        name: String,
        kind: ObjectKind,
        candidates: Vec<Candidate>,
        /// Matches beyond those listed
        remaining: usize,
    },

    #[error("could not extract {kind} ID from URL: {input}\nUse the {kind} ID directly instead.")]
    MalformedReference { input: String, kind: ObjectKind },

    #[error(transparent)]
    Search(#[from] anyhow::Error),
}

fn format_candidates(candidates: &[Candidate], remaining: usize) -> String {
    let mut out = String::new();
    for candidate in candidates {
        out.push_str(&candidate.to_string());
        out.push('\n');
    }
    if remaining > 0 {
        out.push_str(&format!("  ... and {remaining} more\n"));
    }
    out
}

fn ambiguous(name: &str, kind: ObjectKind, matches: &[&SearchResult]) -> ResolveError {
    ResolveError::Ambiguous {
        name: name.to_string(),
        kind,
        candidates: matches
            .iter()
            .take(MAX_CANDIDATES)
            .map(|r| Candidate::from_result(r))
            .collect(),
        remaining: matches.len().saturating_sub(MAX_CANDIDATES),
    }
}

/// Resolve a free-text name to the ID of a single page or database
pub fn resolve_by_name(
    name: &str,
    kind: ObjectKind,
    provider: &mut impl SearchProvider,
) -> Result<String, ResolveError> {
    let results = provider.search_workspace(name)?;
    let candidates: Vec<&SearchResult> = results.iter().filter(|r| r.is_kind(kind)).collect();
    let needle = name.to_lowercase();

    let exact: Vec<&SearchResult> = candidates
        .iter()
        .copied()
        .filter(|r| r.title.to_lowercase() == needle)
        .collect();
    debug!(
        name,
        %kind,
        results = results.len(),
        candidates = candidates.len(),
        exact = exact.len(),
        "Resolving by name"
    );

    match exact.as_slice() {
        [only] => return Ok(only.id.clone()),
        [] => {}
        _ => return Err(ambiguous(name, kind, &exact)),
    }

    let partial: Vec<&SearchResult> = candidates
        .into_iter()
        .filter(|r| r.title.to_lowercase().contains(&needle))
        .collect();
    if partial.is_empty() {
        return Err(ResolveError::NotFound {
            name: name.to_string(),
            kind,
        });
    }
    Err(ambiguous(name, kind, &partial))
}

/// Resolve an ID, URL or name of the given kind
pub fn resolve_reference(
    input: &str,
    kind: ObjectKind,
    provider: &mut impl SearchProvider,
) -> Result<String, ResolveError> {
    let reference = classify(input);
    match (reference.kind(), reference.id()) {
        (RefKind::Id, Some(id)) => Ok(id.to_string()),
        (RefKind::Name, _) => resolve_by_name(reference.raw(), kind, provider),
        _ => Err(ResolveError::MalformedReference {
            input: reference.raw().to_string(),
            kind,
        }),
    }
}

pub fn resolve_page_id(
    input: &str,
    provider: &mut impl SearchProvider,
) -> Result<String, ResolveError> {
    resolve_reference(input, ObjectKind::Page, provider)
}

pub fn resolve_database_id(
    input: &str,
    provider: &mut impl SearchProvider,
) -> Result<String, ResolveError> {
    resolve_reference(input, ObjectKind::Database, provider)
}
