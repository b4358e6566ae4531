//! Mapping page paths to tours.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TourError};
use crate::models::TourId;

const BUILTIN_ROUTES: &str = include_str!("../assets/routes.json");

/// How a rule compares against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    /// The whole path must be equal.
    Exact(String),
    /// The path must start with the given text.
    Prefix(String),
}

impl RouteMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RouteMatcher::Exact(expected) => path == expected.as_str(),
            RouteMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RouteMatcher::Exact(_) => "exact",
            RouteMatcher::Prefix(_) => "prefix",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            RouteMatcher::Exact(path) | RouteMatcher::Prefix(path) => path,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum MatchKind {
    Exact,
    Prefix,
}

#[derive(Deserialize)]
struct RuleData {
    #[serde(rename = "match")]
    kind: MatchKind,
    path: String,
    tour: TourId,
}

/// One `(matcher, tour)` entry of a route table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RuleData")]
pub struct RouteRule {
    pub matcher: RouteMatcher,
    pub tour: TourId,
}

impl From<RuleData> for RouteRule {
    fn from(data: RuleData) -> Self {
        let matcher = match data.kind {
            MatchKind::Exact => RouteMatcher::Exact(data.path),
            MatchKind::Prefix => RouteMatcher::Prefix(data.path),
        };
        Self {
            matcher,
            tour: data.tour,
        }
    }
}

impl RouteRule {
    pub fn exact(path: impl Into<String>, tour: impl Into<String>) -> Self {
        Self {
            matcher: RouteMatcher::Exact(path.into()),
            tour: TourId::new(tour),
        }
    }

    pub fn prefix(path: impl Into<String>, tour: impl Into<String>) -> Self {
        Self {
            matcher: RouteMatcher::Prefix(path.into()),
            tour: TourId::new(tour),
        }
    }
}

/// An ordered list of route rules. The first matching rule wins, so a
/// broader prefix listed earlier shadows narrower rules after it.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The product's route table.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Serialization` if the bundled data is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_ROUTES)
    }

    /// Parses a JSON array of `{ "match", "path", "tour" }` objects.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Serialization` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<RouteRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    /// Loads a route table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `TourError::FileSystem` if the file cannot be read, or
    /// `TourError::Serialization` if it is malformed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TourError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The tour for a page path. Query string and fragment are ignored.
    pub fn resolve(&self, path: &str) -> Option<&TourId> {
        let path = strip_query(path);
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(path))
            .map(|rule| &rule.tour)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

fn strip_query(path: &str) -> &str {
    path.find(|c| c == '?' || c == '#').map_or(path, |end| &path[..end])
}
