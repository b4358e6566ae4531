//! The tour catalog: every known tour, keyed by id.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Result, TourError};
use crate::models::{TourDefinition, TourId};
use crate::routes::RouteTable;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Deserialize)]
struct CatalogData {
    tours: Vec<TourDefinition>,
}

/// Immutable collection of tour definitions.
#[derive(Debug, Clone, Default)]
pub struct TourCatalog {
    tours: BTreeMap<TourId, Arc<TourDefinition>>,
    order: Vec<TourId>,
}

impl TourCatalog {
    /// Builds a catalog, rejecting duplicate tour ids and duplicate step ids
    /// within a tour.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidCatalog` on duplicate ids.
    pub fn new(tours: Vec<TourDefinition>) -> Result<Self> {
        let mut catalog = Self::default();
        for tour in tours {
            let mut seen = HashSet::new();
            if let Some(step) = tour.steps.iter().find(|s| !seen.insert(&s.id)) {
                return Err(TourError::invalid_catalog(format!(
                    "step '{}' appears twice in tour '{}'",
                    step.id, tour.id
                )));
            }
            if catalog.tours.contains_key(&tour.id) {
                return Err(TourError::invalid_catalog(format!(
                    "tour '{}' is defined twice",
                    tour.id
                )));
            }
            catalog.order.push(tour.id.clone());
            catalog.tours.insert(tour.id.clone(), Arc::new(tour));
        }
        Ok(catalog)
    }

    /// The product's tours.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses a `{ "tours": [...] }` document.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Serialization` for malformed JSON or selectors
    /// outside the supported grammar, and `TourError::InvalidCatalog` on
    /// duplicate ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::new(data.tours)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `TourError::FileSystem` if the file cannot be read, or any
    /// error of [`from_json`](Self::from_json).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TourError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &TourId) -> Option<Arc<TourDefinition>> {
        self.tours.get(id).cloned()
    }

    /// Looks up a tour that must exist.
    ///
    /// # Errors
    ///
    /// Returns `TourError::TourNotFound` for unknown ids.
    pub fn require(&self, id: &str) -> Result<Arc<TourDefinition>> {
        self.tours
            .get(id)
            .cloned()
            .ok_or_else(|| TourError::TourNotFound { id: id.to_string() })
    }

    /// Tours in definition order.
    pub fn tours(&self) -> impl Iterator<Item = &Arc<TourDefinition>> {
        self.order.iter().filter_map(|id| self.tours.get(id))
    }

    pub fn tour_ids(&self) -> &[TourId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Checks that every route points at a tour of this catalog.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidCatalog` naming the first dangling route.
    pub fn check_routes(&self, routes: &RouteTable) -> Result<()> {
        match routes
            .rules()
            .iter()
            .find(|rule| !self.tours.contains_key(&rule.tour))
        {
            Some(rule) => Err(TourError::invalid_catalog(format!(
                "route '{}' points at unknown tour '{}'",
                rule.matcher.path(),
                rule.tour
            ))),
            None => Ok(()),
        }
    }
}
