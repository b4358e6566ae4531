//! Builder for creating and configuring Orchestrator instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use tokio::task;

use super::Orchestrator;
use crate::{
    catalog::TourCatalog,
    config::OrchestratorConfig,
    dom::Document,
    engine::EngineFactory,
    error::{Result, TourError},
    keyboard::KeyCombo,
    progress::ProgressStore,
    routes::RouteTable,
    storage::{FallbackStorage, MemoryStorage, Scope, SqliteStorage, Storage},
    waiter::WaitPolicy,
};

/// Session id used when none is configured.
pub const DEFAULT_SESSION: &str = "default";

enum StorageChoice {
    File(Option<PathBuf>),
    Memory,
    Custom {
        durable: Arc<dyn Storage>,
        session: Arc<dyn Storage>,
    },
}

/// Builder for creating and configuring Orchestrator instances.
pub struct OrchestratorBuilder {
    storage: StorageChoice,
    session_id: String,
    catalog: Option<TourCatalog>,
    routes: Option<RouteTable>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            storage: StorageChoice::File(None),
            session_id: DEFAULT_SESSION.to_string(),
            catalog: None,
            routes: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Sets a custom storage file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/tourguide/progress.db` or
    /// `~/.local/share/tourguide/progress.db`
    pub fn with_storage_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.storage = StorageChoice::File(Some(path.as_ref().to_path_buf()));
        }
        self
    }

    /// Sets the browsing session whose resume cursors are used.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Keeps all progress in memory.
    pub fn with_memory_storage(mut self) -> Self {
        self.storage = StorageChoice::Memory;
        self
    }

    /// Uses the given storages for the durable and session scopes.
    pub fn with_storages(mut self, durable: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        self.storage = StorageChoice::Custom { durable, session };
        self
    }

    /// Replaces the built-in tour catalog.
    pub fn with_catalog(mut self, catalog: TourCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replaces the built-in route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.config.wait_policy = policy;
        self
    }

    pub fn with_reset_shortcut(mut self, combo: KeyCombo) -> Self {
        self.config.reset_shortcut = combo;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the configured orchestrator.
    ///
    /// A storage file that cannot be opened is not an error: progress is
    /// then kept in memory for the lifetime of the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidCatalog` if a route points at a tour the
    /// catalog does not define, `TourError::Serialization` if the built-in
    /// data is malformed, and `TourError::XdgDirectory` if no default
    /// storage path can be determined.
    pub async fn build(
        self,
        document: Arc<dyn Document>,
        engines: Arc<dyn EngineFactory>,
    ) -> Result<Orchestrator> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => TourCatalog::builtin()?,
        };
        let routes = match self.routes {
            Some(routes) => routes,
            None => RouteTable::builtin()?,
        };
        catalog.check_routes(&routes)?;

        let (durable, session) = match self.storage {
            StorageChoice::Custom { durable, session } => (durable, session),
            StorageChoice::Memory => memory_storages(),
            StorageChoice::File(path) => {
                let path = match path {
                    Some(path) => path,
                    None => Self::default_storage_path()?,
                };
                open_storages(path, self.session_id).await
            }
        };

        Ok(Orchestrator::new(
            document,
            engines,
            catalog,
            routes,
            ProgressStore::new(durable, session),
            self.config,
        ))
    }

    /// Returns the default storage path following XDG Base Directory
    /// specification.
    pub fn default_storage_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("tourguide")
            .place_data_file("progress.db")
            .map_err(|e| TourError::XdgDirectory(e.to_string()))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn memory_storages() -> (Arc<dyn Storage>, Arc<dyn Storage>) {
    (Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
}

async fn open_storages(path: PathBuf, session_id: String) -> (Arc<dyn Storage>, Arc<dyn Storage>) {
    let shown = path.display().to_string();
    let opened = task::spawn_blocking(move || {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TourError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let durable = SqliteStorage::durable(&path)?;
        let session = SqliteStorage::session(&path, &session_id)?;
        Ok::<_, TourError>((durable, session))
    })
    .await
    .map_err(|e| TourError::Configuration {
        message: format!("Task join error: {e}"),
    });

    match opened {
        Ok(Ok((durable, session))) => (
            Arc::new(FallbackStorage::new(Box::new(durable), Scope::Durable)),
            Arc::new(FallbackStorage::new(Box::new(session), Scope::Session)),
        ),
        Ok(Err(e)) | Err(e) => {
            warn!("Cannot open progress storage at {shown}, keeping progress in memory: {e}");
            memory_storages()
        }
    }
}
