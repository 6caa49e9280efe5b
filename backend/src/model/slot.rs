//! Load-once holder for the process-wide deployment

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use super::artifact::load_deployment;
use super::deployment::Deployment;
use super::ModelError;

/// Result of a load attempt
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    /// A deployment was already installed
    AlreadyLoaded,
    /// Another caller has claimed the load, or it has already failed
    AlreadyAttempted,
    Failed(ModelError),
}

/// Starts empty and is filled at most once. Readers never block: until the
/// load finishes they simply see no deployment.
#[derive(Debug, Default)]
pub struct ModelSlot {
    deployment: OnceLock<Arc<Deployment>>,
    claimed: AtomicBool,
    failure: OnceLock<String>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Deployment>> {
        self.deployment.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.deployment.get().is_some()
    }

    /// Message of the failed load, if it failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    pub fn load_once(&self, path: &Path, expected_version: Option<&str>) -> LoadOutcome {
        self.load_with(|| load_deployment(path, expected_version))
    }

    /// Run `load` unless some caller already has. Only the first caller's
    /// closure ever runs; a failed load is not retried.
    pub fn load_with(
        &self,
        load: impl FnOnce() -> Result<Deployment, ModelError>,
    ) -> LoadOutcome {
        if self.is_loaded() {
            return LoadOutcome::AlreadyLoaded;
        }
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return if self.is_loaded() {
                LoadOutcome::AlreadyLoaded
            } else {
                LoadOutcome::AlreadyAttempted
            };
        }

        match load() {
            Ok(deployment) => {
                let _ = self.deployment.set(Arc::new(deployment));
                LoadOutcome::Loaded
            }
            Err(err) => {
                let _ = self.failure.set(err.to_string());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Install a deployment built elsewhere
    pub fn install(&self, deployment: Deployment) -> LoadOutcome {
        self.load_with(|| Ok(deployment))
    }
}
