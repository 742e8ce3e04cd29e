//! Process-wide registry of open environments
//!
//! LMDB must not be opened twice on the same path by one process. Every
//! [`IndexEnv`](crate::IndexEnv) on a directory therefore shares one
//! [`SharedEnv`]; the registry keeps weak references so the environment is
//! closed once the last handle is dropped.
//!
//! Options are fixed by the first opener. A later handle asking for different
//! options gets the existing environment and a debug log entry.

use crate::env::{open_env, StorageOptions};
use heed::Env;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sdfdex_core::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Environment shared by all handles on one directory
pub(crate) struct SharedEnv {
    pub(crate) env: Env,
    pub(crate) options: StorageOptions,
}

/// Global registry of open environments (canonical path -> weak reference)
static OPEN_ENVS: Lazy<Mutex<HashMap<PathBuf, Weak<SharedEnv>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Return the environment open on `path`, opening it if needed
pub(crate) fn acquire(path: &Path, options: &StorageOptions) -> Result<Arc<SharedEnv>> {
    let canonical = path.canonicalize()?;

    // Held across the open so two threads cannot both open the same path.
    let mut registry = OPEN_ENVS.lock();
    if let Some(shared) = registry.get(&canonical).and_then(Weak::upgrade) {
        if shared.options != *options {
            debug!(
                target: "sdfdex::env",
                path = ?canonical,
                "Environment already open; keeping its existing options"
            );
        }
        return Ok(shared);
    }

    registry.retain(|_, weak| weak.strong_count() > 0);
    let env = open_env(&canonical, options)?;
    let shared = Arc::new(SharedEnv {
        env,
        options: options.clone(),
    });
    registry.insert(canonical, Arc::downgrade(&shared));
    Ok(shared)
}
