use std::{fs, path::Path, time::Duration};
use tracing::{info, warn};

use crate::util::{DEFAULT_RESYNC_INTERVAL, DEFAULT_SECRET_NAME};

/// Runtime configuration shared by every component. Built once at
/// startup and handed out behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Name of the template Secret in the controller's own namespace.
    pub source_secret: String,

    /// Name given to the copy created in every namespace.
    pub target_secret: String,

    /// Namespace the controller runs in. Empty if it could not be
    /// determined, in which case every reconciliation fails.
    pub own_namespace: String,

    /// Interval at which all known namespaces are redelivered.
    pub resync_interval: Duration,

    /// Port for the liveness endpoint.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_secret: DEFAULT_SECRET_NAME.to_owned(),
            target_secret: DEFAULT_SECRET_NAME.to_owned(),
            own_namespace: String::new(),
            resync_interval: DEFAULT_RESYNC_INTERVAL,
            port: 8080,
        }
    }
}

/// Reads the controller's namespace from the service account mount.
/// Falls back to an empty identity if the file is missing or empty.
pub fn read_own_namespace(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(data) => {
            let namespace = data.trim();
            if namespace.is_empty() {
                warn!(path = %path.display(), "namespace file is empty");
            } else {
                info!(namespace, "detected own namespace");
            }
            namespace.to_owned()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read own namespace");
            String::new()
        }
    }
}
