use std::backtrace::Backtrace;

/// All errors possible to occur while running the controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any error originating from the `kube-rs` crate
    #[error("Kubernetes reported error: {source}")]
    KubeError {
        #[from]
        source: kube::Error,
        backtrace: Backtrace,
    },

    /// The namespace watcher failed before the initial listing
    /// completed.
    #[error("Namespace watch failed: {source}")]
    WatchError {
        #[from]
        source: kube::runtime::watcher::Error,
    },

    /// The namespace watch stream ended without yielding anything.
    #[error("Namespace watch ended before the initial listing")]
    WatchEnded,

    /// The template Secret does not exist. Affects every namespace alike.
    #[error("Source secret {namespace}/{name} not found")]
    SourceSecretMissing { namespace: String, name: String },

    /// The controller's own namespace could not be determined, so the
    /// source Secret cannot be looked up.
    #[error("Cannot look up source secret {name}: own namespace is unknown")]
    UnknownNamespace { name: String },

    /// Liveness server failed to bind or exited.
    #[error("Liveness server error: {source}")]
    ServerError {
        #[from]
        source: hyper::Error,
    },
}
