use std::time::Duration;

mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use error::*;

/// Name of the kubernetes resource manager. Used as the field manager
/// when creating Secrets and as the `managed-by` label value.
pub const MANAGER_NAME: &str = "ns-meddler";

/// Label applied to every Secret created by the controller.
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Annotation recording which Secret a copy was created from,
/// formatted as `<namespace>/<name>`.
pub const SOURCE_ANNOTATION: &str = "ns-meddler/source";

/// Default name of both the source and the target Secret.
pub const DEFAULT_SECRET_NAME: &str = "default-tls";

/// Service account mount that holds the namespace the pod runs in.
pub const NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// How often every known namespace is redelivered as an `Added` event.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(5);

/// Delay before the first retry of a failed watch or listing.
pub(crate) const WATCH_BACKOFF_INITIAL: Duration = Duration::from_secs(1);

/// Upper bound for the delay between retries of a failing watch.
pub(crate) const WATCH_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Server-side timeout for a single watch request. Must stay below the
/// apiserver's hard limit of 295 seconds.
pub(crate) const WATCH_TIMEOUT_SECS: u32 = 290;

/// Capacity of the channel between the reflector and the dispatcher.
pub(crate) const EVENT_BUFFER: usize = 256;

/// Path of the liveness endpoint.
pub(crate) const HEALTH_PATH: &str = "/health";
