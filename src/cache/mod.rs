//! Local view of the cluster's namespaces, kept current by a
//! namespace watcher.

use k8s_openapi::api::core::v1::Namespace;
use kube::{runtime::reflector::Store, ResourceExt};
use std::{fmt, sync::Arc};

mod informer;
mod source;

pub use informer::Informer;
pub use source::{namespace_stream, NamespaceStream};

#[cfg(test)]
pub use source::with_backoff;

/// Synchronously readable cache of every known namespace.
pub type NamespaceStore = Store<Namespace>;

/// Returns every namespace in `store`, ordered by name.
pub fn snapshot(store: &NamespaceStore) -> Vec<Arc<Namespace>> {
    let mut namespaces = store.state();
    namespaces.sort_by_cached_key(|ns| ns.name_any());
    namespaces
}

/// Kind of change a [`NamespaceEvent`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A change to a namespace as seen by the cache. Resyncs are
/// delivered as `Added` for namespaces that are already known.
#[derive(Clone, Debug)]
pub enum NamespaceEvent {
    Added(Namespace),
    Modified(Namespace),
    Deleted(Namespace),
}

impl NamespaceEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            NamespaceEvent::Added(_) => ChangeKind::Added,
            NamespaceEvent::Modified(_) => ChangeKind::Modified,
            NamespaceEvent::Deleted(_) => ChangeKind::Deleted,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            NamespaceEvent::Added(ns) | NamespaceEvent::Modified(ns) | NamespaceEvent::Deleted(ns) => ns,
        }
    }

    pub fn name(&self) -> String {
        self.namespace().name_any()
    }
}
