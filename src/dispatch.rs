use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tracing::{error, trace, warn};

use crate::{cache::NamespaceEvent, util::Error};

/// Subscriber logic invoked for every namespace that appears.
#[async_trait]
pub trait NamespaceHandler: Send + Sync {
    async fn on_namespace_added(&self, namespace: &Namespace) -> Result<(), Error>;
}

/// Feeds `Added` events to the handler one at a time until the
/// channel closes. Updates and deletions are ignored.
pub async fn dispatch<H>(mut events: Receiver<NamespaceEvent>, handler: Arc<H>)
where
    H: NamespaceHandler + ?Sized,
{
    while let Some(event) = events.recv().await {
        match event {
            NamespaceEvent::Added(namespace) => {
                if let Err(e) = handler.on_namespace_added(&namespace).await {
                    error!(
                        namespace = %namespace.name_any(),
                        error = %e,
                        "failed to reconcile namespace"
                    );
                }
            }
            other => trace!(namespace = %other.name(), kind = %other.kind(), "ignoring event"),
        }
    }
    warn!("namespace event stream ended");
}
