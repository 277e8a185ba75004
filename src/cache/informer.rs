use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{
        reflector::{store::Writer, ObjectRef},
        watcher,
    },
    ResourceExt,
};
use std::{collections::BTreeSet, time::Duration};
use tokio::{
    sync::mpsc::{error::SendError, Sender},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, trace, warn};

use super::{snapshot, NamespaceEvent, NamespaceStore, NamespaceStream};
use crate::util::Error;

#[cfg(feature = "metrics")]
use crate::util::metrics::{WATCH_EVENT_COUNTER, WATCH_RESTART_COUNTER};

/// Feeds a namespace watcher into a [`NamespaceStore`] and forwards
/// every change, plus periodic resyncs, to a channel.
pub struct Informer {
    stream: NamespaceStream,
    writer: Writer<Namespace>,
    resync_interval: Duration,
}

/// Why the loop woke up.
enum Wake {
    Resync,
    Watch(Option<watcher::Result<watcher::Event<Namespace>>>),
}

impl Informer {
    /// Waits for the initial listing and fills the store with it.
    /// Failure here leaves nothing to reconcile against and is
    /// reported to the caller.
    pub async fn init(mut stream: NamespaceStream, resync_interval: Duration) -> Result<Self, Error> {
        let event = stream.next().await.ok_or(Error::WatchEnded)??;
        let mut writer = Writer::default();
        writer.apply_watcher_event(&event);
        info!(namespaces = writer.as_reader().state().len(), "listed namespaces");
        Ok(Informer {
            stream,
            writer,
            resync_interval,
        })
    }

    /// Returns a handle to the store. Reads reflect the latest
    /// event applied by [`Informer::run`].
    pub fn store(&self) -> NamespaceStore {
        self.writer.as_reader()
    }

    /// Watches namespaces until the receiving end of `events` is
    /// dropped. Watch failures are retried by the stream's backoff.
    pub async fn run(mut self, events: Sender<NamespaceEvent>) {
        if let Err(SendError(event)) = self.watch_loop(&events).await {
            error!(
                namespace = %event.name(),
                "event receiver closed, namespace watch stopped"
            );
        }
    }

    async fn watch_loop(&mut self, events: &Sender<NamespaceEvent>) -> Result<(), SendError<NamespaceEvent>> {
        let mut resync_timer = time::interval_at(Instant::now() + self.resync_interval, self.resync_interval);
        resync_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = tokio::select! {
                _ = resync_timer.tick() => Wake::Resync,
                item = self.stream.next() => Wake::Watch(item),
            };
            match wake {
                Wake::Resync => resync(&self.store(), events).await?,
                Wake::Watch(Some(Ok(event))) => self.apply(event, events).await?,
                Wake::Watch(Some(Err(e))) => {
                    warn!(error = %e, "namespace watch failed");
                    self.restarted("error");
                }
                Wake::Watch(None) => {
                    error!("namespace watch ended");
                    return Ok(());
                }
            }
        }
    }

    /// Classifies one watcher event against the store, applies it
    /// and forwards the resulting changes.
    async fn apply(
        &mut self,
        event: watcher::Event<Namespace>,
        events: &Sender<NamespaceEvent>,
    ) -> Result<(), SendError<NamespaceEvent>> {
        let changes = match &event {
            watcher::Event::Applied(ns) if self.is_known(ns) => vec![NamespaceEvent::Modified(ns.clone())],
            watcher::Event::Applied(ns) => vec![NamespaceEvent::Added(ns.clone())],
            watcher::Event::Deleted(ns) => vec![NamespaceEvent::Deleted(ns.clone())],
            watcher::Event::Restarted(items) => {
                self.restarted("relist");
                self.diff(items)
            }
        };
        self.writer.apply_watcher_event(&event);
        if let watcher::Event::Restarted(items) = &event {
            info!(namespaces = items.len(), changes = changes.len(), "relisted namespaces");
        }
        for change in changes {
            deliver(change, events).await?;
        }
        Ok(())
    }

    fn is_known(&self, ns: &Namespace) -> bool {
        self.store().get(&ObjectRef::from_obj(ns)).is_some()
    }

    /// Changes between the store and a fresh listing: `Added` for new
    /// names, `Modified` for a new resourceVersion, `Deleted` for names
    /// that are gone.
    fn diff(&self, items: &[Namespace]) -> Vec<NamespaceEvent> {
        let store = self.store();
        let mut changes = Vec::new();
        for ns in items {
            match store.get(&ObjectRef::from_obj(ns)) {
                None => changes.push(NamespaceEvent::Added(ns.clone())),
                Some(known) if known.resource_version() != ns.resource_version() => {
                    changes.push(NamespaceEvent::Modified(ns.clone()))
                }
                Some(_) => {}
            }
        }
        let listed: BTreeSet<String> = items.iter().map(|ns| ns.name_any()).collect();
        for ns in snapshot(&store) {
            if !listed.contains(&ns.name_any()) {
                changes.push(NamespaceEvent::Deleted((*ns).clone()));
            }
        }
        changes
    }

    #[allow(unused_variables)]
    fn restarted(&self, reason: &str) {
        #[cfg(feature = "metrics")]
        WATCH_RESTART_COUNTER.with_label_values(&[reason]).inc();
    }
}

/// Redelivers every namespace in `store` as `Added`.
async fn resync(store: &NamespaceStore, events: &Sender<NamespaceEvent>) -> Result<(), SendError<NamespaceEvent>> {
    let namespaces = snapshot(store);
    debug!(namespaces = namespaces.len(), "resync");
    for ns in namespaces {
        deliver(NamespaceEvent::Added((*ns).clone()), events).await?;
    }
    Ok(())
}

async fn deliver(event: NamespaceEvent, events: &Sender<NamespaceEvent>) -> Result<(), SendError<NamespaceEvent>> {
    trace!(namespace = %event.name(), kind = %event.kind(), "namespace event");
    #[cfg(feature = "metrics")]
    WATCH_EVENT_COUNTER
        .with_label_values(&[event.kind().to_str()])
        .inc();
    events.send(event).await
}
