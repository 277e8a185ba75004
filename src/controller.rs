use kube::Client;
use std::{fmt, sync::Arc};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::info;

use crate::{
    bootstrap::{self, SweepSummary},
    cache::{self, namespace_stream, Informer, NamespaceStore, NamespaceStream},
    config::Config,
    dispatch::dispatch,
    secrets::{KubeSecrets, Reconciler, SecretStore},
    server,
    util::{Error, EVENT_BUFFER},
};

/// Lifecycle of the controller. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Building the namespace cache.
    Initializing,

    /// Reconciling every namespace from the initial snapshot.
    Bootstrapping,

    /// Reacting to live events until the process exits.
    Watching,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Initializing => "Initializing",
            Phase::Bootstrapping => "Bootstrapping",
            Phase::Watching => "Watching",
        })
    }
}

/// Handle to a controller that has finished bootstrapping.
pub struct Watching {
    store: NamespaceStore,
    summary: SweepSummary,
    informer: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl Watching {
    pub fn phase(&self) -> Phase {
        Phase::Watching
    }

    /// Live view of the namespace cache.
    pub fn store(&self) -> &NamespaceStore {
        &self.store
    }

    /// Result of the bootstrap sweep.
    pub fn summary(&self) -> SweepSummary {
        self.summary
    }

    /// Stops the background tasks.
    pub fn abort(&self) {
        self.informer.abort();
        self.dispatcher.abort();
    }
}

/// Builds the cache, starts the watch and dispatch tasks, then sweeps
/// the initial snapshot. Live events may be reconciled while the
/// sweep is still running.
pub async fn start<S: SecretStore>(
    namespaces: NamespaceStream,
    secrets: S,
    config: Arc<Config>,
) -> Result<Watching, Error> {
    info!(phase = %Phase::Initializing, "controller phase");
    let informer = Informer::init(namespaces, config.resync_interval).await?;
    let store = informer.store();
    let snapshot = cache::snapshot(&store);

    let reconciler = Arc::new(Reconciler::new(secrets, config));
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let informer_task = tokio::spawn(informer.run(tx));
    let dispatcher = tokio::spawn(dispatch(rx, reconciler.clone()));
    info!("watching for namespaces");

    info!(phase = %Phase::Bootstrapping, "controller phase");
    let summary = bootstrap::sweep(&reconciler, &snapshot).await;

    info!(phase = %Phase::Watching, "controller phase");
    Ok(Watching {
        store,
        summary,
        informer: informer_task,
        dispatcher,
    })
}

/// Entrypoint for the controller. Only returns on a fatal error.
pub async fn run(client: Client, config: Config) -> Result<(), Error> {
    let port = config.port;
    let watching = start(
        namespace_stream(client.clone()),
        KubeSecrets::new(client),
        Arc::new(config),
    )
    .await?;
    info!(
        phase = %watching.phase(),
        namespaces = watching.store().state().len(),
        failed = watching.summary().failed,
        "controller started"
    );
    let result = server::run_server(port).await;
    watching.abort();
    result
}
