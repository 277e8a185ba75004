use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info};

use super::actions::{target_secret, SecretStore};
use crate::{config::Config, dispatch::NamespaceHandler, util::Error};

#[cfg(feature = "metrics")]
use crate::util::metrics::{ACTION_COUNTER, READ_HISTOGRAM, RECONCILE_COUNTER, WRITE_HISTOGRAM};

/// Ensures the target Secret exists in a namespace. Safe to invoke
/// any number of times, concurrently, for the same namespace.
pub struct Reconciler<S> {
    store: S,
    config: Arc<Config>,
}

/// Action to be taken upon a namespace during reconciliation.
#[derive(Debug)]
enum SecretAction {
    /// The target Secret is already present. Nothing is ever refreshed.
    NoOp,

    /// The target Secret is absent and will be copied from the
    /// contained source Secret.
    Create(Box<Secret>),
}

impl SecretAction {
    fn to_str(&self) -> &str {
        match self {
            SecretAction::NoOp => "NoOp",
            SecretAction::Create(_) => "Create",
        }
    }
}

/// How a successful reconciliation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The target Secret already existed.
    Present,

    /// This call created the target Secret.
    Created,

    /// Another caller created the target Secret between our
    /// existence check and our create.
    Converged,
}

impl Outcome {
    pub fn to_str(&self) -> &str {
        match self {
            Outcome::Present => "Present",
            Outcome::Created => "Created",
            Outcome::Converged => "Converged",
        }
    }
}

impl<S: SecretStore> Reconciler<S> {
    pub fn new(store: S, config: Arc<Config>) -> Self {
        Reconciler { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Makes sure the target Secret exists in `namespace`, copying
    /// the source Secret's data if it does not.
    pub async fn ensure_secret(&self, namespace: &str) -> Result<Outcome, Error> {
        #[cfg(feature = "metrics")]
        RECONCILE_COUNTER.with_label_values(&[namespace]).inc();

        // Benchmark the read phase of reconciliation.
        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let action = self.determine_action(namespace).await?;
        debug!(namespace, action = action.to_str(), "determined action");

        #[cfg(feature = "metrics")]
        {
            READ_HISTOGRAM
                .with_label_values(&[namespace, action.to_str()])
                .observe(start.elapsed().as_secs_f64());
            ACTION_COUNTER
                .with_label_values(&[namespace, action.to_str()])
                .inc();
        }

        match action {
            SecretAction::NoOp => Ok(Outcome::Present),
            SecretAction::Create(source) => {
                #[cfg(feature = "metrics")]
                let _timer = WRITE_HISTOGRAM
                    .with_label_values(&[namespace, "Create"])
                    .start_timer();
                self.create(namespace, &source).await
            }
        }
    }

    /// Read phase: the existence check is the idempotency guard, and
    /// the source Secret is only fetched when a copy is needed.
    async fn determine_action(&self, namespace: &str) -> Result<SecretAction, Error> {
        let target = &self.config.target_secret;
        if self.store.get(namespace, target).await?.is_some() {
            return Ok(SecretAction::NoOp);
        }
        Ok(SecretAction::Create(Box::new(self.source_secret().await?)))
    }

    /// Returns the template Secret from the controller's own namespace.
    async fn source_secret(&self) -> Result<Secret, Error> {
        let name = &self.config.source_secret;
        let own_namespace = &self.config.own_namespace;
        if own_namespace.is_empty() {
            return Err(Error::UnknownNamespace { name: name.clone() });
        }
        self.store
            .get(own_namespace, name)
            .await?
            .ok_or_else(|| Error::SourceSecretMissing {
                namespace: own_namespace.clone(),
                name: name.clone(),
            })
    }

    /// Write phase: a single create attempt. Losing the race to a
    /// concurrent create still leaves exactly one copy in place.
    async fn create(&self, namespace: &str, source: &Secret) -> Result<Outcome, Error> {
        let name = &self.config.target_secret;
        let secret = target_secret(source, name, namespace);
        match self.store.create(namespace, &secret).await {
            Ok(_) => {
                info!(namespace, secret = %name, "created secret");
                Ok(Outcome::Created)
            }
            Err(kube::Error::Api(ae)) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                debug!(namespace, secret = %name, "secret created concurrently");
                Ok(Outcome::Converged)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<S: SecretStore> NamespaceHandler for Reconciler<S> {
    async fn on_namespace_added(&self, namespace: &Namespace) -> Result<(), Error> {
        self.ensure_secret(&namespace.name_any()).await.map(|_| ())
    }
}
