use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{error, info};

use crate::secrets::{Outcome, Reconciler, SecretStore};

/// Tally of a bootstrap sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub total: usize,
    pub present: usize,
    pub created: usize,
    pub converged: usize,
    pub failed: usize,
}

/// Reconciles every namespace in `namespaces`, in order. A failing
/// namespace is logged and skipped.
pub async fn sweep<S: SecretStore>(reconciler: &Reconciler<S>, namespaces: &[Arc<Namespace>]) -> SweepSummary {
    let mut summary = SweepSummary {
        total: namespaces.len(),
        ..Default::default()
    };
    info!(
        namespaces = summary.total,
        secret = %reconciler.config().target_secret,
        "going through existing namespaces"
    );
    for ns in namespaces {
        let name = ns.name_any();
        match reconciler.ensure_secret(&name).await {
            Ok(outcome) => {
                info!(namespace = %name, outcome = outcome.to_str(), "reconciled existing namespace");
                match outcome {
                    Outcome::Present => summary.present += 1,
                    Outcome::Created => summary.created += 1,
                    Outcome::Converged => summary.converged += 1,
                }
            }
            Err(e) => {
                error!(namespace = %name, error = %e, "failed to reconcile existing namespace");
                summary.failed += 1;
            }
        }
    }
    info!(
        created = summary.created,
        present = summary.present,
        converged = summary.converged,
        failed = summary.failed,
        "bootstrap sweep finished"
    );
    summary
}
