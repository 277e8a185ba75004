mod actions;
mod reconcile;

pub use actions::{KubeSecrets, SecretStore};
pub use reconcile::{Outcome, Reconciler};
