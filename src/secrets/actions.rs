use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;

use crate::util::{MANAGED_BY_LABEL, MANAGER_NAME, SOURCE_ANNOTATION};

/// Secret retrieval and creation, keyed by namespace and name.
#[async_trait]
pub trait SecretStore: Send + Sync + 'static {
    /// Returns the Secret, or `None` if it does not exist.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, kube::Error>;

    /// Creates the Secret. Fails with a 409 `kube::Error::Api` if a
    /// Secret with the same name already exists in the namespace.
    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret, kube::Error>;
}

/// [`SecretStore`] backed by a live cluster.
pub struct KubeSecrets {
    client: Client,
}

impl KubeSecrets {
    pub fn new(client: Client) -> Self {
        KubeSecrets { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecrets {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, kube::Error> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secret_api.get_opt(name).await
    }

    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret, kube::Error> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let pp = PostParams {
            field_manager: Some(MANAGER_NAME.to_owned()),
            ..Default::default()
        };
        secret_api.create(&pp, secret).await
    }
}

/// Returns the copy of `source` to create as `name` in `namespace`.
/// The data map is carried over byte for byte.
pub fn target_secret(source: &Secret, name: &str, namespace: &str) -> Secret {
    let origin = format!(
        "{}/{}",
        source.metadata.namespace.as_deref().unwrap_or_default(),
        source.metadata.name.as_deref().unwrap_or_default(),
    );
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_owned(),
                MANAGER_NAME.to_owned(),
            )])),
            annotations: Some(BTreeMap::from([(SOURCE_ANNOTATION.to_owned(), origin)])),
            ..Default::default()
        },
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Default::default()
    }
}
