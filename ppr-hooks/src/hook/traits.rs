// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::{Api, Client};

use crate::hook::kind::ReferenceKind;

// Read access to the host cluster namespace holding operator provided objects
#[async_trait]
pub trait HostResources: Send + Sync {
    /// Whether an object of `kind` named `name` exists in `namespace`. A
    /// missing object is `Ok(false)`, never an error.
    async fn exists(&self, kind: ReferenceKind, name: &str, namespace: &str) -> kube::Result<bool>;
}

// Read access to pods of the guest cluster
#[async_trait]
pub trait GuestPods: Send + Sync {
    async fn get_pod(&self, name: &str, namespace: &str) -> kube::Result<Pod>;
}

#[async_trait]
impl HostResources for Client {
    async fn exists(&self, kind: ReferenceKind, name: &str, namespace: &str) -> kube::Result<bool> {
        // Only metadata is fetched so secret data never leaves the API server
        let found = match kind {
            ReferenceKind::ConfigMap => Api::<ConfigMap>::namespaced(self.clone(), namespace)
                .get_metadata_opt(name)
                .await?
                .is_some(),
            ReferenceKind::Secret => Api::<Secret>::namespaced(self.clone(), namespace)
                .get_metadata_opt(name)
                .await?
                .is_some(),
        };

        Ok(found)
    }
}

#[async_trait]
impl GuestPods for Client {
    async fn get_pod(&self, name: &str, namespace: &str) -> kube::Result<Pod> {
        Api::<Pod>::namespaced(self.clone(), namespace).get(name).await
    }
}
