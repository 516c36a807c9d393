// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use k8s_openapi::api::core::v1::Pod;
use kube::{Resource, ResourceExt};

use ppr_common::constant::{OBJECT_NAME_ANNOTATION, OBJECT_NAMESPACE_ANNOTATION};
use ppr_common::telemetry::debug;

use crate::error::{HookError, Result};
use crate::hook::traits::GuestPods;

/// Fetch the guest pod a host pod was synced from, as named by the identity
/// annotations the synchronizer wrote on the host pod.
pub async fn fetch_guest_pod(guest: &dyn GuestPods, host_pod: &Pod) -> Result<Pod> {
    let pod_key = object_key(host_pod);
    let annotation = |key: &str| {
        host_pod
            .annotations()
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| HookError::CannotResolveGuestWorkload {
                pod: pod_key.clone(),
                reason: format!("missing annotation `{}`", key),
            })
    };

    let name = annotation(OBJECT_NAME_ANNOTATION)?;
    let namespace = annotation(OBJECT_NAMESPACE_ANNOTATION)?;

    debug!(event = "FetchGuestPod", pod = %pod_key, guest_pod = %format!("{}/{}", namespace, name));

    guest.get_pod(&name, &namespace).await.map_err(|e| HookError::CannotResolveGuestWorkload {
        pod: pod_key.clone(),
        reason: format!("failed getting guest pod {}/{}: {}", namespace, name, e),
    })
}

/// `namespace/name` of an object, for logs and errors
pub fn object_key<K: Resource>(obj: &K) -> String {
    format!("{}/{}", obj.namespace().unwrap_or_default(), obj.name_any())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::testing::{guest_pod, host_pod, FakeGuest};

    #[tokio::test]
    async fn fetches_by_identity_annotations() {
        let guest = FakeGuest::with_pods(vec![guest_pod("somepod", "test", Default::default())]);
        let pod = host_pod("somepod-x-test-x-suffix", "somepod", "test", Default::default());

        let fetched = fetch_guest_pod(&guest, &pod).await.unwrap();

        assert_eq!(fetched.name_any(), "somepod");
        assert_eq!(fetched.namespace().as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn missing_guest_pod_is_fatal() {
        let guest = FakeGuest::with_pods(vec![]);
        let pod = host_pod("somepod-x-test-x-suffix", "somepod", "test", Default::default());

        let err = fetch_guest_pod(&guest, &pod).await.unwrap_err();

        assert!(matches!(err, HookError::CannotResolveGuestWorkload { .. }));
    }

    #[tokio::test]
    async fn missing_annotations_are_fatal() {
        let guest = FakeGuest::with_pods(vec![guest_pod("somepod", "test", Default::default())]);
        let mut pod = host_pod("somepod-x-test-x-suffix", "somepod", "test", Default::default());
        pod.metadata.annotations.as_mut().unwrap().remove(OBJECT_NAMESPACE_ANNOTATION);

        let err = fetch_guest_pod(&guest, &pod).await.unwrap_err();

        assert!(err.to_string().contains(OBJECT_NAMESPACE_ANNOTATION));
        assert_eq!(guest.calls(), 0);
    }
}
