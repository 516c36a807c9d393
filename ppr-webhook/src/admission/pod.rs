// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::time::Duration;
use kube::core::{
    admission::{AdmissionRequest, AdmissionResponse, Operation},
    DynamicObject,
};
use tracing::{debug, error, warn};

use ppr_hooks::hook::{pod_from_object, HookSet};

use crate::admission::error::{AdmissionError, AdmissionResult};

/// Changes the hooks made to a pod, as a JSON patch against the typed pod
#[derive(Debug)]
pub struct PodMutation {
    pub patch: json_patch::Patch,
    pub warnings: Vec<String>,
}

/// Run the hooks for a single admission operation on a pod object
pub async fn mutate_pod(hooks: &HookSet, operation: &Operation, obj: &DynamicObject) -> AdmissionResult<PodMutation> {
    let pod = pod_from_object(obj)?;
    let before = serde_json::to_value(&pod)?;

    let (after, warnings) = match operation {
        Operation::Create => {
            let outcome = hooks.mutate_create_physical(pod).await?;
            let warnings = outcome.report.probe_failures.iter().map(ToString::to_string).collect();
            (outcome.pod, warnings)
        },
        Operation::Update => (hooks.mutate_update_physical(pod), Vec::new()),
        _ => (pod, Vec::new()),
    };

    Ok(PodMutation {
        patch: json_patch::diff(&before, &serde_json::to_value(&after)?),
        warnings,
    })
}

/// Answer an admission request for a pod. Create and update requests are
/// mutated, anything else is allowed unchanged. Any failure, including the
/// deadline expiring, denies the request rather than admitting a partially
/// rewritten pod. Without a timeout the hooks run until they finish.
pub async fn review_pod(
    hooks: &HookSet,
    request: &AdmissionRequest<DynamicObject>,
    timeout: Option<Duration>,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);

    if !matches!(request.operation, Operation::Create | Operation::Update) {
        debug!(event = "Ignored", uid = %request.uid, operation = ?request.operation);
        return response;
    }

    let Some(obj) = request.object.as_ref() else {
        debug!(event = "Ignored", uid = %request.uid, reason = "no object");
        return response;
    };

    let mutation = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, mutate_pod(hooks, &request.operation, obj))
            .await
            .unwrap_or(Err(AdmissionError::Timeout(timeout))),
        None => mutate_pod(hooks, &request.operation, obj).await,
    };

    let mutation = match mutation {
        Ok(mutation) => mutation,
        Err(err) => {
            error!(event = "Denied", uid = %request.uid, name = %request.name, error = %err);
            return response.deny(err.to_string());
        },
    };

    for warning in &mutation.warnings {
        warn!(event = "MutationWarning", uid = %request.uid, warning = warning.as_str());
    }

    let mut response = response;
    if !mutation.warnings.is_empty() {
        response.warnings = Some(mutation.warnings);
    }

    if mutation.patch.0.is_empty() {
        return response;
    }

    match response.clone().with_patch(mutation.patch) {
        Ok(response) => response,
        Err(err) => {
            error!(event = "Denied", uid = %request.uid, error = %err);
            response.deny(format!("failed to serialize patch: {}", err))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::{Pod, PodSpec};
    use kube::core::admission::AdmissionReview;
    use serde_json::{json, Value};

    use ppr_common::constant::MUTATED_BY_HOOK_ANNOTATION;
    use ppr_hooks::hook::context::Context;
    use ppr_hooks::hook::kind::ReferenceKind;
    use ppr_hooks::hook::testing::{
        config_map_volume, context, guest_pod, host_pod, FakeGuest, FakeHost, TEST_SUFFIX,
    };
    use ppr_hooks::hook::traits::GuestPods;
    use ppr_hooks::translate::SuffixTranslator;

    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

    fn host_object() -> Value {
        let mut pod = host_pod("somepod-x-test-x-suffix", "somepod", "test", PodSpec {
            volumes: Some(vec![config_map_volume("cfg", "app-config-x-test-x-suffix")]),
            ..Default::default()
        });
        pod.spec.as_mut().unwrap().containers = vec![Default::default()];

        let mut value = serde_json::to_value(pod).unwrap();
        value["apiVersion"] = json!("v1");
        value["kind"] = json!("Pod");
        value
    }

    fn guest() -> FakeGuest {
        FakeGuest::with_pods(vec![guest_pod("somepod", "test", PodSpec {
            volumes: Some(vec![config_map_volume("cfg", "app-config")]),
            ..Default::default()
        })])
    }

    fn request(operation: &str, object: Value) -> AdmissionRequest<DynamicObject> {
        let review: AdmissionReview<DynamicObject> = serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "kind": { "group": "", "version": "v1", "kind": object["kind"].clone() },
                "resource": { "group": "", "version": "v1", "resource": "pods" },
                "name": "somepod-x-test-x-suffix",
                "namespace": "host",
                "operation": operation,
                "userInfo": {},
                "object": object,
                "dryRun": false,
            },
        })).unwrap();

        review.try_into().unwrap()
    }

    fn hooks(host: FakeHost, guest: FakeGuest) -> HookSet {
        HookSet::all(Arc::new(context(host, guest, "test")))
    }

    // Apply the response patch to the request object
    fn patched(object: &Value, response: &AdmissionResponse) -> Pod {
        let mut doc = object.clone();
        if let Some(bytes) = response.patch.as_ref() {
            let patch: json_patch::Patch = serde_json::from_slice(bytes).unwrap();
            json_patch::patch(&mut doc, &patch.0).unwrap();
        }
        serde_json::from_value(doc).unwrap()
    }

    #[tokio::test]
    async fn create_points_volume_at_host_config_map() {
        let host = FakeHost::default().with_object(ReferenceKind::ConfigMap, "test", "app-config");
        let object = host_object();

        let response = review_pod(&hooks(host, guest()), &request("CREATE", object.clone()), TIMEOUT).await;

        assert!(response.allowed);
        let pod = patched(&object, &response);
        let spec = pod.spec.as_ref().unwrap();
        assert_eq!(spec.volumes.as_ref().unwrap()[0].config_map.as_ref().unwrap().name, "app-config");
        assert_eq!(
            pod.metadata.annotations.unwrap()[MUTATED_BY_HOOK_ANNOTATION],
            "prefer-parent-configmaps-hook"
        );
        assert!(response.warnings.is_none());
    }

    #[tokio::test]
    async fn create_without_host_object_only_marks() {
        let object = host_object();

        let response = review_pod(&hooks(FakeHost::default(), guest()), &request("CREATE", object.clone()), TIMEOUT).await;

        assert!(response.allowed);
        let pod = patched(&object, &response);
        assert_eq!(
            pod.spec.unwrap().volumes.unwrap()[0].config_map.as_ref().unwrap().name,
            "app-config-x-test-x-suffix"
        );
        assert!(pod.metadata.annotations.unwrap().contains_key(MUTATED_BY_HOOK_ANNOTATION));
    }

    #[tokio::test]
    async fn probe_failures_become_warnings() {
        let host = FakeHost::default().failing_on("app-config");

        let response = review_pod(&hooks(host, guest()), &request("CREATE", host_object()), TIMEOUT).await;

        assert!(response.allowed);
        let warnings = response.warnings.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("configmap test/app-config"));
    }

    #[tokio::test]
    async fn warnings_survive_when_nothing_changes() {
        let mut object = host_object();
        object["metadata"]["annotations"][MUTATED_BY_HOOK_ANNOTATION] =
            json!("prefer-parent-configmaps-hook,prefer-parent-secrets-hook");
        let host = FakeHost::default().failing_on("app-config");

        let response = review_pod(&hooks(host, guest()), &request("CREATE", object), TIMEOUT).await;

        assert!(response.allowed);
        assert!(response.patch.is_none());
        let warnings = response.warnings.unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("configmap test/app-config"));
    }

    #[tokio::test]
    async fn missing_guest_pod_denies() {
        let host = FakeHost::default().with_object(ReferenceKind::ConfigMap, "test", "app-config");

        let response = review_pod(&hooks(host, FakeGuest::default()), &request("CREATE", host_object()), TIMEOUT).await;

        assert!(!response.allowed);
        assert!(response.patch.is_none());
        assert!(response.result.message.contains("cannot resolve guest workload"));
    }

    #[tokio::test]
    async fn other_kinds_are_denied() {
        let object = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "app-config", "namespace": "host" },
        });

        let response = review_pod(&hooks(FakeHost::default(), guest()), &request("CREATE", object), TIMEOUT).await;

        assert!(!response.allowed);
        assert!(response.result.message.contains("not a pod"));
    }

    #[tokio::test]
    async fn update_marks_both_hooks() {
        let object = host_object();
        let host = FakeHost::default().with_object(ReferenceKind::ConfigMap, "test", "app-config");

        let response = review_pod(&hooks(host.clone(), guest()), &request("UPDATE", object.clone()), TIMEOUT).await;

        assert!(response.allowed);
        let pod = patched(&object, &response);
        assert_eq!(
            pod.spec.unwrap().volumes.unwrap()[0].config_map.as_ref().unwrap().name,
            "app-config-x-test-x-suffix"
        );
        assert_eq!(
            pod.metadata.annotations.unwrap()[MUTATED_BY_HOOK_ANNOTATION],
            "prefer-parent-configmaps-hook,prefer-parent-secrets-hook"
        );
        assert_eq!(host.calls(), 0);
    }

    #[tokio::test]
    async fn delete_is_allowed_unchanged() {
        let response = review_pod(&hooks(FakeHost::default(), guest()), &request("DELETE", host_object()), TIMEOUT).await;

        assert!(response.allowed);
        assert!(response.patch.is_none());
    }

    struct StalledGuest;

    #[async_trait]
    impl GuestPods for StalledGuest {
        async fn get_pod(&self, name: &str, _namespace: &str) -> kube::Result<Pod> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(kube::Error::Service(format!("{} never answered", name).into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_denies() {
        let ctx = Context::new(
            Arc::new(FakeHost::default().with_object(ReferenceKind::ConfigMap, "test", "app-config")),
            Arc::new(StalledGuest),
            Arc::new(SuffixTranslator::new(TEST_SUFFIX)),
            "test",
        );
        let hooks = HookSet::all(Arc::new(ctx));

        let response = review_pod(&hooks, &request("CREATE", host_object()), Some(Duration::from_secs(1))).await;

        assert!(!response.allowed);
        assert!(response.patch.is_none());
        assert!(response.result.message.contains("did not finish"));
    }

    #[tokio::test]
    async fn no_timeout_runs_to_completion() {
        let host = FakeHost::default().with_object(ReferenceKind::ConfigMap, "test", "app-config");
        let object = host_object();

        let response = review_pod(&hooks(host, guest()), &request("CREATE", object.clone()), None).await;

        assert!(response.allowed);
        let pod = patched(&object, &response);
        assert_eq!(pod.spec.unwrap().volumes.unwrap()[0].config_map.as_ref().unwrap().name, "app-config");
    }
}
