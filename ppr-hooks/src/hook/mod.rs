// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

pub mod annotations;
pub mod context;
pub mod guest;
pub mod kind;
pub mod locate;
pub mod probe;
pub mod rewrite;
pub mod traits;
pub mod utils;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::core::DynamicObject;

use ppr_common::telemetry::{debug, info};

use crate::error::{HookError, Result};
use crate::hook::annotations::{mark_processed, should_skip};
use crate::hook::context::Context;
use crate::hook::guest::{fetch_guest_pod, object_key};
use crate::hook::kind::ReferenceKind;
use crate::hook::locate::{locate_env_references, locate_volume_references};
use crate::hook::rewrite::{RewriteEngine, RewriteReport};

/// Result of running a hook on a pod
#[derive(Debug, Clone)]
pub struct HookOutcome {
    pub pod: Pod,
    pub report: RewriteReport,
}

impl HookOutcome {
    fn unchanged(pod: Pod) -> Self {
        Self { pod, report: RewriteReport::default() }
    }
}

/// Hook preferring configmaps or secrets that exist in the host namespace over
/// the copies synced from the guest cluster. An operator can create such an
/// object once in the host namespace and every guest workload referencing the
/// same name will use it.
#[derive(Clone)]
pub struct PreferParentHook {
    kind: ReferenceKind,
    ctx: Arc<Context>,
}

impl PreferParentHook {
    pub fn new(kind: ReferenceKind, ctx: Arc<Context>) -> Self {
        Self { kind, ctx }
    }

    pub fn name(&self) -> &'static str {
        self.kind.hook_name()
    }

    /// Mutate a host pod being created. References to objects of this hook's
    /// kind are pointed at same named objects in the target namespace where
    /// they exist. Fails only when the guest pod cannot be fetched.
    pub async fn mutate_create_physical(&self, mut pod: Pod) -> Result<HookOutcome> {
        let pod_key = object_key(&pod);

        if should_skip(&pod, self.kind.skip_annotation()) {
            info!(event = "Skipped", hook = self.name(), pod = %pod_key, reason = "skip annotation set");
            return Ok(HookOutcome::unchanged(pod));
        }

        let (envs, volumes) = match pod.spec.as_ref() {
            Some(spec) => (
                locate_env_references(spec, self.kind),
                locate_volume_references(spec, self.kind),
            ),
            None => (Vec::new(), Vec::new()),
        };

        if envs.is_empty() && volumes.is_empty() {
            debug!(event = "Skipped", hook = self.name(), pod = %pod_key, reason = "no references");
            return Ok(HookOutcome::unchanged(pod));
        }

        mark_processed(&mut pod, self.name());

        let guest = fetch_guest_pod(self.ctx.guest.as_ref(), &pod).await?;
        let engine = RewriteEngine::new(&self.ctx);
        let mut report = RewriteReport::default();

        if !envs.is_empty() {
            engine.rewrite_env_references(&envs, &mut pod, &guest, &mut report).await;
        }
        if !volumes.is_empty() {
            engine.rewrite_volume_references(&volumes, &mut pod, &guest, &mut report).await;
        }

        info!(
            event = "Mutated",
            hook = self.name(),
            pod = %pod_key,
            references = envs.len() + volumes.len(),
            rewritten = report.rewritten,
            probe_failures = report.probe_failures.len(),
        );

        Ok(HookOutcome { pod, report })
    }

    /// Mutate a host pod being updated. Only the processed annotation is
    /// enforced, references are never rewritten on update.
    pub fn mutate_update_physical(&self, mut pod: Pod) -> Pod {
        mark_processed(&mut pod, self.name());
        pod
    }
}

/// Every registered hook, in the order they run
#[derive(Clone)]
pub struct HookSet {
    hooks: Vec<PreferParentHook>,
}

impl HookSet {
    /// The configmap hook followed by the secret hook
    pub fn all(ctx: Arc<Context>) -> Self {
        Self {
            hooks: ReferenceKind::ALL
                .into_iter()
                .map(|kind| PreferParentHook::new(kind, ctx.clone()))
                .collect(),
        }
    }

    pub fn hooks(&self) -> &[PreferParentHook] {
        &self.hooks
    }

    /// Run every hook's create pass. The first fatal error aborts the whole
    /// mutation so no partially rewritten pod is returned.
    pub async fn mutate_create_physical(&self, pod: Pod) -> Result<HookOutcome> {
        let mut outcome = HookOutcome::unchanged(pod);

        for hook in &self.hooks {
            let HookOutcome { pod, report } = hook.mutate_create_physical(outcome.pod).await?;
            outcome.pod = pod;
            outcome.report.merge(report);
        }

        Ok(outcome)
    }

    pub fn mutate_update_physical(&self, pod: Pod) -> Pod {
        self.hooks.iter().fold(pod, |pod, hook| hook.mutate_update_physical(pod))
    }
}

/// Parse an admission object as a pod
pub fn pod_from_object(obj: &DynamicObject) -> Result<Pod> {
    let kind = obj.types.as_ref().map(|t| t.kind.as_str()).unwrap_or_default();
    if kind != "Pod" {
        let name = obj.metadata.name.clone().unwrap_or_default();
        return Err(HookError::WrongObjectType(format!("{} {}", if kind.is_empty() { "object" } else { kind }, name)));
    }

    obj.clone()
        .try_parse::<Pod>()
        .map_err(|e| HookError::WrongObjectType(format!("Pod {}: {}", obj.metadata.name.clone().unwrap_or_default(), e)))
}
