// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, Volume};
use kube::ResourceExt;

use ppr_common::telemetry::{debug, error, info, warn};

use crate::hook::context::Context;
use crate::hook::guest::object_key;
use crate::hook::kind::ReferenceKind;
use crate::hook::locate::{EnvReference, ResolutionOutcome, VolumeReference};
use crate::hook::probe::{probe_host_resource, ProbeFailure, ProbeOutcome};
use crate::hook::traits::HostResources;
use crate::translate::NameTranslator;

/// What a rewrite pass did to a pod
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub rewritten: usize,
    pub probe_failures: Vec<ProbeFailure>,
}

impl RewriteReport {
    pub fn merge(&mut self, other: RewriteReport) {
        self.rewritten += other.rewritten;
        self.probe_failures.extend(other.probe_failures);
    }
}

/// Points configmap and secret references of a host pod at operator provided
/// objects in the target namespace, when the guest pod shows the reference was
/// produced by translation and an object with the bare name exists.
pub struct RewriteEngine<'a> {
    host: &'a dyn HostResources,
    translator: &'a dyn NameTranslator,
    target_namespace: &'a str,
}

impl<'a> RewriteEngine<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            host: ctx.host.as_ref(),
            translator: ctx.translator.as_ref(),
            target_namespace: &ctx.target_namespace,
        }
    }

    pub async fn rewrite_env_references(
        &self,
        refs: &[EnvReference],
        pod: &mut Pod,
        guest: &Pod,
        report: &mut RewriteReport,
    ) {
        let pod_key = object_key(pod);

        for reference in refs {
            let Some(bare_name) = self.guest_env_bare_name(reference, guest) else {
                debug!(
                    event = "NoTranslatedMatch",
                    pod = %pod_key,
                    container = %reference.container_name,
                    env = %reference.env_name,
                    name = %reference.mounted_name,
                );
                continue;
            };

            let outcome = self.resolve(reference.kind, &reference.mounted_name, bare_name, report).await;
            if !outcome.resolved {
                continue;
            }

            if set_env_reference(pod, reference, &outcome.final_name) {
                report.rewritten += 1;
                info!(
                    event = "Rewritten",
                    pod = %pod_key,
                    kind = %reference.kind,
                    container = %reference.container_name,
                    env = %reference.env_name,
                    from = %reference.mounted_name,
                    to = %format!("{}/{}", self.target_namespace, outcome.final_name),
                );
            } else {
                error!(
                    event = "RewriteFailed",
                    pod = %pod_key,
                    container_index = reference.container_index,
                    env_index = reference.env_index,
                    name = %reference.mounted_name,
                );
            }
        }
    }

    pub async fn rewrite_volume_references(
        &self,
        refs: &[VolumeReference],
        pod: &mut Pod,
        guest: &Pod,
        report: &mut RewriteReport,
    ) {
        let pod_key = object_key(pod);

        for reference in refs {
            let Some(bare_name) = self.guest_volume_bare_name(reference, guest) else {
                debug!(
                    event = "NoTranslatedMatch",
                    pod = %pod_key,
                    volume = %reference.volume_name,
                    name = %reference.mounted_name,
                );
                continue;
            };

            let outcome = self.resolve(reference.kind, &reference.mounted_name, bare_name, report).await;
            if !outcome.resolved {
                continue;
            }

            if set_volume_reference(pod, reference, &outcome.final_name) {
                report.rewritten += 1;
                info!(
                    event = "Rewritten",
                    pod = %pod_key,
                    kind = %reference.kind,
                    volume = %reference.volume_name,
                    from = %reference.mounted_name,
                    to = %format!("{}/{}", self.target_namespace, outcome.final_name),
                );
            } else {
                error!(
                    event = "RewriteFailed",
                    pod = %pod_key,
                    volume_index = reference.volume_index,
                    name = %reference.mounted_name,
                );
            }
        }
    }

    async fn resolve(
        &self,
        kind: ReferenceKind,
        mounted_name: &str,
        bare_name: String,
        report: &mut RewriteReport,
    ) -> ResolutionOutcome {
        match probe_host_resource(self.host, kind, &bare_name, self.target_namespace).await {
            ProbeOutcome::Found => ResolutionOutcome::resolved(bare_name),
            ProbeOutcome::NotFound => ResolutionOutcome::unchanged(mounted_name),
            ProbeOutcome::Failed(e) => {
                report.probe_failures.push(ProbeFailure {
                    kind,
                    name: bare_name,
                    namespace: self.target_namespace.to_string(),
                    error: e.to_string(),
                });
                ResolutionOutcome::unchanged(mounted_name)
            },
        }
    }

    // First env entry of the matching guest container whose bare name
    // translates to the mounted name
    fn guest_env_bare_name(&self, reference: &EnvReference, guest: &Pod) -> Option<String> {
        let namespace = guest.namespace().unwrap_or_default();
        let container = guest_container(guest.spec.as_ref()?, reference)?;

        let mut candidates = container.env
            .iter()
            .flatten()
            .filter_map(|env| env.value_from.as_ref().and_then(|source| reference.kind.env_ref_name(source)))
            .filter(|name| !name.is_empty())
            .filter(|name| self.translator.translate(name, &namespace) == reference.mounted_name);

        let first = candidates.next()?;
        if let Some(other) = candidates.find(|name| *name != first) {
            warn!(
                event = "AmbiguousReference",
                guest_pod = %object_key(guest),
                container = %container.name,
                name = %reference.mounted_name,
                chosen = first,
                ignored = other,
            );
        }

        Some(first.to_string())
    }

    fn guest_volume_bare_name(&self, reference: &VolumeReference, guest: &Pod) -> Option<String> {
        let namespace = guest.namespace().unwrap_or_default();
        let volume = guest_volume(guest.spec.as_ref()?, reference)?;

        reference.kind
            .volume_ref_name(volume)
            .filter(|name| !name.is_empty())
            .filter(|name| self.translator.translate(name, &namespace) == reference.mounted_name)
            .map(str::to_string)
    }
}

// Guest container with the same name as the host one, else the one at the same index
fn guest_container<'p>(spec: &'p PodSpec, reference: &EnvReference) -> Option<&'p Container> {
    spec.containers
        .iter()
        .find(|c| c.name == reference.container_name)
        .or_else(|| spec.containers.get(reference.container_index))
}

fn guest_volume<'p>(spec: &'p PodSpec, reference: &VolumeReference) -> Option<&'p Volume> {
    let volumes = spec.volumes.as_deref().unwrap_or_default();

    volumes
        .iter()
        .find(|v| v.name == reference.volume_name)
        .or_else(|| volumes.get(reference.volume_index))
}

// Overwrite the name at the reference position, only while it still holds the
// name seen at scan time
fn set_env_reference(pod: &mut Pod, reference: &EnvReference, name: &str) -> bool {
    let current = pod.spec
        .as_mut()
        .and_then(|spec| spec.containers.get_mut(reference.container_index))
        .and_then(|container| container.env.as_mut())
        .and_then(|env| env.get_mut(reference.env_index))
        .and_then(|env| env.value_from.as_mut())
        .and_then(|source| reference.kind.env_ref_name_mut(source));

    match current {
        Some(current) if *current == reference.mounted_name => {
            *current = name.to_string();
            true
        },
        _ => false,
    }
}

fn set_volume_reference(pod: &mut Pod, reference: &VolumeReference, name: &str) -> bool {
    let current = pod.spec
        .as_mut()
        .and_then(|spec| spec.volumes.as_mut())
        .and_then(|volumes| volumes.get_mut(reference.volume_index))
        .and_then(|volume| reference.kind.volume_ref_name_mut(volume));

    match current {
        Some(current) if *current == reference.mounted_name => {
            *current = name.to_string();
            true
        },
        _ => false,
    }
}
