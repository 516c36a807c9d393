// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use k8s_openapi::api::core::v1::PodSpec;

use crate::hook::kind::ReferenceKind;

/// An env var of a host pod sourced from a configmap or secret key, by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReference {
    pub container_index: usize,
    pub env_index: usize,
    pub container_name: String,
    pub env_name: String,
    pub kind: ReferenceKind,
    /// Name on the host pod at scan time, already translated
    pub mounted_name: String,
}

/// A volume of a host pod sourced from a configmap or secret, by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeReference {
    pub volume_index: usize,
    pub volume_name: String,
    pub kind: ReferenceKind,
    pub mounted_name: String,
}

/// Outcome of resolving a single reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub resolved: bool,
    pub final_name: String,
}

impl ResolutionOutcome {
    pub fn resolved(name: impl Into<String>) -> Self {
        Self { resolved: true, final_name: name.into() }
    }

    pub fn unchanged(name: impl Into<String>) -> Self {
        Self { resolved: false, final_name: name.into() }
    }
}

/// Finds every env var referencing `kind`, in container then env order.
pub fn locate_env_references(spec: &PodSpec, kind: ReferenceKind) -> Vec<EnvReference> {
    spec.containers
        .iter()
        .enumerate()
        .flat_map(|(container_index, container)| {
            container.env
                .iter()
                .flatten()
                .enumerate()
                .filter_map(move |(env_index, env)| {
                    let name = env.value_from.as_ref().and_then(|source| kind.env_ref_name(source))?;
                    Some(EnvReference {
                        container_index,
                        env_index,
                        container_name: container.name.clone(),
                        env_name: env.name.clone(),
                        kind,
                        mounted_name: name.to_string(),
                    })
                })
        })
        .collect()
}

/// Finds every volume sourced from `kind`, in volume order.
pub fn locate_volume_references(spec: &PodSpec, kind: ReferenceKind) -> Vec<VolumeReference> {
    spec.volumes
        .iter()
        .flatten()
        .enumerate()
        .filter_map(|(volume_index, volume)| {
            kind.volume_ref_name(volume).map(|name| VolumeReference {
                volume_index,
                volume_name: volume.name.clone(),
                kind,
                mounted_name: name.to_string(),
            })
        })
        .collect()
}
