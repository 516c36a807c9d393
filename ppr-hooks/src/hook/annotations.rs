// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use k8s_openapi::api::core::v1::Pod;

use ppr_common::constant::MUTATED_BY_HOOK_ANNOTATION;

/// True when `skip_annotation` is set on the pod with a non-empty value.
pub fn should_skip(pod: &Pod, skip_annotation: &str) -> bool {
    pod.metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(skip_annotation))
        .is_some_and(|value| !value.is_empty())
}

/// Record that `hook_name` ran on the pod. Earlier entries are kept and a hook
/// already listed is not added twice.
pub fn mark_processed(pod: &mut Pod, hook_name: &str) {
    let annotations = pod.metadata.annotations.get_or_insert_with(Default::default);

    match annotations.get_mut(MUTATED_BY_HOOK_ANNOTATION) {
        Some(existing) if existing.is_empty() => *existing = hook_name.to_string(),
        Some(existing) => {
            if !existing.split(',').any(|name| name == hook_name) {
                existing.push(',');
                existing.push_str(hook_name);
            }
        }
        None => {
            annotations.insert(MUTATED_BY_HOOK_ANNOTATION.to_string(), hook_name.to_string());
        }
    }
}
