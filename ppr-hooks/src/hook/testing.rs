// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! In-memory clients and pod builders shared by the hook tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    ConfigMapKeySelector, ConfigMapVolumeSource, Container, EnvVar, EnvVarSource, Pod, PodSpec,
    SecretKeySelector, SecretVolumeSource, Volume,
};
use kube::api::ObjectMeta;

use ppr_common::constant::{OBJECT_NAME_ANNOTATION, OBJECT_NAMESPACE_ANNOTATION};

use crate::hook::context::Context;
use crate::hook::kind::ReferenceKind;
use crate::hook::traits::{GuestPods, HostResources};
use crate::translate::SuffixTranslator;

pub const TEST_SUFFIX: &str = "suffix";

/// Host cluster holding a fixed set of objects
#[derive(Clone, Default)]
pub struct FakeHost {
    objects: Arc<Mutex<HashSet<(ReferenceKind, String, String)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeHost {
    pub fn with_object(self, kind: ReferenceKind, namespace: &str, name: &str) -> Self {
        self.objects.lock().unwrap().insert((kind, namespace.to_string(), name.to_string()));
        self
    }

    /// Lookups of `name` fail as if the API server refused them
    pub fn failing_on(self, name: &str) -> Self {
        self.failing.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResources for FakeHost {
    async fn exists(&self, kind: ReferenceKind, name: &str, namespace: &str) -> kube::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(name) {
            return Err(kube::Error::Service(format!("{} {}: too many requests", kind, name).into()));
        }

        Ok(self.objects.lock().unwrap().contains(&(kind, namespace.to_string(), name.to_string())))
    }
}

/// Guest cluster holding a fixed set of pods
#[derive(Clone, Default)]
pub struct FakeGuest {
    pods: Arc<Vec<Pod>>,
    calls: Arc<AtomicUsize>,
}

impl FakeGuest {
    pub fn with_pods(pods: Vec<Pod>) -> Self {
        Self { pods: Arc::new(pods), calls: Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuestPods for FakeGuest {
    async fn get_pod(&self, name: &str, namespace: &str) -> kube::Result<Pod> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.pods
            .iter()
            .find(|pod| {
                pod.metadata.name.as_deref() == Some(name) && pod.metadata.namespace.as_deref() == Some(namespace)
            })
            .cloned()
            .ok_or_else(|| kube::Error::Service(format!("pods \"{}\" not found", name).into()))
    }
}

pub fn context(host: FakeHost, guest: FakeGuest, target_namespace: &str) -> Context {
    Context::new(
        Arc::new(host),
        Arc::new(guest),
        Arc::new(SuffixTranslator::new(TEST_SUFFIX)),
        target_namespace,
    )
}

pub fn guest_pod(name: &str, namespace: &str, spec: PodSpec) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}

/// Host copy of guest pod `guest_name` in `guest_namespace`
pub fn host_pod(name: &str, guest_name: &str, guest_namespace: &str, spec: PodSpec) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("host".to_string()),
            annotations: Some(BTreeMap::from([
                (OBJECT_NAME_ANNOTATION.to_string(), guest_name.to_string()),
                (OBJECT_NAMESPACE_ANNOTATION.to_string(), guest_namespace.to_string()),
            ])),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}

pub fn container(name: &str, env: Vec<EnvVar>) -> Container {
    Container {
        name: name.to_string(),
        env: Some(env),
        ..Default::default()
    }
}

pub fn plain_env(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

pub fn config_map_env(name: &str, config_map: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            config_map_key_ref: Some(ConfigMapKeySelector {
                name: config_map.to_string(),
                key: name.to_lowercase(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn secret_env(name: &str, secret: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.to_string(),
                key: name.to_lowercase(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn config_map_volume(name: &str, config_map: &str) -> Volume {
    Volume {
        name: name.to_string(),
        config_map: Some(ConfigMapVolumeSource {
            name: config_map.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn secret_volume(name: &str, secret: &str) -> Volume {
    Volume {
        name: name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
