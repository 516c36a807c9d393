// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::fmt;
use k8s_openapi::api::core::v1::{EnvVarSource, Volume};

/// Kind of object a pod can reference by name from its env vars and volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    ConfigMap,
    Secret,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 2] = [ReferenceKind::ConfigMap, ReferenceKind::Secret];

    /// Identity recorded in the processed annotation
    pub fn hook_name(self) -> &'static str {
        match self {
            ReferenceKind::ConfigMap => "prefer-parent-configmaps-hook",
            ReferenceKind::Secret => "prefer-parent-secrets-hook",
        }
    }

    /// Annotation that disables the hook for this kind when set to any value
    pub fn skip_annotation(self) -> &'static str {
        match self {
            ReferenceKind::ConfigMap => "skip-prefer-parent-configmaps-hook",
            ReferenceKind::Secret => "skip-prefer-parent-secrets-hook",
        }
    }

    /// Name referenced by an env var source, if it references this kind
    pub fn env_ref_name(self, source: &EnvVarSource) -> Option<&str> {
        match self {
            ReferenceKind::ConfigMap => source.config_map_key_ref.as_ref().map(|r| r.name.as_str()),
            ReferenceKind::Secret => source.secret_key_ref.as_ref().map(|r| r.name.as_str()),
        }
    }

    pub fn env_ref_name_mut(self, source: &mut EnvVarSource) -> Option<&mut String> {
        match self {
            ReferenceKind::ConfigMap => source.config_map_key_ref.as_mut().map(|r| &mut r.name),
            ReferenceKind::Secret => source.secret_key_ref.as_mut().map(|r| &mut r.name),
        }
    }

    /// Name referenced by a volume, if its source is this kind. Secret volumes
    /// without a name read as empty.
    pub fn volume_ref_name(self, volume: &Volume) -> Option<&str> {
        match self {
            ReferenceKind::ConfigMap => volume.config_map.as_ref().map(|s| s.name.as_str()),
            ReferenceKind::Secret => volume.secret.as_ref().map(|s| s.secret_name.as_deref().unwrap_or_default()),
        }
    }

    pub fn volume_ref_name_mut(self, volume: &mut Volume) -> Option<&mut String> {
        match self {
            ReferenceKind::ConfigMap => volume.config_map.as_mut().map(|s| &mut s.name),
            ReferenceKind::Secret => volume.secret.as_mut().map(|s| s.secret_name.get_or_insert_with(String::new)),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::ConfigMap => write!(f, "configmap"),
            ReferenceKind::Secret => write!(f, "secret"),
        }
    }
}
