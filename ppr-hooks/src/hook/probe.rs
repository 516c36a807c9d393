// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::fmt;

use ppr_common::telemetry::{debug, warn};

use crate::hook::kind::ReferenceKind;
use crate::hook::traits::HostResources;

#[derive(Debug)]
pub enum ProbeOutcome {
    Found,
    NotFound,
    /// Any failure other than not found, e.g. forbidden or throttled
    Failed(kube::Error),
}

/// A host lookup that failed for a reason other than not found. The reference
/// it was made for stays on its translated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: ReferenceKind,
    pub name: String,
    pub namespace: String,
    pub error: String,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to look up host {} {}/{}, keeping the synced copy: {}",
            self.kind, self.namespace, self.name, self.error
        )
    }
}

/// Look up an operator provided object named `name` in the host `namespace`.
pub async fn probe_host_resource(
    host: &dyn HostResources,
    kind: ReferenceKind,
    name: &str,
    namespace: &str,
) -> ProbeOutcome {
    match host.exists(kind, name, namespace).await {
        Ok(true) => ProbeOutcome::Found,
        Ok(false) => {
            debug!(event = "ProbeNotFound", kind = %kind, namespace = namespace, name = name);
            ProbeOutcome::NotFound
        },
        Err(e) => {
            warn!(event = "ProbeFailed", kind = %kind, namespace = namespace, name = name, error = %e);
            ProbeOutcome::Failed(e)
        },
    }
}
