// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("wrong object type: {0} is not a pod")]
    WrongObjectType(String),
    #[error("cannot resolve guest workload for {pod}: {reason}")]
    CannotResolveGuestWorkload { pod: String, reason: String },
    #[error("kube error: {0}")]
    KubeError(#[from] kube::Error),
    #[error("kubeconfig error: {0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),
}

pub type Result<T> = result::Result<T, HookError>;
