// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::sync::Arc;
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};

use ppr_common::config::AppConfig;
use ppr_common::telemetry::info;

use crate::error::{HookError, Result};
use crate::hook::context::Context;
use crate::translate::SuffixTranslator;


/// Create a client for the host cluster by inferring the kubeconfig from the
/// environment or the in-cluster service account
///
/// # Returns
/// A Result containing the kube Client or an error
pub async fn create_host_client() -> Result<Client> {
    Client::try_default().await.map_err(HookError::from)
}

/// Create a client for the guest cluster
///
/// # Arguments
/// * `kubeconfig`: Path to the guest cluster kubeconfig, inferred from the
///   environment when empty
///
/// # Returns
/// A Result containing the kube Client or an error
pub async fn create_guest_client(kubeconfig: &str) -> Result<Client> {
    if kubeconfig.is_empty() {
        return create_host_client().await;
    }

    let kubeconfig = Kubeconfig::read_from(kubeconfig)?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;

    Client::try_from(config).map_err(HookError::from)
}

/// Build the hook context from both clients and the application config. The
/// target namespace defaults to the namespace of the host client.
pub fn create_context(host: Client, guest: Client, config: &AppConfig) -> Context {
    let target_namespace = match config.hooks.target_namespace.as_str() {
        "" => host.default_namespace().to_string(),
        namespace => namespace.to_string(),
    };

    info!(
        event = "HooksConfigured",
        target_namespace = target_namespace.as_str(),
        suffix = config.hooks.suffix.as_str(),
    );

    Context::new(
        Arc::new(host),
        Arc::new(guest),
        Arc::new(SuffixTranslator::new(config.hooks.suffix.clone())),
        target_namespace,
    )
}
