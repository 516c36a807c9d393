// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

mod cli;

use std::sync::Arc;
use std::process;
use clap::Parser;
use clap::CommandFactory;
use rustls::crypto::aws_lc_rs;

use ppr_common::config::{AppConfig, AppConfigBuilder};
use ppr_common::state::State;
use ppr_common::telemetry::{error, info, setup_logging};
use ppr_hooks::hook::{utils::{create_context, create_guest_client, create_host_client}, HookSet};
use ppr_hooks::translate::{NameTranslator, SuffixTranslator};
use ppr_webhook::server::{create_router, create_tls_config, serve};

use crate::cli::{CliArgs, Commands};

fn load_config(args: &CliArgs, target_namespace: Option<&str>) -> AppConfig {
    let mut builder = AppConfigBuilder::default();
    if let Some(path) = args.config.as_deref() {
        builder.with_file(path);
    }

    builder
        .with_env()
        .with_override_option("hooks.target_namespace", target_namespace)
        .build()
        .unwrap_or_else(|e| {
            error!(
                event = "Error",
                error = %e,
            );
            process::exit(1);
        })
}

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        error!(
            event = "Error",
            error = %e,
        );
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    // Install the default aws_lc_rs crypto provider
    let _ = aws_lc_rs::default_provider().install_default();

    let args = CliArgs::parse();

    match &args.cmd {
        Some(Commands::Translate { name, namespace, suffix }) => {
            setup_logging("warn");

            let config = load_config(&args, None);
            let translator = SuffixTranslator::new(suffix.clone().unwrap_or(config.hooks.suffix));

            println!("{}", translator.translate(name, namespace));
        },
        Some(Commands::Webhook { target_namespace }) => {
            setup_logging("info");

            info!(
                event = "Starting",
                version = env!("CARGO_PKG_VERSION"),
            );

            // Load configuration
            let config = load_config(&args, target_namespace.as_deref());

            // Create necessary resources
            let state = Arc::new(State { config: config.clone() });
            let host = exit_on_error(create_host_client().await);
            let guest = exit_on_error(create_guest_client(&config.guest.kubeconfig).await);
            let hooks = Arc::new(HookSet::all(Arc::new(create_context(host, guest, &config))));

            let addr = format!("{}:{}", config.webhook.host, config.webhook.port);
            let tls_config = exit_on_error(
                create_tls_config(config.webhook.tls.cert_file.to_string(), config.webhook.tls.key_file.to_string()).await
            );
            let router = create_router(state.clone(), hooks);

            // Run Webhook server
            info!(event = "Listening", address = addr.as_str());
            exit_on_error(serve(addr, router, tls_config).await);
            info!(event = "Stopped");
        },
        None => {
            let mut cmd = CliArgs::command();
            let _ = cmd.print_help();
            process::exit(1);
        },
    }
}
