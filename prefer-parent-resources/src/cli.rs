// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[
    clap(
        name = "prefer-parent-resources",
        version,
        author,
        about = "vcluster hooks preferring host cluster configmaps and secrets"
    )
]
pub struct CliArgs {
    /// Path to a YAML, JSON or TOML configuration file
    #[clap(long, short, global = true, env = "PPR_CONFIG")]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[
        clap(
            name = "webhook",
            about = "Run the admission webhook server",
        )
    ]
    Webhook {
        /// Host namespace holding operator provided configmaps and secrets
        #[clap(long)]
        target_namespace: Option<String>,
    },
    #[
        clap(
            name = "translate",
            about = "Print the host name the synchronizer gives a guest object"
        )
    ]
    Translate {
        name: String,
        namespace: String,
        /// Overrides the configured suffix
        #[clap(long)]
        suffix: Option<String>,
    },
}
