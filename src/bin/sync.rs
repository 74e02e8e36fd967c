// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! File-sync CLI
//!
//! Synchronizes legacy Silence CRs from YAML manifests into the cluster.
//! Silences are filtered by environment tags before being applied, so one
//! manifest repository can serve many installations.
//!
//! ```bash
//! sync --dir silences/ --tag installation=ginger --tag pipeline=stable \
//!      --kubernetes.kubeconfig ~/.kube/config
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;

use silence_operator::filesync;

/// Synchronize Silence CRs from YAML files into the cluster
#[derive(Parser)]
#[command(name = "sync", about = "Synchronize Silence CRs from YAML files into the cluster")]
struct Cli {
    /// Directory to look for YAML files with silence CRs (repeatable)
    #[arg(long = "dir", value_name = "DIR", required = true)]
    dirs: Vec<PathBuf>,

    /// Environment tag as key=value, matched against each silence's
    /// targetTags (repeatable)
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    tags: Vec<String>,

    /// Use the in-cluster config to authenticate with Kubernetes
    #[arg(long = "kubernetes.incluster", default_value_t = false)]
    incluster: bool,

    /// Kubeconfig used to connect to Kubernetes
    #[arg(long = "kubernetes.kubeconfig", value_name = "PATH", default_value = "")]
    kubeconfig: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.incluster && cli.kubeconfig.is_empty() {
        anyhow::bail!("--kubernetes.kubeconfig must not be empty when --kubernetes.incluster=false");
    }

    let client = create_client(cli.incluster, &cli.kubeconfig).await?;
    filesync::run(&client, &cli.dirs, &cli.tags).await
}

async fn create_client(incluster: bool, kubeconfig: &str) -> Result<Client> {
    let config = if incluster {
        Config::incluster().context("failed to load in-cluster configuration")?
    } else {
        let kubeconfig = Kubeconfig::read_from(kubeconfig)
            .with_context(|| format!("failed to read kubeconfig {kubeconfig:?}"))?;
        Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context("failed to build client configuration from kubeconfig")?
    };

    Client::try_from(config).context("failed to create Kubernetes client")
}
