mod error;
mod jupyter;
mod k8s;
mod kubectl;
mod manifest;
mod models;
mod node_manager;
pub mod utils;

use anyhow::Context;
use clap::Parser;
use colored::*;
use jupyter::Jupyter;
use kube::Client;
use kubectl::{Kubectl, KubectlCli};
use node_manager::NodeManager;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "jupyter-connect-sync",
    about = "Copy a solution's deployment manifests and protocol files into its Jupyter connect pod",
    author,
    version,
    long_about = None
)]
struct Cli {
    /// Target namespace.
    #[arg(short, long, env = "JUPYTER_SYNC_NAMESPACE")]
    namespace: String,
    /// Solution root containing deployments/ and microservice/.
    /// Defaults to the current directory. `-bp` is accepted too.
    #[arg(short = 'b', long = "base_path", visible_alias = "base-path")]
    base_path: Option<PathBuf>,
    /// Wait until every pod in the namespace is Running before copying.
    /// Gives up with an error after this many one-second checks.
    #[arg(long, value_name = "SECONDS")]
    wait_timeout: Option<u64>,
    /// Additional image to treat as the Jupyter container (repeatable).
    #[arg(long = "jupyter-image", value_name = "IMAGE")]
    jupyter_images: Vec<String>,
    /// kubectl binary to invoke.
    #[arg(long, env = "KUBECTL", default_value = "kubectl")]
    kubectl: String,
}

/// Rewrites the legacy two-letter `-bp` flag into its long form.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-bp" {
                return OsString::from("--base_path");
            }
            match arg.to_str().and_then(|s| s.strip_prefix("-bp=")) {
                Some(value) => OsString::from(format!("--base_path={value}")),
                None => arg,
            }
        })
        .collect()
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_tracing();

    let base_path = match cli.base_path {
        Some(path) => path,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    println!("base_path = {}", base_path.display().to_string().cyan());

    // 1. Initialize Crypto
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    // 2. Initialize Client ONCE
    let pb = utils::create_spinner("Initializing Kubernetes client...");
    let client = Client::try_default().await;
    pb.finish_and_clear();
    let client = client.context("cannot build Kubernetes client from kubeconfig")?;

    let kubectl: Arc<dyn Kubectl> = Arc::new(KubectlCli::new(cli.kubectl));
    let nodes = NodeManager::new(cli.namespace.clone(), Arc::new(client), kubectl.clone());

    if let Some(timeout) = cli.wait_timeout {
        nodes.wait_until_ready(timeout).await?;
    }

    let jupyter = Jupyter::new(base_path, nodes, kubectl).with_extra_images(cli.jupyter_images);
    let plans = jupyter
        .prepare_jupyter()
        .await
        .with_context(|| format!("copying into Jupyter in namespace {}", cli.namespace))?;

    utils::print_summary(&cli.namespace, &plans);
    Ok(())
}
