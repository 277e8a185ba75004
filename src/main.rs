#![feature(error_generic_member_access)]
use clap::Parser;
use kube::client::Client;
use std::{path::Path, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod cache;
mod config;
mod controller;
mod dispatch;
mod secrets;
mod server;
mod util;


use config::Config;
use util::{DEFAULT_SECRET_NAME, NAMESPACE_FILE};

/// Top-level CLI configuration for the binary. Any command line
/// flags should go in here.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Log debug messages.
    #[arg(short, long)]
    debug: bool,

    /// Port to listen on for /health.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Source secret name to copy data from.
    #[arg(short, long = "sourcesecret", default_value = DEFAULT_SECRET_NAME)]
    source_secret: String,

    /// Target secret name to create.
    #[arg(short, long = "targetsecret", default_value = DEFAULT_SECRET_NAME)]
    target_secret: String,

    /// Namespace holding the source secret. Read from the service
    /// account mount when not set.
    #[arg(long, env = "POD_NAMESPACE")]
    namespace: Option<String>,

    /// How often every namespace is reconciled again, e.g. `5s` or `1m`.
    #[arg(long, default_value = "5s", value_parser = parse_duration::parse)]
    resync_interval: Duration,

    /// Show version.
    #[arg(short, long)]
    version: bool,
}

impl Cli {
    /// Resolves the options into the configuration shared by the
    /// controller's components.
    fn into_config(self) -> Config {
        let own_namespace = match self.namespace {
            Some(namespace) if !namespace.is_empty() => namespace,
            _ => config::read_own_namespace(Path::new(NAMESPACE_FILE)),
        };
        Config {
            source_secret: self.source_secret,
            target_secret: self.target_secret,
            own_namespace,
            resync_interval: self.resync_interval,
            port: self.port,
        }
    }
}

/// Installs the global log subscriber. `--debug` wins over `RUST_LOG`.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Main entrypoint that sets up the environment before running the controller.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Print version and exit if version flag is on.
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    init_logging(cli.debug);

    // Set the panic hook to exit the process with a non-zero exit code
    // when a panic occurs on any thread. This is desired behavior when
    // running in a container, as we always want to restart the container
    // in that case.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));

    info!(version = env!("CARGO_PKG_VERSION"), "starting");
    let config = cli.into_config();

    // Create a kubernetes client using the default configuration.
    // In-cluster, the kubeconfig will be set by the service account.
    let client: Client = Client::try_default()
        .await
        .expect("Expected a valid KUBECONFIG environment variable.");
    info!("connected to Kubernetes API");

    // The controller and liveness server should never exit without
    // a fatal error.
    if let Err(e) = controller::run(client, config).await {
        error!(error = %e, "controller failed");
        std::process::exit(1);
    }
    panic!("exited prematurely");
}
