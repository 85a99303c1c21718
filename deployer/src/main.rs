//! Jobdeploy - Entry Point
//!
//! Renders a templated Nomad job for one application image, submits it and
//! waits for the rollout. Prints the deployed job reference as JSON.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;

use jobdeploy::config::DeployConfig;
use jobdeploy::deploy::context::{DeployContext, ImageRef};
use jobdeploy::filesys::dir::Dir;
use jobdeploy::filesys::file::File;
use jobdeploy::logs::{init_logging, LogLevel, LogOptions};
use jobdeploy::models::deployment::NomadDeployment;
use jobdeploy::platform::TemplatedPlatform;
use jobdeploy::template::vars::{parse_json_vars, parse_line_vars};
use jobdeploy::utils::version_info;

use anyhow::{anyhow, Context};
use tracing::{error, info, warn};

const DEFAULT_WORKSPACE: &str = "default";

const USAGE: &str = "usage: jobdeploy --app=<name> --image=<image[:tag]> \
[--config=<deploy.json>] [--workspace=<name>] [--env-file=<file>] [--dir=<path>] \
[--log-level=<level>] [--json-logs] [--log-dir=<path>]";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to print version: {e}"),
        }
        return;
    }

    // Initialize logging
    let log_level = match cli_args.get("log-level").map(|s| s.parse::<LogLevel>()) {
        Some(Ok(level)) => level,
        Some(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        None => LogLevel::default(),
    };
    let log_options = LogOptions {
        log_level,
        json_format: cli_args.contains_key("json-logs"),
        log_dir: cli_args.get("log-dir").map(PathBuf::from),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let (Some(app), Some(image)) = (cli_args.get("app"), cli_args.get("image")) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    match run(&cli_args, app, image).await {
        Ok(deployment) => match serde_json::to_string_pretty(&deployment) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                error!("Failed to encode deployment: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Deployment failed: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(
    cli_args: &HashMap<String, String>,
    app: &str,
    image: &str,
) -> anyhow::Result<NomadDeployment> {
    let working_dir = match cli_args.get("dir") {
        Some(dir) => Dir::new(dir),
        None => Dir::current().context("unable to determine the working directory")?,
    };

    let config = match cli_args.get("config") {
        Some(path) => read_config(path).await?,
        None => DeployConfig::default(),
    };

    let env = match cli_args.get("env-file") {
        Some(path) => read_env_file(path).await?,
        None => BTreeMap::new(),
    };

    let ctx = DeployContext {
        workspace: cli_args
            .get("workspace")
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORKSPACE.to_string()),
        app: app.to_string(),
        image: ImageRef::parse(image),
        env,
    };

    info!(
        "Deploying {} ({}) to workspace {} from {}",
        ctx.app,
        ctx.image.name(),
        ctx.workspace,
        working_dir.path().display()
    );
    let platform = TemplatedPlatform::with_defaults(config, working_dir)?;
    let deployment = platform
        .deploy_until(&ctx, await_shutdown_signal())
        .await
        .with_context(|| format!("deploy of {} failed", ctx.app))?;

    Ok(NomadDeployment::from(&deployment))
}

async fn read_config(path: &str) -> anyhow::Result<DeployConfig> {
    File::new(path)
        .read_json::<DeployConfig>()
        .await
        .with_context(|| format!("unable to read config file {}", path))
}

/// Deployment env from a `.json` object or `KEY=value` lines
async fn read_env_file(path: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let file = File::new(path);
    let contents = file
        .read_string()
        .await
        .with_context(|| format!("unable to read env file {}", path))?;
    let parsed = match file.extension().as_deref() {
        Some("json") => parse_json_vars(&contents),
        _ => parse_line_vars(&contents),
    };
    parsed.map_err(|e| anyhow!("invalid env file {}: {}", path, e))
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    warn!("Unable to install signal handlers, falling back to Ctrl+C");
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => info!("Ctrl+C received, shutting down..."),
                        Err(_) => std::future::pending::<()>().await,
                    }
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, shutting down..."),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await
            }
        }
    }
}
