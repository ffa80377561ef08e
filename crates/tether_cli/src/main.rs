mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tether_client::TetherClient;
use tether_core::prelude::*;
use tether_session::prelude::*;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tether",
    version,
    about = "Submit media generation jobs and watch them until they finish"
)]
struct Cli {
    /// Server base url
    #[arg(long, env = "TETHER_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token
    #[arg(long, env = "TETHER_TOKEN")]
    token: Option<String>,

    /// Delay between status checks in milliseconds
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Stop watching a job after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Timeout of a single HTTP request in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in features and their routes
    Features,
    /// Submit a job and watch it until it resolves
    Submit {
        feature: Feature,
        /// JSON payload, or @path to read it from a file
        #[arg(long)]
        body: String,
        /// Where to write the result
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Watch a job that was submitted earlier
    Watch {
        feature: Feature,
        job_id: String,
        /// Where to write the result
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn watcher_config(&self) -> WatcherConfig {
        let config =
            WatcherConfig::default().with_poll_interval(Duration::from_millis(self.interval_ms));
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    fn client(&self) -> Result<TetherClient> {
        TetherClient::with_timeout(
            self.url.clone(),
            self.token.clone(),
            Duration::from_secs(self.request_timeout_secs),
        )
        .context("Failed to build HTTP client")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Features => {
            for feature in Feature::ALL {
                println!(
                    "{:<14} POST {:<32} GET {}",
                    feature.name(),
                    feature.submit_route(),
                    feature.status_route()
                );
            }
            Ok(())
        }
        Commands::Submit {
            feature,
            body,
            output,
        } => {
            let body = read_body(body).await?;
            submit(&cli, *feature, body, output.clone()).await
        }
        Commands::Watch {
            feature,
            job_id,
            output,
        } => watch_existing(&cli, *feature, job_id, output.clone()).await,
    }
}

async fn read_body(body: &str) -> Result<Value> {
    let text = match body.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {path}"))?,
        None => body.to_string(),
    };
    serde_json::from_str(&text).context("Body is not valid JSON")
}

async fn submit(cli: &Cli, feature: Feature, body: Value, output: Option<PathBuf>) -> Result<()> {
    let jobs = cli.client()?.jobs::<Value>(feature);
    let config = SessionConfig {
        watcher: cli.watcher_config(),
        on_busy: BusyPolicy::Reject,
    };
    let mut session = JobSession::with_config(Arc::new(jobs), config);
    let mut rx = session.subscribe();

    let handle = session.start(body).await.context("Submission failed")?;
    println!("Submitted {feature} job {}", handle.id);

    let state = tokio::select! {
        state = follow(&mut rx) => state?,
        _ = tokio::signal::ctrl_c() => {
            session.dispose();
            println!("Stopped watching {}, the job keeps running on the server", handle.id);
            return Ok(());
        }
    };

    match state {
        JobState::Succeeded { result } => {
            render::save(&handle.id, &result, output.as_deref()).await
        }
        JobState::Failed { error } => bail!("Job {} failed: {error}", handle.id),
        _ => bail!("Job {} did not resolve", handle.id),
    }
}

/// Prints progress until the session resolves.
async fn follow(
    rx: &mut watch::Receiver<SessionSnapshot<JobOutput>>,
) -> Result<JobState<JobOutput>> {
    loop {
        let state = rx.borrow_and_update().state.clone();
        if state.is_terminal() {
            return Ok(state);
        }
        if let JobState::Watching { status, queue, .. } = &state {
            println!("{}", render::progress_line(*status, queue));
        }
        rx.changed().await.context("Session closed")?;
    }
}

async fn watch_existing(
    cli: &Cli,
    feature: Feature,
    job_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let source = Arc::new(cli.client()?.jobs::<Value>(feature));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = JobWatcher::spawn(source, job_id, cli.watcher_config(), move |event| {
        let _ = tx.send(event);
    });

    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped watching {job_id}, the job keeps running on the server");
                return Ok(());
            }
        };

        match event {
            Some(WatchEvent::Progress { status, queue }) => {
                println!("{}", render::progress_line(status, &queue));
            }
            Some(WatchEvent::Finished(Ok(result))) => {
                return render::save(job_id, &result, output.as_deref()).await;
            }
            Some(WatchEvent::Finished(Err(failure))) => bail!("Job {job_id} failed: {failure}"),
            None => bail!("Stopped watching {job_id} before it resolved"),
        }
    }
}
