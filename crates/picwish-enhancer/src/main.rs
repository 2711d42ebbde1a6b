/*
[INPUT]:  CLI arguments, optional config file, PICWISH_* environment, OS shutdown signals
[OUTPUT]: One enhancement task driven to completion, result URL on stdout
[POS]:    Binary entry point - file image source plus terminal presentation
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use picwish_enhancer::source::load_image;
use picwish_enhancer::{EnhancerConfig, Task, TaskController, TaskPhase};

#[derive(Parser, Debug)]
#[command(name = "picwish-enhancer", version, about = "Enhance an image with the PicWish API")]
struct Cli {
    /// Image file to enhance
    #[arg(value_name = "IMAGE")]
    image: PathBuf,
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Override the delay between status queries
    #[arg(long = "poll-interval-ms", value_name = "MS")]
    poll_interval_ms: Option<u64>,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(&args.log_level) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "enhancement failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config =
        EnhancerConfig::load(args.config_path.as_deref()).context("load config")?;
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        config.poll_interval_ms = poll_interval_ms;
        config.validate().context("invalid --poll-interval-ms")?;
    }
    info!(
        api_url = %config.api_url,
        poll_interval_ms = config.poll_interval_ms,
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let payload = load_image(&args.image)
        .await
        .with_context(|| format!("read image {}", args.image.display()))?;

    let mut controller = TaskController::from_config(&config)?;
    let mut updates = controller.subscribe();
    controller.submit(payload);

    let mut task = updates.borrow_and_update().clone();
    loop {
        report(&task);
        if task.is_settled() {
            break;
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for SIGINT");
                }
                info!("received SIGINT, cancelling task");
                controller.cancel();
                return Err(anyhow!("cancelled"));
            }
            changed = updates.changed() => {
                changed.context("controller stopped publishing")?;
                task = updates.borrow_and_update().clone();
            }
        }
    }

    match task.phase() {
        TaskPhase::Succeeded { result_location } => {
            println!("{result_location}");
            Ok(())
        }
        TaskPhase::Failed { failure } => Err(anyhow!("{failure} ({})", failure.kind())),
        _ => Err(anyhow!("task ended without a result")),
    }
}

fn report(task: &Task) {
    match task.phase() {
        TaskPhase::Idle => {}
        TaskPhase::Submitting => info!(task = %task.token(), "uploading image"),
        TaskPhase::Polling { progress } => info!(
            task = %task.token(),
            job_id = task.job_id().map(|id| id.as_str()).unwrap_or_default(),
            progress = *progress,
            "processing image"
        ),
        TaskPhase::Succeeded { result_location } => {
            info!(task = %task.token(), result = %result_location, "enhanced image ready")
        }
        TaskPhase::Failed { failure } => {
            warn!(task = %task.token(), kind = failure.kind(), "{failure}")
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
