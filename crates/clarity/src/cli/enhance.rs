//! The `clarity enhance` command.

use anyhow::Context;
use clap::Args;
use clarity_core::encode::decode_data_url;
use clarity_core::{Config, EnhancementClient, EnhancementResult, RemoteEnhancer, SourceFile};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shown to the user whenever enhancement fails, whatever the cause.
const RETRY_NOTICE: &str = "Error while enhancing the image. Please try again later.";

/// Arguments for the `enhance` command.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Image file to enhance
    #[arg(required_unless_present = "url", conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Publicly reachable image URL to send straight to the remote service
    #[arg(long)]
    pub url: Option<String>,

    /// Write the image bytes of a fallback result to this path
    #[arg(long)]
    pub save: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the enhance command.
pub async fn execute(args: EnhanceArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    let spinner = create_spinner();
    let outcome = run(&args, &config).await;
    spinner.finish_and_clear();

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Enhancement failed: {e:#}");
            eprintln!("{RETRY_NOTICE}");
            return Err(e);
        }
    };

    if result.is_fallback() {
        tracing::warn!("Remote enhancement unavailable, showing the original image");
    }

    if let Some(save) = &args.save {
        let path = PathBuf::from(shellexpand::tilde(save).into_owned());
        save_result(&result, &path)?;
        tracing::info!("Saved image to {}", path.display());
    }

    let json = if args.pretty || config.output.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

async fn run(args: &EnhanceArgs, config: &Config) -> anyhow::Result<EnhancementResult> {
    if let Some(url) = &args.url {
        let enhancer = RemoteEnhancer::from_config(config)?;
        let cancel = CancellationToken::new();
        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling enhancement");
                watcher.cancel();
            }
        });
        return Ok(enhancer.request(url, &cancel).await?);
    }

    let input = args
        .input
        .as_ref()
        .context("an input file or --url is required")?;
    let client = EnhancementClient::new();
    Ok(client.enhance(&SourceFile::from_path(input)).await?)
}

/// Write the decoded image of a fallback result to disk.
///
/// Remote results are URLs and are only printed.
fn save_result(result: &EnhancementResult, path: &std::path::Path) -> anyhow::Result<()> {
    if !result.is_fallback() {
        anyhow::bail!(
            "--save only applies to fallback results; remote image is at {}",
            result.enhanced_url()
        );
    }
    let decoded = decode_data_url(result.enhanced_url())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, decoded.data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn create_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Enhancing image...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
