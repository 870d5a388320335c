use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sidechat_common::observability::{init_logging, LogConfig};
use sidechat_config::{SidechatConfig, SidechatConfigLoader};
use sidechat_drivers::{PageDom, SidechatDriver};
use sidechat_providers::{provider_for_url, site_profile, TimingOverrides};
use sidechat_session::{format_transcript, parse_prompts, ChatSession};
use tracing::info;

use cli::{Cli, Command};
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = SidechatConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let cfg = loader.load().context("failed to load configuration")?;

    init_logging(LogConfig {
        log_dir: cfg.log_dir.clone().map(Into::into),
        emit_stderr: cli.verbose,
        ..LogConfig::default()
    })?;

    run(cli, cfg).await
}

async fn run(cli: Cli, cfg: SidechatConfig) -> Result<()> {
    let target = match (&cli.url, cli.site) {
        (Some(url), _) => url.clone(),
        (None, Some(site)) => site_profile(site)
            .new_chat_url
            .parse()
            .context("site profile carries a malformed new-chat URL")?,
        (None, None) => bail!("specify --url or --site so a provider can be selected"),
    };

    let driver = SidechatDriver::connect(&cfg.webdriver_url, cfg.headless).await?;
    let page = driver.goto(target.as_str()).await?;
    let page = if cfg.humanized_typing {
        page.with_humanized_typing()
    } else {
        page
    };
    let dom: Arc<dyn PageDom> = Arc::new(page);

    let timing = TimingOverrides {
        max_wait_ms: cfg.max_wait_ms,
        poll_interval_ms: cfg.poll_interval_ms,
    };
    let current = driver.current_url().await?;
    let provider = provider_for_url(&current, dom, timing)?;
    info!(provider = %provider.kind(), url = %current, "provider detected");
    let session = ChatSession::new(provider);

    match cli.command {
        Command::Send { message, retrieve } => {
            let reply = session.send_message(&message, retrieve).await?;
            if let Some(reply) = reply {
                println!("{}", reply.answer);
            }
        }
        Command::SendFile { path, name } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = name.unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "file.txt".to_string())
            });
            let report = session.send_file(&content, &name).await?;
            println!("sent {}/{} parts ({:?})", report.sent, report.total, report.outcome);
        }
        Command::RunBatch { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let items = parse_prompts(&content, &cfg.batch_separator);
            if items.is_empty() {
                bail!("no prompts found in {}", path.display());
            }
            let messages: Vec<String> =
                items.into_iter().map(|item| item.description).collect();
            let report = session.send_batch(&messages).await?;
            println!(
                "sent {}/{} prompts ({:?})",
                report.sent, report.total, report.outcome
            );
        }
        Command::Transcribe { mode, output } => {
            let messages = session.transcript().await?;
            let text = format_transcript(&messages, mode.into(), &cfg.batch_separator);
            match output {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{text}"),
            }
        }
        Command::NewChat => session.new_chat().await?,
    }

    driver.close().await
}
