use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use ytachunker_client::{
    check_upload, render_result, save_markdown_export, Args, Backend, ChatSession, Command, Config,
    FileStorage, HistoryStore, HttpBackend, JobStatus, Preferences, RequestOrchestrator,
    ResultView, SourceCell, Storage, NO_SOURCE,
};

/// Accent colours for the current display mode.
struct Palette {
    accent: Color,
    muted: Color,
}

impl Palette {
    fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                accent: Color::BrightCyan,
                muted: Color::BrightBlack,
            }
        } else {
            Self {
                accent: Color::Blue,
                muted: Color::White,
            }
        }
    }
}

fn create_spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

fn print_info(config: &Config, palette: &Palette) {
    println!("{} {}", "Service:".bold(), config.service_url.color(palette.accent));
    println!(
        "{} {}",
        "Default language:".bold(),
        config.default_language.label()
    );
    println!("\nRun with --help to list the available commands.");
}

fn print_history<S: Storage>(history: &HistoryStore<S>, palette: &Palette) {
    if history.is_empty() {
        println!("{} No recent URLs", "↳".color(palette.muted));
        return;
    }
    println!("{}", "Recent URLs:".bold());
    for (index, url) in history.entries().iter().enumerate() {
        println!("  {}. {}", index + 1, url.color(palette.accent));
    }
}

fn print_result(view: &ResultView, verbose: bool, palette: &Palette) {
    match view {
        ResultView::ErrorPanel(message) => {
            println!("{} {}", "✗".red(), message.red());
        }
        ResultView::Table(rows) => {
            println!(
                "{} Processing complete! Below are the extracted segments:\n",
                "✓".green()
            );
            for row in rows {
                println!(
                    "{} {} → {}  {}",
                    row.name.bold(),
                    row.start,
                    row.end,
                    row.download.url.color(palette.muted)
                );
                if verbose {
                    println!("    {}", row.text);
                }
                println!("    {} {}", "Summary:".color(palette.accent), row.summary);
                match &row.source {
                    SourceCell::Link(url) => {
                        println!("    {} {}", "Source:".color(palette.accent), url.underline())
                    }
                    SourceCell::Missing => {
                        println!("    {} {}", "Source:".color(palette.accent), NO_SOURCE)
                    }
                }
            }
            println!();
        }
    }
}

async fn run_chat<B: Backend + 'static>(
    mut session: ChatSession<B>,
    palette: &Palette,
) -> Result<()> {
    println!(
        "{} Chat with AI about these segments ({} to leave)",
        "💬".color(palette.accent),
        "/quit".bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".color(palette.accent));
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        let spinner = create_spinner("Sending...")?;
        let reply = session.send(&line).await.cloned();
        spinner.finish_and_clear();

        let Some(reply) = reply else {
            continue;
        };
        println!("{}", reply.content);
        if let Some((start, end)) = reply.timestamp() {
            let row = session
                .attributed_segment(&reply)
                .map(|(index, segment)| {
                    format!(" ({}, row {})", segment.display_name(), index + 1)
                })
                .unwrap_or_default();
            println!(
                "{}",
                format!("Timestamp: {:.2}s → {:.2}s{}", start, end, row).color(palette.muted)
            );
        }
    }

    session.close();
    Ok(())
}

fn require_target(args: &Args, what: &str) -> Result<String> {
    args.target
        .clone()
        .with_context(|| format!("Missing {} argument", what))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ytachunker=warn,ytachunker_client=warn".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(url) = &args.service_url {
        config.service_url = url.clone();
    }

    let storage = FileStorage::new(config.state_dir()?);
    let mut preferences = Preferences::load(&storage);
    let palette = Palette::new(preferences.dark_mode());

    println!("\n{} {}", "▶".color(palette.accent), "YTAChunker".bold());

    let backend = Arc::new(HttpBackend::new(&config.service_url));

    match args.command.clone().unwrap_or(Command::Info) {
        Command::Info => print_info(&config, &palette),
        Command::History => print_history(&HistoryStore::load(&storage), &palette),
        Command::HistoryRemove => {
            let url = require_target(&args, "URL")?;
            let mut history = HistoryStore::load(&storage);
            history.remove(&url)?;
            print_history(&history, &palette);
        }
        Command::HistoryClear => {
            HistoryStore::load(&storage).clear()?;
            println!("{} History cleared", "✓".green());
        }
        Command::Theme => {
            let dark = preferences.toggle_dark_mode()?;
            println!(
                "{} Switched to {} mode",
                "✓".green(),
                if dark { "dark" } else { "light" }
            );
        }
        Command::Upload => {
            let path = PathBuf::from(require_target(&args, "FILE")?);
            check_upload(&path)?;
        }
        Command::Download => {
            let index: usize = require_target(&args, "segment number")?
                .parse()
                .context("Segment number must be a positive integer")?;
            let bytes = backend.download_segment(index).await?;
            let output = PathBuf::from(format!("chunk_{}.wav", index));
            tokio::fs::write(&output, bytes)
                .await
                .context("Failed to save segment audio")?;
            println!("{} Saved audio to: {}", "✓".green(), output.display());
        }
        Command::Process => {
            let url = require_target(&args, "URL")?;
            let language = args.language.unwrap_or(config.default_language);
            let mut orchestrator =
                RequestOrchestrator::new(Arc::clone(&backend), HistoryStore::load(&storage));

            let spinner = create_spinner(
                "Processing... This may take a while, please keep this terminal open.",
            )?;
            let status = orchestrator.submit(&url, args.manual, language).await;
            spinner.finish_and_clear();

            if status.is_none() {
                anyhow::bail!("Please enter a YouTube URL");
            }

            if let Some(result) = orchestrator.result() {
                print_result(
                    &render_result(result, &config.service_url),
                    args.verbose,
                    &palette,
                );

                if let Some(path) = &args.export {
                    if let Some(job) = orchestrator
                        .job()
                        .filter(|job| job.status == JobStatus::Succeeded)
                    {
                        let written = save_markdown_export(
                            result,
                            &job.reference,
                            &config.service_url,
                            path,
                        )?;
                        println!("{} Saved segments to: {}", "✓".green(), written.display());
                    }
                }
            }

            if let Some(share) = orchestrator.share_text() {
                println!("{} {}", "Share:".color(palette.muted), share);
            }

            if args.chat && orchestrator.can_open_chat() {
                run_chat(orchestrator.open_chat()?, &palette).await?;
            }

            if orchestrator.status() == JobStatus::Failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
