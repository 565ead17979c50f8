use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viralscope_core::{
    AnalysisResult, AnalysisState, ClientConfig, DocumentFile, InputDraft, NavigationCommand,
    ResultSection, Session, SessionHandle, SessionSnapshot, SubmissionDispatcher, SubmissionKind,
    ViralscopeError, format_file_size, format_result_readable,
};

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "viralscope")]
#[command(about = "Analyze YouTube videos and documents for viral potential")]
struct Cli {
    /// Analysis service base URL (overrides config file and VIRALSCOPE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a YouTube video
    Youtube {
        /// Video URL
        url: String,

        /// Average view duration as SS or MM:SS
        #[arg(long)]
        avg_view_duration: Option<String>,

        #[command(flatten)]
        output: OutputArgs,

        /// Expand every timeline entry
        #[arg(long)]
        expand_all: bool,
    },
    /// Analyze a document (PDF, DOC, DOCX, PPT, PPTX or TXT, up to 10MB)
    Document {
        /// Path to the document
        path: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Result section to show: summarize, viral or recommendation
    #[arg(long, default_value = "summarize")]
    section: ResultSection,

    /// Print the shaped result as JSON instead of markdown
    #[arg(long)]
    json: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "viralscope=debug,viralscope_core=debug"
    } else {
        "viralscope=info,viralscope_core=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), error);
    std::process::exit(1);
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ViralscopeError> {
    let mut config = ClientConfig::load()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli).unwrap_or_else(|e| fail(e));
    let dispatcher = SubmissionDispatcher::http(config.clone()).unwrap_or_else(|e| fail(e));
    let (session, task) = Session::spawn(dispatcher);

    let mut draft = InputDraft::new();
    let (kind, output, expand_all, label) = match cli.command {
        Command::Youtube {
            url,
            avg_view_duration,
            output,
            expand_all,
        } => {
            draft.set_url(&url).unwrap_or_else(|e| fail(e));
            if let Some(text) = avg_view_duration {
                draft.set_duration(text);
            }
            (SubmissionKind::Youtube, output, expand_all, url)
        }
        Command::Document { path, output } => {
            let file = DocumentFile::from_path(&path)
                .await
                .unwrap_or_else(|e| fail(e));
            let label = format!("{} ({})", file.name, format_file_size(file.byte_size()));
            draft.set_file(file).unwrap_or_else(|e| fail(e));
            (SubmissionKind::Document, output, false, label)
        }
    };

    if !output.json {
        println!(
            "\n{}  {}\n",
            style("viralscope").cyan().bold(),
            style("Viral Potential Analyzer").dim()
        );
        println!("{} {}", style("Service:").dim(), style(&config.base_url).cyan());
        println!("{}", style("─".repeat(60)).dim());
    }

    let start = Instant::now();
    let spinner = create_spinner(&format!("Analyzing {} {}...", kind, label));
    session
        .submit_draft(&draft, kind)
        .await
        .unwrap_or_else(|e| {
            spinner.finish_and_clear();
            fail(e)
        });
    let settled = session.wait_settled().await?;

    match settled.state {
        AnalysisState::Success { result, .. } => {
            spinner.finish_with_message(format!(
                "{} Analyzed {} {}",
                style("✓").green().bold(),
                kind,
                style(format!("[{}]", format_elapsed(start.elapsed()))).dim()
            ));

            if output.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let timeline_len = match &result {
                    AnalysisResult::Video(video) => video.timeline.len(),
                    AnalysisResult::Document(_) => 0,
                };
                let snapshot =
                    apply_view(&session, output.section, expand_all, timeline_len).await?;
                println!("{}", style("─".repeat(60)).dim());
                println!("{}", format_result_readable(&result, &snapshot.navigation));
            }
        }
        AnalysisState::Failed { error } => {
            spinner.finish_and_clear();
            fail(error);
        }
        other => {
            spinner.finish_and_clear();
            tracing::warn!(state = other.name(), "session settled without a result");
        }
    }

    session.shutdown().await;
    task.await?;
    Ok(())
}

/// Select the requested section and expand timeline entries, returning the
/// navigation the result should be rendered with.
async fn apply_view(
    session: &SessionHandle,
    section: ResultSection,
    expand_all: bool,
    timeline_len: usize,
) -> Result<SessionSnapshot> {
    let mut snapshot = session
        .navigate(NavigationCommand::SelectSection(section))
        .await?;

    if expand_all {
        for index in 0..timeline_len {
            if !snapshot.navigation.is_timeline_expanded(index) {
                snapshot = session
                    .navigate(NavigationCommand::ToggleTimeline(index))
                    .await?;
            }
        }
    }

    Ok(snapshot)
}
