//! `faultline` - run the diagnostics pipeline from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use faultline_core::{DiagnosticsConfig, DiagnosticsOrchestrator, ReportOptions, SystemDiagnostics};
use faultline_detector::PlatformIssueDetector;
use faultline_taxonomy::{
    ErrorCategory, InfoEvent, PlatformIssue, PlatformTag, ReportSeverity, WarningEvent,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "faultline", version, about = "Faultline diagnostics pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect platform issues in an error message.
    Analyze {
        /// Error message to analyze.
        message: String,

        /// Stack trace text to analyze alongside the message.
        #[arg(long)]
        stack: Option<String>,

        /// Error category (network, file_system, ...); inferred when omitted.
        #[arg(long)]
        category: Option<ErrorCategory>,

        /// Only report issues for this platform.
        #[arg(long, value_enum)]
        platform: Option<PlatformArg>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print static recommendations for a platform.
    Recommend {
        #[arg(long, value_enum)]
        platform: PlatformArg,
    },

    /// Push sample events through a fresh orchestrator and print diagnostics.
    Simulate {
        /// Platform the enhancer advises for.
        #[arg(long, value_enum, default_value_t = PlatformArg::Android)]
        platform: PlatformArg,

        /// Minimum severity recorded by the hub.
        #[arg(long, default_value = "debug")]
        minimum_severity: ReportSeverity,

        /// Print the full snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    Windows,
    Macos,
    Android,
    Ios,
    Linux,
    Web,
}

impl From<PlatformArg> for PlatformTag {
    fn from(v: PlatformArg) -> Self {
        match v {
            PlatformArg::Windows => PlatformTag::Windows,
            PlatformArg::Macos => PlatformTag::MacOs,
            PlatformArg::Android => PlatformTag::Android,
            PlatformArg::Ios => PlatformTag::Ios,
            PlatformArg::Linux => PlatformTag::Linux,
            PlatformArg::Web => PlatformTag::Web,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("faultline=debug,faultline_core=debug,faultline_hub=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            message,
            stack,
            category,
            platform,
            json,
        } => cmd_analyze(&message, stack.as_deref(), category, platform, json),
        Commands::Recommend { platform } => {
            cmd_recommend(platform);
            Ok(())
        }
        Commands::Simulate {
            platform,
            minimum_severity,
            json,
        } => cmd_simulate(platform, minimum_severity, json).await,
    }
}

fn cmd_analyze(
    message: &str,
    stack: Option<&str>,
    category: Option<ErrorCategory>,
    platform: Option<PlatformArg>,
    json: bool,
) -> Result<()> {
    let category = category.unwrap_or_else(|| ErrorCategory::infer(message));
    let detector = PlatformIssueDetector::new();
    let issues = match platform {
        Some(platform) => detector.analyze_for(platform.into(), message, stack, Some(category)),
        None => detector.analyze(message, stack, Some(category)),
    };

    if json {
        let out = serde_json::to_string_pretty(&issues).context("serialize issues")?;
        println!("{out}");
        return Ok(());
    }

    println!("Category: {}", category.label());
    if issues.is_empty() {
        println!("No platform issues detected.");
    }
    for issue in &issues {
        println!("{}", render_issue(issue));
    }
    Ok(())
}

fn cmd_recommend(platform: PlatformArg) {
    let platform = PlatformTag::from(platform);
    println!("Recommendations for {platform}:");
    for line in PlatformIssueDetector::new().recommendations(platform) {
        println!("  - {line}");
    }
}

async fn cmd_simulate(platform: PlatformArg, minimum_severity: ReportSeverity, json: bool) -> Result<()> {
    let diagnostics = DiagnosticsOrchestrator::new(
        DiagnosticsConfig::new()
            .with_platform(platform.into())
            .with_minimum_severity(minimum_severity)
            .with_trace_events(true),
    );
    diagnostics.initialize()?;

    for (message, category) in SAMPLE_ERRORS {
        diagnostics
            .report_error(*message, ReportOptions::new().with_category(*category))
            .await;
    }
    diagnostics
        .report_warning(WarningEvent::new("Frame took 48ms to render"))
        .await;
    diagnostics
        .report_info(InfoEvent::new("Simulation started"))
        .await;

    let _ = diagnostics
        .wrap_future(
            async { Err::<(), _>("upstream returned 503") },
            "loadUser",
        )
        .await;
    let rows = futures::stream::iter(vec![Ok(1), Err("row 2 malformed"), Ok(3)]);
    let _: Vec<Result<i32, &str>> =
        futures::StreamExt::collect(diagnostics.wrap_stream(rows, "importRows")).await;

    let snapshot = diagnostics.capture_snapshot();
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        println!("{}", render_diagnostics(&snapshot.diagnostics));
        for report in &snapshot.enhanced_reports {
            println!("\n{}", report.render());
        }
    }

    diagnostics.dispose();
    Ok(())
}

const SAMPLE_ERRORS: &[(&str, ErrorCategory)] = &[
    ("Connection refused: cleartext http blocked", ErrorCategory::Network),
    ("Could not find route /settings", ErrorCategory::Navigation),
    ("No such file or directory: config.json", ErrorCategory::FileSystem),
    ("Missing key 'api_url' in environment", ErrorCategory::Configuration),
];

fn render_issue(issue: &PlatformIssue) -> String {
    format!(
        "[{}] {} ({:?}, {})\n  {}\n  Fix: {}",
        issue.platform, issue.title, issue.issue_type, issue.severity, issue.description, issue.solution
    )
}

fn render_diagnostics(diagnostics: &SystemDiagnostics) -> String {
    let stats = &diagnostics.statistics;
    let mut out = format!(
        "Diagnostics ({})\n  Reports: {} (errors {}, warnings {}, infos {})\n  Most common category: {}\n  Operations: {} active, {} completed, {} failed, {} cancelled\n  Handlers: {}",
        diagnostics.platform,
        stats.total_reports,
        stats.total_errors,
        stats.total_warnings,
        stats.total_infos,
        stats
            .most_common_category
            .map_or_else(|| "-".to_string(), |c| c.label().to_string()),
        diagnostics.operation_stats.active,
        diagnostics.operation_stats.completed,
        diagnostics.operation_stats.failed,
        diagnostics.operation_stats.cancelled,
        diagnostics.handlers.join(", "),
    );
    out.push_str("\n  Recommendations:");
    for line in &diagnostics.recommendations {
        out.push_str("\n    - ");
        out.push_str(line);
    }
    out
}
