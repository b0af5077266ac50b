use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use omrgrade::{
    config::{Config, PORT_ENV},
    detect::{BubbleDetector, MarkDetector},
    imaging::{decode_sheet, draw_overlay},
    input::{load_all, loaders_for},
    output::{format_report_to_string, print_detection_table, print_report, OutputFormat},
    pipeline::{GradingSession, SheetInput},
    server,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for scripted grading runs
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const NO_RESULTS: u8 = 2;
    pub const STUDENT_FAILED: u8 = 3;
}

#[derive(Parser)]
#[command(name = "omrgrade")]
#[command(
    author,
    version,
    about = "Scan multiple-choice answer sheets and grade them against an answer key"
)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade student sheets against an answer key
    Grade {
        /// Answer key image (JPG/PNG)
        #[arg(short, long)]
        key: PathBuf,

        /// Student sheet images or directories of them
        #[arg(required = true)]
        students: Vec<PathBuf>,

        /// Output format (table, json, csv, html)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process student sheets one at a time
        #[arg(long)]
        no_parallel: bool,

        /// Print the session's debug log to stderr
        #[arg(long)]
        debug: bool,

        /// Exit with a non-zero code if any student fails
        #[arg(long)]
        fail_on_fail: bool,
    },

    /// Show what the detector reads from a single sheet
    Detect {
        /// Sheet image (JPG/PNG)
        sheet: PathBuf,

        /// Save an annotated copy of the sheet (PNG)
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Run the web interface
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to $PORT, then the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Serve { .. } => "omrgrade=info",
        Commands::Grade { debug: true, .. } => "omrgrade=debug",
        _ => "omrgrade=warn",
    };
    init_tracing(default_filter);

    if let Commands::Config { init, path } = cli.command {
        handle_config(cli.config.as_deref(), init, path)?;
        return Ok(exit_codes::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Grade {
            key,
            students,
            format,
            output,
            no_parallel,
            debug,
            fail_on_fail,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            run_grade(
                &config,
                GradeArgs {
                    key,
                    students,
                    format: format_str,
                    output,
                    parallel: !no_parallel,
                    debug,
                    fail_on_fail,
                },
            )
            .await
        }
        Commands::Detect {
            sheet,
            overlay,
            format,
        } => {
            run_detect(&config, &sheet, overlay.as_deref(), &format).await?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let env_port = std::env::var(PORT_ENV).ok();
            let port = config.server.resolve_port(port, env_port.as_deref());
            server::serve(&config, &host, port).await?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { .. } => Ok(exit_codes::SUCCESS),
    }
}

struct GradeArgs {
    key: PathBuf,
    students: Vec<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    parallel: bool,
    debug: bool,
    fail_on_fail: bool,
}

async fn run_grade(config: &Config, args: GradeArgs) -> Result<u8> {
    let format = OutputFormat::from_str(&args.format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && args.output.is_none();

    let key_bytes = tokio::fs::read(&args.key)
        .await
        .with_context(|| format!("Failed to read answer key {}", args.key.display()))?;
    let key = SheetInput::new("Answer Key", args.key.display().to_string(), key_bytes);

    let loaders = loaders_for(&args.students)?;
    let sheets = load_all(&loaders).await?;
    let students = SheetInput::numbered(
        sheets
            .into_iter()
            .map(|s| (s.file_name(), s.bytes))
            .collect(),
    );

    let progress = if is_interactive {
        let pb = ProgressBar::new(students.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Running OMR detection...");
        Some(pb)
    } else {
        None
    };

    let mut session = GradingSession::new(config);
    if !args.parallel {
        session = session.sequential();
    }
    if let Some(pb) = &progress {
        let pb = pb.clone();
        session = session.with_progress(move |label| {
            pb.set_message(format!("Graded {}", label));
            pb.inc(1);
        });
    }

    let result = session.run(key, students).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let report = result?;

    if let Some(path) = &args.output {
        let text = format_report_to_string(&report, format)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_report(&report, format)?;
    }

    if args.debug {
        eprintln!();
        eprintln!("Debug log:");
        for line in &report.debug {
            eprintln!("  {}", line);
        }
    }

    if report.results.is_empty() {
        eprintln!("No valid student results. Check uploads or OMR detection.");
        return Ok(exit_codes::NO_RESULTS);
    }
    if args.fail_on_fail && report.fail_count() > 0 {
        return Ok(exit_codes::STUDENT_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}

async fn run_detect(
    config: &Config,
    sheet: &Path,
    overlay: Option<&Path>,
    format: &str,
) -> Result<()> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let bytes = tokio::fs::read(sheet)
        .await
        .with_context(|| format!("Failed to read sheet {}", sheet.display()))?;

    let detector = BubbleDetector::new(config.detection.clone());
    let (gray, detection) = tokio::task::spawn_blocking(move || {
        decode_sheet(&bytes).map(|gray| {
            let detection = detector.detect(&gray);
            (gray, detection)
        })
    })
    .await??;

    if let Some(path) = overlay {
        draw_overlay(&gray, &detection)
            .save(path)
            .with_context(|| format!("Failed to write overlay {}", path.display()))?;
        eprintln!("Overlay written to: {}", path.display());
    }

    match format {
        OutputFormat::Table => print_detection_table(&sheet.display().to_string(), &detection)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detection)?),
        other => anyhow::bail!("Format {:?} is not available for detect; use table or json", other),
    }
    Ok(())
}

fn handle_config(custom_path: Option<&Path>, init: bool, show_path: bool) -> Result<()> {
    let config_path = custom_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save_to(&config_path)?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'omrgrade config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
