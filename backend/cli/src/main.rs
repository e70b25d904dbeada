use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use framegrab_config::{
    config_file_path, load_and_prepare, load_config, prepare, render_config, validate,
    ExtractConfig, FramegrabConfig, OutputConfig, ValidationReport,
};
use framegrab_core::ImageFormat;
use framegrab_extractor::{persist_artifacts, ArtifactTargets, ExtractOptions, Extractor};
use framegrab_logging::init_logger;

#[derive(Parser)]
#[command(name = "framegrab")]
#[command(about = "Grab the first frame of a remote video without downloading all of it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the first frame and print it as a data URI
    Extract {
        /// http(s) URL of the video
        url: String,

        /// Config file (defaults to $FRAMEGRAB_CONFIG, then ./framegrab.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Initial head/tail window in bytes
        #[arg(long)]
        window: Option<u64>,

        /// Largest window the retry loop may grow to, in bytes
        #[arg(long)]
        max_window: Option<u64>,

        /// Still-image codec: jpeg or png
        #[arg(long)]
        format: Option<ImageFormat>,

        /// Also write the decoded image here
        #[arg(long)]
        save_frame: Option<PathBuf>,

        /// Also write the data URI text here
        #[arg(long)]
        save_payload: Option<PathBuf>,
    },
    /// Print the effective configuration and its validation findings
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Per-run overrides from the command line.
#[derive(Debug, Default)]
struct Overrides {
    window: Option<u64>,
    max_window: Option<u64>,
    format: Option<ImageFormat>,
    save_frame: Option<PathBuf>,
    save_payload: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Extract {
            url,
            config,
            window,
            max_window,
            format,
            save_frame,
            save_payload,
        } => {
            let overrides = Overrides {
                window,
                max_window,
                format,
                save_frame,
                save_payload,
            };
            run_extract(&url, config.as_deref(), overrides).await
        }
        Commands::Config { config } => run_config(config.as_deref()).await,
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("framegrab: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_extract(url: &str, config: Option<&Path>, overrides: Overrides) -> Result<ExitCode> {
    let raw = load_config(&config_file_path(config)).await?;
    let config = prepare(apply_overrides(raw, overrides))?;
    let report = validate(&config);
    init_logging(&config);
    log_report(&report);
    if !report.is_valid() {
        return Ok(ExitCode::FAILURE);
    }

    let options = config
        .extract
        .as_ref()
        .map(ExtractOptions::from_config)
        .unwrap_or_default();
    let targets = config
        .output
        .as_ref()
        .map(ArtifactTargets::from)
        .unwrap_or_default();

    let extractor = Extractor::from_options(options)?;
    match extractor.extract(url).await {
        Ok(payload) => {
            if !targets.is_empty() {
                persist_artifacts(&payload, &targets).await;
            }
            println!("{payload}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Extraction failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_config(config: Option<&Path>) -> Result<ExitCode> {
    let path = config_file_path(config);
    let (config, report) = load_and_prepare(&path).await?;

    println!("# {}", path.display());
    print!("{}", render_config(&config)?);

    for w in &report.warnings {
        println!("# warning: {}: {}", w.path, w.message);
    }
    for e in &report.errors {
        println!("# error: {}: {}", e.path, e.message);
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(config: &FramegrabConfig) {
    let logging = config.logging.clone().unwrap_or_default();
    init_logger(
        logging.level.as_deref().unwrap_or("info"),
        logging.dir.as_deref(),
        logging.json.unwrap_or(false),
    );
}

fn log_report(report: &ValidationReport) {
    for w in &report.warnings {
        warn!(path = %w.path, message = %w.message, "Config warning");
    }
    for e in &report.errors {
        error!(path = %e.path, message = %e.message, "Config error");
    }
}

/// Fold command-line flags into the file config before defaults run, so a
/// derived ceiling follows `--window` unless a ceiling was set explicitly.
fn apply_overrides(mut config: FramegrabConfig, overrides: Overrides) -> FramegrabConfig {
    let extract = config.extract.get_or_insert_with(ExtractConfig::default);
    if let Some(window) = overrides.window {
        extract.initial_window = Some(window);
    }
    if let Some(max_window) = overrides.max_window {
        extract.max_window = Some(max_window);
    }
    if let Some(format) = overrides.format {
        extract.format = Some(format);
    }

    let output = config.output.get_or_insert_with(OutputConfig::default);
    if let Some(path) = overrides.save_frame {
        output.frame_path = Some(path);
    }
    if let Some(path) = overrides.save_payload {
        output.payload_path = Some(path);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use framegrab_config::parse_config;
    use framegrab_core::MIB;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_extract_flags() {
        let cli = Cli::try_parse_from([
            "framegrab",
            "extract",
            "https://cdn.example.com/v.mp4",
            "--window",
            "2097152",
            "--format",
            "png",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract { url, window, format, .. } => {
                assert_eq!(url, "https://cdn.example.com/v.mp4");
                assert_eq!(window, Some(2 * 1024 * 1024));
                assert_eq!(format, Some(ImageFormat::Png));
            }
            Commands::Config { .. } => panic!("expected extract"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["framegrab", "extract", "http://x/v", "--format", "gif"]).is_err());
    }

    fn options_for(config: FramegrabConfig, overrides: Overrides) -> ExtractOptions {
        let config = prepare(apply_overrides(config, overrides)).unwrap();
        ExtractOptions::from_config(config.extract.as_ref().unwrap())
    }

    #[test]
    fn window_override_moves_default_ceiling() {
        let opts = options_for(
            FramegrabConfig::default(),
            Overrides {
                window: Some(2 * MIB),
                ..Default::default()
            },
        );
        assert_eq!(opts.window_schedule(), vec![2 * MIB, 4 * MIB, 8 * MIB, 16 * MIB]);

        let opts = options_for(
            FramegrabConfig::default(),
            Overrides {
                window: Some(16 * MIB),
                ..Default::default()
            },
        );
        assert_eq!(opts.max_window, 128 * MIB);
        assert_eq!(opts.window_schedule().len(), 4);
    }

    #[test]
    fn file_ceiling_survives_window_override() {
        let file = parse_config("extract:\n  maxWindow: 4194304\n").unwrap();
        let opts = options_for(
            file,
            Overrides {
                window: Some(MIB),
                ..Default::default()
            },
        );
        assert_eq!(opts.window_schedule(), vec![MIB, 2 * MIB, 4 * MIB]);
    }

    #[test]
    fn explicit_overrides_win() {
        let overrides = Overrides {
            window: Some(1024),
            max_window: Some(4096),
            format: Some(ImageFormat::Png),
            save_frame: Some(PathBuf::from("first_frame.png")),
            ..Default::default()
        };
        let config = prepare(apply_overrides(FramegrabConfig::default(), overrides)).unwrap();
        let opts = ExtractOptions::from_config(config.extract.as_ref().unwrap());
        assert_eq!(opts.window_schedule(), vec![1024, 2048, 4096]);
        assert_eq!(opts.format, ImageFormat::Png);
        assert_eq!(
            config.output.unwrap().frame_path,
            Some(PathBuf::from("first_frame.png"))
        );
    }

    #[test]
    fn zero_window_fails_validation() {
        let overrides = Overrides {
            window: Some(0),
            ..Default::default()
        };
        let config = prepare(apply_overrides(FramegrabConfig::default(), overrides)).unwrap();
        assert!(!validate(&config).is_valid());
    }
}
