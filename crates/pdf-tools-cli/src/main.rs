mod logger;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_async_runtime::{ConvertCommand, ConvertUpdate};
use pdf_images::constants::MAX_FILE_SIZE;
use pdf_images::{ConversionSettings, ValidationRules, format_file_size};
use std::path::PathBuf;
use tokio::sync::mpsc;

use logger::CliLogger;

#[derive(Parser)]
#[command(name = "pdft", about = "PDF tools CLI", version)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine images into one PDF, one image per page
    Images {
        /// Input image file(s), in page order
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory the PDF is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Settings file (JSON); the flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the effective settings to this file
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Output paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Output orientation
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Compression quality
        #[arg(long, value_enum)]
        quality: Option<QualityArg>,

        /// Output file name prefix
        #[arg(long)]
        prefix: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show which files would be converted
    Check {
        /// Input image file(s)
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Largest accepted file in bytes
    #[arg(long, default_value_t = MAX_FILE_SIZE)]
    max_size: u64,

    /// Accept an additional MIME type (e.g. image/jpeg); repeatable
    #[arg(long = "accept", value_name = "MIME")]
    extra_types: Vec<String>,
}

impl FilterArgs {
    fn rules(&self) -> ValidationRules {
        let mut rules = ValidationRules {
            max_file_size: self.max_size,
            ..Default::default()
        };
        rules.accepted_types.extend(self.extra_types.iter().cloned());
        rules
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Low,
    Medium,
    High,
}

impl From<PaperArg> for pdf_images::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for pdf_images::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<QualityArg> for pdf_images::Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => Self::Low,
            QualityArg::Medium => Self::Medium,
            QualityArg::High => Self::High,
        }
    }
}

/// Start a worker, hand it one command and return the update stream
fn run_worker(command: ConvertCommand) -> mpsc::UnboundedReceiver<ConvertUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    tokio::spawn(pdf_async_runtime::worker_task(command_rx, update_tx));
    // The worker exits once the command channel closes
    let _ = command_tx.send(command);

    update_rx
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet)).init()?;

    match cli.command {
        Commands::Images {
            input,
            output_dir,
            config,
            save_config,
            paper,
            orientation,
            quality,
            prefix,
            filter,
        } => {
            let mut settings = match &config {
                Some(path) => ConversionSettings::load(path).await?,
                None => ConversionSettings::default(),
            };
            if let Some(paper) = paper {
                settings.paper_size = paper.into();
            }
            if let Some(orientation) = orientation {
                settings.orientation = orientation.into();
            }
            if let Some(quality) = quality {
                settings.quality = quality.into();
            }
            if let Some(prefix) = prefix {
                settings.file_prefix = prefix;
            }
            settings.validate()?;

            if let Some(path) = &save_config {
                settings.save(path).await?;
                log::info!("Saved settings to {}", path.display());
            }

            let mut updates = run_worker(ConvertCommand::Convert {
                paths: input,
                settings,
                rules: filter.rules(),
                output_dir,
            });

            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")?
                    .progress_chars("=>-"),
            );

            while let Some(update) = updates.recv().await {
                match update {
                    ConvertUpdate::Validated { accepted, warnings } => {
                        for warning in &warnings {
                            bar.println(format!("  skipped {}", warning));
                        }
                        bar.set_message(format!("{} image(s)", accepted.len()));
                    }
                    ConvertUpdate::Progress { percent } => {
                        bar.set_position(u64::from(percent));
                    }
                    ConvertUpdate::Complete { path, page_count } => {
                        bar.finish_and_clear();
                        println!("Converted {} image(s) → {}", page_count, path.display());
                        return Ok(());
                    }
                    ConvertUpdate::Error { message } => {
                        bar.abandon();
                        bail!(message);
                    }
                }
            }

            bail!("Conversion worker stopped without a result");
        }

        Commands::Check { input, filter } => {
            let mut updates = run_worker(ConvertCommand::Validate {
                paths: input,
                rules: filter.rules(),
            });

            while let Some(update) = updates.recv().await {
                match update {
                    ConvertUpdate::Validated { accepted, warnings } => {
                        let total: u64 = accepted.iter().map(|f| f.size_bytes).sum();
                        println!("Accepted files:");
                        for file in &accepted {
                            println!("  {} ({})", file.name, format_file_size(file.size_bytes));
                        }
                        println!(
                            "  {} file(s), {} total",
                            accepted.len(),
                            format_file_size(total)
                        );
                        if !warnings.is_empty() {
                            println!("Skipped files:");
                            for warning in &warnings {
                                println!("  {} ({})", warning.file_name, warning.reason);
                            }
                        }
                        if accepted.is_empty() {
                            bail!("No valid image files selected");
                        }
                        return Ok(());
                    }
                    ConvertUpdate::Error { message } => bail!(message),
                    ConvertUpdate::Progress { .. } | ConvertUpdate::Complete { .. } => {}
                }
            }

            bail!("Validation worker stopped without a result");
        }
    }
}
