/// Bellfir - linear-phase bell filter designer
use anyhow::Result;
use bellfir_cli::{commands, config::DriverConfig};
use bellfir_core::WindowKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bellfir")]
#[command(about = "Design linear-phase bell FIR filters and render test material", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "BELLFIR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design the filter and print a summary as JSON
    Design {
        #[command(flatten)]
        design: DesignArgs,

        /// Include the coefficients in the output
        #[arg(long)]
        coefficients: bool,
    },
    /// Filter reference noise and write WAV files plus analysis data
    Render {
        #[command(flatten)]
        design: DesignArgs,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Noise duration in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Noise seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Design overrides applied on top of the loaded configuration
#[derive(Args)]
struct DesignArgs {
    /// Center frequency in Hz
    #[arg(long)]
    center_freq: Option<f64>,

    /// Quality factor
    #[arg(long)]
    q: Option<f64>,

    /// Peak gain in dB
    #[arg(long, allow_negative_numbers = true)]
    gain_db: Option<f64>,

    /// Number of FIR coefficients
    #[arg(long)]
    order: Option<usize>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Tapering window (blackman, hann, hamming, blackman_harris, rectangular)
    #[arg(long)]
    window: Option<WindowKind>,
}

impl DesignArgs {
    fn apply(self, config: &mut DriverConfig) {
        let design = &mut config.design;
        if let Some(center_freq) = self.center_freq {
            design.center_freq = center_freq;
        }
        if let Some(q) = self.q {
            design.q = q;
        }
        if let Some(gain_db) = self.gain_db {
            design.gain_db = gain_db;
        }
        if let Some(order) = self.order {
            design.order = order;
        }
        if let Some(sample_rate) = self.sample_rate {
            design.sample_rate = sample_rate;
        }
        if let Some(window) = self.window {
            design.window = window;
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bellfir=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = DriverConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Design {
            design,
            coefficients,
        } => {
            design.apply(&mut config);
            config.validate()?;

            let report = commands::design(&config, coefficients)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Render {
            design,
            output,
            duration,
            seed,
        } => {
            design.apply(&mut config);
            if let Some(output) = output {
                config.output.directory = output;
            }
            if let Some(duration) = duration {
                config.signal.duration_secs = duration;
            }
            if let Some(seed) = seed {
                config.signal.seed = seed;
            }
            config.validate()?;

            let report = commands::render(&config)?;
            tracing::info!(
                frames = report.frames,
                peak = report.filtered_peak,
                "render complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
