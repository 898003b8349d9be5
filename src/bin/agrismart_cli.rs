//! AgriSmart コマンドラインツール
//!
//! ダッシュボードと同じ推論パイプラインを端末から実行します。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use agrismart_lib::logging::init_logging;
use agrismart_lib::model::{bundle_artifact_files, load_metadata, print_metadata_info, AppConfig, DeviceType};
use agrismart_lib::presenter::{render_text, Recommendation};
use agrismart_lib::types::{
    FieldReadings, HUMIDITY_BOUNDS, NITROGEN_BOUNDS, PHOSPHORUS_BOUNDS, PH_BOUNDS, POTASSIUM_BOUNDS,
    RAINFALL_BOUNDS, TEMPERATURE_BOUNDS,
};
use agrismart_lib::CropAdvisor;

/// AgriSmart neural crop recommendation
#[derive(Parser, Debug)]
#[command(name = "agrismart-cli")]
#[command(version)]
#[command(about = "Recommend crops from soil and climate readings", long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// Compute device (overrides the settings file)
    #[arg(long, global = true, value_enum)]
    device: Option<DeviceArg>,

    /// Artifact bundle to load instead of the configured files
    #[arg(long, global = true, value_name = "PATH")]
    bundle: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeviceArg {
    Cpu,
    Wgpu,
}

impl From<DeviceArg> for DeviceType {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Cpu => DeviceType::Cpu,
            DeviceArg::Wgpu => DeviceType::Wgpu,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recommend a crop for one set of field readings
    Predict {
        /// Nitrogen (N), 0-150
        #[arg(short = 'n', long, default_value_t = NITROGEN_BOUNDS.default as u32)]
        nitrogen: u32,

        /// Phosphorus (P), 0-150
        #[arg(short = 'p', long, default_value_t = PHOSPHORUS_BOUNDS.default as u32)]
        phosphorus: u32,

        /// Potassium (K), 0-250
        #[arg(short = 'k', long, default_value_t = POTASSIUM_BOUNDS.default as u32)]
        potassium: u32,

        /// Temperature in °C
        #[arg(short = 't', long, default_value_t = TEMPERATURE_BOUNDS.default, allow_negative_numbers = true)]
        temperature: f64,

        /// Relative humidity in %, 0-100
        #[arg(short = 'u', long, default_value_t = HUMIDITY_BOUNDS.default)]
        humidity: f64,

        /// Soil pH, 0-14
        #[arg(long, default_value_t = PH_BOUNDS.default)]
        ph: f64,

        /// Rainfall in mm
        #[arg(short = 'r', long, default_value_t = RAINFALL_BOUNDS.default)]
        rainfall: f64,

        /// Write the harvest report (into the configured report directory when no path is given)
        #[arg(long, num_args = 0..=1, value_name = "DIR")]
        save_report: Option<Option<PathBuf>>,

        /// Print the full result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Pack the three artifact files into one tar.gz bundle
    Bundle {
        /// Classifier weights (JSON)
        #[arg(short, long, default_value = "models/crop_ann_model.json")]
        model: PathBuf,

        /// Fitted scaler (JSON)
        #[arg(short, long, default_value = "models/crop_scaler.json")]
        scaler: PathBuf,

        /// Label encoder (JSON)
        #[arg(short, long, default_value = "models/crop_label_encoder.json")]
        encoder: PathBuf,

        /// Output bundle path
        #[arg(short, long, default_value = "models/crop_artifacts.tar.gz")]
        output: PathBuf,

        /// Free-form note stored in the metadata
        #[arg(long)]
        source: Option<String>,
    },

    /// Show the metadata of an artifact bundle
    Info {
        /// Bundle path (defaults to the configured bundle)
        bundle: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load_or_default_from(&config_path);
    config.apply_overrides(cli.device.map(DeviceType::from), cli.bundle.as_deref());

    match cli.command {
        Commands::Predict {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
            save_report,
            json,
        } => {
            let readings = FieldReadings {
                nitrogen,
                phosphorus,
                potassium,
                temperature,
                humidity,
                ph,
                rainfall,
            };
            let report_dir = save_report.map(|dir| dir.unwrap_or_else(|| PathBuf::from(&config.report.output_dir)));
            run_predict(&config, &readings, report_dir.as_deref(), json)
        }
        Commands::Bundle {
            model,
            scaler,
            encoder,
            output,
            source,
        } => {
            let saved = bundle_artifact_files(&model, &scaler, &encoder, &output, source)?;
            println!("Saved artifact bundle: {}", saved.display());
            Ok(())
        }
        Commands::Info { bundle } => {
            let path = bundle
                .or_else(|| config.artifacts.bundle_path.as_ref().map(PathBuf::from))
                .context("No bundle given and none configured")?;
            let metadata = load_metadata(&path)?;
            print_metadata_info(&metadata);
            Ok(())
        }
    }
}

fn run_predict(config: &AppConfig, readings: &FieldReadings, report_dir: Option<&Path>, json: bool) -> Result<()> {
    let advisor = CropAdvisor::load(config).context("Failed to load model artifacts")?;
    let recommendation = advisor.recommend(readings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        print_recommendation(&recommendation);
    }

    if let Some(dir) = report_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
        let path = dir.join(&recommendation.report.file_name);
        std::fs::write(&path, &recommendation.report.contents)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report saved");
        println!("\nReport saved: {}", path.display());
    }

    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    println!("\n{}  {}", rec.icon, rec.display_name);
    println!("{}\n", rec.headline);
    print!("{}", render_text(&rec.gauge, &rec.bars));

    if let Some(ref note) = rec.alternative_note {
        println!("\n{}", note);
    }
    println!("\n{}: {}", rec.advice_title, rec.advice);
    if let Some(message) = rec.soil_message {
        println!("{}", message);
    }
    if rec.celebrate {
        println!("\n🎉 High-confidence match!");
    }
}
