// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DF-Radiance CLI - translate 2D building models for radiance studies.
//!
//! # Commands
//!
//! - `translate model-to-honeybee <model-file>` - 3D model JSON with sensor grids
//! - `translate model-to-grids <model-file> --folder <dir>` - one JSON file per sensor grid
//! - `check <model-file>` - duplicate modifier and modifier set identifiers

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use df_radiance::{ObjectPerModel, TranslationOptions};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "df-radiance", version)]
#[command(about = "Radiance properties for 2D building models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate models to 3D models and sensor grids
    #[command(subcommand)]
    Translate(TranslateCommand),

    /// Report duplicated modifier and modifier set identifiers
    Check {
        /// Model JSON file
        model_file: PathBuf,

        /// Exit with an error when duplicates are found
        #[arg(long)]
        raise: bool,
    },
}

#[derive(Subcommand)]
enum TranslateCommand {
    /// Write the translated 3D model, including sensor grids, as JSON
    ModelToHoneybee {
        #[command(flatten)]
        translation: TranslationArgs,

        /// Output file; stdout when omitted
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,
    },

    /// Write each generated sensor grid to its own JSON file
    ModelToGrids {
        #[command(flatten)]
        translation: TranslationArgs,

        /// Folder receiving `<grid>.json` files and `_info.json`
        #[arg(long)]
        folder: PathBuf,
    },
}

#[derive(Args)]
struct TranslationArgs {
    /// Model JSON file
    model_file: PathBuf,

    /// Repeat multiplied stories as full geometry instead of keeping multipliers
    #[arg(long)]
    full_geometry: bool,

    /// Building (one model per building) or District (a single model)
    #[arg(long, default_value = "District")]
    object_per_model: ObjectPerModel,

    /// Geometric tolerance; overrides DF_RADIANCE_TOLERANCE
    #[arg(long)]
    tolerance: Option<f64>,
}

impl TranslationArgs {
    fn options(&self, config: &Config) -> TranslationOptions {
        TranslationOptions {
            object_per_model: self.object_per_model,
            use_multiplier: !self.full_geometry,
            tolerance: Some(self.tolerance.unwrap_or(config.tolerance)),
        }
    }
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Translate(TranslateCommand::ModelToHoneybee {
            translation,
            output_file,
        }) => {
            let model = commands::load_model(&translation.model_file)?;
            let data = commands::model_to_honeybee(&model, &translation.options(config))?;
            commands::write_json(&data, output_file.as_deref(), config.pretty)?;
        }
        Commands::Translate(TranslateCommand::ModelToGrids {
            translation,
            folder,
        }) => {
            let model = commands::load_model(&translation.model_file)?;
            commands::model_to_grids(
                &model,
                &translation.options(config),
                &folder,
                config.pretty,
            )?;
        }
        Commands::Check { model_file, raise } => {
            let model = commands::load_model(&model_file)?;
            let report = commands::check(&model, raise)?;
            if report.is_empty() {
                println!("No duplicate identifiers found.");
            } else {
                println!("{}", report);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn full_geometry_drops_multipliers() {
        let cli = Cli::try_parse_from([
            "df-radiance",
            "translate",
            "model-to-grids",
            "model.dfjson",
            "--folder",
            "grids",
            "--full-geometry",
            "--object-per-model",
            "building",
        ])
        .unwrap();
        let Commands::Translate(TranslateCommand::ModelToGrids { translation, folder }) =
            cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(folder, PathBuf::from("grids"));
        let config = Config::from_lookup(|_| None);
        let options = translation.options(&config);
        assert!(!options.use_multiplier);
        assert_eq!(options.object_per_model, ObjectPerModel::Building);
        assert_eq!(options.tolerance, Some(config.tolerance));
    }

    #[test]
    fn unknown_object_per_model_is_rejected() {
        let result = Cli::try_parse_from([
            "df-radiance",
            "translate",
            "model-to-honeybee",
            "model.dfjson",
            "--object-per-model",
            "Campus",
        ]);
        assert!(result.is_err());
    }
}
