use std::io;

use clap::{Args, Subcommand};
use serde_json::Value;

use atrium::features::{FeatureSet, FeatureSettings};

use crate::{
    cli::{active, connect, output, signed_in},
    config::AppConfig,
};

#[derive(Debug, Args)]
pub(crate) struct FeatureCommand {
    #[command(subcommand)]
    command: FeatureSubcommand,
}

#[derive(Debug, Subcommand)]
enum FeatureSubcommand {
    /// List features of the active client
    List,
    /// Turn a feature on
    Enable(FeatureKeyArgs),
    /// Turn a feature off
    Disable(FeatureKeyArgs),
    /// Replace a feature's settings with a JSON object
    Configure(ConfigureArgs),
}

#[derive(Debug, Args)]
struct FeatureKeyArgs {
    /// Feature key
    key: String,
}

#[derive(Debug, Args)]
struct ConfigureArgs {
    /// Feature key
    key: String,

    /// Settings as a JSON object
    #[arg(value_parser = parse_settings)]
    settings: FeatureSettings,
}

pub(crate) async fn run(
    command: FeatureCommand,
    config: &AppConfig,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let repository = connect(config).await;

    match command.command {
        FeatureSubcommand::List => output::emit(out, feature_table(&active(&repository)?.features)),
        FeatureSubcommand::Enable(args) => {
            signed_in(repository.set_feature_enabled(&args.key, true).await)?;

            output::emit(out, format!("enabled {}", args.key))
        }
        FeatureSubcommand::Disable(args) => {
            signed_in(repository.set_feature_enabled(&args.key, false).await)?;

            output::emit(out, format!("disabled {}", args.key))
        }
        FeatureSubcommand::Configure(args) => {
            signed_in(repository.set_feature_settings(&args.key, args.settings).await)?;

            output::emit(out, format!("configured {}", args.key))
        }
    }
}

fn parse_settings(raw: &str) -> Result<FeatureSettings, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(settings)) => Ok(settings),
        Ok(_) => Err("settings must be a JSON object".to_string()),
        Err(error) => Err(format!("invalid JSON: {error}")),
    }
}

pub(crate) fn feature_table(features: &FeatureSet) -> String {
    output::table(
        ["Key", "Name", "Enabled", "Settings"],
        features.iter().map(|entry| {
            [
                entry.key.clone(),
                entry.feature.name.clone(),
                output::flag(entry.feature.enabled),
                if entry.feature.settings.is_empty() {
                    String::new()
                } else {
                    Value::Object(entry.feature.settings.clone()).to_string()
                },
            ]
        }),
    )
}
