//! `podctl preset`: named partial resource specs.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::commands::ResourceArgs;
use crate::output::json;

/// Preset subcommands.
#[derive(Subcommand)]
pub enum PresetCommand {
    /// List presets
    List,
    /// Show one preset
    Show {
        /// Preset name
        name: String,
    },
    /// Create or replace a preset from the given options
    Save(SaveArgs),
    /// Delete a preset
    Delete {
        /// Preset name
        name: String,
    },
}

#[derive(Args)]
pub struct SaveArgs {
    /// Preset name (lowercase letters, digits, `-`, `_`)
    pub name: String,

    #[command(flatten)]
    pub resources: ResourceArgs,
}

/// Run the preset command.
///
/// # Errors
///
/// Returns an error for unknown or invalid preset names, or unreadable files.
pub fn run(app: &AppContext, cmd: PresetCommand) -> Result<ExitCode> {
    let store = &app.preset_store;
    match cmd {
        PresetCommand::List => {
            app.renderer().presets(&config_service::list_presets(store)?)?;
        }
        PresetCommand::Show { name } => {
            let preset = config_service::get_preset(store, &name)?;
            app.renderer().preset(&name, &preset)?;
        }
        PresetCommand::Save(args) => {
            let overrides = args.resources.overrides();
            anyhow::ensure!(
                !overrides.is_empty(),
                "Preset '{}' would be empty. Pass at least one option, e.g. --gpu-type",
                args.name
            );
            let replaced = config_service::save_preset(store, &args.name, overrides)?;
            if app.is_json() {
                json::print(&serde_json::json!({ "name": args.name, "replaced": replaced }))?;
            } else if replaced {
                app.output.success(&format!("Preset '{}' updated", args.name));
            } else {
                app.output.success(&format!("Preset '{}' saved", args.name));
            }
        }
        PresetCommand::Delete { name } => {
            config_service::delete_preset(store, &name)?;
            if app.is_json() {
                json::print(&serde_json::json!({ "name": name, "deleted": true }))?;
            } else {
                app.output.success(&format!("Preset '{name}' deleted"));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
