//! Configuration commands.

use console::style;

use crate::config::Settings;

/// Print the effective settings as TOML.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    match &settings.source_path {
        Some(path) => eprintln!("{} Loaded from {}", style("→").dim(), path.display()),
        None => eprintln!("{} No config file found, showing defaults", style("!").yellow()),
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}
