use anyhow::Result;
use tracing::warn;

use autohost_config::{GlobalConfig, validate_config};
use autohost_core::types::OutputFormat;

pub(crate) fn handle_config_show(format: OutputFormat) -> Result<()> {
    let config = GlobalConfig::load()?;

    match format {
        OutputFormat::Json => {
            let json_str = serde_json::to_string_pretty(&config)?;
            println!("{}", json_str);
        }
        OutputFormat::Text => {
            if let Ok(path) = GlobalConfig::config_path() {
                if !path.exists() {
                    eprintln!("# {} not found; showing defaults", path.display());
                }
            }
            let toml_str = toml::to_string_pretty(&config)?;
            print!("{}", toml_str);
        }
    }
    Ok(())
}

pub(crate) fn handle_config_init(force: bool) -> Result<()> {
    let path = GlobalConfig::config_path()?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    GlobalConfig::save_default_template_to(&path)?;
    eprintln!("Generated global config template at: {}", path.display());
    Ok(())
}

pub(crate) fn handle_config_validate() -> Result<()> {
    let path = GlobalConfig::config_path()?;
    if !path.exists() {
        warn!("No config file at {}; defaults are in effect", path.display());
    }
    let config = GlobalConfig::load_from(&path)?;
    validate_config(&config)?;
    eprintln!("Configuration is valid.");
    Ok(())
}
