use anyhow::{Context, Result};

use pixi_runner_core::Config;
use pixi_runner_core::config::CONFIG_FILE_NAMES;

use super::Session;

pub fn config_command(session: &Session, json: bool, init: bool, force: bool) -> Result<()> {
    if init {
        let config_path = session.cwd.join(CONFIG_FILE_NAMES[0]);
        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }
        Config::default()
            .save_to_file(&config_path)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        println!("✅ Created config: {}", config_path.display());
        return Ok(());
    }

    let rendered = serde_json::to_string_pretty(&session.config)?;
    if json {
        println!("{rendered}");
        return Ok(());
    }

    match Config::find_config_file(&session.cwd) {
        Some(path) => println!("📄 Config file: {}", path.display()),
        None => println!("📄 No config file found, using defaults"),
    }
    println!("{rendered}");
    Ok(())
}
