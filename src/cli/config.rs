//! Config command handlers

use crate::cli::ConfigInitArgs;
use crate::config::ServerEyeConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../servereye.example.toml");

/// The example file with `[api] base_url` replaced, if a URL was given.
fn render_template(api_url: Option<&str>) -> String {
    let Some(url) = api_url else {
        return EXAMPLE_CONFIG.to_string();
    };
    let default_url = ServerEyeConfig::default().api.base_url;
    EXAMPLE_CONFIG.replacen(
        &format!("base_url = \"{}\"", default_url),
        &format!("base_url = \"{}\"", url.trim_end_matches('/')),
        1,
    )
}

/// Handle `servereye config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    let content = render_template(args.api_url.as_deref());
    let config: ServerEyeConfig =
        toml::from_str(&content).map_err(|e| format!("Generated config is invalid: {}", e))?;
    config.validate()?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, content)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Backend: {}", config.api.base_url);
    if args.api_url.is_none() {
        println!("  Set [api] base_url to point at your ServerEye backend.");
    }

    Ok(())
}
