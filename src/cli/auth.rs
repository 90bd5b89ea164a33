//! Auth command implementation

use crate::cli::setup::open_session;
use crate::cli::{AuthLoginArgs, AuthLogoutArgs};
use crate::config::ServerEyeConfig;
use std::path::Path;

fn load_config(path: &Path) -> Result<ServerEyeConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(ServerEyeConfig::load(Some(path))?)
    } else {
        Ok(ServerEyeConfig::default())
    }
}

/// Handle `servereye auth login`
pub fn handle_auth_login(args: &AuthLoginArgs) -> Result<String, Box<dyn std::error::Error>> {
    let token = args.token.trim();
    if token.is_empty() {
        return Err("Token cannot be empty".into());
    }

    let config = load_config(&args.config)?;
    if !config.session.persist {
        return Err("Session persistence is disabled ([session] persist = false)".into());
    }

    let session = open_session(&config)?;
    session.set_token(token)?;

    Ok(match session.path() {
        Some(path) => format!("✓ Token stored in {}", path.display()),
        None => "✓ Token stored".to_string(),
    })
}

/// Handle `servereye auth logout`
pub fn handle_auth_logout(args: &AuthLogoutArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let session = open_session(&config)?;

    if session.clear_token()? {
        Ok("✓ Token removed".to_string())
    } else {
        Ok("No stored token".to_string())
    }
}
