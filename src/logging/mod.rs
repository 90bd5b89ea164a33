//! Tracing filter construction.
//!
//! Component names map to module paths under `servereye::`, so
//! `stream = "debug"` turns into `servereye::stream=debug`.

use crate::config::LoggingConfig;

/// Build filter directives string from LoggingConfig
///
/// # Returns
///
/// A filter string in the format: "base_level,servereye::component1=level1,servereye::component2=level2".
/// Component directives are emitted in name order.
///
/// # Examples
///
/// ```
/// use servereye::config::{LogFormat, LoggingConfig};
/// use servereye::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("stream".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,servereye::stream=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",servereye::{}={}", component, level));
        }
    }

    filter_str
}
