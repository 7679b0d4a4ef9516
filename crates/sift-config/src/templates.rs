//! Configuration template for `sift init`.

/// Default configuration file name.
pub const CONFIG_FILENAME: &str = "sift.toml";

/// Starter configuration (valid TOML).
const TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the starter configuration written by `sift init`.
pub fn config_template() -> &'static str {
    TEMPLATE
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::Config;

    #[test]
    fn template_resolves_to_defaults() {
        let config = Config::from_toml_str(TEMPLATE, Path::new(CONFIG_FILENAME)).unwrap();
        let defaults = Config::default();
        assert_eq!(config.server.bind, defaults.server.bind);
        assert_eq!(config.search.max_pattern_length, defaults.search.max_pattern_length);
        assert_eq!(config.selectors.post, defaults.selectors.post);
        assert_eq!(config.sites.len(), 3);
    }

    #[test]
    fn template_validates_cleanly() {
        let config = Config::from_toml_str(TEMPLATE, Path::new(CONFIG_FILENAME)).unwrap();
        assert!(config.validate().is_empty());
    }
}
