use serde::{Deserialize, Serialize};

/// How the layout root is treated when it is not in the expansion set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPolicy {
    /// The root is always laid out into its children.
    #[default]
    AlwaysExpanded,
    /// The root follows the expansion set like any other folder, so an empty
    /// set shows the root as a single rectangle.
    Collapsible,
}

/// Settings for the frontier controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
    pub root_policy: RootPolicy,
}

/// Settings for the file-system scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip dot-files and dot-folders.
    pub skip_hidden: bool,
    /// Follow symbolic links instead of recording the link itself.
    pub follow_links: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FrontierConfig::default();
        assert_eq!(config.root_policy, RootPolicy::AlwaysExpanded);

        let scan = ScanConfig::default();
        assert!(!scan.skip_hidden);
        assert!(!scan.follow_links);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: FrontierConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FrontierConfig::default());

        let config: FrontierConfig =
            serde_json::from_str(r#"{"root_policy":"collapsible"}"#).unwrap();
        assert_eq!(config.root_policy, RootPolicy::Collapsible);

        let scan: ScanConfig = serde_json::from_str(r#"{"skip_hidden":true}"#).unwrap();
        assert!(scan.skip_hidden);
        assert!(!scan.follow_links);
    }
}
