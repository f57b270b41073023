//! Project configuration (spec §6, ambient stack §1.1).
//!
//! The optional project-root JSON file. Every field has a default so a
//! partial or absent file still yields a fully usable config.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub src: String,
    pub tests: String,
    pub out: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            src: "src".to_string(),
            tests: "tests".to_string(),
            out: "out".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub layout: LayoutConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig { layout: LayoutConfig::default() }
    }
}

impl ProjectConfig {
    /// Load `sigil.json` from a project root, falling back to defaults
    /// when the file is absent. A malformed file is still an error.
    pub fn load(project_root: &Path) -> Result<Self, String> {
        let config_path = project_root.join("sigil.json");
        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }
        let text = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("failed to read '{}': {}", config_path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("invalid project config '{}': {}", config_path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let cfg = ProjectConfig::default();
        assert_eq!(cfg.layout.src, "src");
        assert_eq!(cfg.layout.tests, "tests");
        assert_eq!(cfg.layout.out, "out");
    }

    #[test]
    fn load_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(cfg, ProjectConfig::default());
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sigil.json"), r#"{"layout":{"src":"lib"}}"#).unwrap();
        let cfg = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.layout.src, "lib");
        assert_eq!(cfg.layout.tests, "tests");
    }
}
