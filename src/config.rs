use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Key of the provider entry this client reads.
pub const GEMINI_PROVIDER: &str = "Gemini (Recommended)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    // Settings of other tools sharing the file
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn gemini(&self) -> Option<&ProviderConfig> {
        self.providers.get(GEMINI_PROVIDER)
    }

    /// Api key of the Gemini entry, `None` when missing or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini()
            .map(|p| p.api_key.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn model_name(&self) -> Option<&str> {
        self.gemini().and_then(|p| p.model_name.as_deref())
    }

    /// Rewrites `model_name` of the Gemini entry in place, leaving every other field as found.
    pub fn save_model_selection(path: impl AsRef<Path>, model_name: &str) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;
        let provider = config
            .providers
            .get_mut(GEMINI_PROVIDER)
            .ok_or_else(|| anyhow!("no \"{}\" provider in {}", GEMINI_PROVIDER, path.display()))?;
        provider.model_name = Some(model_name.to_string());
        config.write_to(path)
    }

    fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        std::fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_gemini_entry() {
        let file = write_config(&json!({
            "providers": {
                "Gemini (Recommended)": { "api_key": "secret", "model_name": "gemini-2.5-flash" },
                "Other": { "api_key": "x" }
            }
        }));

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.model_name(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_blank_key_and_missing_entry() {
        let config: Config =
            serde_json::from_value(json!({ "providers": { "Gemini (Recommended)": { "api_key": "  " } } })).unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.model_name(), None);

        let config: Config = serde_json::from_value(json!({})).unwrap();
        assert!(config.gemini().is_none());
    }

    #[test]
    fn test_save_model_selection_preserves_other_fields() {
        let file = write_config(&json!({
            "theme": "dark",
            "providers": {
                "Gemini (Recommended)": { "api_key": "secret", "model_name": "gemini-2.5-flash", "org": "acme" },
                "Other": { "api_key": "x" }
            }
        }));

        Config::save_model_selection(file.path(), "gemini-2.5-pro-exp-03-25").unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("\n    \""), "expected 4-space indent: {}", text);
        let saved: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["providers"]["Other"]["api_key"], "x");
        assert_eq!(saved["providers"]["Gemini (Recommended)"]["api_key"], "secret");
        assert_eq!(saved["providers"]["Gemini (Recommended)"]["org"], "acme");
        assert_eq!(
            saved["providers"]["Gemini (Recommended)"]["model_name"],
            "gemini-2.5-pro-exp-03-25"
        );
    }

    #[test]
    fn test_save_without_gemini_entry_fails() {
        let file = write_config(&json!({ "providers": {} }));
        assert!(Config::save_model_selection(file.path(), "gemini-2.5-flash").is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("config.json")).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
