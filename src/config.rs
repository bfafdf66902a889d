use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Token;
use crate::circleci::client::{ClientConfig, DEFAULT_BASE_URL};

/// Configuration file structure for the `circleci` tool.
///
/// Lets users keep their token, API endpoint and output preferences in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub circleci: CircleCiConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CircleCiConfig {
    /// CircleCI personal API token
    pub token: Option<Token>,

    /// API root, e.g. `https://circleci.example.com/api/v2/` for server installs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Stop auto-pagination after this many pages
    pub max_pages: Option<usize>,

    /// Default project slug (e.g., 'gh/org/repo')
    pub project: Option<String>,

    /// Default branch filter for project pipelines
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Default for CircleCiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_pages: None,
            project: None,
            branch: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl CircleCiConfig {
    /// Client settings, with `token` taking precedence over the configured one.
    pub fn client_config(&self, token: Option<Token>) -> Result<ClientConfig> {
        let token = token
            .or_else(|| self.token.clone())
            .context("No CircleCI token: pass --token, set CIRCLECI_TOKEN or add it to the config file")?;

        Ok(ClientConfig {
            base_url: self.base_url.clone(),
            token,
            timeout: Some(Duration::from_secs(self.timeout_secs)),
            max_pages: self.max_pages,
        })
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./circleci.toml, ./circleci.json, ./circleci.yaml, ./circleci.yml
    /// 3. `<config dir>/circleci/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["circleci.toml", "circleci.json", "circleci.yaml", "circleci.yml"];
        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Per-user config file location, if the platform has a config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("circleci").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.circleci.base_url, "https://circleci.com/api/v2/");
        assert_eq!(config.circleci.timeout_secs, 30);
        assert!(config.circleci.max_pages.is_none());
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[circleci]
token = "cci-test-token"
base-url = "https://circleci.example.com/api/v2/"
timeout-secs = 5
max-pages = 20
project = "gh/acme/widgets"

[output]
format = "json"
pretty = true
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.circleci.token, Some(Token::from("cci-test-token")));
        assert_eq!(
            config.circleci.base_url,
            "https://circleci.example.com/api/v2/"
        );
        assert_eq!(config.circleci.timeout_secs, 5);
        assert_eq!(config.circleci.max_pages, Some(20));
        assert_eq!(config.circleci.project.as_deref(), Some("gh/acme/widgets"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(
            temp_file,
            "circleci:\n  token: yaml-token\n  branch: develop\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.circleci.token, Some(Token::from("yaml-token")));
        assert_eq!(config.circleci.branch.as_deref(), Some("develop"));
        assert_eq!(config.circleci.base_url, "https://circleci.com/api/v2/");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        assert!(Config::load(Some(Path::new("does-not-exist.toml"))).is_err());
    }

    #[test]
    fn test_save_and_reload_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circleci.json");

        let mut config = Config::default();
        config.circleci.token = Some(Token::from("saved"));
        config.circleci.max_pages = Some(3);
        config.save(&path).unwrap();

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.circleci.token, Some(Token::from("saved")));
        assert_eq!(reloaded.circleci.max_pages, Some(3));
    }

    #[test]
    fn test_client_config_prefers_explicit_token() {
        let mut config = CircleCiConfig::default();
        config.token = Some(Token::from("from-file"));
        config.max_pages = Some(7);

        let client = config.client_config(Some(Token::from("from-cli"))).unwrap();
        assert_eq!(client.token, Token::from("from-cli"));
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
        assert_eq!(client.max_pages, Some(7));

        let client = config.client_config(None).unwrap();
        assert_eq!(client.token, Token::from("from-file"));
    }

    #[test]
    fn test_client_config_requires_token() {
        let err = CircleCiConfig::default().client_config(None).unwrap_err();
        assert!(err.to_string().contains("No CircleCI token"));
    }
}
