//! Connection settings for the agent endpoint.
//!
//! Settings can come from several layers (command line, a JSON file, the
//! environment). Each layer is read into a [`PartialConnectionConfig`]; layers
//! are merged with [`PartialConnectionConfig::or`] and the result is turned
//! into an [`AgentConnectionConfig`] which is validated before any network
//! call is made.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

/// An MCP server the agent may use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConnectionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment_name: String,
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServerConfig>>,
}

/// Required connection fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Endpoint,
    ApiKey,
    DeploymentName,
    ApiVersion,
}

impl ConfigField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::Endpoint => "endpoint",
            ConfigField::ApiKey => "api_key",
            ConfigField::DeploymentName => "deployment_name",
            ConfigField::ApiVersion => "api_version",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Missing required connection settings: {}", format_fields(.missing))]
pub struct ConfigValidationError {
    /// Every field that failed, in declaration order
    pub missing: Vec<ConfigField>,
}

fn format_fields(fields: &[ConfigField]) -> String {
    fields
        .iter()
        .map(ConfigField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AgentConnectionConfig {
    /// Checks that all required fields are non-empty. Whitespace-only values
    /// count as empty.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let missing: Vec<ConfigField> = [
            (ConfigField::Endpoint, &self.endpoint),
            (ConfigField::ApiKey, &self.api_key),
            (ConfigField::DeploymentName, &self.deployment_name),
            (ConfigField::ApiVersion, &self.api_version),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { missing })
        }
    }

    /// Endpoint without trailing slashes
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

/// One layer of connection settings; every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConnectionConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment_name: Option<String>,
    pub api_version: Option<String>,
    pub mcp_servers: Option<Vec<McpServerConfig>>,
}

impl PartialConnectionConfig {
    /// Read the `AZURE_OPENAI_*` variables
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            endpoint: var(ENV_ENDPOINT),
            api_key: var(ENV_API_KEY),
            deployment_name: var(ENV_DEPLOYMENT),
            api_version: var(ENV_API_VERSION),
            mcp_servers: None,
        }
    }

    /// Load a JSON settings file, substituting `${VAR}` references
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read connection config: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse connection config: {}", path.display()))?;
        let value = substitute_env_vars_in_value(value).with_context(|| {
            format!(
                "Failed to substitute env vars in connection config: {}",
                path.display()
            )
        })?;
        serde_json::from_value(value)
            .with_context(|| format!("Invalid connection config: {}", path.display()))
    }

    /// `~/.config/genui/connection.json`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("genui").join("connection.json"))
    }

    /// Fill fields missing in `self` from `lower`
    pub fn or(self, lower: PartialConnectionConfig) -> Self {
        Self {
            endpoint: self.endpoint.or(lower.endpoint),
            api_key: self.api_key.or(lower.api_key),
            deployment_name: self.deployment_name.or(lower.deployment_name),
            api_version: self.api_version.or(lower.api_version),
            mcp_servers: self.mcp_servers.or(lower.mcp_servers),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Missing fields become empty strings; `validate` reports them.
    pub fn into_config(self) -> AgentConnectionConfig {
        AgentConnectionConfig {
            endpoint: self.endpoint.unwrap_or_default(),
            api_key: self.api_key.unwrap_or_default(),
            deployment_name: self.deployment_name.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_default(),
            mcp_servers: self.mcp_servers,
        }
    }
}

fn substitute_env_vars_in_value(value: serde_json::Value) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::String(s) => Ok(serde_json::Value::String(
            substitute_env_vars_in_string(&s)?,
        )),
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, val)| Ok((key, substitute_env_vars_in_value(val)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(serde_json::Value::Object),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(substitute_env_vars_in_value)
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        other => Ok(other),
    }
}

/// Substitute environment variables in a string (${VAR_NAME} format)
fn substitute_env_vars_in_string(input: &str) -> Result<String> {
    let mut result = input.to_string();

    while let Some(start) = result.find("${") {
        let end = result[start..].find('}').ok_or_else(|| {
            anyhow::anyhow!("Unclosed environment variable substitution: {input}")
        })?;
        let end = start + end;

        let var_name = &result[start + 2..end];
        let var_value = std::env::var(var_name)
            .with_context(|| format!("Environment variable not set: {var_name}"))?;

        result.replace_range(start..=end, &var_value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn complete() -> AgentConnectionConfig {
        AgentConnectionConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: "k".to_string(),
            deployment_name: "d".to_string(),
            api_version: "v".to_string(),
            mcp_servers: None,
        }
    }

    #[test]
    fn test_complete_config_validates() {
        assert!(complete().validate().is_ok());
        assert_eq!(complete().base_url(), "https://example.openai.azure.com");
    }

    #[test]
    fn test_validation_lists_every_missing_field() {
        let config = AgentConnectionConfig {
            endpoint: String::new(),
            api_version: "   ".to_string(),
            ..complete()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.missing,
            vec![ConfigField::Endpoint, ConfigField::ApiVersion]
        );
        assert_eq!(
            err.to_string(),
            "Missing required connection settings: endpoint, api_version"
        );
    }

    #[test]
    fn test_layers_merge_with_priority() {
        let cli = PartialConnectionConfig {
            api_key: Some("from-cli".to_string()),
            ..Default::default()
        };
        let file = PartialConnectionConfig {
            endpoint: Some("https://file".to_string()),
            api_key: Some("from-file".to_string()),
            ..Default::default()
        };

        let merged = cli.or(file).into_config();
        assert_eq!(merged.api_key, "from-cli");
        assert_eq!(merged.endpoint, "https://file");
        assert_eq!(merged.deployment_name, "");
        assert!(merged.validate().is_err());
    }

    #[test]
    fn test_load_from_file_substitutes_env_vars() -> Result<()> {
        std::env::set_var("GENUI_TEST_CONFIG_KEY", "secret-123");
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "endpoint": "https://res.openai.azure.com",
                "api_key": "${{GENUI_TEST_CONFIG_KEY}}",
                "deployment_name": "gpt-4o",
                "mcp_servers": [{{ "name": "tickets", "url": "https://mcp.example.com" }}]
            }}"#
        )?;

        let partial = PartialConnectionConfig::load_from_file(file.path())?;
        assert_eq!(partial.api_key.as_deref(), Some("secret-123"));
        assert_eq!(partial.api_version, None);
        assert_eq!(partial.mcp_servers.as_ref().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_missing_env_var_is_an_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "api_key": "${{GENUI_TEST_SURELY_UNSET_VAR}}" }}"#)?;

        let err = PartialConnectionConfig::load_from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("GENUI_TEST_SURELY_UNSET_VAR"));
        Ok(())
    }
}
