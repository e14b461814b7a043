use agent_client::azure_openai::DEFAULT_API_VERSION;
use agent_client::config::PartialConnectionConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Merge the settings layers, highest precedence first, and fill in the
/// default API version if no layer names one.
pub fn merge_layers(
    cli: PartialConnectionConfig,
    file: PartialConnectionConfig,
    env: PartialConnectionConfig,
) -> PartialConnectionConfig {
    let mut merged = cli.or(file).or(env);
    if merged.api_version.is_none() {
        merged.api_version = Some(DEFAULT_API_VERSION.to_string());
    }
    merged
}

/// Read the connection settings file.
///
/// An explicitly given path must exist. The default location is optional.
pub fn load_file_layer(explicit_path: Option<&Path>) -> Result<PartialConnectionConfig> {
    if let Some(path) = explicit_path {
        return PartialConnectionConfig::load_from_file(path);
    }

    match PartialConnectionConfig::default_config_path() {
        Some(path) if path.exists() => {
            debug!("Loading connection settings from {}", path.display());
            PartialConnectionConfig::load_from_file(&path)
        }
        _ => Ok(PartialConnectionConfig::default()),
    }
}

/// Connection settings from the command line, the settings file and the
/// environment (after loading `.env`), in that order of precedence.
pub fn resolve_connection_settings(
    cli: PartialConnectionConfig,
    config_path: Option<&Path>,
) -> Result<PartialConnectionConfig> {
    // A missing .env file is normal
    let _ = dotenv::dotenv();

    let file = load_file_layer(config_path).context("Failed to load connection settings")?;
    Ok(merge_layers(cli, file, PartialConnectionConfig::from_env()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn layer(endpoint: Option<&str>, api_key: Option<&str>) -> PartialConnectionConfig {
        PartialConnectionConfig {
            endpoint: endpoint.map(str::to_string),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_cli_beats_file_beats_env() {
        let merged = merge_layers(
            layer(Some("https://cli"), None),
            layer(Some("https://file"), Some("file-key")),
            PartialConnectionConfig {
                deployment_name: Some("env-deployment".to_string()),
                api_key: Some("env-key".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(merged.endpoint.as_deref(), Some("https://cli"));
        assert_eq!(merged.api_key.as_deref(), Some("file-key"));
        assert_eq!(merged.deployment_name.as_deref(), Some("env-deployment"));
    }

    #[test]
    fn test_default_api_version_only_when_missing() {
        let merged = merge_layers(
            PartialConnectionConfig::default(),
            PartialConnectionConfig::default(),
            PartialConnectionConfig::default(),
        );
        assert_eq!(merged.api_version.as_deref(), Some(DEFAULT_API_VERSION));
        // Still incomplete
        assert!(merged.into_config().validate().is_err());

        let merged = merge_layers(
            PartialConnectionConfig {
                api_version: Some("2023-05-15".to_string()),
                ..Default::default()
            },
            PartialConnectionConfig::default(),
            PartialConnectionConfig::default(),
        );
        assert_eq!(merged.api_version.as_deref(), Some("2023-05-15"));
    }

    #[test]
    fn test_explicit_file_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"endpoint": "https://file.example", "deployment_name": "gpt-4o"}}"#
        )
        .unwrap();

        let loaded = load_file_layer(Some(file.path())).unwrap();
        assert_eq!(loaded.endpoint.as_deref(), Some("https://file.example"));
        assert_eq!(loaded.deployment_name.as_deref(), Some("gpt-4o"));
        assert!(loaded.api_key.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_file_layer(Some(&missing)).is_err());
    }
}
