/// `load_config` module: Loads a static YAML config file plus out-of-band secrets into the
/// immutable [`PipelineConfig`] used by the rest of the program.
///
/// This is the only place that reads the config file, the secrets file or the process
/// environment. Everything downstream receives the resolved value by reference.
///
/// # Responsibilities
/// - Parse the YAML file into permissive intermediate structs (every key optional)
/// - Check required keys and report the dotted path of the first missing one
/// - Validate values (non-empty bucket/region, http(s) base URL, non-zero timeouts)
/// - Resolve `ACCESS_KEY` / `SECRET_ACCESS_KEY` / `SESSION_TOKEN` from a dotenv file or the environment
///
/// # Errors
/// File, YAML and key problems are [`ConfigError`]s; credential problems are [`SecretsError`]s.
/// Both convert into [`EtlError`] so the CLI can name the failing stage.
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use jobs_etl_core::config::{
    ApiConfig, Credentials, OutputConfig, PipelineConfig, StorageConfig, DEFAULT_API_TIMEOUT,
    DEFAULT_RESULTS_KEY, DEFAULT_STORAGE_TIMEOUT,
};
use jobs_etl_core::error::{ConfigError, EtlError, SecretsError};
use reqwest::Url;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
pub const SECRET_ACCESS_KEY_VAR: &str = "SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "SESSION_TOKEN";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    api: RawApi,
    #[serde(default)]
    output: RawOutput,
    #[serde(default)]
    storage: RawStorage,
}

#[derive(Debug, Default, Deserialize)]
struct RawApi {
    base_url: Option<String>,
    page: Option<u32>,
    results_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    file_name: Option<String>,
    #[serde(default)]
    keep_local: bool,
    #[serde(default)]
    date_only: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawStorage {
    bucket: Option<String>,
    key: Option<String>,
    region: Option<String>,
    endpoint_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Loads the config file at `path` and the secrets (from `secrets_path` when given,
/// otherwise from the process environment) into a [`PipelineConfig`].
pub fn load_config<P: AsRef<Path>>(
    path: P,
    secrets_path: Option<&Path>,
) -> Result<PipelineConfig, EtlError> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(ConfigError::Read {
                path: path_ref.to_path_buf(),
                source: e,
            }
            .into());
        }
    };

    let static_conf = parse_config(&config_content)?;

    let credentials = match secrets_path {
        Some(secrets) => resolve_secrets_file(secrets)?,
        None => resolve_secrets(|name| std::env::var(name).ok())?,
    };

    let config = static_conf.with_credentials(credentials);
    config.trace_loaded();
    Ok(config)
}

/// The validated, secret-free part of the configuration.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub storage: StorageConfig,
}

impl StaticConfig {
    pub fn with_credentials(self, credentials: Credentials) -> PipelineConfig {
        PipelineConfig {
            api: self.api,
            output: self.output,
            storage: self.storage,
            credentials,
        }
    }
}

/// Parses and validates YAML config text.
pub fn parse_config(content: &str) -> Result<StaticConfig, ConfigError> {
    let raw: RawConfig = match serde_yaml::from_str::<Option<RawConfig>>(content) {
        Ok(conf) => {
            info!("Parsed config YAML successfully");
            conf.unwrap_or_default()
        }
        Err(e) => {
            error!(error = ?e, "Failed to parse config YAML");
            return Err(ConfigError::Parse(e.to_string()));
        }
    };

    let base_url = required(raw.api.base_url, "api.base_url")?;
    let base_url = Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
        key: "api.base_url",
        reason: e.to_string(),
    })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: "api.base_url",
            reason: format!("unsupported scheme `{}`, expected http or https", base_url.scheme()),
        });
    }
    let page = raw.api.page.ok_or(ConfigError::MissingKey("api.page"))?;
    let file_name = required(raw.output.file_name, "output.file_name")?;
    let bucket = required(raw.storage.bucket, "storage.bucket")?;
    let key = required(raw.storage.key, "storage.key")?;
    let region = required(raw.storage.region, "storage.region")?;

    let api = ApiConfig {
        base_url,
        page,
        results_key: raw
            .api
            .results_key
            .unwrap_or_else(|| DEFAULT_RESULTS_KEY.to_string()),
        timeout: timeout(raw.api.timeout_secs, "api.timeout_secs", DEFAULT_API_TIMEOUT)?,
    };

    let storage = StorageConfig {
        key: object_key(&key, &file_name),
        bucket,
        region,
        endpoint_url: raw.storage.endpoint_url.filter(|u| !u.trim().is_empty()),
        timeout: timeout(
            raw.storage.timeout_secs,
            "storage.timeout_secs",
            DEFAULT_STORAGE_TIMEOUT,
        )?,
    };

    let output = OutputConfig {
        file_name,
        keep_local: raw.output.keep_local,
        date_only: raw.output.date_only,
    };

    info!(
        base_url = %api.base_url,
        page = api.page,
        bucket = %storage.bucket,
        key = %storage.key,
        "Config parsed and validated successfully"
    );

    Ok(StaticConfig {
        api,
        output,
        storage,
    })
}

/// A `key` ending in `/` is a folder prefix; the output file name completes it.
pub fn object_key(key: &str, file_name: &str) -> String {
    if key.ends_with('/') {
        format!("{key}{file_name}")
    } else {
        key.to_string()
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        None => {
            error!(key, "Required config key missing");
            Err(ConfigError::MissingKey(key))
        }
        Some(v) if v.trim().is_empty() => Err(ConfigError::Invalid {
            key,
            reason: "must not be empty".to_string(),
        }),
        Some(v) => Ok(v),
    }
}

fn timeout(
    secs: Option<u64>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match secs {
        None => Ok(default),
        Some(0) => Err(ConfigError::Invalid {
            key,
            reason: "timeout must be at least one second".to_string(),
        }),
        Some(s) => Ok(Duration::from_secs(s)),
    }
}

/// Reads credentials from a dotenv-format file without touching the process environment.
pub fn resolve_secrets_file(path: &Path) -> Result<Credentials, SecretsError> {
    info!(secrets_path = ?path, "Reading secrets file");
    let file_error = |reason: String| SecretsError::File {
        path: path.to_path_buf(),
        reason,
    };
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(|e| file_error(e.to_string()))? {
        let (name, value) = item.map_err(|e| file_error(e.to_string()))?;
        vars.insert(name, value);
    }
    resolve_secrets(|name| vars.get(name).cloned())
}

/// Builds [`Credentials`] from a variable lookup. Required values must be set and non-blank;
/// a blank session token counts as absent.
pub fn resolve_secrets<F>(lookup: F) -> Result<Credentials, SecretsError>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |name: &'static str| match lookup(name) {
        None => {
            error!(var = name, "Secret not set");
            Err(SecretsError::Missing(name))
        }
        Some(v) if v.trim().is_empty() => {
            error!(var = name, "Secret is empty");
            Err(SecretsError::Empty(name))
        }
        Some(v) => Ok(v),
    };

    let access_key_id = require(ACCESS_KEY_VAR)?;
    let secret_access_key = SecretString::from(require(SECRET_ACCESS_KEY_VAR)?);
    let session_token = lookup(SESSION_TOKEN_VAR)
        .filter(|t| !t.trim().is_empty())
        .map(SecretString::from);

    info!(
        access_key_set = !access_key_id.is_empty(),
        session_token_set = session_token.is_some(),
        "Resolved object store credentials"
    );
    Ok(Credentials {
        access_key_id,
        secret_access_key,
        session_token,
    })
}
