use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::env;

use crate::hub;
use crate::registry::{self, validator::ProbePolicy};

const ENV_PREFIX: &str = "ARTIFACT_BROWSER";

lazy_static::lazy_static! {
    static ref ENV_VAR_PATTERN: regex::Regex =
        regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid env var pattern");
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub validation: ProbePolicy,
    #[serde(default)]
    pub hub: HubSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySettings {
    /// Artifact Registry REST endpoint
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// OAuth endpoint service account assertions are exchanged at
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Regions scanned when listing repositories, in order
    #[serde(default = "registry::default_candidate_locations")]
    pub candidate_locations: Vec<String>,
    /// Page size requested from the registry API
    #[serde(default = "default_registry_page_size")]
    pub page_size: u32,
}

fn default_api_base_url() -> String {
    registry::DEFAULT_API_BASE_URL.to_string()
}

fn default_token_uri() -> String {
    registry::auth::DEFAULT_TOKEN_URI.to_string()
}

fn default_registry_page_size() -> u32 {
    registry::DEFAULT_PAGE_SIZE
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_uri: default_token_uri(),
            candidate_locations: registry::default_candidate_locations(),
            page_size: default_registry_page_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    #[serde(default = "default_hub_base_url")]
    pub base_url: String,
    #[serde(default = "default_hub_page_size")]
    pub page_size: u32,
}

fn default_hub_base_url() -> String {
    hub::DEFAULT_BASE_URL.to_string()
}

fn default_hub_page_size() -> u32 {
    hub::DEFAULT_PAGE_SIZE
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            base_url: default_hub_base_url(),
            page_size: default_hub_page_size(),
        }
    }
}

impl Settings {
    /// Substitute environment variables in a string value
    /// Replaces ${VAR_NAME} or ${VAR_NAME:-default} with environment variable values
    fn substitute_env_vars_in_string(s: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(s, |caps: &regex::Captures| {
                let var_name = &caps[1];
                let default_value = caps.get(2).map(|m| m.as_str());

                match env::var(var_name) {
                    Ok(val) => val,
                    Err(_) => default_value.unwrap_or("").to_string(),
                }
            })
            .to_string()
    }

    /// Convert a config::Value to a serde_json::Value, performing environment variable substitution
    fn config_value_to_json(value: &config::Value) -> serde_json::Value {
        use config::ValueKind;

        match &value.kind {
            ValueKind::Nil => serde_json::Value::Null,
            ValueKind::Boolean(b) => serde_json::Value::Bool(*b),
            ValueKind::I64(i) => serde_json::Value::Number((*i).into()),
            ValueKind::I128(i) => serde_json::Value::Number((*i as i64).into()),
            ValueKind::U64(u) => serde_json::Value::Number((*u).into()),
            ValueKind::U128(u) => serde_json::Value::Number((*u as u64).into()),
            ValueKind::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueKind::String(s) => {
                serde_json::Value::String(Self::substitute_env_vars_in_string(s))
            }
            ValueKind::Table(table) => {
                let mut map = serde_json::Map::new();
                for (k, v) in table.iter() {
                    map.insert(k.clone(), Self::config_value_to_json(v));
                }
                serde_json::Value::Object(map)
            }
            ValueKind::Array(arr) => {
                let vec: Vec<serde_json::Value> =
                    arr.iter().map(Self::config_value_to_json).collect();
                serde_json::Value::Array(vec)
            }
        }
    }

    /// Try to add a config file with multiple extension attempts (.toml, .yaml, .yml)
    /// Returns true if a file was loaded
    fn try_add_config_file(
        builder: &mut config::ConfigBuilder<config::builder::DefaultState>,
        config_dir: &str,
        name: &str,
    ) -> bool {
        let extensions = ["toml", "yaml", "yml"];

        for ext in extensions {
            let path = format!("{}/{}.{}", config_dir, name, ext);
            if std::path::Path::new(&path).exists() {
                tracing::info!("Loading config file: {}", path);
                *builder = builder
                    .clone()
                    .add_source(config::File::with_name(&format!("{}/{}", config_dir, name)));
                return true;
            }
        }

        tracing::debug!(
            "Optional config file not found: {}/{}.{{toml,yaml,yml}}",
            config_dir,
            name
        );
        false
    }

    /// Load settings from `{config_dir}/default`, `{config_dir}/{run_mode}`
    /// and `{config_dir}/local`, then `ARTIFACT_BROWSER__*` environment
    /// variables. All files are optional.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("ARTIFACT_BROWSER_CONFIG_RUN_MODE")
            .unwrap_or_else(|_| "development".into());
        let config_dir =
            env::var("ARTIFACT_BROWSER_CONFIG_DIR").unwrap_or_else(|_| "config".into());

        let mut builder = Config::builder();

        Self::try_add_config_file(&mut builder, &config_dir, "default");
        Self::try_add_config_file(&mut builder, &config_dir, &run_mode);
        Self::try_add_config_file(&mut builder, &config_dir, "local");

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("registry.candidate_locations")
                .with_list_parse_key("validation.probe_locations")
                .with_list_parse_key("validation.limited_access_codes")
                .with_list_parse_key("validation.rejecting_codes"),
        );

        let config = builder.build()?;

        let root_value = config
            .cache
            .into_table()
            .map_err(|e| ConfigError::Message(format!("Failed to get config table: {}", e)))?;

        let mut json_map = serde_json::Map::new();
        for (k, v) in root_value.iter() {
            json_map.insert(k.clone(), Self::config_value_to_json(v));
        }
        let json_value = serde_json::Value::Object(json_map);

        // Deserialize from JSON value and collect unused fields
        let mut unused_fields = Vec::new();
        let settings: Settings = serde_ignored::deserialize(json_value, |path| {
            unused_fields.push(path.to_string());
        })
        .map_err(|e| ConfigError::Message(format!("Failed to deserialize settings: {}", e)))?;

        for field in &unused_fields {
            tracing::warn!("Unknown configuration field in backend config: {}", field);
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.candidate_locations.is_empty() {
            return Err(ConfigError::Message(
                "registry.candidate_locations must name at least one location".to_string(),
            ));
        }
        if self.validation.probe_locations.is_empty() {
            return Err(ConfigError::Message(
                "validation.probe_locations must name at least one location".to_string(),
            ));
        }
        if self.registry.page_size == 0 || self.hub.page_size == 0 {
            return Err(ConfigError::Message(
                "page sizes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
