use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub content: ContentConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    /// Populate an empty catalog with demo rows at startup. Meant for local
    /// runs without the crawler; off by default.
    pub seed_demo: bool,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Optional on purpose: a missing key is a runtime `ProviderUnavailable`,
    /// not a startup failure, so the canned and catalog paths keep working.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Storefront identity woven into canned replies and prompts.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub name: String,
    pub site_url: String,
    pub currency_prefix: String,
    pub helpline: String,
    pub whatsapp_link: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    /// Flat text blob produced by the out-of-process crawler.
    pub pages_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Wall-clock budget for one bounded generation call.
    pub llm_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub pages_path: Option<PathBuf>,
    pub site_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://storebot.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
                seed_demo: false,
            },
            gemini: GeminiConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.5-flash-lite".to_string(),
                request_timeout_secs: 30,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            store: StoreConfig {
                name: "Trend Street".to_string(),
                site_url: "https://shop.example.com".to_string(),
                currency_prefix: "Rs.".to_string(),
                helpline: "02100000000".to_string(),
                whatsapp_link: None,
            },
            content: ContentConfig { pages_path: PathBuf::from("pages_content.txt") },
            dispatch: DispatchConfig { llm_timeout_secs: 4 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("storebot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
            if let Some(seed_demo) = database.seed_demo {
                self.database.seed_demo = seed_demo;
            }
        }

        if let Some(gemini) = patch.gemini {
            if let Some(gemini_api_key_value) = gemini.api_key {
                self.gemini.api_key = Some(secret_value(gemini_api_key_value));
            }
            if let Some(base_url) = gemini.base_url {
                self.gemini.base_url = base_url;
            }
            if let Some(model) = gemini.model {
                self.gemini.model = model;
            }
            if let Some(request_timeout_secs) = gemini.request_timeout_secs {
                self.gemini.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(store) = patch.store {
            if let Some(name) = store.name {
                self.store.name = name;
            }
            if let Some(site_url) = store.site_url {
                self.store.site_url = site_url;
            }
            if let Some(currency_prefix) = store.currency_prefix {
                self.store.currency_prefix = currency_prefix;
            }
            if let Some(helpline) = store.helpline {
                self.store.helpline = helpline;
            }
            if let Some(whatsapp_link) = store.whatsapp_link {
                self.store.whatsapp_link = Some(whatsapp_link);
            }
        }

        if let Some(content) = patch.content {
            if let Some(pages_path) = content.pages_path {
                self.content.pages_path = pages_path;
            }
        }

        if let Some(dispatch) = patch.dispatch {
            if let Some(llm_timeout_secs) = dispatch.llm_timeout_secs {
                self.dispatch.llm_timeout_secs = llm_timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREBOT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("STOREBOT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("STOREBOT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("STOREBOT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("STOREBOT_DATABASE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREBOT_DATABASE_SEED_DEMO") {
            self.database.seed_demo = parse_bool("STOREBOT_DATABASE_SEED_DEMO", &value)?;
        }

        if let Some(value) = read_env("STOREBOT_GEMINI_API_KEY") {
            self.gemini.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("STOREBOT_GEMINI_BASE_URL") {
            self.gemini.base_url = value;
        }
        if let Some(value) = read_env("STOREBOT_GEMINI_MODEL") {
            self.gemini.model = value;
        }
        if let Some(value) = read_env("STOREBOT_GEMINI_TIMEOUT_SECS") {
            self.gemini.request_timeout_secs = parse_u64("STOREBOT_GEMINI_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STOREBOT_SERVER_PORT") {
            self.server.port = parse_u16("STOREBOT_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("STOREBOT_STORE_NAME") {
            self.store.name = value;
        }
        if let Some(value) = read_env("STOREBOT_STORE_SITE_URL") {
            self.store.site_url = value;
        }
        if let Some(value) = read_env("STOREBOT_STORE_CURRENCY_PREFIX") {
            self.store.currency_prefix = value;
        }
        if let Some(value) = read_env("STOREBOT_STORE_HELPLINE") {
            self.store.helpline = value;
        }
        if let Some(value) = read_env("STOREBOT_STORE_WHATSAPP_LINK") {
            self.store.whatsapp_link = Some(value);
        }

        if let Some(value) = read_env("STOREBOT_CONTENT_PAGES_PATH") {
            self.content.pages_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("STOREBOT_DISPATCH_LLM_TIMEOUT_SECS") {
            self.dispatch.llm_timeout_secs =
                parse_u64("STOREBOT_DISPATCH_LLM_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("STOREBOT_LOGGING_LEVEL").or_else(|| read_env("STOREBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREBOT_LOGGING_FORMAT").or_else(|| read_env("STOREBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(gemini_api_key) = overrides.gemini_api_key {
            self.gemini.api_key = Some(secret_value(gemini_api_key));
        }
        if let Some(pages_path) = overrides.pages_path {
            self.content.pages_path = pages_path;
        }
        if let Some(site_url) = overrides.site_url {
            self.store.site_url = site_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_gemini(&self.gemini)?;
        validate_server(&self.server)?;
        validate_store(&self.store)?;
        validate_dispatch(&self.dispatch)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storebot.toml"), PathBuf::from("config/storebot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    if !url.starts_with("sqlite:") && url != ":memory:" {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::memory:`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_gemini(gemini: &GeminiConfig) -> Result<(), ConfigError> {
    if gemini.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("gemini.base_url must not be empty".to_string()));
    }
    if gemini.model.trim().is_empty() {
        return Err(ConfigError::Validation("gemini.model must not be empty".to_string()));
    }
    if gemini.request_timeout_secs == 0 || gemini.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gemini.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if let Some(api_key) = &gemini.api_key {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gemini.api_key is set but empty; omit it entirely to run without a provider"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.name.trim().is_empty() {
        return Err(ConfigError::Validation("store.name must not be empty".to_string()));
    }
    if !store.site_url.starts_with("http://") && !store.site_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "store.site_url must be an http(s) URL".to_string(),
        ));
    }
    if store.currency_prefix.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.currency_prefix must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_dispatch(dispatch: &DispatchConfig) -> Result<(), ConfigError> {
    if dispatch.llm_timeout_secs == 0 || dispatch.llm_timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "dispatch.llm_timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    gemini: Option<GeminiPatch>,
    server: Option<ServerPatch>,
    store: Option<StorePatch>,
    content: Option<ContentPatch>,
    dispatch: Option<DispatchPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    seed_demo: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    name: Option<String>,
    site_url: Option<String>,
    currency_prefix: Option<String>,
    helpline: Option<String>,
    whatsapp_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentPatch {
    pages_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct DispatchPatch {
    llm_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
