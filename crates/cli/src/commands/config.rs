use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use aria_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One rendered setting: dotted key, display value, env vars checked in order.
struct Setting {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];
    for setting in settings(&config) {
        let source = field_source(
            setting.key,
            setting.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(setting.key, &setting.value, source));
    }

    lines.join("\n")
}

fn settings(config: &AppConfig) -> Vec<Setting> {
    let password = if config.erp.password.expose_secret().is_empty() {
        "<unset>".to_string()
    } else {
        "<redacted>".to_string()
    };
    let api_key = match &config.llm.api_key {
        Some(key) => redact_token(key.expose_secret()),
        None => "<unset>".to_string(),
    };

    vec![
        Setting {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["ARIA_DATABASE_URL"],
        },
        Setting {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["ARIA_DATABASE_MAX_CONNECTIONS"],
        },
        Setting {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["ARIA_DATABASE_TIMEOUT_SECS"],
        },
        Setting { key: "erp.url", value: config.erp.url.clone(), env_keys: &["ARIA_ERP_URL", "ODOO_URL"] },
        Setting {
            key: "erp.database",
            value: config.erp.database.clone(),
            env_keys: &["ARIA_ERP_DATABASE", "ODOO_DB"],
        },
        Setting {
            key: "erp.username",
            value: config.erp.username.clone(),
            env_keys: &["ARIA_ERP_USERNAME", "ODOO_USER"],
        },
        Setting {
            key: "erp.password",
            value: password,
            env_keys: &["ARIA_ERP_PASSWORD", "ODOO_PASSWORD"],
        },
        Setting {
            key: "erp.timeout_secs",
            value: config.erp.timeout_secs.to_string(),
            env_keys: &["ARIA_ERP_TIMEOUT_SECS"],
        },
        Setting {
            key: "llm.provider",
            value: config.llm.provider.as_str().to_string(),
            env_keys: &["ARIA_LLM_PROVIDER"],
        },
        Setting {
            key: "llm.base_url",
            value: config.llm.effective_base_url().to_string(),
            env_keys: &["ARIA_LLM_BASE_URL"],
        },
        Setting { key: "llm.model", value: config.llm.model.clone(), env_keys: &["ARIA_LLM_MODEL"] },
        Setting {
            key: "llm.api_key",
            value: api_key,
            env_keys: &["ARIA_LLM_API_KEY", "GROQ_API_KEY"],
        },
        Setting {
            key: "llm.temperature",
            value: config.llm.temperature.to_string(),
            env_keys: &["ARIA_LLM_TEMPERATURE"],
        },
        Setting {
            key: "llm.max_tokens",
            value: config.llm.max_tokens.to_string(),
            env_keys: &["ARIA_LLM_MAX_TOKENS"],
        },
        Setting {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_keys: &["ARIA_LLM_TIMEOUT_SECS"],
        },
        Setting {
            key: "llm.max_retries",
            value: config.llm.max_retries.to_string(),
            env_keys: &["ARIA_LLM_MAX_RETRIES"],
        },
        Setting {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["ARIA_SERVER_BIND_ADDRESS"],
        },
        Setting {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["ARIA_SERVER_PORT", "PORT"],
        },
        Setting {
            key: "server.cors_allowed_origins",
            value: config.server.cors_allowed_origins.join(","),
            env_keys: &["ARIA_SERVER_CORS_ALLOWED_ORIGINS"],
        },
        Setting {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["ARIA_LOGGING_LEVEL", "ARIA_LOG_LEVEL"],
        },
        Setting {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            env_keys: &["ARIA_LOGGING_FORMAT", "ARIA_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("aria.toml"), PathBuf::from("config/aria.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a recognisable key prefix such as `gsk_` or `sk-`.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.find(['-', '_']) {
        Some(index) if index <= 4 => format!("{}***", &trimmed[..=index]),
        _ => "<redacted>".to_string(),
    }
}
