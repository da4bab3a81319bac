use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    if config.data_directory.trim().is_empty() {
        return Err(invalid("dataDirectory must not be empty"));
    }
    if config.owner_id.trim().is_empty() {
        return Err(invalid("ownerId must not be empty"));
    }

    for (name, value) in [
        ("workerCount", config.worker_count as u64),
        ("maxUploadBytes", config.max_upload_bytes as u64),
        ("gemini.timeoutSecs", config.gemini.timeout_secs),
        ("speech.timeoutSecs", config.speech.timeout_secs),
        ("speech.maxInputChars", config.speech.max_input_chars as u64),
    ] {
        if value == 0 {
            return Err(invalid(format!("{} must be greater than 0", name)));
        }
    }

    validate_endpoint("gemini.endpoint", &config.gemini.endpoint)?;
    validate_endpoint("speech.endpoint", &config.speech.endpoint)?;

    if config.gemini.model.trim().is_empty() {
        return Err(invalid("gemini.model must not be empty"));
    }
    if config.speech.model.trim().is_empty() {
        return Err(invalid("speech.model must not be empty"));
    }

    Ok(())
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| invalid(format!("{} is not a valid URL: {}", name, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!(
            "{} must use http or https, got '{}'",
            name, other
        ))),
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
