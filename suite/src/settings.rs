use std::path::Path;

use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub target: TargetSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetSettings {
    /// Live service to test. Unset or empty means "spawn the emulation".
    #[serde(default)]
    pub base_url: Option<String>,
}

impl TargetSettings {
    pub fn live_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Static credential fixtures: one valid account plus an invalid password
/// and a malformed email to test refusals with.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSettings {
    pub email: String,
    pub password: Secret<String>,
    pub invalid_email: String,
    pub invalid_password: Secret<String>,
}

/// Load `configuration/base.yaml`, then apply `PETFRIENDS__*` environment
/// overrides (e.g. `PETFRIENDS__TARGET__BASE_URL`).
pub fn get_settings() -> Result<Settings, config::ConfigError> {
    let configuration_directory = Path::new(env!("CARGO_MANIFEST_DIR")).join("configuration");
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("PETFRIENDS")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
