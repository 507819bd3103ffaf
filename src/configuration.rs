use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_bool_from_anything;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::CustomField;
use crate::settings::ConstantSettings;
use crate::settings::ListSettings;
use crate::settings::SettingsProvider;
use crate::settings::SettingsRecord;

/// Global configuration, loaded from `configuration/*.yaml` and `APP_*` env
/// vars. See `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub mailchimp: MailchimpSettings,
    pub form: FormSettings,
}

impl Settings {
    /// The persisted settings record, written on activation and removed on
    /// deactivation
    pub fn settings_record(&self) -> SettingsRecord {
        SettingsRecord::new(self.application.settings_record.clone())
    }

    /// Where the request handler reads its credentials from
    pub fn settings_provider(&self) -> Arc<dyn SettingsProvider> {
        match self.mailchimp.source {
            SettingsSource::Constants => Arc::new(ConstantSettings::new(self.mailchimp.constants())),
            SettingsSource::Record => Arc::new(self.settings_record()),
        }
    }
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,

    /// Key for the anti-forgery token. Rotating it invalidates every form
    /// currently rendered.
    pub hmac_secret: Secret<String>,

    /// Verbose error detail for token and credential failures. Must be `false`
    /// in production, otherwise configuration state leaks to visitors.
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub debug: bool,

    pub settings_record: PathBuf,
}

/// Where credentials are resolved from at request time
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSource {
    /// Read `mailchimp.api_key`/`mailchimp.list_id` straight from config
    Constants,
    /// Read the record persisted on activation
    Record,
}

/// Mailing-list provider configuration. `api_key` and `list_id` play the role
/// of fixed constants: both must be present for activation to succeed.
#[derive(Deserialize, Clone)]
pub struct MailchimpSettings {
    pub api_key: Option<Secret<String>>,
    pub list_id: Option<String>,
    pub source: SettingsSource,

    /// Overrides the datacenter url derived from the API key (used by tests
    /// to point at a mock server)
    pub base_url: Option<String>,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl MailchimpSettings {
    pub fn constants(&self) -> ListSettings {
        ListSettings {
            api_key: self.api_key.clone(),
            list_id: self.list_id.clone(),
        }
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }
}

/// Everything the form renderer and the validators need to know about the
/// form
#[derive(Deserialize, Clone)]
pub struct FormSettings {
    pub template_file: PathBuf,
    pub form_id: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub nonce_lifetime_seconds: i64,

    #[serde(default)]
    pub labels: FormLabels,

    /// Extra fields, rendered before the email field and forwarded as merge
    /// variables
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Localised strings shown in the form
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FormLabels {
    pub email_placeholder: String,
    pub subscribe_button: String,
    pub try_again: String,
    pub success: String,
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            email_placeholder: "Email Address".to_string(),
            subscribe_button: "Subscribe".to_string(),
            try_again: "Try again".to_string(),
            success: "Success! Check your email for a confirmation link.".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("{e} is not a supported environment; use `local` or `production`")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// apply `APP_` env var overrides:
///
/// `APP_MAILCHIMP__API_KEY=abc-us7` -> `Settings.mailchimp.api_key`
///
/// Missing credentials are -not- an error here; that is decided by
/// `lifecycle::activate`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Foreign(Box::new(e)))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are always strings; `serde-aux` takes care of the numeric and boolean
            // fields
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
