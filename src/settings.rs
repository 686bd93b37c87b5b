use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,

    #[serde(default = "default_window_ms")]
    pub rate_limit_window_ms: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: u32,

    #[serde(default = "default_min_submission_ms")]
    pub min_submission_time_ms: u64,

    #[serde(default = "default_window_ms")]
    pub max_submission_time_ms: u64,

    #[serde(default = "default_min_words")]
    pub min_words: usize,

    #[serde(default = "default_min_vowel_ratio")]
    pub min_vowel_ratio: f64,

    #[serde(default = "default_max_vowel_ratio")]
    pub max_vowel_ratio: f64,

    #[serde(default)]
    pub resend_api_key: String,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default)]
    pub resend_from_email: String,

    #[serde(default)]
    pub resend_to_email: String,

    #[serde(default = "default_subject_tag")]
    pub subject_tag: String,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Gate".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_window_ms() -> u64 {
    60 * 60 * 1000
}
fn default_max_requests() -> u32 {
    3
}
fn default_min_submission_ms() -> u64 {
    3000
}
fn default_min_words() -> usize {
    3
}
fn default_min_vowel_ratio() -> f64 {
    0.15
}
fn default_max_vowel_ratio() -> f64 {
    0.7
}
fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_subject_tag() -> String {
    "[Portfolio]".to_string()
}

const DEFAULT_FROM_EMAIL: &str = "onboarding@resend.dev";

/// Upper bound for every configured duration (one year).
pub const MAX_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name.to_string().to_lowercase())).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Unprefixed names used by existing deployments
        config.resend_api_key = or_env(config.resend_api_key, "RESEND_API_KEY");
        config.resend_from_email = or_env(config.resend_from_email, "RESEND_FROM_EMAIL");
        config.resend_to_email = or_env(config.resend_to_email, "RESEND_TO_EMAIL");

        if config.resend_from_email.trim().is_empty() {
            config.resend_from_email = DEFAULT_FROM_EMAIL.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.rate_limit_window_ms == 0 {
            errors.push("RATE_LIMIT_WINDOW_MS must be greater than zero");
        }
        if self.rate_limit_window_ms > MAX_DURATION_MS {
            errors.push("RATE_LIMIT_WINDOW_MS must not exceed one year");
        }
        if self.max_submission_time_ms > MAX_DURATION_MS {
            errors.push("MAX_SUBMISSION_TIME_MS must not exceed one year");
        }
        if self.max_requests_per_window == 0 {
            errors.push("MAX_REQUESTS_PER_WINDOW must be greater than zero");
        }
        if self.min_submission_time_ms >= self.max_submission_time_ms {
            errors.push("MIN_SUBMISSION_TIME_MS must be lower than MAX_SUBMISSION_TIME_MS");
        }
        if !(0.0..=1.0).contains(&self.min_vowel_ratio)
            || !(0.0..=1.0).contains(&self.max_vowel_ratio)
            || self.min_vowel_ratio >= self.max_vowel_ratio
        {
            errors.push("Vowel ratio bounds must satisfy 0 <= MIN < MAX <= 1");
        }
        if self.resend_to_email.trim().is_empty() {
            errors.push("RESEND_TO_EMAIL must be set");
        }
        if self.is_production() && self.resend_api_key.trim().is_empty() {
            errors.push("RESEND_API_KEY must be set in production");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn or_env(current: String, env_key: &str) -> String {
    if current.trim().is_empty() {
        env::var(env_key).unwrap_or_default()
    } else {
        current
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_forwarded_headers", &self.trust_forwarded_headers)
            .field("rate_limit_window_ms", &self.rate_limit_window_ms)
            .field("max_requests_per_window", &self.max_requests_per_window)
            .field("min_submission_time_ms", &self.min_submission_time_ms)
            .field("max_submission_time_ms", &self.max_submission_time_ms)
            .field("min_words", &self.min_words)
            .field("min_vowel_ratio", &self.min_vowel_ratio)
            .field("max_vowel_ratio", &self.max_vowel_ratio)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("resend_from_email", &self.resend_from_email)
            .field("resend_to_email", &self.resend_to_email)
            .field("subject_tag", &self.subject_tag)
            .finish()
    }
}
