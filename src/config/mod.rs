use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub content: ContentConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub about: String,
    pub url: String,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub x_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Page size applied when a listing request does not carry `per_page`.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    /// Upper bound on client-supplied `per_page` values.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            max_page_size: default_max_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    pub upload_dir: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
    #[serde(default = "default_reset_token_lifetime_minutes")]
    pub reset_token_lifetime_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_hours: default_token_lifetime_hours(),
            reset_token_lifetime_minutes: default_reset_token_lifetime_minutes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// When disabled, password-reset links are logged instead of emailed.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from: String,
    /// Base URL the reset link in outgoing mail points at.
    #[serde(default = "default_reset_url_base")]
    pub reset_url_base: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: default_mail_from(),
            reset_url_base: default_reset_url_base(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_posts_per_page() -> usize {
    3
}

fn default_max_page_size() -> usize {
    50
}

fn default_max_upload_mb() -> usize {
    10
}

fn default_token_lifetime_hours() -> i64 {
    1
}

fn default_reset_token_lifetime_minutes() -> i64 {
    30
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "no-reply@localhost".to_string()
}

fn default_reset_url_base() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Are you in a quillpost site directory?",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.posts_per_page == 0 {
            anyhow::bail!("content.posts_per_page must be greater than 0");
        }
        if self.content.posts_per_page > 100 {
            anyhow::bail!("content.posts_per_page must be 100 or less");
        }
        if self.content.max_page_size < self.content.posts_per_page {
            anyhow::bail!("content.max_page_size must be at least content.posts_per_page");
        }
        if self.media.max_upload_mb == 0 {
            anyhow::bail!("media.max_upload_mb must be greater than 0");
        }
        if self.auth.token_lifetime_hours <= 0 {
            anyhow::bail!("auth.token_lifetime_hours must be greater than 0");
        }
        if self.auth.reset_token_lifetime_minutes <= 0 {
            anyhow::bail!("auth.reset_token_lifetime_minutes must be greater than 0");
        }
        if self.mail.enabled && self.mail.smtp_host.is_empty() {
            anyhow::bail!("mail.smtp_host is required when mail is enabled");
        }
        Ok(())
    }
}
