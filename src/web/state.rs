use crate::services::mailer::Mailer;
use crate::web::security::RateLimiter;
use crate::{Config, Database};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub mailer: Mailer,
    pub upload_dir: PathBuf,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let mailer = Mailer::from_config(&config.mail)?;
        let upload_dir = PathBuf::from(&config.media.upload_dir);

        Ok(Self {
            config,
            db,
            mailer,
            upload_dir,
            rate_limiter: Arc::new(RateLimiter::default()),
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.config.media.max_upload_mb * 1024 * 1024
    }
}
