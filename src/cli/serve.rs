use crate::services::{auth, password_reset};
use crate::{web, Config, Database};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

pub async fn run(config_path: &Path, host: &str, port: u16) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;

    db.migrate()?;

    let cleanup_db = db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match auth::cleanup_expired_sessions(&cleanup_db) {
                Ok(n) if n > 0 => tracing::info!("Removed {} expired session(s)", n),
                Ok(_) => {}
                Err(e) => tracing::error!("Session cleanup failed: {}", e),
            }
            match password_reset::cleanup_expired(&cleanup_db) {
                Ok(n) if n > 0 => tracing::info!("Removed {} stale reset token(s)", n),
                Ok(_) => {}
                Err(e) => tracing::error!("Reset-token cleanup failed: {}", e),
            }
        }
    });

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server at http://{}", addr);

    web::serve(config, db, &addr).await?;

    Ok(())
}
