use crate::services::auth;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    match command {
        UserCommand::Add {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let p = rpassword::prompt_password("Password: ")?;
                    let p_confirm = rpassword::prompt_password("Confirm password: ")?;
                    if p != p_confirm {
                        anyhow::bail!("Passwords do not match");
                    }
                    p
                }
            };

            let user = auth::register_user(&db, &name, &email, &password)?;
            tracing::info!("User '{}' created", user.email);
        }
        UserCommand::List => {
            let conn = db.get()?;
            let mut stmt = conn.prepare("SELECT name, email, created_at FROM users")?;
            let users = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            println!("{:<20} {:<30} {:<20}", "NAME", "EMAIL", "CREATED");
            println!("{}", "-".repeat(70));
            for user in users {
                let (name, email, created_at) = user?;
                println!("{:<20} {:<30} {:<20}", name, email, created_at);
            }
        }
        UserCommand::Remove { email } => {
            let conn = db.get()?;
            let affected = conn.execute("DELETE FROM users WHERE email = ?", [&email])?;
            if affected > 0 {
                tracing::info!("User '{}' removed", email);
            } else {
                tracing::warn!("User '{}' not found", email);
            }
        }
        UserCommand::Passwd { email } => {
            let password = rpassword::prompt_password("New password: ")?;
            let password_confirm = rpassword::prompt_password("Confirm password: ")?;

            if password != password_confirm {
                anyhow::bail!("Passwords do not match");
            }

            let user = auth::get_user_by_email(&db, &email)?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", email))?;
            auth::update_password(&db, user.id, &password)?;
            tracing::info!("Password updated for '{}'", email);
        }
    }

    Ok(())
}
