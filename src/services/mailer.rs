use crate::config::MailConfig;
use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Outgoing-mail handle. With mail disabled in config there is no transport
/// and reset links are logged instead, which is what you want in development
/// and in tests.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    reset_url_base: String,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let transport = if config.enabled {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                    .port(config.smtp_port);
            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
            Some(builder.build())
        } else {
            None
        };

        Ok(Self {
            transport,
            from: config.from.clone(),
            reset_url_base: config.reset_url_base.clone(),
        })
    }

    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<()> {
        let link = format!(
            "{}/reset-password?token={}",
            self.reset_url_base.trim_end_matches('/'),
            token
        );

        let Some(transport) = &self.transport else {
            tracing::info!(%to, %link, "mail disabled; password reset link not sent");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Password reset request")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "A password reset was requested for your account.\n\n\
                 Reset link: {}\n\n\
                 If you did not request this, you can ignore this message.",
                link
            ))?;

        transport.send(message).await?;
        tracing::info!(%to, "password reset mail sent");
        Ok(())
    }
}
