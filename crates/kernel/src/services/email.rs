//! Email delivery service using lettre/SMTP.
//!
//! Notification mail for contact and sample submissions. Configured only
//! when SMTP_HOST is set; delivery failures are logged by callers and never
//! fail the originating request.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::models::{ContactSubmission, SampleRequest};

/// Email delivery service.
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    site_url: String,
}

impl EmailService {
    /// Create a new email service.
    ///
    /// `encryption` controls the SMTP transport mode:
    /// - `"starttls"` (default): Opportunistic STARTTLS on port 587
    /// - `"tls"`: Implicit TLS (SMTPS) on port 465
    /// - `"none"`: Unencrypted (for local dev only)
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        smtp_username: Option<&str>,
        smtp_password: Option<&str>,
        encryption: &str,
        from_email: String,
        site_url: String,
    ) -> Result<Self> {
        let mut builder = match encryption {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .context("failed to create SMTP relay transport")?
                .port(smtp_port),
            "none" => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host).port(smtp_port)
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .context("failed to create SMTP STARTTLS transport")?
                .port(smtp_port),
        };

        if let (Some(user), Some(pass)) = (smtp_username, smtp_password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        let transport = builder.build();

        Ok(Self {
            transport,
            from_email,
            site_url,
        })
    }

    /// Send a plain-text email.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .context("invalid from email address")?,
            )
            .to(to.parse().context("invalid recipient email address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("failed to build email message")?;

        self.transport
            .send(email)
            .await
            .context("failed to send email")?;

        Ok(())
    }

    /// Notify staff about a new contact submission.
    pub async fn send_contact_notification(
        &self,
        to: &str,
        submission: &ContactSubmission,
    ) -> Result<()> {
        let subject = format!("New contact message: {}", submission.subject);
        let body = format!(
            "New message from the contact form.\n\n\
             From: {} {} <{}>\n\
             Company: {}\n\
             Phone: {}\n\
             Subject: {}\n\n\
             {}\n\n\
             Back office: {}/admin/contacts",
            submission.first_name,
            submission.last_name,
            submission.email,
            submission.company.as_deref().unwrap_or("-"),
            submission.phone.as_deref().unwrap_or("-"),
            submission.subject,
            submission.message,
            self.site_url,
        );

        self.send(to, &subject, &body).await
    }

    /// Notify staff about a new sample request.
    pub async fn send_sample_notification(
        &self,
        to: &str,
        request: &SampleRequest,
        product_name: &str,
    ) -> Result<()> {
        let subject = format!("New sample request: {product_name}");
        let body = format!(
            "A sample of \"{product_name}\" was requested.\n\n\
             From: {} {} <{}>\n\
             Company: {}\n\
             Phone: {}\n\
             Message: {}\n\n\
             Back office: {}/admin/samples",
            request.first_name,
            request.last_name,
            request.email,
            request.company.as_deref().unwrap_or("-"),
            request.phone.as_deref().unwrap_or("-"),
            request.message.as_deref().unwrap_or("-"),
            self.site_url,
        );

        self.send(to, &subject, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_service_construction_is_lazy() {
        // No DNS or connection happens at build time.
        let result = EmailService::new(
            "nonexistent.invalid",
            587,
            None,
            None,
            "starttls",
            "noreply@example.com".to_string(),
            "http://localhost:3000".to_string(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn email_service_supports_tls_mode() {
        let result = EmailService::new(
            "nonexistent.invalid",
            465,
            None,
            None,
            "tls",
            "noreply@example.com".to_string(),
            "http://localhost:3000".to_string(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn email_service_supports_none_mode() {
        let result = EmailService::new(
            "localhost",
            25,
            None,
            None,
            "none",
            "noreply@example.com".to_string(),
            "http://localhost:3000".to_string(),
        );
        assert!(result.is_ok());
    }
}
