// src/services/notifier.rs

//! Change notifications.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailEnv;
use crate::error::{AppError, Result};
use crate::models::ChangeReport;

/// A single summary message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Summarize the changed targets of a report.
    pub fn from_report(report: &ChangeReport) -> Self {
        let names: Vec<&str> = report.changed_targets.iter().map(String::as_str).collect();
        let subject = format!("New apartments found on {}", names.join(", "));

        let mut body = format!("{subject}\n");
        for outcome in report.changed_outcomes() {
            body.push_str(&format!("\n{} ({})\n", outcome.name, outcome.url));
            for item in &outcome.matches {
                body.push_str(&format!("  - {item}\n"));
            }
        }

        Self { subject, body }
    }
}

/// Delivers notifications to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Mail notifier over SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(env: &MailEnv) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&env.smtp_host)
            .map_err(AppError::mail)?
            .port(env.smtp_port)
            .credentials(Credentials::new(
                env.username.clone(),
                env.password.clone(),
            ))
            .build();

        let from = parse_mailbox(&env.username)?;
        let to = env
            .recipients
            .iter()
            .map(|r| parse_mailbox(r))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .body(notification.body.clone())
            .map_err(AppError::mail)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;
        self.transport.send(message).await.map_err(AppError::mail)?;
        log::info!("Notification mailed to {} recipient(s)", self.to.len());
        Ok(())
    }
}

/// Notifier that only logs, for dry runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        log::info!("[dry run] {}", notification.subject);
        for line in notification.body.lines().skip(1) {
            if !line.is_empty() {
                log::info!("[dry run] {}", line);
            }
        }
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::config(format!("invalid mail address '{address}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SkipReason, TargetOutcome, TargetState};

    fn report() -> ChangeReport {
        ChangeReport::from_outcomes(vec![
            TargetOutcome {
                name: "finfast".to_string(),
                url: "https://finfast.se/lediga-objekt".to_string(),
                state: TargetState::Changed { previous: None },
                matches: vec!["4 rum, Storgatan 1".to_string(), "4 rum, Ågatan 2".to_string()],
                canonical: "4 rum, Storgatan 1,4 rum, Ågatan 2".to_string(),
            },
            TargetOutcome {
                name: "lundbergs".to_string(),
                url: "https://www.lundbergsfastigheter.se".to_string(),
                state: TargetState::Skipped(SkipReason::NoMatches),
                matches: Vec::new(),
                canonical: String::new(),
            },
        ])
    }

    fn mail_env() -> MailEnv {
        MailEnv {
            username: "me@example.com".to_string(),
            password: "pw".to_string(),
            recipients: vec!["me@example.com".to_string(), "you@example.com".to_string()],
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
        }
    }

    #[test]
    fn test_notification_names_only_changed_targets() {
        let notification = Notification::from_report(&report());
        assert_eq!(notification.subject, "New apartments found on finfast");
        assert!(notification.body.contains("finfast (https://finfast.se/lediga-objekt)"));
        assert!(notification.body.contains("  - 4 rum, Storgatan 1\n"));
        assert!(notification.body.contains("  - 4 rum, Ågatan 2\n"));
        assert!(!notification.body.contains("lundbergs"));
    }

    #[tokio::test]
    async fn test_smtp_notifier_builds_message() {
        let notifier = SmtpNotifier::new(&mail_env()).unwrap();
        let message = notifier
            .build_message(&Notification::from_report(&report()))
            .unwrap();
        assert_eq!(message.envelope().to().len(), 2);
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: New apartments found on finfast"));
    }

    #[tokio::test]
    async fn test_smtp_notifier_rejects_bad_address() {
        let mut env = mail_env();
        env.recipients = vec!["not an address".to_string()];
        assert!(matches!(SmtpNotifier::new(&env), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notification = Notification::from_report(&report());
        assert!(LogNotifier.send(&notification).await.is_ok());
    }
}
