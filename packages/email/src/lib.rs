#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Delivery of the competitive analysis email.
//!
//! [`compose`] renders a [`RenderedEmail`] from a completed analysis, and
//! an [`EmailSender`] delivers it. Only the logging [`MockEmailSender`]
//! and the refusing [`DisabledEmailSender`] ship here; a real provider
//! plugs in behind the same trait.

pub mod render;

use async_trait::async_trait;

pub use render::{EmailContext, escape_html, render_html, render_plaintext, render_subject};

/// Characters of the plain-text body shown in mock delivery logs.
pub const LOG_PREVIEW_CHARS: usize = 500;

/// Errors that can occur while composing or sending an email.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Delivery is switched off.
    #[error("Email delivery is disabled")]
    Disabled,

    /// The email could not be built.
    #[error("Email render error: {message}")]
    Render {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider rejected the message.
    #[error("Email delivery failed: {message}")]
    Delivery {
        /// Description of what went wrong.
        message: String,
    },
}

/// A fully rendered message ready to hand to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// HTML body.
    pub html: String,
}

/// Renders the analysis email for `to`.
///
/// # Errors
///
/// * [`EmailError::Render`] if either address is not an email address
pub fn compose(from: &str, to: &str, ctx: &EmailContext<'_>) -> Result<RenderedEmail, EmailError> {
    for (role, address) in [("sender", from), ("recipient", to)] {
        if !looks_like_address(address) {
            return Err(EmailError::Render {
                message: format!("invalid {role} address: {address:?}"),
            });
        }
    }

    Ok(RenderedEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: render_subject(ctx),
        text: render_plaintext(ctx),
        html: render_html(ctx),
    })
}

fn looks_like_address(address: &str) -> bool {
    address
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

/// Trait that all email providers implement.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Returns a unique identifier for this sender (e.g. `"mock"`).
    fn id(&self) -> &str;

    /// Delivers `email`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the message was not accepted.
    async fn send(&self, email: &RenderedEmail) -> Result<(), EmailError>;
}

/// Sender that only logs what it would have sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockEmailSender;

#[async_trait]
impl EmailSender for MockEmailSender {
    fn id(&self) -> &str {
        "mock"
    }

    async fn send(&self, email: &RenderedEmail) -> Result<(), EmailError> {
        let preview: String = email.text.chars().take(LOG_PREVIEW_CHARS).collect();
        log::info!(
            "send: [mock] to={} from={} subject={:?}",
            email.to,
            email.from,
            email.subject
        );
        log::info!("send: [mock] text preview:\n{preview}");
        log::debug!("send: [mock] html body is {} bytes", email.html.len());
        Ok(())
    }
}

/// Sender used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    fn id(&self) -> &str {
        "disabled"
    }

    async fn send(&self, email: &RenderedEmail) -> Result<(), EmailError> {
        log::warn!("send: delivery disabled, dropping email to {}", email.to);
        Err(EmailError::Disabled)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::results_with;

    fn ctx(results: &compete_intel_demo_models::AnalysisResults) -> EmailContext<'_> {
        EmailContext {
            business_name: "Café Central",
            city: "Curitiba",
            state: Some("PR"),
            category: "Cafeteria",
            results,
        }
    }

    #[test]
    fn compose_fills_every_part() {
        let results = results_with(3, 2);
        let email = compose("noreply@competeintel.com.br", "dono@cafe.com.br", &ctx(&results))
            .unwrap();

        assert_eq!(email.to, "dono@cafe.com.br");
        assert_eq!(email.subject, "Competitive Analysis - Cafeteria in Curitiba/PR");
        assert!(email.text.contains("Hello, Café Central!"));
        assert!(email.html.contains("Café Central"));
    }

    #[test]
    fn compose_rejects_malformed_addresses() {
        let results = results_with(0, 0);
        for bad in ["", "no-at-sign", "@example.com", "user@localhost"] {
            let err = compose("noreply@competeintel.com.br", bad, &ctx(&results)).unwrap_err();
            assert!(matches!(err, EmailError::Render { .. }), "{bad}");
        }
        assert!(compose("nobody", "a@b.com", &ctx(&results)).is_err());
    }

    #[tokio::test]
    async fn mock_sender_accepts_and_disabled_refuses() {
        let results = results_with(1, 1);
        let email = compose("noreply@competeintel.com.br", "a@b.com", &ctx(&results)).unwrap();

        assert!(MockEmailSender.send(&email).await.is_ok());
        assert!(matches!(
            DisabledEmailSender.send(&email).await,
            Err(EmailError::Disabled)
        ));
    }
}
