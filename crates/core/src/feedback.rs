//! Feedback submissions (bug reports and feature ideas).
//!
//! A submission is delivered as one transactional email through a
//! [`FeedbackTransport`]. Delivery is attempted once; failures are returned to
//! the caller with their diagnostic detail and never affect generation state.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::FeedbackError;

/// Subject prefix of every feedback email.
pub const SUBJECT_PREFIX: &str = "SEO-ContentGenerator";

/// What a submission is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    BugReport,
    FeatureIdea,
}

impl FeedbackCategory {
    pub fn label(self) -> &'static str {
        match self {
            FeedbackCategory::BugReport => "Bug Report",
            FeedbackCategory::FeatureIdea => "Feature Idea",
        }
    }
}

/// A structured feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    pub category: FeedbackCategory,
    pub sender_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub message: String,
}

impl FeedbackSubmission {
    /// Creates a submission stamped with the current UTC time.
    pub fn new(category: FeedbackCategory, sender_email: Option<String>, message: impl Into<String>) -> Self {
        Self::at(category, sender_email, message, OffsetDateTime::now_utc())
    }

    pub fn at(
        category: FeedbackCategory,
        sender_email: Option<String>,
        message: impl Into<String>,
        submitted_at: OffsetDateTime,
    ) -> Self {
        let sender_email = sender_email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        Self { category, sender_email, submitted_at, message: message.into() }
    }

    pub fn subject(&self) -> String {
        format!("{} + {}", SUBJECT_PREFIX, self.category.label().to_uppercase())
    }

    /// Submission time as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        self.submitted_at.format(format).unwrap_or_default()
    }

    pub fn sender_label(&self) -> &str {
        self.sender_email.as_deref().unwrap_or("Anonymous User")
    }

    pub fn plain_body(&self) -> String {
        format!(
            "New {} submission\n\nType: {}\nSubmitted by: {}\nDate & Time: {}\n\n{}\n",
            self.category.label(),
            self.category.label().to_uppercase(),
            self.sender_label(),
            self.timestamp(),
            self.message
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            concat!(
                "<html>\n<body style=\"font-family: Arial, sans-serif; color: #333;\">\n",
                "<h2 style=\"color: #0056b3;\">New {label} Submission</h2>\n",
                "<p>You have received a new submission from the SEO Content Generator feedback form.</p>\n",
                "<hr style=\"border: 1px solid #ddd;\">\n",
                "<h3>Submission Details:</h3>\n",
                "<ul>\n<li><b>Type:</b> {kind}</li>\n<li><b>Submitted by:</b> {sender}</li>\n",
                "<li><b>Date &amp; Time:</b> {time}</li>\n</ul>\n",
                "<h3>Message Content:</h3>\n",
                "<p style=\"border-left: 4px solid #0056b3; padding-left: 10px; color: #444;\">{message}</p>\n",
                "<hr style=\"border: 1px solid #ddd;\">\n",
                "<p style=\"font-size: 12px; color: #777;\">This email was automatically generated by the SEO Content Generator.</p>\n",
                "</body>\n</html>\n"
            ),
            label = self.category.label(),
            kind = self.category.label().to_uppercase(),
            sender = escape_html(self.sender_label()),
            time = self.timestamp(),
            message = escape_html(&self.message),
        )
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Outbound delivery of feedback submissions.
pub trait FeedbackTransport: Send + Sync {
    fn send(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError>;
}

/// Mail relay account used for feedback delivery.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SmtpSettings {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub sender_email: String,
    pub receiver_email: String,
    #[serde(default)]
    pub app_password: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender_email", &self.sender_email)
            .field("receiver_email", &self.receiver_email)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "smtp")]
pub use smtp::{SmtpFeedbackTransport, build_message};

#[cfg(feature = "smtp")]
mod smtp {
    use lettre::message::{Mailbox, MultiPart};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{Message, SmtpTransport, Transport};

    use super::{FeedbackSubmission, FeedbackTransport, SmtpSettings};
    use crate::error::FeedbackError;

    /// Assembles the email for a submission.
    ///
    /// A valid sender address becomes the Reply-To header; an invalid or
    /// missing one is only shown in the body.
    pub fn build_message(settings: &SmtpSettings, submission: &FeedbackSubmission) -> Result<Message, FeedbackError> {
        let from: Mailbox = settings
            .sender_email
            .parse()
            .map_err(|e| FeedbackError::InvalidAddress(format!("{}: {}", settings.sender_email, e)))?;
        let to: Mailbox = settings
            .receiver_email
            .parse()
            .map_err(|e| FeedbackError::InvalidAddress(format!("{}: {}", settings.receiver_email, e)))?;

        let mut builder = Message::builder().from(from).to(to).subject(submission.subject());
        if let Some(reply_to) = submission.sender_email.as_deref().and_then(|e| e.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(submission.plain_body(), submission.html_body()))
            .map_err(|e| FeedbackError::Build(e.to_string()))
    }

    /// Delivers submissions over SMTP with STARTTLS and login credentials.
    #[derive(Debug, Clone)]
    pub struct SmtpFeedbackTransport {
        settings: SmtpSettings,
    }

    impl SmtpFeedbackTransport {
        pub fn new(settings: SmtpSettings) -> Self {
            Self { settings }
        }
    }

    impl FeedbackTransport for SmtpFeedbackTransport {
        fn send(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
            let message = build_message(&self.settings, submission)?;

            let transport = SmtpTransport::starttls_relay(&self.settings.server)
                .map_err(|e| FeedbackError::Transport(format!("starttls relay init failed: {}", e)))?
                .port(self.settings.port)
                .credentials(Credentials::new(
                    self.settings.sender_email.clone(),
                    self.settings.app_password.clone(),
                ))
                .build();

            transport
                .send(&message)
                .map_err(|e| FeedbackError::Transport(format!("{}:{}: {}", self.settings.server, self.settings.port, e)))?;

            tracing::info!(category = ?submission.category, "feedback sent");
            Ok(())
        }
    }
}
