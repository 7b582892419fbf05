use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::CONTACT_SUBJECT_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 5, max = 200, message = "Subject must be 5-200 characters"))]
    pub subject: String,

    #[validate(length(min = 10, max = 2000, message = "Message must be 10-2000 characters"))]
    pub message: String,
}

impl ContactForm {
    pub fn mail_subject(&self) -> String {
        format!("{}: {}", CONTACT_SUBJECT_PREFIX, self.subject)
    }

    pub fn mail_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\n\nMessage:\n{}",
            self.name, self.email, self.message
        )
    }

    /// Client-side fallback when no relay can deliver the message.
    pub fn mailto_link(&self, owner_email: &str) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            owner_email,
            urlencoding::encode(&self.mail_subject()),
            urlencoding::encode(&self.mail_body())
        )
    }
}

/// Message handed to the mail relay.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
    #[serde(default)]
    pub fallback: bool,
}

impl ContactResponse {
    pub fn sent() -> Self {
        ContactResponse {
            message: "Email sent successfully".to_string(),
            mailto: None,
            fallback: false,
        }
    }

    pub fn fallback(message: &str, mailto: String) -> Self {
        ContactResponse {
            message: message.to_string(),
            mailto: Some(mailto),
            fallback: true,
        }
    }
}
