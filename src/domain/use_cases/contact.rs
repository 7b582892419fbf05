use tracing::{info, warn};
use validator::Validate;

use crate::entities::contact_me::{ContactForm, ContactResponse, OutgoingMail};
use crate::errors::AppError;
use crate::repositories::mail::{MailRelay, RelayError};

pub struct ContactHandler<M>
where
    M: MailRelay,
{
    pub relay: Option<M>,
    pub owner_email: String,
}

impl<M> ContactHandler<M>
where
    M: MailRelay,
{
    pub fn new(relay: Option<M>, owner_email: String) -> Self {
        ContactHandler { relay, owner_email }
    }

    /// Relays a contact message to the site owner.
    ///
    /// Without a usable relay the sender gets a `mailto:` link instead.
    pub async fn submit(&self, form: ContactForm) -> Result<ContactResponse, AppError> {
        form.validate()?;

        let Some(relay) = &self.relay else {
            info!("Mail relay not configured, using mailto fallback");
            return Ok(ContactResponse::fallback(
                "Email service not configured. Opening email client...",
                form.mailto_link(&self.owner_email),
            ));
        };

        let mail = OutgoingMail {
            to: self.owner_email.clone(),
            reply_to: form.email.clone(),
            subject: form.mail_subject(),
            text: form.mail_body(),
        };

        match relay.deliver(&mail).await {
            Ok(()) => {
                info!(subject = %mail.subject, "Contact form submitted");
                Ok(ContactResponse::sent())
            }
            Err(RelayError::Authentication(e)) => {
                warn!("Mail relay authentication failed, falling back to mailto: {}", e);
                Ok(ContactResponse::fallback(
                    "Email service unavailable. Opening email client...",
                    form.mailto_link(&self.owner_email),
                ))
            }
            Err(e) => {
                tracing::error!("Failed to relay contact mail: {}", e);
                Err(AppError::InternalError(
                    "Failed to send email. Please try again or contact directly.".into(),
                ))
            }
        }
    }
}
