use std::sync::Arc;

use async_trait::async_trait;
use derive_more::Display;

use crate::entities::contact_me::OutgoingMail;

#[derive(Debug, Display)]
pub enum RelayError {
    /// The relay refused our credentials; the caller may fall back to mailto.
    #[display("Mail relay rejected credentials: {_0}")]
    Authentication(String),

    #[display("Mail relay failed: {_0}")]
    Delivery(String),
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), RelayError>;
}

#[async_trait]
impl<T: MailRelay + ?Sized> MailRelay for Arc<T> {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), RelayError> {
        (**self).deliver(mail).await
    }
}
