//! Module dedicated to senders.
//!
//! A sender is the collaborator which actually hands a message over
//! to a [`Transport`]. The dispatcher only relies on the
//! [`SendMessage`] trait, so tests and alternative delivery
//! strategies can plug their own implementation.

use std::{result, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::{message, message::MessagePayload, transport, transport::Transport};

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed: the next account may succeed.
    #[error(transparent)]
    TransportError(#[from] transport::Error),
    /// The message itself is invalid: no account can succeed.
    #[error(transparent)]
    MessageError(#[from] message::Error),
}

/// The delivery receipt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Receipt {
    /// The number of accepted recipients.
    pub recipients: usize,
}

impl Receipt {
    pub fn new(recipients: usize) -> Self {
        Self { recipients }
    }
}

#[async_trait]
pub trait SendMessage: Send + Sync {
    /// Send the given message using the given transport.
    async fn send_message(&self, transport: &Transport, msg: &MessagePayload) -> Result<Receipt>;

    /// Send one copy of the given message to each of its `to`
    /// recipients.
    ///
    /// The first failure interrupts the batch.
    async fn send_batch(&self, transport: &Transport, msg: &MessagePayload) -> Result<Receipt> {
        let mut receipt = Receipt::default();

        for to in &msg.to {
            debug!(to = to.email, "sending batch message");
            let msg = msg.for_recipient(to);
            receipt.recipients += self.send_message(transport, &msg).await?.recipients;
        }

        Ok(receipt)
    }
}

#[async_trait]
impl<T: SendMessage + ?Sized> SendMessage for Arc<T> {
    async fn send_message(&self, transport: &Transport, msg: &MessagePayload) -> Result<Receipt> {
        self.as_ref().send_message(transport, msg).await
    }

    async fn send_batch(&self, transport: &Transport, msg: &MessagePayload) -> Result<Receipt> {
        self.as_ref().send_batch(transport, msg).await
    }
}

/// The default sender.
///
/// It compiles the message into a raw MIME message, then hands it
/// over to the transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct MailSender;

impl MailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SendMessage for MailSender {
    async fn send_message(&self, transport: &Transport, msg: &MessagePayload) -> Result<Receipt> {
        info!(transport = transport.kind().name(), "sending message");

        let msg = msg.compile(transport.keeps_bcc_header()).await?;
        transport.send(&msg).await?;

        Ok(Receipt::new(msg.envelope.rcpt_to.len()))
    }
}
