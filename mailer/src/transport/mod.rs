//! Module dedicated to transports.
//!
//! A [`Transport`] is a handle bound to one account descriptor. It
//! is built without any I/O: connections are only established when
//! a message is actually sent, so trying the next account of a
//! setting stays cheap.

pub mod native;
pub mod sendmail;
pub mod smtp;

use std::result;

use thiserror::Error;
use tracing::debug;

use crate::{
    account::{into_mailboxes, AccountDescriptor},
    message::{CompiledMessage, Mailbox},
};

#[doc(inline)]
pub use self::{
    native::NativeTransport,
    sendmail::{config::SendmailConfig, SendmailTransport},
    smtp::config::{SmtpConfig, SmtpEncryptionKind},
};
#[cfg(feature = "smtp")]
#[doc(inline)]
pub use self::smtp::SmtpTransport;
#[doc(inline)]
pub use process::Command;

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the module.
///
/// Both misconfigured accounts and failed deliveries end up here:
/// they are per-account failures, the dispatcher tries the next
/// account of the setting when it meets one of them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build smtp transport: hostname is missing")]
    MissingSmtpHostnameError,
    #[error("cannot build smtp transport: password is missing for user {0}")]
    MissingSmtpPasswordError(String),
    #[error("cannot build smtp transport: smtp support is not enabled")]
    SmtpNotEnabledError,
    #[cfg(feature = "smtp")]
    #[error("cannot connect to smtp server {1}:{2}")]
    ConnectSmtpError(#[source] mail_send::Error, String, u16),
    #[cfg(feature = "smtp")]
    #[error("cannot send message to smtp server {1}:{2}")]
    SendSmtpMessageError(#[source] mail_send::Error, String, u16),

    #[error("cannot run command {1}")]
    RunCommandError(#[source] process::Error, String),

    #[error("cannot send message: account defines no sender")]
    MissingSenderError,
}

impl Error {
    /// Return the numeric code associated to the error.
    ///
    /// The code is the SMTP reply code for SMTP errors, the exit
    /// status code for command errors, and 0 otherwise.
    pub fn code(&self) -> i32 {
        match self {
            #[cfg(feature = "smtp")]
            Self::ConnectSmtpError(err, ..) | Self::SendSmtpMessageError(err, ..) => {
                smtp::reply_code(err)
            }
            Self::RunCommandError(process::Error::GetExitStatusCodeNonZeroError(_, code, _), _) => {
                *code
            }
            _ => 0,
        }
    }

    /// Return `true` if the error comes from the account descriptor
    /// rather than from a delivery attempt.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingSmtpHostnameError
                | Self::MissingSmtpPasswordError(_)
                | Self::SmtpNotEnabledError
                | Self::MissingSenderError
        )
    }
}

/// The transport configuration of an account descriptor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "transport", rename_all = "lowercase")
)]
pub enum TransportConfig {
    /// The platform default mail submission facility.
    #[default]
    #[cfg_attr(feature = "derive", serde(alias = "mail"))]
    Native,

    /// The sendmail-compatible command configuration.
    Sendmail(SendmailConfig),

    /// The SMTP server configuration.
    Smtp(SmtpConfig),
}

impl From<SendmailConfig> for TransportConfig {
    fn from(config: SendmailConfig) -> Self {
        Self::Sendmail(config)
    }
}

impl From<SmtpConfig> for TransportConfig {
    fn from(config: SmtpConfig) -> Self {
        Self::Smtp(config)
    }
}

/// The kind of transport, bound to its parameters.
#[derive(Debug)]
pub enum TransportKind {
    Native(NativeTransport),
    Sendmail(SendmailTransport),
    #[cfg(feature = "smtp")]
    Smtp(SmtpTransport),
}

/// The transport handle.
#[derive(Debug)]
pub struct Transport {
    kind: TransportKind,
    from: Vec<Mailbox>,
    reply_to: Vec<Mailbox>,
}

impl Transport {
    /// Build a transport bound to the given account descriptor.
    ///
    /// Fails if the descriptor misses fields required by its
    /// transport kind. No connection is established here.
    pub fn build(account: &AccountDescriptor) -> Result<Self> {
        let kind = match &account.transport {
            TransportConfig::Native => TransportKind::Native(NativeTransport::new()),
            TransportConfig::Sendmail(config) => {
                TransportKind::Sendmail(SendmailTransport::new(config))
            }
            #[cfg(feature = "smtp")]
            TransportConfig::Smtp(config) => TransportKind::Smtp(SmtpTransport::new(config)?),
            #[cfg(not(feature = "smtp"))]
            TransportConfig::Smtp(_) => return Err(Error::SmtpNotEnabledError),
        };

        debug!(transport = kind.name(), "transport built");

        Ok(Self {
            kind,
            from: account.from.as_ref().map(into_mailboxes).unwrap_or_default(),
            reply_to: account
                .reply_to
                .as_ref()
                .map(into_mailboxes)
                .unwrap_or_default(),
        })
    }

    pub fn kind(&self) -> &TransportKind {
        &self.kind
    }

    /// The default sender of the account the transport is bound to.
    pub fn from(&self) -> &[Mailbox] {
        &self.from
    }

    /// The default reply-to of the account the transport is bound
    /// to.
    pub fn reply_to(&self) -> &[Mailbox] {
        &self.reply_to
    }

    /// Return `true` if the raw message handed to the transport
    /// should keep its `Bcc` header.
    ///
    /// Command-based transports read recipients from headers and
    /// strip the `Bcc` one themselves, while SMTP takes recipients
    /// from the envelope.
    pub fn keeps_bcc_header(&self) -> bool {
        match self.kind {
            TransportKind::Native(_) | TransportKind::Sendmail(_) => true,
            #[cfg(feature = "smtp")]
            TransportKind::Smtp(_) => false,
        }
    }

    /// Send the given compiled message.
    pub async fn send(&self, msg: &CompiledMessage) -> Result<()> {
        match &self.kind {
            TransportKind::Native(native) => native.send(&msg.raw).await,
            TransportKind::Sendmail(sendmail) => sendmail.send(&msg.raw).await,
            #[cfg(feature = "smtp")]
            TransportKind::Smtp(smtp) => smtp.send(&msg.envelope, &msg.raw).await,
        }
    }
}

impl TransportKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Native(_) => "native",
            Self::Sendmail(_) => "sendmail",
            #[cfg(feature = "smtp")]
            Self::Smtp(_) => "smtp",
        }
    }
}
