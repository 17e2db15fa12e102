//! Module dedicated to messages.
//!
//! A [`MessagePayload`] is an immutable description of the message
//! to send. It is produced by a [`BuildMessage`] implementation,
//! possibly once per delivery attempt, then compiled into a raw MIME
//! message right before being handed over to a transport.

mod compile;

use std::{io, path::PathBuf, result};

use thiserror::Error;

#[doc(inline)]
pub use self::compile::{CompiledMessage, Envelope};

/// The global `Result` alias of the module.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the module.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build message: {0}")]
    BuildMessageError(String),
    #[error("cannot compile message without a sender")]
    CompileMessageMissingSenderError,
    #[error("cannot compile message without a recipient")]
    CompileMessageMissingRecipientError,
    #[error("cannot read attachment at {1}")]
    ReadAttachmentError(#[source] io::Error, PathBuf),
    #[error("cannot get file name of attachment at {0}")]
    GetAttachmentFileNameError(PathBuf),
    #[error("cannot write message")]
    WriteMessageError(#[source] io::Error),
}

/// The mailbox structure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mailbox {
    pub email: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email: impl ToString, name: Option<impl ToString>) -> Self {
        Self {
            email: email.to_string(),
            name: name.map(|name| name.to_string()),
        }
    }
}

impl From<&str> for Mailbox {
    fn from(email: &str) -> Self {
        Self::new(email, None::<String>)
    }
}

impl From<String> for Mailbox {
    fn from(email: String) -> Self {
        Self::new(email, None::<String>)
    }
}

impl From<(&str, &str)> for Mailbox {
    fn from((email, name): (&str, &str)) -> Self {
        Self::new(email, Some(name))
    }
}

/// The message payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MessagePayload {
    pub from: Vec<Mailbox>,
    pub reply_to: Vec<Mailbox>,
    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub bcc: Vec<Mailbox>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub attachments: Vec<PathBuf>,
}

impl MessagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.from.push(mailbox.into());
        self
    }

    pub fn reply_to(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.reply_to.push(mailbox.into());
        self
    }

    pub fn to(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.to.push(mailbox.into());
        self
    }

    pub fn cc(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.cc.push(mailbox.into());
        self
    }

    pub fn bcc(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.bcc.push(mailbox.into());
        self
    }

    pub fn subject(mut self, subject: impl ToString) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn html_body(mut self, body: impl ToString) -> Self {
        self.html_body = Some(body.to_string());
        self
    }

    pub fn text_body(mut self, body: impl ToString) -> Self {
        self.text_body = Some(body.to_string());
        self
    }

    pub fn attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Fill the sender and the reply-to with the given defaults when
    /// the message does not define them.
    ///
    /// The reply-to falls back to the default reply-to, then to the
    /// sender.
    pub fn with_defaults(mut self, from: &[Mailbox], reply_to: &[Mailbox]) -> Self {
        if self.from.is_empty() {
            self.from = from.to_vec();
        }

        if self.reply_to.is_empty() {
            self.reply_to = if reply_to.is_empty() {
                self.from.clone()
            } else {
                reply_to.to_vec()
            };
        }

        self
    }

    /// Return a copy of the message addressed to the given recipient
    /// only.
    ///
    /// Carbon copies are dropped, so recipients of a batch cannot
    /// see each other.
    pub fn for_recipient(&self, to: &Mailbox) -> Self {
        Self {
            to: vec![to.clone()],
            cc: Vec::new(),
            bcc: Vec::new(),
            ..self.clone()
        }
    }
}

/// The message builder collaborator.
///
/// Builders may be invoked once per delivery attempt, so they must
/// return the same payload every time they are called during one
/// dispatch.
pub trait BuildMessage: Send + Sync {
    fn build_message(&self) -> Result<MessagePayload>;
}

impl BuildMessage for MessagePayload {
    fn build_message(&self) -> Result<MessagePayload> {
        Ok(self.clone())
    }
}

impl<F> BuildMessage for F
where
    F: Fn() -> Result<MessagePayload> + Send + Sync,
{
    fn build_message(&self) -> Result<MessagePayload> {
        self()
    }
}
