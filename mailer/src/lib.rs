//! Rust library to send emails through groups of failover accounts.
//!
//! The main purpose of this library is to decouple the code that
//! composes emails from the way they are handed over to a mail
//! subsystem. Accounts are grouped under named
//! [`AccountSetting`](crate::account::AccountSetting)s: when one
//! account of a setting cannot deliver a message, the next one is
//! tried until the message is sent or until every account failed.
//!
//! The library exposes:
//!
//! - an [`AccountRegistry`](crate::account::registry::AccountRegistry)
//!   which resolves setting names, with optional fallback to the
//!   `default` setting,
//! - a [`Transport`](crate::transport::Transport) factory for SMTP,
//!   sendmail and native transports,
//! - a [`Dispatcher`](crate::dispatch::Dispatcher) which implements
//!   the failover loop,
//! - a [`Mailer`](crate::mailer::Mailer) facade which maps template
//!   names to message builders.
//!
//! See examples in the /tests folder.

pub mod account;
pub mod dispatch;
pub mod error;
pub mod mailer;
pub mod message;
pub mod sender;
pub mod transport;

#[doc(inline)]
pub use self::{
    account::{
        config::MailerConfig, registry::AccountRegistry, select::SelectionLogic,
        AccountDescriptor, AccountSetting,
    },
    dispatch::{Clock, Dispatcher, SystemClock},
    error::{Error, Result},
    mailer::Mailer,
    message::{BuildMessage, Mailbox, MessagePayload},
    sender::{MailSender, Receipt, SendMessage},
    transport::{Transport, TransportConfig},
};
