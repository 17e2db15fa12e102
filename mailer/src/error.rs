//! Module dedicated to the global error of the library.
//!
//! Errors are split between configuration problems, which are never
//! retried, and delivery problems, which are surfaced only once
//! every account of a setting failed.

use std::result;

use thiserror::Error;

use crate::{message, transport};

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot locate account setting {0}")]
    LocateAccountSettingError(String),
    #[error("cannot send message: template {0} is not defined")]
    UndefinedTemplateError(String),
    #[error("cannot build message")]
    BuildMessageError(#[source] message::Error),
    #[error("cannot compile message")]
    CompileMessageError(#[source] message::Error),
    #[error("cannot send message using account setting {setting}: all {attempts} configured accounts failed")]
    DeliveryExhaustedError {
        setting: String,
        attempts: usize,
        #[source]
        source: transport::Error,
    },
}

impl Error {
    /// Return `true` if the error comes from the configuration
    /// rather than from a delivery attempt.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::LocateAccountSettingError(_))
    }
}
