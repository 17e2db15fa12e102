//! Module dedicated to the SMTP transport.
//!
//! The SMTP client is only connected when a message is sent, then
//! dropped once the message has been accepted.

pub mod config;

#[cfg(feature = "smtp")]
pub use self::client::{reply_code, SmtpTransport};

#[cfg(feature = "smtp")]
mod client {
    use std::fmt;

    use mail_send::{
        smtp::message::{Address as SmtpAddress, Message as SmtpMessage},
        Credentials, SmtpClientBuilder,
    };
    use tracing::{debug, info};

    use crate::{
        message::Envelope,
        transport::{Error, Result},
    };

    use super::config::{SmtpConfig, SmtpEncryptionKind};

    /// The SMTP transport.
    pub struct SmtpTransport {
        hostname: String,
        port: u16,
        encryption: Option<SmtpEncryptionKind>,
        client_builder: SmtpClientBuilder<String>,
    }

    impl SmtpTransport {
        /// Bind a new SMTP transport to the given configuration.
        ///
        /// Fails if the host name is missing, or if a login is
        /// given without password.
        pub fn new(config: &SmtpConfig) -> Result<Self> {
            let hostname = config
                .hostname
                .as_deref()
                .map(str::trim)
                .filter(|hostname| !hostname.is_empty())
                .ok_or(Error::MissingSmtpHostnameError)?
                .to_owned();
            let port = config.port();

            let mut client_builder = SmtpClientBuilder::new(hostname.clone(), port)
                .implicit_tls(!config.is_start_tls_encryption_enabled());

            if let Some((login, passwd)) = config.credentials()? {
                client_builder = client_builder
                    .credentials(Credentials::new(login.to_owned(), passwd.to_owned()));
            }

            if let Some(timeout) = config.timeout() {
                client_builder = client_builder.timeout(timeout);
            }

            Ok(Self {
                hostname,
                port,
                encryption: config.encryption,
                client_builder,
            })
        }

        pub fn hostname(&self) -> &str {
            &self.hostname
        }

        pub fn port(&self) -> u16 {
            self.port
        }

        pub fn encryption(&self) -> Option<SmtpEncryptionKind> {
            self.encryption
        }

        /// Connect to the SMTP server, then send the given raw
        /// message to the envelope recipients.
        pub async fn send(&self, envelope: &Envelope, raw: &[u8]) -> Result<()> {
            info!(host = self.hostname, port = self.port, "sending message via smtp");

            let msg = SmtpMessage {
                mail_from: envelope.mail_from.clone().into(),
                rcpt_to: envelope
                    .rcpt_to
                    .iter()
                    .map(|email| SmtpAddress {
                        email: email.clone().into(),
                        ..Default::default()
                    })
                    .collect(),
                body: raw.into(),
            };

            match self.encryption {
                Some(SmtpEncryptionKind::Tls) | Some(SmtpEncryptionKind::StartTls) => {
                    debug!("connecting to smtp server using tls");
                    self.client_builder
                        .connect()
                        .await
                        .map_err(|err| self.connect_error(err))?
                        .send(msg)
                        .await
                        .map_err(|err| self.send_error(err))
                }
                Some(SmtpEncryptionKind::None) | None => {
                    debug!("connecting to smtp server using tcp");
                    self.client_builder
                        .connect_plain()
                        .await
                        .map_err(|err| self.connect_error(err))?
                        .send(msg)
                        .await
                        .map_err(|err| self.send_error(err))
                }
            }
        }

        fn connect_error(&self, err: mail_send::Error) -> Error {
            Error::ConnectSmtpError(err, self.hostname.clone(), self.port)
        }

        fn send_error(&self, err: mail_send::Error) -> Error {
            Error::SendSmtpMessageError(err, self.hostname.clone(), self.port)
        }
    }

    impl fmt::Debug for SmtpTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("SmtpTransport")
                .field("hostname", &self.hostname)
                .field("port", &self.port)
                .field("encryption", &self.encryption)
                .finish_non_exhaustive()
        }
    }

    /// Extract the SMTP reply code from the given error, if any.
    pub fn reply_code(err: &mail_send::Error) -> i32 {
        match err {
            mail_send::Error::UnexpectedReply(reply)
            | mail_send::Error::AuthenticationFailed(reply) => reply.code as i32,
            _ => 0,
        }
    }
}
