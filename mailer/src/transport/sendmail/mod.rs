//! Module dedicated to the sendmail transport.
//!
//! The raw message is piped into a sendmail-compatible command,
//! which reads recipients from headers.

pub mod config;

use tracing::info;

use super::{Command, Error, Result};

use self::config::SendmailConfig;

/// The sendmail transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SendmailTransport {
    command: Command,
}

impl SendmailTransport {
    pub fn new(config: &SendmailConfig) -> Self {
        Self {
            command: config.command().clone(),
        }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub async fn send(&self, raw: &[u8]) -> Result<()> {
        info!(cmd = self.command.as_str(), "sending message via sendmail");
        self.command
            .run_with(raw)
            .await
            .map_err(|err| Error::RunCommandError(err, self.command.to_string()))?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::transport::{Command, Error};

    use super::{config::SendmailConfig, SendmailTransport};

    fn sendmail(cmd: &str) -> SendmailTransport {
        SendmailTransport::new(&SendmailConfig {
            command: Some(Command::new(cmd)),
        })
    }

    #[test_log::test(tokio::test)]
    async fn send() {
        sendmail("cat > /dev/null").send(b"message").await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn send_with_non_zero_exit_status_code() {
        let cmd = "cat > /dev/null; echo unavailable >&2; exit 75";

        match sendmail(cmd).send(b"message").await.unwrap_err() {
            err @ Error::RunCommandError(..) => {
                assert_eq!(err.code(), 75);
                assert!(err.to_string().contains("exit 75"));
                assert!(!err.is_configuration_error());
            }
            err => panic!("unexpected error: {err:?}"),
        }
    }
}
