//! Module dedicated to the native transport.
//!
//! The native transport delegates to the platform default mail
//! submission facility, which is the `sendmail` interface found in
//! the `PATH`. It cannot be configured.

use once_cell::sync::Lazy;
use tracing::info;

use super::{Command, Error, Result};

pub static NATIVE_COMMAND: Lazy<Command> = Lazy::new(|| Command::new("sendmail -t -i"));

/// The native transport.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NativeTransport;

impl NativeTransport {
    pub fn new() -> Self {
        Self
    }

    pub fn command(&self) -> &Command {
        &NATIVE_COMMAND
    }

    pub async fn send(&self, raw: &[u8]) -> Result<()> {
        info!("sending message via native mail facility");
        let cmd = self.command();
        cmd.run_with(raw)
            .await
            .map_err(|err| Error::RunCommandError(err, cmd.to_string()))?;
        Ok(())
    }
}
