//! Module dedicated to the sendmail transport configuration.

use once_cell::sync::Lazy;
use process::Command;

pub static SENDMAIL_DEFAULT_COMMAND: Lazy<Command> =
    Lazy::new(|| Command::new("/usr/sbin/sendmail -t -i"));

/// The sendmail transport configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct SendmailConfig {
    /// The sendmail command override.
    ///
    /// The command receives the raw message on its standard input
    /// and is expected to read recipients from headers. Defaults to
    /// `/usr/sbin/sendmail -t -i`.
    #[cfg_attr(feature = "derive", serde(default, alias = "cmd"))]
    pub command: Option<Command>,
}

impl SendmailConfig {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&*SENDMAIL_DEFAULT_COMMAND)
    }
}
