//! Module dedicated to the mailer configuration.
//!
//! The configuration is loaded once by the caller, then injected
//! into the [`AccountRegistry`](super::registry::AccountRegistry).

use std::collections::HashMap;

use super::{AccountSetting, DEFAULT_SETTING};

/// The mailer configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct MailerConfig {
    /// Should fall back to the `default` setting when the requested
    /// one cannot be found.
    ///
    /// Defaults to `true`.
    #[cfg_attr(feature = "derive", serde(default = "default_fallback"))]
    pub default_fallback: bool,

    /// The account settings, indexed by name.
    #[cfg_attr(feature = "derive", serde(flatten))]
    pub settings: HashMap<String, AccountSetting>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            default_fallback: default_fallback(),
            settings: Default::default(),
        }
    }
}

impl MailerConfig {
    pub fn with_default_fallback(mut self, fallback: bool) -> Self {
        self.default_fallback = fallback;
        self
    }

    /// Add the given setting, indexed by its name.
    pub fn with_setting(mut self, setting: AccountSetting) -> Self {
        self.settings.insert(setting.name.clone(), setting);
        self
    }

    pub fn has_default_setting(&self) -> bool {
        self.settings
            .get(DEFAULT_SETTING)
            .is_some_and(|setting| !setting.is_empty())
    }
}

fn default_fallback() -> bool {
    true
}

#[cfg(all(test, feature = "derive"))]
mod tests {
    use crate::{
        account::select::SelectionLogic,
        transport::{sendmail::config::SendmailConfig, smtp::config::SmtpEncryptionKind},
        TransportConfig,
    };

    use super::MailerConfig;

    #[test]
    fn deserialize_settings() {
        let config: MailerConfig = toml::from_str(
            r#"
            [default]
            logic = "time-of-day"

            [[default.accounts]]
            transport = "smtp"
            hostname = "localhost"
            username = "fakeuser@localhost"
            password = "fakepw"
            port = 25
            encryption = false
            from = { "fakeuser@localhost" = "Default Mailer" }
            replyto = { "fakeuser@localhost" = "Default Mailer" }

            [[default.accounts]]
            transport = "sendmail"
            cmd = "/usr/sbin/sendmail -t -i"

            [[default.accounts]]
            transport = "mail"

            [marketing]
            logic = "random"

            [[marketing.accounts]]
            transport = "native"
            "#,
        )
        .unwrap();

        assert!(config.default_fallback);
        assert!(config.has_default_setting());

        let default = config.settings.get("default").unwrap();
        assert_eq!(default.logic, SelectionLogic::TimeOfDay);
        assert_eq!(default.accounts.len(), 3);

        match &default.accounts[0].transport {
            TransportConfig::Smtp(smtp) => {
                assert_eq!(smtp.hostname.as_deref(), Some("localhost"));
                assert_eq!(smtp.port(), 25);
                assert_eq!(smtp.encryption, Some(SmtpEncryptionKind::None));
                assert!(!smtp.is_encryption_enabled());
            }
            transport => panic!("unexpected transport: {transport:?}"),
        }

        let from = default.accounts[0].from.as_ref().unwrap();
        assert_eq!(from.get("fakeuser@localhost").unwrap(), "Default Mailer");
        assert!(default.accounts[0].reply_to.is_some());

        match &default.accounts[1].transport {
            TransportConfig::Sendmail(SendmailConfig { command }) => {
                assert_eq!(command.as_ref().unwrap().as_str(), "/usr/sbin/sendmail -t -i");
            }
            transport => panic!("unexpected transport: {transport:?}"),
        }

        assert_eq!(default.accounts[2].transport, TransportConfig::Native);

        // unknown logic falls back to the default one
        let marketing = config.settings.get("marketing").unwrap();
        assert_eq!(marketing.logic, SelectionLogic::Default);
    }

    #[test]
    fn deserialize_default_fallback() {
        let config: MailerConfig = toml::from_str("default-fallback = false").unwrap();
        assert!(!config.default_fallback);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn deserialize_unknown_transport() {
        let res = toml::from_str::<MailerConfig>(
            r#"
            [[default.accounts]]
            transport = "pigeon"
            "#,
        );

        assert!(res.is_err());
    }
}
