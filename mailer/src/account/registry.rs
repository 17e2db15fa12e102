//! Module dedicated to the account registry.
//!
//! The registry is built once from an injected [`MailerConfig`],
//! then shared read-only across dispatch calls.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, warn};

use crate::{Error, Result};

use super::{config::MailerConfig, AccountSetting, DEFAULT_SETTING};

/// The account registry.
#[derive(Clone, Debug)]
pub struct AccountRegistry {
    settings: HashMap<String, Arc<AccountSetting>>,
    default_fallback: bool,
}

impl AccountRegistry {
    pub fn new(config: MailerConfig) -> Self {
        let settings = config
            .settings
            .into_iter()
            .map(|(name, mut setting)| {
                setting.name = name.clone();
                (name, Arc::new(setting))
            })
            .collect();

        Self {
            settings,
            default_fallback: config.default_fallback,
        }
    }

    pub fn is_default_fallback_enabled(&self) -> bool {
        self.default_fallback
    }

    /// Find the setting matching the given name.
    ///
    /// Empty settings are considered as missing.
    pub fn find(&self, name: &str) -> Option<&Arc<AccountSetting>> {
        self.settings.get(name).filter(|setting| !setting.is_empty())
    }

    /// Resolve the setting matching the given name.
    ///
    /// If the setting cannot be found and if the default fallback is
    /// enabled, the `default` setting is resolved instead.
    pub fn resolve(&self, name: &str) -> Result<Arc<AccountSetting>> {
        if let Some(setting) = self.find(name) {
            debug!(setting = name, "account setting found");
            return Ok(setting.clone());
        }

        if !self.default_fallback {
            return Err(Error::LocateAccountSettingError(name.to_owned()));
        }

        warn!(setting = name, "cannot find account setting, falling back to {DEFAULT_SETTING}");

        self.find(DEFAULT_SETTING)
            .cloned()
            .ok_or_else(|| Error::LocateAccountSettingError(DEFAULT_SETTING.to_owned()))
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new(MailerConfig::default())
    }
}

impl From<MailerConfig> for AccountRegistry {
    fn from(config: MailerConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        account::{config::MailerConfig, AccountDescriptor, AccountSetting},
        transport::TransportConfig,
        Error,
    };

    use super::AccountRegistry;

    fn assert_send_sync<T: Send + Sync>() {}

    fn config() -> MailerConfig {
        let native = AccountDescriptor::new(TransportConfig::Native);

        MailerConfig::default()
            .with_setting(AccountSetting::new("default", [native.clone()]))
            .with_setting(AccountSetting::new("marketing", [native.clone(), native]))
            .with_setting(AccountSetting::new("empty", Vec::new()))
    }

    #[test]
    fn resolve_existing_setting() {
        let registry = AccountRegistry::new(config());

        let setting = registry.resolve("marketing").unwrap();
        assert_eq!(setting.name, "marketing");
        assert_eq!(setting.accounts.len(), 2);
    }

    #[test]
    fn resolve_with_fallback() {
        let registry = AccountRegistry::new(config());

        // when the setting does not exist
        let setting = registry.resolve("x").unwrap();
        assert_eq!(setting.name, "default");

        // when the setting exists but is empty
        let setting = registry.resolve("empty").unwrap();
        assert_eq!(setting.name, "default");
    }

    #[test]
    fn resolve_without_fallback() {
        let registry = AccountRegistry::new(config().with_default_fallback(false));

        assert!(matches!(
            registry.resolve("y"),
            Err(Error::LocateAccountSettingError(name)) if name == "y"
        ));

        assert!(matches!(
            registry.resolve("empty"),
            Err(Error::LocateAccountSettingError(name)) if name == "empty"
        ));

        assert!(registry.resolve("default").is_ok());
    }

    #[test]
    fn resolve_without_default_setting() {
        let native = AccountDescriptor::new(TransportConfig::Native);
        let config =
            MailerConfig::default().with_setting(AccountSetting::new("marketing", [native]));
        let registry = AccountRegistry::new(config);

        assert!(matches!(
            registry.resolve("x"),
            Err(Error::LocateAccountSettingError(name)) if name == "default"
        ));
    }

    #[test]
    fn default_registry_falls_back() {
        let registry = AccountRegistry::default();
        assert!(registry.is_default_fallback_enabled());

        assert!(matches!(
            registry.resolve("x"),
            Err(Error::LocateAccountSettingError(name)) if name == "default"
        ));
    }

    #[test]
    fn registry_is_shareable() {
        assert_send_sync::<AccountRegistry>();
        assert_send_sync::<Arc<AccountSetting>>();
        assert_send_sync::<Arc<AccountRegistry>>();
    }
}
