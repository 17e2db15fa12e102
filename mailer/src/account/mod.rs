//! Module dedicated to account settings.
//!
//! An account setting is a named group of account descriptors
//! sharing the same [`SelectionLogic`]. Each descriptor represents
//! one concrete way to send emails.

pub mod config;
pub mod registry;
pub mod select;

use std::collections::BTreeMap;

use crate::{message::Mailbox, transport::TransportConfig};

use self::select::SelectionLogic;

/// The name of the setting used as universal fallback.
pub const DEFAULT_SETTING: &str = "default";

/// Mapping of email addresses to display names.
///
/// An empty display name means that the address has no display
/// name.
pub type Mailboxes = BTreeMap<String, String>;

/// The account setting.
///
/// The order of accounts matters: the first one is the primary
/// account under the default selection logic.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AccountSetting {
    /// The name of the setting.
    ///
    /// It is taken from the configuration key the setting is
    /// declared under.
    #[cfg_attr(feature = "derive", serde(skip))]
    pub name: String,

    /// The accounts of the setting.
    #[cfg_attr(feature = "derive", serde(default))]
    pub accounts: Vec<AccountDescriptor>,

    /// The logic used to select the account to try next.
    #[cfg_attr(feature = "derive", serde(default))]
    pub logic: SelectionLogic,
}

impl AccountSetting {
    pub fn new(name: impl ToString, accounts: impl IntoIterator<Item = AccountDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            accounts: accounts.into_iter().collect(),
            logic: SelectionLogic::default(),
        }
    }

    pub fn with_logic(mut self, logic: SelectionLogic) -> Self {
        self.logic = logic;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// The account descriptor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AccountDescriptor {
    /// The transport configuration.
    #[cfg_attr(feature = "derive", serde(flatten))]
    pub transport: TransportConfig,

    /// The default sender, used when the message does not define
    /// one.
    #[cfg_attr(feature = "derive", serde(default))]
    pub from: Option<Mailboxes>,

    /// The default reply-to, used when the message does not define
    /// one.
    #[cfg_attr(feature = "derive", serde(default, alias = "replyto"))]
    pub reply_to: Option<Mailboxes>,
}

impl AccountDescriptor {
    pub fn new(transport: impl Into<TransportConfig>) -> Self {
        Self {
            transport: transport.into(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, email: impl ToString, name: impl ToString) -> Self {
        self.from
            .get_or_insert_with(Default::default)
            .insert(email.to_string(), name.to_string());
        self
    }

    pub fn with_reply_to(mut self, email: impl ToString, name: impl ToString) -> Self {
        self.reply_to
            .get_or_insert_with(Default::default)
            .insert(email.to_string(), name.to_string());
        self
    }
}

/// Transform a mapping of addresses into a list of mailboxes.
pub(crate) fn into_mailboxes(mailboxes: &Mailboxes) -> Vec<Mailbox> {
    mailboxes
        .iter()
        .map(|(email, name)| {
            let name = Some(name.trim()).filter(|name| !name.is_empty());
            Mailbox::new(email, name)
        })
        .collect()
}
