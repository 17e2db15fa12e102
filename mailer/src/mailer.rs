//! Module dedicated to the mailer.
//!
//! The [`Mailer`] ties an [`AccountRegistry`] to a [`Dispatcher`],
//! and maps template names to handlers building message payloads
//! out of caller arguments.

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::info;

use crate::{
    account::{registry::AccountRegistry, DEFAULT_SETTING},
    dispatch::{Clock, Dispatcher},
    message::{self, MessagePayload},
    sender::{MailSender, Receipt, SendMessage},
    Error, Result,
};

/// The template handler.
///
/// It builds a message payload out of the given arguments.
pub type Template<A> = Arc<dyn Fn(&A) -> message::Result<MessagePayload> + Send + Sync>;

/// The mailer.
pub struct Mailer<A, S = MailSender> {
    registry: Arc<AccountRegistry>,
    setting: String,
    templates: HashMap<String, Template<A>>,
    dispatcher: Dispatcher<S>,
}

impl<A> Mailer<A> {
    /// Create a new mailer using the default sender and the
    /// `default` account setting.
    pub fn new(registry: impl Into<Arc<AccountRegistry>>) -> Self {
        Self::new_with_sender(registry, MailSender)
    }
}

impl<A, S: SendMessage> Mailer<A, S> {
    pub fn new_with_sender(registry: impl Into<Arc<AccountRegistry>>, sender: S) -> Self {
        Self {
            registry: registry.into(),
            setting: DEFAULT_SETTING.to_owned(),
            templates: HashMap::new(),
            dispatcher: Dispatcher::new(sender),
        }
    }

    /// Use the account setting matching the given name.
    pub fn with_setting(mut self, name: impl ToString) -> Self {
        self.setting = name.to_string();
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.dispatcher = self.dispatcher.with_batch(batch);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.dispatcher = self.dispatcher.with_clock(clock);
        self
    }

    pub fn with_template(
        mut self,
        name: impl ToString,
        template: impl Fn(&A) -> message::Result<MessagePayload> + Send + Sync + 'static,
    ) -> Self {
        self.register_template(name, template);
        self
    }

    /// Register the given template handler under the given name,
    /// replacing any previous one.
    pub fn register_template(
        &mut self,
        name: impl ToString,
        template: impl Fn(&A) -> message::Result<MessagePayload> + Send + Sync + 'static,
    ) {
        self.templates.insert(name.to_string(), Arc::new(template));
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }
}

impl<A: Sync, S: SendMessage> Mailer<A, S> {
    /// Send the message built by the template matching the given
    /// name.
    ///
    /// Fails straight away if no template matches the given name.
    pub async fn send(&self, name: &str, args: &A) -> Result<Receipt> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::UndefinedTemplateError(name.to_owned()))?;

        info!(template = name, setting = self.setting, "sending templated message");

        let setting = self.registry.resolve(&self.setting)?;
        let builder = || (**template)(args);
        self.dispatcher.dispatch(&setting, &builder).await
    }

    /// Send the given message payload.
    pub async fn send_message(&self, msg: &MessagePayload) -> Result<Receipt> {
        let setting = self.registry.resolve(&self.setting)?;
        self.dispatcher.dispatch(&setting, msg).await
    }
}

impl<A, S> fmt::Debug for Mailer<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut templates: Vec<_> = self.templates.keys().collect();
        templates.sort();

        f.debug_struct("Mailer")
            .field("setting", &self.setting)
            .field("templates", &templates)
            .finish_non_exhaustive()
    }
}
