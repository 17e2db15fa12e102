//! Module dedicated to the dispatch loop.
//!
//! The dispatcher selects an account of a setting, builds its
//! transport, then sends the message. When the transport fails, the
//! account is removed from the working set and another one is
//! selected, until the message is sent or until no account is left.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info};

use crate::{
    account::{
        select::{select, SelectionLogic},
        AccountDescriptor, AccountSetting,
    },
    message::{BuildMessage, MessagePayload},
    sender::{self, MailSender, Receipt, SendMessage},
    transport::{self, Transport},
    Error, Result,
};

/// The clock used to select accounts.
pub trait Clock: Send + Sync {
    /// Return the current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// The system clock, based on the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime + Send + Sync,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}

/// The accounts not tried yet during one dispatch.
///
/// The set is owned by a single dispatch call and dropped once the
/// call terminates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkingAccountSet {
    accounts: Vec<AccountDescriptor>,
    logic: SelectionLogic,
}

impl WorkingAccountSet {
    pub fn new(setting: &AccountSetting) -> Self {
        Self {
            accounts: setting.accounts.clone(),
            logic: setting.logic,
        }
    }

    pub fn accounts(&self) -> &[AccountDescriptor] {
        &self.accounts
    }

    pub fn logic(&self) -> SelectionLogic {
        self.logic
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Select the account to try next, or `None` if every account
    /// has already been tried.
    pub fn select(&self, now: &NaiveDateTime) -> Option<(usize, &AccountDescriptor)> {
        let index = select(&self.accounts, self.logic, now);
        self.accounts.get(index).map(|account| (index, account))
    }

    /// Remove the failed account at the given index.
    ///
    /// The selection logic is demoted to the default one, so the
    /// remaining accounts are tried in order.
    pub fn fail(&mut self, index: usize) -> Option<AccountDescriptor> {
        if !self.logic.is_default() {
            debug!(logic = %self.logic, "demoting selection logic to default");
            self.logic = SelectionLogic::Default;
        }

        (index < self.accounts.len()).then(|| self.accounts.remove(index))
    }
}

/// The dispatcher.
pub struct Dispatcher<S = MailSender> {
    sender: S,
    clock: Arc<dyn Clock>,
    batch: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(MailSender)
    }
}

impl<S: SendMessage> Dispatcher<S> {
    pub fn new(sender: S) -> Self {
        Self {
            sender,
            clock: Arc::new(SystemClock),
            batch: false,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Send one copy of the message per `to` recipient.
    ///
    /// Be careful when enabling it, as providers may limit the size
    /// and the frequency of batches.
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn is_batch_enabled(&self) -> bool {
        self.batch
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Dispatch the message built by the given builder using the
    /// accounts of the given setting.
    ///
    /// Transport failures, including a missing sender that the
    /// selected account cannot provide, make the dispatcher try
    /// another account of the setting. Builder and message failures
    /// are returned straight away.
    pub async fn dispatch<B>(&self, setting: &AccountSetting, builder: &B) -> Result<Receipt>
    where
        B: BuildMessage + ?Sized,
    {
        if setting.is_empty() {
            return Err(Error::LocateAccountSettingError(setting.name.clone()));
        }

        info!(setting = setting.name, logic = %setting.logic, "dispatching message");

        let mut set = WorkingAccountSet::new(setting);
        let mut attempts = 0;
        let mut last_err = None;

        loop {
            let now = self.clock.now();
            let Some((index, account)) = set.select(&now) else {
                break;
            };

            attempts += 1;
            debug!(setting = setting.name, index, attempts, "account selected");

            let res: sender::Result<Receipt> = match Transport::build(account) {
                Ok(transport) => {
                    let msg = builder
                        .build_message()
                        .map_err(Error::BuildMessageError)?
                        .with_defaults(transport.from(), transport.reply_to());

                    // the sender may come from the account
                    if msg.from.is_empty() {
                        Err(transport::Error::MissingSenderError.into())
                    } else {
                        self.send(&transport, &msg).await
                    }
                }
                Err(err) => Err(err.into()),
            };

            match res {
                Ok(receipt) => {
                    info!(setting = setting.name, attempts, "message successfully sent");
                    return Ok(receipt);
                }
                Err(sender::Error::MessageError(err)) => {
                    return Err(Error::CompileMessageError(err));
                }
                Err(sender::Error::TransportError(err)) => {
                    error!(
                        setting = setting.name,
                        index,
                        code = err.code(),
                        "cannot send message: {err}"
                    );
                    set.fail(index);
                    last_err = Some(err);
                }
            }
        }

        Err(exhausted(setting, attempts, last_err))
    }

    async fn send(&self, transport: &Transport, msg: &MessagePayload) -> sender::Result<Receipt> {
        if self.batch {
            self.sender.send_batch(transport, msg).await
        } else {
            self.sender.send_message(transport, msg).await
        }
    }
}

fn exhausted(setting: &AccountSetting, attempts: usize, err: Option<transport::Error>) -> Error {
    match err {
        Some(source) => Error::DeliveryExhaustedError {
            setting: setting.name.clone(),
            attempts,
            source,
        },
        None => Error::LocateAccountSettingError(setting.name.clone()),
    }
}
