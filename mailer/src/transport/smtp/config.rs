//! Module dedicated to the SMTP transport configuration.
//!
//! This module contains the configuration specific to the SMTP
//! transport.

use std::{fmt, time::Duration};

use crate::transport::{Error, Result};

/// The default SMTP port.
pub const DEFAULT_PORT: u16 = 25;

/// The SMTP transport configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct SmtpConfig {
    /// The SMTP server host name.
    #[cfg_attr(feature = "derive", serde(default, alias = "host"))]
    pub hostname: Option<String>,

    /// The SMTP server host port.
    ///
    /// Defaults to 25 when missing or 0. Use 465 for secure
    /// connections.
    #[cfg_attr(feature = "derive", serde(default))]
    pub port: Option<u16>,

    /// The SMTP encryption protocol to use.
    ///
    /// Supported encryption: SSL/TLS or STARTTLS. Defaults to none.
    #[cfg_attr(
        feature = "derive",
        serde(default, deserialize_with = "derive::some_bool_or_kind")
    )]
    pub encryption: Option<SmtpEncryptionKind>,

    /// The SMTP server login.
    #[cfg_attr(feature = "derive", serde(default, alias = "login"))]
    pub username: Option<String>,

    /// The SMTP server password.
    #[cfg_attr(feature = "derive", serde(default))]
    pub password: Option<String>,

    /// The timeout, in seconds, of every SMTP exchange.
    #[cfg_attr(feature = "derive", serde(default))]
    pub timeout: Option<u64>,
}

impl SmtpConfig {
    pub fn port(&self) -> u16 {
        match self.port {
            Some(port) if port > 0 => port,
            _ => DEFAULT_PORT,
        }
    }

    /// Return `true` if TLS or StartTLS is enabled.
    pub fn is_encryption_enabled(&self) -> bool {
        matches!(
            self.encryption,
            Some(SmtpEncryptionKind::Tls) | Some(SmtpEncryptionKind::StartTls)
        )
    }

    /// Return `true` if StartTLS is enabled.
    pub fn is_start_tls_encryption_enabled(&self) -> bool {
        matches!(self.encryption, Some(SmtpEncryptionKind::StartTls))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Return the login/password pair, if any.
    ///
    /// A login without password is a configuration error.
    pub fn credentials(&self) -> Result<Option<(&str, &str)>> {
        let Some(login) = self.username.as_deref().filter(|login| !login.is_empty()) else {
            return Ok(None);
        };

        match self.password.as_deref() {
            Some(passwd) => Ok(Some((login, passwd))),
            None => Err(Error::MissingSmtpPasswordError(login.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SmtpEncryptionKind {
    #[cfg_attr(feature = "derive", serde(alias = "ssl"))]
    Tls,
    #[cfg_attr(feature = "derive", serde(alias = "starttls"))]
    StartTls,
    None,
}

impl fmt::Display for SmtpEncryptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls => write!(f, "SSL/TLS"),
            Self::StartTls => write!(f, "StartTLS"),
            Self::None => write!(f, "None"),
        }
    }
}

impl From<bool> for SmtpEncryptionKind {
    fn from(value: bool) -> Self {
        if value {
            Self::Tls
        } else {
            Self::None
        }
    }
}

#[cfg(feature = "derive")]
mod derive {
    use std::{fmt, marker::PhantomData, result};

    use serde::{de, Deserialize, Deserializer};

    use super::SmtpEncryptionKind;

    pub(super) fn some_bool_or_kind<'de, D>(
        deserializer: D,
    ) -> result::Result<Option<SmtpEncryptionKind>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SomeBoolOrKind(PhantomData<fn() -> Option<SmtpEncryptionKind>>);

        impl<'de> de::Visitor<'de> for SomeBoolOrKind {
            type Value = Option<SmtpEncryptionKind>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("some or none")
            }

            fn visit_none<E>(self) -> result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct BoolOrKind(PhantomData<fn() -> SmtpEncryptionKind>);

                impl<'de> de::Visitor<'de> for BoolOrKind {
                    type Value = SmtpEncryptionKind;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str("boolean or string")
                    }

                    fn visit_bool<E>(self, v: bool) -> result::Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        Ok(v.into())
                    }

                    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        Deserialize::deserialize(de::value::StrDeserializer::new(v))
                    }
                }

                deserializer
                    .deserialize_any(BoolOrKind(PhantomData))
                    .map(Option::Some)
            }
        }

        deserializer.deserialize_option(SomeBoolOrKind(PhantomData))
    }
}
