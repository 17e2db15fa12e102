//! Module dedicated to message compilation.
//!
//! A payload is compiled into an SMTP envelope and a raw MIME
//! message right before being handed over to a transport.

use std::{borrow::Cow, collections::BTreeSet};

use mail_builder::{headers::address::Address, MessageBuilder};
use tracing::debug;

use super::{Error, Mailbox, MessagePayload, Result};

/// The SMTP envelope of a compiled message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Envelope {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
}

/// The compiled message, ready to be handed over to a transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledMessage {
    pub envelope: Envelope,
    pub raw: Vec<u8>,
}

impl MessagePayload {
    /// Collect the unique envelope recipients of the message.
    pub fn recipients(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();

        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(|mailbox| mailbox.email.trim().to_owned())
            .filter(|email| !email.is_empty() && seen.insert(email.to_lowercase()))
            .collect()
    }

    /// Compile the message into a raw MIME message.
    ///
    /// Attachments are read from the file system at this moment. The
    /// `Bcc` header is only written when `keep_bcc_header` is set.
    pub async fn compile(&self, keep_bcc_header: bool) -> Result<CompiledMessage> {
        let mail_from = self
            .from
            .first()
            .map(|mailbox| mailbox.email.clone())
            .ok_or(Error::CompileMessageMissingSenderError)?;

        let rcpt_to = self.recipients();

        if rcpt_to.is_empty() {
            return Err(Error::CompileMessageMissingRecipientError);
        }

        let mut builder = MessageBuilder::new()
            .from(into_address(&self.from))
            .subject(self.subject.as_str());

        if !self.reply_to.is_empty() {
            builder = builder.reply_to(into_address(&self.reply_to));
        }

        if !self.to.is_empty() {
            builder = builder.to(into_address(&self.to));
        }

        if !self.cc.is_empty() {
            builder = builder.cc(into_address(&self.cc));
        }

        if keep_bcc_header && !self.bcc.is_empty() {
            builder = builder.bcc(into_address(&self.bcc));
        }

        if let Some(html) = &self.html_body {
            builder = builder.html_body(html.as_str());
        }

        // a message needs at least one body part
        if self.text_body.is_some() || self.html_body.is_none() {
            builder = builder.text_body(self.text_body.as_deref().unwrap_or_default());
        }

        for path in &self.attachments {
            let contents = tokio::fs::read(path)
                .await
                .map_err(|err| Error::ReadAttachmentError(err, path.clone()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| Error::GetAttachmentFileNameError(path.clone()))?;
            let content_type = tree_magic_mini::from_u8(&contents);

            debug!(?path, content_type, "attaching file");
            builder = builder.attachment(content_type, filename, contents);
        }

        let raw = builder.write_to_vec().map_err(Error::WriteMessageError)?;

        Ok(CompiledMessage {
            envelope: Envelope { mail_from, rcpt_to },
            raw,
        })
    }
}

fn into_address(mailboxes: &[Mailbox]) -> Address<'_> {
    let mut addrs: Vec<Address<'_>> = mailboxes
        .iter()
        .map(|mailbox| {
            let name = mailbox.name.as_deref().map(Cow::Borrowed);
            Address::new_address(name, Cow::Borrowed(mailbox.email.as_str()))
        })
        .collect();

    if addrs.len() == 1 {
        addrs.remove(0)
    } else {
        Address::new_list(addrs)
    }
}
