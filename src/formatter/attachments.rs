//! Per-formatter attachment handling.
//!
//! Configured through the `attachmentHandlingOptions` setting:
//!
//! ```json
//! {"attachmentHandling": "External", "externalAttachmentsStoragePath": "attachments/{branch}"}
//! ```
//!
//! `Embed` (the default) leaves envelopes untouched. `External` moves the
//! `url` of every `externalAttachment` under the storage path.

use std::{path::Path, sync::Arc};

use log::warn;

use crate::{
    config::{FormatterConfiguration, PlaceholderResolver},
    messages::Envelope,
};

/// Setting key holding the attachment options object.
pub const ATTACHMENT_OPTIONS_SETTING: &str = "attachmentHandlingOptions";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachmentHandling {
    #[default]
    Embed,
    External,
}

/// Resolved attachment options for one formatter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachmentOptions {
    pub handling: AttachmentHandling,
    /// Storage directory with placeholders already expanded.
    pub storage_path: Option<String>,
}

impl AttachmentOptions {
    /// Read options from `config`, falling back to [`AttachmentHandling::Embed`]
    /// for anything missing or unrecognised.
    #[must_use]
    pub fn from_configuration(config: &FormatterConfiguration, placeholders: &PlaceholderResolver) -> Self {
        let Some(options) = config.setting(ATTACHMENT_OPTIONS_SETTING) else {
            return Self::default();
        };
        let Some(options) = options.as_object() else {
            warn!("ignoring {ATTACHMENT_OPTIONS_SETTING}: expected an object, got {options}");
            return Self::default();
        };

        let lookup = |key: &str| {
            options
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.as_str())
        };
        let handling = match lookup("attachmentHandling") {
            Some(mode) if mode.eq_ignore_ascii_case("external") => AttachmentHandling::External,
            Some(mode) if mode.eq_ignore_ascii_case("embed") => AttachmentHandling::Embed,
            None => AttachmentHandling::Embed,
            Some(other) => {
                warn!("unknown attachment handling '{other}', embedding attachments");
                AttachmentHandling::Embed
            }
        };
        let storage_path = lookup("externalAttachmentsStoragePath")
            .filter(|path| !path.trim().is_empty())
            .map(|path| placeholders.resolve(path));

        Self {
            handling,
            storage_path,
        }
    }

    /// Rewrite `envelope` for this formatter. Clones only when a change is
    /// needed.
    #[must_use]
    pub fn apply(&self, envelope: Arc<Envelope>) -> Arc<Envelope> {
        let (AttachmentHandling::External, Some(storage)) = (self.handling, &self.storage_path) else {
            return envelope;
        };
        let Envelope::ExternalAttachment(attachment) = envelope.as_ref() else {
            return envelope;
        };
        let Some(url) = relocate(&attachment.url, storage) else {
            return envelope;
        };
        let mut attachment = attachment.clone();
        attachment.url = url;
        Arc::new(Envelope::ExternalAttachment(attachment))
    }
}

/// New location of `url` under `storage`; `None` leaves it alone.
fn relocate(url: &str, storage: &str) -> Option<String> {
    if url.contains("://") {
        return None;
    }
    let source = Path::new(url);
    let relative = if source.has_root() {
        Path::new(source.file_name()?)
    } else {
        source
    };
    Some(Path::new(storage).join(relative).to_string_lossy().into_owned())
}
