use base64::{DecodeError, Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

/// Upper bound for the decoded payload of an attachment.
pub const MAX_ATTACHMENT_BYTES: usize = 2 * 1024 * 1024;
/// Length of [`MAX_ATTACHMENT_BYTES`] once encoded as padded base64.
pub const MAX_ATTACHMENT_BASE64_LEN: usize = MAX_ATTACHMENT_BYTES.div_ceil(3) * 4;
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AttachmentError {
    #[error("The attachment has no file name")]
    MissingFileName,
    #[error("Decoding the attachment payload failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The attachment is {0} bytes, the limit is {MAX_ATTACHMENT_BYTES} bytes")]
    TooLarge(usize),
}

/// A small file carried inline with a post as base64 text.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    pub data_base64: String,
}

impl Attachment {
    /// Normalizes a submitted attachment and enforces [`MAX_ATTACHMENT_BYTES`].
    ///
    /// The payload may also be given as a `data:<mime>;base64,<payload>` URL, in
    /// which case the mime type is taken from the URL unless one was supplied.
    pub fn validate(self) -> Result<Self, AttachmentError> {
        let file_name = self.file_name.trim();
        if file_name.is_empty() {
            return Err(AttachmentError::MissingFileName);
        }

        let (url_mime_type, payload) = split_data_url(self.data_base64.trim());
        let mime_type = match self.mime_type.trim() {
            "" => url_mime_type
                .filter(|mime_type| !mime_type.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE),
            mime_type => mime_type,
        };

        let attachment = Self {
            file_name: file_name.to_owned(),
            mime_type: mime_type.to_owned(),
            data_base64: payload.to_owned(),
        };

        let size = attachment.decode()?.len();
        if size > MAX_ATTACHMENT_BYTES {
            return Err(AttachmentError::TooLarge(size));
        }

        Ok(attachment)
    }

    pub fn decode(&self) -> Result<Vec<u8>, AttachmentError> {
        Ok(BASE64_STANDARD.decode(&self.data_base64)?)
    }

    /// Size of the decoded payload, computed from the encoded length.
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        self.data_base64.trim_end_matches('=').len() * 3 / 4
    }

    #[must_use]
    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.decoded_len(),
        }
    }
}

/// What listings show of an attachment; the payload is fetched separately.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

fn split_data_url(data: &str) -> (Option<&str>, &str) {
    data.strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map_or((None, data), |(mime_type, payload)| {
            (Some(mime_type), payload)
        })
}

impl Debug for Attachment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field(
                "data_base64",
                &format_args!("[{} chars]", self.data_base64.len()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::attachment::{
        Attachment, AttachmentError, DEFAULT_MIME_TYPE, MAX_ATTACHMENT_BASE64_LEN,
        MAX_ATTACHMENT_BYTES,
    };
    use base64::{Engine, prelude::BASE64_STANDARD};

    fn attachment(file_name: &str, mime_type: &str, payload: &[u8]) -> Attachment {
        Attachment {
            file_name: file_name.to_owned(),
            mime_type: mime_type.to_owned(),
            data_base64: BASE64_STANDARD.encode(payload),
        }
    }

    #[test]
    fn accepts_small_attachment() {
        let validated = attachment(" flyer.txt ", "text/plain", b"hello board")
            .validate()
            .unwrap();

        assert_eq!(validated.file_name, "flyer.txt");
        assert_eq!(validated.mime_type, "text/plain");
        assert_eq!(validated.decode().unwrap(), b"hello board");
    }

    #[test]
    fn missing_mime_type_falls_back() {
        let validated = attachment("blob", "  ", &[0, 1, 2]).validate().unwrap();

        assert_eq!(validated.mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn data_url_is_unwrapped() {
        let validated = Attachment {
            file_name: "dot.png".to_owned(),
            mime_type: String::new(),
            data_base64: format!("data:image/png;base64,{}", BASE64_STANDARD.encode([1u8, 2, 3])),
        }
        .validate()
        .unwrap();

        assert_eq!(validated.mime_type, "image/png");
        assert_eq!(validated.decode().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn size_limit_is_inclusive() {
        let at_limit = vec![0; MAX_ATTACHMENT_BYTES];
        assert!(attachment("full.bin", "", &at_limit).validate().is_ok());

        let over_limit = vec![0; MAX_ATTACHMENT_BYTES + 1];
        assert_eq!(
            attachment("big.bin", "", &over_limit).validate(),
            Err(AttachmentError::TooLarge(MAX_ATTACHMENT_BYTES + 1))
        );
        assert_eq!(
            attachment("full.bin", "", &at_limit).data_base64.len(),
            MAX_ATTACHMENT_BASE64_LEN
        );
    }

    #[test]
    fn rejects_invalid_attachments() {
        assert_eq!(
            attachment("  ", "text/plain", b"x").validate(),
            Err(AttachmentError::MissingFileName)
        );

        let garbage = Attachment {
            file_name: "broken".to_owned(),
            mime_type: String::new(),
            data_base64: "not base64!".to_owned(),
        };
        assert!(matches!(
            garbage.validate(),
            Err(AttachmentError::Decode(_))
        ));
    }

    #[test]
    fn decoded_len_matches_payload() {
        let payloads: [&[u8]; 6] = [b"", b"a", b"ab", b"abc", b"abcd", b"hello board"];

        for payload in payloads {
            let attachment = attachment("x", "", payload);

            assert_eq!(attachment.decoded_len(), payload.len());
            assert_eq!(attachment.summary().size_bytes, payload.len());
        }
    }

    #[test]
    fn debug_hides_payload() {
        let debug = format!("{:?}", attachment("a.txt", "text/plain", b"secret"));

        assert!(debug.contains("a.txt"));
        assert!(!debug.contains(&BASE64_STANDARD.encode(b"secret")));
    }
}
