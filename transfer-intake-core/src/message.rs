//! Loading a raw message and pulling its plain-text body out of the MIME tree.

use std::path::Path;

use mailparse::{DispositionType, MailParseError, ParsedMail};
use tracing::{debug, error, info};

use crate::error::IntakeError;

/// Reads the raw message bytes from `path`.
pub async fn load_message(path: &Path) -> Result<Vec<u8>, IntakeError> {
    match tokio::fs::read(path).await {
        Ok(raw) => {
            info!(path = %path.display(), size = raw.len(), "Message read");
            Ok(raw)
        }
        Err(source) => {
            error!(error = ?source, path = %path.display(), "Failed to read message");
            Err(IntakeError::ReadMessage {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Returns the decoded body text of a message.
///
/// For a multipart message this is the payload of the first `text/plain` part
/// (depth first, document order) whose disposition is not `attachment`, or an
/// empty body when there is none. For anything else it is the whole payload.
pub fn extract_body(raw: &[u8]) -> Result<Vec<u8>, MailParseError> {
    let mail = mailparse::parse_mail(raw)?;

    if !is_multipart(&mail) {
        debug!(mimetype = %mail.ctype.mimetype, "Message is not multipart, using whole payload");
        return mail.get_body_raw();
    }

    match find_plain_text(&mail) {
        Some(part) => {
            debug!(charset = %part.ctype.charset, "Found inline text/plain part");
            part.get_body_raw()
        }
        None => {
            debug!(parts = mail.subparts.len(), "No inline text/plain part in multipart message");
            Ok(Vec::new())
        }
    }
}

fn is_multipart(mail: &ParsedMail<'_>) -> bool {
    mail.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/")
}

fn find_plain_text<'m, 'a>(part: &'m ParsedMail<'a>) -> Option<&'m ParsedMail<'a>> {
    let inline_text = part.ctype.mimetype.eq_ignore_ascii_case("text/plain")
        && part.get_content_disposition().disposition != DispositionType::Attachment;
    if inline_text {
        return Some(part);
    }
    part.subparts.iter().find_map(find_plain_text)
}
