//! Turning command failures into messages for the terminal.

use wardrobe_core::Error;

/// What the user sees for a failed command.
///
/// A domain error anywhere in the chain is replaced by its
/// [`Error::user_message`], prefixed by the outermost context when there is
/// one. Other errors show only their outermost message.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.chain().find_map(|e| e.downcast_ref::<Error>()) {
        Some(domain) if err.chain().count() > 1 => {
            format!("{}: {}", err, domain.user_message())
        }
        Some(domain) => domain.user_message(),
        None => err.to_string(),
    }
}
