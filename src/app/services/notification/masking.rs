//! Recipient masking for diagnostic output

use crate::constants::RECIPIENT_MASK;

/// Mask a recipient identifier for logging
///
/// Keeps the first character, the character just before `@`, and the domain:
/// `alice@example.com` becomes `a********e@example.com`. Identifiers with no
/// local part to anchor on are replaced by the mask entirely.
pub fn mask_recipient(recipient: &str) -> String {
    let Some(at) = recipient.find('@') else {
        return RECIPIENT_MASK.to_string();
    };
    if at == 0 {
        return RECIPIENT_MASK.to_string();
    }

    let local = &recipient[..at];
    let domain = &recipient[at..];

    let mut chars = local.chars();
    let first = chars.next().unwrap_or_default();
    let last = chars.next_back().unwrap_or(first);

    format!("{}{}{}{}", first, RECIPIENT_MASK, last, domain)
}
