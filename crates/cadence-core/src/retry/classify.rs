//! Classify remote failures into retry policy error kinds.
//!
//! Rules are evaluated in a fixed order and the first match wins, so a message
//! carrying both a bot-detection marker and a network marker is a lockout, not
//! a connectivity blip.

use super::error::RemoteError;
use super::policy::ErrorKind;

const SESSION_MARKERS: &[&str] = &[
    "session expired",
    "session_expired",
    "session has expired",
    "session invalid",
    "invalid session",
    "login required",
    "login_required",
    "not logged in",
    "please log in",
    "unauthenticated",
    "unauthorized",
];

const BOT_MARKERS: &[&str] = &[
    "challenge",
    "checkpoint",
    "spam",
    "automated",
    "bot detected",
    "suspicious",
    "unusual activity",
    "feedback_required",
];

const REJECTED_MARKERS: &[&str] = &[
    "invalid image",
    "invalid media",
    "unsupported",
    "format",
    "dimension",
    "aspect ratio",
    "resolution",
    "too large",
    "too small",
    "media rejected",
    "content rejected",
    "upload rejected",
    "content policy",
    "corrupt",
];

const COOLDOWN_MARKERS: &[&str] = &[
    "wait",
    "cooldown",
    "cool down",
    "rate limit",
    "rate_limit",
    "ratelimit",
    "too many requests",
    "try again in",
    "throttl",
];

const NETWORK_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "dns",
    "could not resolve",
    "unreachable",
    "no route to host",
    "offline",
    "network",
    "connection",
    "reset by peer",
    "broken pipe",
];

/// Ordered rule list: first match wins.
const RULES: &[(&[&str], ErrorKind)] = &[
    (SESSION_MARKERS, ErrorKind::SessionExpired),
    (BOT_MARKERS, ErrorKind::BotDetected),
    (REJECTED_MARKERS, ErrorKind::ItemRejected),
    (COOLDOWN_MARKERS, ErrorKind::CooldownActive),
    (NETWORK_MARKERS, ErrorKind::NetworkTransient),
];

/// Classify a remote error (message and code) into an ErrorKind.
pub fn classify(e: &RemoteError) -> ErrorKind {
    let haystack = e.haystack();
    RULES
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| haystack.contains(m)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::GenericTransient)
}

/// Sum every `<int>m` / `<int>s` token in a cooldown message, in seconds.
///
/// Unit words (`min`, `minutes`, `sec`, `seconds`, ...) count as the same tokens,
/// optionally separated from the number by whitespace. Returns None when the
/// message holds no duration at all.
pub fn parse_wait_secs(message: &str) -> Option<u64> {
    let chars: Vec<char> = message.to_lowercase().chars().collect();
    let mut total: Option<u64> = None;
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let number: String = chars[start..i].iter().collect();
        let mut j = i;
        while j < chars.len() && chars[j] == ' ' {
            j += 1;
        }
        let word_start = j;
        while j < chars.len() && chars[j].is_ascii_alphabetic() {
            j += 1;
        }
        let word: String = chars[word_start..j].iter().collect();
        let factor = match word.as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
            _ => None,
        };
        if let (Some(factor), Ok(n)) = (factor, number.parse::<u64>()) {
            let secs = n.saturating_mul(factor);
            total = Some(total.unwrap_or(0).saturating_add(secs));
            i = j;
        }
    }
    total
}
