use std::error::Error as StdError;
use std::io;

use tracing::debug;

use crate::fallback::provider::ProviderError;
use crate::fallback::FallbackReason;

const TIMEOUT_MARKERS: &[&str] = &[
    "aborterror",
    "timeouterror",
    "timed out",
    "timeout",
    "aborted",
    "deadline has elapsed",
];

const NETWORK_MARKERS: &[&str] = &[
    "fetch failed",
    "failed to fetch",
    "error sending request",
    "network",
    "connect",
    "dns",
    "econnrefused",
    "econnreset",
    "enotfound",
    "socket hang up",
    "unreachable",
];

const STATUS_MARKERS: &[&str] = &["returned", "status", "http", "responded", "code"];

// how many tokens past a marker word a status code may sit ("responded with 503")
const STATUS_LOOKAHEAD: usize = 3;

const UNIT_WORDS: &[&str] = &[
    "ms", "millis", "milliseconds", "s", "sec", "secs", "seconds", "bytes", "kb", "mb", "%",
];

/// Maps an error caught around a remote analysis call to a fallback reason.
///
/// Typed signals anywhere in the source chain win over message text; message
/// text is only consulted when no link is a recognized error type.
pub fn classify_request_error(error: &(dyn StdError + 'static)) -> FallbackReason {
    let chain: Vec<&(dyn StdError + 'static)> =
        std::iter::successors(Some(error), |&err| err.source()).collect();
    classify_chain(&chain)
}

pub fn classify_anyhow(error: &anyhow::Error) -> FallbackReason {
    let chain: Vec<&(dyn StdError + 'static)> = error.chain().collect();
    classify_chain(&chain)
}

fn classify_chain(chain: &[&(dyn StdError + 'static)]) -> FallbackReason {
    if let Some(reason) = chain.iter().find_map(|err| classify_typed(*err)) {
        return reason;
    }
    if let Some(reason) = chain
        .iter()
        .find_map(|err| classify_message(&err.to_string()))
    {
        return reason;
    }
    if let Some(top) = chain.first() {
        debug!(error = %top, "unrecognized remote analysis failure");
    }
    FallbackReason::Unknown
}

fn classify_typed(error: &(dyn StdError + 'static)) -> Option<FallbackReason> {
    if let Some(err) = error.downcast_ref::<ProviderError>() {
        return Some(match err {
            ProviderError::TimedOut(_) | ProviderError::Aborted => FallbackReason::Timeout,
            ProviderError::Status { status, .. } if is_success(*status) => return None,
            ProviderError::Status { .. } => FallbackReason::NonOkResponse,
            ProviderError::Transport(_) => FallbackReason::NetworkError,
        });
    }
    if error.is::<tokio::time::error::Elapsed>() {
        return Some(FallbackReason::Timeout);
    }
    if let Some(err) = error.downcast_ref::<reqwest::Error>() {
        if err.is_timeout() {
            return Some(FallbackReason::Timeout);
        }
        if let Some(status) = err.status() {
            if !status.is_success() {
                return Some(FallbackReason::NonOkResponse);
            }
        }
        if err.is_connect() || err.is_request() {
            return Some(FallbackReason::NetworkError);
        }
        return None;
    }
    if let Some(err) = error.downcast_ref::<io::Error>() {
        return match err.kind() {
            io::ErrorKind::TimedOut => Some(FallbackReason::Timeout),
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe => Some(FallbackReason::NetworkError),
            _ => None,
        };
    }
    None
}

fn classify_message(message: &str) -> Option<FallbackReason> {
    let lower = message.to_ascii_lowercase();
    // a completed call that reports "504 Gateway Timeout" is still a response
    if embedded_status_code(&lower).is_some_and(|code| (400..600).contains(&code)) {
        return Some(FallbackReason::NonOkResponse);
    }
    if TIMEOUT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some(FallbackReason::Timeout);
    }
    if NETWORK_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some(FallbackReason::NetworkError);
    }
    None
}

/// Finds an HTTP status code that a wrapper embedded in an error message,
/// e.g. `"GET https://host/analyze returned 503 Service Unavailable"`,
/// `"provider failed with status: 429"` or `"engine error (502)"`.
///
/// A code is accepted a few tokens after a marker word, or on its own when it
/// is a 4xx/5xx wrapped in parentheses or followed by its reason phrase.
/// Numbers followed by a unit (`"503 ms"`) are never status codes.
pub fn embedded_status_code(message: &str) -> Option<u16> {
    let tokens: Vec<&str> = message
        .split(|c: char| c.is_whitespace() || c == '=' || c == ':')
        .filter(|t| !t.is_empty())
        .collect();
    (0..tokens.len()).find_map(|at| {
        status_after_marker(&tokens, at).or_else(|| standalone_status(&tokens, at))
    })
}

fn status_after_marker(tokens: &[&str], at: usize) -> Option<u16> {
    let marker = bare_word(tokens[at]);
    let is_marker = STATUS_MARKERS.contains(&marker.as_str()) || marker.starts_with("http/");
    if !is_marker {
        return None;
    }
    (at + 1..tokens.len())
        .take(STATUS_LOOKAHEAD)
        .find_map(|next| status_without_unit(tokens, next))
}

fn standalone_status(tokens: &[&str], at: usize) -> Option<u16> {
    let code = status_without_unit(tokens, at).filter(|code| (400..600).contains(code))?;
    let token = tokens[at].trim_end_matches([',', '.', ';']);
    if token.starts_with('(') && token.ends_with(')') {
        return Some(code);
    }
    let reason = reqwest::StatusCode::from_u16(code)
        .ok()?
        .canonical_reason()?
        .to_ascii_lowercase();
    let rest = tokens[at + 1..].join(" ").to_ascii_lowercase();
    rest.starts_with(&reason).then_some(code)
}

fn status_without_unit(tokens: &[&str], at: usize) -> Option<u16> {
    let code = parse_status_token(tokens[at])?;
    let unit_follows = tokens
        .get(at + 1)
        .is_some_and(|next| UNIT_WORDS.contains(&bare_word(next).as_str()));
    (!unit_follows).then_some(code)
}

fn bare_word(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '%')
        .to_ascii_lowercase()
}

fn parse_status_token(token: &str) -> Option<u16> {
    let trimmed = token.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, rest) = trimmed.split_at(digits_end);
    // "503ms" and "50311" are not status codes
    if digits.len() != 3 || rest.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    digits
        .parse::<u16>()
        .ok()
        .filter(|code| (100..600).contains(code))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
