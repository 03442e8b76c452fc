//! Self-healing decoder for generative-text output
//!
//! Model output is expected to be one JSON object, but the service is under
//! no obligation to deliver one: fenced code blocks, raw newlines inside
//! string values and unescaped notation backslashes (`\sum`, `\alpha`) all
//! show up in practice. Decoding therefore runs a short ladder of repair
//! stages, each a pure `&str -> String` normalization, re-attempting a
//! strict parse plus shape validation after every stage:
//!
//! 1. `strip_code_fences` drops markdown fence markers and surrounding
//!    whitespace.
//! 2. `escape_control_chars` escapes raw control characters found inside
//!    string literals so the strict parser accepts them.
//! 3. `double_bare_backslashes` doubles any backslash that does not
//!    introduce a recognized escape sequence.
//!
//! Cheap, high-confidence fixes run first. The backslash doubler runs last
//! and walks the text tracking escape state, since applied to an
//! already-valid escape it would change meaning. Once the ladder is
//! exhausted the decoder fails closed; no further repair is attempted.

use thiserror::Error;

use crate::models::StudyPacket;

/// How much of the offending text a terminal failure carries
const SNIPPET_LEN: usize = 200;

/// Errors from the decoding ladder
#[derive(Error, Debug)]
pub enum DecodeError {
    /// No repair stage yielded parseable JSON
    #[error("Response not parseable after {stages} repair stage(s); starts with: {snippet:?}")]
    Unparseable { stages: usize, snippet: String },

    /// JSON parsed but the packet shape is invalid
    #[error("Response parsed but has invalid shape: {reason}")]
    InvalidShape { reason: String },
}

type Repair = fn(&str) -> String;

/// Ordered repair ladder; each stage is applied cumulatively
const REPAIR_LADDER: &[(&str, Repair)] = &[
    ("strip-code-fences", strip_code_fences),
    ("escape-control-chars", escape_control_chars),
    ("double-bare-backslashes", double_bare_backslashes),
];

/// Decode raw service output into a validated study packet
pub fn decode(raw: &str) -> Result<StudyPacket, DecodeError> {
    let mut text = raw.to_string();
    let mut shape_error: Option<String> = None;

    for &(stage, repair) in REPAIR_LADDER {
        text = repair(&text);

        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::trace!(stage, error = %e, "Parse attempt failed");
                continue;
            }
        };

        match serde_json::from_value::<StudyPacket>(value) {
            Ok(packet) => match packet.validate() {
                Ok(()) => {
                    tracing::debug!(stage, questions = packet.questions.len(), "Packet decoded");
                    return Ok(packet);
                }
                Err(reason) => shape_error = Some(reason),
            },
            Err(e) => shape_error = Some(e.to_string()),
        }
    }

    match shape_error {
        Some(reason) => Err(DecodeError::InvalidShape { reason }),
        None => Err(DecodeError::Unparseable {
            stages: REPAIR_LADDER.len(),
            snippet: text.chars().take(SNIPPET_LEN).collect(),
        }),
    }
}

/// Remove markdown code-fence markers and surrounding whitespace
fn strip_code_fences(text: &str) -> String {
    let mut t = text.trim();

    if let Some(rest) = t.strip_prefix("```") {
        t = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = t.trim_end().strip_suffix("```") {
        t = rest;
    }

    t.trim().to_string()
}

/// Escape raw control characters inside JSON string literals
///
/// The service is allowed to emit literal newlines inside string values;
/// the strict parser is not allowed to accept them. Characters outside
/// string literals pass through untouched.
fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escape_next {
            out.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' => {
                escape_next = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            _ => out.push(c),
        }
    }

    out
}

/// Double backslashes that do not introduce a recognized escape
///
/// `\sum` becomes `\\sum`; `\\sum` and `\n` are left alone. The walk tracks
/// string boundaries so an escaped quote does not end the string early.
fn double_bare_backslashes(text: &str) -> String {
    const KNOWN_ESCAPES: &[char] = &['"', '\\', '/', 'b', 'f', 'n', 'r', 't', 'u'];

    let mut out = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\\' => match chars.peek() {
                Some(&next) if KNOWN_ESCAPES.contains(&next) => {
                    out.push('\\');
                    out.push(next);
                    chars.next();
                }
                _ => out.push_str("\\\\"),
            },
            _ => out.push(c),
        }
    }

    out
}
