//! YAML post-processing for YAML 1.1 readers.
//!
//! `serde_yaml` emits YAML 1.2, where `2010-09-09` is a plain string. The
//! platform and most of its tooling read YAML 1.1, where the same scalar is a
//! timestamp. Plain keys and values shaped like a YAML 1.1 timestamp are
//! single-quoted here. Block scalar content is left alone.

use once_cell::sync::Lazy;
use regex::Regex;

/// The YAML 1.1 `timestamp` tag pattern.
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}",
        r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}",
        r"(?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?)$"
    ))
    .unwrap()
});

/// One emitted line: indentation and sequence dashes, an optional plain or
/// quoted key, then the rest.
static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r##"^(?P<lead>[ ]*(?:- )*)(?:(?P<key>[^ '"#][^\n]*?|'(?:[^']|'')*'|"(?:[^"\\]|\\.)*"):(?: |$))?(?P<value>.*)$"##,
    )
    .unwrap()
});

static BLOCK_INDICATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[|>][-+0-9]*$").unwrap());

fn quote_if_timestamp(scalar: &str) -> String {
    if TIMESTAMP.is_match(scalar) {
        format!("'{scalar}'")
    } else {
        scalar.to_string()
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Quote every plain scalar a YAML 1.1 reader would load as a timestamp.
pub(crate) fn quote_timestamps(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    // Indentation of the line that opened the current block scalar.
    let mut block: Option<usize> = None;

    for line in text.lines() {
        if let Some(parent) = block {
            if line.trim().is_empty() || indentation(line) > parent {
                out.push_str(line);
                out.push('\n');
                continue;
            }
            block = None;
        }

        match LINE.captures(line) {
            Some(caps) => {
                out.push_str(&caps["lead"]);
                if let Some(key) = caps.name("key") {
                    out.push_str(&quote_if_timestamp(key.as_str()));
                    out.push(':');
                    if !caps["value"].is_empty() || line.ends_with(": ") {
                        out.push(' ');
                    }
                }
                let value = &caps["value"];
                if BLOCK_INDICATOR.is_match(value) {
                    block = Some(indentation(line));
                }
                out.push_str(&quote_if_timestamp(value));
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }

    if !text.ends_with('\n') {
        out.pop();
    }
    out
}
