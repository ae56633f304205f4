//! Execution log decoding
//!
//! Each status poll carries the complete log of the execution so far as a
//! base64-encoded gzip stream, usually wrapped in a CDATA section. The
//! cursor is the number of lines already seen; decoding returns only the
//! lines past it and the cursor to pass on the next poll.

use std::io::Read;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::GzDecoder;
use regex::Regex;

use crate::error::{ExecutionError, Result};

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("line break pattern is valid"));

/// Lines containing this marker are counted but never emitted
const DEBUG_MARKER: &str = "DEBUG";

/// New log lines from one poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogChunk {
    pub lines: Vec<String>,
    pub cursor: usize,
}

/// Decodes a `logging_string` and returns the lines after `cursor`
///
/// The returned cursor is the total number of lines in the log, debug lines
/// included. An empty string decodes to no lines and keeps the cursor.
pub fn decode_log(raw: &str, cursor: usize) -> Result<LogChunk> {
    let text = decode_text(raw)?;
    if text.is_empty() {
        return Ok(LogChunk {
            lines: Vec::new(),
            cursor,
        });
    }

    let mut lines: Vec<&str> = LINE_BREAK.split(&text).collect();
    if text.ends_with(['\n', '\r']) {
        lines.pop();
    }

    let total = lines.len();
    let lines = lines
        .into_iter()
        .skip(cursor)
        .filter(|line| !line.contains(DEBUG_MARKER))
        .map(str::to_string)
        .collect();

    Ok(LogChunk {
        lines,
        cursor: total,
    })
}

fn decode_text(raw: &str) -> Result<String> {
    let payload = strip_cdata(raw.trim());
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Ok(String::new());
    }

    let compressed = STANDARD
        .decode(payload.as_bytes())
        .map_err(ExecutionError::log_decode)?;

    let mut bytes = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut bytes)
        .map_err(ExecutionError::log_decode)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn strip_cdata(raw: &str) -> &str {
    raw.strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .unwrap_or(raw)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    /// Encodes log text the way the server does
    pub fn encode_log(text: &str) -> String {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::encode_log;
    use super::*;

    #[test]
    fn test_debug_lines_are_counted_not_emitted() {
        let raw = encode_log("a\nDEBUG x\nb");

        let chunk = decode_log(&raw, 0).unwrap();
        assert_eq!(chunk.lines, vec!["a", "b"]);
        assert_eq!(chunk.cursor, 3);

        let chunk = decode_log(&raw, 3).unwrap();
        assert!(chunk.lines.is_empty());
        assert_eq!(chunk.cursor, 3);
    }

    #[test]
    fn test_only_lines_past_cursor() {
        let raw = encode_log("one\ntwo\nthree\nfour\n");

        let chunk = decode_log(&raw, 2).unwrap();
        assert_eq!(chunk.lines, vec!["three", "four"]);
        assert_eq!(chunk.cursor, 4);
    }

    #[test]
    fn test_mixed_line_breaks() {
        let raw = encode_log("one\r\ntwo\rthree\nfour\r\n");

        let chunk = decode_log(&raw, 0).unwrap();
        assert_eq!(chunk.lines, vec!["one", "two", "three", "four"]);
        assert_eq!(chunk.cursor, 4);
    }

    #[test]
    fn test_cdata_wrapper() {
        let raw = format!("<![CDATA[{}]]>", encode_log("2024/01/01 - people - started\n"));

        let chunk = decode_log(&raw, 0).unwrap();
        assert_eq!(chunk.lines, vec!["2024/01/01 - people - started"]);
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(decode_log("", 0).unwrap(), LogChunk::default());
        assert_eq!(decode_log("<![CDATA[]]>", 4).unwrap().cursor, 4);
        assert_eq!(decode_log(&encode_log(""), 2).unwrap().cursor, 2);
    }

    #[test]
    fn test_invalid_payload() {
        let err = decode_log("not base64!", 0).unwrap_err();
        assert!(matches!(err, ExecutionError::LogDecode(_)));

        let err = decode_log(&STANDARD.encode("plain text"), 0).unwrap_err();
        assert!(matches!(err, ExecutionError::LogDecode(_)));
    }
}
