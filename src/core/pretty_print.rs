//! JSON and XML re-indentation
//!
//! Both printers take raw source text and re-serialize it with one indent
//! level per nesting depth. An indent of 0 produces compact output. Output
//! of either printer is a fixed point: printing it again at the same width
//! yields the same text.

use super::error::{LoggerError, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Re-indents a JSON document. Member order and number literals are preserved.
///
/// ```
/// let text = taglog::core::pretty_print::pretty_json(r#"{"a":1,"b":[true]}"#, 2).unwrap();
/// assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");
/// ```
pub fn pretty_json(source: &str, indent: usize) -> Result<String> {
    let value: Value = serde_json::from_str(source)
        .map_err(|e| LoggerError::formatter("JSON", e.to_string()))?;

    if indent == 0 {
        return Ok(serde_json::to_string(&value)?);
    }

    let indent = vec![b' '; indent];
    let mut out = Vec::with_capacity(source.len() * 2);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer)?;

    String::from_utf8(out).map_err(|e| LoggerError::formatter("JSON", e.to_string()))
}

/// Re-indents an XML document.
///
/// Whitespace-only text between elements is discarded; elements holding
/// text keep it inline (`<name>value</name>`). The document must contain
/// exactly one root element with matching end tags.
pub fn pretty_xml(source: &str, indent: usize) -> Result<String> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut writer = if indent == 0 {
        Writer::new(Vec::with_capacity(source.len()))
    } else {
        Writer::new_with_indent(Vec::with_capacity(source.len() * 2), b' ', indent)
    };

    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e.to_string()))?;

        match &event {
            Event::Eof => break,
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| xml_error(&reader, "unexpected closing tag"))?;
            }
            Event::Empty(_) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(xml_error(&reader, "text outside of the root element"));
            }
            _ => {}
        }

        if roots > 1 {
            return Err(xml_error(&reader, "more than one root element"));
        }

        writer
            .write_event(event)
            .map_err(|e| LoggerError::formatter("XML", e.to_string()))?;
    }

    if depth != 0 {
        return Err(LoggerError::formatter(
            "XML",
            format!("{} unclosed element(s) at end of input", depth),
        ));
    }
    if roots == 0 {
        return Err(LoggerError::formatter("XML", "no root element"));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| LoggerError::formatter("XML", e.to_string()))
}

fn xml_error(reader: &Reader<&[u8]>, message: impl Into<String>) -> LoggerError {
    LoggerError::formatter(
        "XML",
        format!("{} (at byte {})", message.into(), reader.buffer_position()),
    )
}

/// Source text followed by a marker naming the parse failure. Emitted in
/// place of a document that could not be re-indented.
pub fn annotate_malformed(kind: &str, source: &str, error: &LoggerError) -> String {
    let reason = match error {
        LoggerError::FormatterError { message, .. } => message.clone(),
        other => other.to_string(),
    };
    format!("{}\n[malformed {}: {}]", source, kind, reason)
}
