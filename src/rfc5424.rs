//! Hand-written recursive-descent grammar for the RFC 5424 family of
//! syslog lines.
//!
//! The grammar deliberately accepts a superset of strictly conforming
//! input: PRI, the version token and the structured data block are all
//! optional here, and the timestamp is matched as an opaque token. Whether
//! an absent or odd-looking part is acceptable is policy that belongs to
//! the builder, which knows the active specification. What the grammar
//! does reject is anything it cannot derive a tree for at all; those
//! failures carry the byte position they were detected at.
//!
//! Parse state is a byte position into the line; every production advances
//! it as it consumes tokens and emits events in source order.

use crate::error::{DriveError, SyntaxError, SyntaxErrorKind};
use crate::event::{Event, EventSink};
use crate::facility::Facility;
use crate::keys::FieldKey;
use crate::severity::Severity;

fn syntax(kind: SyntaxErrorKind, position: usize) -> DriveError {
    DriveError::Syntax(SyntaxError { kind, position })
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// Everything up to the next space (or end of line); the position is left
/// on the space.
fn take_token<'a>(line: &'a str, pos: &mut usize) -> &'a str {
    let bytes = line.as_bytes();
    let start = *pos;
    while *pos < bytes.len() && bytes[*pos] != b' ' {
        *pos += 1;
    }
    &line[start..*pos]
}

fn expect_space(line: &str, pos: &mut usize) -> Result<(), DriveError> {
    if line.as_bytes().get(*pos) != Some(&b' ') {
        return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
    }
    *pos += 1;
    Ok(())
}

/// Entry point for unframed RFC 5424 lines.
pub fn syslog_msg<S: EventSink>(line: &str, sink: &mut S) -> Result<(), DriveError> {
    let mut pos = 0;
    message_body(line, &mut pos, sink)
}

/// Entry point for RFC 6587 octet-counted lines: `<byte-count> <msg>`.
pub fn octet_prefixed<S: EventSink>(line: &str, sink: &mut S) -> Result<(), DriveError> {
    let mut pos = 0;
    octet_prefix(line, &mut pos)?;
    message_body(line, &mut pos, sink)
}

/// Entry point for Heroku HTTPS log drain bodies. The productions are the
/// 5424 ones; the drain's laxer requirements (absent msgid and structured
/// data) are handled by the builder's specification.
pub fn heroku_https_log_drain<S: EventSink>(line: &str, sink: &mut S) -> Result<(), DriveError> {
    syslog_msg(line, sink)
}

pub(crate) fn octet_prefix(line: &str, pos: &mut usize) -> Result<(), DriveError> {
    let bytes = line.as_bytes();
    let run = digit_run(bytes, *pos);
    if run == 0 {
        return Err(syntax(SyntaxErrorKind::BadOctetCount, *pos));
    }
    *pos += run;
    if bytes.get(*pos) != Some(&b' ') {
        return Err(syntax(SyntaxErrorKind::ExpectedChar(' '), *pos));
    }
    *pos += 1;
    // The count is advisory once the transport has already split lines; a
    // disagreeing count does not fail the line.
    Ok(())
}

/// PRI: `<` 1..=3 digits `>`, with the value range-checked to a valid
/// facility/severity decomposition. Emits nothing when absent.
pub(crate) fn pri<S: EventSink>(
    line: &str,
    pos: &mut usize,
    sink: &mut S,
) -> Result<(), DriveError> {
    let bytes = line.as_bytes();
    if bytes.get(*pos) != Some(&b'<') {
        return Ok(());
    }
    *pos += 1;

    let start = *pos;
    let run = digit_run(bytes, *pos);
    if run == 0 || run > 3 {
        return Err(syntax(SyntaxErrorKind::BadPri, start));
    }
    *pos += run;
    if bytes.get(*pos) != Some(&b'>') {
        return Err(syntax(SyntaxErrorKind::ExpectedChar('>'), *pos));
    }
    let digits = &line[start..*pos];
    *pos += 1;

    let prival: u16 = digits
        .parse()
        .map_err(|_| syntax(SyntaxErrorKind::BadPri, start))?;
    if Severity::from_int((prival & 0x7) as u8).is_none()
        || Facility::from_int((prival >> 3) as u8).is_none()
    {
        return Err(syntax(SyntaxErrorKind::BadPri, start));
    }

    sink.event(Event::FieldMatched(FieldKey::Pri, digits))?;
    Ok(())
}

fn message_body<S: EventSink>(line: &str, pos: &mut usize, sink: &mut S) -> Result<(), DriveError> {
    let bytes = line.as_bytes();

    pri(line, pos, sink)?;

    // VERSION: one to three digits followed by a space, per the ABNF's
    // NONZERO-DIGIT 0*2DIGIT. A four-digit run is the year of a timestamp
    // on a line that dropped its version token.
    let run = digit_run(bytes, *pos);
    if (1..=3).contains(&run) && bytes.get(*pos + run) == Some(&b' ') {
        sink.event(Event::FieldMatched(FieldKey::Version, &line[*pos..*pos + run]))?;
        *pos += run + 1;
    } else if bytes.get(*pos) == Some(&b' ') {
        // PRI directly followed by the timestamp
        *pos += 1;
    }

    for key in [FieldKey::Timestamp, FieldKey::Hostname, FieldKey::AppName, FieldKey::ProcId] {
        let token = take_token(line, pos);
        if token.is_empty() {
            return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
        }
        sink.event(Event::FieldMatched(key, token))?;
        expect_space(line, pos)?;
    }

    let msgid = take_token(line, pos);
    if msgid.is_empty() {
        return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
    }
    sink.event(Event::FieldMatched(FieldKey::MsgId, msgid))?;
    if *pos >= bytes.len() {
        return Ok(());
    }
    *pos += 1;

    // STRUCTURED-DATA: element list, the nil token, or nothing at all (the
    // builder decides whether that last one matters)
    match bytes.get(*pos) {
        Some(&b'[') => {
            while bytes.get(*pos) == Some(&b'[') {
                sd_element(line, pos, sink)?;
            }
        }
        Some(&b'-') if *pos + 1 >= bytes.len() || bytes[*pos + 1] == b' ' => {
            sink.event(Event::StructuredDataNil)?;
            *pos += 1;
        }
        _ => {}
    }

    // MSG
    if bytes.get(*pos) == Some(&b' ') {
        *pos += 1;
    }
    if *pos < bytes.len() {
        sink.event(Event::MessageMatched(&line[*pos..]))?;
    }

    Ok(())
}

/// One `[SD-ID param="value" ...]` element.
fn sd_element<S: EventSink>(line: &str, pos: &mut usize, sink: &mut S) -> Result<(), DriveError> {
    let bytes = line.as_bytes();
    debug_assert_eq!(bytes.get(*pos), Some(&b'['));
    *pos += 1;

    let start = *pos;
    while *pos < bytes.len() && bytes[*pos] != b' ' && bytes[*pos] != b']' {
        *pos += 1;
    }
    if *pos >= bytes.len() {
        return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
    }
    sink.event(Event::StructuredDataOpened(&line[start..*pos]))?;

    loop {
        match bytes.get(*pos) {
            Some(&b']') => {
                *pos += 1;
                sink.event(Event::StructuredDataClosed)?;
                return Ok(());
            }
            Some(&b' ') => {
                *pos += 1;
                let name_start = *pos;
                while *pos < bytes.len()
                    && bytes[*pos] != b'='
                    && bytes[*pos] != b']'
                    && bytes[*pos] != b' '
                {
                    *pos += 1;
                }
                if bytes.get(*pos) != Some(&b'=') {
                    return Err(syntax(SyntaxErrorKind::ExpectedChar('='), *pos));
                }
                let name = &line[name_start..*pos];
                *pos += 1;
                let value = param_value(line, pos)?;
                sink.event(Event::StructuredDataParam { name, value })?;
            }
            Some(_) => return Err(syntax(SyntaxErrorKind::ExpectedChar(']'), *pos)),
            None => return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos)),
        }
    }
}

/// A quoted PARAM-VALUE, returned in raw escaped form. A backslash shields
/// the following byte from terminating the string, which is exactly the
/// scanning rule the three RFC escapes need.
///
/// Emitters are seen closing and reopening the quotes mid-value, e.g.
/// `eventSource="Other \"so called \" "Application"`. A quote therefore
/// only ends the value when the next byte is a parameter boundary (space,
/// `]` or end of line); a bare quote anywhere else splices the following
/// chunk onto the value and stays in the returned slice for the builder
/// to drop.
fn param_value<'a>(line: &'a str, pos: &mut usize) -> Result<&'a str, DriveError> {
    let bytes = line.as_bytes();
    if bytes.get(*pos) != Some(&b'"') {
        return Err(syntax(SyntaxErrorKind::ExpectedChar('"'), *pos));
    }
    *pos += 1;

    let start = *pos;
    let mut escaped = false;
    while *pos < bytes.len() {
        let ch = bytes[*pos];
        if escaped {
            escaped = false;
        } else if ch == b'\\' {
            escaped = true;
        } else if ch == b'"' {
            match bytes.get(*pos + 1) {
                None | Some(&b' ') | Some(&b']') => {
                    let value = &line[start..*pos];
                    *pos += 1;
                    return Ok(value);
                }
                Some(_) => {}
            }
        }
        *pos += 1;
    }

    Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos))
}
