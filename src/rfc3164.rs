//! Hand-written recursive-descent grammar for BSD syslog (RFC 3164)
//! lines.
//!
//! RFC 3164 describes observed behavior rather than a protocol, so this
//! grammar is lenient where emitters are known to differ: PRI is optional
//! (the builder raises the deviation), the day of month may carry the old
//! two-space padding, a year may follow the time, and the `tag[pid]:` part
//! is optional because plenty of devices send a bare message after the
//! hostname. The timestamp is matched by shape only; the month name and
//! field ranges are builder policy.

use crate::error::{DriveError, SyntaxError, SyntaxErrorKind};
use crate::event::{Event, EventSink};
use crate::keys::FieldKey;
use crate::rfc5424::{octet_prefix, pri};

fn syntax(kind: SyntaxErrorKind, position: usize) -> DriveError {
    DriveError::Syntax(SyntaxError { kind, position })
}

/// Entry point for unframed RFC 3164 lines.
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

fn message_body<S: EventSink>(line: &str, pos: &mut usize, sink: &mut S) -> Result<(), DriveError> {
    let bytes = line.as_bytes();

    pri(line, pos, sink)?;

    let raw = timestamp(line, pos)?;
    sink.event(Event::FieldMatched(FieldKey::Timestamp, raw))?;

    if bytes.get(*pos) != Some(&b' ') {
        return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
    }
    *pos += 1;

    let start = *pos;
    while *pos < bytes.len() && bytes[*pos] != b' ' {
        *pos += 1;
    }
    if *pos == start {
        return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos));
    }
    sink.event(Event::FieldMatched(FieldKey::Hostname, &line[start..*pos]))?;

    if *pos >= bytes.len() {
        return Ok(());
    }
    *pos += 1;

    tag(line, pos, sink)?;

    if *pos < bytes.len() {
        sink.event(Event::MessageMatched(&line[*pos..]))?;
    }

    Ok(())
}

/// `Mmm dd hh:mm:ss`, optionally followed by a four-digit year. Returned
/// as one raw slice; no range checking happens here.
fn timestamp<'a>(line: &'a str, pos: &mut usize) -> Result<&'a str, DriveError> {
    let bytes = line.as_bytes();
    let start = *pos;

    for _ in 0..3 {
        match bytes.get(*pos) {
            Some(ch) if ch.is_ascii_alphabetic() => *pos += 1,
            _ => return Err(syntax(SyntaxErrorKind::UnexpectedEndOfInput, *pos)),
        }
    }

    if bytes.get(*pos) != Some(&b' ') {
        return Err(syntax(SyntaxErrorKind::ExpectedChar(' '), *pos));
    }
    *pos += 1;
    // old format pads a single-digit day to two columns
    if bytes.get(*pos) == Some(&b' ') {
        *pos += 1;
    }

    let day_digits = digits(bytes, pos);
    if day_digits == 0 || day_digits > 2 {
        return Err(syntax(SyntaxErrorKind::ExpectedChar(' '), *pos));
    }

    if bytes.get(*pos) != Some(&b' ') {
        return Err(syntax(SyntaxErrorKind::ExpectedChar(' '), *pos));
    }
    *pos += 1;

    for group in 0..3 {
        if digits(bytes, pos) != 2 {
            return Err(syntax(SyntaxErrorKind::ExpectedChar(':'), *pos));
        }
        if group < 2 {
            if bytes.get(*pos) != Some(&b':') {
                return Err(syntax(SyntaxErrorKind::ExpectedChar(':'), *pos));
            }
            *pos += 1;
        }
    }

    // optional year, e.g. `Oct 22 10:52:01 1990`
    if bytes.get(*pos) == Some(&b' ') {
        let mut ahead = *pos + 1;
        let run = digits(bytes, &mut ahead);
        if run == 4 && (ahead >= bytes.len() || bytes[ahead] == b' ') {
            *pos = ahead;
        }
    }

    Ok(&line[start..*pos])
}

fn digits(bytes: &[u8], pos: &mut usize) -> usize {
    let start = *pos;
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        *pos += 1;
    }
    *pos - start
}

/// The classic `tag:` or `tag[pid]:` prefix of the free-text part. Emits
/// nothing when the message has no tag; the position is only advanced past
/// text that was actually recognized as one.
fn tag<S: EventSink>(line: &str, pos: &mut usize, sink: &mut S) -> Result<(), DriveError> {
    let bytes = line.as_bytes();
    let start = *pos;

    let mut idx = *pos;
    while idx < bytes.len() && bytes[idx] != b' ' && bytes[idx] != b':' && bytes[idx] != b'[' {
        idx += 1;
    }
    if idx == start {
        return Ok(());
    }

    match bytes.get(idx) {
        Some(&b':') => {
            sink.event(Event::FieldMatched(FieldKey::AppName, &line[start..idx]))?;
            *pos = idx + 1;
            if bytes.get(*pos) == Some(&b' ') {
                *pos += 1;
            }
        }
        Some(&b'[') => {
            let pid_start = idx + 1;
            let mut pid_end = pid_start;
            while pid_end < bytes.len() && bytes[pid_end] != b']' && bytes[pid_end] != b' ' {
                pid_end += 1;
            }
            // only `tag[pid]:` counts; anything else is message text
            if bytes.get(pid_end) != Some(&b']') || bytes.get(pid_end + 1) != Some(&b':') {
                return Ok(());
            }
            sink.event(Event::FieldMatched(FieldKey::AppName, &line[start..idx]))?;
            sink.event(Event::FieldMatched(FieldKey::ProcId, &line[pid_start..pid_end]))?;
            *pos = pid_end + 2;
            if bytes.get(*pos) == Some(&b' ') {
                *pos += 1;
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl EventSink for Recorder {
        fn event(&mut self, event: Event<'_>) -> Result<(), BuildError> {
            self.0.push(match event {
                Event::FieldMatched(key, value) => format!("{key:?}={value}"),
                Event::MessageMatched(text) => format!("msg:{text}"),
                other => format!("{other:?}"),
            });
            Ok(())
        }
    }

    #[test]
    fn classic_tagged_line() {
        let mut recorder = Recorder::default();
        syslog_msg(
            "<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8",
            &mut recorder,
        )
        .unwrap();
        assert_eq!(
            recorder.0,
            vec![
                "Pri=34",
                "Timestamp=Oct 11 22:14:15",
                "Hostname=mymachine",
                "AppName=su",
                "msg:'su root' failed for lonvick on /dev/pts/8",
            ]
        );
    }

    #[test]
    fn tag_with_pid() {
        let mut recorder = Recorder::default();
        syslog_msg("<134>Feb 18 20:53:31 haproxy haproxy[376]: I am a message", &mut recorder)
            .unwrap();
        assert!(recorder.0.contains(&"AppName=haproxy".to_owned()));
        assert!(recorder.0.contains(&"ProcId=376".to_owned()));
        assert_eq!(recorder.0.last().unwrap(), "msg:I am a message");
    }

    #[test]
    fn untagged_line_with_padded_day() {
        let mut recorder = Recorder::default();
        syslog_msg("<13>Feb  5 17:32:18 10.0.0.99 Use the BFG!", &mut recorder).unwrap();
        assert_eq!(
            recorder.0,
            vec![
                "Pri=13",
                "Timestamp=Feb  5 17:32:18",
                "Hostname=10.0.0.99",
                "msg:Use the BFG!",
            ]
        );
    }

    #[test]
    fn timestamp_with_year() {
        let mut recorder = Recorder::default();
        syslog_msg("<0>Oct 22 10:52:01 1990 scapegoat.dmz.example.org sched[0]: That's All Folks!", &mut recorder)
            .unwrap();
        assert_eq!(recorder.0[1], "Timestamp=Oct 22 10:52:01 1990");
        assert_eq!(recorder.0[2], "Hostname=scapegoat.dmz.example.org");
    }

    #[test]
    fn missing_pri_still_tokenizes() {
        let mut recorder = Recorder::default();
        syslog_msg("Oct 11 22:14:15 mymachine su: hello", &mut recorder).unwrap();
        assert_eq!(recorder.0[0], "Timestamp=Oct 11 22:14:15");
    }

    #[test]
    fn octet_framed_line() {
        let mut recorder = Recorder::default();
        octet_prefixed("42 <34>Oct 11 22:14:15 mymachine su: hello", &mut recorder).unwrap();
        assert_eq!(recorder.0[0], "Pri=34");
    }

    #[test]
    fn rfc5424_line_is_rejected() {
        let mut recorder = Recorder::default();
        let err = syslog_msg("<34>1 2003-10-11T22:14:15.003Z mymachine su - - - hi", &mut recorder)
            .unwrap_err();
        assert!(matches!(err, DriveError::Syntax(_)));
    }
}
