use std::io::{BufReader, Cursor, Seek, SeekFrom, Write};
use std::ops::ControlFlow;

use simple_syslog::{DefaultBuilder, Error, Specification, SyslogParser};

fn parser(specification: Specification) -> SyslogParser<DefaultBuilder> {
    SyslogParser::with_specification(specification)
}

const VALID_LINES: &str = "\
<34>1 2003-10-11T22:14:15.003Z host1 su - ID47 - one
<34>1 2003-10-11T22:14:16.003Z host2 su - ID48 - two
<34>1 2003-10-11T22:14:17.003Z host3 su - ID49 - three
";

#[test]
fn generate_yields_records_in_source_order() {
    let mut parser = parser(Specification::Rfc5424);
    let hosts: Vec<String> = parser
        .generate(Cursor::new(VALID_LINES))
        .map(|item| {
            item.unwrap()
                .field("syslog.header.hostName")
                .unwrap()
                .to_owned()
        })
        .collect();
    assert_eq!(hosts, ["host1", "host2", "host3"]);
}

#[test]
fn generate_from_one_line_file() {
    let mut file = tempfile::tempfile().unwrap();
    writeln!(file, "<34>1 2003-10-11T22:14:15.003Z host1 su - ID47 - one").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut parser = parser(Specification::Rfc5424);
    let records: Vec<_> = parser.generate(BufReader::new(file)).collect();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_ok());
}

#[test]
fn generate_terminates_at_first_failure() {
    let input = "\
<34>1 2003-10-11T22:14:15.003Z host1 su - ID47 - one
<4096>1 - - - - - -
<34>1 2003-10-11T22:14:17.003Z host3 su - ID49 - three
";
    let mut parser = parser(Specification::Rfc5424);
    let items: Vec<_> = parser.generate(Cursor::new(input)).collect();

    // the failing line ends the sequence; host3 is never reached
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(Error::Parse { .. })));
}

#[test]
fn consume_stream_stops_at_first_failure() {
    let input = "\
<34>1 2003-10-11T22:14:15.003Z host1 su - ID47 - one
<4096>1 - - - - - -
<34>1 2003-10-11T22:14:17.003Z host3 su - ID49 - three
";
    let mut parser = parser(Specification::Rfc5424);
    let mut consumed = 0;
    let result = parser.consume_stream(Cursor::new(input), |_| {
        consumed += 1;
        ControlFlow::Continue(())
    });

    assert!(matches!(result, Err(Error::Parse { .. })));
    assert_eq!(consumed, 1);
}

#[test]
fn consume_stream_can_be_stopped_by_the_consumer() {
    let mut parser = parser(Specification::Rfc5424);
    let mut consumed = 0;
    parser
        .consume_stream(Cursor::new(VALID_LINES), |_| {
            consumed += 1;
            if consumed == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
    assert_eq!(consumed, 2);
}

#[test]
fn consume_stream_with_errors_reads_every_line() {
    let input = "\
<34>1 2003-10-11T22:14:15.003Z host1 su - ID47 - one
<4096>1 - - - - - -
<34>1 2003-10-11T22:14:16.003Z host2 su - ID48 - two
<34>1 2003-10-11T22:14:18.003Z host4
<34>1 2003-10-11T22:14:17.003Z host3 su - ID49 - three
";
    let mut parser = parser(Specification::Rfc5424);
    let mut records = Vec::new();
    let mut errors = Vec::new();
    parser
        .consume_stream_with_errors(
            Cursor::new(input),
            |record| {
                records.push(
                    record
                        .field("syslog.header.hostName")
                        .unwrap()
                        .to_owned(),
                );
                ControlFlow::Continue(())
            },
            |line, err| errors.push((line.to_owned(), err)),
        )
        .unwrap();

    assert_eq!(records, ["host1", "host2", "host3"]);
    assert_eq!(errors.len(), 2);
    assert_eq!(records.len() + errors.len(), 5);
    assert_eq!(errors[0].0, "<4096>1 - - - - - -");
    assert_eq!(errors[1].0, "<34>1 2003-10-11T22:14:18.003Z host4");
    assert!(matches!(errors[0].1, Error::Parse { .. }));
    assert!(matches!(errors[1].1, Error::Parse { .. }));
}

#[test]
fn no_state_leaks_between_lines() {
    let input = "\
<34>1 2003-10-11T22:14:15.003Z host1 su proc1 ID47 [meta seq=\"1\"] one
<34>1 - - - - - -
";
    let mut parser = parser(Specification::Rfc5424);
    let records: Vec<_> = parser
        .generate(Cursor::new(input))
        .map(Result::unwrap)
        .collect();

    let first = &records[0];
    assert_eq!(first.field("syslog.header.hostName"), Some("host1"));
    assert_eq!(first.structured_data().len(), 1);

    let second = &records[1];
    assert_eq!(second.field("syslog.header.hostName"), None);
    assert_eq!(second.field("syslog.header.procId"), None);
    assert_eq!(second.field("syslog.message"), None);
    assert!(second.structured_data().is_empty());
}
