use simple_syslog::{
    BuilderConfig, DefaultBuilder, Deviation, Error, Facility, Severity, Specification,
    SyslogParser,
};

fn parser(specification: Specification) -> SyslogParser<DefaultBuilder> {
    SyslogParser::with_specification(specification)
}

#[test]
fn parse_classic_bsd_line() {
    let record = parser(Specification::Rfc3164)
        .parse("<34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick on /dev/pts/8")
        .unwrap();

    assert_eq!(record.field("syslog.header.pri"), Some("34"));
    assert_eq!(record.field("syslog.header.facility"), Some("4"));
    assert_eq!(record.field("syslog.header.severity"), Some("2"));
    assert_eq!(record.field("syslog.header.timestamp"), Some("Oct 11 22:14:15"));
    assert_eq!(record.field("syslog.header.hostName"), Some("mymachine"));
    assert_eq!(record.field("syslog.header.appName"), Some("su"));
    assert_eq!(
        record.field("syslog.message"),
        Some("'su root' failed for lonvick on /dev/pts/8")
    );
    assert_eq!(record.severity(), Some(Severity::Crit));
    assert_eq!(record.facility(), Some(Facility::Auth));
    assert!(record.structured_data().is_empty());
}

#[test]
fn parse_tag_with_pid() {
    let record = parser(Specification::Rfc3164)
        .parse("<134>Feb 18 20:53:31 haproxy haproxy[376]: I am a message")
        .unwrap();
    assert_eq!(record.field("syslog.header.appName"), Some("haproxy"));
    assert_eq!(record.field("syslog.header.procId"), Some("376"));
    assert_eq!(record.field("syslog.message"), Some("I am a message"));
}

#[test]
fn parse_untagged_line() {
    let record = parser(Specification::Rfc3164)
        .parse("<13>Feb  5 17:32:18 10.0.0.99 Use the BFG!")
        .unwrap();
    assert_eq!(record.field("syslog.header.timestamp"), Some("Feb  5 17:32:18"));
    assert_eq!(record.field("syslog.header.hostName"), Some("10.0.0.99"));
    assert_eq!(record.field("syslog.header.appName"), None);
    assert_eq!(record.field("syslog.message"), Some("Use the BFG!"));
}

#[test]
fn missing_pri_is_a_deviation() {
    let err = parser(Specification::Rfc3164)
        .parse("Oct 11 22:14:15 mymachine su: hello")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Deviation {
            deviation: Deviation::MissingPri,
            ..
        }
    ));
}

#[test]
fn allow_listed_missing_pri_parses() {
    let mut config = BuilderConfig::new(Specification::Rfc3164);
    config.allowed_deviations = vec![Deviation::MissingPri];
    let mut parser = SyslogParser::new(Specification::Rfc3164, DefaultBuilder::new(config));

    let record = parser.parse("Oct 11 22:14:15 mymachine su: hello").unwrap();
    assert_eq!(record.field("syslog.header.pri"), None);
    assert_eq!(record.field("syslog.header.facility"), None);
    assert_eq!(record.field("syslog.header.severity"), None);
    assert_eq!(record.field("syslog.header.hostName"), Some("mymachine"));
    assert_eq!(record.field("syslog.message"), Some("hello"));
}

#[test]
fn unknown_month_is_a_malformed_timestamp() {
    let err = parser(Specification::Rfc3164)
        .parse("<34>Xxx 11 22:14:15 mymachine su: hello")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Deviation {
            deviation: Deviation::MalformedTimestamp,
            ..
        }
    ));

    let mut config = BuilderConfig::new(Specification::Rfc3164);
    config.allowed_deviations = vec![Deviation::MalformedTimestamp];
    let mut parser = SyslogParser::new(Specification::Rfc3164, DefaultBuilder::new(config));
    let record = parser.parse("<34>Xxx 11 22:14:15 mymachine su: hello").unwrap();
    assert_eq!(record.field("syslog.header.timestamp"), Some("Xxx 11 22:14:15"));
}

#[test]
fn parse_octet_framed_line() {
    let record = parser(Specification::Rfc6587Rfc3164)
        .parse("61 <34>Oct 11 22:14:15 mymachine su: 'su root' failed for lonvick")
        .unwrap();
    assert_eq!(record.field("syslog.header.pri"), Some("34"));
    assert_eq!(record.field("syslog.header.hostName"), Some("mymachine"));
}

#[test]
fn timestamp_with_year_is_kept_raw() {
    let record = parser(Specification::Rfc3164)
        .parse("<0>Oct 22 10:52:01 1990 scapegoat.dmz.example.org sched[0]: That's All Folks!")
        .unwrap();
    assert_eq!(
        record.field("syslog.header.timestamp"),
        Some("Oct 22 10:52:01 1990")
    );
    assert_eq!(
        record.field("syslog.header.hostName"),
        Some("scapegoat.dmz.example.org")
    );
    assert_eq!(record.field("syslog.header.procId"), Some("0"));
}

#[test]
fn rfc5424_line_is_a_parse_failure() {
    let err = parser(Specification::Rfc3164)
        .parse("<34>1 2003-10-11T22:14:15.003Z mymachine su - - - hi")
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}
