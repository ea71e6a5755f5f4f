//! Per-line orchestration and the streaming consumption APIs.
//!
//! A parser is stateless across lines; all per-line state lives in its
//! builder, which is reset before every line. That also means a parser is
//! not safe to share across threads: concurrent `parse` calls on one
//! instance would interleave in the shared builder. Use one parser per
//! worker.

use std::io::BufRead;
use std::ops::ControlFlow;

use crate::builder::{Builder, BuilderConfig, DefaultBuilder};
use crate::error::{BuildError, Error};
use crate::event::{Event, EventSink};
use crate::keys::FieldKey;
use crate::specification::Specification;
use crate::{rfc3164, rfc5424};

/// Binds a grammar event stream to a builder.
struct BuilderListener<'a, B>(&'a mut B);

impl<B: Builder> EventSink for BuilderListener<'_, B> {
    fn event(&mut self, event: Event<'_>) -> Result<(), BuildError> {
        match event {
            Event::FieldMatched(key, value) => self.0.set_field(key, value),
            Event::StructuredDataOpened(id) => self.0.open_sd_element(id),
            Event::StructuredDataParam { name, value } => self.0.add_sd_param(name, value),
            Event::StructuredDataClosed => self.0.close_sd_element(),
            Event::StructuredDataNil => self.0.nil_structured_data(),
            Event::MessageMatched(text) => self.0.set_field(FieldKey::Message, text),
        }
    }
}

/// Parses one line at a time against a fixed specification, producing
/// whatever its builder produces.
pub struct SyslogParser<B> {
    specification: Specification,
    builder: B,
}

impl SyslogParser<DefaultBuilder> {
    /// A parser with a [`DefaultBuilder`] configured for `specification`.
    pub fn with_specification(specification: Specification) -> Self {
        SyslogParser::new(
            specification,
            DefaultBuilder::new(BuilderConfig::new(specification)),
        )
    }
}

impl<B: Builder> SyslogParser<B> {
    /// The builder's own configuration (nil policy, allowed deviations,
    /// key registry) should match `specification`; the parser only decides
    /// the grammar entry point from it.
    pub fn new(specification: Specification, builder: B) -> Self {
        SyslogParser {
            specification,
            builder,
        }
    }

    pub fn specification(&self) -> Specification {
        self.specification
    }

    /// Parse one line into a record.
    ///
    /// A leading byte-order mark and any trailing line terminator are
    /// stripped first. An empty line is an [`Error::EmptyLine`]; a line
    /// the grammar rejects is an [`Error::Parse`]; a grammar-accepted but
    /// noncompliant line is an [`Error::Deviation`] unless the builder
    /// allow-lists that deviation kind.
    pub fn parse(&mut self, line: &str) -> Result<B::Output, Error> {
        self.builder.reset();

        let line = line.trim_end_matches(['\r', '\n']);
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        if line.is_empty() {
            return Err(Error::EmptyLine);
        }

        self.builder.start().map_err(Error::Builder)?;

        let mut listener = BuilderListener(&mut self.builder);
        match self.specification {
            Specification::Rfc3164 => rfc3164::syslog_msg(line, &mut listener),
            Specification::Rfc5424 => rfc5424::syslog_msg(line, &mut listener),
            Specification::Rfc6587Rfc3164 => rfc3164::octet_prefixed(line, &mut listener),
            Specification::Rfc6587Rfc5424 => rfc5424::octet_prefixed(line, &mut listener),
            Specification::HerokuHttpsLogDrain => {
                rfc5424::heroku_https_log_drain(line, &mut listener)
            }
        }
        .map_err(|err| Error::classify(line, err))?;

        self.builder
            .complete()
            .map_err(|err| Error::classify_build(line, err))?;
        self.builder.produce().map_err(Error::Builder)
    }

    /// Parse one line and hand the record to `consumer`. Failures
    /// propagate exactly as for [`SyslogParser::parse`].
    pub fn consume<F>(&mut self, line: &str, mut consumer: F) -> Result<(), Error>
    where
        F: FnMut(B::Output),
    {
        let record = self.parse(line)?;
        consumer(record);
        Ok(())
    }

    /// Lazily parse `source` line by line.
    ///
    /// The returned iterator is forward-only and not restartable: each pull
    /// reads exactly one line, and the first failed line is yielded as an
    /// error after which the iterator is exhausted.
    pub fn generate<R: BufRead>(&mut self, source: R) -> Records<'_, B, R> {
        Records {
            parser: self,
            source,
            done: false,
        }
    }

    /// Parse every line of `source` in order, handing records to
    /// `consumer` until it breaks or the first failure, which is returned
    /// with the remaining lines unread.
    pub fn consume_stream<R, F>(&mut self, mut source: R, mut consumer: F) -> Result<(), Error>
    where
        R: BufRead,
        F: FnMut(B::Output) -> ControlFlow<()>,
    {
        let mut line = String::new();
        loop {
            line.clear();
            if source.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if consumer(self.parse(&line)?).is_break() {
                return Ok(());
            }
        }
    }

    /// Like [`SyslogParser::consume_stream`], but with per-line failure
    /// isolation: a failing line goes to `error_consumer` together with
    /// its original text and processing continues, so the stream is always
    /// read to its end. Only I/O errors on the source still abort.
    pub fn consume_stream_with_errors<R, F, E>(
        &mut self,
        mut source: R,
        mut consumer: F,
        mut error_consumer: E,
    ) -> Result<(), Error>
    where
        R: BufRead,
        F: FnMut(B::Output) -> ControlFlow<()>,
        E: FnMut(&str, Error),
    {
        let mut line = String::new();
        loop {
            line.clear();
            if source.read_line(&mut line)? == 0 {
                return Ok(());
            }
            match self.parse(&line) {
                Ok(record) => {
                    if consumer(record).is_break() {
                        return Ok(());
                    }
                }
                Err(err) => error_consumer(line.trim_end_matches(['\r', '\n']), err),
            }
        }
    }
}

/// Pull iterator over the records of a line source. See
/// [`SyslogParser::generate`].
pub struct Records<'a, B, R> {
    parser: &'a mut SyslogParser<B>,
    source: R,
    done: bool,
}

impl<B: Builder, R: BufRead> Iterator for Records<'_, B, R> {
    type Item = Result<B::Output, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = String::new();
        match self.source.read_line(&mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let item = self.parser.parse(&line);
                if item.is_err() {
                    self.done = true;
                }
                Some(item)
            }
            Err(err) => {
                self.done = true;
                Some(Err(Error::Io(err)))
            }
        }
    }
}
