//! Parser for [RFC 5424](https://tools.ietf.org/html/rfc5424) and
//! [RFC 3164](https://tools.ietf.org/html/rfc3164) Syslog lines, including
//! the octet-counted [RFC 6587](https://tools.ietf.org/html/rfc6587)
//! framing and the Heroku HTTPS log drain variant.
//!
//! A [`SyslogParser`] turns one text line at a time into a
//! [`SyslogRecord`]: a map of header fields plus the ordered structured
//! data groups, with parameter values escape-decoded. The grammar accepts
//! more than strictly conforming input; what it accepts but the RFC
//! forbids is reported as a [`Deviation`], each kind individually
//! allow-listable on the builder.
//!
//! # Example
//!
//! ```
//! use simple_syslog::{Specification, SyslogParser};
//!
//! let mut parser = SyslogParser::with_specification(Specification::Rfc5424);
//! let record = parser
//!     .parse("<78>1 2016-01-15T00:04:01+00:00 host1 CROND 10391 - [meta sequenceId=\"29\"] some_message")
//!     .unwrap();
//!
//! assert_eq!(record.field("syslog.header.hostName"), Some("host1"));
//! assert_eq!(record.sd_element("meta").unwrap().param("sequenceId"), Some("29"));
//! ```
//!
//! For whole streams there are three consumption modes: [`SyslogParser::generate`]
//! (lazy pull iterator), [`SyslogParser::consume_stream`] (callback, stops at the
//! first failure) and [`SyslogParser::consume_stream_with_errors`] (callback with
//! per-line failure isolation).

mod builder;
mod error;
mod event;
mod facility;
mod keys;
mod parser;
mod record;
pub mod rfc3164;
pub mod rfc5424;
mod severity;
mod specification;
pub mod timestamp;

pub use builder::{Builder, BuilderConfig, DefaultBuilder, NilPolicy, NIL_TOKEN};
pub use error::{BuildError, Deviation, DriveError, Error, SyntaxError, SyntaxErrorKind};
pub use event::{Event, EventSink};
pub use facility::Facility;
pub use keys::{FieldKey, KeyRegistry};
pub use parser::{Records, SyslogParser};
pub use record::{SdElement, SyslogRecord};
pub use severity::Severity;
pub use specification::Specification;
