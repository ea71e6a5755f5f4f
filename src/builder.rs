//! Record accumulation: the builder contract and its default
//! implementation.
//!
//! A builder is constructed once per parser and reused across many lines;
//! `reset` between lines is what keeps one line's state from leaking into
//! the next record.

use std::collections::HashMap;
use std::mem;

use crate::error::{BuildError, Deviation};
use crate::keys::{FieldKey, KeyRegistry};
use crate::record::{SdElement, SyslogRecord};
use crate::specification::Specification;
use crate::timestamp;

/// The nil token RFC 5424 uses for an absent optional header field.
pub const NIL_TOKEN: &str = "-";

/// How an absent optional field (the nil `-` on the wire) appears in the
/// output record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NilPolicy {
    /// Leave the key out of the record entirely.
    #[default]
    Omit,
    /// Store this sentinel string under the key.
    Sentinel(String),
}

/// Configuration for [`DefaultBuilder`], fixed for the builder's lifetime.
#[derive(Clone, Debug)]
pub struct BuilderConfig {
    pub specification: Specification,
    pub keys: KeyRegistry,
    pub nil_policy: NilPolicy,
    /// Deviation kinds that downgrade from failure to best-effort.
    pub allowed_deviations: Vec<Deviation>,
}

impl BuilderConfig {
    pub fn new(specification: Specification) -> Self {
        BuilderConfig {
            specification,
            keys: KeyRegistry::default(),
            nil_policy: NilPolicy::default(),
            allowed_deviations: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Created,
    Started,
    Accumulating,
    Completed,
    Produced,
}

impl State {
    fn as_str(self) -> &'static str {
        match self {
            State::Created => "created",
            State::Started => "started",
            State::Accumulating => "accumulating",
            State::Completed => "completed",
            State::Produced => "produced",
        }
    }
}

/// Stateful accumulator a grammar drive fills in, one line at a time.
///
/// Lifecycle: `Created → Started → Accumulating → Completed → Produced`,
/// with `reset` returning to `Created` from anywhere. Operations called
/// out of order return [`BuildError::Lifecycle`] rather than corrupting
/// the record.
pub trait Builder {
    type Output;

    /// Discard all accumulated state. Callable in any state; idempotent.
    fn reset(&mut self);

    /// Prepare fresh per-line state.
    fn start(&mut self) -> Result<(), BuildError>;

    /// Accept one header field token, nil `-` included.
    fn set_field(&mut self, key: FieldKey, value: &str) -> Result<(), BuildError>;

    fn open_sd_element(&mut self, id: &str) -> Result<(), BuildError>;

    /// Accept one structured data parameter in raw escaped form.
    fn add_sd_param(&mut self, name: &str, value: &str) -> Result<(), BuildError>;

    fn close_sd_element(&mut self) -> Result<(), BuildError>;

    /// The explicit `-` standing in for the structured data block.
    fn nil_structured_data(&mut self) -> Result<(), BuildError>;

    /// Run the cross-field checks deferred from per-field validation
    /// (missing-part deviations, PRI decomposition).
    fn complete(&mut self) -> Result<(), BuildError>;

    /// Hand the finished record to the caller. Only valid after
    /// `complete`; the builder keeps no ownership of the returned record.
    fn produce(&mut self) -> Result<Self::Output, BuildError>;
}

/// Decode the three escape pairs RFC 5424 §6.3.3 defines for PARAM-VALUE.
/// Any other backslash sequence is not an escape and passes through as the
/// literal two characters.
///
/// A bare (unescaped) quote in `raw` marks a value the grammar spliced
/// from several quoted chunks, which no conforming emitter produces.
/// Such a value is kept verbatim apart from dropping the chunk-splitting
/// quotes themselves: `Other \"so called \" "Application` comes out as
/// `Other \"so called \" Application`, backslashes and all.
fn decode_param_value(raw: &str) -> String {
    if !raw.contains('\\') && !raw.contains('"') {
        return raw.to_owned();
    }

    if has_bare_quote(raw) {
        let mut spliced = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '"' => {}
                '\\' => {
                    spliced.push('\\');
                    if let Some(next) = chars.next() {
                        spliced.push(next);
                    }
                }
                _ => spliced.push(ch),
            }
        }
        return spliced;
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.peek() {
            Some(&next) if next == '"' || next == '\\' || next == ']' => {
                decoded.push(next);
                chars.next();
            }
            _ => decoded.push('\\'),
        }
    }
    decoded
}

fn has_bare_quote(raw: &str) -> bool {
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' => return true,
            _ => {}
        }
    }
    false
}

/// Builder producing [`SyslogRecord`]s.
pub struct DefaultBuilder {
    config: BuilderConfig,
    state: State,
    pri: Option<u16>,
    saw_version: bool,
    saw_structured_data: bool,
    fields: HashMap<String, String>,
    structured_data: Vec<SdElement>,
    open_element: Option<SdElement>,
}

impl DefaultBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        DefaultBuilder {
            config,
            state: State::Created,
            pri: None,
            saw_version: false,
            saw_structured_data: false,
            fields: HashMap::new(),
            structured_data: Vec::new(),
            open_element: None,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn accumulate(&mut self, operation: &'static str) -> Result<(), BuildError> {
        match self.state {
            State::Started | State::Accumulating => {
                self.state = State::Accumulating;
                Ok(())
            }
            state => Err(BuildError::Lifecycle {
                operation,
                state: state.as_str(),
            }),
        }
    }

    fn deviation(&self, kind: Deviation) -> Result<(), BuildError> {
        if self.config.allowed_deviations.contains(&kind) {
            Ok(())
        } else {
            Err(BuildError::Deviation(kind))
        }
    }

    fn put(&mut self, key: FieldKey, value: &str) {
        self.fields
            .insert(self.config.keys.lookup(key).to_owned(), value.to_owned());
    }

    fn put_nil(&mut self, key: FieldKey) {
        match &self.config.nil_policy {
            NilPolicy::Omit => {}
            NilPolicy::Sentinel(sentinel) => {
                let sentinel = sentinel.clone();
                self.fields
                    .insert(self.config.keys.lookup(key).to_owned(), sentinel);
            }
        }
    }
}

impl Builder for DefaultBuilder {
    type Output = SyslogRecord;

    fn reset(&mut self) {
        self.state = State::Created;
        self.pri = None;
        self.saw_version = false;
        self.saw_structured_data = false;
        self.fields.clear();
        self.structured_data.clear();
        self.open_element = None;
    }

    fn start(&mut self) -> Result<(), BuildError> {
        if self.state != State::Created {
            return Err(BuildError::Lifecycle {
                operation: "start",
                state: self.state.as_str(),
            });
        }
        self.state = State::Started;
        Ok(())
    }

    fn set_field(&mut self, key: FieldKey, value: &str) -> Result<(), BuildError> {
        self.accumulate("set_field")?;

        match key {
            FieldKey::Pri => {
                // the grammar hands over 1..=3 digits, already range-checked
                self.pri = value.parse::<u16>().ok();
                self.put(FieldKey::Pri, value);
            }
            FieldKey::Version => {
                self.saw_version = true;
                self.put(FieldKey::Version, value);
            }
            FieldKey::Timestamp => {
                if value == NIL_TOKEN {
                    self.put_nil(FieldKey::Timestamp);
                    return Ok(());
                }
                let well_formed = if self.config.specification.is_5424() {
                    timestamp::parse_rfc3339(value).is_ok()
                } else {
                    timestamp::valid_rfc3164(value)
                };
                if !well_formed {
                    self.deviation(Deviation::MalformedTimestamp)?;
                }
                // best effort: the raw token is kept when the deviation is
                // allow-listed
                self.put(FieldKey::Timestamp, value);
            }
            FieldKey::Hostname | FieldKey::AppName | FieldKey::ProcId | FieldKey::MsgId => {
                if value == NIL_TOKEN {
                    self.put_nil(key);
                } else {
                    self.put(key, value);
                }
            }
            FieldKey::Facility | FieldKey::Severity | FieldKey::Message => {
                self.put(key, value);
            }
        }

        Ok(())
    }

    fn open_sd_element(&mut self, id: &str) -> Result<(), BuildError> {
        self.accumulate("open_sd_element")?;
        if self.open_element.is_some() {
            return Err(BuildError::Lifecycle {
                operation: "open_sd_element",
                state: "element already open",
            });
        }
        self.saw_structured_data = true;
        self.open_element = Some(SdElement::new(id));
        Ok(())
    }

    fn add_sd_param(&mut self, name: &str, value: &str) -> Result<(), BuildError> {
        self.accumulate("add_sd_param")?;
        match self.open_element.as_mut() {
            Some(element) => {
                element.set_param(name, decode_param_value(value));
                Ok(())
            }
            None => Err(BuildError::Lifecycle {
                operation: "add_sd_param",
                state: "no element open",
            }),
        }
    }

    fn close_sd_element(&mut self) -> Result<(), BuildError> {
        self.accumulate("close_sd_element")?;
        match self.open_element.take() {
            Some(element) => {
                // a repeated SD-ID overwrites the earlier element in place
                match self
                    .structured_data
                    .iter_mut()
                    .find(|existing| existing.id() == element.id())
                {
                    Some(existing) => *existing = element,
                    None => self.structured_data.push(element),
                }
                Ok(())
            }
            None => Err(BuildError::Lifecycle {
                operation: "close_sd_element",
                state: "no element open",
            }),
        }
    }

    fn nil_structured_data(&mut self) -> Result<(), BuildError> {
        self.accumulate("nil_structured_data")?;
        self.saw_structured_data = true;
        Ok(())
    }

    fn complete(&mut self) -> Result<(), BuildError> {
        // Started counts as an empty accumulation
        self.accumulate("complete")?;
        if self.open_element.is_some() {
            return Err(BuildError::Lifecycle {
                operation: "complete",
                state: "element still open",
            });
        }

        let specification = self.config.specification;

        if self.pri.is_none() {
            self.deviation(Deviation::MissingPri)?;
            self.put_nil(FieldKey::Pri);
            self.put_nil(FieldKey::Facility);
            self.put_nil(FieldKey::Severity);
        }

        if specification.is_5424() && !self.saw_version {
            self.deviation(Deviation::MissingVersion)?;
            self.put_nil(FieldKey::Version);
        }

        if specification.requires_structured_data() && !self.saw_structured_data {
            self.deviation(Deviation::MissingStructuredData)?;
        }

        // PRI decomposition deferred from set_field: severity is PRI mod 8,
        // facility PRI div 8
        if let Some(pri) = self.pri {
            self.put(FieldKey::Facility, &(pri >> 3).to_string());
            self.put(FieldKey::Severity, &(pri & 0x7).to_string());
        }

        self.state = State::Completed;
        Ok(())
    }

    fn produce(&mut self) -> Result<SyslogRecord, BuildError> {
        if self.state != State::Completed {
            return Err(BuildError::Lifecycle {
                operation: "produce",
                state: self.state.as_str(),
            });
        }
        self.state = State::Produced;
        Ok(SyslogRecord::new(
            mem::take(&mut self.fields),
            mem::take(&mut self.structured_data),
        ))
    }
}
