//! In-memory representation of a single parsed syslog line.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::facility::Facility;
use crate::keys::FieldKey;
use crate::severity::Severity;
use crate::timestamp;

/// One structured data element: an SD-ID plus its parameters, in
/// appearance order. Parameter values are already escape-decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SdElement {
    id: String,
    params: Vec<(String, String)>,
}

impl SdElement {
    pub(crate) fn new(id: &str) -> Self {
        SdElement {
            id: id.to_owned(),
            params: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// A repeated parameter name overwrites the earlier value in place,
    /// keeping the position of its first appearance.
    pub(crate) fn set_param(&mut self, name: &str, value: String) {
        match self.params.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((name.to_owned(), value)),
        }
    }
}

/// Immutable output of one successful parse.
///
/// `fields` holds only the header fields the grammar matched and the
/// builder accepted; under the default nil policy an absent optional field
/// has no entry at all. Structured data keeps source order for both
/// elements and parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyslogRecord {
    fields: HashMap<String, String>,
    structured_data: Vec<SdElement>,
}

impl SyslogRecord {
    pub(crate) fn new(fields: HashMap<String, String>, structured_data: Vec<SdElement>) -> Self {
        SyslogRecord {
            fields,
            structured_data,
        }
    }

    /// Look a field up by its output key string.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn structured_data(&self) -> &[SdElement] {
        &self.structured_data
    }

    pub fn sd_element(&self, id: &str) -> Option<&SdElement> {
        self.structured_data.iter().find(|element| element.id == id)
    }

    /// Typed severity, assuming the default key registry names.
    pub fn severity(&self) -> Option<Severity> {
        self.field(FieldKey::Severity.default_name())
            .and_then(|value| value.parse::<u8>().ok())
            .and_then(Severity::from_int)
    }

    /// Typed facility, assuming the default key registry names.
    pub fn facility(&self) -> Option<Facility> {
        self.field(FieldKey::Facility.default_name())
            .and_then(|value| value.parse::<u8>().ok())
            .and_then(Facility::from_int)
    }

    /// The header timestamp as a typed value, assuming the default key
    /// registry names and an RFC 3339 token. The raw token stays available
    /// through [`SyslogRecord::field`].
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.field(FieldKey::Timestamp.default_name())
            .and_then(|token| timestamp::parse_rfc3339(token).ok())
    }
}
