use crate::error::Error;

/// Canonical identifier for every header field a record can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Pri = 0,
    Facility = 1,
    Severity = 2,
    Version = 3,
    Timestamp = 4,
    Hostname = 5,
    AppName = 6,
    ProcId = 7,
    MsgId = 8,
    Message = 9,
}

impl FieldKey {
    pub const ALL: [FieldKey; 10] = [
        FieldKey::Pri,
        FieldKey::Facility,
        FieldKey::Severity,
        FieldKey::Version,
        FieldKey::Timestamp,
        FieldKey::Hostname,
        FieldKey::AppName,
        FieldKey::ProcId,
        FieldKey::MsgId,
        FieldKey::Message,
    ];

    /// RFC-conventional output key.
    pub fn default_name(self) -> &'static str {
        match self {
            FieldKey::Pri => "syslog.header.pri",
            FieldKey::Facility => "syslog.header.facility",
            FieldKey::Severity => "syslog.header.severity",
            FieldKey::Version => "syslog.header.version",
            FieldKey::Timestamp => "syslog.header.timestamp",
            FieldKey::Hostname => "syslog.header.hostName",
            FieldKey::AppName => "syslog.header.appName",
            FieldKey::ProcId => "syslog.header.procId",
            FieldKey::MsgId => "syslog.header.msgId",
            FieldKey::Message => "syslog.message",
        }
    }
}

/// Maps every [`FieldKey`] to the string it appears under in a record.
///
/// The mapping is total by construction: a registry always resolves all ten
/// keys, and two keys sharing one output string is rejected when the
/// registry is built, never per line.
#[derive(Clone, Debug)]
pub struct KeyRegistry {
    names: [String; 10],
}

impl Default for KeyRegistry {
    fn default() -> Self {
        KeyRegistry {
            names: FieldKey::ALL.map(|key| key.default_name().to_owned()),
        }
    }
}

impl KeyRegistry {
    /// Build a registry from the defaults with some keys renamed.
    pub fn with_overrides<I>(overrides: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (FieldKey, String)>,
    {
        let mut names = FieldKey::ALL.map(|key| key.default_name().to_owned());
        for (key, name) in overrides {
            names[key as usize] = name;
        }

        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(Error::DuplicateOutputKey { key: name.clone() });
            }
        }

        Ok(KeyRegistry { names })
    }

    pub fn lookup(&self, key: FieldKey) -> &str {
        &self.names[key as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKey, KeyRegistry};
    use crate::error::Error;

    #[test]
    fn default_is_total() {
        let keys = KeyRegistry::default();
        for key in FieldKey::ALL {
            assert!(!keys.lookup(key).is_empty());
        }
        assert_eq!(keys.lookup(FieldKey::Message), "syslog.message");
    }

    #[test]
    fn override_renames_one_key() {
        let keys =
            KeyRegistry::with_overrides([(FieldKey::Hostname, "host".to_owned())]).unwrap();
        assert_eq!(keys.lookup(FieldKey::Hostname), "host");
        assert_eq!(keys.lookup(FieldKey::AppName), "syslog.header.appName");
    }

    #[test]
    fn colliding_output_keys_are_rejected() {
        let err = KeyRegistry::with_overrides([
            (FieldKey::Hostname, "host".to_owned()),
            (FieldKey::AppName, "host".to_owned()),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateOutputKey { key } if key == "host"));
    }
}
