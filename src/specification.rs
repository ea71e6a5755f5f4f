/// Which syslog specification a parser accepts. The variant selects the
/// grammar entry point and the transport framing, and tells the builder
/// which header parts are mandatory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specification {
    Rfc3164,
    Rfc5424,
    /// RFC 3164 body behind RFC 6587 octet-counted framing.
    Rfc6587Rfc3164,
    /// RFC 5424 body behind RFC 6587 octet-counted framing.
    Rfc6587Rfc5424,
    /// RFC 5424 body as delivered by a Heroku HTTPS log drain: no framing,
    /// msgid and structured data frequently absent.
    HerokuHttpsLogDrain,
}

impl Specification {
    /// Lines are prefixed with their byte count per RFC 6587.
    pub fn octet_framed(self) -> bool {
        matches!(
            self,
            Specification::Rfc6587Rfc3164 | Specification::Rfc6587Rfc5424
        )
    }

    /// The header carries a version token, msgid and structured data slot.
    pub(crate) fn is_5424(self) -> bool {
        matches!(
            self,
            Specification::Rfc5424
                | Specification::Rfc6587Rfc5424
                | Specification::HerokuHttpsLogDrain
        )
    }

    /// A missing structured data block (not even the nil `-`) is a
    /// deviation. The Heroku drain habitually drops the block entirely, so
    /// it is exempt.
    pub(crate) fn requires_structured_data(self) -> bool {
        matches!(
            self,
            Specification::Rfc5424 | Specification::Rfc6587Rfc5424
        )
    }
}
