use crate::error::BuildError;
use crate::keys::FieldKey;

/// One grammar production match. A grammar entry point emits these in
/// source order; parameters always arrive between the opening and closing
/// events of their element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// A header field token, exactly as it appeared (nil `-` included).
    FieldMatched(FieldKey, &'a str),
    StructuredDataOpened(&'a str),
    /// Parameter value is still in its raw escaped form here; decoding is
    /// the builder's job.
    StructuredDataParam { name: &'a str, value: &'a str },
    StructuredDataClosed,
    /// The explicit `-` standing in for the whole structured data block,
    /// as opposed to the block being absent entirely.
    StructuredDataNil,
    MessageMatched(&'a str),
}

/// Consumes the ordered event sequence a grammar entry point emits.
pub trait EventSink {
    fn event(&mut self, event: Event<'_>) -> Result<(), BuildError>;
}
