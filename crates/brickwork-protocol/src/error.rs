//! Error type for the protocol layer.

/// A payload that could not be decoded, or an invalid value inside one.
///
/// Every variant maps to "malformed payload" at the dispatch layer: the
/// message is dropped and the peer never hears about it.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The payload ended before the layout was fully read.
    #[error("unexpected end of payload")]
    UnexpectedEof,

    /// The leading tag byte is not a known message type.
    #[error("unknown message tag {0}")]
    UnknownTag(u8),

    /// A field held a value outside its enumeration or constraints.
    #[error("invalid {field} value {value}")]
    InvalidValue { field: &'static str, value: u32 },

    /// The layout was fully read but bytes remain. Rejected so that
    /// `encode(decode(bytes)) == bytes` holds for every accepted payload.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    /// A length-prefixed string was not valid UTF-8.
    #[error("string field is not valid utf-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
