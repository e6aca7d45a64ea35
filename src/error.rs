//! Error types for the certmint library.

use thiserror::Error;

/// Represents errors that can occur in the certmint library.
///
/// This enum provides detailed error messages for various failure scenarios.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Malformed PEM framing (no decodable block in the input).
    #[error("Failed to decode PEM block: {0}")]
    Decode(String),

    /// A PEM label with no registered private-key parser.
    #[error("Unable to determine parser for PEM preamble: {0}")]
    UnknownPreamble(String),

    /// The binary payload does not match the declared key type.
    #[error("Failed to parse private key: {0}")]
    Parse(String),

    /// The key lacks a required capability.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A structured field could not be serialized.
    #[error("Failed to encode data: {0}")]
    Encoding(String),

    /// A cryptographic signing operation failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// A caller-supplied parameter failed validation; rejected before any
    /// cryptographic work.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The underlying primitive failed to generate a key.
    #[error("Key generation error: {0}")]
    KeyGeneration(String),
}

impl From<der::Error> for Error {
    /// DER errors in this crate surface from encode paths; decode paths
    /// map errors explicitly so they carry the parse context.
    fn from(err: der::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for Error {
    fn from(err: x509_cert::spki::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
