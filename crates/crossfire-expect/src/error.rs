//! Error types for expected-result parsing.

/// Errors raised while parsing one expected-result field.
///
/// All of these are local to the field being parsed; callers decide whether
/// a failure affects anything beyond it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpectError {
    /// The text does not have the `<left><operator><right>` shape.
    #[error("'{text}' does not match the expected-result structure '{pattern}'")]
    Grammar { text: String, pattern: String },

    /// The type token names no known document type.
    #[error("unknown document type '{token}'")]
    UnknownDocType { token: String },

    /// The value does not satisfy the document type's normalization pattern.
    #[error("value '{value}' does not match pattern '{pattern}' of document type {doc_type}")]
    MalformedDocumentValue {
        value: String,
        pattern: String,
        doc_type: String,
    },
}
