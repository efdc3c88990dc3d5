//! # crossfire-expect
//!
//! The expected-result grammar shared by every participant's test.
//!
//! A test's full text reads `<input> <operator> <documents>`, for example
//!
//! ```text
//! Passport 01 23 456789 == PASSPORT_RF:0123456789
//! ```
//!
//! The operator picks one of four match policies:
//!
//! ```text
//!            ordered (=)   unordered (?)
//! exact  =      ==             =?
//! subset ~      ~=             ~?
//! ```
//!
//! Each document is `TYPE[+|-]:value`, where a trailing `+`/`-` on the type
//! asserts that the value is valid/invalid. Values must satisfy the
//! normalization pattern of their [`DocType`].

pub mod doc_type;
pub mod document;
pub mod error;
pub mod expected;

pub use doc_type::DocType;
pub use document::{DOCUMENT_SEPARATOR, ExtractedDocument, TYPE_VALUE_SEPARATOR, parse_documents};
pub use error::ExpectError;
pub use expected::{ExpectedResult, GRAMMAR_PATTERN, MatchPolicy};
