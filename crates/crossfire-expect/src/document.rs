//! Typed documents: the unit a participant's extractor reports and a test
//! expects.

use crate::doc_type::DocType;
use crate::error::ExpectError;
use serde::{Deserialize, Serialize};

/// Separator between document descriptors on the right-hand side.
pub const DOCUMENT_SEPARATOR: char = ',';

/// Separator between the type token and the value token of one descriptor.
pub const TYPE_VALUE_SEPARATOR: char = ':';

const VALID_MARKER: char = '+';
const INVALID_MARKER: char = '-';

/// One typed document value.
///
/// The value always satisfies its type's normalization pattern; the only
/// way to obtain an `ExtractedDocument` is through [`ExtractedDocument::new`]
/// or the descriptor parser, both of which check it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    doc_type: DocType,
    value: String,
    is_valid: bool,
    is_valid_setup: bool,
}

impl ExtractedDocument {
    pub fn new(
        doc_type: DocType,
        value: impl Into<String>,
        is_valid: bool,
        is_valid_setup: bool,
    ) -> Result<Self, ExpectError> {
        let value = value.into();
        if !doc_type.accepts(&value) {
            return Err(ExpectError::MalformedDocumentValue {
                value,
                pattern: doc_type.normalize_pattern().to_string(),
                doc_type: doc_type.to_string(),
            });
        }
        Ok(Self {
            doc_type,
            value,
            is_valid,
            is_valid_setup,
        })
    }

    /// A document whose validity was not asserted (defaults to valid).
    pub fn unasserted(doc_type: DocType, value: impl Into<String>) -> Result<Self, ExpectError> {
        Self::new(doc_type, value, true, false)
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Whether validity was explicitly asserted with `+`/`-`.
    pub fn is_valid_setup(&self) -> bool {
        self.is_valid_setup
    }

    /// Whether `actual` satisfies this document used as an expectation.
    ///
    /// Type and value must agree. Validity only participates when this
    /// expectation asserted it.
    pub fn is_satisfied_by(&self, actual: &ExtractedDocument) -> bool {
        self.doc_type == actual.doc_type
            && self.value == actual.value
            && (!self.is_valid_setup || self.is_valid == actual.is_valid)
    }

    /// Parse one `TYPE[+|-]:value` descriptor.
    pub fn parse_descriptor(descriptor: &str) -> Result<Self, ExpectError> {
        let (type_token, value_token) = descriptor
            .split_once(TYPE_VALUE_SEPARATOR)
            .unwrap_or((descriptor, ""));

        let type_token = type_token.trim();
        let (type_name, is_valid, is_valid_setup) =
            if let Some(stripped) = type_token.strip_suffix(VALID_MARKER) {
                (stripped, true, true)
            } else if let Some(stripped) = type_token.strip_suffix(INVALID_MARKER) {
                (stripped, false, true)
            } else {
                (type_token, true, false)
            };

        let doc_type: DocType = type_name.parse()?;
        Self::new(doc_type, value_token.trim(), is_valid, is_valid_setup)
    }
}

impl std::fmt::Display for ExtractedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.doc_type.as_str())?;
        if self.is_valid_setup {
            let marker = if self.is_valid {
                VALID_MARKER
            } else {
                INVALID_MARKER
            };
            write!(f, "{marker}")?;
        }
        write!(f, "{TYPE_VALUE_SEPARATOR}{}", self.value)
    }
}

impl<'de> Deserialize<'de> for ExtractedDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            doc_type: DocType,
            value: String,
            #[serde(default = "default_valid")]
            is_valid: bool,
            #[serde(default)]
            is_valid_setup: bool,
        }

        fn default_valid() -> bool {
            true
        }

        let raw = Raw::deserialize(deserializer)?;
        ExtractedDocument::new(raw.doc_type, raw.value, raw.is_valid, raw.is_valid_setup)
            .map_err(serde::de::Error::custom)
    }
}

/// Parse a comma-separated list of document descriptors.
pub fn parse_documents(text: &str) -> Result<Vec<ExtractedDocument>, ExpectError> {
    text.split(DOCUMENT_SEPARATOR)
        .map(ExtractedDocument::parse_descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_without_marker_defaults_valid_and_unasserted() {
        let doc = ExtractedDocument::parse_descriptor("passport_rf: 0123456789 ").unwrap();
        assert_eq!(doc.doc_type(), DocType::PassportRf);
        assert_eq!(doc.value(), "0123456789");
        assert!(doc.is_valid());
        assert!(!doc.is_valid_setup());
    }

    #[test]
    fn descriptor_markers_set_validity() {
        let valid = ExtractedDocument::parse_descriptor("INN_UL+:7707083893").unwrap();
        assert!(valid.is_valid() && valid.is_valid_setup());

        let invalid = ExtractedDocument::parse_descriptor(" INN_UL- :7707083893").unwrap();
        assert!(!invalid.is_valid());
        assert!(invalid.is_valid_setup());
    }

    #[test]
    fn malformed_value_names_value_pattern_and_type() {
        let err = ExtractedDocument::parse_descriptor("SNILS:123").unwrap_err();
        assert_eq!(
            err,
            ExpectError::MalformedDocumentValue {
                value: "123".to_string(),
                pattern: r"^\d{11}$".to_string(),
                doc_type: "SNILS".to_string(),
            }
        );
    }

    #[test]
    fn missing_value_is_malformed() {
        let err = ExtractedDocument::parse_descriptor("OGRN").unwrap_err();
        assert!(matches!(
            err,
            ExpectError::MalformedDocumentValue { ref value, .. } if value.is_empty()
        ));
    }

    #[test]
    fn unknown_type_is_reported_without_marker() {
        let err = ExtractedDocument::parse_descriptor("PASSPORT+:0123456789").unwrap_err();
        assert_eq!(
            err,
            ExpectError::UnknownDocType {
                token: "PASSPORT".to_string()
            }
        );
    }

    #[test]
    fn display_round_trips_through_descriptor() {
        for raw in ["PASSPORT_RF:0123456789", "INN_FL-:500100732259", "KPP+:773601001"] {
            let doc = ExtractedDocument::parse_descriptor(raw).unwrap();
            assert_eq!(doc.to_string(), raw);
        }
    }

    #[test]
    fn unasserted_expectation_ignores_actual_validity() {
        let expected = ExtractedDocument::unasserted(DocType::InnUl, "7707083893").unwrap();
        let actual_invalid = ExtractedDocument::new(DocType::InnUl, "7707083893", false, true).unwrap();
        assert!(expected.is_satisfied_by(&actual_invalid));

        let asserted_valid = ExtractedDocument::new(DocType::InnUl, "7707083893", true, true).unwrap();
        assert!(!asserted_valid.is_satisfied_by(&actual_invalid));
    }

    #[test]
    fn deserialize_rejects_malformed_value() {
        let raw = r#"{"docType":"INN_FL","value":"12"}"#;
        let err = serde_json::from_str::<ExtractedDocument>(raw).unwrap_err();
        assert!(err.to_string().contains("does not match pattern"));

        let ok: ExtractedDocument =
            serde_json::from_str(r#"{"docType":"OGRN","value":"1027700132195"}"#).unwrap();
        assert!(ok.is_valid() && !ok.is_valid_setup());
    }

    #[test]
    fn parse_documents_splits_on_commas() {
        let docs = parse_documents("PASSPORT_RF:0123456789, INN_UL:7707083893").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].doc_type(), DocType::InnUl);
    }
}
