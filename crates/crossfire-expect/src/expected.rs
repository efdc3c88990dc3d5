//! Expected-result parsing and matching.

use crate::document::{ExtractedDocument, parse_documents};
use crate::error::ExpectError;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Overall structure: `<left><operator><right>`.
///
/// The left segment is the free-text input and must end in a character that
/// is not an operator character; the right segment must start with one.
pub const GRAMMAR_PATTERN: &str = r"^([\s\S]*?[^~=?]+)(==|~=|=\?|~\?)([^~=?]+[\s\S]*?)$";

fn grammar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(GRAMMAR_PATTERN).expect("grammar regex must compile"))
}

/// The four inclusion × ordering policies, one per operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// `==`: same documents, same count, same order.
    ExactOrdered,
    /// `=?`: same count, every expected document present.
    ExactUnordered,
    /// `~=`: expected documents appear in order among others.
    SubsetOrdered,
    /// `~?`: expected documents appear anywhere among others.
    SubsetUnordered,
}

impl MatchPolicy {
    pub fn from_operator(operator: &str) -> Option<Self> {
        match operator {
            "==" => Some(Self::ExactOrdered),
            "=?" => Some(Self::ExactUnordered),
            "~=" => Some(Self::SubsetOrdered),
            "~?" => Some(Self::SubsetUnordered),
            _ => None,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Self::ExactOrdered => "==",
            Self::ExactUnordered => "=?",
            Self::SubsetOrdered => "~=",
            Self::SubsetUnordered => "~?",
        }
    }

    pub fn is_exactly(self) -> bool {
        matches!(self, Self::ExactOrdered | Self::ExactUnordered)
    }

    pub fn is_order_required(self) -> bool {
        matches!(self, Self::ExactOrdered | Self::SubsetOrdered)
    }
}

/// A parsed expected-result constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedResult {
    is_exactly: bool,
    is_order_required: bool,
    expected: Vec<ExtractedDocument>,
}

impl ExpectedResult {
    /// Parse the full text of a test, `<input><operator><documents>`.
    pub fn parse(text: &str) -> Result<Self, ExpectError> {
        let captures = grammar_re()
            .captures(text)
            .ok_or_else(|| ExpectError::Grammar {
                text: text.to_string(),
                pattern: GRAMMAR_PATTERN.to_string(),
            })?;

        // The regex alternation only admits the four operators.
        let policy = MatchPolicy::from_operator(&captures[2]).ok_or_else(|| {
            ExpectError::Grammar {
                text: text.to_string(),
                pattern: GRAMMAR_PATTERN.to_string(),
            }
        })?;
        let expected = parse_documents(&captures[3])?;

        Ok(Self {
            is_exactly: policy.is_exactly(),
            is_order_required: policy.is_order_required(),
            expected,
        })
    }

    pub fn is_exactly(&self) -> bool {
        self.is_exactly
    }

    pub fn is_order_required(&self) -> bool {
        self.is_order_required
    }

    pub fn expected(&self) -> &[ExtractedDocument] {
        &self.expected
    }

    pub fn policy(&self) -> MatchPolicy {
        match (self.is_exactly, self.is_order_required) {
            (true, true) => MatchPolicy::ExactOrdered,
            (true, false) => MatchPolicy::ExactUnordered,
            (false, true) => MatchPolicy::SubsetOrdered,
            (false, false) => MatchPolicy::SubsetUnordered,
        }
    }

    /// Decide whether `actual` passes this expectation.
    ///
    /// Unordered containment is checked per expected document, not per
    /// occurrence: `[A, A]` is contained in `[A, B]`.
    pub fn matches(&self, actual: &[ExtractedDocument]) -> bool {
        let contains = |expected: &ExtractedDocument| {
            actual.iter().any(|doc| expected.is_satisfied_by(doc))
        };

        match self.policy() {
            MatchPolicy::ExactOrdered => {
                actual.len() == self.expected.len()
                    && self
                        .expected
                        .iter()
                        .zip(actual)
                        .all(|(expected, doc)| expected.is_satisfied_by(doc))
            }
            MatchPolicy::ExactUnordered => {
                actual.len() == self.expected.len() && self.expected.iter().all(contains)
            }
            MatchPolicy::SubsetOrdered => {
                let mut pending = self.expected.iter().peekable();
                for doc in actual {
                    if pending.peek().is_none() {
                        break;
                    }
                    pending.next_if(|expected| expected.is_satisfied_by(doc));
                }
                pending.peek().is_none()
            }
            MatchPolicy::SubsetUnordered => self.expected.iter().all(contains),
        }
    }
}

impl std::fmt::Display for ExpectedResult {
    /// Renders the operator and documents, without the input segment.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.policy().operator())?;
        for (index, doc) in self.expected.iter().enumerate() {
            if index == 0 {
                write!(f, " {doc}")?;
            } else {
                write!(f, ", {doc}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocType;

    fn doc(raw: &str) -> ExtractedDocument {
        ExtractedDocument::parse_descriptor(raw).unwrap()
    }

    const A: &str = "PASSPORT_RF:0123456789";
    const B: &str = "INN_UL:7707083893";
    const C: &str = "SNILS:11223344595";

    #[test]
    fn parse_reads_operator_flags() {
        let cases = [
            ("==", true, true),
            ("~=", false, true),
            ("=?", true, false),
            ("~?", false, false),
        ];
        for (operator, exactly, ordered) in cases {
            let parsed =
                ExpectedResult::parse(&format!("Passport 01 23 456789 {operator} {A}")).unwrap();
            assert_eq!(parsed.is_exactly(), exactly, "operator {operator}");
            assert_eq!(parsed.is_order_required(), ordered, "operator {operator}");
            assert_eq!(parsed.expected(), &[doc(A)]);
        }
    }

    #[test]
    fn parse_reads_several_documents() {
        let parsed =
            ExpectedResult::parse("two docs ~? INN_UL+:7707083893 , PASSPORT_RF-:0123456789")
                .unwrap();
        assert_eq!(parsed.expected().len(), 2);
        assert_eq!(parsed.expected()[0].doc_type(), DocType::InnUl);
        assert!(parsed.expected()[0].is_valid());
        assert!(!parsed.expected()[1].is_valid());
        assert!(parsed.expected()[1].is_valid_setup());
    }

    #[test]
    fn parse_rejects_missing_operator_or_segments() {
        for text in [
            "no operator here",
            "== PASSPORT_RF:0123456789",
            "input ==",
            "input => PASSPORT_RF:0123456789",
            "",
        ] {
            let err = ExpectedResult::parse(text).unwrap_err();
            assert!(
                matches!(err, ExpectError::Grammar { .. }),
                "{text:?} should be a grammar error, got {err:?}"
            );
        }
    }

    #[test]
    fn parse_allows_operator_characters_inside_input() {
        let parsed = ExpectedResult::parse("a=b ~= INN_UL:7707083893").unwrap();
        assert!(!parsed.is_exactly());
        assert!(parsed.is_order_required());
    }

    #[test]
    fn parse_propagates_document_errors() {
        assert!(matches!(
            ExpectedResult::parse("x == PASSPORT:0123456789"),
            Err(ExpectError::UnknownDocType { .. })
        ));
        assert!(matches!(
            ExpectedResult::parse("x == PASSPORT_RF:01 23 456789"),
            Err(ExpectError::MalformedDocumentValue { .. })
        ));
    }

    #[test]
    fn exact_ordered_requires_same_sequence() {
        let expected = ExpectedResult::parse(&format!("x == {A}, {B}")).unwrap();
        assert!(expected.matches(&[doc(A), doc(B)]));
        assert!(!expected.matches(&[doc(B), doc(A)]));
        assert!(!expected.matches(&[doc(A), doc(B), doc(C)]));
        assert!(!expected.matches(&[doc(A)]));
    }

    #[test]
    fn exact_unordered_requires_same_count_any_order() {
        let expected = ExpectedResult::parse(&format!("x =? {A}, {B}")).unwrap();
        assert!(expected.matches(&[doc(B), doc(A)]));
        assert!(!expected.matches(&[doc(B), doc(A), doc(C)]));
        assert!(!expected.matches(&[doc(A), doc(C)]));
    }

    #[test]
    fn exact_unordered_uses_set_containment_for_duplicates() {
        let expected = ExpectedResult::parse(&format!("x =? {A}, {A}")).unwrap();
        assert!(expected.matches(&[doc(A), doc(B)]));
    }

    #[test]
    fn subset_ordered_accepts_subsequence() {
        let expected = ExpectedResult::parse(&format!("x ~= {A}, {B}")).unwrap();
        assert!(expected.matches(&[doc(A), doc(C), doc(B)]));
        assert!(expected.matches(&[doc(C), doc(A), doc(B), doc(C)]));
        assert!(!expected.matches(&[doc(B), doc(A)]));
        assert!(!expected.matches(&[doc(A)]));
        assert!(!expected.matches(&[]));
    }

    #[test]
    fn subset_unordered_ignores_order_and_extras() {
        let expected = ExpectedResult::parse(&format!("x ~? {A}, {B}")).unwrap();
        assert!(expected.matches(&[doc(C), doc(B), doc(A)]));
        assert!(!expected.matches(&[doc(C), doc(B)]));
    }

    #[test]
    fn asserted_validity_must_agree() {
        let expected = ExpectedResult::parse("x == INN_UL-:7707083893").unwrap();
        let invalid = ExtractedDocument::new(DocType::InnUl, "7707083893", false, true).unwrap();
        assert!(expected.matches(&[invalid]));
        assert!(!expected.matches(&[doc(B)]));
    }

    #[test]
    fn display_renders_operator_and_documents() {
        let expected = ExpectedResult::parse(&format!("x ~? {A},INN_UL-:7707083893")).unwrap();
        assert_eq!(
            expected.to_string(),
            "~? PASSPORT_RF:0123456789, INN_UL-:7707083893"
        );
    }
}
