//! Document-type catalog.
//!
//! Every kind of document a participant's extractor may report, together with
//! the normalization pattern its value must satisfy. The catalog is fixed at
//! compile time; patterns are compiled once on first use.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A known document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    /// Russian internal passport: series + number, 10 digits.
    PassportRf,
    /// Individual taxpayer number, 12 digits.
    InnFl,
    /// Legal-entity taxpayer number, 10 digits.
    InnUl,
    /// Primary state registration number of a legal entity, 13 digits.
    Ogrn,
    /// Primary state registration number of a sole proprietor, 15 digits.
    Ogrnip,
    /// Individual insurance account number, 11 digits.
    Snils,
    /// Tax registration reason code, 9 digits.
    Kpp,
    /// Bank identification code, 9 digits starting with `04`.
    Bik,
    /// Driver license: region digits, series, 6-digit number.
    DriverLicense,
    /// Vehicle identification number.
    Vin,
    /// Vehicle registration plate.
    Grz,
}

impl DocType {
    /// Every catalog entry, in declaration order.
    pub const ALL: [DocType; 11] = [
        DocType::PassportRf,
        DocType::InnFl,
        DocType::InnUl,
        DocType::Ogrn,
        DocType::Ogrnip,
        DocType::Snils,
        DocType::Kpp,
        DocType::Bik,
        DocType::DriverLicense,
        DocType::Vin,
        DocType::Grz,
    ];

    /// Canonical upper-case name, as written in the grammar.
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::PassportRf => "PASSPORT_RF",
            DocType::InnFl => "INN_FL",
            DocType::InnUl => "INN_UL",
            DocType::Ogrn => "OGRN",
            DocType::Ogrnip => "OGRNIP",
            DocType::Snils => "SNILS",
            DocType::Kpp => "KPP",
            DocType::Bik => "BIK",
            DocType::DriverLicense => "DRIVER_LICENSE",
            DocType::Vin => "VIN",
            DocType::Grz => "GRZ",
        }
    }

    /// Normalization pattern a value of this type must satisfy.
    pub fn normalize_pattern(self) -> &'static str {
        match self {
            DocType::PassportRf => r"^\d{10}$",
            DocType::InnFl => r"^\d{12}$",
            DocType::InnUl => r"^\d{10}$",
            DocType::Ogrn => r"^\d{13}$",
            DocType::Ogrnip => r"^\d{15}$",
            DocType::Snils => r"^\d{11}$",
            DocType::Kpp => r"^\d{9}$",
            DocType::Bik => r"^04\d{7}$",
            DocType::DriverLicense => r"^\d{2}[0-9А-ЯЁ]{2}\d{6}$",
            DocType::Vin => r"^[A-HJ-NPR-Z0-9]{17}$",
            DocType::Grz => r"^[АВЕКМНОРСТУХ]\d{3}[АВЕКМНОРСТУХ]{2}\d{2,3}$",
        }
    }

    /// Whether `value` is well-formed for this type.
    pub fn accepts(self, value: &str) -> bool {
        self.regex().is_match(value)
    }

    fn regex(self) -> &'static Regex {
        static CATALOG: OnceLock<Vec<Regex>> = OnceLock::new();
        let catalog = CATALOG.get_or_init(|| {
            DocType::ALL
                .iter()
                .map(|doc_type| {
                    Regex::new(doc_type.normalize_pattern())
                        .expect("document-type pattern must compile")
                })
                .collect()
        });
        &catalog[self as usize]
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = crate::ExpectError;

    /// Case-insensitive lookup by canonical name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        DocType::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == wanted)
            .ok_or_else(|| crate::ExpectError::UnknownDocType {
                token: s.trim().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_discriminants() {
        for (index, doc_type) in DocType::ALL.iter().enumerate() {
            assert_eq!(*doc_type as usize, index);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            "passport_rf".parse::<DocType>().unwrap(),
            DocType::PassportRf
        );
        assert_eq!(" Inn_Ul ".parse::<DocType>().unwrap(), DocType::InnUl);
        assert_eq!(
            "DRIVER_LICENSE".parse::<DocType>().unwrap(),
            DocType::DriverLicense
        );
    }

    #[test]
    fn unknown_type_names_the_token() {
        let err = "PASSPORT".parse::<DocType>().unwrap_err();
        assert_eq!(
            err,
            crate::ExpectError::UnknownDocType {
                token: "PASSPORT".to_string()
            }
        );
    }

    #[test]
    fn patterns_accept_and_reject() {
        assert!(DocType::PassportRf.accepts("0123456789"));
        assert!(!DocType::PassportRf.accepts("01 23 456789"));
        assert!(DocType::InnFl.accepts("500100732259"));
        assert!(!DocType::InnFl.accepts("5001007322"));
        assert!(DocType::Bik.accepts("044525225"));
        assert!(!DocType::Bik.accepts("144525225"));
        assert!(DocType::Vin.accepts("XTA21099043516897"));
        assert!(!DocType::Vin.accepts("XTA2109904351689O"));
        assert!(DocType::Grz.accepts("А123ВС77"));
        assert!(DocType::Grz.accepts("А123ВС777"));
        assert!(!DocType::Grz.accepts("A123BC77"));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let raw = serde_json::to_string(&DocType::DriverLicense).unwrap();
        assert_eq!(raw, "\"DRIVER_LICENSE\"");
        let back: DocType = serde_json::from_str("\"OGRNIP\"").unwrap();
        assert_eq!(back, DocType::Ogrnip);
    }
}
