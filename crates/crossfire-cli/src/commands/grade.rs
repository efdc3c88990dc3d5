use crate::support::print_json;
use crossfire_expect::{ExpectError, ExpectedResult, ExtractedDocument, parse_documents};
use serde_json::json;

/// Exit status when the documents do not satisfy the expectation.
const EXIT_MISMATCH: i32 = 2;

fn parse_actual(actual: &str) -> Result<Vec<ExtractedDocument>, ExpectError> {
    if actual.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_documents(actual)
}

pub fn run(expected: String, actual: String, json_output: bool) {
    let expectation = ExpectedResult::parse(&expected).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let documents = parse_actual(&actual).unwrap_or_else(|e| {
        eprintln!("error: actual documents: {e}");
        std::process::exit(1);
    });
    let passed = expectation.matches(&documents);

    if json_output {
        let actual: Vec<String> = documents.iter().map(ToString::to_string).collect();
        print_json(&json!({
            "policy": expectation.policy().operator(),
            "expected": expectation,
            "actual": actual,
            "passed": passed,
        }));
    } else {
        println!("crossfire grade");
        println!("  Expected: {expectation}");
        println!(
            "  Actual: {}",
            documents
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Result: {}", if passed { "pass" } else { "fail" });
    }

    if !passed {
        std::process::exit(EXIT_MISMATCH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_actual_is_no_documents() {
        assert!(parse_actual("  ").unwrap().is_empty());
        assert_eq!(parse_actual("INN_UL:7707083893").unwrap().len(), 1);
        assert!(parse_actual("NOPE:1").is_err());
    }
}
