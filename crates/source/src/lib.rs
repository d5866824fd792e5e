//! Input ingestion: the hierarchical course JSON and the flat quiz CSV.
//!
//! Both readers validate up front and fail before any page is created;
//! everything downstream of them is best-effort.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use quaderno_content::Course;

pub mod quiz_csv;

pub use quiz_csv::{CsvAnswer, CsvQuestion, load_quiz_csv, parse_quiz_csv};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'areas' missing or not an array")]
    MissingAreas,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse course JSON from a string. A document whose top level has no
/// `areas` array is a configuration error, reported before anything is
/// laid out.
pub fn parse_course(json: &str) -> Result<Course, SourceError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.get("areas").is_some_and(Value::is_array) {
        return Err(SourceError::MissingAreas);
    }
    Ok(serde_json::from_value(value)?)
}

/// Read and parse a course JSON file.
pub fn load_course(path: impl AsRef<Path>) -> Result<Course, SourceError> {
    let text = std::fs::read_to_string(path)?;
    parse_course(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_course_parses() {
        let course = parse_course(
            r#"{"areas":[{"name":"A","chapters":[{"name":"C","topics":[{"name":"T",
                 "modules":[{"name":"M","templates":[{"id":"1","text":["Hello"]}]}]}]}]}]}"#,
        )
        .unwrap();
        assert_eq!(course.areas.len(), 1);
        let module = &course.areas[0].chapters[0].topics[0].modules[0];
        assert_eq!(module.templates[0].text, vec!["Hello"]);
    }

    #[test]
    fn missing_areas_is_fatal() {
        assert!(matches!(
            parse_course(r#"{"chapters": []}"#),
            Err(SourceError::MissingAreas)
        ));
        assert!(matches!(
            parse_course(r#"{"areas": 4}"#),
            Err(SourceError::MissingAreas)
        ));
    }

    #[test]
    fn malformed_json_is_fatal() {
        assert!(matches!(parse_course("{"), Err(SourceError::Json(_))));
    }
}
