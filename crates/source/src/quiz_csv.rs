//! The standalone quiz-booklet input: a flat CSV with one row per answer,
//! grouped back into questions by id.

use std::path::Path;

use serde::Deserialize;

use crate::SourceError;

#[derive(Deserialize, Debug, Clone)]
struct RawRow {
    #[serde(rename = "Chapter")]
    chapter: String,
    #[serde(rename = "QuestionID")]
    question_id: String,
    #[serde(rename = "QuestionText")]
    question_text: String,
    #[serde(rename = "AnswerNumber")]
    answer_number: String,
    #[serde(rename = "AnswerText")]
    answer_text: String,
    #[serde(rename = "CorrectFlag")]
    correct_flag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvAnswer {
    pub number: String,
    pub text: String,
    pub correct: bool,
}

/// One question with its answer rows, in CSV order.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvQuestion {
    pub chapter: String,
    pub question_id: String,
    pub question_text: String,
    pub answers: Vec<CsvAnswer>,
}

/// Parse quiz CSV content. Rows sharing a `QuestionID` fold into one
/// question; questions come back ordered by chapter (natural sort, so
/// `2a` precedes `10a`) and then by question id.
pub fn parse_quiz_csv<R: std::io::Read>(reader: R) -> Result<Vec<CsvQuestion>, SourceError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut questions: Vec<CsvQuestion> = Vec::new();

    for result in csv_reader.deserialize::<RawRow>() {
        let row = result?;
        let correct = matches!(
            row.correct_flag.trim(),
            "1" | "true" | "True" | "TRUE" | "V" | "Y" | "yes"
        );
        let answer = CsvAnswer {
            number: row.answer_number,
            text: row.answer_text,
            correct,
        };
        match questions
            .iter_mut()
            .find(|q| q.question_id == row.question_id)
        {
            Some(question) => question.answers.push(answer),
            None => questions.push(CsvQuestion {
                chapter: row.chapter,
                question_id: row.question_id,
                question_text: row.question_text,
                answers: vec![answer],
            }),
        }
    }

    questions.sort_by(|a, b| {
        natural_chapter_key(&a.chapter)
            .cmp(&natural_chapter_key(&b.chapter))
            .then_with(|| a.question_id.cmp(&b.question_id))
    });
    Ok(questions)
}

/// Read and parse a quiz CSV file.
pub fn load_quiz_csv(path: impl AsRef<Path>) -> Result<Vec<CsvQuestion>, SourceError> {
    let file = std::fs::File::open(path)?;
    parse_quiz_csv(file)
}

/// Sort key for chapter labels like `1a`, `1b`, `10a`: numeric prefix
/// first, then the letter suffix. Labels with no leading number sort last.
fn natural_chapter_key(chapter: &str) -> (u32, String) {
    let lower = chapter.trim().to_ascii_lowercase();
    let digits: String = lower.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(number) => (number, lower[digits.len()..].to_string()),
        Err(_) => (u32::MAX, lower),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Chapter,QuestionID,QuestionText,AnswerNumber,AnswerText,CorrectFlag
2a,Q10,Second chapter question,1,Yes,1
1a,Q2,First question,1,Stop,1
1a,Q2,First question,2,Go,0
10a,Q99,Late chapter question,1,Maybe,0
";

    #[test]
    fn rows_group_by_question_id() {
        let questions = parse_quiz_csv(SAMPLE.as_bytes()).unwrap();
        let q2 = questions
            .iter()
            .find(|q| q.question_id == "Q2")
            .expect("grouped question");
        assert_eq!(q2.answers.len(), 2);
        assert!(q2.answers[0].correct);
        assert!(!q2.answers[1].correct);
    }

    #[test]
    fn chapters_sort_naturally() {
        let questions = parse_quiz_csv(SAMPLE.as_bytes()).unwrap();
        let chapters: Vec<&str> = questions.iter().map(|q| q.chapter.as_str()).collect();
        assert_eq!(chapters, vec!["1a", "2a", "10a"]);
    }

    #[test]
    fn natural_key_splits_number_and_suffix() {
        assert!(natural_chapter_key("2b") < natural_chapter_key("10a"));
        assert!(natural_chapter_key("1a") < natural_chapter_key("1b"));
        assert_eq!(natural_chapter_key("appendix").0, u32::MAX);
    }
}
