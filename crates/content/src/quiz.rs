use serde::Deserialize;

use crate::markup::strip_tags;

/// Raw quiz entry as it appears in the course JSON. `is_true` is often
/// missing; the answer text then carries the verdict as a trailing marker.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QuizEntry {
    #[serde(default)]
    pub que: String,
    #[serde(default)]
    pub ans: String,
    #[serde(default)]
    pub is_true: Option<bool>,
}

/// A normalized true/false question ready for the table layout.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    pub question: String,
    pub is_true: bool,
}

/// Which items survive filtering before layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizFilter {
    #[default]
    All,
    TrueOnly,
    FalseOnly,
}

impl QuizFilter {
    pub fn keeps(self, is_true: bool) -> bool {
        match self {
            QuizFilter::All => true,
            QuizFilter::TrueOnly => is_true,
            QuizFilter::FalseOnly => !is_true,
        }
    }
}

/// An ordered group of quiz items sharing one header, paginated as a
/// row-level unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizBlock {
    pub items: Vec<QuizItem>,
}

impl QuizBlock {
    /// Normalize raw entries: strip markup from the question, infer the
    /// verdict when the flag is absent, and drop filtered items.
    pub fn from_entries(
        entries: &[QuizEntry],
        filter: QuizFilter,
        true_marker: &str,
        false_marker: &str,
    ) -> Self {
        let items = entries
            .iter()
            .filter_map(|entry| {
                let question = strip_tags(&entry.que).trim().to_string();
                if question.is_empty() {
                    return None;
                }
                let is_true = entry
                    .is_true
                    .unwrap_or_else(|| infer_is_true(&entry.ans, true_marker, false_marker));
                filter.keeps(is_true).then_some(QuizItem { question, is_true })
            })
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A missing flag is read off the answer text: a trailing marker (or an
/// `A: <marker>` form) decides, anything else defaults to true.
fn infer_is_true(answer: &str, true_marker: &str, false_marker: &str) -> bool {
    let answer = strip_tags(answer);
    let answer = answer.trim();
    if answer.ends_with(true_marker) || answer.contains(&format!("A: {}", true_marker)) {
        true
    } else if answer.ends_with(false_marker) || answer.contains(&format!("A: {}", false_marker)) {
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(que: &str, ans: &str, is_true: Option<bool>) -> QuizEntry {
        QuizEntry {
            que: que.into(),
            ans: ans.into(),
            is_true,
        }
    }

    #[test]
    fn explicit_flag_wins_over_answer_text() {
        let block = QuizBlock::from_entries(
            &[entry("Q", "A: V", Some(false))],
            QuizFilter::All,
            "V",
            "F",
        );
        assert!(!block.items[0].is_true);
    }

    #[test]
    fn verdict_is_inferred_from_the_answer_suffix() {
        let entries = [
            entry("true one", "risposta V", None),
            entry("false one", "risposta F", None),
            entry("unmarked", "boh", None),
        ];
        let block = QuizBlock::from_entries(&entries, QuizFilter::All, "V", "F");
        assert_eq!(
            block.items.iter().map(|i| i.is_true).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[test]
    fn filter_modes_drop_the_other_verdict() {
        let entries = [entry("t", "V", None), entry("f", "F", None)];
        let only_true = QuizBlock::from_entries(&entries, QuizFilter::TrueOnly, "V", "F");
        assert_eq!(only_true.items.len(), 1);
        assert!(only_true.items[0].is_true);

        let only_false = QuizBlock::from_entries(&entries, QuizFilter::FalseOnly, "V", "F");
        assert_eq!(only_false.items.len(), 1);
        assert!(!only_false.items[0].is_true);
    }

    #[test]
    fn questions_are_stripped_of_markup() {
        let block = QuizBlock::from_entries(
            &[entry("<b>Bold?</b>", "V", None)],
            QuizFilter::All,
            "V",
            "F",
        );
        assert_eq!(block.items[0].question, "Bold?");
    }

    #[test]
    fn empty_questions_are_dropped() {
        let block =
            QuizBlock::from_entries(&[entry("  ", "V", None)], QuizFilter::All, "V", "F");
        assert!(block.is_empty());
    }
}
