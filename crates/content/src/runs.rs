use quaderno_style::RunStyle;

/// A contiguous piece of text carrying one style. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::default())
    }
}

/// A block of runs plus the hints the fitter needs. Built per placement
/// call and discarded once the cursor has advanced past it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBlock {
    pub runs: Vec<StyledRun>,
    pub font_size: f32,
    pub font_family: Option<String>,
    pub is_heading: bool,
    pub in_template: bool,
    pub allow_balanced_columns: bool,
    pub suppress_trailing_gap: bool,
}

impl ContentBlock {
    pub fn new(runs: Vec<StyledRun>, font_size: f32) -> Self {
        Self {
            runs,
            font_size,
            ..Self::default()
        }
    }

    pub fn from_plain(text: impl Into<String>, font_size: f32) -> Self {
        Self::new(vec![StyledRun::plain(text)], font_size)
    }

    pub fn heading(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            runs: vec![StyledRun::new(text, quaderno_style::RunStyle::bold())],
            font_size,
            is_heading: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// The block's text with styling dropped, as the oracle measures it.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Byte-offset spans for per-run styling of the concatenated text.
    pub fn styled_spans(&self) -> Vec<(usize, usize, &RunStyle)> {
        let mut spans = Vec::with_capacity(self.runs.len());
        let mut pos = 0;
        for run in &self.runs {
            let len = run.text.len();
            if len > 0 {
                spans.push((pos, len, &run.style));
            }
            pos += len;
        }
        spans
    }

    /// Expand the runs into word-level tokens, keeping each token's style.
    /// Newline runs stay intact; every other run is split on whitespace
    /// with the separating space attached to the preceding word, so
    /// re-concatenating the tokens reproduces the text word-for-word.
    pub fn word_tokens(&self) -> Vec<StyledRun> {
        let mut tokens = Vec::new();
        for run in &self.runs {
            if run.text == "\n" {
                tokens.push(run.clone());
                continue;
            }
            let words: Vec<&str> = run.text.split_whitespace().collect();
            for (i, word) in words.iter().enumerate() {
                let text = if i < words.len() - 1 {
                    format!("{} ", word)
                } else {
                    (*word).to_string()
                };
                tokens.push(StyledRun::new(text, run.style.clone()));
            }
        }
        tokens
    }

    /// Rebuild a block around a different run list, keeping the hints.
    /// Used when a block is split across pages or columns.
    pub fn with_runs(&self, runs: Vec<StyledRun>) -> Self {
        Self {
            runs,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_style::RunStyle;

    #[test]
    fn word_tokens_preserve_style_and_text() {
        let block = ContentBlock::new(
            vec![
                StyledRun::new("two words ", RunStyle::bold()),
                StyledRun::plain("and more"),
            ],
            9.0,
        );
        let tokens = block.word_tokens();
        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].style.bold);
        assert!(!tokens[2].style.bold);

        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, "two words and more");
    }

    #[test]
    fn styled_spans_cover_the_plain_text() {
        let block = ContentBlock::new(
            vec![
                StyledRun::plain("ab"),
                StyledRun::new("cd", RunStyle::italic()),
            ],
            9.0,
        );
        let spans = block.styled_spans();
        assert_eq!(spans[0], (0, 2, &RunStyle::default()));
        assert_eq!(spans[1].0, 2);
        assert_eq!(block.plain_text(), "abcd");
    }

    #[test]
    fn empty_runs_are_detected() {
        let block = ContentBlock::from_plain("   ", 9.0);
        assert!(block.is_empty());
    }
}
