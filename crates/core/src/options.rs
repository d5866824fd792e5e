use std::path::PathBuf;

use quaderno_content::{QuizFilter, RunSyntax};

/// Everything the interactive front end used to ask for, as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub include_quizzes: bool,
    pub quiz_filter: QuizFilter,
    pub run_syntax: RunSyntax,
    /// Hard cap on processed templates; reaching it is normal
    /// termination, not an error.
    pub template_limit: usize,
    /// Absolute, or relative to the input file's directory.
    pub images_dir: PathBuf,
    /// Where to export; `None` skips the export step.
    pub output: Option<PathBuf>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_quizzes: true,
            quiz_filter: QuizFilter::All,
            run_syntax: RunSyntax::Markdown,
            template_limit: 60,
            images_dir: PathBuf::from("Pictures"),
            output: None,
        }
    }
}

/// What a run did; `limit_reached` distinguishes a capped run from an
/// exhausted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub pages: usize,
    pub templates: usize,
    pub limit_reached: bool,
}
