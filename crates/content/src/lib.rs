//! Content model for the booklet engine: the course hierarchy as it
//! arrives from JSON, quiz normalization, and the run builder that turns
//! markup fragments into styled runs.

pub mod course;
pub mod markup;
pub mod quiz;
pub mod runs;

pub use course::{Area, Chapter, Course, Module, Template, Topic};
pub use markup::{RunSyntax, build_runs, normalize_superscripts, strip_tags};
pub use quiz::{QuizBlock, QuizEntry, QuizFilter, QuizItem};
pub use runs::{ContentBlock, StyledRun};
