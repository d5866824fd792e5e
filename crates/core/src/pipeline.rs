//! Generation entry points: wire a surface, a course (or quiz CSV) and
//! the options together and run the walker.

use std::path::Path;

use log::info;

use quaderno_content::Course;
use quaderno_layout::{
    AnswerRow, LayoutConfig, Pager, QuestionCard, place_block, place_question_card,
};
use quaderno_resource::ImageCatalog;
use quaderno_source::{CsvQuestion, load_course, load_quiz_csv};
use quaderno_style::{BookletStyle, FontCatalog};
use quaderno_surface::LayoutSurface;
use quaderno_types::PageGeometry;

use crate::error::PipelineError;
use crate::options::{GenerationOptions, GenerationReport};
use crate::walker::DocumentWalker;

/// A configured generation pipeline. Geometry, tunables, style and fonts
/// default to the booklet standards and can be swapped per run.
#[derive(Debug, Clone, Default)]
pub struct BookletPipeline {
    geometry: PageGeometry,
    config: LayoutConfig,
    style: BookletStyle,
    fonts: FontCatalog,
    options: GenerationOptions,
}

impl BookletPipeline {
    pub fn new(options: GenerationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_style(mut self, style: BookletStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_fonts(mut self, fonts: FontCatalog) -> Self {
        self.fonts = fonts;
        self
    }

    fn pager(&self) -> Result<Pager, PipelineError> {
        Ok(Pager::new(
            self.geometry,
            self.config.clone(),
            self.style.clone(),
            self.fonts.clone(),
        )?)
    }

    /// Lay out a parsed course against `surface`, resolving images
    /// through `images`.
    pub fn generate<S: LayoutSurface>(
        &self,
        surface: &mut S,
        course: &Course,
        images: &ImageCatalog,
    ) -> Result<GenerationReport, PipelineError> {
        let pager = self.pager()?;
        let report = DocumentWalker::new(surface, pager, images, &self.options).walk(course)?;
        info!(
            "laid out {} template(s) over {} page(s){}",
            report.templates,
            report.pages,
            if report.limit_reached {
                " (template limit reached)"
            } else {
                ""
            }
        );
        if let Some(output) = &self.options.output {
            surface.export(output)?;
        }
        Ok(report)
    }

    /// Load a course JSON file, resolve the images directory relative to
    /// it, generate, and export when an output path is configured.
    pub fn generate_from_file<S: LayoutSurface>(
        &self,
        surface: &mut S,
        json_path: impl AsRef<Path>,
    ) -> Result<GenerationReport, PipelineError> {
        let json_path = json_path.as_ref();
        let course = load_course(json_path)?;
        let images_dir = if self.options.images_dir.is_absolute() {
            self.options.images_dir.clone()
        } else {
            json_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&self.options.images_dir)
        };
        let images = ImageCatalog::new(images_dir);
        self.generate(surface, &course, &images)
    }

    /// Lay out the standalone quiz booklet from grouped CSV questions.
    pub fn generate_quiz_booklet<S: LayoutSurface>(
        &self,
        surface: &mut S,
        questions: &[CsvQuestion],
    ) -> Result<GenerationReport, PipelineError> {
        let mut pager = self.pager()?;
        pager.start_document(surface)?;

        for question in questions {
            let card = QuestionCard {
                id: question.question_id.clone(),
                text: format!(
                    "Capitolo {} - {}",
                    question.chapter, question.question_text
                ),
                answers: question
                    .answers
                    .iter()
                    .map(|a| AnswerRow {
                        number: a.number.clone(),
                        text: a.text.clone(),
                        correct: a.correct,
                    })
                    .collect(),
            };
            place_question_card(surface, &mut pager, &card)?;
            pager.advance(pager.style.spacing.block);
        }

        // Closing line under the last card.
        let closing = quaderno_content::ContentBlock::from_plain(
            format!("{} domande", questions.len()),
            pager.style.video_font_size,
        );
        place_block(surface, &mut pager, &closing, 0.0)?;

        let report = GenerationReport {
            pages: pager.cursor.page,
            templates: 0,
            limit_reached: false,
        };
        if let Some(output) = &self.options.output {
            surface.export(output)?;
        }
        Ok(report)
    }

    /// Read the CSV and lay out the quiz booklet in one step.
    pub fn generate_quiz_booklet_from_csv<S: LayoutSurface>(
        &self,
        surface: &mut S,
        csv_path: impl AsRef<Path>,
    ) -> Result<GenerationReport, PipelineError> {
        let questions = load_quiz_csv(csv_path)?;
        self.generate_quiz_booklet(surface, &questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_surface::{HeadlessSurface, PlacedKind};

    #[test]
    fn quiz_booklet_orders_chapters_naturally() {
        let csv = "\
Chapter,QuestionID,QuestionText,AnswerNumber,AnswerText,CorrectFlag
10a,Q9,Late question,1,Yes,1
1a,Q1,Early question,1,No,0
";
        let questions = quaderno_source::parse_quiz_csv(csv.as_bytes()).unwrap();
        let mut surface = HeadlessSurface::new();
        let pipeline = BookletPipeline::default();
        pipeline
            .generate_quiz_booklet(&mut surface, &questions)
            .unwrap();

        let headers: Vec<String> = surface
            .elements()
            .iter()
            .filter_map(|e| match &e.kind {
                PlacedKind::Text { text, .. } if text.starts_with("Capitolo") => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(headers.len(), 2);
        assert!(headers[0].starts_with("Capitolo 1a"));
        assert!(headers[1].starts_with("Capitolo 10a"));
    }

    #[test]
    fn export_runs_when_an_output_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("booklet.txt");
        let options = GenerationOptions {
            output: Some(out.clone()),
            ..GenerationOptions::default()
        };
        let course = quaderno_source::parse_course(
            r#"{"areas":[{"name":"A","chapters":[]}]}"#,
        )
        .unwrap();
        let mut surface = HeadlessSurface::new();
        BookletPipeline::new(options)
            .generate(&mut surface, &course, &ImageCatalog::new("/nonexistent"))
            .unwrap();
        assert!(out.is_file());
        assert_eq!(surface.exported_to(), Some(out.to_str().unwrap()));
    }
}
