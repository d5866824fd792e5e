//! The document walker: depth-first over Area → Chapter → Topic → Module
//! → Template, emitting headers and descriptions on the way down and
//! handing each template's pieces to the layout crate.
//!
//! The walker owns no layout logic. Its jobs are ordering, the
//! continuation flags derived from template id equality, the global
//! template cap, and the spacing policy between blocks. A failing
//! template is logged and skipped; one bad item never takes the document
//! down.

use log::warn;

use quaderno_content::{
    Course, ContentBlock, QuizBlock, StyledRun, Template, Topic, build_runs,
};
use quaderno_layout::{
    BannerDescriptor, FloatStyle, Pager, place_block, place_image_grid, place_quiz_block,
    place_roadsign_row, place_single_image, place_wrapped_text,
};
use quaderno_resource::ImageCatalog;
use quaderno_style::{BlockTransition, HeaderStyle};
use quaderno_surface::LayoutSurface;
use quaderno_types::Color;

use crate::error::PipelineError;
use crate::options::{GenerationOptions, GenerationReport};

pub struct DocumentWalker<'a, S: LayoutSurface> {
    surface: &'a mut S,
    pager: Pager,
    images: &'a ImageCatalog,
    options: &'a GenerationOptions,
    templates_done: usize,
}

impl<'a, S: LayoutSurface> DocumentWalker<'a, S> {
    pub fn new(
        surface: &'a mut S,
        pager: Pager,
        images: &'a ImageCatalog,
        options: &'a GenerationOptions,
    ) -> Self {
        Self {
            surface,
            pager,
            images,
            options,
            templates_done: 0,
        }
    }

    fn capped(&self) -> bool {
        self.templates_done >= self.options.template_limit
    }

    pub fn walk(mut self, course: &Course) -> Result<GenerationReport, PipelineError> {
        self.pager.start_document(self.surface)?;

        for area in &course.areas {
            if self.capped() {
                break;
            }
            let header = self.pager.style.area_header.clone();
            let gap = self.pager.style.spacing.gap(BlockTransition::HeadingToDescription);
            self.header(&area.name, &header, gap)?;
            self.description(&area.desc)?;

            for (index, chapter) in area.chapters.iter().enumerate() {
                if self.capped() {
                    break;
                }
                if index > 0 {
                    let gap = self.pager.style.spacing.gap(BlockTransition::SectionToSection);
                    self.pager.advance(gap);
                }
                let header = self.pager.style.chapter_header.clone();
                let gap = self.pager.style.spacing.gap(BlockTransition::HeadingToDescription);
                self.header(&chapter.name, &header, gap)?;
                self.description(&chapter.desc)?;

                for (index, topic) in chapter.topics.iter().enumerate() {
                    if self.capped() {
                        break;
                    }
                    if index > 0 {
                        let gap =
                            self.pager.style.spacing.gap(BlockTransition::SectionToSection);
                        self.pager.advance(gap);
                    }
                    self.topic(topic)?;
                }
            }
        }

        Ok(GenerationReport {
            pages: self.pager.cursor.page,
            templates: self.templates_done,
            limit_reached: self.capped(),
        })
    }

    fn topic(&mut self, topic: &Topic) -> Result<(), PipelineError> {
        let color = topic
            .banner_color
            .unwrap_or_else(|| self.pager.style.banner_color_for_topic(&topic.name));
        self.pager.set_banner(
            self.surface,
            BannerDescriptor {
                text: topic.name.clone(),
                color,
            },
        )?;

        let header = self.pager.style.topic_header.clone();
        let gap = self.pager.style.spacing.gap(BlockTransition::HeadingToDescription);
        self.header(&topic.name, &header, gap)?;
        self.description(&topic.desc)?;

        // Data entry sometimes hangs templates directly off the topic.
        self.templates(&topic.templates)?;

        for module in &topic.modules {
            if self.capped() {
                break;
            }
            let header = self.pager.style.module_header.clone();
            let gap = self.pager.style.spacing.gap(BlockTransition::ModuleToTemplate);
            self.header(&module.name, &header, gap)?;
            self.templates(&module.templates)?;
        }
        Ok(())
    }

    fn templates(&mut self, templates: &[Template]) -> Result<(), PipelineError> {
        let mut previous_id: Option<&str> = None;
        for (index, template) in templates.iter().enumerate() {
            if self.capped() {
                break;
            }
            let id = template.id.as_str();
            let is_continuation = !id.is_empty() && previous_id == Some(id);
            let next_is_continuation = !id.is_empty()
                && templates.get(index + 1).is_some_and(|next| next.id == id);

            if let Err(err) = self.template(template, is_continuation, next_is_continuation) {
                warn!("template '{id}' skipped: {err}");
            }
            previous_id = Some(id);
            self.templates_done += 1;
        }
        Ok(())
    }

    fn template(
        &mut self,
        template: &Template,
        _is_continuation: bool,
        next_is_continuation: bool,
    ) -> Result<(), PipelineError> {
        if self.pager.remaining() < self.pager.config.min_template_space {
            self.pager.new_page(self.surface)?;
        }

        let accent = self.pager.style.accent_for_id(&template.id);
        let default_color = if self.pager.style.template_text_contrast {
            accent.contrast_text()
        } else {
            Color::BLACK
        };

        let start_page = self.pager.cursor.page;
        let start_y = self.pager.cursor.y;

        let text_items = template.cleaned_text();
        if !text_items.is_empty() {
            let block = self.template_block(&text_items, default_color);
            let float_index = template
                .images
                .iter()
                .position(|r| self.images.exists(r.as_str()));
            let gap = if float_index.is_some() {
                self.pager.config.image_gap * 2.0
            } else {
                0.0
            };
            place_wrapped_text(
                self.surface,
                &mut self.pager,
                self.images,
                &block,
                float_index.map(|i| template.images[i].as_str()),
                gap,
            )?;

            // Only the first resolvable image floats inside the text; the
            // rest form an illustration grid below it.
            if let Some(index) = float_index {
                let rest: Vec<String> = template
                    .images
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != index)
                    .map(|(_, r)| r.clone())
                    .collect();
                place_image_grid(self.surface, &mut self.pager, self.images, &rest)?;
            }
        } else if template.images.len() == 1 {
            place_single_image(
                self.surface,
                &mut self.pager,
                self.images,
                &template.images[0],
            )?;
        } else if !template.images.is_empty() {
            place_image_grid(self.surface, &mut self.pager, self.images, &template.images)?;
        }

        if !template.roadsigns.is_empty() {
            match self.pager.config.float_style {
                FloatStyle::RightFloat => {
                    // Signs float beside the text, anchored where the
                    // template started; a text-driven page break re-anchors
                    // them at the top of the new page.
                    let anchor_y = if self.pager.cursor.page == start_page {
                        start_y
                    } else {
                        self.pager.geometry.content_top()
                    };
                    let end = place_roadsign_row(
                        self.surface,
                        &mut self.pager,
                        self.images,
                        &template.roadsigns,
                        anchor_y,
                        None,
                        None,
                    )?;
                    if end > self.pager.cursor.y {
                        self.pager.cursor.y = end;
                    }
                }
                FloatStyle::Inline => {
                    let start = self.pager.cursor.y;
                    let end = place_roadsign_row(
                        self.surface,
                        &mut self.pager,
                        self.images,
                        &template.roadsigns,
                        start,
                        None,
                        None,
                    )?;
                    self.pager.cursor.y = end;
                }
            }
            self.pager.clamp_to_boundary();
        }

        for video in &template.videos {
            let mut block = ContentBlock::from_plain(
                format!("[video: {video}]"),
                self.pager.style.video_font_size,
            );
            block.in_template = true;
            let gap = self.pager.style.spacing.gap(BlockTransition::BlockToBlock);
            place_block(self.surface, &mut self.pager, &block, gap)?;
        }

        let mut placed_quiz = false;
        if self.options.include_quizzes && !template.quiz.is_empty() {
            let block = QuizBlock::from_entries(
                &template.quiz,
                self.options.quiz_filter,
                &self.pager.style.quiz.true_text,
                &self.pager.style.quiz.false_text,
            );
            if !block.is_empty() {
                // One header per template, even when a previous quiz
                // already put one on this page.
                self.pager.cursor.quiz_header_placed = false;
                self.pager.advance(1.0);
                self.pager.clamp_to_boundary();
                place_quiz_block(self.surface, &mut self.pager, &block)?;
                placed_quiz = true;
            }
        }

        let gap = self.pager.style.spacing.gap(BlockTransition::TemplateToTemplate {
            next_is_continuation,
            ends_with_quiz: placed_quiz,
        });
        self.pager.advance(gap);
        self.pager.clamp_to_boundary();
        Ok(())
    }

    /// Build the styled-run block for a template's text items, joined by
    /// newline runs, with uncolored runs pinned to the default color so
    /// they stay readable over whatever sits behind them.
    fn template_block(&self, items: &[String], default_color: Color) -> ContentBlock {
        let mut runs: Vec<StyledRun> = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                runs.push(StyledRun::plain("\n"));
            }
            runs.extend(build_runs(
                item,
                self.options.run_syntax,
                self.pager.style.tip_color,
            ));
        }
        for run in &mut runs {
            if run.style.color.is_none() {
                run.style.color = Some(default_color);
            }
        }
        ContentBlock {
            runs,
            font_size: self.pager.style.template_font_size,
            font_family: None,
            is_heading: false,
            in_template: true,
            allow_balanced_columns: true,
            suppress_trailing_gap: true,
        }
    }

    fn header(&mut self, text: &str, style: &HeaderStyle, gap: f32) -> Result<(), PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let mut block = ContentBlock::heading(text, style.font_size);
        if !style.bold {
            block.runs[0].style.bold = false;
        }
        let text_color = style
            .background
            .map_or(style.text_color, Color::contrast_text);
        block.runs[0].style.color = Some(text_color);

        if let Some(background) = style.background {
            // The bar goes in first so the text renders over it.
            let estimate = quaderno_layout::oracle::measure_height(
                self.surface,
                &self.pager.fonts,
                text,
                self.pager.geometry.content_width(),
                style.font_size,
                None,
                self.pager.probe_height(),
            );
            self.pager.ensure_space(self.surface, estimate)?;
            self.surface.create_rect(
                quaderno_types::Rect::new(
                    self.pager.geometry.content_left(),
                    self.pager.cursor.y,
                    self.pager.geometry.content_width(),
                    estimate,
                ),
                Some(background),
                None,
                0.0,
            )?;
        }
        place_block(self.surface, &mut self.pager, &block, gap)?;
        Ok(())
    }

    /// Level descriptions render as balanced two-column blocks under
    /// their header, closed off with the section gap.
    fn description(&mut self, text: &str) -> Result<(), PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let runs = build_runs(text, self.options.run_syntax, self.pager.style.tip_color);
        let block = ContentBlock {
            runs,
            font_size: self.pager.style.description_font_size,
            font_family: None,
            is_heading: false,
            in_template: false,
            allow_balanced_columns: true,
            suppress_trailing_gap: false,
        };
        let gap = self.pager.style.spacing.gap(BlockTransition::SectionToSection);
        place_block(self.surface, &mut self.pager, &block, gap)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_layout::LayoutConfig;
    use quaderno_source::parse_course;
    use quaderno_style::{BookletStyle, FontCatalog};
    use quaderno_surface::{HeadlessSurface, PlacedKind};
    use quaderno_types::PageGeometry;

    fn run_with(
        json: &str,
        options: &GenerationOptions,
        config: LayoutConfig,
    ) -> (HeadlessSurface, GenerationReport) {
        let course = parse_course(json).unwrap();
        let mut surface = HeadlessSurface::new();
        let pager = Pager::new(
            PageGeometry::default(),
            config,
            BookletStyle::default(),
            FontCatalog::default(),
        )
        .unwrap();
        let images = ImageCatalog::new("/nonexistent");
        let report = DocumentWalker::new(&mut surface, pager, &images, options)
            .walk(&course)
            .unwrap();
        (surface, report)
    }

    fn run(json: &str, options: &GenerationOptions) -> (HeadlessSurface, GenerationReport) {
        run_with(json, options, LayoutConfig::default())
    }

    const MINIMAL: &str = r#"{"areas":[{"name":"A","chapters":[{"name":"C","topics":[{"name":"T",
        "modules":[{"name":"M","templates":[{"id":"1","text":["Hello"]}]}]}]}]}]}"#;

    #[test]
    fn minimal_course_yields_one_page_and_one_template() {
        let (surface, report) = run(MINIMAL, &GenerationOptions::default());
        assert_eq!(report.pages, 1);
        assert_eq!(report.templates, 1);
        assert!(!report.limit_reached);

        // The header chain A -> C -> T -> M all landed, in order.
        let texts: Vec<String> = surface
            .elements()
            .iter()
            .filter_map(|e| match &e.kind {
                PlacedKind::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        for name in ["A", "C", "T", "M", "Hello"] {
            assert!(texts.iter().any(|t| t == name), "missing {name}");
        }
        let positions: Vec<usize> = ["A", "C", "T", "M"]
            .iter()
            .map(|n| texts.iter().position(|t| t == *n).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn template_cap_stops_the_walk() {
        let json = r#"{"areas":[{"name":"A","chapters":[{"name":"C","topics":[{"name":"T",
            "modules":[{"name":"M","templates":[
                {"id":"1","text":["one"]},
                {"id":"2","text":["two"]},
                {"id":"3","text":["three"]}
            ]}]}]}]}]}"#;
        let options = GenerationOptions {
            template_limit: 2,
            ..GenerationOptions::default()
        };
        let (surface, report) = run(json, &options);
        assert_eq!(report.templates, 2);
        assert!(report.limit_reached);
        assert!(!surface.elements().iter().any(|e| match &e.kind {
            PlacedKind::Text { text, .. } => text == "three",
            _ => false,
        }));
    }

    #[test]
    fn continuation_templates_merge_with_a_one_point_gap() {
        let shared = r#"{"areas":[{"name":"A","chapters":[{"name":"C","topics":[{"name":"T",
            "modules":[{"name":"M","templates":[
                {"id":"7","text":["alpha beta"]},
                {"id":"7","text":["gamma delta"]}
            ]}]}]}]}]}"#;
        let distinct = shared.replace(r#"{"id":"7","text":["gamma delta"]}"#,
            r#"{"id":"8","text":["gamma delta"]}"#);

        let options = GenerationOptions::default();
        // The template text renders as balanced columns, so each half of
        // a template lives in its own frame; take the extremes.
        let measure_gap = |surface: &HeadlessSurface| -> f32 {
            let mut first_bottom: f32 = 0.0;
            let mut second_top: f32 = f32::INFINITY;
            for e in surface.elements() {
                if let PlacedKind::Text { text, .. } = &e.kind {
                    if text.contains("alpha") || text.contains("beta") {
                        first_bottom = first_bottom.max(e.rect.bottom());
                    }
                    if text.contains("gamma") || text.contains("delta") {
                        second_top = second_top.min(e.rect.y);
                    }
                }
            }
            second_top - first_bottom
        };

        let (surface_same, _) = run(shared, &options);
        let gap_same = measure_gap(&surface_same);
        let (surface_diff, _) = run(&distinct, &options);
        let gap_diff = measure_gap(&surface_diff);

        // Continuations merge to within a point; distinct ids use the
        // standard template gap from the policy table.
        let style = BookletStyle::default();
        assert!((gap_same - style.spacing.template_continuation).abs() < 0.6);
        assert!((gap_diff - style.spacing.template).abs() < 0.6);
        assert!(gap_same <= 1.0 + 0.6);
    }

    #[test]
    fn quizzes_can_be_switched_off() {
        let json = r#"{"areas":[{"name":"A","chapters":[{"name":"C","topics":[{"name":"T",
            "modules":[{"name":"M","templates":[
                {"id":"1","text":["body"],"quiz":[{"que":"Vero?","is_true":true}]}
            ]}]}]}]}]}"#;
        let options = GenerationOptions {
            include_quizzes: false,
            ..GenerationOptions::default()
        };
        let (surface, _) = run(json, &options);
        assert!(!surface.elements().iter().any(|e| match &e.kind {
            PlacedKind::Text { text, .. } => text == "Quiz",
            _ => false,
        }));
    }

    #[test]
    fn topic_banner_is_redrawn_after_a_page_break() {
        let long_text = "parole ".repeat(3000);
        let json = format!(
            r#"{{"areas":[{{"name":"A","chapters":[{{"name":"C","topics":[{{"name":"Precedenze",
                "modules":[{{"name":"M","templates":[{{"id":"1","text":["{long_text}"]}}]}}]}}]}}]}}]}}"#
        );
        // Single-column mode flows the long template through the
        // splitting path, which is what breaks pages.
        let config = LayoutConfig {
            column_mode: quaderno_layout::ColumnMode::Single,
            ..LayoutConfig::default()
        };
        let (surface, report) = run_with(&json, &GenerationOptions::default(), config);
        assert!(report.pages > 1);
        // Every page carries a banner bar.
        for page in 1..=report.pages {
            assert!(
                surface
                    .elements_on_page(page)
                    .iter()
                    .any(|e| matches!(e.kind, PlacedKind::Rect { fill: Some(_), .. })),
                "page {page} lost its banner"
            );
        }
    }
}
