use serde::{Deserialize, Serialize};

/// The context a gap is selected for. Booklets look uneven the moment any
/// of these transitions uses the wrong constant, so the whole table lives
/// in one place instead of being sprinkled through the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTransition {
    /// A level header (area/chapter/topic/module) into its description.
    HeadingToDescription,
    /// One sibling section into the next (chapter→chapter, topic→topic).
    SectionToSection,
    /// A module header into its first template.
    ModuleToTemplate,
    /// A template into the next template.
    TemplateToTemplate {
        /// The next template shares this one's id.
        next_is_continuation: bool,
        /// This template ended with a quiz block.
        ends_with_quiz: bool,
    },
    /// Any ordinary content block into the next one.
    BlockToBlock,
}

/// Inter-block spacing constants, in points.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacingPolicy {
    pub block: f32,
    pub header_to_desc: f32,
    pub section: f32,
    pub module_to_template: f32,
    /// Standard gap between unrelated templates.
    pub template: f32,
    /// Gap forced before a continuation template so the two halves read as
    /// one unit but never touch.
    pub template_continuation: f32,
    /// Trailing gap after a template whose last block was a quiz.
    pub template_after_quiz: f32,
}

impl Default for SpacingPolicy {
    fn default() -> Self {
        Self {
            block: 3.0,
            header_to_desc: 5.0,
            section: 2.0,
            module_to_template: 2.0,
            template: 0.0,
            template_continuation: 1.0,
            template_after_quiz: 2.0,
        }
    }
}

impl SpacingPolicy {
    pub fn gap(&self, transition: BlockTransition) -> f32 {
        match transition {
            BlockTransition::HeadingToDescription => self.header_to_desc,
            BlockTransition::SectionToSection => self.section,
            BlockTransition::ModuleToTemplate => self.module_to_template,
            BlockTransition::TemplateToTemplate {
                next_is_continuation: true,
                ..
            } => self.template_continuation,
            BlockTransition::TemplateToTemplate {
                ends_with_quiz: true,
                ..
            } => self.template_after_quiz,
            BlockTransition::TemplateToTemplate { .. } => self.template,
            BlockTransition::BlockToBlock => self.block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_beats_quiz_trailer() {
        let policy = SpacingPolicy::default();
        let gap = policy.gap(BlockTransition::TemplateToTemplate {
            next_is_continuation: true,
            ends_with_quiz: true,
        });
        assert_eq!(gap, policy.template_continuation);
        assert!(gap <= 1.0);
    }

    #[test]
    fn plain_templates_use_the_standard_gap() {
        let policy = SpacingPolicy::default();
        let gap = policy.gap(BlockTransition::TemplateToTemplate {
            next_is_continuation: false,
            ends_with_quiz: false,
        });
        assert_eq!(gap, policy.template);
    }

    #[test]
    fn heading_gap_is_distinct_from_section_gap() {
        let policy = SpacingPolicy::default();
        assert_ne!(
            policy.gap(BlockTransition::HeadingToDescription),
            policy.gap(BlockTransition::SectionToSection)
        );
    }
}
