/// How body content is arranged across the page width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnMode {
    Single,
    /// Two columns; blocks that allow it are balanced to a flush bottom
    /// edge.
    #[default]
    Double,
}

/// Where a template's road signs go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FloatStyle {
    /// Signs flow inline after the template text.
    Inline,
    /// Signs stack on the right with the text wrapping around them.
    #[default]
    RightFloat,
}

/// Every tunable of the layout core. The probe/expand schedule and the
/// iteration caps are configuration rather than inline constants so the
/// headless double can exercise the edge cases deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Points kept clear above the bottom margin for the page number.
    pub footer_reserve: f32,
    /// Remaining space below this forces a page break instead of a fit
    /// attempt.
    pub min_space_threshold: f32,
    /// First-phase expansion step while a frame still overflows.
    pub coarse_step: f32,
    /// Second-phase step once the coarse step would cross the boundary.
    pub fine_step: f32,
    /// Hard cap on expansion iterations for body text.
    pub max_expand_steps: usize,
    /// Hard cap for headings, which never legitimately need much.
    pub heading_expand_steps: usize,
    /// Most pages one block may be split across before residual overflow
    /// is accepted.
    pub max_split_pages: usize,
    /// Most split candidates the column balancer will measure.
    pub balance_probe_cap: usize,
    /// Height delta below which the balancer stops early, in points.
    pub balance_threshold: f32,
    /// Candidate-split neighborhood around the midpoint, as a fraction of
    /// the token count.
    pub balance_search_fraction: f32,
    /// Minimum room (header + two text lines) before a template starts on
    /// the current page.
    pub min_template_space: f32,
    /// A quiz never starts or continues with fewer rows than this fitting.
    pub min_quiz_rows: usize,
    /// Standalone/template image height, in points.
    pub standard_image_height: f32,
    /// Target height for illustration-grid images.
    pub grid_image_height: f32,
    /// Target height for road signs.
    pub roadsign_height: f32,
    /// Height multiplier for signs classified as attention signs.
    pub attention_shrink: f32,
    /// A standalone image defers to a new page when available space drops
    /// below this fraction of its standard height.
    pub image_defer_ratio: f32,
    /// Extra height reserved for text that wraps around a float, as a
    /// multiplier on the displaced area.
    pub float_reserve_factor: f32,
    /// Mean character advance as a fraction of the font size, used by the
    /// quiz row-height heuristic.
    pub char_width_factor: f32,
    /// Gap between images in a row.
    pub image_gap: f32,
    pub column_mode: ColumnMode,
    pub float_style: FloatStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            footer_reserve: 20.0,
            min_space_threshold: 4.0,
            coarse_step: 10.0,
            fine_step: 1.0,
            max_expand_steps: 200,
            heading_expand_steps: 10,
            max_split_pages: 50,
            balance_probe_cap: 30,
            balance_threshold: 5.0,
            balance_search_fraction: 0.1,
            min_template_space: 35.0,
            min_quiz_rows: 2,
            standard_image_height: 80.0,
            grid_image_height: 150.0,
            roadsign_height: 25.0,
            attention_shrink: 0.6,
            image_defer_ratio: 0.6,
            float_reserve_factor: 1.2,
            char_width_factor: 0.42,
            image_gap: 3.0,
            column_mode: ColumnMode::Double,
            float_style: FloatStyle::RightFloat,
        }
    }
}
