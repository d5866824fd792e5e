//! Quiz table layout: fixed-geometry rows with V/F indicator cells,
//! paginated row by row under a per-page header.
//!
//! Row heights come from a character-count heuristic instead of the
//! oracle; the row grid is simple enough that probing would buy nothing.
//! Rows are the unit of pagination (never split mid-row), and a page
//! never opens with a single orphaned row while two or more remain.

use log::debug;

use quaderno_content::{QuizBlock, QuizItem};
use quaderno_surface::{HAlign, LayoutSurface, VAlign};
use quaderno_types::{Color, Rect};

use crate::LayoutError;
use crate::cursor::Pager;
use crate::fonts::apply_font;

/// Width reserved at the right of a quiz row for the two indicator cells
/// plus their margin.
fn indicator_reserve(pager: &Pager) -> f32 {
    pager.style.quiz.indicator_width * 2.0 + 4.0 + 2.0
}

/// Heuristic row height for a question at the given text width.
///
/// Under 85% of one line's capacity the row stays compact; up to 120% it
/// gets a borderline bump; beyond that the height is computed from the
/// estimated line count with a safety buffer.
pub(crate) fn estimate_row_height(pager: &Pager, question: &str, text_width: f32) -> f32 {
    let style = &pager.style.quiz;
    let font = style.question_font_size;
    let chars_per_line = text_width / (font * pager.config.char_width_factor);
    let len = question.chars().count() as f32;

    if len <= chars_per_line * 0.85 {
        style.row_height
    } else if len <= chars_per_line * 1.2 {
        style.row_height * 1.3
    } else {
        let lines = (len / chars_per_line).floor() + 1.0;
        let calculated = (lines * font * 1.2 + 3.0) * 1.1;
        style.row_height.max(calculated)
    }
}

/// Place a quiz block: header bar (once per page), then greedy row
/// packing with the orphan rule, breaking pages between rows only.
pub fn place_quiz_block<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    block: &QuizBlock,
) -> Result<(), LayoutError> {
    if block.is_empty() {
        return Ok(());
    }
    pager.set_quiz_mode(true);
    let result = place_rows(surface, pager, block);
    pager.set_quiz_mode(false);
    result
}

fn place_rows<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    block: &QuizBlock,
) -> Result<(), LayoutError> {
    let quiz_width = pager.geometry.content_width();
    let text_width = quiz_width - indicator_reserve(pager);
    let style = pager.style.quiz.clone();

    let row_heights: Vec<f32> = block
        .items
        .iter()
        .map(|item| estimate_row_height(pager, &item.question, text_width))
        .collect();

    // A quiz only starts on a page with room for its header and at least
    // two rows.
    let min_start = style.header_height + style.row_height * pager.config.min_quiz_rows as f32;
    if pager.remaining() < min_start {
        debug!(
            "deferring quiz of {} row(s) to a new page ({:.1}pt left)",
            block.items.len(),
            pager.remaining()
        );
        pager.new_page(surface)?;
    }
    if !pager.cursor.quiz_header_placed {
        draw_header(surface, pager, &style.header_text)?;
    }

    for (index, item) in block.items.iter().enumerate() {
        let rows_left = &row_heights[index..];
        let mut space = pager.remaining();
        let mut fitting = 0;
        for height in rows_left {
            if *height <= space {
                fitting += 1;
                space -= height;
            } else {
                break;
            }
        }
        // Never open a page with one orphaned row while at least two
        // remain; and never draw into space the row cannot occupy.
        let orphaned = rows_left.len() >= 2 && fitting < pager.config.min_quiz_rows;
        if fitting == 0 || orphaned {
            pager.new_page(surface)?;
            let continued = format!("{} (continua)", style.header_text);
            draw_header(surface, pager, &continued)?;
        }
        draw_row(surface, pager, item, index, row_heights[index], text_width)?;
    }
    Ok(())
}

/// The colored header bar. Sets the per-page flag and advances the
/// cursor.
fn draw_header<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    text: &str,
) -> Result<(), LayoutError> {
    let style = pager.style.quiz.clone();
    let quiz_width = pager.geometry.content_width();
    let rect = Rect::new(
        pager.geometry.content_left(),
        pager.cursor.y,
        quiz_width,
        style.header_height,
    );
    surface.create_rect(rect, Some(style.header_fill), Some(style.header_fill), 0.0)?;

    let label = surface.create_text_frame(Rect::new(
        rect.x + 3.0,
        rect.y + 3.0,
        quiz_width - 6.0,
        style.header_height - 6.0,
    ))?;
    surface.set_text(label, text)?;
    apply_font(surface, label, &pager.fonts, None, style.header_font_size);
    surface.set_text_color(label, style.header_text_color)?;
    surface.set_alignment(label, HAlign::Left, VAlign::Top)?;

    pager.cursor.quiz_header_placed = true;
    pager.advance(style.header_height);
    Ok(())
}

fn draw_row<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    item: &QuizItem,
    index: usize,
    row_height: f32,
    text_width: f32,
) -> Result<(), LayoutError> {
    let style = pager.style.quiz.clone();
    let fonts = pager.fonts.clone();
    let left = pager.geometry.content_left();
    let quiz_width = pager.geometry.content_width();
    let y = pager.cursor.y;

    // Question cell background, alternating for readability.
    let fill = if index % 2 == 0 {
        Color::WHITE
    } else {
        style.row_alt_fill
    };
    surface.create_rect(
        Rect::new(left + 2.0, y, text_width, row_height - 1.0),
        Some(fill),
        Some(style.grid_color),
        0.5,
    )?;

    let question = surface.create_text_frame(Rect::new(
        left + 4.0,
        y + 1.0,
        text_width - 4.0,
        row_height - 2.0,
    ))?;
    surface.set_text(question, &item.question)?;
    apply_font(surface, question, &fonts, None, style.question_font_size);
    let _ = surface.set_line_spacing(
        question,
        if row_height > style.row_height {
            style.question_font_size
        } else {
            style.question_font_size - 1.0
        },
    );
    surface.set_alignment(question, HAlign::Left, VAlign::Middle)?;

    // V and F indicator cells, right-aligned.
    let cells = [
        (style.true_text.clone(), style.true_fill, item.is_true),
        (style.false_text.clone(), style.false_fill, !item.is_true),
    ];
    let mut x = left + quiz_width - style.indicator_width * 2.0 - 2.0;
    for (letter, fill, is_correct) in cells {
        surface.create_rect(
            Rect::new(x, y, style.indicator_width, row_height - 1.0),
            Some(fill),
            Some(style.grid_color),
            0.5,
        )?;
        let cell = surface.create_text_frame(Rect::new(
            x,
            y + 1.0,
            style.indicator_width,
            row_height - 2.0,
        ))?;
        surface.set_text(cell, &letter)?;
        apply_font(surface, cell, &fonts, None, style.indicator_font_size);
        surface.set_alignment(cell, HAlign::Center, VAlign::Middle)?;
        surface.set_text_color(
            cell,
            if is_correct {
                style.correct_text_color
            } else {
                Color::BLACK
            },
        )?;
        x += style.indicator_width;
    }

    pager.advance(row_height);
    Ok(())
}

/// One CSV-booklet question: a header bar carrying the question text and
/// a row per answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCard {
    pub id: String,
    pub text: String,
    pub answers: Vec<AnswerRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub number: String,
    pub text: String,
    pub correct: bool,
}

/// Place one question card: header plus answer rows, paginated row by
/// row with a continuation header after a split.
pub fn place_question_card<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    card: &QuestionCard,
) -> Result<(), LayoutError> {
    pager.set_quiz_mode(true);
    let result = place_card_rows(surface, pager, card);
    pager.set_quiz_mode(false);
    result
}

fn place_card_rows<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    card: &QuestionCard,
) -> Result<(), LayoutError> {
    let style = pager.style.quiz.clone();
    let quiz_width = pager.geometry.content_width();
    let text_width = quiz_width - indicator_reserve(pager);

    let header_height =
        estimate_row_height(pager, &card.text, quiz_width - 6.0).max(style.header_height);
    let min_start = header_height + style.row_height * pager.config.min_quiz_rows as f32;
    if pager.remaining() < min_start {
        pager.new_page(surface)?;
    }
    draw_card_header(surface, pager, card, header_height, false)?;

    for (index, answer) in card.answers.iter().enumerate() {
        let row_height = estimate_row_height(pager, &answer.text, text_width);
        if row_height > pager.remaining() {
            pager.new_page(surface)?;
            draw_card_header(surface, pager, card, style.header_height, true)?;
        }
        draw_answer_row(surface, pager, answer, index, row_height, text_width)?;
    }
    Ok(())
}

fn draw_card_header<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    card: &QuestionCard,
    height: f32,
    continued: bool,
) -> Result<(), LayoutError> {
    let style = pager.style.quiz.clone();
    let quiz_width = pager.geometry.content_width();
    let rect = Rect::new(
        pager.geometry.content_left(),
        pager.cursor.y,
        quiz_width,
        height,
    );
    surface.create_rect(rect, Some(style.header_fill), Some(style.header_fill), 0.0)?;

    let label = surface.create_text_frame(Rect::new(
        rect.x + 3.0,
        rect.y + 2.0,
        quiz_width - 6.0,
        height - 4.0,
    ))?;
    let text = if continued {
        format!("{} (continua)", card.id)
    } else {
        card.text.clone()
    };
    surface.set_text(label, &text)?;
    apply_font(surface, label, &pager.fonts, None, style.question_font_size);
    surface.set_text_color(label, style.header_text_color)?;
    surface.set_alignment(label, HAlign::Left, VAlign::Middle)?;

    pager.advance(height);
    Ok(())
}

fn draw_answer_row<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    answer: &AnswerRow,
    index: usize,
    row_height: f32,
    text_width: f32,
) -> Result<(), LayoutError> {
    let style = pager.style.quiz.clone();
    let fonts = pager.fonts.clone();
    let left = pager.geometry.content_left();
    let y = pager.cursor.y;
    let number_width = 14.0;

    // The correct answer's row is tinted; the others alternate.
    let fill = if answer.correct {
        style.true_fill
    } else if index % 2 == 0 {
        Color::WHITE
    } else {
        style.row_alt_fill
    };
    surface.create_rect(
        Rect::new(
            left + 2.0,
            y,
            number_width + text_width,
            row_height - 1.0,
        ),
        Some(fill),
        Some(style.grid_color),
        0.5,
    )?;

    let number = surface.create_text_frame(Rect::new(left + 2.0, y + 1.0, number_width, row_height - 2.0))?;
    surface.set_text(number, &answer.number)?;
    apply_font(surface, number, &fonts, None, style.question_font_size);
    surface.set_alignment(number, HAlign::Center, VAlign::Middle)?;
    if answer.correct {
        surface.set_text_color(number, style.correct_text_color)?;
    }

    let body = surface.create_text_frame(Rect::new(
        left + 2.0 + number_width + 2.0,
        y + 1.0,
        text_width - 4.0,
        row_height - 2.0,
    ))?;
    surface.set_text(body, &answer.text)?;
    apply_font(surface, body, &fonts, None, style.question_font_size);
    surface.set_alignment(body, HAlign::Left, VAlign::Middle)?;

    pager.advance(row_height);
    Ok(())
}
