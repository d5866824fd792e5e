//! The run builder: markdown or HTML fragments in, styled runs out.
//!
//! Both syntaxes normalize unit superscripts (`cm3` → `cm³`) up front so
//! the layouts never see raw markup, and both keep newlines as dedicated
//! runs so the balancer can split on them.

use std::sync::OnceLock;

use quaderno_types::Color;
use quaderno_style::{RunStyle, VerticalAlign};
use regex::{Captures, Regex};

use crate::runs::StyledRun;

/// Which inline syntax a text fragment uses. The JSON variants disagree,
/// so the choice travels with the generation options instead of being
/// sniffed per fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunSyntax {
    #[default]
    Markdown,
    Html,
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

const SUP_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const SUB_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

fn to_sup(digits: &str) -> String {
    digits
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| SUP_DIGITS[d as usize]))
        .collect()
}

fn to_sub(digits: &str) -> String {
    digits
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| SUB_DIGITS[d as usize]))
        .collect()
}

/// Normalize superscript/subscript markup to Unicode digits.
///
/// Handles bare unit patterns (`cm3`, `m 2`), markdown `^2^`/`~2~`, HTML
/// `<sup>`/`<sub>`, the editor's `S-T` span classes, and spans styled with
/// `vertical-align`. Empty paragraphs that only hold `<br>` tags are
/// dropped outright. Vehicle class codes (`L4e`) are exempt.
pub fn normalize_superscripts(text: &str) -> String {
    static UNIT: OnceLock<Regex> = OnceLock::new();
    static SUP_MD: OnceLock<Regex> = OnceLock::new();
    static SUB_MD: OnceLock<Regex> = OnceLock::new();
    static EMPTY_P: OnceLock<Regex> = OnceLock::new();
    static BLANK_P: OnceLock<Regex> = OnceLock::new();
    static ST_UNIT: OnceLock<Regex> = OnceLock::new();
    static ST_SPAN: OnceLock<Regex> = OnceLock::new();
    static SUP_TAG: OnceLock<Regex> = OnceLock::new();
    static SUB_TAG: OnceLock<Regex> = OnceLock::new();
    static VA_SUP: OnceLock<Regex> = OnceLock::new();
    static VA_SUB: OnceLock<Regex> = OnceLock::new();

    let mut text = text.to_string();

    // Bare unit followed by one digit that is not part of a larger number.
    text = regex(&UNIT, r"\b([ckm]?m) ?([0-9])($|[^0-9])")
        .replace_all(&text, |caps: &Captures| {
            format!("{}{}{}", &caps[1], to_sup(&caps[2]), &caps[3])
        })
        .into_owned();
    // Vehicle classes are codes, not exponents.
    text = text.replace("L⁴e", "L4e");

    text = regex(&SUP_MD, r"\^([0-9]+)\^")
        .replace_all(&text, |caps: &Captures| to_sup(&caps[1]))
        .into_owned();
    text = regex(&SUB_MD, r"~([0-9]+)~")
        .replace_all(&text, |caps: &Captures| to_sub(&caps[1]))
        .into_owned();

    text = regex(&EMPTY_P, r"(?i)<p[^>]*>(\s*<br\s*/?\s*>)+\s*</p>")
        .replace_all(&text, "")
        .into_owned();
    text = regex(&BLANK_P, r"(?i)<p[^>]*>\s*</p>")
        .replace_all(&text, "")
        .into_owned();

    // Editor spans: `cm<span class="S-T18">3</span>` and friends.
    text = regex(
        &ST_UNIT,
        r#"(?i)([a-zA-Z]+)<span\s+class=["']S-T[^"'>]*["'][^>]*>([0-9]+)</span>"#,
    )
    .replace_all(&text, |caps: &Captures| {
        format!("{}{}", &caps[1], to_sup(&caps[2]))
    })
    .into_owned();
    text = regex(
        &ST_SPAN,
        r#"(?i)<span\s+class=["']S-T[^"'>]*["'][^>]*>([0-9]+)</span>"#,
    )
    .replace_all(&text, |caps: &Captures| to_sup(&caps[1]))
    .into_owned();

    text = regex(&SUP_TAG, r"(?i)<sup>([0-9]+)</sup>")
        .replace_all(&text, |caps: &Captures| to_sup(&caps[1]))
        .into_owned();
    text = regex(&SUB_TAG, r"(?i)<sub>([0-9]+)</sub>")
        .replace_all(&text, |caps: &Captures| to_sub(&caps[1]))
        .into_owned();

    text = regex(
        &VA_SUP,
        r"(?i)<span[^>]*vertical-align:\s*super[^>]*>([0-9]+)</span>",
    )
    .replace_all(&text, |caps: &Captures| to_sup(&caps[1]))
    .into_owned();
    text = regex(
        &VA_SUB,
        r"(?i)<span[^>]*vertical-align:\s*sub[^>]*>([0-9]+)</span>",
    )
    .replace_all(&text, |caps: &Captures| to_sub(&caps[1]))
    .into_owned();

    text
}

/// Remove every tag, leaving the text content only.
pub fn strip_tags(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    regex(&TAG, r"<[^>]+>").replace_all(text, "").into_owned()
}

/// Build styled runs from a raw fragment in the given syntax.
pub fn build_runs(text: &str, syntax: RunSyntax, tip_color: Color) -> Vec<StyledRun> {
    let normalized = normalize_superscripts(text);
    match syntax {
        RunSyntax::Markdown => markdown_to_runs(&normalized, tip_color),
        RunSyntax::Html => html_to_runs(&normalized),
    }
}

/// Markdown subset: `**bold**`, `*italic*`, `{tip=N}…{end}` colored spans.
/// Blank lines are skipped and line breaks collapse to single spaces so
/// short source lines don't open gaps in the flowed text.
fn markdown_to_runs(text: &str, tip_color: Color) -> Vec<StyledRun> {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static TIP: OnceLock<Regex> = OnceLock::new();
    static NEXT: OnceLock<Regex> = OnceLock::new();

    let bold = regex(&BOLD, r"^\*\*(.+?)\*\*");
    let italic = regex(&ITALIC, r"^\*(.+?)\*");
    let tip = regex(&TIP, r"^\{tip=[0-9]+\}(.+?)\{end\}");
    let next_special = regex(&NEXT, r"\*\*|\*|\{tip=");

    let mut runs = Vec::new();
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    for (i, line) in lines.iter().enumerate() {
        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            if let Some(caps) = bold.captures(rest) {
                runs.push(StyledRun::new(&caps[1], RunStyle::bold()));
                pos += caps[0].len();
            } else if let Some(caps) = tip.captures(rest) {
                runs.push(StyledRun::new(&caps[1], RunStyle::colored(tip_color)));
                pos += caps[0].len();
            } else if let Some(caps) = italic.captures(rest) {
                runs.push(StyledRun::new(&caps[1], RunStyle::italic()));
                pos += caps[0].len();
            } else {
                match next_special.find(rest) {
                    Some(m) if m.start() > 0 => {
                        runs.push(StyledRun::plain(&rest[..m.start()]));
                        pos += m.start();
                    }
                    Some(m) => {
                        // A marker that never closes is plain text.
                        let skip = m.end().max(1);
                        runs.push(StyledRun::plain(&rest[..skip]));
                        pos += skip;
                    }
                    None => {
                        runs.push(StyledRun::plain(rest));
                        break;
                    }
                }
            }
        }
        if i < lines.len() - 1 {
            runs.push(StyledRun::plain(" "));
        }
    }
    runs
}

/// HTML subset: `b`/`strong`, `i`/`em`, `font color=`, spans with inline
/// CSS (`color`, `font-weight`, `font-style`, `vertical-align`), `p` and
/// `br` as newline runs. Unknown tags pass their content through.
fn html_to_runs(text: &str) -> Vec<StyledRun> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static WS: OnceLock<Regex> = OnceLock::new();
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

    let tag_re = regex(
        &TAG,
        r#"<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)/?>"#,
    );
    let ws = regex(&WS, r"\s+");
    let placeholder = regex(&PLACEHOLDER, r"\{[^}]+\}");

    let mut runs: Vec<StyledRun> = Vec::new();
    let mut stack: Vec<RunStyle> = vec![RunStyle::default()];
    let mut cursor = 0;

    let push_text = |runs: &mut Vec<StyledRun>, raw: &str, style: &RunStyle| {
        let cleaned = placeholder.replace_all(raw, "");
        let cleaned = ws.replace_all(&cleaned, " ");
        if !cleaned.is_empty() {
            runs.push(StyledRun::new(cleaned.into_owned(), style.clone()));
        }
    };
    let push_newline = |runs: &mut Vec<StyledRun>| {
        if runs.last().is_some_and(|r| r.text != "\n") {
            runs.push(StyledRun::plain("\n"));
        }
    };

    for caps in tag_re.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if m.start() > cursor {
            let style = stack.last().cloned().unwrap_or_default();
            push_text(&mut runs, &text[cursor..m.start()], &style);
        }
        cursor = m.end();

        let closing = &caps[1] == "/";
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |a| a.as_str());

        match (closing, name.as_str()) {
            (false, "br") => push_newline(&mut runs),
            (false, "p") => push_newline(&mut runs),
            (true, "p") => push_newline(&mut runs),
            (false, tag) => {
                let mut style = stack.last().cloned().unwrap_or_default();
                match tag {
                    "b" | "strong" => style.bold = true,
                    "i" | "em" => style.italic = true,
                    "font" => {
                        if let Some(color) = attr_value(attrs, "color").and_then(css_color) {
                            style.color = Some(color);
                        }
                    }
                    _ => {}
                }
                if let Some(css) = attr_value(attrs, "style") {
                    apply_css(&mut style, &css);
                }
                stack.push(style);
            }
            (true, _) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
        }
    }
    if cursor < text.len() {
        let style = stack.last().cloned().unwrap_or_default();
        push_text(&mut runs, &text[cursor..], &style);
    }

    while runs.last().is_some_and(|r| r.text == "\n") {
        runs.pop();
    }
    while runs.first().is_some_and(|r| r.text == "\n") {
        runs.remove(0);
    }
    runs
}

fn attr_value(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let at = lower.find(&format!("{}=", name))?;
    let rest = &attrs[at + name.len() + 1..];
    let quote = rest.chars().next()?;
    if quote == '"' || quote == '\'' {
        let inner = &rest[1..];
        let end = inner.find(quote)?;
        Some(inner[..end].to_string())
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

fn apply_css(style: &mut RunStyle, css: &str) {
    for decl in css.split(';') {
        let Some((key, value)) = decl.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        match key.as_str() {
            "color" => {
                if let Some(color) = css_color(value.clone()) {
                    style.color = Some(color);
                }
            }
            "font-weight" => {
                style.bold = matches!(value.as_str(), "bold" | "bolder" | "700" | "800" | "900");
            }
            "font-style" => style.italic = value == "italic",
            "font-family" => style.font_family = Some(value.clone()),
            "vertical-align" => {
                style.vertical_align = match value.as_str() {
                    "super" => VerticalAlign::Superscript,
                    "sub" => VerticalAlign::Subscript,
                    _ => VerticalAlign::Baseline,
                };
            }
            _ => {}
        }
    }
}

fn css_color(value: String) -> Option<Color> {
    if let Ok(color) = Color::parse_hex(&value) {
        return Some(color);
    }
    match value.trim().to_ascii_lowercase().as_str() {
        "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "red" => Some(Color::RED),
        "green" => Some(Color::GREEN),
        "yellow" => Some(Color::YELLOW),
        "blue" => Some(Color::BLUE),
        "cyan" => Some(Color::CYAN),
        "magenta" => Some(Color::MAGENTA),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_gain_unicode_superscripts() {
        assert_eq!(normalize_superscripts("volume di 50 cm3 totali"), "volume di 50 cm³ totali");
        assert_eq!(normalize_superscripts("area: 2 m2"), "area: 2 m²");
        assert_eq!(normalize_superscripts("km2 di strade"), "km² di strade");
    }

    #[test]
    fn vehicle_classes_are_exempt() {
        assert_eq!(normalize_superscripts("categoria L4e"), "categoria L4e");
    }

    #[test]
    fn markdown_and_html_sup_markers_normalize() {
        assert_eq!(normalize_superscripts("m^2^ e H~2~O"), "m² e H₂O");
        assert_eq!(normalize_superscripts("cm<sup>3</sup>"), "cm³");
        assert_eq!(
            normalize_superscripts(r#"cm<span class="S-T18">3</span>"#),
            "cm³"
        );
    }

    #[test]
    fn empty_paragraphs_disappear() {
        assert_eq!(normalize_superscripts("<p><br></p><p>testo</p>"), "<p>testo</p>");
    }

    #[test]
    fn markdown_styles_become_runs() {
        let runs = markdown_to_runs("**grassetto** e *corsivo*", Color::GREEN);
        assert_eq!(runs[0].text, "grassetto");
        assert!(runs[0].style.bold);
        assert_eq!(runs[1].text, " e ");
        assert!(runs[2].style.italic);
    }

    #[test]
    fn tip_spans_are_colored() {
        let runs = markdown_to_runs("{tip=3}attenzione{end} qui", Color::GREEN);
        assert_eq!(runs[0].text, "attenzione");
        assert_eq!(runs[0].style.color, Some(Color::GREEN));
        assert_eq!(runs[1].text, " qui");
    }

    #[test]
    fn markdown_lines_join_with_spaces() {
        let runs = markdown_to_runs("prima\n\nseconda", Color::GREEN);
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text, "prima seconda");
    }

    #[test]
    fn html_nesting_and_paragraphs() {
        let runs = html_to_runs("<p>uno <b>due <i>tre</i></b></p><p>quattro</p>");
        let bold_italic = runs
            .iter()
            .find(|r| r.text.contains("tre"))
            .expect("nested run");
        assert!(bold_italic.style.bold && bold_italic.style.italic);
        assert!(runs.iter().any(|r| r.text == "\n"));
        let text: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(text.trim(), "uno due tre\nquattro");
    }

    #[test]
    fn html_span_color_is_parsed() {
        let runs = html_to_runs(r#"<span style="color: #00ae00">verde</span>"#);
        assert_eq!(runs[0].style.color, Some(Color::GREEN));
    }

    #[test]
    fn build_runs_normalizes_before_parsing() {
        let runs = build_runs("**50 cm3**", RunSyntax::Markdown, Color::GREEN);
        assert_eq!(runs[0].text, "50 cm³");
        assert!(runs[0].style.bold);
    }
}
