use chrono::{Datelike, NaiveDate};

use crate::services::validation::parse_report_date;

const MM_PER_PT: f64 = 25.4 / 72.0;
const DEFAULT_GLYPH_WIDTH: u16 = 556;

// Helvetica advance widths for ' '..='~', in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

pub fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_PT
}

fn glyph_width(ch: char) -> u16 {
    match ch {
        ' '..='~' => HELVETICA_WIDTHS[(ch as usize) - 0x20],
        _ => DEFAULT_GLYPH_WIDTH,
    }
}

/// Rendered width of `text` at `font_size` points, in millimetres.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch))).sum();
    pt_to_mm(f64::from(units) / 1000.0 * font_size)
}

/// Greedy word wrap. Explicit newlines start a new line; a single word wider
/// than `max_width` is broken between characters.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.trim_end().lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font_size) <= max_width {
                current = word.to_string();
            } else {
                for piece in break_word(word, max_width, font_size) {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current = piece;
                }
            }
        }
        lines.push(current);
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

fn break_word(word: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && text_width(&piece, font_size) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// `January 5th, 2025`. Text that does not parse as a date is printed as is.
pub fn long_date(value: &str) -> String {
    match parse_report_date(value) {
        Some(date) => format_long_date(date),
        None => value.trim().to_string(),
    }
}

pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    format!("{} {day}{}, {}", date.format("%B"), ordinal_suffix(day), date.year())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
