//! Minimal single-page PDF 1.4 writer.
//!
//! Callers draw in millimetres from the top-left corner. Coordinates are
//! flipped and converted to points on the way into the content stream. Only
//! the two base-14 Helvetica faces are referenced, so nothing is embedded.
//! Output carries no timestamps or ids and is a pure function of the drawing
//! calls.

use std::io::{self, Write};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

const MM_TO_PT: f64 = 72.0 / 25.4;
const LINE_SPACING: f64 = 1.15;
// Bezier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Stroke,
    Fill,
}

pub struct PdfPage {
    ops: String,
    font: Font,
    font_size: f64,
}

impl PdfPage {
    pub fn new() -> Self {
        Self {
            ops: String::new(),
            font: Font::Regular,
            font_size: 10.0,
        }
    }

    pub fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.font_size = size;
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Baseline-to-baseline distance for the current font, in millimetres.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_SPACING / MM_TO_PT
    }

    /// `y` is the text baseline.
    pub fn text(&mut self, x: f64, y: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        let op = format!(
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            self.font.resource(),
            num(self.font_size),
            num(to_pt(x)),
            num(flip(y)),
            encode_text(text)
        );
        self.push(op);
    }

    pub fn text_lines(&mut self, x: f64, y: f64, lines: &[String]) {
        let step = self.line_height();
        for (index, line) in lines.iter().enumerate() {
            self.text(x, y + step * index as f64, line);
        }
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.push(format!("{} w", num(to_pt(width))));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(format!(
            "{} {} m {} {} l S",
            num(to_pt(x1)),
            num(flip(y1)),
            num(to_pt(x2)),
            num(flip(y2))
        ));
    }

    /// `(x, y)` is the top-left corner.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(format!(
            "{} {} {} {} re S",
            num(to_pt(x)),
            num(flip(y + height)),
            num(to_pt(width)),
            num(to_pt(height))
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64, paint: Paint) {
        let (cx, cy, r) = (to_pt(cx), flip(cy), to_pt(radius));
        let k = r * KAPPA;
        let mut op = format!("{} {} m", num(cx + r), num(cy));
        let quarters = [
            (cx + r, cy + k, cx + k, cy + r, cx, cy + r),
            (cx - k, cy + r, cx - r, cy + k, cx - r, cy),
            (cx - r, cy - k, cx - k, cy - r, cx, cy - r),
            (cx + k, cy - r, cx + r, cy - k, cx + r, cy),
        ];
        for (x1, y1, x2, y2, x3, y3) in quarters {
            op.push_str(&format!(
                " {} {} {} {} {} {} c",
                num(x1),
                num(y1),
                num(x2),
                num(y2),
                num(x3),
                num(y3)
            ));
        }
        op.push_str(match paint {
            Paint::Stroke => " S",
            Paint::Fill => " f",
        });
        self.push(op);
    }

    pub fn finish(self) -> io::Result<Vec<u8>> {
        let content = self.ops.into_bytes();
        let media_box = format!(
            "[0 0 {} {}]",
            num(to_pt(PAGE_WIDTH_MM)),
            num(to_pt(PAGE_HEIGHT_MM))
        );

        let objects: Vec<Vec<u8>> = vec![
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
            b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox {media_box} \
                 /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>"
            )
            .into_bytes(),
            font_dictionary(Font::Regular).into_bytes(),
            font_dictionary(Font::Bold).into_bytes(),
            stream_object(&content)?,
        ];

        let mut out = Vec::with_capacity(content.len() + 1024);
        out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            writeln!(out, "{} 0 obj", index + 1)?;
            out.write_all(body)?;
            out.write_all(b"\nendobj\n")?;
        }

        let xref_offset = out.len();
        writeln!(out, "xref\n0 {}", objects.len() + 1)?;
        out.write_all(b"0000000000 65535 f \n")?;
        for offset in offsets {
            writeln!(out, "{offset:010} 00000 n ")?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )?;
        Ok(out)
    }

    fn push(&mut self, op: String) {
        self.ops.push_str(&op);
        self.ops.push('\n');
    }
}

impl Default for PdfPage {
    fn default() -> Self {
        Self::new()
    }
}

fn font_dictionary(font: Font) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.base_font()
    )
}

fn stream_object(content: &[u8]) -> io::Result<Vec<u8>> {
    let mut body = Vec::with_capacity(content.len() + 64);
    write!(body, "<< /Length {} >>\nstream\n", content.len())?;
    body.write_all(content)?;
    body.write_all(b"endstream")?;
    Ok(body)
}

fn to_pt(mm: f64) -> f64 {
    mm * MM_TO_PT
}

fn flip(y_mm: f64) -> f64 {
    to_pt(PAGE_HEIGHT_MM - y_mm)
}

/// Fixed precision keeps output byte-stable across platforms.
fn num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Escapes a string for a PDF literal in WinAnsi encoding. Characters the
/// encoding cannot express become `?`.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\t' => out.push(' '),
            ' '..='~' => out.push(ch),
            _ => match win_ansi_byte(ch) {
                Some(byte) => out.push_str(&format!("\\{byte:03o}")),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch {
        '\u{20AC}' => Some(0x80),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{00A0}'..='\u{00FF}' => u8::try_from(u32::from(ch)).ok(),
        _ => None,
    }
}
