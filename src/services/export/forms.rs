//! Page layouts for the two printable forms.

use crate::models::end_of_term_report::{
    score_description, EndOfTermReportRecord, MAX_SCORE, RUBRIC_QUESTIONS,
};
use crate::models::weekly_report::WeeklyReportRecord;

use super::layout::{long_date, pt_to_mm, text_width, wrap_text};
use super::pdf::{Font, Paint, PdfPage, PAGE_WIDTH_MM};

pub const WEEKLY_TITLE: &str = "ICT80004 Weekly Communication";
pub const END_OF_TERM_TITLE: &str = "ICT80004 Final Internship Project Review Form - Close";

const MARGIN_X: f64 = 24.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_X;
const CELL_PADDING: f64 = 1.76;
const BOX_PADDING: f64 = 4.0;
const BOX_MIN_HEIGHT: f64 = 30.0;
const THIN_LINE: f64 = 0.25;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy)]
enum VAlign {
    Top,
    Middle,
}

struct Column {
    width: f64,
    align: Align,
}

pub fn draw_weekly(page: &mut PdfPage, report: &WeeklyReportRecord) {
    draw_title(page, WEEKLY_TITLE, 14.0, 103.0);
    page.text(
        MARGIN_X,
        38.0,
        "To be submitted to Canvas together with a screenshot of the email sending this to your supervisor.",
    );

    labelled(page, MARGIN_X, 58.0, 48.0, "Student Name:", "__________________________", &report.student_name);
    labelled(page, 140.0, 145.0, 48.0, "ID:", "__________________", &report.student_id.to_string());
    labelled(page, MARGIN_X, 58.0, 56.0, "Organisation:", "__________________________", &report.organisation);
    labelled(
        page,
        MARGIN_X,
        58.0,
        64.0,
        "Industry Supervisor:",
        "__________________________",
        &report.industry_supervisor,
    );
    labelled(
        page,
        MARGIN_X,
        58.0,
        72.0,
        "Date Prepared:",
        "__________________________",
        &long_date(&report.date_prepared),
    );
    labelled(page, 140.0, 170.0, 72.0, "Internship Week #:", "_____", &report.week_number.to_string());

    let columns = [
        Column { width: 14.0, align: Align::Center },
        Column { width: 38.0, align: Align::Left },
        Column { width: 92.0, align: Align::Left },
        Column { width: 18.0, align: Align::Center },
    ];
    page.set_line_width(THIN_LINE);

    let header = ["Day", "Date", "Task(s) Ongoing and/or Completed", "Hours"];
    let header_columns: Vec<Column> = columns
        .iter()
        .map(|column| Column { width: column.width, align: Align::Center })
        .collect();
    let mut y = 80.0;
    let wrapped = wrap_cells(&header_columns, &header[..], 10.0);
    y += draw_row(page, y, &header_columns, &wrapped, 0.0, VAlign::Top);

    for task in &report.tasks {
        let cells = [
            task.day.to_string(),
            long_date(&task.date),
            task.description.clone(),
            task.hours_spent.to_string(),
        ];
        let wrapped = wrap_cells(&columns, &cells[..], 10.0);
        y += draw_row(page, y, &columns, &wrapped, 0.0, VAlign::Top);
    }

    let y = y + 10.0;
    page.text(MARGIN_X, y, "Total hours completed for the week: ________________");
    page.text(95.0, y, &report.total_hours.to_string());

    page.text(
        MARGIN_X,
        y + 10.0,
        "Plans for next week (include notes on extra days, absences and make up days if applicable)",
    );
    draw_text_box(page, y + 12.0, &report.plans_for_next_week);
}

pub fn draw_end_of_term(page: &mut PdfPage, report: &EndOfTermReportRecord) {
    draw_title(page, END_OF_TERM_TITLE, 12.0, 134.0);
    page.text(MARGIN_X, 38.0, "To be submitted to Canvas by week 13.");

    labelled(page, MARGIN_X, 58.0, 48.0, "Student Name:", "__________________________", &report.student_name);
    labelled(page, 140.0, 145.0, 48.0, "ID:", "_____________________", &report.student_id.to_string());
    labelled(page, MARGIN_X, 58.0, 56.0, "Organisation:", "__________________________", &report.organisation);
    labelled(
        page,
        MARGIN_X,
        58.0,
        64.0,
        "Industry Supervisor:",
        "__________________________",
        &report.industry_supervisor,
    );
    labelled(page, 140.0, 149.0, 64.0, "Date:", "___________________", &long_date(&report.date_of_submit));

    page.set_font(Font::Bold, 10.0);
    page.text(
        MARGIN_X,
        76.0,
        "Rate your current level of knowledge on the following by ticking on the appropriate box.",
    );
    page.text(MARGIN_X, 81.0, "(Complete this in consultation with your industry supervisor)");

    let y = draw_rubric(page, 86.0, report) + 10.0;

    let student_box = draw_comment(page, y, "Student Comments:", &report.student_comments);
    let supervisor_top = y + student_box + 10.0;
    let supervisor_box = draw_comment(
        page,
        supervisor_top,
        "Supervisor Comments:",
        &report.supervisor_comments,
    );

    let y = supervisor_top + supervisor_box + 18.0;
    page.set_font(Font::Regular, 10.0);
    page.text(MARGIN_X, y, "Student Signature:");
    page.text(MARGIN_X + 30.0, y, "__________________________");
    page.text(MARGIN_X + 35.0, y, &report.student_signature);
    page.text(MARGIN_X + 110.0, y, "Date:");
    page.text(MARGIN_X + 120.0, y, "_____________________");
    page.text(MARGIN_X + 122.0, y, &long_date(&report.student_signature_date));

    let y = y + 10.0;
    page.text(MARGIN_X, y, "Supervisor Signature:");
    page.text(MARGIN_X + 35.0, y, "________________________");
    page.text(
        MARGIN_X + 38.0,
        y,
        report.supervisor_signature.as_deref().unwrap_or_default(),
    );
    page.text(MARGIN_X + 110.0, y, "Date:");
    page.text(MARGIN_X + 120.0, y, "_____________________");
    if let Some(signed_at) = report.supervisor_signature_date.as_deref() {
        page.text(MARGIN_X + 122.0, y, &long_date(signed_at));
    }
}

/// Returns the y coordinate of the table's bottom edge.
fn draw_rubric(page: &mut PdfPage, top: f64, report: &EndOfTermReportRecord) -> f64 {
    const QUESTION_WIDTH: f64 = 70.0;
    const HEADER_HEIGHT: f64 = 20.0;
    const ROW_MIN_HEIGHT: f64 = 10.0;
    let score_columns = MAX_SCORE as usize;
    let score_width = (CONTENT_WIDTH - QUESTION_WIDTH) / score_columns as f64;

    let mut columns = vec![Column { width: QUESTION_WIDTH, align: Align::Left }];
    columns.extend((0..score_columns).map(|_| Column { width: score_width, align: Align::Center }));

    page.set_line_width(THIN_LINE);
    page.set_font(Font::Regular, 9.0);

    // Highest score on the left, as on the paper form.
    let mut header = vec![String::new()];
    header.extend((0..score_columns).map(|column| score_description(score_for_column(column)).to_string()));
    let wrapped = wrap_cells(&columns, &header[..], 9.0);
    let header_height = draw_row(page, top, &columns, &wrapped, HEADER_HEIGHT, VAlign::Middle);

    page.set_font(Font::Regular, 10.0);
    page.text(MARGIN_X + 40.0, top + 5.0, "Your perception");
    page.text(MARGIN_X + 5.0, top + 18.0, "Knowledge");
    page.line(MARGIN_X, top, MARGIN_X + QUESTION_WIDTH, top + header_height);

    let mut y = top + header_height;
    page.set_font(Font::Regular, 9.0);
    for (index, question) in RUBRIC_QUESTIONS.iter().enumerate() {
        let mut cells = vec![format!("{}. {question}", index + 1)];
        cells.extend((0..score_columns).map(|_| String::new()));
        let wrapped = wrap_cells(&columns, &cells[..], 9.0);
        let height = draw_row(page, y, &columns, &wrapped, ROW_MIN_HEIGHT, VAlign::Middle);

        let chosen = report.score_for(question);
        let center_y = y + height / 2.0;
        for column in 0..score_columns {
            let center_x = MARGIN_X + QUESTION_WIDTH + score_width * (column as f64 + 0.5);
            page.circle(center_x, center_y, 2.0, Paint::Stroke);
            if chosen == Some(score_for_column(column)) {
                page.circle(center_x, center_y, 1.25, Paint::Fill);
            }
        }
        y += height;
    }
    y
}

fn score_for_column(column: usize) -> i64 {
    MAX_SCORE - column as i64
}

fn draw_title(page: &mut PdfPage, title: &str, size: f64, underline_end: f64) {
    page.set_font(Font::Bold, size);
    page.text(MARGIN_X, 30.0, title);
    page.set_line_width(0.5);
    page.line(MARGIN_X, 31.0, underline_end, 31.0);
    page.set_font(Font::Regular, 10.0);
}

/// Label, a ruled blank, and the value written over the blank.
fn labelled(page: &mut PdfPage, x: f64, blank_x: f64, y: f64, label: &str, blank: &str, value: &str) {
    page.text(x, y, label);
    page.text(blank_x, y, blank);
    page.text(blank_x + 2.0, y, value);
}

/// Returns the box height; the box starts 4mm below `y`.
fn draw_comment(page: &mut PdfPage, y: f64, label: &str, body: &str) -> f64 {
    page.set_font(Font::Bold, 10.0);
    page.text(MARGIN_X, y + 2.0, label);
    page.set_font(Font::Regular, 10.0);
    draw_text_box(page, y + 4.0, body)
}

fn draw_text_box(page: &mut PdfPage, top: f64, body: &str) -> f64 {
    let lines = wrap_text(body, CONTENT_WIDTH - 2.0 * BOX_PADDING, page.font_size());
    let height = BOX_MIN_HEIGHT.max(lines.len() as f64 * page.line_height() + 2.0 * BOX_PADDING);
    page.set_line_width(THIN_LINE);
    page.rect(MARGIN_X, top, CONTENT_WIDTH, height);
    page.text_lines(MARGIN_X + BOX_PADDING, top + 5.0, &lines);
    height
}

fn wrap_cells<S: AsRef<str>>(columns: &[Column], cells: &[S], font_size: f64) -> Vec<Vec<String>> {
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| wrap_text(cell.as_ref(), column.width - 2.0 * CELL_PADDING, font_size))
        .collect()
}

/// Draws one bordered table row starting at `top` and returns its height.
fn draw_row(
    page: &mut PdfPage,
    top: f64,
    columns: &[Column],
    cells: &[Vec<String>],
    min_height: f64,
    valign: VAlign,
) -> f64 {
    let line_height = page.line_height();
    let ascent = pt_to_mm(page.font_size()) * 0.75;
    let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let height = min_height.max(max_lines as f64 * line_height + 2.0 * CELL_PADDING);

    let mut x = MARGIN_X;
    for (column, lines) in columns.iter().zip(cells) {
        page.rect(x, top, column.width, height);

        let block = lines.len() as f64 * line_height;
        let first_baseline = match valign {
            VAlign::Top => top + CELL_PADDING + ascent,
            VAlign::Middle => top + (height - block) / 2.0 + ascent,
        };
        for (index, line) in lines.iter().enumerate() {
            let line_x = match column.align {
                Align::Left => x + CELL_PADDING,
                Align::Center => x + (column.width - text_width(line, page.font_size())) / 2.0,
            };
            page.text(line_x, first_baseline + line_height * index as f64, line);
        }
        x += column.width;
    }
    height
}
