//! Renders a plain-text summary into a downloadable PDF.
//!
//! Layout is fixed: US Letter, Helvetica, a "Summary:" header at the top and
//! one text line per input line below it. Lines are never wrapped; a line
//! wider than the page runs off the right edge. When the body reaches the
//! bottom margin it continues on a fresh page at the same left margin.
//!
//! No Info dictionary is written, so the same summary always produces the
//! same bytes.

use crate::error::{AppError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const HEADER: &str = "Summary:";

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 100;
const HEADER_Y: i64 = 750;
const BODY_TOP_Y: i64 = 730;
const BOTTOM_MARGIN: i64 = 50;
const HEADER_FONT_SIZE: i64 = 12;
const BODY_FONT_SIZE: i64 = 10;
const LEADING: i64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlacedLine {
    text: String,
    font_size: i64,
    y: i64,
}

pub fn render_summary_pdf(summary: &str) -> Result<Vec<u8>> {
    let pages = layout_pages(summary);
    let bytes = write_document(&pages).map_err(|e| AppError::RenderFailed(e.to_string()))?;
    tracing::debug!(pages = pages.len(), bytes = bytes.len(), "rendered summary PDF");
    Ok(bytes)
}

fn layout_pages(summary: &str) -> Vec<Vec<PlacedLine>> {
    let mut pages = vec![vec![PlacedLine {
        text: HEADER.to_string(),
        font_size: HEADER_FONT_SIZE,
        y: HEADER_Y,
    }]];
    let mut y = BODY_TOP_Y;

    for line in summary.lines() {
        if y < BOTTOM_MARGIN {
            pages.push(Vec::new());
            y = HEADER_Y;
        }
        // Blank lines only advance the cursor.
        if !line.trim().is_empty() {
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text: line.replace('\t', "    "),
                    font_size: BODY_FONT_SIZE,
                    y,
                });
            }
        }
        y -= LEADING;
    }

    pages
}

fn write_document(pages: &[Vec<PlacedLine>]) -> lopdf::Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in pages {
        let page_id = write_page(&mut doc, pages_id, font_id, lines)?;
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

fn write_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    lines: &[PlacedLine],
) -> lopdf::Result<ObjectId> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        // One text object per line so extractors see a line break after each.
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec!["F1".into(), line.font_size.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![LEFT_MARGIN.into(), line.y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    }))
}

/// Maps text onto the standard font's WinAnsi code page; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}
