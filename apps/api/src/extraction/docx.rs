//! DOCX text extraction over the `docx-rs` document tree.
//!
//! Only paragraphs that are direct children of the body count. Tables are
//! separate body children and are skipped; text boxes live inside drawings and
//! are never reached by the run walk.

use std::panic;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::panic_message;

/// Extracts every body paragraph in order, each followed by a newline.
pub fn extract(bytes: &[u8]) -> Result<String, String> {
    // docx-rs indexes attributes unchecked in a few part readers.
    let docx = panic::catch_unwind(|| docx_rs::read_docx(bytes))
        .map_err(|payload| panic_message(payload.as_ref()))?
        .map_err(|e| e.to_string())?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            text.push_str(&paragraph_text(paragraph));
            text.push('\n');
        }
    }
    Ok(text)
}

/// Runs and hyperlinked runs, concatenated with no separator.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}
