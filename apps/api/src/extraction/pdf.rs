use std::panic;

use super::panic_message;

/// Extracts the text of every page in document order and concatenates it.
/// Page boundaries are not marked.
pub fn extract(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|payload| panic_message(payload.as_ref()))?
        .map_err(|e| e.to_string())?;

    Ok(pages.concat())
}
