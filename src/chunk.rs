//! Overlapping text chunker.
//!
//! Splits extracted document text into consecutive chunks no larger than
//! `max_chars` characters, where each chunk after the first repeats the final
//! `overlap` characters of its predecessor so context survives chunk
//! boundaries. Split points prefer natural boundaries, falling back in order:
//! paragraph (`\n\n`), line end, sentence end, word, raw character.
//!
//! The splitter never trims or rewrites text, so stripping the `overlap`-char
//! prefix from every chunk after the first and concatenating reconstructs the
//! input exactly.

use crate::error::PipelineError;

/// Split `text` into overlapping chunks of at most `max_chars` characters.
///
/// Deterministic for a given input and configuration. Text no longer than
/// `max_chars` (including empty text) yields exactly one chunk.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] when `max_chars` is zero or
/// `overlap >= max_chars`.
pub fn split(text: &str, max_chars: usize, overlap: usize) -> Result<Vec<String>, PipelineError> {
    if max_chars == 0 {
        return Err(PipelineError::Config("max_chars must be > 0".to_string()));
    }
    if overlap >= max_chars {
        return Err(PipelineError::Config(format!(
            "overlap ({}) must be smaller than max_chars ({})",
            overlap, max_chars
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    // Start of the current chunk in char positions. After the first chunk this
    // sits `overlap` chars before the end of the previous one.
    let mut start = 0usize;

    loop {
        let remaining = chars.len() - start;
        if remaining <= max_chars {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        // The chunk must extend past its overlap prefix, so every chunk is at
        // least overlap + 1 chars long and reconstruction stays exact.
        let min_end = start + overlap + 1;
        let hard_end = start + max_chars;
        let end = find_break(&chars, min_end, hard_end);

        chunks.push(chars[start..end].iter().collect());
        start = end - overlap;
    }

    Ok(chunks)
}

/// Pick a split position in `min_end..=max_end`, scanning backward from the
/// size limit so the chunk stays as large as its best available boundary
/// allows. Falls back to a hard cut at `max_end`.
fn find_break(chars: &[char], min_end: usize, max_end: usize) -> usize {
    // Paragraph boundary: position right after "\n\n".
    for end in (min_end..=max_end).rev() {
        if end >= 2 && chars[end - 1] == '\n' && chars[end - 2] == '\n' {
            return end;
        }
    }
    // Line end.
    for end in (min_end..=max_end).rev() {
        if chars[end - 1] == '\n' {
            return end;
        }
    }
    // Sentence end.
    for end in (min_end..=max_end).rev() {
        if matches!(chars[end - 1], '.' | '!' | '?') {
            return end;
        }
    }
    // Word boundary.
    for end in (min_end..=max_end).rev() {
        if chars[end - 1].is_whitespace() {
            return end;
        }
    }
    max_end
}
