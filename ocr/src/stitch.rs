//! Combines text spans whose boxes overlap.
//!
//! Detection-style engines recognize overlapping crops of the same region
//! and report the shared text twice. When two spans share most of a line
//! height, the splice estimates where the newcomer starts inside the
//! accumulated text from pixel offsets and character density, then verifies
//! the guess with an exact character overlap before merging.

use crate::{OcrWord, Rect};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TextSpan {
    pub text: String,
    pub bounds: Rect,
}

/// One span per retained word, using the alphanumeric form.
pub fn word_spans(words: &[OcrWord]) -> Vec<TextSpan> {
    words
        .iter()
        .map(|word| TextSpan {
            text: word.alphanum.clone(),
            bounds: word.bounds,
        })
        .collect()
}

/// Walk spans in reading order, splicing each into the running span when
/// their boxes say they cover the same text.
pub fn stitch_spans(spans: &[TextSpan]) -> Vec<TextSpan> {
    let Some(first) = spans.first() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut acc = first.clone();
    for span in &spans[1..] {
        match try_splice(&acc, span) {
            Some(combined) => acc = combined,
            None => {
                merged.push(acc);
                acc = span.clone();
            }
        }
    }
    merged.push(acc);
    merged
}

fn try_splice(left: &TextSpan, right: &TextSpan) -> Option<TextSpan> {
    let overlap = left.bounds.intersection(&right.bounds)?;
    if f64::from(overlap.h) / f64::from(left.bounds.h) <= 0.50 {
        return None;
    }

    // Read order on the shared line goes by x position, whatever order the
    // spans arrived in.
    let (l, r) = if right.bounds.x < left.bounds.x {
        (right, left)
    } else {
        (left, right)
    };
    let l_chars: Vec<char> = l.text.chars().collect();
    let r_chars: Vec<char> = r.text.chars().collect();
    if l.bounds.w == 0 {
        return None;
    }

    let density = l_chars.len() as f64 / f64::from(l.bounds.w);
    let naive = (f64::from(r.bounds.x - l.bounds.x) * density).round() as i64;

    for idx in naive - 2..=naive + 2 {
        if idx < 0 {
            continue;
        }
        let idx = idx as usize;
        if idx > l_chars.len() {
            break;
        }
        let clen = r_chars.len().min(l_chars.len() - idx);
        if l_chars[idx..idx + clen] != r_chars[..clen] {
            continue;
        }
        let mut text: String = l_chars[..idx].iter().collect();
        text.extend(r_chars.iter());
        let tail = idx + r_chars.len();
        if tail < l_chars.len() {
            text.extend(l_chars[tail..].iter());
        }
        return Some(TextSpan {
            text,
            bounds: left.bounds.union(&right.bounds),
        });
    }
    None
}
