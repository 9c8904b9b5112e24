//! Reassembles raw recognition output into clean text blocks.
//!
//! Engines report three parallel views of a frame: word texts with
//! confidences, symbol boxes in reading order, and line strings. The merger
//! walks the symbol boxes, carves them into words by character count, drops
//! words too uncertain or too short to trust, and regroups the survivors
//! into the engine's lines.

use crate::{FrameRecognition, Rect};

#[derive(Debug, Clone, serde::Serialize)]
pub struct OcrWord {
    pub text: String,
    /// `text` reduced to its alphanumeric characters.
    pub alphanum: String,
    pub confidence: i32,
    /// Union of the word's symbol boxes.
    pub bounds: Rect,
    #[serde(skip)]
    pub symbols: Vec<Rect>,
    /// Frame slot the word was recognized in.
    pub frame: usize,
    /// Position among the retained words of its block.
    pub index: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OcrBlock {
    /// Retained word texts grouped by engine line.
    pub lines: Vec<Vec<String>>,
    pub words: Vec<OcrWord>,
    pub bounds: Rect,
}

impl OcrBlock {
    /// All retained text, lines joined by single spaces.
    pub fn text(&self) -> String {
        let lines: Vec<String> = self.lines.iter().map(|line| line.join(" ")).collect();
        lines.join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Words below this confidence are dropped.
    pub confidence_threshold: i32,
    /// Words whose alphanumeric form is this short or shorter are dropped.
    pub min_word_len: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 65,
            min_word_len: 3,
        }
    }
}

/// Merge one frame's raw recognition into a block, or nothing when no word
/// survives the filters.
pub fn merge_frame(raw: &FrameRecognition, frame: usize, options: &MergeOptions) -> Option<OcrBlock> {
    if raw.words.is_empty() || raw.symbols.is_empty() {
        return None;
    }

    let line_counts: Vec<usize> = raw
        .lines
        .iter()
        .map(|line| line.split_whitespace().count())
        .collect();
    // When the line rendition disagrees with the word list the grouping
    // would drift, so everything lands on one synthetic line instead.
    let aligned = line_counts.iter().sum::<usize>() == raw.words.len();
    if !aligned {
        log::debug!(
            "Line rendition covers {} words, engine reported {}",
            line_counts.iter().sum::<usize>(),
            raw.words.len()
        );
    }

    let mut words: Vec<OcrWord> = Vec::new();
    let mut lines: Vec<Vec<String>> = vec![Vec::new()];
    let mut word = 0;
    let mut consumed = 0;
    let mut boxes: Option<Rect> = None;
    let mut line = 0;
    let mut line_start = 0;

    for (sym_idx, symbol) in raw.symbols.iter().enumerate() {
        if word >= raw.words.len() {
            break;
        }
        boxes = Some(match boxes {
            Some(acc) => acc.union(symbol),
            None => *symbol,
        });
        consumed += 1;

        let raw_word = &raw.words[word];
        let char_count = raw_word.text.chars().count();
        if consumed >= char_count {
            let alphanum: String = raw_word
                .text
                .trim()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            if raw_word.confidence >= options.confidence_threshold
                && alphanum.chars().count() > options.min_word_len
            {
                let first = sym_idx + 1 - char_count;
                if let Some(current) = lines.last_mut() {
                    current.push(raw_word.text.clone());
                }
                words.push(OcrWord {
                    text: raw_word.text.clone(),
                    alphanum,
                    confidence: raw_word.confidence,
                    bounds: boxes.unwrap_or(*symbol),
                    symbols: raw.symbols[first..=sym_idx].to_vec(),
                    frame,
                    index: words.len(),
                });
            }

            word += 1;
            if aligned {
                while line < line_counts.len() && word - line_start >= line_counts[line] {
                    line_start += line_counts[line];
                    line += 1;
                    lines.push(Vec::new());
                }
            }
            consumed = 0;
            boxes = None;
        }
    }

    if words.is_empty() {
        return None;
    }

    if !aligned {
        lines = vec![words.iter().map(|w| w.text.clone()).collect()];
    }
    lines.retain(|line| !line.is_empty());

    let mut bounds = words[0].bounds;
    for w in &words[1..] {
        bounds = bounds.union(&w.bounds);
    }
    Some(OcrBlock { lines, words, bounds })
}
