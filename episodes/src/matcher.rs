use std::collections::HashSet;

use levenshtein::levenshtein;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Thresholds for fuzzy title matching.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchOptions {
	/// Absolute edit distance allowed between a token pair, as long as the
	/// title token is a full-length word.
	pub edit_tolerance: usize,
	/// Normalized similarity that matches on its own.
	pub similarity_strong: f64,
	/// Normalized similarity that matches when one token contains the other.
	pub similarity_weak: f64,
	/// Matched text must cover this share of the title's length, unless
	/// every title word matched.
	pub min_length_pct: f64,
	pub min_title_pct: f64,
	/// Share of the input text the matched words must account for.
	pub min_used_pct: f64,
}

impl Default for MatchOptions {
	fn default() -> Self {
		Self {
			edit_tolerance: 1,
			similarity_strong: 0.9,
			similarity_weak: 0.80,
			min_length_pct: 0.50,
			min_title_pct: 0.95,
			min_used_pct: 0.50,
		}
	}
}

/// Lowercase, fold diacritics away, strip punctuation, then drop tokens too
/// short or too common to tell titles apart.
pub fn tokenize(text: &str, min_len: usize, common: &HashSet<String>) -> Vec<String> {
	let folded: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
	folded
		.to_lowercase()
		.split_whitespace()
		.map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
		.filter(|word| word.chars().count() >= min_len && !common.contains(word))
		.collect()
}

fn words_match(ocr: &str, title: &str, min_len: usize, options: &MatchOptions) -> bool {
	let dist = levenshtein(ocr, title);
	if dist <= options.edit_tolerance && title.chars().count() >= min_len {
		return true;
	}
	let max_len = ocr.chars().count().max(title.chars().count());
	if max_len == 0 {
		return false;
	}
	let sim = 1.0 - dist as f64 / max_len as f64;
	sim > options.similarity_strong
		|| (sim > options.similarity_weak && (ocr.contains(title) || title.contains(ocr)))
}

/// Coverage of one candidate title by the recognized words.
#[derive(Debug, Clone, Copy)]
pub struct TitleScore {
	/// Share of the title's words that were matched.
	pub word_pct: f64,
	/// Title word count over matched word count.
	pub title_pct: f64,
	/// Matched text length over title length.
	pub length_pct: f64,
	/// Matched text length over input text length.
	pub used_pct: f64,
}

impl TitleScore {
	pub fn accepted(&self, options: &MatchOptions) -> bool {
		(self.length_pct > options.min_length_pct || self.word_pct == 1.0)
			&& (self.title_pct > options.min_title_pct || self.used_pct > options.min_used_pct)
	}
}

/// Greedily consume recognized tokens against the title's word pool and
/// score the coverage. Returns None when the title has no usable words.
pub fn score_title(
	ocr_words: &[String],
	input_len: usize,
	title: &str,
	min_len: usize,
	common: &HashSet<String>,
	options: &MatchOptions,
) -> Option<TitleScore> {
	let title_words = tokenize(title, min_len, common);
	if title_words.is_empty() {
		return None;
	}

	let total = title_words.len();
	let mut remaining = title_words;
	let mut matched: Vec<&str> = Vec::new();
	for word in ocr_words {
		let hit = remaining
			.iter()
			.position(|title_word| words_match(word, title_word, min_len, options));
		if let Some(pos) = hit {
			remaining.remove(pos);
			matched.push(word);
		}
	}

	let matched_len = matched.join(" ").chars().count();
	let title_len = title.chars().count();
	let word_pct = matched.len() as f64 / total as f64;
	let title_pct = if matched.is_empty() {
		0.0
	} else {
		total as f64 / matched.len() as f64
	};
	let length_pct = if title_len == 0 {
		0.0
	} else {
		matched_len as f64 / title_len as f64
	};
	let used_pct = if input_len == 0 {
		0.0
	} else {
		matched_len as f64 / input_len as f64
	};

	Some(TitleScore {
		word_pct,
		title_pct,
		length_pct,
		used_pct,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn no_common() -> HashSet<String> {
		HashSet::new()
	}

	#[test]
	fn tokenize_folds_and_strips() {
		assert_eq!(tokenize("Café Olé!", 3, &no_common()), vec!["cafe", "ole"]);
		assert_eq!(tokenize("  HOME,  again. ", 3, &no_common()), vec!["home", "again"]);
	}

	#[test]
	fn tokenize_drops_short_and_common() {
		let common: HashSet<String> = ["the".to_string()].into_iter().collect();
		assert_eq!(tokenize("The Way to Go Home", 3, &common), vec!["way", "home"]);
	}

	#[test]
	fn match_within_edit_tolerance() {
		let options = MatchOptions::default();
		assert!(words_match("home", "home", 3, &options));
		assert!(words_match("wey", "way", 3, &options));
		assert!(words_match("homc", "home", 3, &options));
		// A short title word gives the tolerance nothing to anchor on.
		assert!(!words_match("he", "be", 3, &options));
	}

	#[test]
	fn match_on_strong_similarity() {
		let options = MatchOptions {
			edit_tolerance: 0,
			..MatchOptions::default()
		};
		assert!(words_match("approximatly", "approximately", 3, &options));
		assert!(!words_match("night", "might", 3, &options));
	}

	#[test]
	fn match_on_containment() {
		let options = MatchOptions::default();
		assert!(words_match("understandi", "understanding", 3, &options));
		assert!(!words_match("watch", "watchman", 3, &options));
	}

	#[test]
	fn rejects_unrelated_words() {
		let options = MatchOptions::default();
		assert!(!words_match("kitchen", "garage", 3, &options));
	}

	#[test]
	fn scores_noisy_full_match() {
		let common: HashSet<String> = ["the".to_string()].into_iter().collect();
		let text = "thc long wey homc";
		let words: Vec<String> = text.split_whitespace().map(String::from).collect();
		let score = score_title(
			&words,
			text.chars().count(),
			"The Long Way Home",
			3,
			&common,
			&MatchOptions::default(),
		)
		.unwrap();
		assert_eq!(score.word_pct, 1.0);
		assert!(score.accepted(&MatchOptions::default()));
	}

	#[test]
	fn partial_cover_is_rejected() {
		let words = vec!["night".to_string()];
		let score = score_title(&words, 5, "Night Watchman", 3, &no_common(), &MatchOptions::default()).unwrap();
		assert!(score.word_pct < 1.0);
		assert!(!score.accepted(&MatchOptions::default()));
	}

	#[test]
	fn title_of_only_common_words_scores_nothing() {
		let common: HashSet<String> = ["the".to_string()].into_iter().collect();
		let words = vec!["the".to_string()];
		assert!(score_title(&words, 3, "The", 3, &common, &MatchOptions::default()).is_none());
	}
}
