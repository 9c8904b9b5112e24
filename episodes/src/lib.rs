use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};

pub mod id;
mod matcher;
mod schema;
pub mod source;

pub use id::{EpisodeId, EpisodeKey};
pub use matcher::MatchOptions;

/// Words too generic to tell titles apart no matter the series.
const SEED_COMMON: &[&str] = &["the", "and", "for", "with", "from", "that", "this", "part"];

/// One episode as the catalog sources describe it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EpisodeInfo {
	pub aired: EpisodeId,
	pub dvd: EpisodeId,
	pub title: String,
	pub absolute: Option<u32>,
	pub air_date: Option<String>,
	pub production_code: Option<String>,
	pub extra: Option<String>,
}

/// Options applied when building a catalog.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogOptions {
	/// Tokens shorter than this never participate in matching.
	pub min_word_len: usize,
	/// Caller-supplied words to suppress on top of the derived set.
	pub extra_common_words: Vec<String>,
	pub matching: MatchOptions,
}

impl Default for CatalogOptions {
	fn default() -> Self {
		Self {
			min_word_len: 3,
			extra_common_words: Vec::new(),
			matching: MatchOptions::default(),
		}
	}
}

/// An ordered, validated episode list for one series, with the word
/// statistics title matching needs.
#[derive(Debug, Clone)]
pub struct Catalog {
	episodes: Vec<EpisodeInfo>,
	key: EpisodeKey,
	options: CatalogOptions,
	common_words: HashSet<String>,
}

impl Catalog {
	pub fn build(mut episodes: Vec<EpisodeInfo>, key: EpisodeKey, options: CatalogOptions) -> Result<Self> {
		for info in &episodes {
			if info.title.trim().is_empty() {
				bail!("Episode {} has no title", info.aired);
			}
			if key == EpisodeKey::Absolute && info.absolute.is_none() {
				bail!("Episode {} has no absolute number", info.aired);
			}
		}

		// Sources routinely park two aired episodes on one dvd slot, so the
		// dedup pass always walks dvd order before the lookup key applies.
		episodes.sort_by_key(|info| info.dvd);
		dedup_dvd(&mut episodes);
		episodes.sort_by_key(|info| key.id_of(info));

		let common_words = derive_common_words(&episodes, &options);
		Ok(Self {
			episodes,
			key,
			options,
			common_words,
		})
	}

	pub fn episodes(&self) -> &[EpisodeInfo] {
		&self.episodes
	}

	pub fn key(&self) -> EpisodeKey {
		self.key
	}

	pub fn common_words(&self) -> &HashSet<String> {
		&self.common_words
	}

	/// Resolve recognized text to a cataloged episode, or nothing.
	///
	/// Never guesses: a candidate must clear the acceptance thresholds, and
	/// among those that do, the one explaining the most of the input wins.
	pub fn find_by_title(&self, text: &str) -> Option<&EpisodeInfo> {
		let ocr_words = matcher::tokenize(text, self.options.min_word_len, &self.common_words);
		if ocr_words.is_empty() {
			return None;
		}
		let input_len = text.chars().count();

		let mut best: Option<(f64, f64, &EpisodeInfo)> = None;
		for info in &self.episodes {
			let score = matcher::score_title(
				&ocr_words,
				input_len,
				&info.title,
				self.options.min_word_len,
				&self.common_words,
				&self.options.matching,
			);
			let Some(score) = score else {
				continue;
			};
			if !score.accepted(&self.options.matching) {
				continue;
			}
			let better = match &best {
				None => true,
				Some((used, word, _)) => {
					score.used_pct > *used || (score.used_pct == *used && score.word_pct > *word)
				}
			};
			if better {
				best = Some((score.used_pct, score.word_pct, info));
			}
		}
		best.map(|(_, _, info)| info)
	}

	/// Render an episode's id under the catalog key, zero-padded wide enough
	/// for the season's episode count, minimum two digits.
	pub fn format_episode_id(&self, info: &EpisodeInfo, with_segment: bool) -> String {
		let id = self.key.id_of(info);
		let count = match self.key {
			EpisodeKey::Absolute => self.episodes.len(),
			_ => self
				.episodes
				.iter()
				.filter(|other| self.key.id_of(other).season == id.season)
				.count(),
		};
		let width = count.max(1).to_string().len().max(2);
		id.format(width, with_segment)
	}
}

fn dedup_dvd(episodes: &mut [EpisodeInfo]) {
	for idx in 1..episodes.len() {
		if episodes[idx - 1].dvd != episodes[idx].dvd {
			continue;
		}
		let mut part = episodes[idx - 1].dvd.segment.unwrap_or(0);
		if part == 0 {
			part = 1;
		}
		episodes[idx - 1].dvd.segment = Some(part);
		episodes[idx].dvd.segment = Some(part + 1);
	}
}

fn derive_common_words(episodes: &[EpisodeInfo], options: &CatalogOptions) -> HashSet<String> {
	let mut words: HashSet<String> = SEED_COMMON.iter().map(|word| word.to_string()).collect();
	words.extend(options.extra_common_words.iter().map(|word| word.to_lowercase()));

	let none = HashSet::new();
	let mut counts: HashMap<String, usize> = HashMap::new();
	for info in episodes {
		for token in matcher::tokenize(&info.title, options.min_word_len, &none) {
			*counts.entry(token).or_insert(0) += 1;
		}
	}
	if counts.is_empty() {
		return words;
	}

	// A word showing up well above the per-word average is a series fixture,
	// not a discriminator.
	let total: usize = counts.values().sum();
	let average = total as f64 / counts.len() as f64;
	for (token, count) in counts {
		if count as f64 >= average * 3.0 {
			words.insert(token);
		}
	}
	words
}

#[cfg(test)]
mod tests {
	use super::*;

	fn info(aired: &str, dvd: &str, title: &str) -> EpisodeInfo {
		EpisodeInfo {
			aired: aired.parse().unwrap(),
			dvd: dvd.parse().unwrap(),
			title: title.to_string(),
			absolute: None,
			air_date: None,
			production_code: None,
			extra: None,
		}
	}

	#[test]
	fn doubled_dvd_slots_get_segments() {
		let catalog = Catalog::build(
			vec![
				info("3x07", "3x07", "First Half"),
				info("3x08", "3x07", "Second Half"),
				info("3x09", "3x08", "Untouched"),
			],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap();
		let ids: Vec<String> = catalog
			.episodes()
			.iter()
			.map(|info| info.dvd.to_string())
			.collect();
		assert_eq!(ids, vec!["3x07.1", "3x07.2", "3x08"]);
	}

	#[test]
	fn dedup_respects_existing_fraction() {
		let catalog = Catalog::build(
			vec![
				info("3x07", "3x07.1", "First Half"),
				info("3x08", "3x07.1", "Second Half"),
			],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap();
		let ids: Vec<String> = catalog
			.episodes()
			.iter()
			.map(|info| info.dvd.to_string())
			.collect();
		assert_eq!(ids, vec!["3x07.1", "3x07.2"]);
	}

	#[test]
	fn build_requires_titles() {
		let err = Catalog::build(
			vec![info("1x01", "1x01", "  ")],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap_err();
		assert!(err.to_string().contains("1x01"));
	}

	#[test]
	fn absolute_key_requires_numbers() {
		assert!(
			Catalog::build(
				vec![info("1x01", "1x01", "Pilot")],
				EpisodeKey::Absolute,
				CatalogOptions::default(),
			)
			.is_err()
		);
	}

	#[test]
	fn recurring_words_become_common() {
		let catalog = Catalog::build(
			vec![
				info("1x01", "1x01", "Doctor in the House"),
				info("1x02", "1x02", "Doctor Afloat"),
				info("1x03", "1x03", "Doctor on Holiday"),
				info("1x04", "1x04", "Doctor Goes West"),
				info("1x05", "1x05", "Doctor at Sea"),
				info("1x06", "1x06", "Homecoming"),
			],
			EpisodeKey::Aired,
			CatalogOptions::default(),
		)
		.unwrap();
		assert!(catalog.common_words().contains("doctor"));
		// The word alone can no longer identify anything.
		assert_eq!(catalog.find_by_title("doctor").map(|i| &i.title), None);
	}

	#[test]
	fn finds_title_despite_ocr_noise() {
		let catalog = Catalog::build(
			vec![
				info("1x01", "1x01", "Dead End"),
				info("1x02", "1x02", "The Long Way Home"),
				info("1x03", "1x03", "Night Watch"),
			],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap();
		let found = catalog.find_by_title("thc long wey homc").unwrap();
		assert_eq!(found.aired, EpisodeId::new(1, 2));
	}

	#[test]
	fn ignores_unrelated_text() {
		let catalog = Catalog::build(
			vec![
				info("1x01", "1x01", "Dead End"),
				info("1x02", "1x02", "The Long Way Home"),
			],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap();
		assert!(catalog.find_by_title("directed by someone famous").is_none());
		assert!(catalog.find_by_title("").is_none());
	}

	#[test]
	fn fuller_coverage_wins() {
		let catalog = Catalog::build(
			vec![
				info("1x01", "1x01", "Home"),
				info("1x02", "1x02", "Home Again"),
			],
			EpisodeKey::Dvd,
			CatalogOptions::default(),
		)
		.unwrap();
		let found = catalog.find_by_title("home again").unwrap();
		assert_eq!(found.aired, EpisodeId::new(1, 2));
	}

	#[test]
	fn id_width_follows_season_size() {
		let mut episodes: Vec<EpisodeInfo> = (1u32..=120)
			.map(|n| {
				let mut entry = info("1x01", "1x01", "Filler");
				entry.aired = EpisodeId::new(1, n);
				entry.dvd = entry.aired;
				entry.title = format!("Entry {n}");
				entry
			})
			.collect();
		episodes.push(info("2x01", "2x01", "Short Season"));
		let catalog = Catalog::build(episodes, EpisodeKey::Aired, CatalogOptions::default()).unwrap();

		let long = catalog
			.episodes()
			.iter()
			.find(|e| e.aired == EpisodeId::new(1, 7))
			.unwrap();
		assert_eq!(catalog.format_episode_id(long, true), "1x007");
		let short = catalog
			.episodes()
			.iter()
			.find(|e| e.aired.season == 2)
			.unwrap();
		assert_eq!(catalog.format_episode_id(short, true), "2x01");
	}
}
