use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

static ID_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*x\s*(\d+)(?:\.(\d+))?\s*$").unwrap());

/// Season/episode identity with an optional sub-part segment.
///
/// Ordering is by season, then episode, with a missing segment sorting
/// before any defined segment; the derives rely on the field order here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct EpisodeId {
	pub season: u32,
	pub episode: u32,
	pub segment: Option<u32>,
}

impl EpisodeId {
	pub fn new(season: u32, episode: u32) -> Self {
		Self {
			season,
			episode,
			segment: None,
		}
	}

	pub fn with_segment(season: u32, episode: u32, segment: u32) -> Self {
		Self {
			season,
			episode,
			segment: Some(segment),
		}
	}

	/// Renders `"{season}x{episode}"` with the episode zero-padded to `width`.
	pub fn format(&self, width: usize, with_segment: bool) -> String {
		let mut out = format!("{}x{:0width$}", self.season, self.episode);
		if with_segment {
			if let Some(segment) = self.segment {
				out.push_str(&format!(".{segment}"));
			}
		}
		out
	}
}

impl fmt::Display for EpisodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format(2, true))
	}
}

impl FromStr for EpisodeId {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let caps = ID_RE
			.captures(s)
			.with_context(|| format!("Not an episode id: {s:?}"))?;
		let season = caps[1].parse().with_context(|| format!("Season in {s:?}"))?;
		let episode = caps[2].parse().with_context(|| format!("Episode in {s:?}"))?;
		let segment = match caps.get(3) {
			Some(m) => Some(m.as_str().parse().with_context(|| format!("Segment in {s:?}"))?),
			None => None,
		};
		Ok(Self {
			season,
			episode,
			segment,
		})
	}
}

/// Which numbering an episode is looked up and ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EpisodeKey {
	Aired,
	Dvd,
	Absolute,
}

impl EpisodeKey {
	/// The id this key selects from an episode record.
	///
	/// Absolute numbering renders as season 1. Callers must have validated
	/// that absolute numbers exist under this key; `Catalog::build` does.
	pub fn id_of(&self, info: &crate::EpisodeInfo) -> EpisodeId {
		match self {
			Self::Aired => info.aired,
			Self::Dvd => info.dvd,
			Self::Absolute => EpisodeId::new(1, info.absolute.unwrap_or(0)),
		}
	}
}
