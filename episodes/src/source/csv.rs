use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::EpisodeInfo;
use crate::id::EpisodeId;

// Headerless layout: episode, dvdep, origdate, title, absolute (optional).
const COL_EPISODE: usize = 0;
const COL_DVDEP: usize = 1;
const COL_ORIGDATE: usize = 2;
const COL_TITLE: usize = 3;
const COL_ABSOLUTE: usize = 4;

/// Load episode records from a CSV file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<EpisodeInfo>> {
	let path = path.as_ref();
	let file = File::open(path).with_context(|| format!("Open episode list {}", path.display()))?;
	load_reader(file).with_context(|| format!("Parse episode list {}", path.display()))
}

/// Load episode records from CSV text.
pub fn load_reader(reader: impl Read) -> Result<Vec<EpisodeInfo>> {
	let mut rows = csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.from_reader(reader);

	let mut episodes = Vec::new();
	for (idx, row) in rows.records().enumerate() {
		let row = row.with_context(|| format!("Row {}", idx + 1))?;
		let info = parse_row(&row).with_context(|| format!("Row {}", idx + 1))?;
		episodes.push(info);
	}
	Ok(episodes)
}

fn parse_row(row: &csv::StringRecord) -> Result<EpisodeInfo> {
	let aired: EpisodeId = row.get(COL_EPISODE).unwrap_or("").trim().parse()?;

	// The dvd column is either a full id or just a segment number tacked
	// onto the aired id. Empty means the dvd order matches the aired order.
	let dvdep = row.get(COL_DVDEP).unwrap_or("").trim();
	let dvd = if dvdep.contains('x') {
		dvdep.parse()?
	} else if dvdep.is_empty() {
		aired
	} else {
		let segment = dvdep
			.parse()
			.with_context(|| format!("Dvd segment {dvdep:?}"))?;
		EpisodeId::with_segment(aired.season, aired.episode, segment)
	};

	let absolute = match row.get(COL_ABSOLUTE).map(str::trim) {
		Some(s) if !s.is_empty() => Some(s.parse().with_context(|| format!("Absolute number {s:?}"))?),
		_ => None,
	};

	Ok(EpisodeInfo {
		aired,
		dvd,
		title: row.get(COL_TITLE).unwrap_or("").trim().to_string(),
		absolute,
		air_date: row
			.get(COL_ORIGDATE)
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(String::from),
		production_code: None,
		extra: None,
	})
}
