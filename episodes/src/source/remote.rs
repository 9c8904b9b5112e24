use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::EpisodeInfo;
use crate::id::EpisodeId;
use crate::schema;

fn cache_path(series: &str) -> Option<PathBuf> {
	let slug: String = series
		.trim()
		.to_lowercase()
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
		.collect();
	dirs::cache_dir().map(|dir| dir.join("epseek").join(format!("{slug}.json")))
}

fn load_cache(series: &str) -> Result<Vec<EpisodeInfo>> {
	let path = cache_path(series).context("No cache directory on this platform")?;
	let file = File::open(&path).with_context(|| format!("Open cache {}", path.display()))?;
	let episodes = serde_json::from_reader(BufReader::new(file))
		.with_context(|| format!("Parse cache {}", path.display()))?;
	Ok(episodes)
}

fn save_cache(series: &str, episodes: &[EpisodeInfo]) -> Result<()> {
	let Some(path) = cache_path(series) else {
		return Ok(());
	};
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.with_context(|| format!("Create cache dir {}", parent.display()))?;
	}

	let tmp = path.with_extension("json.tmp");
	let file = File::create(&tmp).with_context(|| format!("Write cache temp {}", tmp.display()))?;
	let mut writer = BufWriter::new(file);
	serde_json::to_writer(&mut writer, episodes).context("Serialize cache")?;
	writer.flush().context("Flush cache")?;

	// Windows can't rename over an existing file.
	if std::fs::rename(&tmp, &path).is_err() {
		let _ = std::fs::remove_file(&path);
		std::fs::rename(&tmp, &path).with_context(|| format!("Persist cache {}", path.display()))?;
	}
	Ok(())
}

fn fetch_remote(series: &str) -> Result<Vec<EpisodeInfo>> {
	let mut res = ureq::get(schema::SEARCH_URL)
		.query("q", series)
		.query("embed", "episodes")
		.call()
		.with_context(|| format!("Look up series {series:?}"))?;
	let show = res
		.body_mut()
		.read_json::<schema::Show>()
		.context("Decode series response")?;
	log::info!("Fetched {} entries for {:?}", show.embedded.episodes.len(), show.name);
	Ok(map_show(&show))
}

fn map_show(show: &schema::Show) -> Vec<EpisodeInfo> {
	let mut episodes = Vec::new();
	for ep in &show.embedded.episodes {
		// Specials carry no number and can't be addressed by id.
		let Some(number) = ep.number else {
			log::debug!("Skipping unnumbered entry {:?}", ep.name);
			continue;
		};
		let aired = EpisodeId::new(ep.season, number);
		episodes.push(EpisodeInfo {
			aired,
			// The service has no dvd ordering of its own.
			dvd: aired,
			title: ep.name.clone(),
			absolute: Some(episodes.len() as u32 + 1),
			air_date: ep.airdate.clone().filter(|date| !date.is_empty()),
			production_code: None,
			extra: None,
		});
	}
	episodes
}

/// Fetch the episode list from the network, keeping a local copy around so
/// a later run can survive being offline.
pub fn try_populated(series: &str) -> Result<Vec<EpisodeInfo>> {
	match fetch_remote(series) {
		Ok(episodes) => {
			let _ = save_cache(series, &episodes);
			Ok(episodes)
		}
		Err(err) => match load_cache(series) {
			Ok(cached) => {
				log::warn!("Using cached episode list due to network error: {err:#}");
				Ok(cached)
			}
			Err(_) => Err(err),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_show_numbering() {
		let show: schema::Show = serde_json::from_str(
			r#"{
				"name": "Some Series",
				"_embedded": {"episodes": [
					{"season": 1, "number": 1, "name": "Pilot", "airdate": "1999-03-28"},
					{"season": 1, "number": null, "name": "Special", "airdate": ""},
					{"season": 2, "number": 1, "name": "Return", "airdate": ""}
				]}
			}"#,
		)
		.unwrap();
		let episodes = map_show(&show);
		assert_eq!(episodes.len(), 2);
		assert_eq!(episodes[0].aired, EpisodeId::new(1, 1));
		assert_eq!(episodes[0].dvd, episodes[0].aired);
		assert_eq!(episodes[0].absolute, Some(1));
		assert_eq!(episodes[0].air_date.as_deref(), Some("1999-03-28"));
		assert_eq!(episodes[1].aired, EpisodeId::new(2, 1));
		assert_eq!(episodes[1].absolute, Some(2));
		assert_eq!(episodes[1].air_date, None);
	}

	#[test]
	fn cache_paths_are_slugged() {
		if let Some(path) = cache_path("Some Series: Redux") {
			let name = path.file_name().unwrap().to_string_lossy().into_owned();
			assert_eq!(name, "some-series--redux.json");
		}
	}
}
