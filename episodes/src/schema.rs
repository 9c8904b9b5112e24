//! Wire types for the episode metadata service.

pub const SEARCH_URL: &str = "https://api.tvmaze.com/singlesearch/shows";

#[derive(Debug, serde::Deserialize)]
pub struct Show {
	pub name: String,
	#[serde(rename = "_embedded")]
	pub embedded: Embedded,
}

#[derive(Debug, serde::Deserialize)]
pub struct Embedded {
	pub episodes: Vec<Episode>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Episode {
	pub season: u32,
	/// Absent on specials.
	pub number: Option<u32>,
	pub name: String,
	pub airdate: Option<String>,
}
