//! The title card search.
//!
//! Frames are probed in bisection order so a hit near the middle of the
//! range is found as fast as one near the front, with configurable windows
//! near the start favored first. When a probe lands in the end credits the
//! search narrows to just before that point, since the title card can only
//! be earlier.

use episodes::{Catalog, EpisodeInfo};
use ocr::{MergeOptions, TextRecognizer};

use crate::order;

/// Credit-roll words that mean the title card is already behind the probe.
pub const DEFAULT_PAST_TITLE: &[&str] = &[
	"producer",
	"guest",
	"starring",
	"directed",
	"produced",
	"written",
	"writer",
	"storyboard",
];

pub trait FrameSource {
	fn frame_at(&mut self, seconds: f64) -> Option<image::DynamicImage>;
}

#[derive(Debug, Clone, Copy)]
pub struct ScanRange {
	/// Seconds into the media the search begins at.
	pub start: f64,
	/// Seconds of media to search.
	pub length: f64,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Seconds between candidate slots.
	pub interval: f64,
	/// Window widths favored ahead of the rest of the range, widest first.
	pub windows: Vec<f64>,
	pub past_title_words: Vec<String>,
	pub merge: MergeOptions,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			interval: 1.0 / 24.0,
			windows: vec![180.0, 30.0, 5.0],
			past_title_words: DEFAULT_PAST_TITLE.iter().map(|w| w.to_string()).collect(),
			merge: MergeOptions::default(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct TitleCardHit {
	pub episode: EpisodeInfo,
	/// Seconds from the start of the media.
	pub offset: f64,
	/// The recognized text that matched.
	pub text: String,
}

/// Probe frames until one carries a cataloged episode title.
pub fn locate_title_card(
	frames: &mut dyn FrameSource,
	recognizer: &mut dyn TextRecognizer,
	catalog: &Catalog,
	range: ScanRange,
	options: &ScanOptions,
) -> Option<TitleCardHit> {
	if options.interval <= 0.0 || range.length <= 0.0 {
		return None;
	}
	let slots = (range.length.ceil() / options.interval) as usize;
	let mut order = order::bisect_order(slots);

	for window in &options.windows {
		if *window <= range.length {
			order::prefer_window(
				&mut order,
				0,
				range.start,
				options.interval,
				(range.start, range.start + window),
			);
		}
	}

	let mut past_title_at: Option<f64> = None;
	let mut cursor = 0;
	while cursor < order.len() {
		let slot = order[cursor];
		cursor += 1;
		let offset = range.start + slot as f64 * options.interval;

		if let Some(bound) = past_title_at {
			if offset > bound {
				continue;
			}
		}

		let Some(frame) = frames.frame_at(offset) else {
			continue;
		};
		let raw = match recognizer.recognize(&frame) {
			Ok(raw) => raw,
			Err(err) => {
				log::debug!("Recognition failed at {offset:.3}: {err:#}");
				continue;
			}
		};
		let Some(block) = ocr::merge_frame(&raw, slot, &options.merge) else {
			continue;
		};

		let text = block.text();
		let lower = text.to_lowercase();
		log::debug!("Probe {offset:.3}: {text:?}");

		if options
			.past_title_words
			.iter()
			.any(|word| lower.contains(word.as_str()))
		{
			past_title_at = Some(offset);
			order::prefer_window(
				&mut order,
				cursor,
				range.start,
				options.interval,
				(offset - 15.0, offset),
			);
		}

		// A credit frame can still carry the title, so it is matched either way.
		if let Some(found) = catalog.find_by_title(&lower) {
			return Some(TitleCardHit {
				episode: found.clone(),
				offset,
				text,
			});
		}
	}
	None
}
