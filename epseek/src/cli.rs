use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser, ValueEnum};

use crate::config::Config;
use crate::scan::{self, FrameSource, ScanRange};
use crate::timecode;
use crate::video::{self, FfmpegFrames};

#[derive(Parser, Debug)]
#[command(name = "epseek", version, about = "Find episode title cards in ripped video")]
#[command(group(ArgGroup::new("catalog").args(["episodes", "series"])))]
pub struct Args {
	/// Video file to search.
	pub video: PathBuf,

	/// Episode list CSV: aired id, dvd id, air date, title, absolute number.
	#[arg(long, value_name = "FILE")]
	pub episodes: Option<PathBuf>,

	/// Series name to look up remotely instead of a CSV file.
	#[arg(long, value_name = "NAME")]
	pub series: Option<String>,

	/// Numbering used to order and print episode ids.
	#[arg(long, value_enum, default_value = "dvd")]
	pub key: KeyArg,

	/// Timecode to start searching at.
	#[arg(long, default_value = "0")]
	pub start: String,

	/// Timecode worth of media to search; defaults to the rest of the file.
	#[arg(long)]
	pub length: Option<String>,

	/// OCR language, overriding the configured one.
	#[arg(long)]
	pub lang: Option<String>,

	/// Print the episode list and exit.
	#[arg(long)]
	pub list: bool,

	/// Recognize a single frame at this timecode, print its text, and exit.
	#[arg(long, value_name = "TIMECODE")]
	pub ocr_at: Option<String>,

	/// Print the result as JSON.
	#[arg(long)]
	pub json: bool,

	/// Write the active configuration to the config file and exit.
	#[arg(long)]
	pub write_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyArg {
	Aired,
	Dvd,
	Absolute,
}

impl From<KeyArg> for episodes::EpisodeKey {
	fn from(key: KeyArg) -> Self {
		match key {
			KeyArg::Aired => Self::Aired,
			KeyArg::Dvd => Self::Dvd,
			KeyArg::Absolute => Self::Absolute,
		}
	}
}

pub fn run() -> Result<()> {
	let args = Args::parse();
	let mut config = Config::load_or_default();
	if let Some(lang) = &args.lang {
		config.tesseract_lang = lang.clone();
	}

	if args.write_config {
		config.save()?;
		return Ok(());
	}

	let start = timecode::parse_timecode(&args.start).context("Bad --start")?;

	if let Some(tc) = &args.ocr_at {
		let at = timecode::parse_timecode(tc).context("Bad --ocr-at")?;
		return dump_text(&args.video, at, &config);
	}

	let episodes = match (&args.episodes, &args.series) {
		(Some(path), None) => episodes::source::csv::load_file(path)?,
		(None, Some(series)) => episodes::source::remote::try_populated(series)?,
		_ => bail!("Pass exactly one of --episodes or --series"),
	};
	let catalog = episodes::Catalog::build(episodes, args.key.into(), config.catalog_options())?;

	if args.list {
		for info in catalog.episodes() {
			println!("{} {}", catalog.format_episode_id(info, true), info.title);
		}
		return Ok(());
	}

	let duration = video::probe_duration(&args.video)?;
	let length = match &args.length {
		Some(tc) => timecode::parse_timecode(tc).context("Bad --length")?,
		None => (duration - start).max(0.0),
	};
	let interval = match config.sample_interval {
		Some(interval) => interval,
		None => match video::probe_frame_rate(&args.video) {
			Ok(rate) => 1.0 / rate,
			Err(err) => {
				log::warn!("Assuming 24 fps: {err:#}");
				1.0 / 24.0
			}
		},
	};

	let mut frames = FfmpegFrames::new(&args.video);
	let mut recognizer = ocr::tesseract::TesseractCli::new(config.tesseract_lang.clone());
	let options = config.scan_options(interval);
	let range = ScanRange { start, length };

	let hit = scan::locate_title_card(&mut frames, &mut recognizer, &catalog, range, &options);
	let Some(hit) = hit else {
		bail!("No title card found in {}", args.video.display());
	};

	if args.json {
		println!("{}", report_json(&catalog, &hit)?);
	} else {
		println!(
			"{} {} at {} ({:.3}s)",
			catalog.format_episode_id(&hit.episode, true),
			hit.episode.title,
			timecode::format_timecode(hit.offset),
			hit.offset,
		);
	}
	Ok(())
}

/// One-shot recognition for eyeballing what the engine sees in a frame.
fn dump_text(video: &Path, at: f64, config: &Config) -> Result<()> {
	use ocr::TextRecognizer;

	let mut frames = FfmpegFrames::new(video);
	let frame = frames
		.frame_at(at)
		.with_context(|| format!("No frame at {}", timecode::format_timecode(at)))?;

	let mut recognizer = ocr::tesseract::TesseractCli::new(config.tesseract_lang.clone());
	let raw = recognizer.recognize(&frame)?;
	let merge = ocr::MergeOptions {
		confidence_threshold: config.confidence_threshold,
		min_word_len: config.min_word_len,
	};
	let Some(block) = ocr::merge_frame(&raw, 0, &merge) else {
		bail!("No text at {}", timecode::format_timecode(at));
	};

	println!("{}", block.text());
	for span in ocr::stitch_spans(&ocr::word_spans(&block.words)) {
		println!(
			"  {} [{},{} {}x{}]",
			span.text, span.bounds.x, span.bounds.y, span.bounds.w, span.bounds.h
		);
	}
	Ok(())
}

fn report_json(catalog: &episodes::Catalog, hit: &scan::TitleCardHit) -> Result<String> {
	let value = serde_json::json!({
		"episode": catalog.format_episode_id(&hit.episode, true),
		"title": hit.episode.title,
		"offset": hit.offset,
		"timecode": timecode::format_timecode(hit.offset),
		"text": hit.text,
		"info": hit.episode,
	});
	serde_json::to_string_pretty(&value).context("Encode result")
}
