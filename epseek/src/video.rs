//! Media probing and frame extraction through ffprobe/ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::scan::FrameSource;

/// Media duration in seconds.
pub fn probe_duration(path: &Path) -> Result<f64> {
	let text = ffprobe(path, &["-show_entries", "format=duration"])?;
	text.trim()
		.parse()
		.with_context(|| format!("Duration of {}", path.display()))
}

/// Frame rate of the first video stream.
pub fn probe_frame_rate(path: &Path) -> Result<f64> {
	let text = ffprobe(path, &["-select_streams", "v:0", "-show_entries", "stream=r_frame_rate"])?;
	parse_frame_rate(text.trim()).with_context(|| format!("Frame rate of {}", path.display()))
}

fn ffprobe(path: &Path, query: &[&str]) -> Result<String> {
	let output = Command::new("ffprobe")
		.args(["-v", "error"])
		.args(query)
		.args(["-of", "default=noprint_wrappers=1:nokey=1"])
		.arg(path)
		.output()
		.context("Run ffprobe")?;
	if !output.status.success() {
		bail!(
			"ffprobe failed on {}: {}",
			path.display(),
			String::from_utf8_lossy(&output.stderr).trim()
		);
	}
	Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ffprobe reports rates as a rational like "24000/1001".
fn parse_frame_rate(text: &str) -> Result<f64> {
	let rate = match text.split_once('/') {
		Some((num, den)) => {
			let num: f64 = num.trim().parse().context("Rate numerator")?;
			let den: f64 = den.trim().parse().context("Rate denominator")?;
			if den == 0.0 {
				bail!("Zero denominator in {text:?}");
			}
			num / den
		}
		None => text.trim().parse().context("Rate")?,
	};
	if rate <= 0.0 {
		bail!("Unusable frame rate {text:?}");
	}
	Ok(rate)
}

/// Pulls single frames out of a video file with ffmpeg.
pub struct FfmpegFrames {
	path: PathBuf,
	scratch: PathBuf,
}

impl FfmpegFrames {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			scratch: std::env::temp_dir().join(format!("epseek_frame_{}.png", std::process::id())),
		}
	}
}

impl FrameSource for FfmpegFrames {
	fn frame_at(&mut self, seconds: f64) -> Option<image::DynamicImage> {
		let status = Command::new("ffmpeg")
			.args(["-hide_banner", "-loglevel", "error", "-y"])
			.args(["-ss", &format!("{seconds:.3}")])
			.arg("-i")
			.arg(&self.path)
			.args(["-frames:v", "1"])
			.arg(&self.scratch)
			.status();
		match status {
			Ok(status) if status.success() => {}
			Ok(status) => {
				log::debug!("ffmpeg exited with {status} at {seconds:.3}");
				return None;
			}
			Err(err) => {
				log::debug!("ffmpeg did not run: {err}");
				return None;
			}
		}
		match image::open(&self.scratch) {
			Ok(frame) => Some(frame),
			Err(err) => {
				log::debug!("Unreadable frame at {seconds:.3}: {err}");
				None
			}
		}
	}
}

impl Drop for FfmpegFrames {
	fn drop(&mut self) {
		let _ = std::fs::remove_file(&self.scratch);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_rational_rates() {
		assert_eq!(parse_frame_rate("25").unwrap(), 25.0);
		assert_eq!(parse_frame_rate("30000/1001").unwrap(), 30000.0 / 1001.0);
		assert!((parse_frame_rate("24000/1001").unwrap() - 23.976).abs() < 0.001);
	}

	#[test]
	fn rejects_unusable_rates() {
		assert!(parse_frame_rate("").is_err());
		assert!(parse_frame_rate("0/0").is_err());
		assert!(parse_frame_rate("abc").is_err());
		assert!(parse_frame_rate("0").is_err());
	}
}
