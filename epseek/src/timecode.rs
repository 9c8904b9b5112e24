use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

static TIMECODE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\d+(?::\d+)*(?:[.,]\d+)?$").unwrap());

/// Parse `[[hours:]minutes:]seconds[.fraction]` into seconds. A comma works
/// as the decimal separator too, as subtitle timestamps write it.
pub fn parse_timecode(tc: &str) -> Result<f64> {
	let tc = tc.trim();
	if !TIMECODE_RE.is_match(tc) {
		bail!("Not a timecode: {tc:?}");
	}

	let normalized = tc.replace(',', ".");
	let (whole, fraction) = match normalized.split_once('.') {
		Some((whole, frac)) => {
			let frac: f64 = format!("0.{frac}")
				.parse()
				.with_context(|| format!("Fraction of {tc:?}"))?;
			(whole.to_string(), frac)
		}
		None => (normalized, 0.0),
	};

	let mut seconds = 0.0;
	for (pos, part) in whole.split(':').rev().enumerate() {
		let value: f64 = part
			.parse()
			.with_context(|| format!("Field {part:?} of {tc:?}"))?;
		seconds += value * 60_f64.powi(pos as i32);
	}
	Ok(seconds + fraction)
}

/// Render seconds as a compact timecode, leading zero fields stripped and
/// fractions cut to milliseconds.
pub fn format_timecode(seconds: f64) -> String {
	let whole = seconds.floor();
	let fraction = seconds - whole;
	let whole = whole as u64;
	let mut text = format!("{}:{:02}:{:02}", whole / 3600, (whole / 60) % 60, whole % 60);
	if fraction > 0.0 {
		text.push_str(&format!("{fraction:.6}")[1..]);
	}
	if seconds == 0.0 {
		return text;
	}

	let mut out = text.trim_start_matches(['0', ':']).to_string();
	if let Some(dp) = out.rfind('.') {
		if dp + 4 < out.len() {
			out.truncate(dp + 4);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_seconds_and_fields() {
		assert_eq!(parse_timecode("90").unwrap(), 90.0);
		assert_eq!(parse_timecode("1:30").unwrap(), 90.0);
		assert_eq!(parse_timecode("1:02:03").unwrap(), 3723.0);
		assert_eq!(parse_timecode("1:23.500").unwrap(), 83.5);
		assert_eq!(parse_timecode("1,5").unwrap(), 1.5);
	}

	#[test]
	fn rejects_garbage() {
		assert!(parse_timecode("").is_err());
		assert!(parse_timecode("abc").is_err());
		assert!(parse_timecode("1:xx").is_err());
		assert!(parse_timecode("-5").is_err());
	}

	#[test]
	fn formats_compactly() {
		assert_eq!(format_timecode(0.0), "0:00:00");
		assert_eq!(format_timecode(65.0), "1:05");
		assert_eq!(format_timecode(83.5), "1:23.500");
		assert_eq!(format_timecode(3723.0), "1:02:03");
		assert_eq!(format_timecode(600.0), "10:00");
	}

	#[test]
	fn sub_second_keeps_fraction_only() {
		assert_eq!(format_timecode(0.5), ".500");
	}

	#[test]
	fn round_trips() {
		for &seconds in &[83.5, 3723.0, 65.0] {
			assert_eq!(parse_timecode(&format_timecode(seconds)).unwrap(), seconds);
		}
	}
}
