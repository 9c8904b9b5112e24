//! Persistent tool configuration.
//!
//! Stored as JSON in a platform-appropriate config directory. Everything
//! here has a sane default, so the file only needs to exist when a series
//! calls for different thresholds.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language passed to the OCR engine.
    pub tesseract_lang: String,

    /// Seconds between probed frames. When unset, one frame at the media's
    /// probed frame rate.
    pub sample_interval: Option<f64>,

    /// Window widths (seconds from the search start) favored ahead of the
    /// rest of the range, widest first.
    pub windows: Vec<f64>,

    /// Words that mean the probe has landed in the credits.
    pub past_title_words: Vec<String>,

    /// Recognized words below this confidence are ignored.
    pub confidence_threshold: i32,

    /// Words this short are ignored, both in recognition and in titles.
    pub min_word_len: usize,

    /// Extra words the matcher treats as too common to identify a title.
    pub common_words: Vec<String>,

    pub matching: episodes::MatchOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tesseract_lang: "eng".to_string(),
            sample_interval: None,
            windows: vec![180.0, 30.0, 5.0],
            past_title_words: crate::scan::DEFAULT_PAST_TITLE
                .iter()
                .map(|w| w.to_string())
                .collect(),
            confidence_threshold: 65,
            min_word_len: 3,
            common_words: Vec::new(),
            matching: episodes::MatchOptions::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("epseek.json"))
    }

    /// Load configuration from disk, falling back to defaults.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Failed to load config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    pub fn catalog_options(&self) -> episodes::CatalogOptions {
        episodes::CatalogOptions {
            min_word_len: self.min_word_len,
            extra_common_words: self.common_words.clone(),
            matching: self.matching.clone(),
        }
    }

    pub fn scan_options(&self, interval: f64) -> crate::scan::ScanOptions {
        crate::scan::ScanOptions {
            interval,
            windows: self.windows.clone(),
            past_title_words: self.past_title_words.clone(),
            merge: ocr::MergeOptions {
                confidence_threshold: self.confidence_threshold,
                min_word_len: self.min_word_len,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tesseract_lang, "eng");
        assert_eq!(back.windows, vec![180.0, 30.0, 5.0]);
        assert_eq!(back.confidence_threshold, 65);
    }
}
