//! Tesseract adapter.
//!
//! Runs the `tesseract` binary over a frame written to a temp file and
//! rebuilds a [`FrameRecognition`] from its TSV output. The TSV only has
//! word-level boxes, so symbol boxes are synthesized by dividing each word
//! box evenly across its characters.

use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::{FrameRecognition, RawWord, Rect, TextRecognizer};

pub struct TesseractCli {
    lang: String,
}

impl TesseractCli {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&mut self, image: &image::DynamicImage) -> Result<FrameRecognition> {
        let png = std::env::temp_dir().join(format!("epseek_ocr_{}.png", std::process::id()));
        image
            .save(&png)
            .with_context(|| format!("Write frame {}", png.display()))?;

        let output = Command::new("tesseract")
            .arg(&png)
            .arg("stdout")
            .args(["-l", &self.lang])
            .arg("tsv")
            .output()
            .context("Run tesseract")?;
        let _ = std::fs::remove_file(&png);

        if !output.status.success() {
            bail!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_tsv(&output.stdout)
    }
}

// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
// left, top, width, height, conf, text. Words are level 5.
fn parse_tsv(tsv: &[u8]) -> Result<FrameRecognition> {
    let mut rows = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv);

    let mut recognition = FrameRecognition::default();
    let mut line_keys: Vec<(u32, u32, u32)> = Vec::new();
    let mut line_words: Vec<Vec<String>> = Vec::new();

    for row in rows.records() {
        let row = row.context("Read tsv row")?;
        if row.get(0) != Some("5") {
            continue;
        }
        let text = row.get(11).unwrap_or("").to_string();
        if text.trim().is_empty() {
            continue;
        }
        let confidence = field::<f64>(&row, 10, "conf")? as i32;
        let bounds = Rect::new(
            field(&row, 6, "left")?,
            field(&row, 7, "top")?,
            field(&row, 8, "width")?,
            field(&row, 9, "height")?,
        );
        let key = (
            field(&row, 2, "block")?,
            field(&row, 3, "par")?,
            field(&row, 4, "line")?,
        );

        let chars = text.chars().count() as u32;
        for i in 0..chars {
            let x0 = bounds.x + bounds.w * i / chars;
            let x1 = bounds.x + bounds.w * (i + 1) / chars;
            recognition
                .symbols
                .push(Rect::new(x0, bounds.y, x1 - x0, bounds.h));
        }

        match line_keys.iter().position(|k| *k == key) {
            Some(pos) => line_words[pos].push(text.clone()),
            None => {
                line_keys.push(key);
                line_words.push(vec![text.clone()]);
            }
        }
        recognition.words.push(RawWord { text, confidence });
    }

    recognition.lines = line_words.into_iter().map(|words| words.join(" ")).collect();
    Ok(recognition)
}

fn field<T: std::str::FromStr>(row: &csv::StringRecord, idx: usize, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    row.get(idx)
        .with_context(|| format!("Missing {name} column"))?
        .trim()
        .parse()
        .with_context(|| format!("Bad {name} value"))
}
