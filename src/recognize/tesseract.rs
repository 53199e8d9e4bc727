//! Backend driving the `tesseract` command-line tool.

use std::io::{Cursor, ErrorKind, Write};
use std::process::{Command, Stdio};

use image::{GrayImage, ImageFormat};

use super::{LocalBox, Recognition, Recognizer};
use crate::analysis::RecognitionConfig;
use crate::error::{Error, Result};

/// TSV level of word rows.
const WORD_LEVEL: u32 = 5;

/// Runs `tesseract stdin stdout tsv` on each crop and parses word boxes.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
    language: String,
    psm: u8,
}

impl TesseractRecognizer {
    /// Create a backend using `tesseract` from `PATH`, English, block mode.
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            psm: 6,
        }
    }

    /// Create a backend with the language and segmentation mode of `config`.
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new()
            .with_language(config.language.as_str())
            .with_psm(config.psm)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn psm(&self) -> u8 {
        self.psm
    }

    /// Set the executable to run.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the language pack(s), e.g. `"eng+deu"`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the page segmentation mode.
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    fn run(&self, png: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language, "--psm"])
            .arg(self.psm.to_string())
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    Error::BackendUnavailable(format!("{} not found on PATH", self.binary))
                }
                _ => Error::Io(e),
            })?;

        // The child may exit before reading everything; reap it either way.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Recognition(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written.map_err(|e| {
            Error::Recognition(format!("cannot send crop to {}: {}", self.binary, e))
        })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Recognition> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::Recognition(format!("cannot encode crop: {}", e)))?;

        parse_tsv(&self.run(&png)?)
    }
}

/// Parse tesseract TSV output into line-joined text and word boxes.
pub fn parse_tsv(tsv: &str) -> Result<Recognition> {
    let mut result = Recognition::default();
    let mut lines: Vec<String> = Vec::new();
    let mut current_line: Option<(u32, u32, u32)> = None;

    for (index, row) in tsv.lines().enumerate() {
        if index == 0 && row.starts_with("level") {
            continue;
        }
        if row.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            return Err(Error::Recognition(format!(
                "malformed tsv row {}: expected 12 fields, found {}",
                index + 1,
                fields.len()
            )));
        }

        let number = |i: usize| -> Result<i64> {
            fields[i].trim().parse::<i64>().map_err(|_| {
                Error::Recognition(format!("malformed tsv row {}: field {}", index + 1, i + 1))
            })
        };

        if number(0)? != WORD_LEVEL as i64 {
            continue;
        }
        let word = fields[11..].join("\t");
        let word = word.trim();
        if word.is_empty() {
            continue;
        }

        let key = (number(2)? as u32, number(3)? as u32, number(4)? as u32);
        match lines.last_mut() {
            Some(line) if current_line == Some(key) => {
                line.push(' ');
                line.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_line = Some(key);
            }
        }

        result.boxes.push(LocalBox::new(
            number(6)? as i32,
            number(7)? as i32,
            number(8)? as i32,
            number(9)? as i32,
        ));
    }

    result.text = lines.join("\n");
    Ok(result)
}
