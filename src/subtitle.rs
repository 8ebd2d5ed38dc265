use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{CaptionParseError, Result, SrtLingoError};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// One timed subtitle unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    /// Index as declared in the source file, carried through unchanged
    pub sequence_number: u32,
    /// Literal timing line, never interpreted
    pub time_range: String,
    pub source_text: String,
    pub translated_text: String,
}

impl CaptionEntry {
    pub fn new(sequence_number: u32, time_range: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            sequence_number,
            time_range: time_range.into(),
            source_text: source_text.into(),
            translated_text: String::new(),
        }
    }

    /// Copy of this entry carrying the given translation
    pub fn with_translation(&self, translated_text: impl Into<String>) -> Self {
        Self {
            translated_text: translated_text.into(),
            ..self.clone()
        }
    }
}

/// Split file content into lines, dropping a leading byte order mark.
/// Both `\n` and `\r\n` endings are accepted.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content).lines().collect()
}

/// Parse SRT lines into caption entries with empty translations.
///
/// Blank lines separate blocks and are skipped. Each block is an index line, a
/// timing line and zero or more text lines. A non-numeric index or a block
/// without a timing line fails the whole parse.
pub fn parse_captions<S: AsRef<str>>(lines: &[S]) -> std::result::Result<Vec<CaptionEntry>, CaptionParseError> {
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_ref();
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        let sequence_number: u32 = line.trim().parse().map_err(|_| {
            CaptionParseError::InvalidSequenceNumber {
                line: i + 1,
                value: line.to_string(),
            }
        })?;

        let time_range = lines
            .get(i + 1)
            .ok_or(CaptionParseError::MissingTimeRange {
                line: i + 1,
                sequence: sequence_number,
            })?
            .as_ref()
            .to_string();

        i += 2;
        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].as_ref().trim().is_empty() {
            text_lines.push(lines[i].as_ref());
            i += 1;
        }

        entries.push(CaptionEntry::new(
            sequence_number,
            time_range,
            text_lines.join("\n").trim(),
        ));
    }

    Ok(entries)
}

/// Render entries as SRT using their translated text
pub fn render_srt(entries: &[CaptionEntry]) -> String {
    let mut srt_content = String::new();

    for entry in entries {
        srt_content.push_str(&format!(
            "{}\n{}\n{}\n\n",
            entry.sequence_number, entry.time_range, entry.translated_text
        ));
    }

    srt_content
}

/// Output location for an input file: the file name with every occurrence of
/// `strip_token` removed, placed in `output_dir`.
pub fn output_path_for(input_path: &Path, output_dir: &Path, strip_token: &str) -> Result<PathBuf> {
    let file_name = input_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SrtLingoError::InvalidFileName(input_path.display().to_string()))?;

    let output_name = if strip_token.is_empty() {
        file_name.to_string()
    } else {
        file_name.replace(strip_token, "")
    };

    if output_name.is_empty() {
        return Err(SrtLingoError::InvalidFileName(format!(
            "{} is empty after removing '{}'",
            file_name, strip_token
        )));
    }

    Ok(output_dir.join(output_name))
}

/// Captions of one input file together with where their translation goes
#[derive(Debug, Clone)]
pub struct CaptionFile {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub entries: Vec<CaptionEntry>,
}

impl CaptionFile {
    /// Read and parse an SRT file
    pub async fn load<P: AsRef<Path>>(input_path: P, output_dir: &Path, strip_token: &str) -> Result<Self> {
        let input_path = input_path.as_ref();
        let output_path = output_path_for(input_path, output_dir, strip_token)?;

        let content = fs::read_to_string(input_path)
            .await
            .map_err(|source| SrtLingoError::FileRead {
                path: input_path.display().to_string(),
                source,
            })?;

        let entries = parse_captions(&split_lines(&content)).map_err(|source| SrtLingoError::Parse {
            file: input_path.display().to_string(),
            source,
        })?;

        debug!("Parsed {} captions from {}", entries.len(), input_path.display());

        Ok(Self {
            input_path: input_path.to_path_buf(),
            output_path,
            entries,
        })
    }

    pub fn file_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }

    /// Original texts in caption order
    pub fn source_texts(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.source_text.clone()).collect()
    }

    /// Write the translated captions, replacing any existing file
    pub async fn write(&self) -> Result<()> {
        info!("Writing SRT file: {}", self.output_path.display());

        fs::write(&self.output_path, render_srt(&self.entries))
            .await
            .map_err(|source| SrtLingoError::Write {
                path: self.output_path.display().to_string(),
                source,
            })
    }
}
