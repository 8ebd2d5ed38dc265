use futures::{StreamExt, TryStreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SrtLingoError};
use crate::subtitle::CaptionFile;
use crate::translate::{BackendFactory, CaptionTranslator, TranslationBackend};

/// Translates every `.srt` file of the input directory into the output directory
pub struct Pipeline {
    config: Config,
    translator: CaptionTranslator,
}

impl Pipeline {
    pub fn new(config: Config, backend: Box<dyn TranslationBackend>) -> Self {
        let translator = CaptionTranslator::new(backend, &config);
        Self { config, translator }
    }

    /// Build the pipeline with the backend named in the configuration
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = BackendFactory::create_backend(&config.backend)
            .map_err(|e| SrtLingoError::Config(format!("Failed to create backend: {}", e)))?;
        Ok(Self::new(config, backend))
    }

    /// Check that the backend answers and has the configured model
    pub async fn check_backend(&self) -> Result<()> {
        self.translator
            .backend()
            .check_availability()
            .await
            .map_err(SrtLingoError::BackendUnavailable)
    }

    /// Run the whole translation. The first failure stops the run.
    pub async fn translate(&self) -> Result<()> {
        let input_dir = &self.config.directories.input;
        let output_dir = &self.config.directories.output;

        info!(
            "Translating subtitles from {} to {} using {}",
            self.config.languages.input,
            self.config.languages.output,
            self.translator.backend().describe()
        );

        let srt_files = discover_srt_files(input_dir)?;
        info!("Found {} subtitle files in {}", srt_files.len(), input_dir.display());

        fs::create_dir_all(output_dir)
            .await
            .map_err(|source| SrtLingoError::Write {
                path: output_dir.display().to_string(),
                source,
            })?;

        for srt_file in &srt_files {
            self.process_file(srt_file).await?;
        }

        info!("Translated {} subtitle files", srt_files.len());
        Ok(())
    }

    async fn process_file(&self, srt_path: &Path) -> Result<()> {
        info!("Processing file: {}", srt_path.display());

        let mut caption_file = CaptionFile::load(
            srt_path,
            &self.config.directories.output,
            &self.config.output.replace_string,
        )
        .await?;

        info!(
            "Read file: {} with {} captions",
            caption_file.file_name(),
            caption_file.entries.len()
        );

        self.translate_entries(&mut caption_file).await?;
        caption_file.write().await?;

        info!("Finished: {}", caption_file.file_name());
        Ok(())
    }

    /// Translate every caption of a file, writing results back by index.
    /// Context is always taken from the original texts, so up to
    /// `pipeline.concurrency` captions may be in flight without changing the output.
    async fn translate_entries(&self, caption_file: &mut CaptionFile) -> Result<()> {
        let file_name = caption_file.file_name();
        let source_texts = caption_file.source_texts();
        let total = source_texts.len();
        let progress = self.progress_bar(total, &file_name);

        let translations: Vec<String> = {
            let entries = &caption_file.entries;
            let source_texts = &source_texts;
            let file_name = &file_name;
            let progress = &progress;

            stream::iter(0..total)
                .map(move |index| async move {
                    let entry = &entries[index];
                    info!("┌─ Translating caption {}/{} ────────", index + 1, total);
                    info!("│ Source: {}", entry.source_text);

                    let translation = self
                        .translator
                        .translate_caption(source_texts, index)
                        .await
                        .map_err(|source| {
                            warn!("│ Failed: {}", source);
                            SrtLingoError::Backend {
                                file: file_name.clone(),
                                sequence: entry.sequence_number,
                                source,
                            }
                        })?;

                    info!("│ Target: {}", translation);
                    info!("└─────────────────────────────────────");
                    progress.inc(1);
                    Ok::<String, SrtLingoError>(translation)
                })
                .buffered(self.config.pipeline.concurrency.max(1))
                .try_collect::<Vec<String>>()
                .await?
        };

        for (index, translation) in translations.into_iter().enumerate() {
            caption_file.entries[index] = caption_file.entries[index].with_translation(translation);
        }

        progress.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, total: usize, file_name: &str) -> ProgressBar {
        if !self.config.pipeline.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress.set_message(file_name.to_string());
        progress
    }
}

/// List `.srt` files (any case) directly inside `input_dir`, sorted by name
pub fn discover_srt_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let directory_error = |source: std::io::Error| SrtLingoError::DirectoryRead {
        path: input_dir.display().to_string(),
        source,
    };

    if !input_dir.is_dir() {
        return Err(directory_error(std::io::Error::other("not a directory")));
    }

    let mut srt_files = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| directory_error(e.into()))?;
        let is_srt = entry.file_name().to_string_lossy().to_lowercase().ends_with(".srt");

        if !is_srt {
            continue;
        }

        // Links are resolved only for subtitle names. A broken one is kept
        // so that loading it reports the read failure for that file.
        let is_file = if entry.path_is_symlink() {
            std::fs::metadata(entry.path())
                .map(|metadata| metadata.is_file())
                .unwrap_or(true)
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            warn!("Skipping {}: not a regular file", entry.path().display());
            continue;
        }
        srt_files.push(entry.into_path());
    }

    Ok(srt_files)
}
