//! End-to-end conversion: optimize, chunk, plan, synthesize.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::error::{ConversionError, Result};
use crate::optimize::TextOptimizer;
use crate::session::SessionPlanner;
use crate::source::SourceDescriptor;
use crate::text::{DEFAULT_MAX_LENGTH, TextChunk, chunk_text, sanitize_filename_at};
use crate::tts::{TtsBackend, TtsOptions};

/// Audio produced by a successful conversion.
///
/// `audio[i]` was written to `file_paths[i]` and came from chunk `i`.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub audio: Vec<Vec<u8>>,
    pub file_paths: Vec<PathBuf>,
    pub directory: PathBuf,
    /// Non-fatal problems hit along the way
    pub warnings: Vec<String>,
}

impl ConversionResult {
    pub fn file_count(&self) -> usize {
        self.file_paths.len()
    }

    /// File names without the directory, in chunk order.
    pub fn file_names(&self) -> Vec<String> {
        self.file_paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.audio.iter().map(Vec::len).sum()
    }
}

/// Drives a conversion with a speech backend and an optional optimizer.
pub struct Converter {
    backend: Box<dyn TtsBackend>,
    optimizer: Option<Box<dyn TextOptimizer>>,
    planner: SessionPlanner,
    max_length: usize,
    /// Problems found while assembling the converter, reported with each result
    setup_warnings: Vec<String>,
}

impl Converter {
    pub fn new(backend: Box<dyn TtsBackend>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            optimizer: None,
            planner: SessionPlanner::new(output_root),
            max_length: DEFAULT_MAX_LENGTH,
            setup_warnings: Vec::new(),
        }
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn TextOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Attach an optimizer if one could be built. A failed setup is not
    /// fatal: conversions run on the original text and report a warning.
    pub fn try_with_optimizer(mut self, optimizer: anyhow::Result<Box<dyn TextOptimizer>>) -> Self {
        match optimizer {
            Ok(optimizer) => self.optimizer = Some(optimizer),
            Err(source) => {
                let warning = ConversionError::OptimizerUnavailable { source }.to_string();
                log::warn!("{}", warning);
                self.optimizer = None;
                self.setup_warnings.push(warning);
            }
        }
        self
    }

    pub fn has_optimizer(&self) -> bool {
        self.optimizer.is_some()
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Convert `text` into one audio file per chunk.
    pub async fn convert(
        &self,
        text: &str,
        source: &SourceDescriptor,
        options: &TtsOptions,
        optimize: bool,
    ) -> Result<ConversionResult> {
        self.convert_with_progress(text, source, options, optimize, |_, _| {})
            .await
    }

    /// Like [`convert`](Self::convert), calling `on_progress(done, total)`
    /// after each chunk is written.
    pub async fn convert_with_progress<F>(
        &self,
        text: &str,
        source: &SourceDescriptor,
        options: &TtsOptions,
        optimize: bool,
        mut on_progress: F,
    ) -> Result<ConversionResult>
    where
        F: FnMut(usize, usize),
    {
        let mut warnings = self.setup_warnings.clone();

        let text = match (&self.optimizer, optimize) {
            (Some(optimizer), true) => match optimizer.optimize(text).await {
                Ok(optimized) => {
                    log::info!(
                        "Optimized text: {} -> {} characters",
                        text.chars().count(),
                        optimized.chars().count()
                    );
                    optimized
                }
                Err(source) => {
                    let warning = ConversionError::Optimization { source }.to_string();
                    log::warn!("{}", warning);
                    warnings.push(warning);
                    text.to_string()
                }
            },
            _ => text.to_string(),
        };

        let now = Local::now();
        let base_name = sanitize_filename_at(source, &now);

        let chunks = chunk_text(&text, self.max_length);
        if chunks.is_empty() {
            return Err(ConversionError::NoText);
        }
        let total = chunks.len();

        let plan = self.planner.plan_at(&base_name, total, &now)?;

        let mut audio = Vec::with_capacity(total);
        for (chunk, path) in chunks.iter().zip(&plan.file_paths) {
            audio.push(self.synthesize_chunk(chunk, path, total, options).await?);
            on_progress(chunk.index + 1, total);
        }

        log::info!(
            "Wrote {} file(s) to {}",
            plan.file_paths.len(),
            plan.directory.display()
        );

        Ok(ConversionResult {
            audio,
            file_paths: plan.file_paths,
            directory: plan.directory,
            warnings,
        })
    }

    async fn synthesize_chunk(
        &self,
        chunk: &TextChunk,
        path: &Path,
        total: usize,
        options: &TtsOptions,
    ) -> Result<Vec<u8>> {
        log::debug!(
            "Synthesizing chunk {}/{} ({} chars) with {}",
            chunk.index + 1,
            total,
            chunk.text.chars().count(),
            self.backend.name()
        );

        self.backend
            .synthesize(&chunk.text, path, options)
            .await
            .map_err(|source| ConversionError::Synthesis {
                chunk: chunk.index + 1,
                total,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Writes the chunk text as the "audio".
    #[derive(Default)]
    struct EchoBackend {
        calls: AtomicUsize,
        fail_on: Option<usize>,
        texts: Mutex<Vec<String>>,
    }

    impl EchoBackend {
        fn failing_on(call: usize) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl TtsBackend for Arc<EchoBackend> {
        async fn synthesize(
            &self,
            text: &str,
            output_path: &Path,
            _options: &TtsOptions,
        ) -> anyhow::Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                anyhow::bail!("service unavailable");
            }
            self.texts.lock().unwrap().push(text.to_string());
            let bytes = text.as_bytes().to_vec();
            tokio::fs::write(output_path, &bytes).await?;
            Ok(bytes)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct FixedOptimizer(anyhow::Result<String>);

    #[async_trait]
    impl TextOptimizer for FixedOptimizer {
        async fn optimize(&self, _text: &str) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn converter(backend: &Arc<EchoBackend>, root: &TempDir) -> Converter {
        Converter::new(Box::new(backend.clone()), root.path())
    }

    fn session_dirs(root: &TempDir) -> usize {
        std::fs::read_dir(root.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_twelve_thousand_chars_make_three_files() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());
        let text = "word ".repeat(2400);
        assert_eq!(text.len(), 12_000);

        let result = converter(&backend, &root)
            .convert(&text, &SourceDescriptor::pdf("report.pdf"), &TtsOptions::new(), false)
            .await
            .unwrap();

        assert_eq!(result.file_count(), 3);
        assert_eq!(result.audio.len(), 3);
        assert!(result.warnings.is_empty());
        assert_eq!(session_dirs(&root), 1);

        for (audio, path) in result.audio.iter().zip(&result.file_paths) {
            assert_eq!(path.parent().unwrap(), result.directory);
            assert_eq!(&std::fs::read(path).unwrap(), audio);
        }
        assert_eq!(
            result.file_names(),
            vec![
                "report_part_1_of_3.wav",
                "report_part_2_of_3.wav",
                "report_part_3_of_3.wav",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_chunk_has_plain_name() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let result = converter(&backend, &root)
            .convert(
                "Hello there.",
                &SourceDescriptor::url("https://www.example.com/posts/intro.html"),
                &TtsOptions::new(),
                false,
            )
            .await
            .unwrap();

        assert_eq!(result.file_names(), vec!["intro.wav"]);
        let dir_name = result.directory.file_name().unwrap().to_string_lossy();
        assert!(dir_name.starts_with("intro_"));
        assert_eq!(dir_name.len(), "intro_".len() + 15);
    }

    #[tokio::test]
    async fn test_text_source_named_by_timestamp() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let result = converter(&backend, &root)
            .convert("Some text.", &SourceDescriptor::text(), &TtsOptions::new(), false)
            .await
            .unwrap();

        let name = &result.file_names()[0];
        let stem = name.strip_suffix(".wav").unwrap();
        let stamp = stem.strip_prefix("text_audio_").unwrap();
        assert_eq!(stamp.len(), 15);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, crate::TIMESTAMP_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn test_optimizer_output_is_synthesized() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let result = converter(&backend, &root)
            .with_optimizer(Box::new(FixedOptimizer(Ok("Polished.".to_string()))))
            .convert("rough", &SourceDescriptor::text(), &TtsOptions::new(), true)
            .await
            .unwrap();

        assert_eq!(backend.texts.lock().unwrap().as_slice(), ["Polished."]);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_optimizer_skipped_when_disabled() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        converter(&backend, &root)
            .with_optimizer(Box::new(FixedOptimizer(Ok("Polished.".to_string()))))
            .convert("rough", &SourceDescriptor::text(), &TtsOptions::new(), false)
            .await
            .unwrap();

        assert_eq!(backend.texts.lock().unwrap().as_slice(), ["rough"]);
    }

    #[tokio::test]
    async fn test_optimizer_failure_falls_back_with_warning() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let result = converter(&backend, &root)
            .with_optimizer(Box::new(FixedOptimizer(Err(anyhow::anyhow!("rate limited")))))
            .convert("original", &SourceDescriptor::text(), &TtsOptions::new(), true)
            .await
            .unwrap();

        assert_eq!(backend.texts.lock().unwrap().as_slice(), ["original"]);
        assert_eq!(result.audio, vec![b"original".to_vec()]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("rate limited"));
    }

    #[tokio::test]
    async fn test_failure_on_second_chunk_aborts() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::failing_on(2));
        let text = "word ".repeat(2400);

        let err = converter(&backend, &root)
            .convert(&text, &SourceDescriptor::pdf("doc.pdf"), &TtsOptions::new(), false)
            .await
            .unwrap_err();

        match &err {
            ConversionError::Synthesis { chunk, total, .. } => {
                assert_eq!((*chunk, *total), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains('2') && msg.contains('3'));
        assert!(msg.contains("service unavailable"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_text_creates_nothing() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let err = converter(&backend, &root)
            .convert("  \n\n ", &SourceDescriptor::text(), &TtsOptions::new(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::NoText));
        assert_eq!(session_dirs(&root), 0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());
        let mut seen = Vec::new();

        converter(&backend, &root)
            .with_max_length(10)
            .convert_with_progress(
                "alpha beta gamma delta",
                &SourceDescriptor::text(),
                &TtsOptions::new(),
                false,
                |done, total| seen.push((done, total)),
            )
            .await
            .unwrap();

        let total = seen.len();
        assert!(total > 1);
        assert_eq!(seen, (1..=total).map(|i| (i, total)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_unavailable_optimizer_falls_back_with_warning() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());

        let converter = converter(&backend, &root).try_with_optimizer(Err(anyhow::anyhow!(
            "API key not configured for azure-openai"
        )));
        assert!(!converter.has_optimizer());

        let result = converter
            .convert("Hello there.", &SourceDescriptor::text(), &TtsOptions::new(), true)
            .await
            .unwrap();

        assert_eq!(backend.texts.lock().unwrap().as_slice(), ["Hello there."]);
        assert_eq!(result.file_count(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Could not initialize LLM for text optimization"));
        assert!(result.warnings[0].contains("API key not configured"));
    }

    #[tokio::test]
    async fn test_available_optimizer_is_attached() {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(EchoBackend::default());
        let optimizer: Box<dyn TextOptimizer> =
            Box::new(FixedOptimizer(Ok("Polished.".to_string())));

        let converter = converter(&backend, &root).try_with_optimizer(Ok(optimizer));
        assert!(converter.has_optimizer());

        let result = converter
            .convert("rough", &SourceDescriptor::text(), &TtsOptions::new(), true)
            .await
            .unwrap();
        assert_eq!(backend.texts.lock().unwrap().as_slice(), ["Polished."]);
        assert!(result.warnings.is_empty());
    }
}
