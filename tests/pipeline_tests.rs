//! End-to-end runs of the translation pipeline against a scripted backend

use assert_fs::prelude::*;
use assert_fs::TempDir;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use srtlingo::config::Config;
use srtlingo::error::{BackendError, CaptionParseError, SrtLingoError};
use srtlingo::translate::TranslationBackend;
use srtlingo::workflow::Pipeline;

const SENTENCE_LABEL: &str = "Sentence to be translated: ";

/// Backend that answers from a lookup table and records every request
#[derive(Clone, Default)]
struct ScriptedBackend {
    replies: HashMap<String, String>,
    delays_ms: HashMap<String, u64>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedBackend {
    fn new(replies: &[(&str, &str)]) -> Self {
        Self {
            replies: replies.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Default::default()
        }
    }

    fn with_delay(mut self, sentence: &str, delay_ms: u64) -> Self {
        self.delays_ms.insert(sentence.to_string(), delay_ms);
        self
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push((system.to_string(), user.to_string()));

        let sentence = user.strip_prefix(SENTENCE_LABEL).unwrap_or(user);
        if let Some(delay) = self.delays_ms.get(sentence) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }

        self.replies
            .get(sentence)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                provider: "scripted",
                status: 500,
                message: format!("no reply for '{}'", sentence),
            })
    }

    async fn check_availability(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

struct Workspace {
    _temp: TempDir,
    input: assert_fs::fixture::ChildPath,
    output: assert_fs::fixture::ChildPath,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let input = temp.child("input");
        input.create_dir_all().unwrap();
        let output = temp.child("output");
        Self { _temp: temp, input, output }
    }

    fn add(&self, name: &str, content: &str) {
        self.input.child(name).write_str(content).unwrap();
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.directories.input = self.input.path().to_path_buf();
        config.directories.output = self.output.path().to_path_buf();
        config.output.replace_string = ".en".to_string();
        config.languages.input = "English".to_string();
        config.languages.output = "French".to_string();
        config.prompt.add_to_system = String::new();
        config.pipeline.show_progress = false;
        config
    }

    fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(self.output.path().join(name)).unwrap()
    }
}

fn captions(texts: &[&str]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}\n00:00:{:02},000 --> 00:00:{:02},500\n{}\n\n", i + 1, i, i, text))
        .collect()
}

fn output_exists(dir: &Path, name: &str) -> bool {
    dir.join(name).exists()
}

#[tokio::test]
async fn test_two_caption_scenario() {
    let workspace = Workspace::new();
    workspace.add(
        "movie.en.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n\n",
    );

    let backend = ScriptedBackend::new(&[("Hello", "Bonjour"), ("World", "Monde")]);
    let pipeline = Pipeline::new(workspace.config(), Box::new(backend.clone()));
    pipeline.translate().await.unwrap();

    assert_eq!(
        workspace.read_output("movie.srt"),
        "1\n00:00:01,000 --> 00:00:02,000\nBonjour\n\n2\n00:00:03,000 --> 00:00:04,000\nMonde\n\n"
    );

    let users: Vec<String> = backend.requests().into_iter().map(|(_, user)| user).collect();
    assert_eq!(users, vec!["Sentence to be translated: Hello", "Sentence to be translated: World"]);
}

#[tokio::test]
async fn test_files_processed_in_name_order() {
    let workspace = Workspace::new();
    workspace.add("b.srt", &captions(&["from b"]));
    workspace.add("a.SRT", &captions(&["from a"]));
    workspace.add("readme.txt", "1\nt\nnot a subtitle\n");

    let backend = ScriptedBackend::new(&[("from a", "de a"), ("from b", "de b")]);
    let pipeline = Pipeline::new(workspace.config(), Box::new(backend.clone()));
    pipeline.translate().await.unwrap();

    let users: Vec<String> = backend.requests().into_iter().map(|(_, user)| user).collect();
    assert_eq!(users, vec!["Sentence to be translated: from a", "Sentence to be translated: from b"]);
    assert!(output_exists(workspace.output.path(), "a.SRT"));
    assert!(output_exists(workspace.output.path(), "b.srt"));
    assert!(!output_exists(workspace.output.path(), "readme.txt"));
}

#[tokio::test]
async fn test_malformed_file_aborts_without_output() {
    let workspace = Workspace::new();
    workspace.add("a.srt", "1\nt\nfine\n\nabc\nt\nbroken\n");
    workspace.add("b.srt", &captions(&["never reached"]));

    let backend = ScriptedBackend::new(&[("fine", "bien"), ("never reached", "jamais")]);
    let pipeline = Pipeline::new(workspace.config(), Box::new(backend.clone()));
    let err = pipeline.translate().await.unwrap_err();

    match err {
        SrtLingoError::Parse { file, source } => {
            assert!(file.ends_with("a.srt"));
            assert!(matches!(source, CaptionParseError::InvalidSequenceNumber { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(backend.requests().is_empty());
    assert!(!output_exists(workspace.output.path(), "a.srt"));
    assert!(!output_exists(workspace.output.path(), "b.srt"));
}

#[tokio::test]
async fn test_missing_input_directory() {
    let workspace = Workspace::new();
    let mut config = workspace.config();
    config.directories.input = workspace.input.path().join("does-not-exist");

    let pipeline = Pipeline::new(config, Box::new(ScriptedBackend::default()));
    let err = pipeline.translate().await.unwrap_err();

    assert!(matches!(err, SrtLingoError::DirectoryRead { .. }));
    assert!(!workspace.output.path().exists());
}

#[tokio::test]
async fn test_context_window_in_system_prompt() {
    let workspace = Workspace::new();
    let texts = ["c0", "c1", "c2", "c3", "c4", "c5"];
    workspace.add("ctx.srt", &captions(&texts));

    let replies: Vec<(&str, &str)> = texts.iter().map(|t| (*t, "x")).collect();
    let backend = ScriptedBackend::new(&replies);
    let pipeline = Pipeline::new(workspace.config(), Box::new(backend.clone()));
    pipeline.translate().await.unwrap();

    let systems: Vec<String> = backend.requests().into_iter().map(|(system, _)| system).collect();
    assert_eq!(systems.len(), 6);

    assert!(systems[0].ends_with(
        "Context for better translation: \n\
         Next sentence 1: c1\n\
         Next sentence 2: c2\n\
         Next sentence 3: c3\n\
         Next sentence 4: c4\n\n"
    ));
    assert!(systems[5].ends_with(
        "Context for better translation: \n\
         Previous sentence 1: c4\n\
         Previous sentence 2: c3\n\
         Previous sentence 3: c2\n\
         Previous sentence 4: c1\n\n"
    ));
    for system in &systems {
        assert!(!system.contains(": x\n"), "context must not contain translations");
    }
}

#[tokio::test]
async fn test_rerun_builds_identical_prompts() {
    let workspace = Workspace::new();
    let texts = ["one", "two", "three"];
    workspace.add("again.srt", &captions(&texts));

    let first = ScriptedBackend::new(&[("one", "un"), ("two", "deux"), ("three", "trois")]);
    Pipeline::new(workspace.config(), Box::new(first.clone())).translate().await.unwrap();

    let second = ScriptedBackend::new(&[("one", "eins"), ("two", "zwei"), ("three", "drei")]);
    Pipeline::new(workspace.config(), Box::new(second.clone())).translate().await.unwrap();

    assert_eq!(first.requests(), second.requests());
    assert!(workspace.read_output("again.srt").contains("\nzwei\n"));
}

#[tokio::test]
async fn test_concurrent_translation_keeps_order() {
    let workspace = Workspace::new();
    let texts = ["slow", "medium", "fast", "instant"];
    workspace.add("order.srt", &captions(&texts));

    let backend = ScriptedBackend::new(&[
        ("slow", "LENT"),
        ("medium", "MOYEN"),
        ("fast", "RAPIDE"),
        ("instant", "IMMEDIAT"),
    ])
    .with_delay("slow", 120)
    .with_delay("medium", 60)
    .with_delay("fast", 20);

    let mut config = workspace.config();
    config.pipeline.concurrency = 4;
    Pipeline::new(config, Box::new(backend)).translate().await.unwrap();

    assert_eq!(
        workspace.read_output("order.srt"),
        "1\n00:00:00,000 --> 00:00:00,500\nLENT\n\n\
         2\n00:00:01,000 --> 00:00:01,500\nMOYEN\n\n\
         3\n00:00:02,000 --> 00:00:02,500\nRAPIDE\n\n\
         4\n00:00:03,000 --> 00:00:03,500\nIMMEDIAT\n\n"
    );
}

#[tokio::test]
async fn test_backend_error_names_file_and_caption() {
    let workspace = Workspace::new();
    workspace.add("fail.srt", &captions(&["known", "unknown", "later"]));

    let backend = ScriptedBackend::new(&[("known", "connu"), ("later", "plus tard")]);
    let err = Pipeline::new(workspace.config(), Box::new(backend.clone()))
        .translate()
        .await
        .unwrap_err();

    match err {
        SrtLingoError::Backend { file, sequence, source } => {
            assert_eq!(file, "fail.srt");
            assert_eq!(sequence, 2);
            assert!(matches!(source, BackendError::Api { status: 500, .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(backend.requests().len(), 2);
    assert!(!output_exists(workspace.output.path(), "fail.srt"));
}

#[tokio::test]
async fn test_output_path_is_a_file() {
    let workspace = Workspace::new();
    workspace.add("movie.srt", &captions(&["hi"]));
    workspace.output.write_str("not a directory\n").unwrap();

    let backend = ScriptedBackend::new(&[("hi", "salut")]);
    let err = Pipeline::new(workspace.config(), Box::new(backend.clone()))
        .translate()
        .await
        .unwrap_err();

    match err {
        SrtLingoError::Write { path, .. } => assert_eq!(Path::new(&path), workspace.output.path()),
        other => panic!("unexpected error: {}", other),
    }
    assert!(backend.requests().is_empty());
    assert!(workspace.output.path().is_file());
}

#[tokio::test]
async fn test_output_file_blocked_by_directory() {
    let workspace = Workspace::new();
    workspace.add("movie.en.srt", &captions(&["hi"]));
    workspace.output.child("movie.srt").create_dir_all().unwrap();

    let backend = ScriptedBackend::new(&[("hi", "salut")]);
    let err = Pipeline::new(workspace.config(), Box::new(backend.clone()))
        .translate()
        .await
        .unwrap_err();

    match err {
        SrtLingoError::Write { path, .. } => assert!(path.ends_with("movie.srt")),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(backend.requests().len(), 1);
    assert!(workspace.output.path().join("movie.srt").is_dir());
}

#[test]
fn test_overwrites_existing_output() {
    let workspace = Workspace::new();
    workspace.add("keep.srt", &captions(&["hi"]));
    workspace.output.create_dir_all().unwrap();
    workspace.output.child("keep.srt").write_str("stale content that is much longer\n").unwrap();

    let backend = ScriptedBackend::new(&[("hi", "salut")]);
    let pipeline = Pipeline::new(workspace.config(), Box::new(backend));
    tokio_test::block_on(pipeline.translate()).unwrap();

    assert_eq!(workspace.read_output("keep.srt"), "1\n00:00:00,000 --> 00:00:00,500\nsalut\n\n");
}
