//! Directory loader tests
//! Run with: cargo test --test loader_test

mod common;

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use maestro::application::errors::{CommandError, LoadError};
use maestro::{Application, FileBasedCommands, FileBasedEvents, HandlerCatalog, Interaction};

async fn pong(interaction: Interaction, _app: Application) -> Result<(), CommandError> {
    interaction.reply("Pong!").await?;
    Ok(())
}

fn catalog() -> HandlerCatalog {
    let mut catalog = HandlerCatalog::new();
    catalog
        .register_command("ping", pong)
        .register_command("echo", pong)
        .register_event("log_ready", |_app, _args| {});
    catalog
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn command_manifest(name: &str) -> String {
    format!("handler: ping\nname: {}\ndescription: The {} command\n", name, name)
}

/// Log sink for asserting on emitted errors
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn error_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|line| line.contains("ERROR"))
            .map(str::to_string)
            .collect()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}

#[test]
fn missing_directory_is_an_error() {
    common::ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("commands");

    match FileBasedCommands::new(&missing, &catalog()) {
        Err(LoadError::NotFound { path, kind }) => {
            assert_eq!(path, missing);
            assert_eq!(kind, "commands");
        }
        other => panic!("expected NotFound, got {:?}", other.map(|c| c.iter().count())),
    }
    assert!(matches!(
        FileBasedEvents::new(&missing, &catalog()),
        Err(LoadError::NotFound { kind: "events", .. })
    ));
}

#[test]
fn one_malformed_file_is_skipped_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a_ping.yaml", &command_manifest("ping"));
    write(dir.path(), "b_roll.yml", &command_manifest("roll"));
    write(dir.path(), "c_broken.yaml", "handler: ping\nname: [not, a, string\n");
    write(dir.path(), "d_help.yaml", &command_manifest("help"));

    let (commands, logs) = with_captured_logs(|| FileBasedCommands::new(dir.path(), &catalog()).unwrap());

    let names: Vec<&str> = commands.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["ping", "roll", "help"]);
    assert_eq!(commands.failures().len(), 1);
    assert!(commands.failures()[0].path.ends_with("c_broken.yaml"));

    let errors = logs.error_lines();
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("c_broken.yaml"));
}

#[test]
fn invalid_payloads_and_unknown_handlers_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad_name.yaml", "handler: ping\nname: Bad Name\ndescription: Spaces\n");
    write(dir.path(), "no_desc.yaml", "handler: ping\nname: quiet\ndescription: \"\"\n");
    write(dir.path(), "orphan.yaml", "handler: missing\nname: orphan\ndescription: Nobody home\n");
    write(dir.path(), "ok.yaml", &command_manifest("ok"));

    let commands = FileBasedCommands::new(dir.path(), &catalog()).unwrap();

    assert_eq!(commands.iter().count(), 1);
    let reasons: Vec<&str> = commands.failures().iter().map(|f| f.reason.as_str()).collect();
    assert_eq!(reasons.len(), 3);
    assert!(reasons.iter().any(|r| r.contains("Unknown handler: missing")));
}

#[test]
fn hidden_and_foreign_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".hidden.yaml", "not: [valid");
    write(dir.path(), "README.md", "# commands");
    write(dir.path(), "ping.yaml", &command_manifest("ping"));
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write(&dir.path().join("nested"), "echo.yaml", &command_manifest("echo"));

    let commands = FileBasedCommands::new(dir.path(), &catalog()).unwrap();

    assert!(commands.failures().is_empty());
    let loaded: Vec<_> = commands.into_iter().collect();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name(), "ping");
}

#[test]
fn payload_reaches_the_command() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "echo.yaml",
        r#"
handler: echo
name: echo
description: Repeat after me
default_member_permissions: "8"
options:
  - type: 3
    name: text
    description: What to say
    required: true
"#,
    );

    let commands = FileBasedCommands::new(dir.path(), &catalog()).unwrap();
    let echo = commands.iter().next().unwrap();

    let payload = serde_json::to_value(echo.data()).unwrap();
    assert_eq!(payload["name"], "echo");
    assert_eq!(payload["type"], 1);
    assert_eq!(payload["default_member_permissions"], "8");
    assert_eq!(payload["options"][0]["type"], 3);
    assert_eq!(payload["options"][0]["required"], true);
    assert!(payload.get("handler").is_none());
}

#[test]
fn events_load_from_manifests() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ready.yaml", "name: ready\nhandler: log_ready\n");
    write(dir.path(), "unnamed.yaml", "name: \"\"\nhandler: log_ready\n");
    write(dir.path(), "orphan.yaml", "name: guildCreate\nhandler: nope\n");

    let events = FileBasedEvents::new(dir.path(), &catalog()).unwrap();

    let names: Vec<&str> = (&events).into_iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["ready"]);
    assert_eq!(events.failures().len(), 2);
    assert!(events
        .failures()
        .iter()
        .any(|f| f.reason == "Events must have a name"));
}
