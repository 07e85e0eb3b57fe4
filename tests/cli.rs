//! Command-line contract of the `tts2wav` binary.
//!
//! Only the paths that need neither network nor ffmpeg run here:
//! - nothing speakable → exit 1, `ERRO:` on stderr, no output file
//! - unusable ffmpeg override → exit 1 before any synthesis
//! - missing required flag → clap usage error, exit 2

use std::path::Path;
use std::process::{Command, Output};

fn tts2wav(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tts2wav"))
        .args(args)
        .current_dir(cwd)
        .env_remove("TTS2WAV_BACKEND")
        .env_remove("TTS2WAV_TLD")
        .env_remove("TTS2WAV_TIMEOUT")
        .env_remove("TTS2WAV_CONFIG")
        .env_remove("FFMPEG_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn tts2wav")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[cfg(feature = "library")]
#[test]
fn test_empty_text_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.wav");

    let out = tts2wav(
        dir.path(),
        &["--text", "", "--output", output.to_str().unwrap(), "--backend", "library"],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("ERRO:"), "stderr: {}", err);
    assert!(err.contains("no text to speak"), "stderr: {}", err);
    assert!(!stdout(&out).contains("SUCCESS"));
    assert!(!output.exists());
}

#[test]
fn test_missing_ffmpeg_override_fails_before_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ola.wav");
    let ffmpeg = dir.path().join("bin").join("ffmpeg");

    let out = tts2wav(
        dir.path(),
        &[
            "--text",
            "Olá mundo",
            "--output",
            output.to_str().unwrap(),
            "--ffmpeg",
            ffmpeg.to_str().unwrap(),
        ],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("ERRO:"), "stderr: {}", err);
    assert!(err.contains("transcoder not found"), "stderr: {}", err);
    assert!(!stdout(&out).contains("SUCCESS"));
    assert!(!output.exists());
}

#[test]
fn test_invalid_settings_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ola.wav");
    let config = dir.path().join("tts2wav.json");
    std::fs::write(&config, r#"{ "bakend": "library" }"#).unwrap();

    let out = tts2wav(
        dir.path(),
        &[
            "--text",
            "Olá mundo",
            "--output",
            output.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("ERRO:"), "stderr: {}", err);
    assert!(err.contains("tts2wav.json"), "stderr: {}", err);
    assert!(!output.exists());
}

#[test]
fn test_missing_output_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = tts2wav(dir.path(), &["--text", "Olá mundo"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--output"));
}
