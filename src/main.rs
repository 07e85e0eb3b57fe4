//! `tts2wav` — speak a text into a 16 kHz mono WAV file.
//!
//! Usage:
//!   tts2wav --text "Olá mundo" --output ola.wav
//!   tts2wav --text "Hello" --output hello.wav --language en --backend library -vv
//!
//! stdout carries progress and a final `SUCCESS` line; on failure stderr gets
//! a single `ERRO: …` line with the full cause chain and the exit code is 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use tts2wav::request::DEFAULT_LANGUAGE;
use tts2wav::{ConversionRequest, Settings, TextToAudioConverter, TranscoderBackend};

/// Convert text to a 16 kHz mono 16-bit WAV via Google Translate TTS
#[derive(Parser, Debug)]
#[command(name = "tts2wav", version, about)]
struct Cli {
    /// Text to synthesize
    #[arg(long)]
    text: String,

    /// Destination WAV file
    #[arg(long)]
    output: PathBuf,

    /// TTS language code
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Speak more slowly
    #[arg(long)]
    slow: bool,

    /// Transcoder: ffmpeg or library
    #[arg(long, env = "TTS2WAV_BACKEND")]
    backend: Option<TranscoderBackend>,

    /// Explicit ffmpeg executable
    #[arg(long, env = "FFMPEG_PATH")]
    ffmpeg: Option<PathBuf>,

    /// Google Translate top-level domain (com, com.br, …)
    #[arg(long, env = "TTS2WAV_TLD")]
    tld: Option<String>,

    /// HTTP timeout per request, in seconds
    #[arg(long, env = "TTS2WAV_TIMEOUT")]
    timeout: Option<u64>,

    /// JSON settings file
    #[arg(long, env = "TTS2WAV_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Settings file (if any) with command-line values layered on top.
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(backend) = self.backend {
            settings.backend = backend;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            settings.ffmpeg_path = Some(ffmpeg.clone());
        }
        if let Some(tld) = &self.tld {
            settings.tld = tld.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = Some(timeout);
        }
        Ok(settings)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    tracing::debug!(?settings, "effective settings");

    let converter = TextToAudioConverter::from_settings(&settings)
        .context("Cannot prepare the converter")?;

    println!("Provider   : {}", converter.provider().name());
    println!("Language   : {}", cli.language);
    println!("Text       : {:?}", cli.text);
    println!("Transcoder : {}", converter.transcoder().describe());
    println!();
    println!("Synthesising speech…");

    let request = ConversionRequest::new(cli.text.as_str(), cli.output.as_path())
        .with_language(cli.language.as_str())
        .with_slow(cli.slow);
    let summary = converter.convert(&request)?;
    println!("Saved {} ({:.2}s, {})", cli.output.display(), summary.duration_secs(), summary);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => {
            println!("SUCCESS");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERRO: {:#}", err);
            ExitCode::from(1)
        }
    }
}
