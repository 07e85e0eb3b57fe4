//! Locating the `ffmpeg` executable.
//!
//! ## Resolution order
//!
//! 1. **Explicit override** — `--ffmpeg`, `FFMPEG_PATH`, or `ffmpeg_path` in
//!    the settings file. Authoritative: a missing file is an error, there is
//!    no fall-through.
//! 2. **Project-local vendored copy** —
//!    `<cwd>/node_modules/@ffmpeg-installer/<platform>-<arch>/ffmpeg`, the
//!    layout used when the tool ships inside a Node.js deployment.
//! 3. **Well-known system paths** — `/usr/bin`, `/usr/local/bin`, and the
//!    Homebrew prefix on Apple Silicon.
//! 4. **Search path** — the bare name `ffmpeg`, left to the OS to resolve.
//!    Unconditional unless disabled in the settings.
//!
//! Each step is a plain function of a [`ProbeEnv`] snapshot, so the order is
//! data (a [`Locator`]) and every step is testable in isolation.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{ConversionError, Result};

/// Name of the executable when left to the search path.
pub const FFMPEG_BIN: &str = "ffmpeg";

const SYSTEM_PATHS: &[&str] = &["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg", "/opt/homebrew/bin/ffmpeg"];

/// Everything a resolver is allowed to look at.
#[derive(Debug, Clone)]
pub struct ProbeEnv {
    /// Working directory the vendored copy is searched under.
    pub cwd: PathBuf,
    /// User-supplied executable path, if any.
    pub explicit: Option<PathBuf>,
    /// `std::env::consts::OS` of the running binary.
    pub os: &'static str,
    /// `std::env::consts::ARCH` of the running binary.
    pub arch: &'static str,
    /// Whether the bare command name may be used as a last resort.
    pub search_path_fallback: bool,
}

impl ProbeEnv {
    /// Snapshot for `cwd` on the current platform, with no override.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            explicit: None,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            search_path_fallback: true,
        }
    }

    /// Snapshot of the running process, honouring `settings`.
    pub fn capture(settings: &Settings) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConversionError::io("cannot determine the working directory", e))?;
        Ok(Self {
            explicit: settings.ffmpeg_path.clone(),
            search_path_fallback: settings.search_path_fallback,
            ..Self::new(cwd)
        })
    }

    /// `@ffmpeg-installer` platform directory, e.g. `linux-x64`.
    fn installer_platform(&self) -> String {
        let os = match self.os {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };
        let arch = match self.arch {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            "x86" => "ia32",
            other => other,
        };
        format!("{}-{}", os, arch)
    }

    fn exe_name(&self) -> &'static str {
        if self.os == "windows" {
            "ffmpeg.exe"
        } else {
            FFMPEG_BIN
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolvers
// ─────────────────────────────────────────────────────────────────────────────

/// One step of the search: a pure function of the environment snapshot.
pub type Resolver = fn(&ProbeEnv) -> Option<PathBuf>;

pub fn explicit_override(env: &ProbeEnv) -> Option<PathBuf> {
    env.explicit.clone()
}

pub fn vendored_copy(env: &ProbeEnv) -> Option<PathBuf> {
    let candidate = env
        .cwd
        .join("node_modules")
        .join("@ffmpeg-installer")
        .join(env.installer_platform())
        .join(env.exe_name());
    candidate.is_file().then_some(candidate)
}

pub fn system_install(env: &ProbeEnv) -> Option<PathBuf> {
    if env.os == "windows" {
        return None;
    }
    SYSTEM_PATHS.iter().map(PathBuf::from).find(|p| p.is_file())
}

pub fn search_path(env: &ProbeEnv) -> Option<PathBuf> {
    env.search_path_fallback.then(|| PathBuf::from(FFMPEG_BIN))
}

/// `true` for a bare command name that the OS resolves via `PATH`.
pub fn is_bare_command(path: &Path) -> bool {
    path.parent().map_or(true, |p| p.as_os_str().is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Locator
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered list of named resolvers; the first hit wins.
pub struct Locator {
    resolvers: Vec<(&'static str, Resolver)>,
}

impl Locator {
    pub fn new(resolvers: Vec<(&'static str, Resolver)>) -> Self {
        Self { resolvers }
    }

    /// The default order described in the module docs.
    pub fn standard() -> Self {
        Self::new(vec![
            ("explicit override", explicit_override as Resolver),
            ("vendored copy", vendored_copy as Resolver),
            ("system install", system_install as Resolver),
            ("search path", search_path as Resolver),
        ])
    }

    pub fn resolve(&self, env: &ProbeEnv) -> Result<PathBuf> {
        for &(name, resolver) in &self.resolvers {
            if let Some(path) = resolver(env) {
                tracing::debug!(resolver = name, path = %path.display(), "ffmpeg candidate resolved");
                return Ok(path);
            }
            tracing::trace!(resolver = name, "no ffmpeg candidate");
        }
        let tried: Vec<&str> = self.resolvers.iter().map(|&(name, _)| name).collect();
        Err(ConversionError::TranscoderNotFound(format!(
            "ffmpeg not found (tried: {})",
            tried.join(", ")
        )))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
