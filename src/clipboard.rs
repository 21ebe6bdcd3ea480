//! Copying the extracted text.
//!
//! [`copy`] tries a primary backend and, if that fails, a fallback. On a
//! desktop the primary is the platform's clipboard tool ([`SystemClipboard`]);
//! the fallback is the OSC 52 terminal escape ([`Osc52Clipboard`]), which asks
//! the terminal emulator itself to set the selection and works over SSH.

use crate::error::Snap2TextError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Somewhere text can be copied to.
pub trait ClipboardBackend: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Place `text` on the clipboard verbatim.
    fn write_text(&self, text: &str) -> io::Result<()>;
}

/// Copy `text`, falling back to `fallback` when `primary` refuses.
///
/// Returns the name of the backend that accepted the text.
pub fn copy(
    text: &str,
    primary: &dyn ClipboardBackend,
    fallback: &dyn ClipboardBackend,
) -> Result<&'static str, Snap2TextError> {
    match primary.write_text(text) {
        Ok(()) => {
            debug!("Copied {} bytes via {}", text.len(), primary.name());
            Ok(primary.name())
        }
        Err(first) => {
            warn!(
                "{} copy failed ({}); falling back to {}",
                primary.name(),
                first,
                fallback.name()
            );
            fallback.write_text(text).map_err(|second| {
                Snap2TextError::ClipboardUnavailable {
                    reason: format!(
                        "{}: {first}; {}: {second}",
                        primary.name(),
                        fallback.name()
                    ),
                }
            })?;
            Ok(fallback.name())
        }
    }
}

/// The platform clipboard utility, fed through stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemClipboard {
    program: String,
    args: Vec<String>,
}

impl SystemClipboard {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Pick the usual tool for this platform.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("pbcopy", &[])
        } else if cfg!(target_os = "windows") {
            Self::new("clip", &[])
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::new("wl-copy", &[])
        } else {
            Self::new("xclip", &["-selection", "clipboard"])
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system clipboard"
    }

    fn write_text(&self, text: &str) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let status = feed_and_wait(&mut child, text.as_bytes())?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Write `bytes` to the child's stdin, close it, and reap the child even
/// when the write fails.
fn feed_and_wait(child: &mut Child, bytes: &[u8]) -> io::Result<ExitStatus> {
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(bytes),
        None => Ok(()),
    };
    let status = child.wait()?;
    written.map(|()| status)
}

/// OSC 52 "set selection" escape written to a terminal stream.
pub struct Osc52Clipboard<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ClipboardBackend for Osc52Clipboard<W> {
    fn name(&self) -> &'static str {
        "terminal (OSC 52)"
    }

    fn write_text(&self, text: &str) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("terminal writer poisoned"))?;
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}
