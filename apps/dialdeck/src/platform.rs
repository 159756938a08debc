//! # Platform Collaborators
//!
//! The pieces of the outside world Dialdeck talks to:
//! - `FilePicker`: lets the user choose an import file and reads it
//! - `ImagePicker`: lets the user choose a contact photo
//! - `Dialer`: places a phone call
//!
//! A cancelled picker returns `None`; that is not an error.

use dialdeck_core::DialdeckError;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio::runtime::Handle;

// =============================================================================
// FILE SELECTION
// =============================================================================

/// Opaque reference to a chosen file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHandle {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// Content already held in memory (e.g. an uploaded request body).
    Inline(String),
}

/// Chooses an import file and retrieves its text.
pub trait FilePicker: Send + Sync {
    /// Ask for a file matching one of `mime_types`. `None` means cancelled.
    fn pick(&self, mime_types: &[&str]) -> impl Future<Output = Option<FileHandle>> + Send;

    /// Read the raw content behind `handle`. Decoding is left to the Row
    /// Parser, which skips rows that are not UTF-8.
    fn read_bytes(
        &self,
        handle: &FileHandle,
    ) -> impl Future<Output = Result<Vec<u8>, DialdeckError>> + Send;
}

/// Picker that always "selects" a preconfigured handle, or cancels when
/// none was given. Used by the CLI and the HTTP surface, where the choice
/// was made before the pipeline runs.
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    handle: Option<FileHandle>,
}

impl PresetPicker {
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            handle: Some(FileHandle::Path(path.into())),
        }
    }

    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            handle: Some(FileHandle::Inline(text.into())),
        }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::default()
    }
}

impl FilePicker for PresetPicker {
    async fn pick(&self, mime_types: &[&str]) -> Option<FileHandle> {
        tracing::debug!(?mime_types, selected = self.handle.is_some(), "File selection");
        self.handle.clone()
    }

    async fn read_bytes(&self, handle: &FileHandle) -> Result<Vec<u8>, DialdeckError> {
        match handle {
            FileHandle::Inline(text) => Ok(text.clone().into_bytes()),
            FileHandle::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                DialdeckError::ImportRead(format!("'{}': {}", path.display(), e))
            }),
        }
    }
}

// =============================================================================
// IMAGE SELECTION
// =============================================================================

/// Chooses a contact photo. Returns the image URI, `None` when cancelled.
pub trait ImagePicker: Send + Sync {
    fn pick_image(&self) -> impl Future<Output = Option<String>> + Send;
}

/// Image picker whose answer is known up front (a URI sent by a client).
#[derive(Debug, Clone, Default)]
pub struct PresetImage(pub Option<String>);

impl ImagePicker for PresetImage {
    async fn pick_image(&self) -> Option<String> {
        self.0.clone().filter(|uri| !uri.trim().is_empty())
    }
}

// =============================================================================
// CALL PLACEMENT
// =============================================================================

/// Places a call. Fire-and-forget: failures are logged, never returned.
pub trait Dialer: Send + Sync {
    fn dial(&self, phone: &str);
}

/// `tel:` URI for `phone`, with spaces and dashes removed.
#[must_use]
pub fn tel_uri(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    format!("tel:{}", digits)
}

/// Dialer that only records the call in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDialer;

impl Dialer for LogDialer {
    fn dial(&self, phone: &str) {
        tracing::info!(uri = %tel_uri(phone), "Placing call");
    }
}

/// Dialer that hands the `tel:` URI to an external program
/// (e.g. `xdg-open`, `open`).
///
/// The program is spawned on the tokio runtime and reaped by a background
/// task, so `dial` never blocks on it.
#[derive(Debug, Clone)]
pub struct CommandDialer {
    program: String,
}

impl CommandDialer {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Dialer for CommandDialer {
    fn dial(&self, phone: &str) {
        let uri = tel_uri(phone);
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(program = %self.program, %uri, "No async runtime, call not placed");
            return;
        };
        let _entered = runtime.enter();

        let mut child = match Command::new(&self.program)
            .arg(&uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.program, %uri, "Call handler failed to start: {}", e);
                return;
            }
        };
        tracing::info!(program = %self.program, %uri, pid = child.id(), "Placing call");

        let program = self.program.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!(%program, %status, "Call handler exited with failure");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(%program, "Waiting on call handler failed: {}", e),
            }
        });
    }
}
