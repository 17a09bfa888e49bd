//! Export adapter: encode a finished raster and hand it to the photo library.
//!
//! # Flow
//!
//! 1. Reject an empty raster instead of saving a blank image
//! 2. Ask the library for add-only access; anything but `Authorized` ends
//!    the export with `PermissionDenied` (no retry)
//! 3. Encode on Tokio's blocking pool (inline when no Tokio runtime is
//!    driving the future)
//! 4. Save through [`PhotoLibrary::save`]
//!
//! [`ExportAdapter::export`] is the plain async form. [`ExportAdapter::spawn_export`]
//! starts the same work as a background task and returns an [`ExportHandle`]
//! whose completion can be awaited or polled from a UI loop. Only one
//! spawned export may be in flight per adapter.

mod library;

pub use library::{AuthorizationStatus, EncodedAsset, PhotoLibrary, SinkError};

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::oneshot;

use crate::config::ExportFormat;
use crate::encode::{encode, EncodeError};
use crate::raster::RasterImage;

/// Errors surfaced by an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The user has not granted photo library access
    #[error("Photo library access denied")]
    PermissionDenied,

    /// The library failed to store the asset; the message is passed through verbatim
    #[error("{0}")]
    Io(String),

    /// The raster could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The raster had no pixels
    #[error("Nothing to export: raster is {width}x{height}")]
    EmptyResult { width: u32, height: u32 },

    /// Another export from this adapter has not finished yet
    #[error("An export is already in progress")]
    Busy,

    /// Background export requested outside a Tokio runtime
    #[error("No async runtime available to run the export")]
    NoRuntime,

    /// The export task ended without reporting a result
    #[error("Export was cancelled before it completed")]
    Cancelled,
}

impl From<SinkError> for ExportError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::PermissionDenied => ExportError::PermissionDenied,
            SinkError::Io(reason) => ExportError::Io(reason),
        }
    }
}

/// Success signal for a completed export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReceipt {
    pub format: ExportFormat,
    /// Size of the encoded asset handed to the library.
    pub byte_len: usize,
}

/// Terminal outcome of one export.
pub type ExportResult = Result<ExportReceipt, ExportError>;

/// Encodes rasters and saves them through a [`PhotoLibrary`].
pub struct ExportAdapter<L> {
    library: Arc<L>,
    format: ExportFormat,
    in_flight: Arc<AtomicBool>,
}

impl<L: PhotoLibrary + 'static> ExportAdapter<L> {
    pub fn new(library: L, format: ExportFormat) -> Self {
        Self::from_shared(Arc::new(library), format)
    }

    /// Build an adapter around a library that is also used elsewhere.
    pub fn from_shared(library: Arc<L>, format: ExportFormat) -> Self {
        Self {
            library,
            format,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    /// True while a spawned export has not completed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Encode `raster` and save it, resolving once the library answers.
    pub async fn export(&self, raster: RasterImage) -> ExportResult {
        run_export(self.library.as_ref(), self.format, raster).await
    }

    /// Start an export on the current Tokio runtime without waiting for it.
    ///
    /// # Errors
    ///
    /// * `ExportError::NoRuntime` when called outside a Tokio runtime
    /// * `ExportError::Busy` while a previous spawned export is still running
    pub fn spawn_export(&self, raster: RasterImage) -> Result<ExportHandle, ExportError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ExportError::NoRuntime)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("export rejected: another export is in flight");
            return Err(ExportError::Busy);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let (tx, rx) = oneshot::channel();
        let library = Arc::clone(&self.library);
        let format = self.format;

        runtime.spawn(async move {
            let result = run_export(library.as_ref(), format, raster).await;
            // Release before reporting so the receiver can start the next export
            drop(guard);
            let _ = tx.send(result);
        });

        Ok(ExportHandle { rx, taken: false })
    }
}

async fn run_export<L: PhotoLibrary + ?Sized>(
    library: &L,
    format: ExportFormat,
    raster: RasterImage,
) -> ExportResult {
    if raster.is_empty() {
        return Err(ExportError::EmptyResult {
            width: raster.width(),
            height: raster.height(),
        });
    }

    let status = library.request_authorization().await;
    if !status.is_granted() {
        log::warn!("export aborted: photo library authorization {:?}", status);
        return Err(ExportError::PermissionDenied);
    }

    let (width, height) = (raster.width(), raster.height());
    let bytes = encode_off_executor(raster, format).await?;
    let byte_len = bytes.len();

    if let Err(err) = library.save(EncodedAsset::new(bytes, format)).await {
        log::warn!("export failed while saving: {}", err);
        return Err(err.into());
    }

    log::info!(
        "exported {}x{} image as {} ({} bytes)",
        width,
        height,
        format.mime_type(),
        byte_len
    );
    Ok(ExportReceipt { format, byte_len })
}

/// Encode on Tokio's blocking pool, or inline when polled outside a Tokio runtime.
async fn encode_off_executor(
    raster: RasterImage,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    if tokio::runtime::Handle::try_current().is_err() {
        log::debug!("no Tokio runtime, encoding inline");
        return Ok(encode(&raster, format)?);
    }
    tokio::task::spawn_blocking(move || encode(&raster, format))
        .await
        .map_err(|_| ExportError::Cancelled)?
        .map_err(ExportError::from)
}

/// Clears the in-flight flag when the export task finishes or unwinds.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Completion handle for a spawned export.
///
/// Await it (or call [`ExportHandle::wait`]) from async code, or poll
/// [`ExportHandle::try_result`] from a UI loop that must not block.
#[derive(Debug)]
pub struct ExportHandle {
    rx: oneshot::Receiver<ExportResult>,
    taken: bool,
}

impl ExportHandle {
    /// Wait for the export to finish.
    pub async fn wait(self) -> ExportResult {
        self.await
    }

    /// Return the result if the export has finished, without blocking.
    ///
    /// The result is handed out once; later calls return `None` and awaiting
    /// the handle afterwards yields `ExportError::Cancelled`.
    pub fn try_result(&mut self) -> Option<ExportResult> {
        if self.taken {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(ExportError::Cancelled),
        };
        self.taken = true;
        Some(result)
    }

    /// True once `try_result` has handed out the result.
    pub fn is_taken(&self) -> bool {
        self.taken
    }
}

impl Future for ExportHandle {
    type Output = ExportResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(ExportError::Cancelled)))
    }
}
