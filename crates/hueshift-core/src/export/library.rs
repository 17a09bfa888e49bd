//! The persistence collaborator contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ExportFormat;

/// Outcome of asking the photo library for add-only access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// The user granted access.
    Authorized,
    /// The user refused access.
    Denied,
    /// Access is blocked by policy (parental controls, device management).
    Restricted,
}

impl AuthorizationStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }
}

/// Failures reported by a photo library while saving.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("Photo library access denied")]
    PermissionDenied,

    /// Any other failure, with the library's own description.
    #[error("{0}")]
    Io(String),
}

/// Encoded image bytes plus the metadata a library needs to file them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl EncodedAsset {
    pub fn new(bytes: Vec<u8>, format: ExportFormat) -> Self {
        Self { bytes, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Destination for finished images (the device photo library or an equivalent).
///
/// Both calls may wait on the user (a permission prompt) or on I/O, so they
/// are asynchronous and carry no timeout.
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// Ask for permission to add photos.
    async fn request_authorization(&self) -> AuthorizationStatus;

    /// Store one asset.
    async fn save(&self, asset: EncodedAsset) -> Result<(), SinkError>;
}
