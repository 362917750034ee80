use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CardSide;

/// Asks the shell to take one photo of the given card side. The shell owns
/// the camera hardware, the permission prompt, and any preview UI; the core
/// receives an opaque reference to the stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraOperation {
    TakeShot { side: CardSide },
}

impl Operation for CameraOperation {
    type Output = ShotResult;
}

/// Opaque handle to a captured image, minted by the shell. The core never
/// inspects image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("shot cancelled by user")]
    Cancelled,

    #[error("camera unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("shot failed: {reason}")]
    Failed { reason: String },
}

impl CameraError {
    /// Cancel and device errors leave the capture phase unchanged so the same
    /// side can be retried; a permission denial needs the settings screen.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Unavailable { .. } | Self::Failed { .. }
        )
    }
}

pub type ShotResult = Result<ImageRef, CameraError>;

pub struct Camera<Ev> {
    context: CapabilityContext<CameraOperation, Ev>,
}

impl<Ev> Capability<Ev> for Camera<Ev> {
    type Operation = CameraOperation;
    type MappedSelf<MappedEv> = Camera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Camera::new(self.context.map_event(f))
    }
}

impl<Ev> Camera<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<CameraOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn take_shot<F>(&self, side: CardSide, callback: F)
    where
        F: FnOnce(ShotResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(CameraOperation::TakeShot { side })
                .await;
            context.update_app(callback(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_is_opaque_but_comparable() {
        let a = ImageRef::new("file:///tmp/front.jpg");
        let b = ImageRef::new("file:///tmp/front.jpg");
        let c = ImageRef::new("file:///tmp/back.jpg");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "file:///tmp/front.jpg");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(!CameraError::PermissionDenied.is_retryable());
        assert!(CameraError::Cancelled.is_retryable());
        assert!(CameraError::Unavailable {
            reason: "in use".into()
        }
        .is_retryable());
        assert!(CameraError::Failed {
            reason: "sensor".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_operation_round_trips_through_serde() {
        let op = CameraOperation::TakeShot {
            side: CardSide::Back,
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: CameraOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}
