//! Two-shot capture session for registering a new card.
//!
//! The session is single-use: front shot, back shot, done. A failed shot
//! leaves the phase unchanged so the same side can be retried; once complete,
//! further shots are rejected and a fresh session must be constructed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::ImageRef;

/// Which side of the card the shell should frame next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Front => "Position the front of your gift card in the frame",
            Self::Back => "Now position the back of your gift card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    #[default]
    Front,
    Back,
    Complete,
}

impl CapturePhase {
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Both shots of a finished capture, handed to the card-creation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub front: ImageRef,
    pub back: ImageRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureSessionError {
    #[error("capture session already complete; construct a new session")]
    SessionComplete,
}

/// Orchestrates the front/back shot sequence. One instance per capture flow;
/// it owns its state exclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSession {
    phase: CapturePhase,
    front: Option<ImageRef>,
}

impl CaptureSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> CapturePhase {
        self.phase
    }

    #[must_use]
    pub const fn front_taken(&self) -> bool {
        self.front.is_some()
    }

    /// The side the next successful shot will record, `None` once complete.
    #[must_use]
    pub const fn next_side(&self) -> Option<CardSide> {
        match self.phase {
            CapturePhase::Front => Some(CardSide::Front),
            CapturePhase::Back => Some(CardSide::Back),
            CapturePhase::Complete => None,
        }
    }

    /// Records a successful shot and advances the phase. Returns the finished
    /// [`CaptureResult`] exactly once, on the shot that completes the session.
    pub fn record_shot(
        &mut self,
        image: ImageRef,
    ) -> Result<Option<CaptureResult>, CaptureSessionError> {
        match self.phase {
            CapturePhase::Front => {
                self.front = Some(image);
                self.phase = CapturePhase::Back;
                Ok(None)
            }
            CapturePhase::Back => {
                let front = self
                    .front
                    .take()
                    .ok_or(CaptureSessionError::SessionComplete)?;
                self.phase = CapturePhase::Complete;
                Ok(Some(CaptureResult { front, back: image }))
            }
            CapturePhase::Complete => Err(CaptureSessionError::SessionComplete),
        }
    }
}
