//! Error types for rig setup and perception buffer conversion.
//!
//! Per-frame numeric degeneracy is not represented here: the solver
//! resolves it locally and never fails during steady-state operation.

use thiserror::Error;

use crate::animator::RigBone;

/// Failure while resolving the rig at animator initialization.
///
/// Fatal for the animator instance that hit it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("{bone:?} bone not found: {path}")]
    BoneNotFound { bone: RigBone, path: String },
}

/// Failure while turning raw perception buffers into a landmark frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("invalid {kind} landmark buffer length: expected {expected}, got {got}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("unknown handedness category: {0}")]
    UnknownHandedness(String),
}

/// Any error surfaced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
