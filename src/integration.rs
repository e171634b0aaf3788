//! Integration module for connecting perception backends and remote
//! viewers with the hand animators.
//!
//! This module provides the source trait any landmark detector
//! implements, frame construction from raw buffers, the per-frame pipeline
//! and the replication boundary.

mod builder;
mod pipeline;
mod replication;
mod source;

pub use builder::{LandmarkFrameBuilder, side_from_handedness};
pub use pipeline::{AvatarPipeline, PipelineOutput};
pub use replication::{
    DEFAULT_REPLICATION_INTERVAL, HandSnapshot, RemoteHands, ReplicationConfig,
    ReplicationSnapshot, Replicator,
};
pub use source::{IntoLandmarkFrame, LandmarkSource, LatestFrame};
