//! AvatarPipeline for combining a landmark source with the hands animator.

use std::time::Duration;

use tracing::{error, info};

use crate::animator::{AnimatorPhase, HandAnimatorConfig, HandsAnimator, HandsOutput, Rig};

use super::{LandmarkSource, ReplicationConfig, ReplicationSnapshot, Replicator};

/// What one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Poses for the local IK solver; `None` while the source is starting
    /// or the pipeline is disabled
    pub hands: Option<HandsOutput>,
    /// Present on ticks where the replication interval elapsed
    pub snapshot: Option<ReplicationSnapshot>,
}

/// Drives a [`HandsAnimator`] from any [`LandmarkSource`] once per frame and
/// samples it for replication.
pub struct AvatarPipeline<S: LandmarkSource> {
    source: S,
    animator: Option<HandsAnimator>,
    replicator: Replicator,
    using_hand_animations: bool,
}

impl<S: LandmarkSource> AvatarPipeline<S> {
    /// Create a new pipeline for `rig`.
    ///
    /// A rig missing a required bone is logged and leaves the pipeline
    /// disabled; every later tick produces no output.
    pub fn new(
        source: S,
        rig: &impl Rig,
        config: HandAnimatorConfig,
        replication: ReplicationConfig,
    ) -> Self {
        let animator = match HandsAnimator::new(rig, config) {
            Ok(animator) => Some(animator),
            Err(err) => {
                error!(%err, "hand animation disabled");
                None
            }
        };
        Self {
            source,
            animator,
            replicator: Replicator::new(replication),
            using_hand_animations: true,
        }
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(source: S, rig: &impl Rig) -> Self {
        Self::new(source, rig, HandAnimatorConfig::default(), ReplicationConfig::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.animator.is_some()
    }

    /// Lifecycle phase; `Uninitialized` while disabled or the source is
    /// not ready.
    pub fn phase(&self) -> AnimatorPhase {
        self.animator
            .as_ref()
            .map_or(AnimatorPhase::Uninitialized, HandsAnimator::phase)
    }

    /// Whether snapshots tell remote clients to apply the hands.
    pub fn set_using_hand_animations(&mut self, using: bool) {
        if self.using_hand_animations != using {
            info!(using, "hand animations toggled");
        }
        self.using_hand_animations = using;
    }

    pub fn using_hand_animations(&self) -> bool {
        self.using_hand_animations
    }

    /// Advance one frame.
    ///
    /// Never blocks on the source: if it is not ready yet nothing happens,
    /// and if it has no new frame the animator holds its last state.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the previous tick
    /// * `elapsed` - Monotonic time since start, for the replication cadence
    pub fn tick(&mut self, dt: f32, elapsed: Duration) -> Result<PipelineOutput, S::Error> {
        let Some(animator) = self.animator.as_mut() else {
            return Ok(PipelineOutput::default());
        };
        if !self.source.is_ready() {
            return Ok(PipelineOutput::default());
        }

        if animator.phase() == AnimatorPhase::Uninitialized {
            info!("landmark source ready, hand animation active");
        }
        let frame = self.source.poll()?;
        let hands = animator.update(frame.as_ref(), dt);
        let snapshot = self
            .replicator
            .poll(animator, elapsed, self.using_hand_animations);

        Ok(PipelineOutput {
            hands: Some(hands),
            snapshot,
        })
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying animator, if enabled.
    pub fn animator(&self) -> Option<&HandsAnimator> {
        self.animator.as_ref()
    }
}
