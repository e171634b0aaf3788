//! Low-rate replication of the solved hand state to remote viewers.
//!
//! The owner samples its [`HandsAnimator`] on a fixed interval into a flat
//! [`ReplicationSnapshot`]; remote clients turn snapshots back into
//! [`HandPose`]s for their own IK solver.

use std::time::Duration;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animator::{
    EffectorTarget, FingerBones, HandPose, HandRotations, HandsAnimator, HandsOutput, Mode, Side,
};

/// Default replication period (20 Hz).
pub const DEFAULT_REPLICATION_INTERVAL: Duration = Duration::from_millis(50);

/// One hand, flattened for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandSnapshot {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub rotation_weight: f32,
    pub bend_goal: Vector3<f32>,
    /// Bends packed as `(base, mid, tip)`
    pub index: Vector3<f32>,
    pub middle: Vector3<f32>,
    pub ring: Vector3<f32>,
    pub pinky: Vector3<f32>,
    pub thumb: [UnitQuaternion<f32>; 3],
}

impl HandSnapshot {
    pub fn from_pose(pose: &HandPose) -> Self {
        let r = &pose.rotations;
        Self {
            position: pose.effector.position,
            rotation: pose.effector.rotation,
            rotation_weight: pose.effector.rotation_weight,
            bend_goal: pose.bend_goal,
            index: r.index.bend_vector(),
            middle: r.middle.bend_vector(),
            ring: r.ring.bend_vector(),
            pinky: r.pinky.bend_vector(),
            thumb: r.thumb,
        }
    }

    fn to_pose(self, side: Side, active: bool) -> HandPose {
        let (position_weight, rotation_weight) = if active {
            (1.0, self.rotation_weight)
        } else {
            (0.0, 0.0)
        };
        HandPose {
            side,
            effector: EffectorTarget {
                position: self.position,
                rotation: self.rotation,
                position_weight,
                rotation_weight,
            },
            bend_goal: self.bend_goal,
            rotations: HandRotations {
                index: FingerBones::from_bend_vector(self.index),
                middle: FingerBones::from_bend_vector(self.middle),
                ring: FingerBones::from_bend_vector(self.ring),
                pinky: FingerBones::from_bend_vector(self.pinky),
                thumb: self.thumb,
            },
            mode: Mode::Replicated,
        }
    }
}

/// Everything a remote client needs to mirror the owner's hands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSnapshot {
    /// The owner's animator reached the ready pose
    pub initialized: bool,
    /// The owner drives its hands from landmarks at all
    pub using_hand_animations: bool,
    pub left: HandSnapshot,
    pub right: HandSnapshot,
}

impl ReplicationSnapshot {
    pub fn capture(animator: &HandsAnimator, using_hand_animations: bool) -> Self {
        let output = animator.output();
        Self {
            initialized: animator.is_ready(),
            using_hand_animations,
            left: HandSnapshot::from_pose(&output.left),
            right: HandSnapshot::from_pose(&output.right),
        }
    }
}

/// Replication settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    pub interval: Duration,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REPLICATION_INTERVAL,
        }
    }
}

/// Fixed-interval sampler for the owner side.
#[derive(Debug, Clone)]
pub struct Replicator {
    interval: Duration,
    last_sent: Option<Duration>,
}

impl Replicator {
    pub fn new(config: ReplicationConfig) -> Self {
        Self {
            interval: config.interval,
            last_sent: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a snapshot is due at `elapsed` (time since start).
    pub fn is_due(&self, elapsed: Duration) -> bool {
        self.last_sent
            .is_none_or(|last| elapsed.saturating_sub(last) >= self.interval)
    }

    /// Sample the animator if the interval has passed since the last sample.
    pub fn poll(
        &mut self,
        animator: &HandsAnimator,
        elapsed: Duration,
        using_hand_animations: bool,
    ) -> Option<ReplicationSnapshot> {
        if !self.is_due(elapsed) {
            return None;
        }
        self.last_sent = Some(elapsed);
        debug!(elapsed_ms = elapsed.as_millis() as u64, "replication snapshot");
        Some(ReplicationSnapshot::capture(animator, using_hand_animations))
    }
}

impl Default for Replicator {
    fn default() -> Self {
        Self::new(ReplicationConfig::default())
    }
}

/// Remote side of replication.
pub struct RemoteHands;

impl RemoteHands {
    /// Rebuild both hand poses from a snapshot.
    ///
    /// Returns `None` until the owner is initialized. When the owner is not
    /// using hand animations every weight is 0 so the IK solver ignores
    /// the effectors.
    pub fn apply(snapshot: &ReplicationSnapshot) -> Option<HandsOutput> {
        if !snapshot.initialized {
            return None;
        }
        let active = snapshot.using_hand_animations;
        Some(HandsOutput {
            left: snapshot.left.to_pose(Side::Left, active),
            right: snapshot.right.to_pose(Side::Right, active),
        })
    }
}
