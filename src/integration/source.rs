//! Trait for perception backends that deliver landmark frames.

use std::convert::Infallible;

use crate::animator::LandmarkFrame;

/// Trait for perception backends.
///
/// Implement this trait to feed any landmark detector into the
/// [`AvatarPipeline`](super::AvatarPipeline). Polling must not block: a
/// backend that has nothing new returns `Ok(None)`.
///
/// # Example
///
/// ```ignore
/// use landmark_ik_rs::{LandmarkFrame, LandmarkSource};
///
/// struct MyTracker {
///     // Your detector handle here
/// }
///
/// impl LandmarkSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn poll(&mut self) -> Result<Option<LandmarkFrame>, Self::Error> {
///         // Read the most recent result, if any
///         Ok(None)
///     }
/// }
/// ```
pub trait LandmarkSource {
    /// Error type for backend failures.
    type Error;

    /// Whether the backend has finished starting up.
    fn is_ready(&self) -> bool {
        true
    }

    /// Take the most recent frame, if a new one is available.
    fn poll(&mut self) -> Result<Option<LandmarkFrame>, Self::Error>;
}

/// Helper trait for converting backend-specific results to a `LandmarkFrame`.
pub trait IntoLandmarkFrame {
    fn into_landmark_frame(self) -> LandmarkFrame;
}

impl IntoLandmarkFrame for LandmarkFrame {
    fn into_landmark_frame(self) -> LandmarkFrame {
        self
    }
}

/// Source for callback-driven backends: results are pushed in as they
/// arrive and each poll takes the newest one.
///
/// Older unpolled frames are dropped.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    frame: Option<LandmarkFrame>,
    ready: bool,
    dropped: u64,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn push(&mut self, frame: impl IntoLandmarkFrame) {
        if self.frame.replace(frame.into_landmark_frame()).is_some() {
            self.dropped += 1;
        }
    }

    /// Number of frames replaced before they were polled.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl LandmarkSource for LatestFrame {
    type Error = Infallible;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn poll(&mut self) -> Result<Option<LandmarkFrame>, Self::Error> {
        Ok(self.frame.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::Gesture;

    #[test]
    fn test_latest_frame_keeps_newest() {
        let mut source = LatestFrame::new();
        assert!(!source.is_ready());
        assert_eq!(source.poll().unwrap(), None);

        source.push(LandmarkFrame::default());
        source.push(LandmarkFrame {
            left_gesture: Gesture::Victory,
            ..Default::default()
        });
        assert_eq!(source.dropped(), 1);

        let frame = source.poll().unwrap().unwrap();
        assert_eq!(frame.left_gesture, Gesture::Victory);
        assert_eq!(source.poll().unwrap(), None);
    }
}
