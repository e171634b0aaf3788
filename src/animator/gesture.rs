//! Discrete hand gestures reported by the external classifier.

use std::str::FromStr;

/// Gesture categories reported per hand, per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    #[default]
    None,
    ClosedFist,
    OpenPalm,
    PointingUp,
    ThumbDown,
    ThumbUp,
    Victory,
    ILoveYou,
}

impl Gesture {
    /// Classifier category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ClosedFist => "Closed_Fist",
            Self::OpenPalm => "Open_Palm",
            Self::PointingUp => "Pointing_Up",
            Self::ThumbDown => "Thumb_Down",
            Self::ThumbUp => "Thumb_Up",
            Self::Victory => "Victory",
            Self::ILoveYou => "ILoveYou",
        }
    }

    /// Map a classifier category name. Unknown names read as `None`.
    pub fn from_category(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for Gesture {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "None" | "" => Self::None,
            "Closed_Fist" => Self::ClosedFist,
            "Open_Palm" => Self::OpenPalm,
            "Pointing_Up" => Self::PointingUp,
            "Thumb_Down" => Self::ThumbDown,
            "Thumb_Up" => Self::ThumbUp,
            "Victory" => Self::Victory,
            "ILoveYou" => Self::ILoveYou,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_category() {
        assert_eq!(Gesture::from_category("Thumb_Up"), Gesture::ThumbUp);
        assert_eq!(Gesture::from_category("Thumb_Down"), Gesture::ThumbDown);
        assert_eq!(Gesture::from_category("Wave"), Gesture::None);
        assert_eq!(Gesture::from_category(Gesture::ILoveYou.as_str()), Gesture::ILoveYou);
    }
}
