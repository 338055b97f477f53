//! Placement vocabulary: marker classes, inside edges and placement requests.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::geometry::Coordinate;

/// Class marker added to the overlay for each applied placement.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Above,
    Below,
    Left,
    Right,
    AlignLeft,
    AlignRight,
    Autoplace,
    InsideTop,
    InsideBottom,
}

impl Marker {
    pub const ALL: [Self; 9] = [
        Self::Above,
        Self::Below,
        Self::Left,
        Self::Right,
        Self::AlignLeft,
        Self::AlignRight,
        Self::Autoplace,
        Self::InsideTop,
        Self::InsideBottom,
    ];

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Above => "Above",
            Self::Below => "Below",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::AlignLeft => "AlignLeft",
            Self::AlignRight => "AlignRight",
            Self::Autoplace => "Autoplace",
            Self::InsideTop => "InsideTop",
            Self::InsideBottom => "InsideBottom",
        }
    }

    /// CSS class for this marker under the given prefix, e.g. `TooltipAbove`.
    #[must_use]
    pub fn class_name(self, prefix: &str) -> String {
        format!("{prefix}{}", self.suffix())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Edge of the anchor an `inside` placement hugs.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsideEdge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown inside edge {0:?}")]
pub struct UnknownEdge(pub String);

impl FromStr for InsideEdge {
    type Err = UnknownEdge;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(UnknownEdge(other.to_string())),
        }
    }
}

impl InsideEdge {
    /// Parse loosely-typed keywords, dropping anything unrecognized.
    pub fn parse_all<I, S>(keywords: I) -> SmallVec<[Self; 4]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keywords
            .into_iter()
            .filter_map(|keyword| match keyword.as_ref().parse::<Self>() {
                Ok(edge) => Some(edge),
                Err(err) => {
                    log::debug!("ignoring inside keyword: {err}");
                    None
                }
            })
            .collect()
    }
}

/// Sides picked by the quadrant heuristic.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AutoOffsets {
    /// [`Marker::Left`] or [`Marker::Right`]
    pub horizontal: Marker,
    /// [`Marker::Above`] or [`Marker::Below`]
    pub vertical: Marker,
}

/// One placement request.
///
/// Cushions are extra pixels of gap beyond the size-based offset.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    Above {
        #[serde(default)]
        cushion: f64,
    },
    Below {
        #[serde(default)]
        cushion: f64,
    },
    Left {
        #[serde(default)]
        cushion: f64,
    },
    Right {
        #[serde(default)]
        cushion: f64,
    },
    AlignLeft {
        #[serde(default)]
        cushion: f64,
    },
    AlignRight {
        #[serde(default)]
        cushion: f64,
    },
    AutoHorizontal {
        #[serde(default)]
        cushion: f64,
    },
    AutoVertical {
        #[serde(default)]
        cushion: f64,
    },
    Auto {
        #[serde(default)]
        left_cushion: f64,
        #[serde(default)]
        top_cushion: f64,
    },
    Inside {
        #[serde(default)]
        edges: SmallVec<[InsideEdge; 4]>,
    },
}

/// New values for the axes a placement addresses. Untouched axes stay `None`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct AxisUpdate {
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl AxisUpdate {
    #[must_use]
    pub const fn top(top: f64) -> Self {
        Self {
            top: Some(top),
            left: None,
        }
    }

    #[must_use]
    pub const fn left(left: f64) -> Self {
        Self {
            top: None,
            left: Some(left),
        }
    }

    #[must_use]
    pub const fn both(top: f64, left: f64) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
        }
    }

    /// Merge onto the previously applied coordinate, keeping untouched axes.
    #[must_use]
    pub fn compose(self, last: Coordinate) -> Coordinate {
        Coordinate {
            top: self.top.unwrap_or(last.top),
            left: self.left.unwrap_or(last.left),
        }
    }
}
