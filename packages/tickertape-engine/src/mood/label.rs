//! Categorical views of the sentiment index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-bucket fear/greed label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoodLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl MoodLabel {
    pub fn from_sentiment(sentiment: f64) -> Self {
        if sentiment < 20.0 {
            MoodLabel::ExtremeFear
        } else if sentiment < 40.0 {
            MoodLabel::Fear
        } else if sentiment <= 60.0 {
            MoodLabel::Neutral
        } else if sentiment <= 80.0 {
            MoodLabel::Greed
        } else {
            MoodLabel::ExtremeGreed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::ExtremeFear => "Extreme Fear",
            MoodLabel::Fear => "Fear",
            MoodLabel::Neutral => "Neutral",
            MoodLabel::Greed => "Greed",
            MoodLabel::ExtremeGreed => "Extreme Greed",
        }
    }

    pub fn color(&self) -> MoodColor {
        match self {
            MoodLabel::ExtremeFear => MoodColor::Red,
            MoodLabel::Fear => MoodColor::Orange,
            MoodLabel::Neutral => MoodColor::Grey,
            MoodLabel::Greed => MoodColor::LightGreen,
            MoodLabel::ExtremeGreed => MoodColor::Green,
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display color for a mood bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoodColor {
    Red,
    Orange,
    Grey,
    LightGreen,
    Green,
}

impl MoodColor {
    pub fn hex(&self) -> &'static str {
        match self {
            MoodColor::Red => "#D32F2F",
            MoodColor::Orange => "#F57C00",
            MoodColor::Grey => "#9E9E9E",
            MoodColor::LightGreen => "#7CB342",
            MoodColor::Green => "#2E7D32",
        }
    }
}
