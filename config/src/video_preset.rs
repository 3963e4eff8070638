use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// Camera capture presets, named after the height of the encoded picture.
#[derive(
    Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VideoPreset {
    H90,
    H180,
    H216,
    H360,
    H540,
    #[default]
    H720,
    H1080,
    H1440,
    H2160,
}

/// Resolution and encoding limits of a [`VideoPreset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoPresetSpec {
    pub width: u32,
    pub height: u32,
    pub max_bitrate: u64,
    pub max_framerate: u32,
}

impl VideoPreset {
    pub fn spec(self) -> VideoPresetSpec {
        let (width, height, max_bitrate, max_framerate) = match self {
            Self::H90 => (160, 90, 90_000, 15),
            Self::H180 => (320, 180, 160_000, 15),
            Self::H216 => (384, 216, 180_000, 15),
            Self::H360 => (640, 360, 450_000, 20),
            Self::H540 => (960, 540, 800_000, 25),
            Self::H720 => (1280, 720, 1_700_000, 30),
            Self::H1080 => (1920, 1080, 3_000_000, 30),
            Self::H1440 => (2560, 1440, 5_000_000, 30),
            Self::H2160 => (3840, 2160, 8_000_000, 30),
        };
        VideoPresetSpec {
            width,
            height,
            max_bitrate,
            max_framerate,
        }
    }

    pub fn width(self) -> u32 {
        self.spec().width
    }

    pub fn height(self) -> u32 {
        self.spec().height
    }
}
