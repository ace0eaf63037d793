//! Channel presets.
//!
//! A preset names which material property lives in which color channel
//! of a packed texture. The table is fixed at compile time.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Source color channel of a packed texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Plane index in an RGB(A) buffer
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Channel::Red => 'R',
            Channel::Green => 'G',
            Channel::Blue => 'B',
        }
    }
}

/// Channel supplying each of AO, Roughness, and Metallic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMapping {
    pub ao: Channel,
    pub roughness: Channel,
    pub metallic: Channel,
}

/// Supported channel-packing conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelPreset {
    /// R=AO, G=Roughness, B=Metallic
    #[default]
    Orm,
    /// R=Metallic, G=Roughness, B=AO
    Mra,
    /// R=Roughness, G=Metallic, B=AO
    Rma,
}

impl ChannelPreset {
    /// All presets in display order. The first one is the default.
    pub const ALL: [ChannelPreset; 3] = [ChannelPreset::Orm, ChannelPreset::Mra, ChannelPreset::Rma];

    pub fn key(&self) -> &'static str {
        match self {
            ChannelPreset::Orm => "ORM",
            ChannelPreset::Mra => "MRA",
            ChannelPreset::Rma => "RMA",
        }
    }

    /// Human-readable label, e.g. for a preset picker.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelPreset::Orm => "ORM (R=AO, G=Roughness, B=Metallic)",
            ChannelPreset::Mra => "MRA (R=Metallic, G=Roughness, B=AO)",
            ChannelPreset::Rma => "RMA (R=Roughness, G=Metallic, B=AO)",
        }
    }

    pub fn mapping(&self) -> ChannelMapping {
        match self {
            ChannelPreset::Orm => ChannelMapping {
                ao: Channel::Red,
                roughness: Channel::Green,
                metallic: Channel::Blue,
            },
            ChannelPreset::Mra => ChannelMapping {
                ao: Channel::Blue,
                roughness: Channel::Green,
                metallic: Channel::Red,
            },
            ChannelPreset::Rma => ChannelMapping {
                ao: Channel::Blue,
                roughness: Channel::Red,
                metallic: Channel::Green,
            },
        }
    }
}

impl fmt::Display for ChannelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChannelPreset {
    type Err = crate::Error;

    /// Matches the preset key case-insensitively. Descriptive labels are not accepted.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        ChannelPreset::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| crate::Error::UnknownPreset(s.to_string()))
    }
}

impl Serialize for ChannelPreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for ChannelPreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve a preset identifier to its channel mapping.
pub fn resolve(preset_id: &str) -> Result<ChannelMapping> {
    Ok(preset_id.parse::<ChannelPreset>()?.mapping())
}
