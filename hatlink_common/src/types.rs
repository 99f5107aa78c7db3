//! Core data types shared across the workspace.
//!
//! Defines the raw sample tuple delivered by the driver, port identifiers,
//! and the report-channel selection flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One driver callback payload: the raw actuator state at a point in time.
///
/// `position` is the unbounded relative counter used for multi-turn
/// tracking; `absolute_position` wraps modulo 360 and reflects the shaft
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Current speed, in percent of full scale.
    pub speed: f64,
    /// Relative position in degrees (signed, unbounded).
    pub position: f64,
    /// Absolute position in degrees, in `[0, 360)`.
    pub absolute_position: f64,
}

/// Hat port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Port {
    A,
    B,
    C,
    D,
}

impl Port {
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            3 => Some(Self::D),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        };
        write!(f, "{c}")
    }
}

/// Identity reported by an attached device at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInfo {
    /// Firmware-reported device type id.
    pub type_id: u16,
}

bitflags! {
    /// Data channels a device is asked to report on every sample.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReportChannels: u8 {
        /// Current speed.
        const SPEED        = 0x01;
        /// Relative (continuous) position.
        const POSITION     = 0x02;
        /// Absolute (modulo-360) position.
        const ABS_POSITION = 0x04;
        /// Distance reading.
        const DISTANCE     = 0x08;
    }
}

impl ReportChannels {
    /// Channel set a motor reports: speed + relative + absolute position.
    pub const MOTOR: Self = Self::from_bits_truncate(
        Self::SPEED.bits() | Self::POSITION.bits() | Self::ABS_POSITION.bits(),
    );
}

/// Handler invoked from the delivery context on every new sample.
///
/// The single registration slot on the driver; the core layers a dispatcher
/// on top so logical consumers never clobber each other.
pub type SampleCallback = Box<dyn FnMut(Sample) + Send>;

/// Handler invoked from the delivery context on every new distance reading.
pub type DistanceCallback = Box<dyn FnMut(i32) + Send>;
