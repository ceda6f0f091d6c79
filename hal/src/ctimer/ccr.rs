use super::Channel;

/// Signal edge on a capture input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high transition.
    Rising,
    /// High to low transition.
    Falling,
}

/// Capture edge sensitivity.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::{CaptureEdges, Edge};
///
/// assert!(CaptureEdges::Both.captures(Edge::Rising));
/// assert!(CaptureEdges::Both.captures(Edge::Falling));
/// assert!(!CaptureEdges::Rising.captures(Edge::Falling));
/// assert_eq!(CaptureEdges::Rising.with(Edge::Falling, true), CaptureEdges::Both);
/// assert_eq!(CaptureEdges::Both.with(Edge::Rising, false), CaptureEdges::Falling);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CaptureEdges {
    /// Capture disabled.
    #[default]
    None = 0b00,
    /// Capture on rising edges.
    Rising = 0b01,
    /// Capture on falling edges.
    Falling = 0b10,
    /// Capture on either edge.
    Both = 0b11,
}

impl CaptureEdges {
    pub(crate) const fn from_bits(bits: u32) -> CaptureEdges {
        match bits & 0b11 {
            0b00 => CaptureEdges::None,
            0b01 => CaptureEdges::Rising,
            0b10 => CaptureEdges::Falling,
            _ => CaptureEdges::Both,
        }
    }

    const fn edge_bit(edge: Edge) -> u8 {
        match edge {
            Edge::Rising => 0b01,
            Edge::Falling => 0b10,
        }
    }

    /// Returns `true` if `edge` is captured.
    pub const fn captures(&self, edge: Edge) -> bool {
        (*self as u8) & Self::edge_bit(edge) != 0
    }

    /// Enable or disable one edge, leaving the other as it is.
    #[must_use = "with returns a new CaptureEdges"]
    pub const fn with(self, edge: Edge, en: bool) -> CaptureEdges {
        let bits: u8 = if en {
            self as u8 | Self::edge_bit(edge)
        } else {
            self as u8 & !Self::edge_bit(edge)
        };
        CaptureEdges::from_bits(bits as u32)
    }
}

/// Edge on which counting happens in counter mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CountEdge {
    /// Count rising edges.
    Rising = 0b01,
    /// Count falling edges.
    Falling = 0b10,
    /// Count both edges.
    Both = 0b11,
}

impl CountEdge {
    /// Returns `true` if `edge` increments the counter.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{CountEdge, Edge};
    ///
    /// assert!(CountEdge::Rising.counts(Edge::Rising));
    /// assert!(!CountEdge::Rising.counts(Edge::Falling));
    /// assert!(CountEdge::Both.counts(Edge::Falling));
    /// ```
    pub const fn counts(&self, edge: Edge) -> bool {
        CaptureEdges::from_bits(*self as u32).captures(edge)
    }
}

/// Counting source.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::{Channel, CountEdge, Mode};
///
/// const EDGES: Mode = Mode::Counter {
///     input: Channel::Ch1,
///     edge: CountEdge::Both,
/// };
/// assert_eq!(Mode::default(), Mode::Timer);
/// assert_ne!(EDGES, Mode::Timer);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Count prescaled bus clock cycles.
    #[default]
    Timer,
    /// Count edges on a capture input.
    Counter {
        /// Capture input that is counted.
        input: Channel,
        /// Counted edges.
        edge: CountEdge,
    },
}

impl Mode {
    pub(crate) const fn from_fields(ctmode: u32, cinsel: u32) -> Mode {
        let input: Channel = Channel::from_bits(cinsel);
        match ctmode & 0b11 {
            0b00 => Mode::Timer,
            0b01 => Mode::Counter {
                input,
                edge: CountEdge::Rising,
            },
            0b10 => Mode::Counter {
                input,
                edge: CountEdge::Falling,
            },
            _ => Mode::Counter {
                input,
                edge: CountEdge::Both,
            },
        }
    }

    pub(crate) const fn ctmode(&self) -> u32 {
        match self {
            Mode::Timer => 0,
            Mode::Counter { edge, .. } => *edge as u32,
        }
    }

    /// Input select, left at zero in timer mode.
    pub(crate) const fn cinsel(&self) -> u32 {
        match self {
            Mode::Timer => 0,
            Mode::Counter { input, .. } => *input as u32,
        }
    }
}

/// Capture edge that clears the counter and prescale counter.
///
/// Only capture channels 0 to 2 can clear the counter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureClear {
    /// Capture input.
    pub input: Channel,
    /// Edge on that input.
    pub edge: Edge,
}

impl CaptureClear {
    pub(crate) const fn selcc(&self) -> u32 {
        let edge: u32 = match self.edge {
            Edge::Rising => 0,
            Edge::Falling => 1,
        };
        2 * (self.input as u32) + edge
    }

    pub(crate) const fn from_selcc(bits: u32) -> CaptureClear {
        CaptureClear {
            input: Channel::from_bits((bits & 0b111) >> 1),
            edge: if bits & 1 == 0 {
                Edge::Rising
            } else {
                Edge::Falling
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureClear, Edge, Mode};
    use crate::ctimer::{Channel, CountEdge};

    #[test]
    fn mode_fields() {
        let mode = Mode::Counter {
            input: Channel::Ch2,
            edge: CountEdge::Falling,
        };
        assert_eq!(mode.ctmode(), 0b10);
        assert_eq!(mode.cinsel(), 2);
        assert_eq!(Mode::from_fields(mode.ctmode(), mode.cinsel()), mode);
        assert_eq!(Mode::from_fields(0, 3), Mode::Timer);
    }

    #[test]
    fn selcc() {
        let clear = CaptureClear {
            input: Channel::Ch1,
            edge: Edge::Falling,
        };
        assert_eq!(clear.selcc(), 0b011);
        assert_eq!(CaptureClear::from_selcc(0b011), clear);
    }
}
