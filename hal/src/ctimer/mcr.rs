use super::Callback;
use core::ops::BitOr;

/// Actions taken when the counter equals a match value.
///
/// Actions are independent bits and may be combined.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::MatchActions;
///
/// const PERIOD: MatchActions = MatchActions::INTERRUPT.union(MatchActions::RESET);
/// assert!(PERIOD.contains(MatchActions::RESET));
/// assert!(!PERIOD.contains(MatchActions::STOP));
/// assert_eq!(PERIOD, MatchActions::INTERRUPT | MatchActions::RESET);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatchActions {
    val: u8,
}

impl MatchActions {
    /// No action, the match register is only compared.
    pub const NONE: MatchActions = MatchActions::new(0);
    /// Raise the match interrupt flag.
    pub const INTERRUPT: MatchActions = MatchActions::new(1 << 0);
    /// Reset the counter to zero.
    pub const RESET: MatchActions = MatchActions::new(1 << 1);
    /// Stop the counter.
    pub const STOP: MatchActions = MatchActions::new(1 << 2);
    /// Reload the match register from its shadow register when the counter
    /// is reset.
    pub const RELOAD: MatchActions = MatchActions::new(1 << 3);

    /// Every action.
    pub const ALL: MatchActions = MatchActions::new(0b1111);

    const fn new(val: u8) -> MatchActions {
        MatchActions { val: val & 0b1111 }
    }

    /// Build an action set from the 3-bit MCR group and the reload bit.
    pub(crate) const fn from_fields(irs: u32, reload: u32) -> MatchActions {
        MatchActions::new((irs as u8 & 0b111) | ((reload as u8 & 1) << 3))
    }

    /// Interrupt, reset, and stop bits in MCR order.
    pub(crate) const fn irs(self) -> u32 {
        (self.val & 0b111) as u32
    }

    /// Reload bit.
    pub(crate) const fn reload(self) -> u32 {
        ((self.val >> 3) & 1) as u32
    }

    /// Combine two action sets.
    #[must_use = "union returns a new MatchActions"]
    pub const fn union(self, other: MatchActions) -> MatchActions {
        MatchActions::new(self.val | other.val)
    }

    /// Remove the actions of `other`.
    #[must_use = "difference returns a new MatchActions"]
    pub const fn difference(self, other: MatchActions) -> MatchActions {
        MatchActions::new(self.val & !other.val)
    }

    /// Returns `true` if all actions in `other` are present.
    pub const fn contains(&self, other: MatchActions) -> bool {
        self.val & other.val == other.val
    }

    /// Returns `true` if no action is present.
    pub const fn is_empty(&self) -> bool {
        self.val == 0
    }
}

impl BitOr for MatchActions {
    type Output = MatchActions;

    fn bitor(self, rhs: MatchActions) -> MatchActions {
        self.union(rhs)
    }
}

/// What the external match output does on a match.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::{ExtMatch, MatchConfig};
///
/// assert_eq!(ExtMatch::default(), ExtMatch::Nothing);
/// assert_eq!(ExtMatch::Toggle as u8, 0b11);
/// assert_eq!(MatchConfig::DEFAULT.ext_match(), ExtMatch::Nothing);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ExtMatch {
    /// Output unchanged.
    #[default]
    Nothing = 0b00,
    /// Drive the output low.
    Clear = 0b01,
    /// Drive the output high.
    Set = 0b10,
    /// Toggle the output.
    Toggle = 0b11,
}

impl ExtMatch {
    pub(crate) const fn from_bits(bits: u32) -> ExtMatch {
        match bits & 0b11 {
            0b00 => ExtMatch::Nothing,
            0b01 => ExtMatch::Clear,
            0b10 => ExtMatch::Set,
            _ => ExtMatch::Toggle,
        }
    }
}

/// Complete configuration of one match channel.
///
/// Applying a configuration also replaces the channel's match callback;
/// `None` clears it.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::{ExtMatch, MatchActions, MatchConfig};
///
/// const PERIOD: MatchConfig = MatchConfig::DEFAULT
///     .set_value(48_000)
///     .set_actions(MatchActions::INTERRUPT.union(MatchActions::RESET))
///     .set_ext_match(ExtMatch::Toggle);
/// # assert_eq!(PERIOD.value(), 48_000);
/// # assert_eq!(PERIOD.ext_match(), ExtMatch::Toggle);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct MatchConfig {
    value: u32,
    actions: MatchActions,
    ext_match: ExtMatch,
    callback: Option<Callback>,
}

impl MatchConfig {
    /// Match value 0, no actions, output untouched, no callback.
    pub const DEFAULT: MatchConfig = MatchConfig {
        value: 0,
        actions: MatchActions::NONE,
        ext_match: ExtMatch::Nothing,
        callback: None,
    };

    /// Set the match value in counter ticks.
    #[must_use = "set_value returns a modified MatchConfig"]
    pub const fn set_value(mut self, value: u32) -> MatchConfig {
        self.value = value;
        self
    }

    /// Set the match actions.
    #[must_use = "set_actions returns a modified MatchConfig"]
    pub const fn set_actions(mut self, actions: MatchActions) -> MatchConfig {
        self.actions = actions;
        self
    }

    /// Set the external match output action.
    #[must_use = "set_ext_match returns a modified MatchConfig"]
    pub const fn set_ext_match(mut self, ext_match: ExtMatch) -> MatchConfig {
        self.ext_match = ext_match;
        self
    }

    /// Set the callback invoked from the interrupt handler.
    #[must_use = "set_callback returns a modified MatchConfig"]
    pub const fn set_callback(mut self, callback: Option<Callback>) -> MatchConfig {
        self.callback = callback;
        self
    }

    /// Match value.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Match actions.
    pub const fn actions(&self) -> MatchActions {
        self.actions
    }

    /// External match output action.
    pub const fn ext_match(&self) -> ExtMatch {
        self.ext_match
    }

    /// Callback.
    pub const fn callback(&self) -> Option<Callback> {
        self.callback
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig::DEFAULT
    }
}
