//! Standard counter/timer (CTIMER)
//!
//! The driver is layered:
//!
//! * [`Bus`] and [`Field`] give bit-exact register access.
//! * Configuration methods on [`Ctimer`] each touch one capability with a
//!   read-modify-write that preserves every unrelated bit.
//! * [`Ctimer::on_interrupt`] clears pending flags and dispatches the
//!   registered [`Callback`]s.
//!
//! All methods take `&self` so one driver can live in a `static` shared by
//! thread mode and the interrupt handler. Read-modify-write sequences run
//! inside a [`critical_section`].
//!
//! # Example
//!
//! Toggle the match 0 output every 1 ms from a 12 MHz bus clock.
//!
//! ```no_run
//! use lpc84x_hal::ctimer::{Channel, Ctimer, ExtMatch, MatchActions, MatchConfig};
//!
//! static CTIMER0: Ctimer = unsafe { Ctimer::steal() };
//!
//! fn on_period(_ch: Channel, _value: u32) {
//!     // runs in the interrupt handler, must not block
//! }
//!
//! CTIMER0.timer_mode_init(11); // 12 MHz / 12 = 1 MHz
//! CTIMER0.configure_match(
//!     Channel::Ch0,
//!     &MatchConfig::DEFAULT
//!         .set_value(1_000)
//!         .set_actions(MatchActions::INTERRUPT.union(MatchActions::RESET))
//!         .set_ext_match(ExtMatch::Toggle)
//!         .set_callback(Some(on_period)),
//! );
//! unsafe { CTIMER0.unmask_interrupt() };
//! CTIMER0.enable_counter();
//!
//! // in the CTIMER0 vector:
//! CTIMER0.on_interrupt();
//! ```
#![warn(missing_docs)]

mod ccr;
mod event;
mod mcr;
mod pwm;
mod regs;
#[cfg(any(test, feature = "sim"))]
#[cfg_attr(docsrs, doc(cfg(feature = "sim")))]
pub mod sim;

pub use ccr::{CaptureClear, CaptureEdges, CountEdge, Edge, Mode};
pub use event::{Callback, Event, State};
pub use mcr::{ExtMatch, MatchActions, MatchConfig};
pub use pwm::{PwmChannel, PwmChannelConfig, PERIOD_CHANNEL};
pub use regs::{fields, irq, Bus, Field, Mmio, Reg, CTIMER0_BASE};

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use event::Handlers;
use crate::Ratio;
use void::Void;

/// Match or capture channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    /// Channel 0.
    Ch0 = 0,
    /// Channel 1.
    Ch1 = 1,
    /// Channel 2.
    Ch2 = 2,
    /// Channel 3.
    Ch3 = 3,
}

impl Channel {
    /// All channels, lowest index first.
    pub const ALL: [Channel; 4] = [Channel::Ch0, Channel::Ch1, Channel::Ch2, Channel::Ch3];

    /// Channel index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel from an index.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::Channel;
    ///
    /// assert_eq!(Channel::from_index(2), Some(Channel::Ch2));
    /// assert_eq!(Channel::from_index(4), None);
    /// ```
    pub const fn from_index(idx: u8) -> Option<Channel> {
        match idx {
            0..=3 => Some(Channel::from_bits(idx as u32)),
            _ => None,
        }
    }

    pub(crate) const fn from_bits(bits: u32) -> Channel {
        match bits & 0b11 {
            0 => Channel::Ch0,
            1 => Channel::Ch1,
            2 => Channel::Ch2,
            _ => Channel::Ch3,
        }
    }
}

/// CTIMER interrupt lines.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Interrupt {
    /// CTIMER0 interrupt.
    CTIMER0 = 23,
}

// safety: the discriminant is the NVIC line of the peripheral
unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

/// Counter/timer driver.
///
/// One value per hardware instance; it owns the register block through its
/// [`Bus`] and the instance's callback table.
#[derive(Debug)]
pub struct Ctimer<B: Bus = Mmio> {
    bus: B,
    irq: Interrupt,
    handlers: Handlers,
    dispatching: AtomicBool,
    /// Match values as last made live by the driver or a counter reset.
    live: [AtomicU32; 4],
}

impl Ctimer<Mmio> {
    /// Steal the CTIMER0 peripheral.
    ///
    /// This does not initialize the timer.
    ///
    /// # Safety
    ///
    /// 1. Only one driver may exist for CTIMER0.
    /// 2. The peripheral clock must be enabled before the driver is used.
    pub const unsafe fn steal() -> Self {
        Ctimer::new(unsafe { Mmio::new(CTIMER0_BASE) }, Interrupt::CTIMER0)
    }
}

impl<B: Bus> Ctimer<B> {
    /// Create a driver over a register block.
    ///
    /// The registers are not touched.
    pub const fn new(bus: B, irq: Interrupt) -> Self {
        Ctimer {
            bus,
            irq,
            handlers: Handlers::new(),
            dispatching: AtomicBool::new(false),
            live: [const { AtomicU32::new(0) }; 4],
        }
    }

    /// Free the register block from the driver.
    pub fn free(self) -> B {
        self.bus
    }

    /// Register block.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Interrupt line of this instance.
    pub const fn irq(&self) -> Interrupt {
        self.irq
    }

    /// Unmask the interrupt line in the NVIC.
    ///
    /// # Safety
    ///
    /// This can break mask-based critical sections.
    pub unsafe fn unmask_interrupt(&self) {
        unsafe { cortex_m::peripheral::NVIC::unmask(self.irq) }
    }

    /// Mask the interrupt line in the NVIC.
    pub fn mask_interrupt(&self) {
        cortex_m::peripheral::NVIC::mask(self.irq)
    }

    #[inline]
    fn field(&self, field: Field) -> u32 {
        self.bus.read_field(field)
    }

    #[inline]
    fn flag(&self, field: Field) -> bool {
        self.bus.read_field(field) != 0
    }

    #[inline]
    fn modify(&self, field: Field, val: u32) {
        critical_section::with(|_| self.bus.write_field(field, val))
    }

    #[inline]
    fn modify_register<F: FnOnce(u32) -> u32>(&self, reg: Reg, f: F) {
        critical_section::with(|_| self.bus.modify_register(reg, f))
    }

    /// Initialize the timer in timer mode.
    ///
    /// The counter is reset and left stopped, match and capture
    /// configuration is untouched.
    ///
    /// `prescaler` is the desired division minus one.
    pub fn timer_mode_init(&self, prescaler: u32) {
        self.disable_counter();
        self.reset_counter();
        self.set_mode(Mode::Timer);
        self.write_prescaler(prescaler);
    }

    /// Select the counting source.
    ///
    /// Takes effect immediately, even while counting.
    pub fn set_mode(&self, mode: Mode) {
        self.modify_register(Reg::CTCR, |ctcr| {
            let ctcr: u32 = fields::CTCR_CTMODE.insert(ctcr, mode.ctmode());
            fields::CTCR_CINSEL.insert(ctcr, mode.cinsel())
        })
    }

    /// Counting source.
    pub fn mode(&self) -> Mode {
        let ctcr: u32 = self.bus.read_register(Reg::CTCR);
        Mode::from_fields(
            fields::CTCR_CTMODE.extract(ctcr),
            fields::CTCR_CINSEL.extract(ctcr),
        )
    }

    /// Clear the counter on a capture edge, or stop doing so with `None`.
    pub fn set_capture_clear(&self, clear: Option<CaptureClear>) {
        self.modify_register(Reg::CTCR, |ctcr| match clear {
            Some(clear) => {
                debug_assert!(clear.input != Channel::Ch3);
                let ctcr: u32 = fields::CTCR_SELCC.insert(ctcr, clear.selcc());
                fields::CTCR_ENCC.insert(ctcr, 1)
            }
            None => fields::CTCR_ENCC.insert(ctcr, 0),
        })
    }

    /// Capture edge that clears the counter.
    pub fn capture_clear(&self) -> Option<CaptureClear> {
        if self.flag(fields::CTCR_ENCC) {
            Some(CaptureClear::from_selcc(self.field(fields::CTCR_SELCC)))
        } else {
            None
        }
    }

    /// Set the prescaler.
    ///
    /// The counter advances once every `divider + 1` input clocks.
    #[inline]
    pub fn write_prescaler(&self, divider: u32) {
        self.bus.write_register(Reg::PR, divider)
    }

    /// Get the prescaler.
    #[inline]
    pub fn read_prescaler(&self) -> u32 {
        self.bus.read_register(Reg::PR)
    }

    /// Get the prescale counter.
    #[inline]
    pub fn read_prescale_counter(&self) -> u32 {
        self.bus.read_register(Reg::PC)
    }

    /// Counting frequency in timer mode, from the input clock frequency.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lpc84x_hal::ctimer::Ctimer;
    ///
    /// let tim: Ctimer = unsafe { Ctimer::steal() };
    /// tim.write_prescaler(2);
    /// assert_eq!(tim.counter_hz(12_000_000).to_integer(), 4_000_000);
    /// ```
    pub fn counter_hz(&self, input_hz: u32) -> Ratio<u64> {
        Ratio::new(
            u64::from(input_hz),
            u64::from(self.read_prescaler()) + 1,
        )
    }

    /// Start counting.
    pub fn enable_counter(&self) {
        self.modify(fields::TCR_CEN, 1)
    }

    /// Stop counting.
    ///
    /// The count value and all configuration are kept.
    pub fn disable_counter(&self) {
        self.modify(fields::TCR_CEN, 0)
    }

    /// Returns `true` if the counter is enabled.
    ///
    /// This is cleared by hardware on a stop-on-match.
    pub fn is_enabled(&self) -> bool {
        self.flag(fields::TCR_CEN)
    }

    /// Hold the counter and prescale counter at zero.
    ///
    /// Match registers with reload enabled are loaded from their shadows.
    pub fn assert_counter_reset(&self) {
        self.modify(fields::TCR_CRST, 1);
        self.sync_live();
    }

    /// Release the counter reset.
    pub fn clear_counter_reset(&self) {
        self.modify(fields::TCR_CRST, 0)
    }

    /// Pulse the counter reset.
    pub fn reset_counter(&self) {
        self.assert_counter_reset();
        self.clear_counter_reset();
    }

    /// Get the counter value.
    #[inline]
    pub fn read_counter(&self) -> u32 {
        self.bus.read_register(Reg::TC)
    }

    /// Set the counter value.
    #[inline]
    pub fn write_counter(&self, value: u32) {
        self.bus.write_register(Reg::TC, value)
    }

    /// Set the match value and the match actions of a channel.
    ///
    /// Actions not in `actions` are disabled. Other channels are untouched.
    pub fn config_match(&self, ch: Channel, value: u32, actions: MatchActions) {
        if self.is_pwm_enabled(ch) {
            warn!("ctimer: reconfiguring PWM channel {}", ch);
        }
        self.set_match_value(ch, value);
        self.modify_register(Reg::MCR, |mcr| {
            let mcr: u32 = fields::mcr_actions(ch).insert(mcr, actions.irs());
            fields::mcr_reload(ch).insert(mcr, actions.reload())
        })
    }

    /// Apply a complete match configuration, including the callback.
    pub fn configure_match(&self, ch: Channel, config: &MatchConfig) {
        self.set_match_callback(ch, config.callback());
        self.config_match(ch, config.value(), config.actions());
        self.set_external_match(ch, config.ext_match());
    }

    /// Set the live match value.
    #[inline]
    pub fn set_match_value(&self, ch: Channel, value: u32) {
        self.bus.write_register(Reg::mr(ch), value);
        self.live[ch.index()].store(value, Ordering::Relaxed);
    }

    /// Get the live match value.
    #[inline]
    pub fn match_value(&self, ch: Channel) -> u32 {
        self.bus.read_register(Reg::mr(ch))
    }

    /// Value the counter matched on the latest match event of a channel.
    ///
    /// A channel that resets the counter with [`MatchActions::RELOAD`]
    /// enabled has its match register replaced in the same cycle it
    /// matches, so the value made live before that reset is reported.
    pub(crate) fn matched_value(&self, ch: Channel) -> u32 {
        let actions: MatchActions = self.match_actions(ch);
        if actions.contains(MatchActions::RESET.union(MatchActions::RELOAD)) {
            self.live[ch.index()].load(Ordering::Relaxed)
        } else {
            self.match_value(ch)
        }
    }

    /// Record the match registers as currently live.
    pub(crate) fn sync_live(&self) {
        for ch in Channel::ALL {
            self.live[ch.index()].store(self.match_value(ch), Ordering::Relaxed);
        }
    }

    /// Enabled match actions of a channel.
    pub fn match_actions(&self, ch: Channel) -> MatchActions {
        let mcr: u32 = self.bus.read_register(Reg::MCR);
        MatchActions::from_fields(
            fields::mcr_actions(ch).extract(mcr),
            fields::mcr_reload(ch).extract(mcr),
        )
    }

    /// Enable actions, leaving the other actions of the channel as they are.
    pub fn enable_match_actions(&self, ch: Channel, actions: MatchActions) {
        self.modify_register(Reg::MCR, |mcr| {
            let cur: MatchActions = MatchActions::from_fields(
                fields::mcr_actions(ch).extract(mcr),
                fields::mcr_reload(ch).extract(mcr),
            );
            let new: MatchActions = cur.union(actions);
            let mcr: u32 = fields::mcr_actions(ch).insert(mcr, new.irs());
            fields::mcr_reload(ch).insert(mcr, new.reload())
        })
    }

    /// Disable actions, leaving the other actions of the channel as they are.
    pub fn disable_match_actions(&self, ch: Channel, actions: MatchActions) {
        self.modify_register(Reg::MCR, |mcr| {
            let cur: MatchActions = MatchActions::from_fields(
                fields::mcr_actions(ch).extract(mcr),
                fields::mcr_reload(ch).extract(mcr),
            );
            let new: MatchActions = cur.difference(actions);
            let mcr: u32 = fields::mcr_actions(ch).insert(mcr, new.irs());
            fields::mcr_reload(ch).insert(mcr, new.reload())
        })
    }

    /// Enable or disable the match interrupt of a channel.
    pub fn set_match_interrupt(&self, ch: Channel, en: bool) {
        self.modify(fields::mcr_interrupt(ch), en.into())
    }

    /// Set the external match output action.
    pub fn set_external_match(&self, ch: Channel, action: ExtMatch) {
        self.modify(fields::emr_control(ch), action as u32)
    }

    /// External match output action.
    pub fn external_match(&self, ch: Channel) -> ExtMatch {
        ExtMatch::from_bits(self.field(fields::emr_control(ch)))
    }

    /// Level of the external match output.
    pub fn external_match_level(&self, ch: Channel) -> bool {
        self.flag(fields::emr_level(ch))
    }

    /// Force the level of the external match output.
    pub fn set_external_match_level(&self, ch: Channel, high: bool) {
        self.modify(fields::emr_level(ch), high.into())
    }

    /// Stage a match value.
    ///
    /// The live match value is replaced when the counter is next reset, if
    /// [`MatchActions::RELOAD`] is enabled for the channel.
    #[inline]
    pub fn write_shadow_register(&self, ch: Channel, value: u32) {
        self.bus.write_register(Reg::msr(ch), value)
    }

    /// Get the staged match value.
    #[inline]
    pub fn read_shadow_register(&self, ch: Channel) -> u32 {
        self.bus.read_register(Reg::msr(ch))
    }

    /// Configure a capture channel.
    ///
    /// With [`CaptureEdges::Both`] a capture happens on either edge.
    pub fn config_capture(&self, ch: Channel, edges: CaptureEdges, interrupt: bool) {
        self.modify_register(Reg::CCR, |ccr| {
            let ccr: u32 = fields::ccr_edges(ch).insert(ccr, edges as u32);
            fields::ccr_interrupt(ch).insert(ccr, interrupt.into())
        })
    }

    /// Enable or disable capture on one edge.
    pub fn set_capture_edge(&self, ch: Channel, edge: Edge, en: bool) {
        let field: Field = match edge {
            Edge::Rising => fields::ccr_rising(ch),
            Edge::Falling => fields::ccr_falling(ch),
        };
        self.modify(field, en.into())
    }

    /// Capture edge sensitivity of a channel.
    pub fn capture_edges(&self, ch: Channel) -> CaptureEdges {
        CaptureEdges::from_bits(self.field(fields::ccr_edges(ch)))
    }

    /// Enable or disable the capture interrupt of a channel.
    pub fn set_capture_interrupt(&self, ch: Channel, en: bool) {
        self.modify(fields::ccr_interrupt(ch), en.into())
    }

    /// Counter value at the most recent capture edge.
    ///
    /// There is no buffering, a newer edge overwrites the value.
    #[inline]
    pub fn read_capture_value(&self, ch: Channel) -> u32 {
        self.bus.read_register(Reg::cr(ch))
    }

    /// Pending interrupt flags, see [`irq`].
    #[inline]
    pub fn pending(&self) -> u32 {
        self.bus.read_register(Reg::IR)
    }

    /// Clear interrupt flags, see [`irq`].
    #[inline]
    pub fn clear_irq_flags(&self, mask: u32) {
        self.bus.write_register(Reg::IR, mask & irq::ALL)
    }

    /// Clear the match flag of a channel.
    #[inline]
    pub fn clear_match_irq_flag(&self, ch: Channel) {
        self.clear_irq_flags(irq::mr(ch))
    }

    /// Clear the capture flag of a channel.
    #[inline]
    pub fn clear_capture_irq_flag(&self, ch: Channel) {
        self.clear_irq_flags(irq::cr(ch))
    }
}

impl<B: Bus> embedded_hal::timer::CountDown for Ctimer<B> {
    type Time = u32;

    /// One-shot count on match channel 0.
    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        self.disable_counter();
        self.assert_counter_reset();
        self.config_match(
            Channel::Ch0,
            count.into(),
            MatchActions::INTERRUPT
                .union(MatchActions::RESET)
                .union(MatchActions::STOP),
        );
        self.clear_match_irq_flag(Channel::Ch0);
        self.clear_counter_reset();
        self.enable_counter();
    }

    fn wait(&mut self) -> nb::Result<(), Void> {
        if self.pending() & irq::MR0INT == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            self.clear_match_irq_flag(Channel::Ch0);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        sim::SimCtimer, Bus, CaptureClear, CaptureEdges, Channel, CountEdge, Ctimer, Edge,
        ExtMatch, Interrupt, MatchActions, Mode, Reg,
    };
    use embedded_hal::timer::CountDown;

    fn ctimer() -> Ctimer<SimCtimer> {
        Ctimer::new(SimCtimer::new(), Interrupt::CTIMER0)
    }

    #[test]
    fn config_match_preserves_other_channels() {
        const ACTIONS: [MatchActions; 4] = [
            MatchActions::INTERRUPT,
            MatchActions::RESET,
            MatchActions::STOP,
            MatchActions::RELOAD,
        ];

        for ch in Channel::ALL {
            for action in ACTIONS {
                let tim = ctimer();
                for other in Channel::ALL {
                    tim.config_match(other, 0xA5A5_0000 | other as u32, MatchActions::ALL);
                }
                let before: u32 = tim.bus().read_register(Reg::MCR);

                tim.config_match(ch, 1234, action);

                assert_eq!(tim.match_value(ch), 1234);
                assert_eq!(tim.match_actions(ch), action);
                for other in Channel::ALL.into_iter().filter(|&o| o != ch) {
                    assert_eq!(tim.match_value(other), 0xA5A5_0000 | other as u32);
                    assert_eq!(tim.match_actions(other), MatchActions::ALL);
                }
                let mask: u32 = super::fields::mcr_actions(ch).mask()
                    | super::fields::mcr_reload(ch).mask();
                assert_eq!(tim.bus().read_register(Reg::MCR) & !mask, before & !mask);
            }
        }
    }

    #[test]
    fn match_actions_are_idempotent() {
        let tim = ctimer();
        tim.enable_match_actions(Channel::Ch2, MatchActions::RESET);
        let once: u32 = tim.bus().read_register(Reg::MCR);
        tim.enable_match_actions(Channel::Ch2, MatchActions::RESET);
        assert_eq!(tim.bus().read_register(Reg::MCR), once);

        tim.enable_match_actions(Channel::Ch2, MatchActions::STOP);
        assert_eq!(
            tim.match_actions(Channel::Ch2),
            MatchActions::RESET | MatchActions::STOP
        );
        tim.disable_match_actions(Channel::Ch2, MatchActions::RESET);
        tim.disable_match_actions(Channel::Ch2, MatchActions::RESET);
        assert_eq!(tim.match_actions(Channel::Ch2), MatchActions::STOP);

        tim.set_match_interrupt(Channel::Ch2, true);
        assert_eq!(
            tim.match_actions(Channel::Ch2),
            MatchActions::INTERRUPT | MatchActions::STOP
        );
    }

    #[test]
    fn start_stop_keeps_configuration() {
        let tim = ctimer();
        tim.write_prescaler(47);
        tim.config_match(Channel::Ch1, 500, MatchActions::RESET);
        tim.enable_counter();
        tim.bus().ticks(48 * 10);
        assert_eq!(tim.read_counter(), 10);

        tim.disable_counter();
        tim.bus().ticks(48 * 10);
        assert_eq!(tim.read_counter(), 10);
        tim.enable_counter();

        assert_eq!(tim.read_prescaler(), 47);
        assert_eq!(tim.match_value(Channel::Ch1), 500);
        assert_eq!(tim.match_actions(Channel::Ch1), MatchActions::RESET);
        tim.bus().ticks(48);
        assert_eq!(tim.read_counter(), 11);
    }

    #[test]
    fn prescaler_divides() {
        let tim = ctimer();
        tim.write_prescaler(3);
        tim.enable_counter();
        tim.bus().ticks(3);
        assert_eq!(tim.read_counter(), 0);
        assert_eq!(tim.read_prescale_counter(), 3);
        tim.bus().tick();
        assert_eq!(tim.read_counter(), 1);
        assert_eq!(tim.read_prescale_counter(), 0);
    }

    #[test]
    fn counter_reset_holds_zero() {
        let tim = ctimer();
        tim.enable_counter();
        tim.bus().ticks(7);
        tim.assert_counter_reset();
        tim.bus().ticks(7);
        assert_eq!(tim.read_counter(), 0);
        tim.clear_counter_reset();
        tim.bus().ticks(2);
        assert_eq!(tim.read_counter(), 2);
        assert!(tim.is_enabled());
    }

    #[test]
    fn shadow_commits_on_reset() {
        let tim = ctimer();
        tim.config_match(Channel::Ch3, 100, MatchActions::RELOAD);
        tim.write_shadow_register(Channel::Ch3, 250);
        assert_eq!(tim.match_value(Channel::Ch3), 100);
        assert_eq!(tim.read_shadow_register(Channel::Ch3), 250);

        tim.reset_counter();
        assert_eq!(tim.match_value(Channel::Ch3), 250);
    }

    #[test]
    fn shadow_commits_on_match_reset() {
        let tim = ctimer();
        tim.config_match(Channel::Ch0, 10, MatchActions::RESET | MatchActions::RELOAD);
        tim.write_shadow_register(Channel::Ch0, 20);
        tim.enable_counter();
        tim.bus().ticks(9);
        assert_eq!(tim.match_value(Channel::Ch0), 10);
        tim.bus().tick();
        assert_eq!(tim.read_counter(), 0);
        assert_eq!(tim.match_value(Channel::Ch0), 20);
    }

    #[test]
    fn stop_on_match() {
        let tim = ctimer();
        tim.config_match(Channel::Ch1, 5, MatchActions::STOP);
        tim.enable_counter();
        tim.bus().ticks(20);
        assert_eq!(tim.read_counter(), 5);
        assert!(!tim.is_enabled());
    }

    #[test]
    fn capture_edges() {
        let tim = ctimer();
        tim.config_capture(Channel::Ch1, CaptureEdges::Rising, false);
        tim.set_capture_edge(Channel::Ch1, Edge::Falling, true);
        assert_eq!(tim.capture_edges(Channel::Ch1), CaptureEdges::Both);
        tim.set_capture_edge(Channel::Ch1, Edge::Rising, false);
        assert_eq!(tim.capture_edges(Channel::Ch1), CaptureEdges::Falling);
        assert_eq!(tim.capture_edges(Channel::Ch0), CaptureEdges::None);

        tim.enable_counter();
        tim.bus().ticks(3);
        tim.bus().edge(Channel::Ch1, Edge::Rising);
        assert_eq!(tim.read_capture_value(Channel::Ch1), 0);
        tim.bus().edge(Channel::Ch1, Edge::Falling);
        assert_eq!(tim.read_capture_value(Channel::Ch1), 3);
        assert_eq!(tim.pending(), 0);
    }

    #[test]
    fn capture_isolated_to_channel() {
        let tim = ctimer();
        for ch in Channel::ALL {
            tim.config_capture(ch, CaptureEdges::Rising, true);
        }
        tim.enable_counter();
        tim.bus().ticks(42);

        tim.bus().edge(Channel::Ch2, Edge::Rising);
        assert_eq!(tim.pending(), super::irq::CR2INT);
        for ch in Channel::ALL {
            let expected: u32 = if ch == Channel::Ch2 { 42 } else { 0 };
            assert_eq!(tim.read_capture_value(ch), expected);
        }
    }

    #[test]
    fn second_capture_overwrites_first() {
        let tim = ctimer();
        tim.config_capture(Channel::Ch0, CaptureEdges::Rising, true);
        tim.enable_counter();
        tim.bus().ticks(10);
        tim.bus().edge(Channel::Ch0, Edge::Rising);
        tim.bus().ticks(15);
        tim.bus().edge(Channel::Ch0, Edge::Rising);
        assert_eq!(tim.read_capture_value(Channel::Ch0), 25);
    }

    #[test]
    fn counter_mode() {
        let tim = ctimer();
        let mode = Mode::Counter {
            input: Channel::Ch1,
            edge: CountEdge::Both,
        };
        tim.set_mode(mode);
        assert_eq!(tim.mode(), mode);
        tim.enable_counter();

        tim.bus().ticks(100);
        assert_eq!(tim.read_counter(), 0);
        tim.bus().edge(Channel::Ch1, Edge::Rising);
        tim.bus().edge(Channel::Ch1, Edge::Falling);
        tim.bus().edge(Channel::Ch0, Edge::Rising);
        assert_eq!(tim.read_counter(), 2);

        tim.set_mode(Mode::Timer);
        tim.bus().ticks(3);
        assert_eq!(tim.read_counter(), 5);
    }

    #[test]
    fn mode_keeps_prescaler_and_match() {
        let tim = ctimer();
        tim.write_prescaler(9);
        tim.config_match(Channel::Ch0, 77, MatchActions::INTERRUPT);
        tim.set_capture_clear(Some(CaptureClear {
            input: Channel::Ch2,
            edge: Edge::Rising,
        }));
        tim.set_mode(Mode::Counter {
            input: Channel::Ch0,
            edge: CountEdge::Rising,
        });
        assert_eq!(tim.read_prescaler(), 9);
        assert_eq!(tim.match_value(Channel::Ch0), 77);
        assert_eq!(tim.match_actions(Channel::Ch0), MatchActions::INTERRUPT);
        assert_eq!(
            tim.capture_clear(),
            Some(CaptureClear {
                input: Channel::Ch2,
                edge: Edge::Rising,
            })
        );
    }

    #[test]
    fn capture_clear() {
        let tim = ctimer();
        tim.set_capture_clear(Some(CaptureClear {
            input: Channel::Ch0,
            edge: Edge::Falling,
        }));
        tim.enable_counter();
        tim.bus().ticks(30);
        tim.bus().edge(Channel::Ch0, Edge::Rising);
        assert_eq!(tim.read_counter(), 30);
        tim.bus().edge(Channel::Ch0, Edge::Falling);
        assert_eq!(tim.read_counter(), 0);

        tim.set_capture_clear(None);
        assert_eq!(tim.capture_clear(), None);
    }

    #[test]
    fn external_match_toggle() {
        let tim = ctimer();
        tim.config_match(Channel::Ch2, 4, MatchActions::RESET);
        tim.set_external_match(Channel::Ch2, ExtMatch::Toggle);
        assert_eq!(tim.external_match(Channel::Ch2), ExtMatch::Toggle);
        tim.enable_counter();

        assert!(!tim.external_match_level(Channel::Ch2));
        tim.bus().ticks(4);
        assert!(tim.external_match_level(Channel::Ch2));
        tim.bus().ticks(4);
        assert!(!tim.external_match_level(Channel::Ch2));

        tim.set_external_match(Channel::Ch2, ExtMatch::Set);
        tim.bus().ticks(4);
        assert!(tim.external_match_level(Channel::Ch2));
        tim.set_external_match_level(Channel::Ch2, false);
        assert!(!tim.bus().ext_output(Channel::Ch2));
    }

    #[test]
    fn count_down() {
        let mut tim = ctimer();
        tim.start(50_u32);
        assert!(tim.wait().is_err());
        tim.bus().ticks(49);
        assert!(tim.wait().is_err());
        tim.bus().tick();
        assert!(tim.wait().is_ok());
        assert!(!tim.is_enabled());
        assert_eq!(tim.read_counter(), 0);
        assert!(tim.wait().is_err());
    }

    #[test]
    fn write_counter_round_trip() {
        let tim = ctimer();
        tim.write_counter(0x1234_5678);
        assert_eq!(tim.read_counter(), 0x1234_5678);
        assert_eq!(tim.bus().read_register(Reg::TC), 0x1234_5678);

        tim.write_counter(u32::MAX - 1);
        tim.enable_counter();
        tim.bus().ticks(2);
        assert_eq!(tim.read_counter(), 0);
    }

    #[test]
    fn counter_hz() {
        let tim = ctimer();
        tim.write_prescaler(u32::MAX);
        assert_eq!(*tim.counter_hz(1).denom(), 1 << 32);
        tim.write_prescaler(0);
        assert_eq!(tim.counter_hz(30_000_000).to_integer(), 30_000_000);
    }
}
