//! PWM mode.
//!
//! Match channel 3 sets the period (reset on match), channels 0 to 2 drive
//! the duty outputs. An output is low from the start of a cycle until the
//! counter reaches its match value and high for the rest of the cycle, so
//! the match value of a duty channel is `period - duty`.
//!
//! Period and duty updates are staged in the shadow registers and committed
//! by hardware at the end of the running cycle.

use super::{fields, Bus, Callback, Channel, Ctimer, MatchActions, Mode, Reg};

/// Match channel that defines the PWM period.
pub const PERIOD_CHANNEL: Channel = Channel::Ch3;

/// PWM output channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PwmChannel {
    /// Output on match channel 0.
    Ch0 = 0,
    /// Output on match channel 1.
    Ch1 = 1,
    /// Output on match channel 2.
    Ch2 = 2,
}

impl PwmChannel {
    /// All PWM channels.
    pub const ALL: [PwmChannel; 3] = [PwmChannel::Ch0, PwmChannel::Ch1, PwmChannel::Ch2];
}

impl From<PwmChannel> for Channel {
    fn from(ch: PwmChannel) -> Self {
        Channel::from_bits(ch as u32)
    }
}

/// PWM channel configuration.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::PwmChannelConfig;
///
/// const QUARTER: PwmChannelConfig = PwmChannelConfig::DEFAULT.set_duty(250);
/// assert_eq!(QUARTER.duty(), 250);
/// assert!(!QUARTER.interrupt());
/// ```
#[derive(Debug, Copy, Clone)]
pub struct PwmChannelConfig {
    duty: u32,
    interrupt: bool,
    callback: Option<Callback>,
}

impl PwmChannelConfig {
    /// Zero duty, no interrupt, no callback.
    pub const DEFAULT: PwmChannelConfig = PwmChannelConfig {
        duty: 0,
        interrupt: false,
        callback: None,
    };

    /// Set the high time in counter ticks.
    #[must_use = "set_duty returns a modified PwmChannelConfig"]
    pub const fn set_duty(mut self, duty: u32) -> PwmChannelConfig {
        self.duty = duty;
        self
    }

    /// Raise the match interrupt when the output goes high.
    #[must_use = "set_interrupt returns a modified PwmChannelConfig"]
    pub const fn set_interrupt(mut self, interrupt: bool) -> PwmChannelConfig {
        self.interrupt = interrupt;
        self
    }

    /// Set the match callback.
    #[must_use = "set_callback returns a modified PwmChannelConfig"]
    pub const fn set_callback(mut self, callback: Option<Callback>) -> PwmChannelConfig {
        self.callback = callback;
        self
    }

    /// High time in counter ticks.
    pub const fn duty(&self) -> u32 {
        self.duty
    }

    /// Returns `true` if the match interrupt is raised.
    pub const fn interrupt(&self) -> bool {
        self.interrupt
    }

    /// Match callback.
    pub const fn callback(&self) -> Option<Callback> {
        self.callback
    }
}

impl Default for PwmChannelConfig {
    fn default() -> Self {
        PwmChannelConfig::DEFAULT
    }
}

impl<B: Bus> Ctimer<B> {
    /// Drive the match output of a channel from the PWM logic.
    ///
    /// A period must already be configured on [`PERIOD_CHANNEL`] (see
    /// [`pwm_mode_init`](Self::pwm_mode_init)); otherwise the output is
    /// undefined.
    pub fn enable_pwm(&self, ch: Channel) {
        self.modify(fields::pwmc_enable(ch), 1)
    }

    /// Return the match output of a channel to external match control.
    pub fn disable_pwm(&self, ch: Channel) {
        self.modify(fields::pwmc_enable(ch), 0)
    }

    /// Returns `true` if PWM is enabled for a channel.
    pub fn is_pwm_enabled(&self, ch: Channel) -> bool {
        self.flag(fields::pwmc_enable(ch))
    }

    /// Initialize the timer in PWM mode.
    ///
    /// The counter is stopped and reset, `prescaler` is the desired division
    /// minus one and `period` is in counter ticks. With a callback the period
    /// match also raises an interrupt.
    ///
    /// Duty channels are configured with
    /// [`config_pwm_channel`](Self::config_pwm_channel).
    pub fn pwm_mode_init(&self, prescaler: u32, period: u32, callback: Option<Callback>) {
        self.disable_counter();
        self.assert_counter_reset();
        self.set_mode(Mode::Timer);
        self.write_prescaler(prescaler);

        let actions: MatchActions = match callback {
            Some(_) => MatchActions::INTERRUPT
                .union(MatchActions::RESET)
                .union(MatchActions::RELOAD),
            None => MatchActions::RESET.union(MatchActions::RELOAD),
        };
        self.set_match_callback(PERIOD_CHANNEL, callback);
        self.write_shadow_register(PERIOD_CHANNEL, period);
        self.config_match(PERIOD_CHANNEL, period, actions);

        self.clear_counter_reset();
    }

    /// Period in counter ticks.
    ///
    /// This is the most recently requested period, it may not be committed
    /// until the end of the running cycle.
    pub fn pwm_period(&self) -> u32 {
        self.read_shadow_register(PERIOD_CHANNEL)
    }

    /// Change the period, keeping the high time of every enabled channel.
    ///
    /// Reload is held off while the shadows are written so a counter reset
    /// in between commits either all old or all new values.
    pub fn set_pwm_period(&self, period: u32) {
        let old: u32 = self.pwm_period();
        let mut reload: u32 = fields::mcr_reload(PERIOD_CHANNEL).mask();
        for ch in PwmChannel::ALL {
            if self.is_pwm_enabled(ch.into()) {
                reload |= fields::mcr_reload(ch.into()).mask();
            }
        }

        let armed: u32 = critical_section::with(|_| {
            let mcr: u32 = self.bus.read_register(Reg::MCR);
            self.bus.write_register(Reg::MCR, mcr & !reload);
            mcr & reload
        });

        for ch in PwmChannel::ALL {
            if reload & fields::mcr_reload(ch.into()).mask() != 0 {
                let duty: u32 = old.saturating_sub(self.read_shadow_register(ch.into()));
                self.stage(ch.into(), period.saturating_sub(duty));
            }
        }
        self.stage(PERIOD_CHANNEL, period);

        self.modify_register(Reg::MCR, |mcr| mcr | armed);
    }

    /// Configure and enable a PWM channel.
    pub fn config_pwm_channel(&self, ch: PwmChannel, config: &PwmChannelConfig) {
        let chan: Channel = ch.into();
        self.set_match_callback(chan, config.callback());
        self.disable_match_actions(chan, MatchActions::ALL);
        self.set_pwm_duty(ch, config.duty());
        let actions: MatchActions = if config.interrupt() {
            MatchActions::INTERRUPT.union(MatchActions::RELOAD)
        } else {
            MatchActions::RELOAD
        };
        self.enable_match_actions(chan, actions);
        self.enable_pwm(chan);
    }

    /// Set the high time of a channel in counter ticks.
    ///
    /// A duty larger than the period saturates to always high.
    pub fn set_pwm_duty(&self, ch: PwmChannel, duty: u32) {
        self.stage(ch.into(), self.pwm_period().saturating_sub(duty))
    }

    /// High time of a channel in counter ticks.
    pub fn pwm_duty(&self, ch: PwmChannel) -> u32 {
        self.pwm_period()
            .saturating_sub(self.read_shadow_register(ch.into()))
    }

    /// Stage a match value, writing it live too while the counter is
    /// stopped since no reset will commit it.
    fn stage(&self, ch: Channel, value: u32) {
        self.write_shadow_register(ch, value);
        if !self.is_enabled() {
            self.set_match_value(ch, value);
        }
    }
}

impl<B: Bus> embedded_hal::Pwm for Ctimer<B> {
    type Channel = PwmChannel;
    type Time = u32;
    type Duty = u32;

    fn disable(&mut self, channel: PwmChannel) {
        self.disable_pwm(channel.into())
    }

    fn enable(&mut self, channel: PwmChannel) {
        self.enable_pwm(channel.into())
    }

    fn get_period(&self) -> u32 {
        self.pwm_period()
    }

    fn get_duty(&self, channel: PwmChannel) -> u32 {
        self.pwm_duty(channel)
    }

    fn get_max_duty(&self) -> u32 {
        self.pwm_period()
    }

    fn set_duty(&mut self, channel: PwmChannel, duty: u32) {
        self.set_pwm_duty(channel, duty)
    }

    fn set_period<P>(&mut self, period: P)
    where
        P: Into<u32>,
    {
        self.set_pwm_period(period.into())
    }
}
