//! Behavioural model of the CTIMER register block.
//!
//! [`SimCtimer`] implements [`Bus`] with the hardware side effects the
//! driver relies upon, so the driver can be exercised without a target:
//!
//! * interrupt flags are cleared by writing `1`
//! * capture registers are read-only
//! * counter reset holds the counter at zero and reloads match registers
//!   from their shadows
//!
//! Time only advances through [`tick`](SimCtimer::tick) and
//! [`edge`](SimCtimer::edge).

use super::{
    fields, irq, Bus, CaptureClear, CaptureEdges, Channel, Edge, ExtMatch, Mode, Reg,
};
use core::sync::atomic::{AtomicU32, Ordering::SeqCst};

/// Simulated CTIMER register block.
#[derive(Debug)]
pub struct SimCtimer {
    regs: [AtomicU32; Reg::BLOCK_SIZE / 4],
}

impl SimCtimer {
    /// Create a register block at its reset value.
    pub const fn new() -> Self {
        SimCtimer {
            regs: [const { AtomicU32::new(0) }; Reg::BLOCK_SIZE / 4],
        }
    }

    fn get(&self, reg: Reg) -> u32 {
        self.regs[reg.offset() / 4].load(SeqCst)
    }

    fn set(&self, reg: Reg, val: u32) {
        self.regs[reg.offset() / 4].store(val, SeqCst)
    }

    fn get_field(&self, field: super::Field) -> u32 {
        field.extract(self.get(field.reg()))
    }

    fn set_field(&self, field: super::Field, val: u32) {
        self.set(field.reg(), field.insert(self.get(field.reg()), val))
    }

    fn raise(&self, flags: u32) {
        self.set(Reg::IR, self.get(Reg::IR) | flags)
    }

    fn counting(&self) -> bool {
        self.get_field(fields::TCR_CEN) != 0 && self.get_field(fields::TCR_CRST) == 0
    }

    fn mode(&self) -> Mode {
        Mode::from_fields(
            self.get_field(fields::CTCR_CTMODE),
            self.get_field(fields::CTCR_CINSEL),
        )
    }

    /// Advance one cycle of the input clock.
    pub fn tick(&self) {
        if self.counting() && self.mode() == Mode::Timer {
            self.count();
        }
    }

    /// Advance `n` cycles of the input clock.
    pub fn ticks(&self, n: u32) {
        (0..n).for_each(|_| self.tick())
    }

    /// Apply an edge on a capture input.
    pub fn edge(&self, ch: Channel, edge: Edge) {
        let edges: CaptureEdges = CaptureEdges::from_bits(self.get_field(fields::ccr_edges(ch)));
        if edges.captures(edge) {
            self.set(Reg::cr(ch), self.get(Reg::TC));
            if self.get_field(fields::ccr_interrupt(ch)) != 0 {
                self.raise(irq::cr(ch));
            }
        }

        if let Mode::Counter { input, edge: counted } = self.mode() {
            if input == ch && counted.counts(edge) && self.counting() {
                self.count();
            }
        }

        if self.get_field(fields::CTCR_ENCC) != 0 {
            let clear: CaptureClear = CaptureClear::from_selcc(self.get_field(fields::CTCR_SELCC));
            if clear.input == ch && clear.edge == edge {
                self.reset_counter();
            }
        }
    }

    /// Level of a PWM output.
    ///
    /// Always low when PWM is disabled for the channel.
    pub fn pwm_output(&self, ch: Channel) -> bool {
        self.get_field(fields::pwmc_enable(ch)) != 0 && self.get(Reg::TC) >= self.get(Reg::mr(ch))
    }

    /// Level of an external match output.
    pub fn ext_output(&self, ch: Channel) -> bool {
        self.get_field(fields::emr_level(ch)) != 0
    }

    /// Returns `true` if the interrupt request line is asserted.
    pub fn irq_line(&self) -> bool {
        self.get(Reg::IR) & irq::ALL != 0
    }

    /// One prescaled counting event.
    fn count(&self) {
        let pc: u32 = self.get(Reg::PC);
        if pc < self.get(Reg::PR) {
            self.set(Reg::PC, pc + 1);
            return;
        }
        self.set(Reg::PC, 0);
        let tc: u32 = self.get(Reg::TC).wrapping_add(1);
        self.set(Reg::TC, tc);
        self.compare(tc);
    }

    fn compare(&self, tc: u32) {
        let mut reset: bool = false;
        let mut stop: bool = false;

        for ch in Channel::ALL {
            if self.get(Reg::mr(ch)) != tc {
                continue;
            }
            if self.get_field(fields::mcr_interrupt(ch)) != 0 {
                self.raise(irq::mr(ch));
            }
            reset |= self.get_field(fields::mcr_reset(ch)) != 0;
            stop |= self.get_field(fields::mcr_stop(ch)) != 0;

            let level: bool = self.ext_output(ch);
            let level: bool = match ExtMatch::from_bits(self.get_field(fields::emr_control(ch))) {
                ExtMatch::Nothing => level,
                ExtMatch::Clear => false,
                ExtMatch::Set => true,
                ExtMatch::Toggle => !level,
            };
            self.set_field(fields::emr_level(ch), level.into());
        }

        if reset {
            self.reset_counter();
        }
        if stop {
            self.set_field(fields::TCR_CEN, 0);
        }
    }

    fn reset_counter(&self) {
        self.set(Reg::TC, 0);
        self.set(Reg::PC, 0);
        for ch in Channel::ALL {
            if self.get_field(fields::mcr_reload(ch)) != 0 {
                self.set(Reg::mr(ch), self.get(Reg::msr(ch)));
            }
        }
    }
}

impl Default for SimCtimer {
    fn default() -> Self {
        SimCtimer::new()
    }
}

impl Bus for SimCtimer {
    fn read(&self, offset: usize) -> u32 {
        self.regs[offset / 4].load(SeqCst)
    }

    fn write(&self, offset: usize, val: u32) {
        match offset {
            o if o == Reg::IR.offset() => self.set(Reg::IR, self.get(Reg::IR) & !val),
            o if o == Reg::TCR.offset() => {
                self.set(Reg::TCR, val & 0b11);
                if fields::TCR_CRST.extract(val) != 0 {
                    self.reset_counter();
                }
            }
            o if (Reg::cr(Channel::Ch0).offset()..=Reg::cr(Channel::Ch3).offset())
                .contains(&o) => {}
            _ => self.regs[offset / 4].store(val, SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimCtimer;
    use crate::ctimer::{fields, irq, Bus, Channel, Reg};

    #[test]
    fn ir_is_write_one_to_clear() {
        let sim = SimCtimer::new();
        sim.raise(irq::MR1INT | irq::CR3INT);
        sim.write_register(Reg::IR, irq::MR1INT);
        assert_eq!(sim.read_register(Reg::IR), irq::CR3INT);
        sim.write_register(Reg::IR, 0);
        assert_eq!(sim.read_register(Reg::IR), irq::CR3INT);
    }

    #[test]
    fn capture_registers_are_read_only() {
        let sim = SimCtimer::new();
        sim.write_register(Reg::cr(Channel::Ch2), 99);
        assert_eq!(sim.read_register(Reg::cr(Channel::Ch2)), 0);
        sim.write_register(Reg::msr(Channel::Ch0), 99);
        assert_eq!(sim.read_register(Reg::msr(Channel::Ch0)), 99);
    }

    #[test]
    fn no_count_while_disabled() {
        let sim = SimCtimer::new();
        sim.ticks(10);
        assert_eq!(sim.read_register(Reg::TC), 0);
        sim.write_field(fields::TCR_CEN, 1);
        sim.ticks(10);
        assert_eq!(sim.read_register(Reg::TC), 10);
    }

    #[test]
    fn counter_wraps() {
        let sim = SimCtimer::new();
        sim.write_register(Reg::TC, u32::MAX);
        sim.write_field(fields::TCR_CEN, 1);
        sim.tick();
        assert_eq!(sim.read_register(Reg::TC), 0);
    }
}
