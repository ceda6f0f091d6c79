//! Register interface.
//!
//! Bit-exact access to the CTIMER register block through a [`Bus`].
//! Nothing here validates values; a field value wider than its field is a
//! caller bug and its extra bits are masked off.

use super::Channel;
use core::ptr::{read_volatile, write_volatile};

/// Base address of CTIMER0.
pub const CTIMER0_BASE: usize = 0x4003_8000;

/// Register offset within a CTIMER block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reg {
    offset: usize,
}

impl Reg {
    /// Interrupt register.
    ///
    /// Flags are cleared by writing `1`, never use [`Bus::write_field`] on
    /// this register, it would clear every other pending flag.
    pub const IR: Reg = Reg::new(0x000);
    /// Timer control register.
    pub const TCR: Reg = Reg::new(0x004);
    /// Timer counter.
    pub const TC: Reg = Reg::new(0x008);
    /// Prescale register.
    pub const PR: Reg = Reg::new(0x00C);
    /// Prescale counter.
    pub const PC: Reg = Reg::new(0x010);
    /// Match control register.
    pub const MCR: Reg = Reg::new(0x014);
    /// Capture control register.
    pub const CCR: Reg = Reg::new(0x028);
    /// External match register.
    pub const EMR: Reg = Reg::new(0x03C);
    /// Count control register.
    pub const CTCR: Reg = Reg::new(0x070);
    /// PWM control register.
    pub const PWMC: Reg = Reg::new(0x074);

    /// Size of the register block in bytes.
    pub const BLOCK_SIZE: usize = 0x088;

    const fn new(offset: usize) -> Reg {
        Reg { offset }
    }

    /// Match register for a channel.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{Channel, Reg};
    ///
    /// assert_eq!(Reg::mr(Channel::Ch0).offset(), 0x18);
    /// assert_eq!(Reg::mr(Channel::Ch3).offset(), 0x24);
    /// ```
    pub const fn mr(ch: Channel) -> Reg {
        Reg::new(0x018 + 4 * ch.index())
    }

    /// Capture register for a channel (read-only).
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{Channel, Reg};
    ///
    /// assert_eq!(Reg::cr(Channel::Ch0).offset(), 0x2C);
    /// assert_eq!(Reg::cr(Channel::Ch3).offset(), 0x38);
    /// ```
    pub const fn cr(ch: Channel) -> Reg {
        Reg::new(0x02C + 4 * ch.index())
    }

    /// Match shadow register for a channel.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{Channel, Reg};
    ///
    /// assert_eq!(Reg::msr(Channel::Ch0).offset(), 0x78);
    /// assert_eq!(Reg::msr(Channel::Ch2).offset(), 0x80);
    /// ```
    pub const fn msr(ch: Channel) -> Reg {
        Reg::new(0x078 + 4 * ch.index())
    }

    /// Byte offset from the block base address.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// A named bit range within a register.
///
/// # Example
///
/// ```
/// use lpc84x_hal::ctimer::{Field, Reg};
///
/// const F: Field = Field::new(Reg::CTCR, 2, 2);
/// assert_eq!(F.mask(), 0b1100);
/// assert_eq!(F.insert(0xFFFF_FFFF, 0b01), 0xFFFF_FFF7);
/// assert_eq!(F.extract(0b0100), 0b01);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    reg: Reg,
    offset: u8,
    width: u8,
}

impl Field {
    /// Create a new field descriptor.
    pub const fn new(reg: Reg, offset: u8, width: u8) -> Field {
        Field { reg, offset, width }
    }

    /// Register holding this field.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{fields, Channel, Reg};
    ///
    /// assert_eq!(fields::TCR_CEN.reg(), Reg::TCR);
    /// assert_eq!(fields::mcr_reload(Channel::Ch1).reg(), Reg::MCR);
    /// ```
    pub const fn reg(&self) -> Reg {
        self.reg
    }

    /// Bit offset of the least significant bit.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{fields, Channel};
    ///
    /// assert_eq!(fields::CTCR_SELCC.offset(), 5);
    /// assert_eq!(fields::emr_control(Channel::Ch3).offset(), 10);
    /// ```
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    /// Width in bits.
    ///
    /// # Example
    ///
    /// ```
    /// use lpc84x_hal::ctimer::{fields, Channel, Reg};
    ///
    /// assert_eq!(fields::CTCR_SELCC.width(), 3);
    /// assert_eq!(fields::mcr_actions(Channel::Ch0).width(), 3);
    /// assert_eq!(fields::value(Reg::PR).width(), 32);
    /// ```
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Mask of the field, in register position.
    pub const fn mask(&self) -> u32 {
        let unshifted: u32 = if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        };
        unshifted << self.offset
    }

    /// Get the field value out of a raw register value.
    pub const fn extract(&self, raw: u32) -> u32 {
        (raw & self.mask()) >> self.offset
    }

    /// Substitute the field value into a raw register value.
    #[must_use = "insert returns the modified register value"]
    pub const fn insert(&self, raw: u32, val: u32) -> u32 {
        (raw & !self.mask()) | ((val << self.offset) & self.mask())
    }
}

/// Field descriptors of the CTIMER registers.
pub mod fields {
    use super::{Channel, Field, Reg};

    /// Counter enable.
    pub const TCR_CEN: Field = Field::new(Reg::TCR, 0, 1);
    /// Counter reset, held until cleared by software.
    pub const TCR_CRST: Field = Field::new(Reg::TCR, 1, 1);

    /// Counter/timer mode.
    pub const CTCR_CTMODE: Field = Field::new(Reg::CTCR, 0, 2);
    /// Count input select.
    pub const CTCR_CINSEL: Field = Field::new(Reg::CTCR, 2, 2);
    /// Enable clearing of the counter on a capture edge.
    pub const CTCR_ENCC: Field = Field::new(Reg::CTCR, 4, 1);
    /// Capture edge that clears the counter.
    pub const CTCR_SELCC: Field = Field::new(Reg::CTCR, 5, 3);

    /// Interrupt, reset, and stop on match, as one 3-bit group.
    pub const fn mcr_actions(ch: Channel) -> Field {
        Field::new(Reg::MCR, 3 * ch.index() as u8, 3)
    }

    /// Interrupt on match.
    pub const fn mcr_interrupt(ch: Channel) -> Field {
        Field::new(Reg::MCR, 3 * ch.index() as u8, 1)
    }

    /// Reset on match.
    pub const fn mcr_reset(ch: Channel) -> Field {
        Field::new(Reg::MCR, 3 * ch.index() as u8 + 1, 1)
    }

    /// Stop on match.
    pub const fn mcr_stop(ch: Channel) -> Field {
        Field::new(Reg::MCR, 3 * ch.index() as u8 + 2, 1)
    }

    /// Reload the match register from its shadow when the counter resets.
    pub const fn mcr_reload(ch: Channel) -> Field {
        Field::new(Reg::MCR, 24 + ch.index() as u8, 1)
    }

    /// Rising and falling edge enables, as one 2-bit group.
    pub const fn ccr_edges(ch: Channel) -> Field {
        Field::new(Reg::CCR, 3 * ch.index() as u8, 2)
    }

    /// Capture on rising edge.
    pub const fn ccr_rising(ch: Channel) -> Field {
        Field::new(Reg::CCR, 3 * ch.index() as u8, 1)
    }

    /// Capture on falling edge.
    pub const fn ccr_falling(ch: Channel) -> Field {
        Field::new(Reg::CCR, 3 * ch.index() as u8 + 1, 1)
    }

    /// Interrupt on capture.
    pub const fn ccr_interrupt(ch: Channel) -> Field {
        Field::new(Reg::CCR, 3 * ch.index() as u8 + 2, 1)
    }

    /// External match output level.
    pub const fn emr_level(ch: Channel) -> Field {
        Field::new(Reg::EMR, ch.index() as u8, 1)
    }

    /// External match control.
    pub const fn emr_control(ch: Channel) -> Field {
        Field::new(Reg::EMR, 4 + 2 * ch.index() as u8, 2)
    }

    /// PWM mode enable.
    pub const fn pwmc_enable(ch: Channel) -> Field {
        Field::new(Reg::PWMC, ch.index() as u8, 1)
    }

    /// Whole-register value field.
    pub const fn value(reg: Reg) -> Field {
        Field::new(reg, 0, 32)
    }
}

/// Interrupt register flags.
pub mod irq {
    use super::Channel;

    macro_rules! paste_irq {
        ($n:literal) => {
            paste::paste! {
                #[doc = "Match channel " $n " interrupt flag."]
                pub const [<MR $n INT>]: u32 = 1 << $n;
                #[doc = "Capture channel " $n " interrupt flag."]
                pub const [<CR $n INT>]: u32 = 1 << (4 + $n);
            }
        };
    }

    paste_irq!(0);
    paste_irq!(1);
    paste_irq!(2);
    paste_irq!(3);

    /// Mask of all match flags.
    pub const MR_ALL: u32 = MR0INT | MR1INT | MR2INT | MR3INT;
    /// Mask of all capture flags.
    pub const CR_ALL: u32 = CR0INT | CR1INT | CR2INT | CR3INT;
    /// Mask of all flags.
    pub const ALL: u32 = MR_ALL | CR_ALL;

    /// Match flag of a channel.
    pub const fn mr(ch: Channel) -> u32 {
        1 << ch.index()
    }

    /// Capture flag of a channel.
    pub const fn cr(ch: Channel) -> u32 {
        1 << (4 + ch.index())
    }
}

/// Access to one CTIMER register block.
///
/// The receivers are shared because the same block is touched from thread
/// mode and from the interrupt handler, exactly like memory-mapped IO.
pub trait Bus {
    /// Read a 32-bit register at a byte offset.
    fn read(&self, offset: usize) -> u32;

    /// Write a 32-bit register at a byte offset.
    fn write(&self, offset: usize, val: u32);

    /// Read a whole register.
    #[inline]
    fn read_register(&self, reg: Reg) -> u32 {
        self.read(reg.offset())
    }

    /// Replace a whole register in one write.
    #[inline]
    fn write_register(&self, reg: Reg, val: u32) {
        self.write(reg.offset(), val)
    }

    /// Read one field.
    #[inline]
    fn read_field(&self, field: Field) -> u32 {
        field.extract(self.read_register(field.reg()))
    }

    /// Read-modify-write one field, leaving all other bits as they were.
    ///
    /// This is not atomic with respect to interrupts.
    #[inline]
    fn write_field(&self, field: Field, val: u32) {
        let raw: u32 = self.read_register(field.reg());
        self.write_register(field.reg(), field.insert(raw, val))
    }

    /// Read-modify-write a whole register with a closure.
    #[inline]
    fn modify_register<F: FnOnce(u32) -> u32>(&self, reg: Reg, f: F) {
        self.write_register(reg, f(self.read_register(reg)))
    }
}

/// Memory-mapped register block.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a handle to the register block at `base`.
    ///
    /// # Safety
    ///
    /// 1. `base` must be the address of a CTIMER register block.
    /// 2. Only one handle may exist per register block.
    pub const unsafe fn new(base: usize) -> Mmio {
        Mmio { base }
    }

    /// Base address of the register block.
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl Bus for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // safety: offset is within the block, guaranteed by `new`
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, val: u32) {
        // safety: offset is within the block, guaranteed by `new`
        unsafe { write_volatile((self.base + offset) as *mut u32, val) }
    }
}
