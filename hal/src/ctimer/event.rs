//! Interrupt dispatch and callback tables.

use super::{irq, Bus, Channel, Ctimer};
use core::{
    mem::transmute,
    ptr::null_mut,
    sync::atomic::{AtomicPtr, Ordering},
};

/// Handler for a match or capture event.
///
/// Called from the interrupt handler with the channel and the match value
/// or captured counter value. It must not block.
///
/// For a match the value is the one the counter matched, even when a reload
/// on reset already replaced the match register with its shadow.
pub type Callback = fn(Channel, u32);

/// Event kinds with separate callback tables.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The counter equalled a match value.
    Match,
    /// A capture input edge latched the counter.
    Capture,
}

/// Driver state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Counter stopped.
    Disabled,
    /// Counter enabled.
    Running,
    /// [`Ctimer::on_interrupt`] is servicing events.
    Dispatching,
}

/// One slot per channel and event kind.
///
/// Slots only use atomic loads and stores so they work on cores without
/// compare-and-swap.
#[derive(Debug)]
pub(crate) struct Handlers {
    matches: [AtomicPtr<()>; 4],
    captures: [AtomicPtr<()>; 4],
}

impl Handlers {
    pub(crate) const fn new() -> Self {
        Handlers {
            matches: [const { AtomicPtr::new(null_mut()) }; 4],
            captures: [const { AtomicPtr::new(null_mut()) }; 4],
        }
    }

    fn slot(&self, event: Event, ch: Channel) -> &AtomicPtr<()> {
        match event {
            Event::Match => &self.matches[ch.index()],
            Event::Capture => &self.captures[ch.index()],
        }
    }

    pub(crate) fn set(&self, event: Event, ch: Channel, callback: Option<Callback>) {
        let ptr: *mut () = match callback {
            Some(f) => f as *mut (),
            None => null_mut(),
        };
        self.slot(event, ch).store(ptr, Ordering::Release)
    }

    pub(crate) fn get(&self, event: Event, ch: Channel) -> Option<Callback> {
        let ptr: *mut () = self.slot(event, ch).load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            // safety: non-null slots are only ever written from a `Callback`
            Some(unsafe { transmute::<*mut (), Callback>(ptr) })
        }
    }
}

impl<B: Bus> Ctimer<B> {
    /// Current driver state.
    pub fn state(&self) -> State {
        if self.dispatching.load(Ordering::Acquire) {
            State::Dispatching
        } else if self.is_enabled() {
            State::Running
        } else {
            State::Disabled
        }
    }

    /// Set or clear the callback of a channel.
    ///
    /// Safe to call while the timer runs, the interrupt handler sees either
    /// the old or the new callback.
    pub fn set_callback(&self, event: Event, ch: Channel, callback: Option<Callback>) {
        self.handlers.set(event, ch, callback)
    }

    /// Callback of a channel.
    pub fn callback(&self, event: Event, ch: Channel) -> Option<Callback> {
        self.handlers.get(event, ch)
    }

    /// Set or clear the match callback of a channel.
    #[inline]
    pub fn set_match_callback(&self, ch: Channel, callback: Option<Callback>) {
        self.set_callback(Event::Match, ch, callback)
    }

    /// Register a match callback.
    #[inline]
    pub fn register_match_callback(&self, ch: Channel, callback: Callback) {
        self.set_match_callback(ch, Some(callback))
    }

    /// Remove the match callback.
    #[inline]
    pub fn deregister_match_callback(&self, ch: Channel) {
        self.set_match_callback(ch, None)
    }

    /// Register a capture callback.
    #[inline]
    pub fn register_capture_callback(&self, ch: Channel, callback: Callback) {
        self.set_callback(Event::Capture, ch, Some(callback))
    }

    /// Remove the capture callback.
    #[inline]
    pub fn deregister_capture_callback(&self, ch: Channel) {
        self.set_callback(Event::Capture, ch, None)
    }

    /// Service pending events.
    ///
    /// Call this from the interrupt vector. For each channel, lowest index
    /// first, a pending match is serviced before a pending capture: the flag
    /// is cleared, then the callback (if any) is invoked with the match value
    /// or captured value.
    ///
    /// Every pending flag is cleared, callback or not, so the interrupt does
    /// not fire again on return. Flags raised while dispatching stay pending.
    ///
    /// Returns the serviced flags.
    pub fn on_interrupt(&self) -> u32 {
        self.dispatching.store(true, Ordering::Release);

        let pending: u32 = self.pending() & irq::ALL;
        for ch in Channel::ALL {
            if pending & irq::mr(ch) != 0 {
                self.clear_match_irq_flag(ch);
                let value: u32 = self.matched_value(ch);
                self.live[ch.index()].store(self.match_value(ch), Ordering::Relaxed);
                if let Some(callback) = self.handlers.get(Event::Match, ch) {
                    callback(ch, value)
                }
            }
            if pending & irq::cr(ch) != 0 {
                self.clear_capture_irq_flag(ch);
                let value: u32 = self.read_capture_value(ch);
                if let Some(callback) = self.handlers.get(Event::Capture, ch) {
                    callback(ch, value)
                }
            }
        }
        trace!("ctimer: serviced {=u32:#x}", pending);

        self.dispatching.store(false, Ordering::Release);
        pending
    }
}
