#![macro_use]

// Logging forwards to defmt when the `defmt` feature is enabled and
// compiles to nothing otherwise.

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)+);
    };
}

macro_rules! warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)+);
    };
}
