//! NXP LPC84x HAL.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod macros;

pub mod ctimer;

pub use cortex_m;
pub use embedded_hal;
pub use nb;
pub use num_rational::Ratio;
