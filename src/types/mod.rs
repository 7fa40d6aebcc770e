//! Type definitions for ripcity

mod deal;
mod error;
mod event;

pub use deal::*;
pub use error::*;
pub use event::*;
