//! Cross-crate Context tests.

pub mod capabilities;
pub mod channels;
pub mod lifecycle;
pub mod startup;
pub mod styles;
