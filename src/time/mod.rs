//! Time handling: clocks, timezone lookup and conversion.

pub mod convert;
pub mod source;
pub mod zones;
