//! hx-core: shared foundation for the heat-exchanger report pipeline.
//!
//! Contains:
//! - numeric (Real + tolerances + float ordering helpers)
//! - units (variable units + uom temperature helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{HxError, HxResult};
pub use numeric::*;
pub use units::*;
