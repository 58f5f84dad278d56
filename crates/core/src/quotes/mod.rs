//! Price data for the engine.
//!
//! - [`model`] - Price bars, resolved prices and split events
//! - [`splits`] - Split schedule derived from bar annotations
//! - [`price_resolver`] - Request-scoped close lookups with staleness tolerance
//! - [`errors`] - Price lookup errors

pub mod errors;
pub mod model;
pub mod price_resolver;
pub mod splits;

pub use errors::PriceError;
pub use model::{PriceBar, ResolvedPrice, SplitEvent};
pub use price_resolver::PriceResolver;
pub use splits::SplitSchedule;
