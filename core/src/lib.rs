//! Rendering core for the CodeIQ security scanner front-end.
//!
//! Charts and the score gauge draw through the [`prelude::DrawingSurface`]
//! capability so any backend can host them; the report engine lays a
//! [`model::ScanReport`] out onto fixed-size pages and encodes the result as a
//! PDF or a JSON layout dump. Data arrives through [`source::ScanDataSource`].

pub mod math;
pub mod model;
pub mod palette;
pub mod prelude;
pub mod render;
pub mod report;
pub mod source;
pub mod telemetry;

pub use prelude::{DrawingSurface, Point, RenderError, RenderResult, Rgb};
