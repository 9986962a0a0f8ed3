pub mod donut;
pub mod gauge;
pub mod recorder;

pub use donut::{DonutChart, DonutOutcome, LegendEntry};
pub use gauge::{FrameRequest, GaugeAnimation, GaugeSize, RadialGauge};
pub use recorder::{DrawCommand, RecordingSurface};
