pub mod channel;
pub mod metric;
pub mod sample;
pub mod unit;

pub use channel::{Channel, NetworkChannel, StorageChannel};
pub use metric::{CounterKind, MetricMap, NamedMetric};
pub use sample::Sample;
pub use unit::UnitSpec;
