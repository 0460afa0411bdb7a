pub mod events;
pub mod peak;
pub mod tracking;

pub use events::{value_as_u64, value_label, EventRecord, EventTable};
pub use peak::{columns, PeakIntensityRow, PeakTable, WindowPeak};
pub use tracking::{GroupKey, PhaseInterval, Possession, TrackingSample};
