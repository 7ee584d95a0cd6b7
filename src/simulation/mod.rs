//! Migration simulation.
//!
//! A simulated migration resolves a metric reading (supplied, probed from the host, or
//! synthesized), asks the prediction backend for a downtime estimate, then actually waits for a
//! load-dependent delay and measures it:
//!
//! ```text
//! actual = 100ms + (cpu + mem) / 200 * 300ms + U(0, 100ms)
//! ```
//!
//! The measured time is scored against the prediction with [`accuracy_pct`].

mod accuracy;
mod probe;
mod simulator;

pub use accuracy::{accuracy_pct, simulated_delay};
pub use probe::{SyntheticRanges, SysinfoProbe, SystemProbe};
pub use simulator::MigrationSimulator;
