// Library surface shared by the CLI and the integration tests.
pub mod app_dirs;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod journal;
pub mod logging;
pub mod profile;
pub mod selection;
pub mod session;
pub mod stats;
pub mod stopwatch;
pub mod store;
pub mod timing;
pub mod util;

pub use classifier::{classify, Category, Classification, Phases};
pub use error::{BreathError, StoreError};
pub use journal::Journal;
pub use timing::{PhaseKind, TimingRecord};
