//! Process lifecycle helpers for daemon-style consumers

mod shutdown;

pub use shutdown::ShutdownSignal;
