// ABOUTME: Client monitoring for Client Watch
// ABOUTME: Poll task, ignore list, restart glue and the application context

pub mod context;
pub mod diff;
pub mod error;
pub mod fatal;
pub mod ignore;
pub mod poll;
pub mod restart;

pub use context::{seed_defaults, AppContext, DriverOverrides};
pub use diff::{diff_clients, ClientEvent};
pub use error::{MonitorError, MonitorResult};
pub use fatal::{fatal_channel, FatalReceiver, FatalReporter};
pub use ignore::IgnoreList;
pub use poll::ClientMonitor;
pub use restart::{register_restart_on_change, PollIntervalSource};
