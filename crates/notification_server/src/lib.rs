//! Lifecycle coordination for a desktop notification server.
//!
//! Requests arrive on any number of concurrent callers through the [`Coordinator`]. Every mutation of
//! the displayed notifications is turned into a [`Task`] and processed, one at a time, by the
//! [`Executor`], which is the only owner of the [`Registry`] and the presentation [`Surface`].
//! Closed notifications and invoked actions leave the executor through a bounded [`SignalQueue`] and
//! are forwarded to the transport by [`run_emitter`].

pub mod dbus;
pub mod proxy;

mod coordinator;
pub use coordinator::*;

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod expiration;
pub use expiration::*;

mod notification;
pub use notification::*;

mod registry;
pub use registry::*;

mod signals;
pub use signals::*;
