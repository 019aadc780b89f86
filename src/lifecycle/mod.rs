//! Lifecycle coordination.
//!
//! Shutdown is a broadcast: the accept loop stops on it, and every in-flight
//! receive treats it as the external cancellation signal, so a trigger
//! cancels pending reads immediately rather than waiting out their budgets.

pub mod shutdown;

pub use shutdown::Shutdown;
