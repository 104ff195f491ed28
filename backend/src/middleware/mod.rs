//! Request middleware: trace identifier propagation and the processing
//! time limit.

pub mod timeout;
pub mod trace;

pub use timeout::RequestTimeout;
pub use trace::Trace;
