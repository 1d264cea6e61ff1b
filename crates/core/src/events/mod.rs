//! Domain events module.
//!
//! Services emit these after a mutation has been committed. The server
//! adapter decides what to do with them (log, push to clients).

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
