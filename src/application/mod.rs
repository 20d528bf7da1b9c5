// Application layer - use cases and orchestration.
// The service applies commands to the store; the dispatcher serializes
// commands from any number of clients onto one ledger.

mod command;
mod dispatcher;
pub mod error;
mod service;

pub use command::*;
pub use dispatcher::*;
pub use error::*;
pub use service::*;
