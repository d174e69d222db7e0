//! Domain models for the intake system.

mod address;
mod appointment;
mod page;
mod pet;
mod provider;
mod session;
mod slot;

pub use address::*;
pub use appointment::*;
pub use page::*;
pub use pet::*;
pub use provider::*;
pub use session::*;
pub use slot::*;
