// Tx module - THE SIGNED CALL
// Write operations travel as signed transactions

mod builder;
mod codec;
mod model;
mod validator;

pub use builder::*;
pub use codec::*;
pub use model::*;
pub use validator::*;
