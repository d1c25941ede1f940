mod commission;
pub mod money;
mod transaction;

pub use commission::*;
pub use transaction::*;
