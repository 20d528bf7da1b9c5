mod debt;
mod money;
mod split;
mod user;

pub use debt::*;
pub use money::*;
pub use split::*;
pub use user::*;
