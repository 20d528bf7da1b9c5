mod fixture;
mod repository;

pub use fixture::*;
pub use repository::*;
