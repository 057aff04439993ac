mod bone;
mod builder;
mod set;
mod snapshot;

pub use bone::*;
pub use builder::*;
pub use set::*;
pub use snapshot::*;
