mod ground;
mod limb;
mod retargeter;
mod spine;

pub use ground::*;
pub use retargeter::*;
pub use spine::*;


#[cfg(test)]
mod limb_tests;


#[cfg(test)]
mod retargeter_tests;
