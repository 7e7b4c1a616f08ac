pub mod asset;
pub mod attribute;
pub mod common;
pub mod group;
pub mod value;

pub use asset::*;
pub use attribute::*;
pub use common::*;
pub use group::*;
pub use value::*;
