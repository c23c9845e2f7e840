pub mod articles;
pub mod system;

pub use articles::*;
pub use system::*;
