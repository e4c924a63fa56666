pub mod approximation;
pub mod border_following;
pub mod preprocessing;

pub use approximation::approximate;
pub use border_following::*;
pub use preprocessing::*;
