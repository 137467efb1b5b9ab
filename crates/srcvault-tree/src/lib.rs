//! Lock and unlock a source tree.
//!
//! [`ZonePolicy`] decides which directories and files a walk touches;
//! [`TreeWalker`] applies the vault codec to every admitted file.

pub mod error;
pub mod policy;
pub mod walker;

pub use error::{FileError, WalkError};
pub use policy::{DirAction, Direction, Zone, ZonePolicy};
pub use walker::{TreeStatus, TreeWalker, WalkReport};
