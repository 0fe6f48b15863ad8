//! Columnar H3 hierarchy and grid operations used by the hierarchical
//! predicate library and the adaptive resolution planner.

pub mod change_resolution;
pub mod coordinates;
pub mod grid;
pub mod hierarchy;

pub use change_resolution::*;
pub use coordinates::*;
pub use grid::*;
pub use hierarchy::*;
