//! Property tree access
//!
//! Path-based reads and writes over a block's property tree, plus the
//! ordinal scales used for relative adjustments.

pub mod path;
pub mod scale;

pub use path::{get, get_mut, has, join_path, leaves, parse_path, remove, set, Segment};
pub use scale::{OrdinalScale, SPACING_SCALE};
