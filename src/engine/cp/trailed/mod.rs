//! Backtrackable state for propagators: integer counters and bitsets whose writes are undone
//! automatically when the host search engine backtracks.

mod trailed_bitset;
mod trailed_change;
mod trailed_integer;
mod trailed_values;

pub use trailed_bitset::TrailedBitSet;
pub(crate) use trailed_change::TrailedChange;
pub use trailed_integer::TrailedInteger;
pub use trailed_values::TrailedValues;
