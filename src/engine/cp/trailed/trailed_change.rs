use super::TrailedBitSet;
use super::TrailedInteger;

#[derive(Debug, Clone)]
pub(crate) enum TrailedChange {
    Integer {
        reference: TrailedInteger,
        old_value: i64,
    },
    /// The bit was newly set; undoing the change clears it again.
    BitSet { reference: TrailedBitSet, bit: u32 },
}
