use super::TrailedBitSet;
use super::TrailedChange;
use super::TrailedInteger;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::stapel_assert_moderate;

/// A store of backtrackable integers and bitsets.
///
/// Every mutation records the previous state on a trail; rewinding to an earlier decision level
/// replays the recorded changes in reverse. Propagators keep their search-dependent counters and
/// flags here so the host can roll them back together with the variable domains, rather than
/// undoing such state themselves.
#[derive(Default, Debug, Clone)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    integers: KeyedVec<TrailedInteger, i64>,
    bitsets: KeyedVec<TrailedBitSet, Box<[u64]>>,
}

impl TrailedValues {
    pub fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        self.integers.push(initial_value)
    }

    pub fn new_bitset(&mut self, size: usize) -> TrailedBitSet {
        let num_words = (size + 63) / 64;
        self.bitsets.push(vec![0_u64; num_words].into())
    }

    pub fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.integers[trailed_integer]
    }

    pub fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.write(trailed_integer, value);
    }

    pub fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.write(trailed_integer, self.integers[trailed_integer] + addition);
    }

    pub fn contains(&self, bitset: TrailedBitSet, bit: usize) -> bool {
        let words = &self.bitsets[bitset];
        stapel_assert_moderate!(bit / 64 < words.len());
        words[bit / 64] & (1 << (bit % 64)) != 0
    }

    /// Set a bit; setting an already set bit is a no-op and leaves no trace on the trail.
    pub fn insert(&mut self, bitset: TrailedBitSet, bit: usize) {
        if self.contains(bitset, bit) {
            return;
        }

        self.bitsets[bitset][bit / 64] |= 1 << (bit % 64);
        self.trail.push(TrailedChange::BitSet {
            reference: bitset,
            bit: bit as u32,
        });
    }

    pub fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level()
    }

    pub fn get_decision_level(&self) -> usize {
        self.trail.get_decision_level()
    }

    pub fn synchronise(&mut self, new_decision_level: usize) {
        self.trail
            .synchronise(new_decision_level)
            .for_each(|change| match change {
                TrailedChange::Integer {
                    reference,
                    old_value,
                } => self.integers[reference] = old_value,
                TrailedChange::BitSet { reference, bit } => {
                    self.bitsets[reference][bit as usize / 64] &= !(1 << (bit % 64));
                }
            })
    }

    fn write(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let old_value = self.integers[trailed_integer];
        if old_value == value {
            return;
        }

        self.trail.push(TrailedChange::Integer {
            reference: trailed_integer,
            old_value,
        });
        self.integers[trailed_integer] = value;
    }
}
