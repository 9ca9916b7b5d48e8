//! Data structures which are keyed by typed handles rather than raw indices.

mod keyed_vec;
mod storage_key;

pub use keyed_vec::KeyedVec;
pub use storage_key::StorageKey;
