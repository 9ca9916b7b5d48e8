/// A trait for types which can be used as an index into a [`KeyedVec`].
///
/// [`KeyedVec`]: super::KeyedVec
pub trait StorageKey {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}
