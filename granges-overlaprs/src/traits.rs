use num_traits::PrimInt;

pub use granges_core::models::Interval;

///
/// An index over a fixed set of intervals answering half-open overlap queries.
///
/// Coordinates may be signed or unsigned; store coordinates are signed.
///
pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    /// All intervals overlapping `[start, end)`, cloned.
    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, end).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
