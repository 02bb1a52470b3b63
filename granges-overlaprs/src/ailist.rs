use num_traits::PrimInt;

use super::Overlapper;
use granges_core::models::Interval;

/// An interval counts as "covering" when its end passes at least this many
/// of the intervals that follow it.
const MIN_COVERAGE: usize = 10;

/// Upper bound on the number of components; whatever is left goes into the last one.
const MAX_COMPONENTS: usize = 10;

/// An Augmented Interval List for efficient genomic interval overlap queries.
///
/// From the following article: <https://academic.oup.com/bioinformatics/article/35/23/4907/5509521>
///
/// Intervals are sorted by start and split into a few components: long
/// intervals that would cover many of their neighbours are moved to a later
/// component, so that every component has short runs of overlapping intervals.
/// Each component keeps a running maximum of its ends, which lets a query stop
/// scanning backwards as soon as no earlier interval can reach it.
///
/// # Examples
///
/// ```
/// use granges_overlaprs::{AIList, Overlapper, Interval};
///
/// let exons = vec![
///     Interval { start: 1000i64, end: 2000, val: "EXON1" },
///     Interval { start: 1500, end: 2500, val: "EXON2" },
///     Interval { start: 5000, end: 6000, val: "EXON3" },
/// ];
///
/// let ailist = AIList::build(exons);
///
/// let overlaps = ailist.find(1800, 2200);
/// assert_eq!(overlaps.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct AIList<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    components: Vec<Component<I, T>>,
    len: usize,
}

/// One decomposed sublist of an [`AIList`], sorted by start.
#[derive(Debug, Clone)]
struct Component<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: Vec<Interval<I, T>>,
    /// `max_ends[i]` is the largest end among `intervals[..=i]`.
    max_ends: Vec<I>,
}

impl<I, T> Component<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn new(intervals: Vec<Interval<I, T>>) -> Self {
        let max_ends = intervals
            .iter()
            .scan(None, |max: &mut Option<I>, iv| {
                let next = max.map_or(iv.end, |m| m.max(iv.end));
                *max = Some(next);
                Some(next)
            })
            .collect();

        Component {
            intervals,
            max_ends,
        }
    }

    fn overlapping(&self, start: I, end: I) -> impl Iterator<Item = &Interval<I, T>> + '_ {
        let candidates = self.intervals.partition_point(|iv| iv.start < end);

        (0..candidates)
            .rev()
            .take_while(move |&i| self.max_ends[i] > start)
            .filter(move |&i| self.intervals[i].end > start)
            .map(move |i| &self.intervals[i])
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    ///
    /// Split sorted intervals into those kept in this component and those
    /// covering too many of their successors, which are deferred.
    ///
    fn decompose(intervals: Vec<Interval<I, T>>) -> (Vec<Interval<I, T>>, Vec<Interval<I, T>>) {
        let window = 2 * MIN_COVERAGE;
        let covering: Vec<bool> = (0..intervals.len())
            .map(|i| {
                let end = intervals[i].end;
                intervals[i + 1..]
                    .iter()
                    .take(window - 1)
                    .filter(|next| end > next.end)
                    .count()
                    >= MIN_COVERAGE
            })
            .collect();

        let mut kept = Vec::with_capacity(intervals.len());
        let mut deferred = Vec::new();
        for (interval, defer) in intervals.into_iter().zip(covering) {
            match defer {
                true => deferred.push(interval),
                false => kept.push(interval),
            }
        }
        (kept, deferred)
    }
}

impl<I, T> Overlapper<I, T> for AIList<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    ///
    /// Create a new AIList
    ///
    /// # Arguments
    /// - intervals: list of intervals to index
    ///
    fn build(intervals: Vec<Interval<I, T>>) -> Self {
        let len = intervals.len();
        let mut remaining = intervals;
        remaining.sort();

        let mut components = Vec::new();
        while !remaining.is_empty() {
            if components.len() + 1 == MAX_COMPONENTS {
                components.push(Component::new(remaining));
                break;
            }
            let (kept, deferred) = Self::decompose(remaining);
            components.push(Component::new(kept));
            remaining = deferred;
        }

        AIList { components, len }
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(
            self.components
                .iter()
                .flat_map(move |component| component.overlapping(start, end)),
        )
    }

    fn len(&self) -> usize {
        self.len
    }
}
