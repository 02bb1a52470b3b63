use num_traits::PrimInt;
use std::cmp::Ordering;

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
///
/// Coordinates are signed so that the same type can carry both 32-bit and
/// 64-bit store coordinates.
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Width of the interval; zero for empty or inverted intervals
    #[inline]
    pub fn width(&self) -> I {
        if self.end > self.start {
            self.end - self.start
        } else {
            I::zero()
        }
    }

    /// Half-open overlap test. Touching intervals do not overlap.
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }

    /// Whether `[start, end)` lies completely inside this interval.
    #[inline]
    pub fn contains(&self, start: I, end: I) -> bool {
        self.start <= start && end <= self.end
    }

    /// The overlapping span `[max(start), min(end))`, if non-empty.
    #[inline]
    pub fn clip(&self, start: I, end: I) -> Option<(I, I)> {
        let lo = std::cmp::max(self.start, start);
        let hi = std::cmp::min(self.end, end);
        (lo < hi).then_some((lo, hi))
    }
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T> PartialEq for Interval<I, T>
where
    I: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<I, T>) -> bool {
        self.start == other.start && self.end == other.end
    }
}
