//! An ordering adapter for (tag, value) pairs.

use core::cmp::Ordering;

/// Orders a `(tag, value)` pair by the value first and the tag second, both
/// ascending. Incomparable values (NaN distances) compare equal, so the tag
/// decides.
///
/// This gives `f32` distances a total order usable in heaps and
/// `sort_by_key`, with ties broken toward the smaller tag.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MinItem<A, T>(pub A, pub T);

impl<A: Ord, T: PartialOrd> PartialEq for MinItem<A, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A: Ord, T: PartialOrd> Eq for MinItem<A, T> {}

impl<A: Ord, T: PartialOrd> PartialOrd for MinItem<A, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Ord, T: PartialOrd> Ord for MinItem<A, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1
            .partial_cmp(&other.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.0.cmp(&other.0))
    }
}

#[cfg(test)]
mod tests {
    use super::MinItem;

    #[test]
    fn orders_by_value_then_tag() {
        let mut items = vec![MinItem(2_u64, 1.0_f32), MinItem(0, 3.0), MinItem(1, 1.0)];
        items.sort();
        let tags = items.iter().map(|&MinItem(a, _)| a).collect::<Vec<_>>();
        assert_eq!(tags, vec![1, 2, 0]);
    }
}
