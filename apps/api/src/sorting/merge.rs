//! Top-down merge sort.

use std::cmp::Ordering;

/// Sorts `items` by `compare`, stably.
///
/// Splits at the midpoint, sorts each half recursively, then merges. On a
/// tie the left head is taken first, which is what keeps equal elements in
/// input order.
pub fn merge_sort_by<E, F>(mut items: Vec<E>, compare: &F) -> Vec<E>
where
    F: Fn(&E, &E) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, compare);
    let right = merge_sort_by(right, compare);
    merge(left, right, compare)
}

fn merge<E, F>(left: Vec<E>, right: Vec<E>, compare: &F) -> Vec<E>
where
    F: Fn(&E, &E) -> Ordering,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_integers() {
        let sorted = merge_sort_by(vec![5, 3, 9, 1, 4, 1, 0], &|a: &i32, b: &i32| a.cmp(b));
        assert_eq!(sorted, vec![0, 1, 1, 3, 4, 5, 9]);
    }

    #[test]
    fn test_reverse_comparator() {
        let sorted = merge_sort_by(vec![2, 8, 5], &|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(sorted, vec![8, 5, 2]);
    }

    #[test]
    fn test_ties_keep_left_first() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e')];
        let sorted = merge_sort_by(items, &|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(sorted, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'e')]);
    }

    #[test]
    fn test_trivial_inputs() {
        let cmp = |a: &u8, b: &u8| a.cmp(b);
        assert!(merge_sort_by(Vec::new(), &cmp).is_empty());
        assert_eq!(merge_sort_by(vec![7], &cmp), vec![7]);
    }

    #[test]
    fn test_large_reverse_input() {
        let items: Vec<u32> = (0..1000).rev().collect();
        let sorted = merge_sort_by(items, &|a: &u32, b: &u32| a.cmp(b));
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sorted.len(), 1000);
    }
}
