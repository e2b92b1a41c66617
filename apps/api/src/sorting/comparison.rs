//! In-place comparison sorts kept as benchmark baselines for merge sort.
//!
//! All take the same comparator as [`super::merge_sort_by`], so the
//! null-last policy lives in the comparator and holds for every one of them.
//! Bubble, insertion and shaker sort are stable. Quick, heap and selection
//! sort are not: equal keys may come out in any order.

use std::cmp::Ordering;

/// Quick sort, middle-element pivot, Lomuto partition. Recurses into the
/// smaller side and loops on the larger so stack depth stays logarithmic.
pub fn quick_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    let mut slice = items;
    while slice.len() > 1 {
        let pivot = partition(slice, compare);
        let (left, rest) = std::mem::take(&mut slice).split_at_mut(pivot);
        let right = &mut rest[1..];
        if left.len() < right.len() {
            quick_sort_by(left, compare);
            slice = right;
        } else {
            quick_sort_by(right, compare);
            slice = left;
        }
    }
}

fn partition<E, F>(items: &mut [E], compare: &F) -> usize
where
    F: Fn(&E, &E) -> Ordering,
{
    let last = items.len() - 1;
    items.swap(items.len() / 2, last);
    let mut store = 0;
    for i in 0..last {
        if compare(&items[i], &items[last]) == Ordering::Less {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}

/// Heap sort over a max-heap.
pub fn heap_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    let len = items.len();
    for start in (0..len / 2).rev() {
        sift_down(items, start, len, compare);
    }
    for end in (1..len).rev() {
        items.swap(0, end);
        sift_down(items, 0, end, compare);
    }
}

fn sift_down<E, F>(items: &mut [E], mut root: usize, end: usize, compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && compare(&items[child], &items[child + 1]) == Ordering::Less {
            child += 1;
        }
        if compare(&items[root], &items[child]) != Ordering::Less {
            return;
        }
        items.swap(root, child);
        root = child;
    }
}

/// Bubble sort with early exit once a pass makes no swap.
pub fn bubble_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    let len = items.len();
    for pass in 0..len {
        let mut swapped = false;
        for j in 0..len - pass - 1 {
            if compare(&items[j], &items[j + 1]) == Ordering::Greater {
                items.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

pub fn insertion_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub fn selection_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    let len = items.len();
    for i in 0..len {
        let mut min = i;
        for j in i + 1..len {
            if compare(&items[j], &items[min]) == Ordering::Less {
                min = j;
            }
        }
        items.swap(i, min);
    }
}

/// Cocktail shaker sort: alternating forward and backward bubble passes.
pub fn shaker_sort_by<E, F>(items: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    if items.len() < 2 {
        return;
    }
    let mut left = 0;
    let mut right = items.len() - 1;
    while left < right {
        let mut swapped = false;
        for i in left..right {
            if compare(&items[i], &items[i + 1]) == Ordering::Greater {
                items.swap(i, i + 1);
                swapped = true;
            }
        }
        right -= 1;
        for i in (left + 1..=right).rev() {
            if compare(&items[i - 1], &items[i]) == Ordering::Greater {
                items.swap(i - 1, i);
                swapped = true;
            }
        }
        left += 1;
        if !swapped {
            break;
        }
    }
}
