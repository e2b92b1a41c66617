//! Orders records by a named field, null-last, without
//! touching the caller's slice.
//!
//! Records expose fields through [`SortKey`]. A record whose field is absent
//! (or null, or not a comparable scalar) is never compared by value: it is
//! placed after every record that has a value, in both directions, and two
//! such records keep their input order.
//!
//! Merge sort is the production algorithm. The others in [`comparison`]
//! honour the same contract and exist to benchmark against it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub mod comparison;
pub mod merge;

pub use merge::merge_sort_by;

// ────────────────────────────────────────────────────────────────────────────
// Sort values
// ────────────────────────────────────────────────────────────────────────────

/// A comparable field value.
///
/// Ordering is total: `Bool < numbers < Text`. Integers and floats compare
/// by exact numeric value, so `-0.0 == 0 == 0.0`. NaN sorts after every
/// number (before, when its sign bit is set).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Int(_) | SortValue::Float(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    /// Converts a JSON scalar. Null, arrays and objects have no sort value.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(SortValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(SortValue::Int(i)),
                None => n.as_f64().map(SortValue::Float),
            },
            Value::String(s) => Some(SortValue::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b))
            }
            (SortValue::Int(a), SortValue::Float(b)) => cmp_int_float(*a, *b),
            (SortValue::Float(a), SortValue::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compares without converting `i` to `f64`, which rounds above 2^53.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float past i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&f).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        SortValue::Bool(v)
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Int(v)
    }
}

impl From<i32> for SortValue {
    fn from(v: i32) -> Self {
        SortValue::Int(v.into())
    }
}

impl From<u32> for SortValue {
    fn from(v: u32) -> Self {
        SortValue::Int(v.into())
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Float(v)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_owned())
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        SortValue::Text(v)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sortable records
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can report a value for a named field.
///
/// Return `None` for unknown fields and for fields that are present but null.
pub trait SortKey {
    fn sort_key(&self, field: &str) -> Option<SortValue>;
}

impl SortKey for Map<String, Value> {
    fn sort_key(&self, field: &str) -> Option<SortValue> {
        self.get(field).and_then(SortValue::from_json)
    }
}

impl SortKey for Value {
    fn sort_key(&self, field: &str) -> Option<SortValue> {
        self.as_object().and_then(|obj| obj.sort_key(field))
    }
}

impl<T: SortKey + ?Sized> SortKey for &T {
    fn sort_key(&self, field: &str) -> Option<SortValue> {
        (**self).sort_key(field)
    }
}

/// Null-last comparison of two extracted keys.
///
/// Present values compare ascending, or reversed when `descending`. A
/// missing value is greater than any present value regardless of direction.
pub fn compare_keys(a: Option<&SortValue>, b: Option<&SortValue>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) if descending => y.cmp(x),
        (Some(x), Some(y)) => x.cmp(y),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Algorithms
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    #[default]
    Merge,
    Quick,
    Heap,
    Bubble,
    Insertion,
    Selection,
    Shaker,
    /// The standard library's stable sort.
    Native,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 8] = [
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
        SortAlgorithm::Heap,
        SortAlgorithm::Bubble,
        SortAlgorithm::Insertion,
        SortAlgorithm::Selection,
        SortAlgorithm::Shaker,
        SortAlgorithm::Native,
    ];

    /// Whether equal keys are guaranteed to keep their input order.
    pub fn is_stable(self) -> bool {
        !matches!(
            self,
            SortAlgorithm::Quick | SortAlgorithm::Heap | SortAlgorithm::Selection
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortAlgorithm::Merge => "merge",
            SortAlgorithm::Quick => "quick",
            SortAlgorithm::Heap => "heap",
            SortAlgorithm::Bubble => "bubble",
            SortAlgorithm::Insertion => "insertion",
            SortAlgorithm::Selection => "selection",
            SortAlgorithm::Shaker => "shaker",
            SortAlgorithm::Native => "native",
        }
    }

    /// Sorts `items` by `compare` using this algorithm.
    pub fn sort_by<E, F>(self, items: Vec<E>, compare: F) -> Vec<E>
    where
        F: Fn(&E, &E) -> Ordering,
    {
        if self == SortAlgorithm::Merge {
            return merge_sort_by(items, &compare);
        }
        let mut items = items;
        match self {
            SortAlgorithm::Quick => comparison::quick_sort_by(&mut items, &compare),
            SortAlgorithm::Heap => comparison::heap_sort_by(&mut items, &compare),
            SortAlgorithm::Bubble => comparison::bubble_sort_by(&mut items, &compare),
            SortAlgorithm::Insertion => comparison::insertion_sort_by(&mut items, &compare),
            SortAlgorithm::Selection => comparison::selection_sort_by(&mut items, &compare),
            SortAlgorithm::Shaker => comparison::shaker_sort_by(&mut items, &compare),
            SortAlgorithm::Native => items.sort_by(&compare),
            SortAlgorithm::Merge => {}
        }
        items
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_lowercase();
        let name = name.strip_suffix("_sort").unwrap_or(&name);
        SortAlgorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| format!("unknown sort algorithm '{s}'"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record-level entry points
// ────────────────────────────────────────────────────────────────────────────

/// Orders `records` by `key` with merge sort. Stable, null-last, and returns
/// clones; the input slice is left untouched.
pub fn sort_records<T>(records: &[T], key: &str, descending: bool) -> Vec<T>
where
    T: SortKey + Clone,
{
    sort_records_with(SortAlgorithm::Merge, records, key, descending)
}

/// [`sort_records`] with an explicit algorithm.
///
/// Each record's key is extracted once up front; the algorithm then orders
/// (key, record) pairs so comparisons never re-read the record.
pub fn sort_records_with<T>(
    algorithm: SortAlgorithm,
    records: &[T],
    key: &str,
    descending: bool,
) -> Vec<T>
where
    T: SortKey + Clone,
{
    let started = Instant::now();

    let keyed: Vec<(Option<SortValue>, &T)> =
        records.iter().map(|r| (r.sort_key(key), r)).collect();
    let sorted = algorithm.sort_by(keyed, |a, b| {
        compare_keys(a.0.as_ref(), b.0.as_ref(), descending)
    });
    let result: Vec<T> = sorted.into_iter().map(|(_, r)| r.clone()).collect();

    debug!(
        algorithm = %algorithm,
        key,
        descending,
        items = records.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "sorted records"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scores(records: &[Value], key: &str) -> Vec<Option<SortValue>> {
        records.iter().map(|r| r.sort_key(key)).collect()
    }

    fn ids(records: &[Value]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r["id"].as_i64().unwrap_or(-1))
            .collect()
    }

    fn sample() -> Vec<Value> {
        vec![
            json!({"id": 0, "score": 70}),
            json!({"id": 1, "score": null}),
            json!({"id": 2, "score": 55}),
            json!({"id": 3, "score": 70}),
            json!({"id": 4}),
            json!({"id": 5, "score": 90}),
            json!({"id": 6, "score": 55}),
        ]
    }

    #[test]
    fn test_ascending_with_null_scenario() {
        let records = vec![json!({"score": 5}), json!({"score": null}), json!({"score": 1})];
        let sorted = sort_records(&records, "score", false);
        assert_eq!(
            sorted,
            vec![json!({"score": 1}), json!({"score": 5}), json!({"score": null})]
        );
    }

    #[test]
    fn test_merge_sort_is_stable_ascending() {
        let sorted = sort_records(&sample(), "score", false);
        assert_eq!(ids(&sorted), vec![2, 6, 0, 3, 5, 1, 4]);
    }

    #[test]
    fn test_merge_sort_is_stable_descending_and_null_last() {
        let sorted = sort_records(&sample(), "score", true);
        assert_eq!(ids(&sorted), vec![5, 0, 3, 2, 6, 1, 4]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let records = sample();
        let before = records.clone();
        let _ = sort_records(&records, "score", true);
        assert_eq!(records, before);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = sort_records(&sample(), "score", false);
        let twice = sort_records(&once, "score", false);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_key_keeps_input_order() {
        let records = sample();
        let sorted = sort_records(&records, "salary", false);
        assert_eq!(sorted, records);
    }

    #[test]
    fn test_empty_and_single() {
        let empty: Vec<Value> = vec![];
        assert!(sort_records(&empty, "score", false).is_empty());
        let one = vec![json!({"score": 3})];
        assert_eq!(sort_records(&one, "score", true), one);
    }

    #[test]
    fn test_every_algorithm_orders_keys_identically() {
        let records = sample();
        for descending in [false, true] {
            let expected = scores(&sort_records(&records, "score", descending), "score");
            for algorithm in SortAlgorithm::ALL {
                let sorted = sort_records_with(algorithm, &records, "score", descending);
                assert_eq!(
                    scores(&sorted, "score"),
                    expected,
                    "{algorithm} descending={descending}"
                );
                // Nulls are last for every algorithm.
                assert!(sorted[5..].iter().all(|r| r.sort_key("score").is_none()));
            }
        }
    }

    #[test]
    fn test_stable_algorithms_preserve_tie_order() {
        let records = sample();
        let expected = ids(&sort_records(&records, "score", false));
        for algorithm in SortAlgorithm::ALL.into_iter().filter(|a| a.is_stable()) {
            let sorted = sort_records_with(algorithm, &records, "score", false);
            assert_eq!(ids(&sorted), expected, "{algorithm}");
        }
    }

    #[test]
    fn test_compare_keys_null_always_last() {
        let one = SortValue::Int(1);
        for descending in [false, true] {
            assert_eq!(compare_keys(None, Some(&one), descending), Ordering::Greater);
            assert_eq!(compare_keys(Some(&one), None, descending), Ordering::Less);
            assert_eq!(compare_keys(None, None, descending), Ordering::Equal);
        }
    }

    #[test]
    fn test_sort_value_mixed_numbers() {
        assert_eq!(SortValue::Int(2), SortValue::Float(2.0));
        assert!(SortValue::Int(1) < SortValue::Float(1.5));
        assert!(SortValue::Float(-0.5) < SortValue::Int(0));
    }

    #[test]
    fn test_sort_value_large_ints_against_floats() {
        let two_53 = 9_007_199_254_740_992_i64;
        assert!(SortValue::Int(two_53 + 1) > SortValue::Float(two_53 as f64));
        assert_eq!(SortValue::Float(two_53 as f64), SortValue::Int(two_53));
        assert!(SortValue::Int(i64::MAX) < SortValue::Float(9.3e18));
        assert!(SortValue::Int(i64::MIN) > SortValue::Float(f64::NEG_INFINITY));
        assert!(SortValue::Float(-2.5) < SortValue::Int(-2));
        assert!(SortValue::Float(f64::NAN) > SortValue::Int(i64::MAX));
        assert_eq!(SortValue::Float(-0.0), SortValue::Float(0.0));
    }

    #[test]
    fn test_large_ints_sort_exactly_among_floats() {
        let records = vec![
            json!({"v": 9_007_199_254_740_993_i64}),
            json!({"v": 9_007_199_254_740_992.0_f64}),
            json!({"v": 9_007_199_254_740_992_i64}),
        ];
        let sorted = sort_records(&records, "v", false);
        assert_eq!(
            sorted,
            vec![
                json!({"v": 9_007_199_254_740_992.0_f64}),
                json!({"v": 9_007_199_254_740_992_i64}),
                json!({"v": 9_007_199_254_740_993_i64}),
            ]
        );
        for algorithm in SortAlgorithm::ALL {
            let sorted = sort_records_with(algorithm, &records, "v", false);
            assert_eq!(sorted[2]["v"].as_i64(), Some(9_007_199_254_740_993), "{algorithm}");
        }
    }

    #[test]
    fn test_sort_value_cross_type_rank() {
        assert!(SortValue::Bool(true) < SortValue::Int(-100));
        assert!(SortValue::Float(1e9) < SortValue::Text("a".into()));
    }

    #[test]
    fn test_sort_value_from_json() {
        assert_eq!(SortValue::from_json(&json!(3)), Some(SortValue::Int(3)));
        assert_eq!(SortValue::from_json(&json!(2.5)), Some(SortValue::Float(2.5)));
        assert_eq!(SortValue::from_json(&json!("x")), Some(SortValue::Text("x".into())));
        assert_eq!(SortValue::from_json(&json!(null)), None);
        assert_eq!(SortValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_non_object_records_sort_last() {
        let records = vec![json!(7), json!({"score": 1})];
        let sorted = sort_records(&records, "score", false);
        assert_eq!(sorted, vec![json!({"score": 1}), json!(7)]);
    }

    #[test]
    fn test_text_keys() {
        let records = vec![
            json!({"title": "Backend"}),
            json!({"title": "AI"}),
            json!({"title": "Cloud"}),
        ];
        let sorted = sort_records(&records, "title", false);
        let titles: Vec<&str> = sorted.iter().filter_map(|r| r["title"].as_str()).collect();
        assert_eq!(titles, vec!["AI", "Backend", "Cloud"]);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("merge".parse::<SortAlgorithm>(), Ok(SortAlgorithm::Merge));
        assert_eq!("Heap_Sort".parse::<SortAlgorithm>(), Ok(SortAlgorithm::Heap));
        assert!("bogo".parse::<SortAlgorithm>().is_err());
    }
}
