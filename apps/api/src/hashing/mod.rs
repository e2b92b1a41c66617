//! String hash functions and fixed-capacity tag tables.
//!
//! Every function hashes by Unicode code point (not by UTF-8 byte) and keeps
//! its state in 32 bits after each step, so values stay reproducible across
//! implementations that hash the same text the same way.
//!
//! FNV-1a over separate chaining is the production path. The other hash
//! functions and the open-addressing strategies exist for benchmarking and
//! are interchangeable behind [`TagTable`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod chaining;
pub mod open_addressing;

pub use chaining::ChainingTable;
pub use open_addressing::{OpenAddressingTable, ProbeStrategy};

/// Default bucket count (prime).
pub const DEFAULT_TABLE_SIZE: usize = 101;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const DJB2_SEED: u32 = 5381;
const LARGE_PRIME: u64 = 1_000_000_007;
const POLY_BASE: i64 = 31;

// ────────────────────────────────────────────────────────────────────────────
// Hash functions
// ────────────────────────────────────────────────────────────────────────────

/// FNV-1a, 32-bit. XOR first, then multiply.
pub fn fnv1a(data: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for c in data.chars() {
        hash ^= c as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// DJB2: `hash * 33 + c`, seeded at 5381.
pub fn djb2(data: &str) -> u32 {
    data.chars().fold(DJB2_SEED, |hash, c| {
        hash.wrapping_mul(33).wrapping_add(c as u32)
    })
}

/// SDBM: `c + (hash << 6) + (hash << 16) - hash`.
pub fn sdbm(data: &str) -> u32 {
    data.chars().fold(0u32, |hash, c| {
        (c as u32)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

/// Sum of code points modulo a large prime. Poor distribution: anagrams
/// always collide. Only used as a negative benchmark baseline.
pub fn simple_sum(data: &str) -> u32 {
    let sum = data
        .chars()
        .fold(0u64, |acc, c| (acc + c as u64) % LARGE_PRIME);
    sum as u32
}

/// Base-31 polynomial rolling hash modulo `1_000_000_007`.
///
/// Digits are `c - 'a' + 1`, which only makes sense for lowercase `a`–`z`.
/// Any other character yields a zero or negative digit; the Euclidean
/// remainder keeps the result in range but such inputs collide more often.
pub fn polynomial(data: &str) -> u32 {
    let m = LARGE_PRIME as i64;
    let mut hash: i64 = 0;
    let mut p_pow: i64 = 1;
    for c in data.chars() {
        let digit = c as i64 - 'a' as i64 + 1;
        hash = (hash + digit * p_pow).rem_euclid(m);
        p_pow = (p_pow * POLY_BASE) % m;
    }
    hash as u32
}

/// Selects one of the hash functions above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Fnv1a,
    Djb2,
    Sdbm,
    SimpleSum,
    Polynomial,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Fnv1a,
        HashAlgorithm::Djb2,
        HashAlgorithm::Sdbm,
        HashAlgorithm::SimpleSum,
        HashAlgorithm::Polynomial,
    ];

    pub fn hash(self, data: &str) -> u32 {
        match self {
            HashAlgorithm::Fnv1a => fnv1a(data),
            HashAlgorithm::Djb2 => djb2(data),
            HashAlgorithm::Sdbm => sdbm(data),
            HashAlgorithm::SimpleSum => simple_sum(data),
            HashAlgorithm::Polynomial => polynomial(data),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Fnv1a => "fnv1a",
            HashAlgorithm::Djb2 => "djb2",
            HashAlgorithm::Sdbm => "sdbm",
            HashAlgorithm::SimpleSum => "simple_sum",
            HashAlgorithm::Polynomial => "polynomial",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fnv1a" | "fnv_1a" => Ok(HashAlgorithm::Fnv1a),
            "djb2" => Ok(HashAlgorithm::Djb2),
            "sdbm" => Ok(HashAlgorithm::Sdbm),
            "simple" | "simple_sum" => Ok(HashAlgorithm::SimpleSum),
            "polynomial" => Ok(HashAlgorithm::Polynomial),
            other => Err(format!("unknown hash algorithm '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Table contract
// ────────────────────────────────────────────────────────────────────────────

/// Result of inserting a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted,
    /// Key was already present; the table is unchanged.
    AlreadyPresent,
    /// Open addressing only: the load-factor ceiling was reached or no free
    /// slot was found within `size` probes. The table is unchanged.
    Full,
}

impl InsertOutcome {
    /// True when the key is in the table after the call.
    pub fn is_stored(self) -> bool {
        !matches!(self, InsertOutcome::Full)
    }
}

/// Collision resolution strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    #[default]
    SeparateChaining,
    LinearProbing,
    QuadraticProbing,
    DoubleHashing,
}

impl CollisionStrategy {
    pub const ALL: [CollisionStrategy; 4] = [
        CollisionStrategy::SeparateChaining,
        CollisionStrategy::LinearProbing,
        CollisionStrategy::QuadraticProbing,
        CollisionStrategy::DoubleHashing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollisionStrategy::SeparateChaining => "separate_chaining",
            CollisionStrategy::LinearProbing => "linear_probing",
            CollisionStrategy::QuadraticProbing => "quadratic_probing",
            CollisionStrategy::DoubleHashing => "double_hashing",
        }
    }
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "separate_chaining" | "chaining" => Ok(CollisionStrategy::SeparateChaining),
            "linear_probing" | "linear" => Ok(CollisionStrategy::LinearProbing),
            "quadratic_probing" | "quadratic" => Ok(CollisionStrategy::QuadraticProbing),
            "double_hashing" | "double" => Ok(CollisionStrategy::DoubleHashing),
            other => Err(format!("unknown collision strategy '{other}'")),
        }
    }
}

/// Diagnostic snapshot of a table. Not needed for correctness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub strategy: CollisionStrategy,
    pub hash: HashAlgorithm,
    pub size: usize,
    pub entries: usize,
    /// entries / size
    pub load_factor: f64,
    /// Inserts whose home bucket was already occupied.
    pub collisions: usize,
    /// collisions / successful inserts × 100
    pub collision_rate: f64,
    /// Extra slots or chain nodes visited beyond the home bucket, all operations.
    pub probes: usize,
    /// Mean chain length over non-empty buckets (open addressing: 1.0 once occupied).
    pub avg_chain_length: f64,
    pub max_chain_length: usize,
    pub empty_buckets: usize,
}

/// A fixed-capacity set of string keys.
///
/// Implementations never grow. Re-inserting a present key is a no-op.
pub trait TagTable: Send {
    fn insert(&mut self, key: &str) -> InsertOutcome;
    fn contains(&self, key: &str) -> bool;
    fn remove(&mut self, key: &str) -> bool;
    fn len(&self) -> usize;
    fn size(&self) -> usize;
    fn stats(&self) -> TableStats;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_factor(&self) -> f64 {
        if self.size() == 0 {
            0.0
        } else {
            self.len() as f64 / self.size() as f64
        }
    }
}

/// Builds an empty table for the given strategy.
pub fn build_table(
    strategy: CollisionStrategy,
    size: usize,
    hash: HashAlgorithm,
) -> Box<dyn TagTable> {
    match strategy {
        CollisionStrategy::SeparateChaining => Box::new(ChainingTable::with_hasher(size, hash)),
        CollisionStrategy::LinearProbing => {
            Box::new(OpenAddressingTable::new(size, hash, ProbeStrategy::Linear))
        }
        CollisionStrategy::QuadraticProbing => {
            Box::new(OpenAddressingTable::new(size, hash, ProbeStrategy::Quadratic))
        }
        CollisionStrategy::DoubleHashing => Box::new(OpenAddressingTable::new(
            size,
            hash,
            ProbeStrategy::DoubleHashing,
        )),
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
