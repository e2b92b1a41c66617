//! Open addressing: one key per slot, collisions resolved by probing.
//!
//! Deleted slots become tombstones so lookups keep probing past them.
//! Every probe loop is bounded by the slot count, and inserts are refused
//! once the load factor would exceed [`MAX_LOAD_FACTOR`]. The table never
//! resizes; a refused insert returns [`InsertOutcome::Full`].
//!
//! Quadratic probing only reaches a subset of slots unless the size is
//! chosen carefully, so it can report `Full` while empty slots remain.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::{percentage, CollisionStrategy, HashAlgorithm, InsertOutcome, TableStats, TagTable};

/// Inserts that would push `len / size` above this are refused.
pub const MAX_LOAD_FACTOR: f64 = 0.7;

/// Double hashing step is `DOUBLE_HASH_PRIME - (hash mod DOUBLE_HASH_PRIME)`.
const DOUBLE_HASH_PRIME: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStrategy {
    /// `home + i`
    Linear,
    /// `home + i²`
    Quadratic,
    /// `home + i × step`, step from a second hash
    DoubleHashing,
}

impl ProbeStrategy {
    fn collision_strategy(self) -> CollisionStrategy {
        match self {
            ProbeStrategy::Linear => CollisionStrategy::LinearProbing,
            ProbeStrategy::Quadratic => CollisionStrategy::QuadraticProbing,
            ProbeStrategy::DoubleHashing => CollisionStrategy::DoubleHashing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Empty,
    Occupied(String),
    Tombstone,
}

enum Lookup {
    Found(usize),
    /// First reusable slot and how many probes past home it sits.
    Vacant { index: usize, distance: usize },
    /// Probe sequence ended without an empty slot.
    Exhausted,
}

pub struct OpenAddressingTable {
    slots: Vec<Slot>,
    hash: HashAlgorithm,
    probe: ProbeStrategy,
    len: usize,
    tombstones: usize,
    collisions: usize,
    probes: Cell<usize>,
}

impl OpenAddressingTable {
    /// `size` slots. A size of 0 is raised to 1.
    pub fn new(size: usize, hash: HashAlgorithm, probe: ProbeStrategy) -> Self {
        let size = size.max(1);
        Self {
            slots: vec![Slot::Empty; size],
            hash,
            probe,
            len: 0,
            tombstones: 0,
            collisions: 0,
            probes: Cell::new(0),
        }
    }

    pub fn probe_strategy(&self) -> ProbeStrategy {
        self.probe
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    fn step_for(&self, hash: u32) -> usize {
        let size = self.slots.len();
        let step = (DOUBLE_HASH_PRIME - hash % DOUBLE_HASH_PRIME) as usize % size;
        // A step that is a multiple of the size would revisit home forever.
        if step == 0 {
            1
        } else {
            step
        }
    }

    fn slot_at(&self, home: usize, step: usize, i: usize) -> usize {
        let size = self.slots.len();
        let offset = match self.probe {
            ProbeStrategy::Linear => i,
            ProbeStrategy::Quadratic => (i * i) % size,
            ProbeStrategy::DoubleHashing => (i * step) % size,
        };
        (home + offset) % size
    }

    fn lookup(&self, key: &str) -> Lookup {
        let size = self.slots.len();
        let hash = self.hash.hash(key);
        let home = hash as usize % size;
        let step = self.step_for(hash);

        let mut reusable: Option<(usize, usize)> = None;
        for i in 0..size {
            let index = self.slot_at(home, step, i);
            match &self.slots[index] {
                Slot::Empty => {
                    self.probes.set(self.probes.get() + i);
                    let (index, distance) = reusable.unwrap_or((index, i));
                    return Lookup::Vacant { index, distance };
                }
                Slot::Occupied(existing) if existing == key => {
                    self.probes.set(self.probes.get() + i);
                    return Lookup::Found(index);
                }
                Slot::Tombstone => {
                    reusable.get_or_insert((index, i));
                }
                Slot::Occupied(_) => {}
            }
        }

        self.probes.set(self.probes.get() + size.saturating_sub(1));
        match reusable {
            Some((index, distance)) => Lookup::Vacant { index, distance },
            None => Lookup::Exhausted,
        }
    }

    fn would_exceed_load(&self) -> bool {
        (self.len + 1) as f64 / self.slots.len() as f64 > MAX_LOAD_FACTOR
    }
}

impl TagTable for OpenAddressingTable {
    fn insert(&mut self, key: &str) -> InsertOutcome {
        let (index, distance) = match self.lookup(key) {
            Lookup::Found(_) => return InsertOutcome::AlreadyPresent,
            Lookup::Exhausted => return InsertOutcome::Full,
            Lookup::Vacant { index, distance } => (index, distance),
        };
        if self.would_exceed_load() {
            return InsertOutcome::Full;
        }

        if self.slots[index] == Slot::Tombstone {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied(key.to_owned());
        self.len += 1;
        if distance > 0 {
            self.collisions += 1;
        }
        InsertOutcome::Inserted
    }

    fn contains(&self, key: &str) -> bool {
        matches!(self.lookup(key), Lookup::Found(_))
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.lookup(key) {
            Lookup::Found(index) => {
                self.slots[index] = Slot::Tombstone;
                self.len -= 1;
                self.tombstones += 1;
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn size(&self) -> usize {
        self.slots.len()
    }

    fn stats(&self) -> TableStats {
        let occupied = self.len > 0;
        TableStats {
            strategy: self.probe.collision_strategy(),
            hash: self.hash,
            size: self.slots.len(),
            entries: self.len,
            load_factor: self.load_factor(),
            collisions: self.collisions,
            collision_rate: percentage(self.collisions, self.len),
            probes: self.probes.get(),
            avg_chain_length: if occupied { 1.0 } else { 0.0 },
            max_chain_length: usize::from(occupied),
            empty_buckets: self.slots.len() - self.len - self.tombstones,
        }
    }
}
