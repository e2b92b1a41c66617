//! Separate chaining: each bucket heads a singly linked chain of keys.

use std::cell::Cell;

use super::{percentage, CollisionStrategy, HashAlgorithm, InsertOutcome, TableStats, TagTable};
use super::DEFAULT_TABLE_SIZE;

struct Node {
    key: String,
    next: Option<Box<Node>>,
}

/// Production tag table. Never reports `Full`; chains grow without bound.
pub struct ChainingTable {
    buckets: Vec<Option<Box<Node>>>,
    hash: HashAlgorithm,
    len: usize,
    collisions: usize,
    probes: Cell<usize>,
}

impl ChainingTable {
    /// FNV-1a table with `size` buckets. A size of 0 is raised to 1.
    pub fn new(size: usize) -> Self {
        Self::with_hasher(size, HashAlgorithm::Fnv1a)
    }

    pub fn with_hasher(size: usize, hash: HashAlgorithm) -> Self {
        let size = size.max(1);
        let mut buckets = Vec::with_capacity(size);
        buckets.resize_with(size, || None);
        Self {
            buckets,
            hash,
            len: 0,
            collisions: 0,
            probes: Cell::new(0),
        }
    }

    fn index_of(&self, key: &str) -> usize {
        self.hash.hash(key) as usize % self.buckets.len()
    }

    fn count_probes(&self, extra: usize) {
        self.probes.set(self.probes.get() + extra);
    }

    fn chain_len(head: &Option<Box<Node>>) -> usize {
        let mut count = 0;
        let mut current = head.as_deref();
        while let Some(node) = current {
            count += 1;
            current = node.next.as_deref();
        }
        count
    }

    /// Iterates the keys of every bucket in bucket order, newest first within a chain.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().flat_map(|head| {
            let mut current = head.as_deref();
            std::iter::from_fn(move || {
                let node = current?;
                current = node.next.as_deref();
                Some(node.key.as_str())
            })
        })
    }
}

impl Default for ChainingTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_SIZE)
    }
}

impl TagTable for ChainingTable {
    fn insert(&mut self, key: &str) -> InsertOutcome {
        let index = self.index_of(key);

        let mut visited = 0;
        let mut current = self.buckets[index].as_deref();
        while let Some(node) = current {
            if node.key == key {
                self.count_probes(visited);
                return InsertOutcome::AlreadyPresent;
            }
            visited += 1;
            current = node.next.as_deref();
        }
        self.count_probes(visited.saturating_sub(1));

        let head = &mut self.buckets[index];
        if head.is_some() {
            self.collisions += 1;
        }
        // Prepend.
        let node = Box::new(Node {
            key: key.to_owned(),
            next: head.take(),
        });
        *head = Some(node);
        self.len += 1;
        InsertOutcome::Inserted
    }

    fn contains(&self, key: &str) -> bool {
        let mut visited = 0;
        let mut current = self.buckets[self.index_of(key)].as_deref();
        while let Some(node) = current {
            if node.key == key {
                self.count_probes(visited);
                return true;
            }
            visited += 1;
            current = node.next.as_deref();
        }
        self.count_probes(visited.saturating_sub(1));
        false
    }

    fn remove(&mut self, key: &str) -> bool {
        let index = self.index_of(key);

        let mut position = None;
        let mut current = self.buckets[index].as_deref();
        let mut depth = 0;
        while let Some(node) = current {
            if node.key == key {
                position = Some(depth);
                break;
            }
            depth += 1;
            current = node.next.as_deref();
        }
        let Some(position) = position else {
            return false;
        };

        let mut link = &mut self.buckets[index];
        for _ in 0..position {
            match link {
                Some(node) => link = &mut node.next,
                None => return false,
            }
        }
        match link.take() {
            Some(node) => {
                *link = node.next;
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn size(&self) -> usize {
        self.buckets.len()
    }

    fn stats(&self) -> TableStats {
        let lengths: Vec<usize> = self.buckets.iter().map(Self::chain_len).collect();
        let empty_buckets = lengths.iter().filter(|&&l| l == 0).count();
        let occupied = lengths.len() - empty_buckets;
        let max_chain_length = lengths.iter().copied().max().unwrap_or(0);
        let avg_chain_length = if occupied == 0 {
            0.0
        } else {
            self.len as f64 / occupied as f64
        };

        TableStats {
            strategy: CollisionStrategy::SeparateChaining,
            hash: self.hash,
            size: self.buckets.len(),
            entries: self.len,
            load_factor: self.load_factor(),
            collisions: self.collisions,
            collision_rate: percentage(self.collisions, self.len),
            probes: self.probes.get(),
            avg_chain_length,
            max_chain_length,
            empty_buckets,
        }
    }
}
