//! Union-find over identifier ids, used to cluster values that mutate
//! together.
//!
//! Backed by a dense array sized to the function's identifier arena, so finds
//! are a couple of array reads. Only identifiers explicitly added through
//! `union` count as members; untouched slots never appear in `buckets`.

use crate::hir::hir_nodes::IdentifierId;
use rustc_hash::FxHashMap;

pub struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
    added: Vec<bool>,
}

impl DisjointSet {
    pub fn new(identifier_count: usize) -> Self {
        Self {
            parent: (0..identifier_count as u32).collect(),
            rank: vec![0; identifier_count],
            added: vec![false; identifier_count],
        }
    }

    /// Merge all the given identifiers into one set, adding any that have not
    /// been seen before. A single-element slice just registers membership.
    pub fn union(&mut self, members: &[IdentifierId]) {
        let Some(first) = members.first() else {
            return;
        };

        self.added[first.0 as usize] = true;
        let mut root = self.find(first.0);

        for member in &members[1..] {
            self.added[member.0 as usize] = true;
            let other = self.find(member.0);
            if other == root {
                continue;
            }

            // Union by rank
            let (winner, loser) = if self.rank[root as usize] >= self.rank[other as usize] {
                (root, other)
            } else {
                (other, root)
            };
            self.parent[loser as usize] = winner;
            if self.rank[winner as usize] == self.rank[loser as usize] {
                self.rank[winner as usize] += 1;
            }
            root = winner;
        }
    }

    fn find(&mut self, id: u32) -> u32 {
        let mut root = id;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Path compression
        let mut current = id;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }

        root
    }

    /// Group every added identifier by its set representative.
    /// Members within a bucket come out in ascending id order.
    pub fn buckets(&mut self) -> FxHashMap<IdentifierId, Vec<IdentifierId>> {
        let mut buckets: FxHashMap<IdentifierId, Vec<IdentifierId>> = FxHashMap::default();

        for id in 0..self.parent.len() as u32 {
            if !self.added[id as usize] {
                continue;
            }
            let root = self.find(id);
            buckets
                .entry(IdentifierId(root))
                .or_default()
                .push(IdentifierId(id));
        }

        buckets
    }
}
