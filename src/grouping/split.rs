//! Carving an over-size cluster into capped groups.
//!
//! Pairs (a cap of 2) come from an exhaustive maximum matching over the
//! cluster, memoized on the set of unassigned tiles. Larger caps use a greedy
//! pass: tiles with the fewest free links are placed first, both when seeding
//! a group and when growing it. Every tie falls back to ascending coordinate
//! order so the result never depends on hash or traversal order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::Linkage;
use crate::board::{Coord, Wildlife};
use crate::hex::AdjacencyGraph;

pub(super) fn split_capped(
    graph: &AdjacencyGraph<'_>,
    species: Wildlife,
    linkage: Linkage,
    cluster: &[Coord],
    cap: usize,
) -> Vec<Vec<Coord>> {
    let members: BTreeSet<Coord> = cluster.iter().copied().collect();
    let links: BTreeMap<Coord, Vec<Coord>> = members
        .iter()
        .map(|&coord| {
            let linked = graph
                .neighbors_with(coord, species)
                .into_iter()
                .filter(|next| members.contains(next))
                .filter(|next| linkage.connects(graph, species, coord, *next))
                .collect();
            (coord, linked)
        })
        .collect();

    if cap == 2 {
        Pairing::new(&links).best_partition()
    } else {
        greedy(members, &links, cap)
    }
}

/// Set of unassigned tiles, one bit per cluster index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Free(Vec<u64>);

impl Free {
    fn full(len: usize) -> Self {
        let mut words = vec![u64::MAX; len.div_ceil(64)];
        if len % 64 != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << (len % 64)) - 1;
            }
        }
        Self(words)
    }

    fn lowest(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, word)| **word != 0)
            .map(|(index, word)| index * 64 + word.trailing_zeros() as usize)
    }

    fn contains(&self, index: usize) -> bool {
        self.0[index / 64] & (1u64 << (index % 64)) != 0
    }

    fn count(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn without(&self, indices: &[usize]) -> Self {
        let mut next = self.clone();
        for &index in indices {
            next.0[index / 64] &= !(1u64 << (index % 64));
        }
        next
    }
}

/// Maximum matching over a cluster's links.
struct Pairing {
    coords: Vec<Coord>,
    /// Linked indices of each tile, ascending.
    adjacency: Vec<Vec<usize>>,
    memo: HashMap<Free, usize>,
}

impl Pairing {
    fn new(links: &BTreeMap<Coord, Vec<Coord>>) -> Self {
        let coords: Vec<Coord> = links.keys().copied().collect();
        let index: BTreeMap<Coord, usize> = coords
            .iter()
            .enumerate()
            .map(|(position, coord)| (*coord, position))
            .collect();
        let adjacency = coords
            .iter()
            .map(|coord| {
                let mut linked: Vec<usize> = links[coord].iter().map(|next| index[next]).collect();
                linked.sort_unstable();
                linked
            })
            .collect();
        Self {
            coords,
            adjacency,
            memo: HashMap::new(),
        }
    }

    /// Most pairs that can still be formed from `free`.
    fn most_pairs(&mut self, free: &Free) -> usize {
        let Some(first) = free.lowest() else {
            return 0;
        };
        if let Some(&known) = self.memo.get(free) {
            return known;
        }
        let ceiling = free.count() / 2;
        let mut best = 0;
        for partner in self.partners(first, free) {
            best = best.max(1 + self.most_pairs(&free.without(&[first, partner])));
            if best == ceiling {
                break;
            }
        }
        if best < ceiling {
            best = best.max(self.most_pairs(&free.without(&[first])));
        }
        self.memo.insert(free.clone(), best);
        best
    }

    fn partners(&self, tile: usize, free: &Free) -> Vec<usize> {
        self.adjacency[tile]
            .iter()
            .copied()
            .filter(|next| free.contains(*next))
            .collect()
    }

    /// Walks the tiles in coordinate order, pairing each with its lowest
    /// partner that still allows the maximum.
    fn best_partition(mut self) -> Vec<Vec<Coord>> {
        let mut free = Free::full(self.coords.len());
        let mut remaining = self.most_pairs(&free);
        let mut parts = Vec::new();
        while let Some(first) = free.lowest() {
            let partner = if remaining == 0 {
                None
            } else {
                self.partners(first, &free).into_iter().find(|&partner| {
                    1 + self.most_pairs(&free.without(&[first, partner])) == remaining
                })
            };
            match partner {
                Some(partner) => {
                    parts.push(vec![self.coords[first], self.coords[partner]]);
                    free = free.without(&[first, partner]);
                    remaining -= 1;
                }
                None => {
                    parts.push(vec![self.coords[first]]);
                    free = free.without(&[first]);
                }
            }
        }
        parts
    }
}

fn greedy(
    mut free: BTreeSet<Coord>,
    links: &BTreeMap<Coord, Vec<Coord>>,
    cap: usize,
) -> Vec<Vec<Coord>> {
    let mut parts = Vec::new();
    loop {
        let Some(seed) = pick(&free, links, free.iter().copied()) else {
            break;
        };
        free.remove(&seed);
        let mut part = vec![seed];
        while part.len() < cap {
            let frontier: BTreeSet<Coord> = part
                .iter()
                .flat_map(|coord| links[coord].iter().copied())
                .filter(|coord| free.contains(coord))
                .collect();
            let Some(next) = pick(&free, links, frontier.into_iter()) else {
                break;
            };
            free.remove(&next);
            part.push(next);
        }
        part.sort();
        parts.push(part);
    }
    parts
}

fn free_degree(free: &BTreeSet<Coord>, links: &BTreeMap<Coord, Vec<Coord>>, coord: Coord) -> usize {
    links[&coord]
        .iter()
        .filter(|next| free.contains(next))
        .count()
}

fn pick(
    free: &BTreeSet<Coord>,
    links: &BTreeMap<Coord, Vec<Coord>>,
    candidates: impl Iterator<Item = Coord>,
) -> Option<Coord> {
    candidates.min_by_key(|&coord| (free_degree(free, links, coord), coord))
}
