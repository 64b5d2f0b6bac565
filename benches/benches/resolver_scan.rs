// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_arbiter::ranking::{DepthThenPriority, Prioritized, Unranked};
use understory_arbiter::resolver::Resolver;
use understory_arbiter::types::{FingerprintSources, Orderable};
use understory_attach_tree::{ComponentId, Tree};

const KEYS: u8 = 8;

struct Switch {
    key: u8,
    priority: u32,
}

impl Orderable<u8> for Switch {
    fn declares_interest(&self, key: &u8) -> bool {
        *key == self.key
    }
}

impl Prioritized for Switch {
    fn priority(&self) -> u32 {
        self.priority
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Random tree of `n` nodes with one switch per node.
fn gen_tree(n: usize, seed: u64) -> (Tree<Switch>, Vec<ComponentId>) {
    let mut rng = Rng::new(seed);
    let mut tree = Tree::new();
    let mut nodes = Vec::with_capacity(n);
    let mut switches = Vec::with_capacity(n);
    for i in 0..n {
        let parent = if i == 0 {
            None
        } else {
            Some(nodes[rng.below(i)])
        };
        let node = tree.insert(parent);
        nodes.push(node);
        let switch = Switch {
            key: (rng.next_u64() % u64::from(KEYS)) as u8,
            priority: (rng.next_u64() % 16) as u32,
        };
        switches.push(tree.attach(node, switch).unwrap());
    }
    (tree, switches)
}

fn bench_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached");
    for &n in &[64usize, 512, 4096] {
        let (tree, switches) = gen_tree(n, 0x9E37_79B9);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("has_conflict_n{}", n), |b| {
            let mut resolver = Resolver::new(DepthThenPriority);
            b.iter(|| {
                let mut winners = 0_usize;
                for &id in &switches {
                    let key = tree.component(id).unwrap().key;
                    if !resolver.has_conflict(&tree, id, key) {
                        winners += 1;
                    }
                }
                black_box(winners);
            });
        });
    }
    group.finish();
}

fn bench_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncached");
    for &n in &[64usize, 512, 4096] {
        let (tree, switches) = gen_tree(n, 0x9E37_79B9);
        let first = switches[0];
        let key = tree.component(first).unwrap().key;
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("scan_depth_priority_n{}", n), |b| {
            let mut resolver = Resolver::new(DepthThenPriority);
            b.iter(|| {
                resolver.clear();
                black_box(resolver.winner(&tree, first, key));
            });
        });
        group.bench_function(format!("scan_unranked_n{}", n), |b| {
            let mut resolver = Resolver::new(Unranked);
            b.iter(|| {
                resolver.clear();
                black_box(resolver.winner(&tree, first, key));
            });
        });
    }
    group.finish();
}

fn bench_edit_then_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_then_query");
    for sources in [FingerprintSources::NODES, FingerprintSources::VERSION] {
        let label = if sources == FingerprintSources::NODES {
            "nodes"
        } else {
            "version"
        };
        group.bench_function(format!("detach_reattach_{}", label), |b| {
            b.iter_batched(
                || gen_tree(512, 0xDEAD_BEEF),
                |(mut tree, switches)| {
                    let mut resolver = Resolver::with_fingerprint(DepthThenPriority, sources);
                    for &id in switches.iter().step_by(7) {
                        let owner = tree.owner_of(id).unwrap();
                        tree.detach(id).unwrap();
                        tree.reattach(id, owner).unwrap();
                        let key = tree.component(id).unwrap().key;
                        black_box(resolver.has_conflict(&tree, id, key));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cached, bench_uncached, bench_edit_then_query);
criterion_main!(benches);
