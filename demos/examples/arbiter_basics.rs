// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbiter basics.
//!
//! Build a small tree, attach components that compete for the same keys, and ask the
//! resolver which one may act.
//!
//! Run:
//! - `cargo run -p understory_demos --example arbiter_basics`
//! - `RUST_LOG=understory_arbiter=trace cargo run -p understory_demos --example arbiter_basics`

use understory_arbiter::ranking::Unranked;
use understory_arbiter::resolver::Resolver;
use understory_arbiter::types::Orderable;
use understory_attach_tree::{ComponentId, NodeId, Tree};

/// A light bound to a set of switches.
#[derive(Debug)]
struct Light {
    name: &'static str,
    switches: &'static [char],
}

impl Orderable<char> for Light {
    fn declares_interest(&self, key: &char) -> bool {
        self.switches.contains(key)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut tree = Tree::new();
    let hall = tree.insert(None);
    let kitchen = tree.insert(Some(hall));
    let study = tree.insert(Some(hall));

    let ceiling = attach(&mut tree, kitchen, "ceiling", &['a', 'b']);
    let counter = attach(&mut tree, kitchen, "counter", &['a']);
    let desk = attach(&mut tree, study, "desk", &['b', 'c']);

    print_ascii_tree(&tree);

    let mut resolver: Resolver<char, ComponentId, _> = Resolver::new(Unranked);
    for key in ['a', 'b', 'c'] {
        println!("\n== Switch {key:?} ==");
        for id in [ceiling, counter, desk] {
            let light = tree.component(id).expect("component is live");
            if !light.declares_interest(&key) {
                continue;
            }
            let verdict = if resolver.has_conflict(&tree, id, key) {
                "stands down"
            } else {
                "acts"
            };
            println!("  {:<8} {verdict}", light.name);
        }
    }

    // `ceiling` and `counter` share a node; the lower position wins switch 'a'.
    assert!(!resolver.has_conflict(&tree, ceiling, 'a'));
    assert!(resolver.has_conflict(&tree, counter, 'a'));
    // `ceiling` sits on an older node than `desk`.
    assert_eq!(resolver.winner(&tree, desk, 'b'), Some(ceiling));

    // Moving the ceiling light out of the tree hands switch 'b' to the desk lamp.
    tree.detach(ceiling).expect("component is live");
    assert!(resolver.has_conflict(&tree, ceiling, 'b'));
    assert!(!resolver.has_conflict(&tree, desk, 'b'));
    println!("\nAfter detaching the ceiling light, switch 'b' goes to the desk lamp.");

    let stats = resolver.stats();
    println!(
        "\nqueries={} hits={} scans={} invalidations={}",
        stats.queries, stats.hits, stats.scans, stats.invalidations
    );
}

fn attach(
    tree: &mut Tree<Light>,
    node: NodeId,
    name: &'static str,
    switches: &'static [char],
) -> ComponentId {
    tree.attach(node, Light { name, switches })
        .expect("node is live")
}

fn print_ascii_tree(tree: &Tree<Light>) {
    println!("Tree:");
    fn go(tree: &Tree<Light>, node: NodeId, prefix: &str, branch: &str, last: bool) {
        let lights: Vec<&str> = tree
            .components(node)
            .iter()
            .filter_map(|&c| tree.component(c))
            .map(|l| l.name)
            .collect();
        println!(
            "{prefix}{branch}node #{} {:?}",
            tree.persistent_id(node).map_or(0, |p| p.get()),
            lights
        );
        let next_prefix = if branch.is_empty() {
            String::new()
        } else if last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        let kids = tree.children(node);
        for (i, &k) in kids.iter().enumerate() {
            let last = i + 1 == kids.len();
            let branch = if last { "└── " } else { "├── " };
            go(tree, k, &next_prefix, branch, last);
        }
    }
    for root in tree.roots() {
        go(tree, root, "", "", true);
    }
    println!("Components: {}", tree.attachment_count());
}
