// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Autopilot modes bound to action groups.
//!
//! A vessel is a tree of parts. Several parts carry a mode switch that, when its action
//! group fires, sets the vessel's single shared autopilot mode. Every switch receives
//! the event, so the resolver picks the one that acts: the switch closest to the root,
//! then the one with the lower mode number. Staging drops a subtree and hands the
//! group to another switch.
//!
//! Run:
//! - `cargo run -p understory_demos --example autopilot_modes`
//! - `RUST_LOG=info cargo run -p understory_demos --example autopilot_modes`

use understory_arbiter::dispatch::{Outcome, trigger};
use understory_arbiter::ranking::{DepthThenPriority, Prioritized};
use understory_arbiter::resolver::Resolver;
use understory_arbiter::types::Orderable;
use understory_attach_tree::{ComponentId, NodeId, Tree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ActionGroup {
    Custom01,
    Custom02,
    Custom03,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum AutopilotMode {
    StabilityAssist = 0,
    Prograde = 1,
    Retrograde = 2,
    Normal = 3,
    RadialOut = 5,
    Target = 7,
}

/// A part module that sets the autopilot when one of its action groups fires.
#[derive(Debug)]
struct ModeSwitch {
    part: &'static str,
    mode: AutopilotMode,
    groups: &'static [ActionGroup],
}

impl Orderable<ActionGroup> for ModeSwitch {
    fn declares_interest(&self, key: &ActionGroup) -> bool {
        self.groups.contains(key)
    }
}

impl Prioritized for ModeSwitch {
    fn priority(&self) -> u32 {
        self.mode as u32
    }
}

/// The vessel-wide autopilot every switch writes to.
#[derive(Debug)]
struct Autopilot {
    mode: AutopilotMode,
    available: &'static [AutopilotMode],
}

impl Autopilot {
    fn set_mode(&mut self, mode: AutopilotMode) -> bool {
        if !self.available.contains(&mode) {
            return false;
        }
        self.mode = mode;
        true
    }
}

type Arbiter = Resolver<ActionGroup, ComponentId, DepthThenPriority>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut vessel = Tree::new();
    let pod = vessel.insert(None);
    let service_bay = vessel.insert(Some(pod));
    let decoupler = vessel.insert(Some(pod));
    let upper_core = vessel.insert(Some(service_bay));
    let lower_core = vessel.insert(Some(decoupler));

    let names = [
        (pod, "pod"),
        (service_bay, "service bay"),
        (decoupler, "decoupler"),
        (upper_core, "upper core"),
        (lower_core, "lower core"),
    ];

    let pod_retro = vessel
        .attach(
            pod,
            switch("pod", AutopilotMode::Retrograde, &[ActionGroup::Custom01]),
        )
        .expect("pod is live");
    let upper_radial = vessel
        .attach(
            upper_core,
            switch(
                "upper core",
                AutopilotMode::RadialOut,
                &[ActionGroup::Custom01, ActionGroup::Custom02],
            ),
        )
        .expect("upper core is live");
    let lower_prograde = vessel
        .attach(
            lower_core,
            switch(
                "lower core",
                AutopilotMode::Prograde,
                &[ActionGroup::Custom01, ActionGroup::Custom02],
            ),
        )
        .expect("lower core is live");
    vessel
        .attach(
            lower_core,
            switch(
                "lower core",
                AutopilotMode::Target,
                &[ActionGroup::Custom03],
            ),
        )
        .expect("lower core is live");

    print_ascii_tree(&vessel, &names);

    let mut autopilot = Autopilot {
        mode: AutopilotMode::StabilityAssist,
        available: &[
            AutopilotMode::StabilityAssist,
            AutopilotMode::Prograde,
            AutopilotMode::Retrograde,
            AutopilotMode::Normal,
            AutopilotMode::RadialOut,
        ],
    };
    let mut arbiter = Arbiter::new(DepthThenPriority);

    // The pod is closest to the root.
    let acted = fire(&vessel, &mut arbiter, &mut autopilot, ActionGroup::Custom01);
    assert_eq!(acted, Some(pod_retro));
    assert_eq!(autopilot.mode, AutopilotMode::Retrograde);

    // Both cores are two hops down; prograde has the lower mode number.
    let acted = fire(&vessel, &mut arbiter, &mut autopilot, ActionGroup::Custom02);
    assert_eq!(acted, Some(lower_prograde));
    assert_eq!(autopilot.mode, AutopilotMode::Prograde);

    // No target is selected, so the winner cannot apply its mode.
    let acted = fire(&vessel, &mut arbiter, &mut autopilot, ActionGroup::Custom03);
    assert_eq!(acted, None);
    assert_eq!(autopilot.mode, AutopilotMode::Prograde);

    println!("\n== Staging: decoupler fires ==");
    vessel.remove(decoupler);
    print_ascii_tree(&vessel, &names);

    // The changed counts invalidate the cache; the upper core takes over.
    let acted = fire(&vessel, &mut arbiter, &mut autopilot, ActionGroup::Custom02);
    assert_eq!(acted, Some(upper_radial));
    assert_eq!(autopilot.mode, AutopilotMode::RadialOut);

    // A switch left on the discarded stage never acts.
    let outcome = trigger(
        &mut arbiter,
        &vessel,
        lower_prograde,
        ActionGroup::Custom02,
        |s: &ModeSwitch| autopilot.set_mode(s.mode),
    );
    assert_eq!(outcome, Outcome::Detached);

    let stats = arbiter.stats();
    println!(
        "\nqueries={} hits={} scans={} invalidations={}",
        stats.queries, stats.hits, stats.scans, stats.invalidations
    );
}

fn switch(part: &'static str, mode: AutopilotMode, groups: &'static [ActionGroup]) -> ModeSwitch {
    ModeSwitch { part, mode, groups }
}

/// Deliver `group` to every attached switch in walk order, as the game loop would.
///
/// Returns the switch that applied its mode, if any.
fn fire(
    vessel: &Tree<ModeSwitch>,
    arbiter: &mut Arbiter,
    autopilot: &mut Autopilot,
    group: ActionGroup,
) -> Option<ComponentId> {
    println!("\n== {group:?} ==");
    let mut applied = None;
    for (node, _) in vessel.walk() {
        for &id in vessel.components(node) {
            let Some(switch) = vessel.component(id) else {
                continue;
            };
            if !switch.declares_interest(&group) {
                continue;
            }
            let outcome = trigger(arbiter, vessel, id, group, |s: &ModeSwitch| {
                autopilot.set_mode(s.mode)
            });
            let mode = format!("{:?}", switch.mode);
            println!("  {:<11} {mode:<10} {outcome:?}", switch.part);
            if outcome == Outcome::Applied {
                applied = Some(id);
            }
        }
    }
    println!("  autopilot: {:?}", autopilot.mode);
    applied
}

fn print_ascii_tree(vessel: &Tree<ModeSwitch>, names: &[(NodeId, &str)]) {
    println!("Vessel:");
    let name_of = |id: NodeId| {
        names
            .iter()
            .find(|(n, _)| *n == id)
            .map_or("?", |(_, name)| *name)
    };
    for (node, depth) in vessel.walk() {
        let indent: String = (0..depth).map(|_| "    ").collect();
        let branch = if depth == 0 { "" } else { "└── " };
        let modes: Vec<_> = vessel
            .components(node)
            .iter()
            .filter_map(|&c| vessel.component(c))
            .map(|s| s.mode)
            .collect();
        println!("{indent}{branch}{} {:?}", name_of(node), modes);
    }
}
