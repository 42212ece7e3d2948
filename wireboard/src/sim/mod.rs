//! Simulation Scheduler
//!
//! One cycle walks `Idle -> Building -> Propagating -> Converged | Stalled -> Idle`.
//!
//! Passes are Jacobi-style: every component reads the node values published
//! at the start of the pass and writes its drives into a fresh buffer. The
//! buffer is resolved into the next node values only after every component
//! has run, so update order cannot bias the result. Components are always
//! visited in board insertion order.
//!
//! `Building` seeds the drives by evaluating every component once against an
//! all-floating board. The seed is not counted as a pass, so an acyclic board
//! settles within as many passes as it has components, the last of which
//! confirms that nothing changed.

mod session;

pub use session::{CycleReport, Edit, RejectedEdit, Session};

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, ComponentId, Published};
use crate::components::{Readout, TerminalIo, TerminalRole};
use crate::core::SimulationOptions;
use crate::network::{NetworkBuilder, NodeId};
use crate::signal::{branch_current, resolve, Signal};

/// Outcome of a completed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Converged,
    /// The pass bound was hit; node values are the last computed ones
    Stalled,
}

impl SimulationStatus {
    pub fn is_stable(&self) -> bool {
        matches!(self, SimulationStatus::Converged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Building,
    Propagating,
    Converged,
    Stalled,
}

/// Input terminal left without a driver after a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FloatingInput {
    pub component: ComponentId,
    pub terminal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub status: SimulationStatus,
    pub passes: usize,
    pub node_count: usize,
    pub floating_inputs: Vec<FloatingInput>,
}

/// Returned when a cycle was cancelled between passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Simulation cycle cancelled")]
pub struct Cancelled;

/// Shared flag for aborting a running cycle from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Checked by the scheduler before every pass
trait Interrupt {
    type Error;

    fn check(&self) -> Result<(), Self::Error>;
}

struct Uninterrupted;

impl Interrupt for Uninterrupted {
    type Error = Infallible;

    fn check(&self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl Interrupt for CancelToken {
    type Error = Cancelled;

    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    options: SimulationOptions,
    state: SchedulerState,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SimulationOptions::default())
    }
}

impl Scheduler {
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            options,
            state: SchedulerState::Idle,
        }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SimulationOptions) {
        self.options = options;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run one full cycle and publish its values to the board
    pub fn run(&mut self, board: &mut Board) -> SimulationReport {
        match self.cycle(board, &Uninterrupted) {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Run one cycle, checking `cancel` between passes. A cancelled cycle
    /// publishes nothing and skips `after_simulation`.
    pub fn run_with_cancel(
        &mut self,
        board: &mut Board,
        cancel: &CancelToken,
    ) -> Result<SimulationReport, Cancelled> {
        self.cycle(board, cancel)
    }

    fn cycle<I: Interrupt>(&mut self, board: &mut Board, interrupt: &I) -> Result<SimulationReport, I::Error> {
        let result = self.cycle_inner(board, interrupt);
        self.state = SchedulerState::Idle;
        result
    }

    fn cycle_inner<I: Interrupt>(
        &mut self,
        board: &mut Board,
        interrupt: &I,
    ) -> Result<SimulationReport, I::Error> {
        self.state = SchedulerState::Building;
        let network = NetworkBuilder::build(board);
        let node_count = network.node_count();
        let layout: Vec<Vec<NodeId>> = network.component_nodes().to_vec();

        for slot in board.components_mut() {
            slot.component_mut().before_simulation(&self.options);
        }

        let (mut drives, mut closed) = evaluate(board, &layout, &vec![Signal::Floating; node_count]);
        let mut groups = NodeGroups::merge(node_count, &layout, &closed);
        let mut values = groups.resolve(&layout, &drives);

        self.state = SchedulerState::Propagating;
        let mut passes = 0;
        let mut status = if layout.is_empty() {
            SimulationStatus::Converged
        } else {
            SimulationStatus::Stalled
        };

        while status == SimulationStatus::Stalled && passes < self.options.max_passes {
            interrupt.check()?;
            passes += 1;

            let (next_drives, next_closed) = evaluate(board, &layout, &values);
            groups = NodeGroups::merge(node_count, &layout, &next_closed);
            let next_values = groups.resolve(&layout, &next_drives);

            let changed = next_drives != drives || next_closed != closed || next_values != values;
            drives = next_drives;
            closed = next_closed;
            values = next_values;

            tracing::debug!("Pass {}: changed = {}", passes, changed);
            if !changed {
                status = SimulationStatus::Converged;
            }
        }
        interrupt.check()?;

        self.state = match status {
            SimulationStatus::Converged => SchedulerState::Converged,
            SimulationStatus::Stalled => SchedulerState::Stalled,
        };
        match status {
            SimulationStatus::Converged => {
                tracing::info!("Converged after {} passes over {} nodes", passes, node_count)
            }
            SimulationStatus::Stalled => tracing::warn!(
                "No convergence within {} passes; keeping last values",
                self.options.max_passes
            ),
        }

        let currents = groups.node_currents(board, &layout, &values);
        let mut floating_inputs = Vec::new();
        for (slot, nodes) in board.components_mut().zip(&layout) {
            let signals: Vec<Signal> = nodes.iter().map(|n| values[n.0]).collect();
            let amps: Vec<f64> = nodes.iter().map(|n| currents[n.0]).collect();

            if self.options.report_floating {
                for (terminal, info) in slot.component().terminals().iter().enumerate() {
                    if info.role == TerminalRole::Input && signals[terminal].is_floating() {
                        floating_inputs.push(FloatingInput {
                            component: slot.id(),
                            terminal,
                        });
                    }
                }
            }

            let component = slot.component_mut();
            if let Some(switch) = component.switch_like() {
                let amps = if switch.is_closed() {
                    amps.first().copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                switch.set_current(amps);
            }
            component.after_simulation(&Readout::new(&signals, &amps));
        }

        board.publish(Published {
            status,
            passes,
            values,
        });

        Ok(SimulationReport {
            status,
            passes,
            node_count,
            floating_inputs,
        })
    }
}

/// Update every component against `values`, in board insertion order.
/// Returns the drives per terminal and the closed flag per component.
fn evaluate(board: &mut Board, layout: &[Vec<NodeId>], values: &[Signal]) -> (Vec<Vec<Signal>>, Vec<bool>) {
    let mut drives = Vec::with_capacity(layout.len());
    let mut closed = Vec::with_capacity(layout.len());
    for (slot, nodes) in board.components_mut().zip(layout) {
        let inputs: Vec<Signal> = nodes.iter().map(|n| values[n.0]).collect();
        let mut out = vec![Signal::Floating; nodes.len()];
        let component = slot.component_mut();
        component.update(&mut TerminalIo::new(&inputs, &mut out));
        drives.push(out);
        closed.push(component.switch_like().map_or(false, |s| s.is_closed()));
    }
    (drives, closed)
}

/// Electrical nodes joined for one pass by closed switch contacts
struct NodeGroups {
    roots: Vec<usize>,
}

impl NodeGroups {
    fn merge(node_count: usize, layout: &[Vec<NodeId>], closed: &[bool]) -> Self {
        let mut sets: UnionFind<usize> = UnionFind::new(node_count);
        for (nodes, &is_closed) in layout.iter().zip(closed) {
            if let (true, Some(a), Some(b)) = (is_closed, nodes.first(), nodes.get(1)) {
                sets.union(a.0, b.0);
            }
        }
        Self {
            roots: (0..node_count).map(|n| sets.find_mut(n)).collect(),
        }
    }

    /// Resolve every drive per group, in component then terminal order
    fn resolve(&self, layout: &[Vec<NodeId>], drives: &[Vec<Signal>]) -> Vec<Signal> {
        let mut per_group: Vec<Vec<Signal>> = vec![Vec::new(); self.roots.len()];
        for (nodes, out) in layout.iter().zip(drives) {
            for (node, drive) in nodes.iter().zip(out) {
                per_group[self.roots[node.0]].push(*drive);
            }
        }
        let resolved: Vec<Signal> = per_group.into_iter().map(resolve).collect();
        self.roots.iter().map(|root| resolved[*root]).collect()
    }

    /// Sum of absolute branch currents of resistive elements touching each
    /// group, each element counted once per group
    fn node_currents(&self, board: &Board, layout: &[Vec<NodeId>], values: &[Signal]) -> Vec<f64> {
        let mut per_group = vec![0.0; self.roots.len()];
        for (slot, nodes) in board.components().zip(layout) {
            let Some(resistance) = slot.component().capabilities().resistance else {
                continue;
            };
            let (Some(a), Some(b)) = (nodes.first(), nodes.get(1)) else {
                continue;
            };
            let amps = branch_current(values[a.0], values[b.0], resistance).abs();
            let (ga, gb) = (self.roots[a.0], self.roots[b.0]);
            per_group[ga] += amps;
            if gb != ga {
                per_group[gb] += amps;
            }
        }
        self.roots.iter().map(|root| per_group[*root]).collect()
    }
}
