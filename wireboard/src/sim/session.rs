//! Edit session: a board, its scheduler and the edits waiting for the next
//! cycle. Edits never touch an in-flight cycle; they are queued and applied
//! in submission order right before the network is rebuilt.

use std::collections::VecDeque;

use super::{CancelToken, Cancelled, Scheduler, SimulationReport};
use crate::board::{Board, ComponentId, EditError, WireColor, WireId, WireNodeId};
use crate::components::ComponentRegistry;
use crate::core::SimulationOptions;
use crate::geometry::{Point, Rotation};
use crate::snapshot::Library;

/// A queued board edit
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    AddComponent { type_id: String, position: Point },
    MoveComponent { id: ComponentId, position: Point },
    RotateComponent { id: ComponentId, rotation: Rotation },
    DeleteComponent(ComponentId),
    SetProperty { id: ComponentId, name: String, value: String },
    DrawWire { from: Point, to: Point, color: WireColor },
    DeleteWire(WireId),
    DeleteWireNode(WireNodeId),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEdit {
    pub edit: Edit,
    pub error: EditError,
}

/// Result of one session cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub simulation: SimulationReport,
    pub added: Vec<ComponentId>,
    pub rejected: Vec<RejectedEdit>,
}

#[derive(Debug)]
pub struct Session {
    board: Board,
    scheduler: Scheduler,
    registry: ComponentRegistry,
    library: Library,
    pending: VecDeque<Edit>,
    cancel: CancelToken,
}

impl Session {
    pub fn new(board: Board, options: SimulationOptions) -> Self {
        Self {
            board,
            scheduler: Scheduler::new(options),
            registry: ComponentRegistry::builtin(),
            library: Library::new(),
            pending: VecDeque::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Handle for cancelling the running or next cycle
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Queue an edit for the next cycle
    pub fn submit(&mut self, edit: Edit) {
        self.pending.push_back(edit);
    }

    pub fn pending_edits(&self) -> usize {
        self.pending.len()
    }

    /// Apply queued edits, then run a cycle. On cancellation the edits stay
    /// applied but no values are published, and the token is re-armed.
    pub fn run(&mut self) -> Result<CycleReport, Cancelled> {
        let mut added = Vec::new();
        let mut rejected = Vec::new();
        while let Some(edit) = self.pending.pop_front() {
            match self.apply(&edit) {
                Ok(Some(id)) => added.push(id),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!("Rejected edit {:?}: {}", edit, error);
                    rejected.push(RejectedEdit { edit, error });
                }
            }
        }

        let result = self.scheduler.run_with_cancel(&mut self.board, &self.cancel);
        if result.is_err() {
            self.cancel.reset();
        }
        Ok(CycleReport {
            simulation: result?,
            added,
            rejected,
        })
    }

    fn apply(&mut self, edit: &Edit) -> Result<Option<ComponentId>, EditError> {
        let board = &mut self.board;
        match edit {
            Edit::AddComponent { type_id, position } => board
                .add_component(&self.registry, &self.library, type_id, *position)
                .map(Some),
            Edit::MoveComponent { id, position } => board.move_component(*id, *position).map(|_| None),
            Edit::RotateComponent { id, rotation } => {
                board.rotate_component(*id, *rotation).map(|_| None)
            }
            Edit::DeleteComponent(id) => board.delete_component(*id).map(|_| None),
            Edit::SetProperty { id, name, value } => board.set_property(*id, name, value).map(|_| None),
            Edit::DrawWire { from, to, color } => {
                board.draw_wire(*from, *to, color.clone());
                Ok(None)
            }
            Edit::DeleteWire(id) => board.delete_wire(*id).map(|_| None),
            Edit::DeleteWireNode(id) => board.delete_wire_node(*id).map(|_| None),
            Edit::Clear => {
                board.clear();
                Ok(None)
            }
        }
    }
}
