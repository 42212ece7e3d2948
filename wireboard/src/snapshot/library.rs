//! Custom component definitions and the library that resolves them by id

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BoardSnapshot, BuildError};
use crate::board::Board;
use crate::components::registry::CUSTOM_PREFIX;

/// A saved sub-circuit exposed as a component with named ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub board: BoardSnapshot,
}

impl CustomDefinition {
    /// New definition with a fresh random id
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        board: BoardSnapshot,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, inputs, outputs, board)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        board: BoardSnapshot,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs,
            outputs,
            board,
        }
    }

    /// Registry type id of instances of this definition
    pub fn type_id(&self) -> String {
        format!("{}{}", CUSTOM_PREFIX, self.id)
    }

    pub(crate) fn same_content(&self, other: &CustomDefinition) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.board.same_content(&other.board)
    }

    /// Definition ids referenced by components of the definition's board
    fn references(&self) -> impl Iterator<Item = &str> {
        self.board
            .components
            .iter()
            .filter_map(|c| c.type_id.strip_prefix(CUSTOM_PREFIX))
    }
}

/// Custom definitions by id
#[derive(Debug, Clone, Default)]
pub struct Library {
    definitions: BTreeMap<String, CustomDefinition>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every definition carried by a snapshot, nested ones included
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BuildError> {
        let mut library = Self::new();
        for definition in &snapshot.definitions {
            library.insert(definition.clone())?;
        }
        Ok(library)
    }

    /// Add a definition and the definitions nested in its board. Stored
    /// boards keep no nested definition lists of their own. A definition
    /// that is already present is accepted again only with identical content.
    pub fn insert(&mut self, mut definition: CustomDefinition) -> Result<(), BuildError> {
        let nested = std::mem::take(&mut definition.board.definitions);
        match self.definitions.get(&definition.id) {
            Some(existing) if existing.same_content(&definition) => {}
            Some(_) => return Err(BuildError::DuplicateDefinition(definition.id)),
            None => {
                self.definitions.insert(definition.id.clone(), definition);
            }
        }
        for inner in nested {
            self.insert(inner)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CustomDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomDefinition> {
        self.definitions.values()
    }

    /// Every definition, flat and in id order
    pub fn to_vec(&self) -> Vec<CustomDefinition> {
        self.definitions.values().cloned().collect()
    }

    /// Definitions a board uses, directly or through other definitions, in id
    /// order. Unknown ids are skipped.
    pub fn used_by(&self, board: &Board) -> Vec<CustomDefinition> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<String> = board
            .components()
            .filter_map(|slot| slot.component().kind().strip_prefix(CUSTOM_PREFIX))
            .map(str::to_string)
            .collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(definition) = self.definitions.get(&id) {
                stack.extend(definition.references().map(str::to_string));
            }
        }
        seen.iter()
            .filter_map(|id| self.definitions.get(id))
            .cloned()
            .collect()
    }
}
