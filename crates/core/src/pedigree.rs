//! Pedigree (ancestry) tree construction.
//!
//! Builds a display tree rooted at one animal by following `mother_id` and
//! `father_id` through a flat list of records. The records come from an
//! external store and may reference missing animals or contain cycles, so
//! the walk is iterative with an explicit path stack: an edge pointing at an
//! animal already on the current root-to-node path is dropped and that
//! branch ends there.
//!
//! An ancestor reachable through two different paths (e.g. a bull that is
//! both grandsire and great-grandsire) appears under each path; only true
//! cycles are cut. Because shared ancestors are repeated, the output of a
//! densely inbred herd grows quickly, so [`PedigreeLimits`] caps both the
//! number of nodes and the number of generations. A branch that hits a cap
//! ends as a leaf flagged with [`PedigreeNode::truncated`].
//!
//! The tree is stored as a flat arena in pre-order with index links, so
//! building, dropping, cloning and comparing never recurse.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::animal::Animal;
use crate::types::AnimalId;

/// Which parent slot a node occupies under its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParentRole {
    Mother,
    Father,
}

impl ParentRole {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Mother => "Madre",
            Self::Father => "Padre",
        }
    }
}

/// Upper bounds on the size of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeLimits {
    /// Total nodes, root included.
    pub max_nodes: usize,
    /// Generations shown, counting the root as 1.
    pub max_generations: usize,
}

impl PedigreeLimits {
    pub const DEFAULT_MAX_NODES: usize = 255;
    pub const DEFAULT_MAX_GENERATIONS: usize = 12;

    /// No practical limit.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_nodes: usize::MAX,
            max_generations: usize::MAX,
        }
    }
}

impl Default for PedigreeLimits {
    fn default() -> Self {
        Self {
            max_nodes: Self::DEFAULT_MAX_NODES,
            max_generations: Self::DEFAULT_MAX_GENERATIONS,
        }
    }
}

/// One animal in the pedigree tree.
///
/// Parent links are indexes into the owning [`Pedigree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PedigreeNode {
    pub id: AnimalId,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    /// Distance from the root; the root is 0.
    pub depth: usize,
    /// Slot under the child; `None` for the root.
    pub role: Option<ParentRole>,
    pub mother: Option<usize>,
    pub father: Option<usize>,
    /// A parent reference was dropped because it led back onto the path.
    pub cycle_cut: bool,
    /// A known parent was left out because the tree hit its size limits.
    pub truncated: bool,
}

impl PedigreeNode {
    fn leaf(animal: &Animal, depth: usize, role: Option<ParentRole>) -> Self {
        Self {
            id: animal.id,
            name: animal.name.clone(),
            species: animal.species.clone(),
            breed: animal.breed.clone(),
            age: animal.age,
            depth,
            role,
            mother: None,
            father: None,
            cycle_cut: false,
            truncated: false,
        }
    }

    /// Display attributes, with `N/A` for unknown values.
    #[must_use]
    pub fn attributes(&self) -> [(&'static str, String); 3] {
        [
            ("Especie", self.species.clone()),
            ("Raza", self.breed.clone().unwrap_or_else(|| "N/A".to_owned())),
            ("Edad", self.age.map_or_else(|| "N/A".to_owned(), |a| a.to_string())),
        ]
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }
}

/// An ancestry tree, flattened in pre-order (mother before father).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pedigree {
    nodes: Vec<PedigreeNode>,
}

impl Pedigree {
    /// The animal the tree was built for.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // built with the root at 0, never shrinks
    pub fn root(&self) -> &PedigreeNode {
        &self.nodes[0]
    }

    #[must_use]
    pub fn mother_of(&self, node: &PedigreeNode) -> Option<&PedigreeNode> {
        node.mother.and_then(|i| self.nodes.get(i))
    }

    #[must_use]
    pub fn father_of(&self, node: &PedigreeNode) -> Option<&PedigreeNode> {
        node.father.and_then(|i| self.nodes.get(i))
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of generations shown, counting the root as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(1)
    }

    /// Whether any branch was cut short by the size limits.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.nodes.iter().any(|n| n.truncated)
    }

    /// Pre-order listing for rendering as an indented list.
    #[must_use]
    pub fn rows(&self) -> &[PedigreeNode] {
        &self.nodes
    }
}

struct Frame<'a> {
    animal: &'a Animal,
    index: usize,
    depth: usize,
    next: Option<ParentRole>,
}

impl<'a> Frame<'a> {
    const fn new(animal: &'a Animal, index: usize, depth: usize) -> Self {
        Self {
            animal,
            index,
            depth,
            next: Some(ParentRole::Mother),
        }
    }

    /// Yield the next parent slot to resolve, advancing the cursor.
    fn advance(&mut self) -> Option<(ParentRole, Option<AnimalId>)> {
        let role = self.next?;
        self.next = match role {
            ParentRole::Mother => Some(ParentRole::Father),
            ParentRole::Father => None,
        };
        let id = match role {
            ParentRole::Mother => self.animal.mother_id,
            ParentRole::Father => self.animal.father_id,
        };
        Some((role, id))
    }
}

/// Build the pedigree tree of `root` from a flat list of animals.
///
/// Returns `None` when `root` is not in `animals`. Unresolvable parent ids
/// are treated as unknown parents; edges that would revisit an animal
/// already on the current path are dropped and flagged with
/// [`PedigreeNode::cycle_cut`]. Parents beyond `limits` are flagged with
/// [`PedigreeNode::truncated`].
#[must_use]
pub fn build_pedigree(
    animals: &[Animal],
    root: AnimalId,
    limits: PedigreeLimits,
) -> Option<Pedigree> {
    let index: HashMap<AnimalId, &Animal> = animals.iter().map(|a| (a.id, a)).collect();
    let root_animal = *index.get(&root)?;

    let mut nodes = vec![PedigreeNode::leaf(root_animal, 0, None)];
    let mut on_path: HashSet<AnimalId> = HashSet::from([root_animal.id]);
    let mut stack = vec![Frame::new(root_animal, 0, 0)];

    while let Some(frame) = stack.last_mut() {
        let Some((role, parent_id)) = frame.advance() else {
            if let Some(done) = stack.pop() {
                on_path.remove(&done.animal.id);
            }
            continue;
        };
        let (child, depth) = (frame.index, frame.depth + 1);

        let Some(parent) = parent_id.and_then(|id| index.get(&id).copied()) else {
            continue;
        };
        let slot = nodes.len();
        let Some(node) = nodes.get_mut(child) else {
            continue;
        };
        if on_path.contains(&parent.id) {
            node.cycle_cut = true;
            continue;
        }
        if slot >= limits.max_nodes || depth >= limits.max_generations {
            node.truncated = true;
            continue;
        }

        match role {
            ParentRole::Mother => node.mother = Some(slot),
            ParentRole::Father => node.father = Some(slot),
        }
        nodes.push(PedigreeNode::leaf(parent, depth, Some(role)));
        on_path.insert(parent.id);
        stack.push(Frame::new(parent, slot, depth));
    }

    Some(Pedigree { nodes })
}
