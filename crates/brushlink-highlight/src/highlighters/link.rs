use std::collections::HashMap;

use brushlink_core::{shared, HighlightTechnique, MarkId, MarkRegistry, Shared};
use tracing::{debug, warn};

use super::Highlighter;
use crate::entity::EntityId;
use crate::visual::EntityVisual;

/// An edge from an entity to the mark that represents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkEdge {
    pub entity: EntityId,
    pub mark: MarkId,
}

/// Force-directed edge bundling backend.
///
/// Bundlers have no incremental update: any change to the edge set is a
/// full `reset` followed by `init` with every edge.
pub trait EdgeBundlingRenderer: std::fmt::Debug {
    fn reset(&mut self);

    fn init(&mut self, edges: &[LinkEdge]);
}

/// What a [`HeadlessBundler`] has been asked to do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BundlerLog {
    pub resets: usize,
    pub inits: usize,
    /// Edges passed to the latest `init`, empty after a `reset`.
    pub edges: Vec<LinkEdge>,
}

/// Bundler that renders nothing and records its calls.
#[derive(Debug, Default)]
pub struct HeadlessBundler {
    log: Shared<BundlerLog>,
}

impl HeadlessBundler {
    pub fn new() -> Self {
        Self {
            log: shared(BundlerLog::default()),
        }
    }

    /// Handle to the call log, readable after the bundler is boxed.
    pub fn log(&self) -> Shared<BundlerLog> {
        self.log.clone()
    }
}

impl EdgeBundlingRenderer for HeadlessBundler {
    fn reset(&mut self) {
        let mut log = self.log.borrow_mut();
        log.resets += 1;
        log.edges.clear();
    }

    fn init(&mut self, edges: &[LinkEdge]) {
        let mut log = self.log.borrow_mut();
        log.inits += 1;
        log.edges = edges.to_vec();
    }
}

/// Shared edge list for the link strategy, plus the name to mark lookup.
#[derive(Debug)]
pub struct LinkBoard {
    edges: Vec<LinkEdge>,
    marks_by_name: HashMap<String, MarkId>,
    renderer: Box<dyn EdgeBundlingRenderer>,
}

impl LinkBoard {
    pub fn new(renderer: Box<dyn EdgeBundlingRenderer>) -> Self {
        Self {
            edges: Vec::new(),
            marks_by_name: HashMap::new(),
            renderer,
        }
    }

    /// Drops every edge, clears the renderer and rebuilds the mark lookup.
    pub fn marks_changed(&mut self, registry: &dyn MarkRegistry) {
        self.edges.clear();
        self.renderer.reset();
        self.rebuild_lookup(registry);
    }

    /// Rebuilds the name to mark table. The first data mark for a name wins.
    pub fn rebuild_lookup(&mut self, registry: &dyn MarkRegistry) {
        self.marks_by_name.clear();
        for mark in registry.list_marks().into_iter().filter(|m| m.data_mark) {
            self.marks_by_name
                .entry(mark.entity_name.clone())
                .or_insert(mark.id);
        }
        debug!("Link lookup rebuilt with {} names", self.marks_by_name.len());
    }

    pub fn mark_for(&self, name: &str) -> Option<MarkId> {
        self.marks_by_name.get(name).copied()
    }

    pub fn has_edge(&self, entity: EntityId) -> bool {
        self.edges.iter().any(|e| e.entity == entity)
    }

    /// Adds an edge and reinitialises the renderer. No-op if the entity is
    /// already linked.
    pub fn add_edge(&mut self, edge: LinkEdge) -> bool {
        if self.has_edge(edge.entity) {
            return false;
        }
        self.edges.push(edge);
        self.renderer.reset();
        self.renderer.init(&self.edges);
        true
    }

    /// Removes the entity's edge. An emptied list leaves the renderer reset
    /// rather than initialised with nothing.
    pub fn remove_edge(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.edges.iter().position(|e| e.entity == entity) else {
            return false;
        };
        self.edges.remove(index);
        self.renderer.reset();
        if !self.edges.is_empty() {
            self.renderer.init(&self.edges);
        }
        true
    }

    pub fn edges(&self) -> &[LinkEdge] {
        &self.edges
    }
}

/// Links the entity to its mark through the shared [`LinkBoard`].
#[derive(Debug)]
pub struct LinkHighlighter {
    entity: EntityId,
    name: String,
    board: Shared<LinkBoard>,
}

impl LinkHighlighter {
    pub fn new(entity: EntityId, name: impl Into<String>, board: Shared<LinkBoard>) -> Self {
        Self {
            entity,
            name: name.into(),
            board,
        }
    }
}

impl Highlighter for LinkHighlighter {
    fn technique(&self) -> HighlightTechnique {
        HighlightTechnique::Link
    }

    fn highlight(&mut self, _visual: &mut EntityVisual) {
        let mut board = self.board.borrow_mut();
        if board.has_edge(self.entity) {
            return;
        }
        match board.mark_for(&self.name) {
            Some(mark) => {
                board.add_edge(LinkEdge {
                    entity: self.entity,
                    mark,
                });
            }
            None => warn!("No mark for '{}'; link not drawn", self.name),
        }
    }

    fn unhighlight(&mut self, _visual: &mut EntityVisual) {
        self.board.borrow_mut().remove_edge(self.entity);
    }

    fn is_highlighted(&self) -> bool {
        self.board.borrow().has_edge(self.entity)
    }
}
