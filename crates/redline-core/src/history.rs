//! Transaction-grouped undo.
//!
//! [`Document::transact`] records one restore point for an entire closure,
//! however many primitive mutations it performs, and suppresses
//! normalization until the outermost transaction ends — a multi-step
//! tagging operation is one undoable unit and is never observed
//! half-applied.  Nested transactions fold into the outermost one.

use crate::constants::MAX_UNDO_DEPTH;
use crate::document::Document;
use crate::node::Node;
use crate::path::Range;

#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    children: Vec<Node>,
    selection: Option<Range>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    undos: Vec<Snapshot>,
    redos: Vec<Snapshot>,
}

impl History {
    fn record(&mut self, snapshot: Snapshot) {
        self.undos.push(snapshot);
        if self.undos.len() > MAX_UNDO_DEPTH {
            self.undos.remove(0);
        }
        self.redos.clear();
    }
}

impl Document {
    /// Run `f` as one atomic edit: one restore point on the undo stack, no
    /// normalization until the closure (and any nested transactions)
    /// completes.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.tx_depth == 0 {
            self.history.record(Snapshot {
                children: self.children.clone(),
                selection: self.selection.clone(),
            });
        }
        self.tx_depth += 1;
        let out = self.without_normalizing(f);
        self.tx_depth -= 1;
        out
    }

    /// Restore the last pre-transaction state.  Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undos.pop() else {
            return false;
        };
        let current = Snapshot {
            children: std::mem::take(&mut self.children),
            selection: self.selection.take(),
        };
        self.history.redos.push(current);
        self.children = snapshot.children;
        self.selection = snapshot.selection;
        true
    }

    /// Reapply the last undone transaction.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redos.pop() else {
            return false;
        };
        let current = Snapshot {
            children: std::mem::take(&mut self.children),
            selection: self.selection.take(),
        };
        self.history.undos.push(current);
        self.children = snapshot.children;
        self.selection = snapshot.selection;
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
