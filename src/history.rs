//! Linear undo/redo over full-graph snapshots.
//!
//! Every boundary condition (empty stack, inactive session, restore in
//! progress) is a silent no-op; the history surface defines no error kinds.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::filters::FilterIndex;
use crate::graph::Element;
use crate::keymap::{self, HistoryAction, KeyEvent};
use crate::store::{ElementStore, SaveOptions};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// An immutable deep copy of the element collection plus a cheap content hash.
///
/// The hash is an order-sensitive FNV-1a over a canonical field walk; it is a
/// dedup pre-check, not a collision-resistant digest.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Snapshot {
    elements: Vec<Element>,
    hash: u64,
}

impl Snapshot {
    pub fn capture(elements: &[Element]) -> Self {
        Self {
            elements: elements.to_vec(),
            hash: content_hash(elements),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

pub fn content_hash(elements: &[Element]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for element in elements {
        match element {
            Element::Service(service) => {
                hash = fnv_str(hash, "s");
                hash = fnv_str(hash, &service.id);
                hash = fnv_str(hash, &service.name);
                hash = fnv_str(hash, &service.labels.len().to_string());
                for label in &service.labels {
                    hash = fnv_str(hash, label);
                }
                hash = fnv_str(hash, &service.tier.to_string());
                hash = fnv_opt(hash, service.owner.as_deref());
                hash = fnv_opt(hash, service.app_code.as_deref());
                hash = fnv_opt(hash, service.repo_url.as_deref());
                hash = fnv_opt(hash, service.comment.as_deref());
                hash = fnv_str(hash, if service.verified { "1" } else { "0" });
            }
            Element::Dependency(edge) => {
                hash = fnv_str(hash, "d");
                hash = fnv_str(hash, &edge.id);
            }
        }
    }
    hash
}

fn fnv_str(mut hash: u64, value: &str) -> u64 {
    for byte in value.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    // Field separator, so adjacent fields cannot shift content between them.
    hash ^= 0x1f;
    hash.wrapping_mul(FNV_PRIME)
}

fn fnv_opt(hash: u64, value: Option<&str>) -> u64 {
    match value {
        Some(v) => fnv_str(fnv_str(hash, "+"), v),
        None => fnv_str(hash, "-"),
    }
}

/// The live graph model: bulk removal/insertion plus transient-state clearing.
pub trait GraphSurface {
    fn remove_all(&mut self);
    fn insert_elements(&mut self, elements: &[Element]);
    fn clear_selection(&mut self);
    fn clear_dimming(&mut self);
}

/// The node detail panel; a restore only ever hides it.
pub trait DetailPanel {
    fn hide(&mut self);
}

/// Receives the one-line status message after a restore.
pub trait StatusSink {
    fn status(&mut self, message: &str);
}

/// The collaborators a snapshot restore drives, borrowed per operation so the
/// caller keeps ownership of its UI objects between calls.
pub struct RestoreContext<'a> {
    pub surface: &'a mut dyn GraphSurface,
    pub label_index: &'a mut dyn FilterIndex,
    pub owner_index: &'a mut dyn FilterIndex,
    pub panel: &'a mut dyn DetailPanel,
    pub store: &'a mut dyn ElementStore,
    pub status: &'a mut dyn StatusSink,
}

/// Undo/redo state for one graph-editing session.
///
/// `past` always holds at least the baseline snapshot once initialized, so
/// undo can stop gracefully without emptying the stack.
pub struct HistorySession {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    enabled: bool,
    restoring: bool,
    limit: usize,
}

impl Default for HistorySession {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            enabled: false,
            restoring: false,
            limit: limit.max(1),
        }
    }

    /// Reset the session around a baseline snapshot and activate it.
    pub fn initialize(&mut self, elements: &[Element]) {
        self.past.clear();
        self.future.clear();
        self.past.push(Snapshot::capture(elements));
        self.enabled = true;
        self.restoring = false;
        debug!("History initialized with {} element(s)", elements.len());
    }

    /// Record a committed graph mutation. Returns whether an entry was pushed.
    pub fn record(&mut self, elements: &[Element]) -> bool {
        if !self.enabled || self.restoring {
            return false;
        }
        let snapshot = Snapshot::capture(elements);
        if self.past.last().map(Snapshot::hash) == Some(snapshot.hash()) {
            debug!("Skipping history entry, content unchanged");
            return false;
        }
        self.past.push(snapshot);
        // A fresh edit invalidates any pending redo branch.
        self.future.clear();
        if self.past.len() > self.limit {
            self.past.remove(0);
            debug!("History at capacity ({}), evicted the oldest snapshot", self.limit);
        }
        true
    }

    /// Step back one snapshot. No-op at the baseline.
    pub fn undo(&mut self, ctx: &mut RestoreContext<'_>) -> bool {
        if !self.enabled || self.past.len() <= 1 {
            return false;
        }
        let Some(current) = self.past.pop() else {
            return false;
        };
        self.future.push(current);
        let elements = match self.past.last() {
            Some(snapshot) => snapshot.elements.clone(),
            None => return false,
        };
        self.apply_snapshot(&elements, "Undo applied", ctx);
        true
    }

    /// Step forward one snapshot. No-op when nothing was undone.
    pub fn redo(&mut self, ctx: &mut RestoreContext<'_>) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(snapshot) = self.future.pop() else {
            return false;
        };
        let elements = snapshot.elements.clone();
        self.past.push(snapshot);
        self.apply_snapshot(&elements, "Redo applied", ctx);
        true
    }

    /// Interpret a key event and run the matching history action.
    ///
    /// `Some` means the chord was consumed and the caller must suppress the
    /// host's default handling, even when the action itself was a no-op.
    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        ctx: &mut RestoreContext<'_>,
    ) -> Option<HistoryAction> {
        if !self.enabled {
            return None;
        }
        let action = keymap::interpret(event)?;
        match action {
            HistoryAction::Undo => {
                self.undo(ctx);
            }
            HistoryAction::Redo => {
                self.redo(ctx);
            }
        }
        Some(action)
    }

    /// Deactivate the session and drop all retained snapshots.
    pub fn teardown(&mut self) {
        self.past.clear();
        self.future.clear();
        self.enabled = false;
        self.restoring = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn can_undo(&self) -> bool {
        self.enabled && self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        self.enabled && !self.future.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.past.len()
    }

    // Drives the collaborators in a fixed order: remove all, insert the
    // snapshot, clear selection, clear dimming, hide the panel, rebuild both
    // filter indices, write through with skip_history, report status.
    fn apply_snapshot(&mut self, elements: &[Element], message: &str, ctx: &mut RestoreContext<'_>) {
        self.restoring = true;

        ctx.surface.remove_all();
        ctx.surface.insert_elements(elements);
        ctx.surface.clear_selection();
        ctx.surface.clear_dimming();
        ctx.panel.hide();
        ctx.label_index.rebuild(elements);
        ctx.owner_index.rebuild(elements);

        if let Err(e) = ctx.store.save(elements, SaveOptions { skip_history: true }) {
            // History operations stay total; persistence problems are logged only.
            warn!("Write-through after restore failed: {}", e);
        }
        ctx.status.status(message);

        self.restoring = false;
    }
}
