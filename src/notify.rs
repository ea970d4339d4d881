//! Change notifications emitted by face groups.
//!
//! Each [`FaceGroup`](crate::FaceGroup) owns a [`ChangeSignal`]. Listeners are
//! called synchronously, in registration order, from inside the mutating call
//! that caused the change, after the group's caches have been invalidated.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Which derived state a change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChangeFlags {
    /// Identity/equality caches of downstream consumers (e.g. vertex
    /// uniqueness tables) are stale.
    pub affects_uniqueness: bool,
    /// Attribute coverage may have changed.
    pub affects_vertex_schema: bool,
    /// A compiled render mesh must be rebuilt.
    pub affects_render_mesh: bool,
}

impl ChangeFlags {
    /// Any edit of the face list.
    pub const FACES: Self = Self {
        affects_uniqueness: true,
        affects_vertex_schema: true,
        affects_render_mesh: true,
    };

    /// Toggling temporary attributes only changes the persisted schema view.
    pub const TEMPORARY_ATTRIBUTES: Self = Self {
        affects_uniqueness: false,
        affects_vertex_schema: true,
        affects_render_mesh: false,
    };

    /// Swapping the material leaves geometry alone.
    pub const MATERIAL: Self = Self {
        affects_uniqueness: false,
        affects_vertex_schema: false,
        affects_render_mesh: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.affects_uniqueness || self.affects_vertex_schema || self.affects_render_mesh)
    }
}

/// Handle returned by [`ChangeSignal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ChangeFlags) + Send + Sync>;

/// Listener list for one face group.
///
/// Cloning yields an empty signal: listeners observe one particular group,
/// not its copies.
#[derive(Default)]
pub struct ChangeSignal {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&ChangeFlags) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&self, flags: ChangeFlags) {
        if flags.is_empty() {
            return;
        }
        for (_, listener) in &self.listeners {
            listener(&flags);
        }
    }
}

impl Clone for ChangeSignal {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
