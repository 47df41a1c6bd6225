//=========================================================================
// Handler List
//=========================================================================
//
// Ordered collection of boxed callbacks for a single event stream.
//
// Insertion order is invocation order. Duplicate callbacks are allowed:
// every registration gets its own `ListenerId` and fires independently.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== ListenerId ==========================================================

/// Handle returned by every registration, used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(super) u64);

//=== Handler =============================================================

pub(super) type Handler<E> = Box<dyn FnMut(&E)>;

//=== HandlerList =========================================================

/// Ordered list of callbacks receiving `&E`.
pub struct HandlerList<E: ?Sized> {
    handlers: Vec<(ListenerId, Handler<E>)>,
    next_id: u64,
}

impl<E: ?Sized> HandlerList<E> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends a handler and returns its id.
    pub fn push<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Appends a handler under an id allocated by the caller.
    pub(super) fn push_with_id(&mut self, id: ListenerId, handler: Handler<E>) {
        self.handlers.push((id, handler));
    }

    /// Removes the handler with `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    //--- Dispatch ---------------------------------------------------------

    /// Invokes every handler in registration order. Returns how many ran.
    pub fn dispatch(&mut self, event: &E) -> usize {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
        self.handlers.len()
    }

    //--- Query API --------------------------------------------------------

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E: ?Sized> Default for HandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for HandlerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<_> = self.handlers.iter().map(|(id, _)| id.0).collect();
        f.debug_struct("HandlerList").field("ids", &ids).finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
