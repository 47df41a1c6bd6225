//=========================================================================
// Listener Registry
//=========================================================================
//
// Keyed subscription table: event identifier → ordered handler list.
//
// Architecture:
//   on(key, f) → HashMap<K, HandlerList<E>> ← off(key, id)
//                          ↓
//   emit(key, &event) → handlers in registration order
//
// Owned by a component instance (engine, input manager). Dropping or
// clearing the registry drops every handler.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

//=== Internal Dependencies ===============================================

use super::handler_list::{HandlerList, ListenerId};

//=========================================================================

/// Per-instance mapping from an event key to its ordered handlers.
pub struct Listeners<K, E: ?Sized> {
    lists: HashMap<K, HandlerList<E>>,
    next_id: u64,
}

impl<K: Eq + Hash, E: ?Sized> Listeners<K, E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
            next_id: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Subscribes `handler` to `key`. Ids are unique across all keys.
    pub fn on<F>(&mut self, key: K, handler: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.lists
            .entry(key)
            .or_default()
            .push_with_id(id, Box::new(handler));
        id
    }

    /// Unsubscribes the registration `id` from `key`.
    ///
    /// Returns `false` if nothing was removed.
    pub fn off<Q>(&mut self, key: &Q, id: ListenerId) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(list) = self.lists.get_mut(key) else {
            return false;
        };
        let removed = list.remove(id);
        if list.is_empty() {
            self.lists.remove(key);
        }
        removed
    }

    //--- Dispatch ---------------------------------------------------------

    /// Invokes every handler registered for `key`. Returns how many ran.
    pub fn emit<Q>(&mut self, key: &Q, event: &E) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.lists
            .get_mut(key)
            .map(|list| list.dispatch(event))
            .unwrap_or(0)
    }

    //--- Query API --------------------------------------------------------

    /// Number of handlers registered for `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.lists.get(key).map(HandlerList::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Drops every handler for every key.
    pub fn clear(&mut self) {
        self.lists.clear();
    }
}

impl<K: Eq + Hash, E: ?Sized> Default for Listeners<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::Listeners;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn new_registry_is_empty() {
        let mut reg = Listeners::<String, u32>::new();
        assert!(reg.is_empty());
        assert_eq!(reg.count("score"), 0);
        assert_eq!(reg.emit("score", &1), 0);
    }

    #[test]
    fn emit_only_reaches_matching_key() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reg = Listeners::<String, u32>::new();

        let s = seen.clone();
        reg.on("a".to_string(), move |v| s.borrow_mut().push(("a", *v)));
        let s = seen.clone();
        reg.on("b".to_string(), move |v| s.borrow_mut().push(("b", *v)));

        reg.emit("a", &1);
        reg.emit("b", &2);
        reg.emit("c", &3);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn same_callback_registered_twice_fires_twice() {
        let hits = Rc::new(RefCell::new(0));
        let mut reg = Listeners::<&'static str, ()>::new();

        for _ in 0..2 {
            let h = hits.clone();
            reg.on("tick", move |_| *h.borrow_mut() += 1);
        }

        assert_eq!(reg.emit("tick", &()), 2);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn off_removes_single_registration_and_prunes_empty_keys() {
        let mut reg = Listeners::<&'static str, ()>::new();
        let a = reg.on("tick", |_| {});
        let b = reg.on("tick", |_| {});

        assert!(reg.off("tick", a));
        assert_eq!(reg.count("tick"), 1);
        assert!(!reg.off("other", b), "Wrong key must not remove anything");

        assert!(reg.off("tick", b));
        assert!(reg.is_empty());
    }

    #[test]
    fn clear_drops_all_handlers() {
        let mut reg = Listeners::<&'static str, ()>::new();
        reg.on("a", |_| {});
        reg.on("b", |_| {});
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.emit("a", &()), 0);
    }
}
