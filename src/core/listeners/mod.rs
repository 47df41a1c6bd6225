//=========================================================================
// Listeners
//=========================================================================
//
// Instance-owned callback tables used by the engine's event emission and
// by the input manager's edge-triggered handlers.
//
//   HandlerList<E>      ordered callbacks for one stream
//   Listeners<K, E>     K → HandlerList<E>
//
//=========================================================================

//=== Module Declarations =================================================

mod handler_list;
mod registry;

//=== Public API ==========================================================

pub use handler_list::{HandlerList, ListenerId};
pub use registry::Listeners;
