// ChiloDisco - app/mod.rs
//
// Application layer: snapshot fetching, the poll thread, session store and
// dashboard state.
// Dependencies: core layer, util, reqwest.
// Must NOT depend on: ui, platform specifics.

pub mod client;
pub mod poll;
pub mod state;
pub mod store;
