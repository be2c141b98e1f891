//! Canvas post simulation and synchronization engine for the orbitpad
//! infinite-canvas blog.
//!
//! Posts are draggable, editable cards that orbit a fixed center when left
//! alone. Every local mutation is optimistically synchronized to a remote
//! persistence service, and the whole canvas can be captured into and
//! restored from versioned snapshots ("time travel"). The host layer is
//! responsible only for wiring pointer events to the [`engine::Engine`],
//! driving its tick, and rendering the resulting posts; this crate owns the
//! rest.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] aggregate and all interaction handlers |
//! | [`registry`] | In-memory arena of live posts |
//! | [`post`] | Post entity and sparse-update types |
//! | [`orbit`] | Closed-form orbital integrator, body mirror table, angle source |
//! | [`input`] | Drag gesture state machine |
//! | [`sync`] | Optimistic persistence calls and their completion queue |
//! | [`snapshot`] | Immutable versioned snapshot history |
//! | [`persist`] | Persistence service wire records, trait seam, HTTP client |
//! | [`log`] | Append-only event log |
//! | [`consts`] | Shared numeric constants (orbit center, physics fallbacks) |

pub mod consts;
pub mod engine;
pub mod input;
pub mod log;
pub mod orbit;
pub mod persist;
pub mod post;
pub mod registry;
pub mod snapshot;
pub mod sync;
