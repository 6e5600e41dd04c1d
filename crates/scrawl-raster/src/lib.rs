//! Snapshot codec for the Scrawl whiteboard.
//!
//! Turns a derived shape sequence into a single raster snapshot (a PNG of
//! the canvas at its current resolution) and applies a received snapshot by
//! replacing the whole visible surface.
//!
//! Synchronization deliberately ships whole bitmaps instead of incremental
//! shape diffs: every receiver lands on a byte-identical visual state with
//! no per-peer reconciliation, at the cost of bandwidth and of remote
//! strokes not being locally editable.

mod codec;
mod font;
mod surface;

pub use codec::{apply, encode, CodecError, Snapshot};
pub use surface::Surface;
