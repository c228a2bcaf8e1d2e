//! wbs-sync library interface
//!
//! The pipeline, leaf-first: raw record batches arrive from the page source
//! (`notion`), each record's properties normalize into canonical values
//! (`normalize`), the item builder assembles canonical items (`item`), the
//! collection sorts by hierarchical code (`sortkey`), folds into statistics
//! (`stats`), and persists as a snapshot (`snapshot`) guarded by the change
//! detector (`fingerprint`). `sync` drives the whole chain.

pub mod fingerprint;
pub mod item;
pub mod normalize;
pub mod notion;
pub mod snapshot;
pub mod sortkey;
pub mod stats;
pub mod sync;
