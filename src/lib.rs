//! Batch preprocessing for NinaPro EMG recordings.
//!
//! Takes raw per-session recordings (EMG signal plus per-sample movement and
//! repetition labels), re-derives clean rest-move-rest repetition blocks from
//! the movement-label transitions, and turns the result into windowed,
//! normalised tensors with repetition-disjoint train/test splits.
//!
//! The `.mat` reader is an external collaborator behind [`SessionSource`];
//! everything here operates on fully loaded in-memory arrays, one subject per
//! call, with no state between calls.

pub mod database;
pub mod error;
pub mod import;
pub mod lookup;
pub mod normalise;
pub mod remap;
pub mod segment;
pub mod split;
pub mod window;

pub use database::{Database, DbInfo, SessionPlan, SessionSpec, StreamKind};
pub use error::PrepError;
pub use import::{
    import_subject, ManualSource, SegmentedRecording, SessionRecording, SessionSource,
};
pub use lookup::get_idxs;
pub use normalise::{normalise_emg, one_hot};
pub use remap::{remap_session, RemapRule, RemapTable};
pub use segment::{movement_transitions, segment_repetitions, Segmentation};
pub use split::{
    gen_split_balanced, gen_split_balanced_with, gen_split_rand, gen_split_rand_with, SplitTables,
};
pub use window::{get_windows, WindowSet};
