//! # Taskboard Core
//!
//! Board state, card reordering and storage for taskboard kanban boards.
//!
//! The heart of the crate is [`domain::reorder`], which turns a finished drag gesture into
//! a consistent set of card positions using only local state. Column and card mutators keep
//! every column indexed `0..n`, [`store::BoardStore`] owns the state of one board and
//! exposes typed event handlers, and [`storage::Storage`] supplies the data and takes the
//! explicit persistence step.

pub mod domain;
pub mod error;
pub mod events;
pub mod storage;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig},
    card::{Card, CardDraft, CardId, UserId},
    column::{BoardRef, Column, ColumnId},
    reorder::{reorder, DragLocation, DragResult},
};
pub use error::{Result, TaskboardError};
pub use events::{BoardEvent, BoardObserver};
pub use storage::Storage;
pub use store::BoardStore;
pub use sync::{FetchMode, FetchedBoard, MergeReport};
