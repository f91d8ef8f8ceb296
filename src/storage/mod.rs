use crate::{
    domain::{Board, BoardConfig, BoardRef, Card, Column, ColumnId},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Storage trait for reading and persisting boards
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Lists the columns of a board, ordered by index ascending
    ///
    /// An unknown board has no columns.
    async fn list_columns(&self, board: &BoardRef) -> Result<Vec<Column>>;

    /// Lists the cards held by any of the given columns, ordered by index ascending
    async fn list_cards(&self, column_ids: &[ColumnId]) -> Result<Vec<Card>>;

    /// Replaces the stored columns and cards of a board
    ///
    /// Cards of columns that are no longer on the board are removed.
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the board configuration, falling back to defaults
    async fn load_config(&self) -> Result<BoardConfig>;

    /// Saves the board configuration
    async fn save_config(&self, config: &BoardConfig) -> Result<()>;

    /// Checks if the storage is initialized
    async fn is_initialized(&self) -> bool;
}

/// Sorts fetched rows the way storage hands them out
pub(crate) fn sort_by_index<T: crate::domain::ordering::Positioned>(rows: &mut [T]) {
    rows.sort_by_key(|row| row.index());
}
