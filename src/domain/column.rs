use crate::domain::card::{Card, UserId};
use crate::domain::ordering::{self, Positioned};
use crate::error::{Result, TaskboardError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(Uuid);

impl ColumnId {
    /// Generates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ColumnId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ColumnId {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TaskboardError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one version of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardRef {
    pub id: Uuid,
    pub version: u32,
}

impl BoardRef {
    pub fn new(id: Uuid, version: u32) -> Self {
        Self { id, version }
    }
}

impl fmt::Display for BoardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.id, self.version)
    }
}

/// A named list of cards on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board: BoardRef,
    pub name: String,
    pub index: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Column {
    /// Creates a column with a fresh identity
    ///
    /// The index is provisional; [`add_column`] assigns the real one.
    pub fn new(board: BoardRef, name: String) -> Self {
        Self {
            id: ColumnId::new(),
            board,
            name,
            index: 0,
            created_at: Utc::now(),
            user_id: None,
        }
    }

    pub fn with_owner(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl Positioned for Column {
    fn index(&self) -> u32 {
        self.index
    }

    fn set_index(&mut self, index: u32) {
        self.index = index;
    }
}

/// Appends a column to its board, placing it after the board's last column
pub fn add_column(columns: &mut Vec<Column>, mut column: Column) -> &Column {
    let board = column.board;
    column.index = ordering::next_index(columns.iter().filter(|c| c.board == board));
    columns.push(column);
    &columns[columns.len() - 1]
}

/// Replaces a column's name
pub fn rename_column(columns: &mut [Column], column_id: ColumnId, name: String) -> Result<()> {
    let column = columns
        .iter_mut()
        .find(|c| c.id == column_id)
        .ok_or_else(|| TaskboardError::ColumnNotFound(column_id.to_string()))?;
    column.name = name;
    Ok(())
}

/// Removes a column together with every card it holds
///
/// The remaining columns of the same board are re-indexed to stay contiguous.
/// Returns the removed column and the cards that were in it.
pub fn delete_column(
    columns: &mut Vec<Column>,
    cards: &mut Vec<Card>,
    column_id: ColumnId,
) -> Result<(Column, Vec<Card>)> {
    let position = columns
        .iter()
        .position(|c| c.id == column_id)
        .ok_or_else(|| TaskboardError::ColumnNotFound(column_id.to_string()))?;
    let removed = columns.remove(position);

    let (orphaned, kept): (Vec<Card>, Vec<Card>) = std::mem::take(cards)
        .into_iter()
        .partition(|card| card.list_id == Some(column_id));
    *cards = kept;

    let board = removed.board;
    ordering::compact(columns, |c| c.board == board);

    Ok((removed, orphaned))
}
