use crate::domain::card::{self, Card, CardDraft, CardId, UserId};
use crate::domain::column::{self, BoardRef, Column, ColumnId};
use crate::domain::ordering;
use crate::domain::reorder::{plan_reorder, DragResult, ReorderPlan};
use crate::domain::view::{build_board_view, ColumnView};
use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    /// Columns created on a brand new board, left to right
    #[serde(default)]
    pub default_columns: Vec<String>,
    pub new_column_name: String,
    pub new_card_title: String,
    pub new_card_description: String,
}

impl BoardConfig {
    /// Rejects configurations that would create unnamed columns or cards
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TaskboardError::ConfigError(
                "board name cannot be empty".to_string(),
            ));
        }
        if self.new_column_name.trim().is_empty() {
            return Err(TaskboardError::ConfigError(
                "new_column_name cannot be empty".to_string(),
            ));
        }
        if self.new_card_title.trim().is_empty() {
            return Err(TaskboardError::ConfigError(
                "new_card_title cannot be empty".to_string(),
            ));
        }
        if let Some(position) = self
            .default_columns
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(TaskboardError::ConfigError(format!(
                "default column {} has an empty name",
                position
            )));
        }
        Ok(())
    }

    /// Content for a card created from the "add card" button
    pub fn card_template(&self, creator: UserId) -> CardDraft {
        CardDraft::new(self.new_card_title.clone(), creator)
            .with_description(self.new_card_description.clone())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Default Board".to_string(),
            default_columns: vec![
                "To Do".to_string(),
                "In Progress".to_string(),
                "Done".to_string(),
            ],
            new_column_name: "New Column".to_string(),
            new_card_title: "New Card".to_string(),
            new_card_description: "New Card".to_string(),
        }
    }
}

/// Columns and cards of one board version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub board: BoardRef,
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

impl Board {
    /// Creates an empty board
    pub fn new(board: BoardRef) -> Self {
        Self {
            board,
            columns: Vec::new(),
            cards: Vec::new(),
        }
    }

    /// Creates a board holding the configured default columns
    pub fn with_default_columns(board: BoardRef, config: &BoardConfig) -> Self {
        let mut this = Self::new(board);
        for name in &config.default_columns {
            this.add_column(name.clone(), None);
        }
        this
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Cards of one column, in no particular order
    pub fn cards_in(&self, column_id: ColumnId) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.is_in(column_id))
    }

    /// Appends a column after the board's last column
    pub fn add_column(&mut self, name: String, owner: Option<UserId>) -> &Column {
        let mut new_column = Column::new(self.board, name);
        new_column.user_id = owner;
        column::add_column(&mut self.columns, new_column)
    }

    pub fn rename_column(&mut self, column_id: ColumnId, name: String) -> Result<()> {
        column::rename_column(&mut self.columns, column_id, name)
    }

    /// Removes a column and its cards, returning both
    pub fn delete_column(&mut self, column_id: ColumnId) -> Result<(Column, Vec<Card>)> {
        column::delete_column(&mut self.columns, &mut self.cards, column_id)
    }

    /// Appends a card to an existing column
    pub fn add_card(&mut self, column_id: ColumnId, draft: CardDraft) -> Result<&Card> {
        if self.column(column_id).is_none() {
            return Err(TaskboardError::ColumnNotFound(column_id.to_string()));
        }
        Ok(card::add_card(&mut self.cards, column_id, draft))
    }

    pub fn edit_card(&mut self, updated: Card) -> Result<()> {
        card::edit_card(&mut self.cards, updated)
    }

    pub fn delete_card(&mut self, card_id: CardId) -> Result<Card> {
        card::delete_card(&mut self.cards, card_id)
    }

    /// Applies a drag gesture in place
    ///
    /// Returns the applied plan, or `None` when the gesture was a cancellation.
    pub fn reorder(&mut self, drag: &DragResult) -> Option<ReorderPlan> {
        let plan = plan_reorder(&self.cards, drag)?;
        plan.apply(&mut self.cards);
        Some(plan)
    }

    /// Per-column ordered projection of the board
    pub fn view(&self) -> Vec<ColumnView<'_>> {
        build_board_view(&self.columns, &self.cards)
    }

    /// Drops cards whose column is missing and re-indexes every scope to `0..n`
    ///
    /// Returns the dropped cards.
    pub fn normalize(&mut self) -> Vec<Card> {
        let known: Vec<ColumnId> = self.columns.iter().map(|c| c.id).collect();
        let (kept, dropped): (Vec<Card>, Vec<Card>) = std::mem::take(&mut self.cards)
            .into_iter()
            .partition(|c| c.list_id.is_some_and(|id| known.contains(&id)));
        self.cards = kept;

        let board = self.board;
        ordering::compact(&mut self.columns, |c| c.board == board);
        for id in known {
            ordering::compact(&mut self.cards, |c| c.is_in(id));
        }
        dropped
    }

    /// Checks that every column and every column's cards are indexed `0..n`
    /// and that every card belongs to exactly one column of this board
    pub fn is_consistent(&self) -> bool {
        let mut ids = HashSet::with_capacity(self.cards.len());
        let cards_unique = self.cards.iter().all(|c| ids.insert(c.id));
        let columns_ok = ordering::is_contiguous(&self.columns)
            && self.columns.iter().all(|c| c.board == self.board);
        let cards_placed = self
            .cards
            .iter()
            .all(|c| c.list_id.is_some_and(|id| self.column(id).is_some()));
        let cards_ok = self
            .columns
            .iter()
            .all(|column| ordering::is_contiguous(self.cards_in(column.id)));
        cards_unique && columns_ok && cards_placed && cards_ok
    }
}
