//! Single-writer container for the state of one board.
//!
//! Every handler takes a typed payload, runs to completion, and reports whether state
//! changed. Handlers never fail: references to cards or columns that no longer exist are
//! treated as stale UI events and ignored.

use crate::domain::{
    Board, BoardConfig, BoardRef, Card, CardDraft, CardId, ColumnId, ColumnView, DragResult,
    UserId,
};
use crate::events::{BoardEvent, BoardObserver};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

pub struct BoardStore {
    pub(crate) board: Board,
    pub(crate) config: BoardConfig,
    /// Columns whose cards changed since the last persist or refresh
    pub(crate) dirty: BTreeSet<ColumnId>,
    /// Whether the column set itself changed since the last persist or refresh
    pub(crate) columns_dirty: bool,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl BoardStore {
    pub fn new(board: Board, config: BoardConfig) -> Self {
        Self {
            board,
            config,
            dirty: BTreeSet::new(),
            columns_dirty: false,
            observers: Vec::new(),
        }
    }

    /// A store for a board that has not been fetched yet
    pub fn empty(board: BoardRef, config: BoardConfig) -> Self {
        Self::new(Board::new(board), config)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_ref(&self) -> BoardRef {
        self.board.board
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Per-column ordered projection of the current state
    pub fn view(&self) -> Vec<ColumnView<'_>> {
        self.board.view()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.columns_dirty || !self.dirty.is_empty()
    }

    pub fn dirty_columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.dirty.iter().copied()
    }

    /// Registers an observer for every subsequent event
    pub fn subscribe(&mut self, observer: impl BoardObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
        self.columns_dirty = false;
    }

    fn emit(&mut self, event: BoardEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Applies a finished drag gesture
    pub fn on_drag_end(&mut self, drag: &DragResult) -> bool {
        let Some(plan) = self.board.reorder(drag) else {
            return false;
        };
        if plan.is_noop() {
            return false;
        }
        self.dirty.extend(plan.touched_columns());
        self.emit(BoardEvent::CardMoved(plan));
        true
    }

    /// Appends a column named from the configuration
    pub fn on_add_column(&mut self, owner: Option<UserId>) -> ColumnId {
        let name = self.config.new_column_name.clone();
        let column = self.board.add_column(name, owner).clone();
        let id = column.id;
        self.columns_dirty = true;
        self.emit(BoardEvent::ColumnAdded(column));
        id
    }

    pub fn on_rename_column(&mut self, column_id: ColumnId, name: String) -> bool {
        if let Err(err) = self.board.rename_column(column_id, name.clone()) {
            debug!(column = %column_id, error = %err, "ignoring rename of unknown column");
            return false;
        }
        self.columns_dirty = true;
        self.emit(BoardEvent::ColumnRenamed { column_id, name });
        true
    }

    pub fn on_delete_column(&mut self, column_id: ColumnId) -> bool {
        let (column, removed_cards) = match self.board.delete_column(column_id) {
            Ok(removed) => removed,
            Err(err) => {
                debug!(column = %column_id, error = %err, "ignoring delete of unknown column");
                return false;
            }
        };
        self.columns_dirty = true;
        self.dirty.insert(column_id);
        self.emit(BoardEvent::ColumnDeleted {
            column,
            removed_cards,
        });
        true
    }

    /// Adds a card built from the configured template
    pub fn on_add_card(&mut self, column_id: ColumnId, creator: UserId) -> Option<CardId> {
        let draft = self.config.card_template(creator);
        self.on_add_card_from(column_id, draft)
    }

    /// Adds a card with the given content
    pub fn on_add_card_from(&mut self, column_id: ColumnId, draft: CardDraft) -> Option<CardId> {
        let card = match self.board.add_card(column_id, draft) {
            Ok(card) => card.clone(),
            Err(err) => {
                debug!(column = %column_id, error = %err, "ignoring card added to unknown column");
                return None;
            }
        };
        let id = card.id;
        self.dirty.insert(column_id);
        self.emit(BoardEvent::CardAdded(card));
        Some(id)
    }

    /// Stores edits made to a card's content
    pub fn on_save_card(&mut self, card: Card) -> bool {
        let card_id = card.id;
        if let Err(err) = self.board.edit_card(card) {
            debug!(card = %card_id, error = %err, "ignoring save of unknown card");
            return false;
        }
        let Some(saved) = self.board.card(card_id).cloned() else {
            return false;
        };
        if let Some(column_id) = saved.list_id {
            self.dirty.insert(column_id);
        }
        self.emit(BoardEvent::CardUpdated(saved));
        true
    }

    pub fn on_delete_card(&mut self, card_id: CardId) -> bool {
        let removed = match self.board.delete_card(card_id) {
            Ok(card) => card,
            Err(err) => {
                debug!(card = %card_id, error = %err, "ignoring delete of unknown card");
                return false;
            }
        };
        if let Some(column_id) = removed.list_id {
            self.dirty.insert(column_id);
        }
        self.emit(BoardEvent::CardDeleted(removed));
        true
    }

    /// Announces that a card was picked for editing
    pub fn on_select_card(&mut self, card_id: CardId) -> bool {
        let Some(card) = self.board.card(card_id).cloned() else {
            debug!(card = %card_id, "ignoring selection of unknown card");
            return false;
        };
        self.emit(BoardEvent::CardSelectedForEdit(card));
        true
    }
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("board", &self.board)
            .field("config", &self.config)
            .field("dirty", &self.dirty)
            .field("columns_dirty", &self.columns_dirty)
            .field("observers", &self.observers.len())
            .finish()
    }
}
