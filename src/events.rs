//! Notifications emitted by [`BoardStore`](crate::store::BoardStore) after a state change.

use crate::domain::{Card, CardId, Column, ColumnId, ReorderPlan};

/// Something that happened to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    CardMoved(ReorderPlan),
    CardAdded(Card),
    CardUpdated(Card),
    CardDeleted(Card),
    /// A card was picked for editing; the UI layer opens its editor
    CardSelectedForEdit(Card),
    ColumnAdded(Column),
    ColumnRenamed { column_id: ColumnId, name: String },
    ColumnDeleted {
        column: Column,
        removed_cards: Vec<Card>,
    },
}

impl BoardEvent {
    /// The card this event concerns, if any
    pub fn card_id(&self) -> Option<CardId> {
        match self {
            Self::CardMoved(plan) => Some(plan.card_id),
            Self::CardAdded(card)
            | Self::CardUpdated(card)
            | Self::CardDeleted(card)
            | Self::CardSelectedForEdit(card) => Some(card.id),
            _ => None,
        }
    }
}

/// Receives board events
pub trait BoardObserver: Send {
    fn on_event(&mut self, event: &BoardEvent);
}

impl<F> BoardObserver for F
where
    F: FnMut(&BoardEvent) + Send,
{
    fn on_event(&mut self, event: &BoardEvent) {
        self(event)
    }
}
