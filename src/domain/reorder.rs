//! Drag-and-drop reconciliation of card positions.
//!
//! A finished drag gesture names the card that moved, where it was picked up and where it
//! was dropped. [`reorder`] turns that into a new card list in which every column still
//! holds indices `0..n`, touching only the cards whose position actually changes.
//!
//! Cards are classified relative to the moving card:
//!
//! * cross-list move: cards at or below the drop point in the destination list move down
//!   one slot, cards below the pick-up point in the source list move up one slot
//! * move toward the top of the same list: cards between the drop point and the pick-up
//!   point move down one slot
//! * move toward the bottom of the same list: cards between the pick-up point and the drop
//!   point move up one slot
//! * drop on the pick-up point: nothing changes

use crate::domain::card::{Card, CardId};
use crate::domain::column::ColumnId;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A position inside a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragLocation {
    pub list_id: ColumnId,
    pub index: u32,
}

impl DragLocation {
    pub fn new(list_id: ColumnId, index: u32) -> Self {
        Self { list_id, index }
    }
}

/// Payload of a completed drag gesture
///
/// `destination` is `None` when the card was dropped outside any column, and
/// `draggable_id` is `None` when the drag source could not be identified. Both are
/// cancellations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragResult {
    pub draggable_id: Option<CardId>,
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl DragResult {
    pub fn new(card_id: CardId, source: DragLocation, destination: DragLocation) -> Self {
        Self {
            draggable_id: Some(card_id),
            source,
            destination: Some(destination),
        }
    }

    /// A drag that was released outside any column
    pub fn cancelled(card_id: CardId, source: DragLocation) -> Self {
        Self {
            draggable_id: Some(card_id),
            source,
            destination: None,
        }
    }
}

/// How a move relates source and destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    CrossList,
    TowardTop,
    TowardBottom,
    InPlace,
}

/// A resolved move, ready to be applied to a card list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderPlan {
    pub card_id: CardId,
    pub kind: MoveKind,
    /// Where the card actually sits before the move
    pub source: DragLocation,
    /// Where the card ends up, clamped to the destination list's bounds
    pub destination: DragLocation,
}

impl ReorderPlan {
    /// Columns whose card indices may change when this plan is applied
    pub fn touched_columns(&self) -> Vec<ColumnId> {
        match self.kind {
            MoveKind::CrossList => vec![self.source.list_id, self.destination.list_id],
            MoveKind::TowardTop | MoveKind::TowardBottom => vec![self.source.list_id],
            MoveKind::InPlace => Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.kind == MoveKind::InPlace
    }

    /// Applies the plan to `cards` in place, returning how many cards changed
    pub fn apply(&self, cards: &mut [Card]) -> usize {
        let mut changed = 0;
        for card in cards.iter_mut() {
            if self.place(card) {
                changed += 1;
            }
        }
        trace!(card = %self.card_id, kind = ?self.kind, changed, "applied reorder plan");
        changed
    }

    fn place(&self, card: &mut Card) -> bool {
        if self.kind == MoveKind::InPlace {
            return false;
        }

        if card.id == self.card_id {
            card.list_id = Some(self.destination.list_id);
            card.index = self.destination.index;
            return true;
        }

        let src = self.source;
        let dst = self.destination;

        match self.kind {
            MoveKind::CrossList => {
                if card.is_in(dst.list_id) && card.index >= dst.index {
                    card.index = card.index.saturating_add(1);
                    true
                } else if card.is_in(src.list_id) && card.index >= src.index {
                    card.index = card.index.saturating_sub(1);
                    true
                } else {
                    false
                }
            }
            MoveKind::TowardTop => {
                if card.is_in(src.list_id) && (dst.index..=src.index).contains(&card.index) {
                    card.index = card.index.saturating_add(1);
                    true
                } else {
                    false
                }
            }
            MoveKind::TowardBottom => {
                if card.is_in(src.list_id) && (src.index..=dst.index).contains(&card.index) {
                    card.index = card.index.saturating_sub(1);
                    true
                } else {
                    false
                }
            }
            MoveKind::InPlace => false,
        }
    }
}

/// Resolves a drag gesture against the current cards
///
/// Returns `None` when the gesture is a cancellation: no destination, no draggable id,
/// or a card that is not on the board. The card's current location wins over the
/// gesture's reported source.
pub fn plan_reorder(cards: &[Card], drag: &DragResult) -> Option<ReorderPlan> {
    let Some(requested) = drag.destination else {
        trace!("drag released outside any column");
        return None;
    };
    let Some(card_id) = drag.draggable_id else {
        debug!("drag result carries no draggable id");
        return None;
    };
    let Some(card) = cards.iter().find(|c| c.id == card_id) else {
        debug!(card = %card_id, "dragged card is not on the board");
        return None;
    };
    let Some(list_id) = card.list_id else {
        debug!(card = %card_id, "dragged card has no column");
        return None;
    };

    let source = DragLocation::new(list_id, card.index);
    if source != drag.source {
        warn!(
            card = %card_id,
            reported_list = %drag.source.list_id,
            reported_index = drag.source.index,
            list = %source.list_id,
            index = source.index,
            "drag source disagrees with board state, using board state"
        );
    }

    let siblings = cards
        .iter()
        .filter(|c| c.is_in(requested.list_id) && c.id != card_id)
        .count() as u32;
    let destination = DragLocation::new(requested.list_id, requested.index.min(siblings));

    let kind = if source.list_id != destination.list_id {
        MoveKind::CrossList
    } else if source.index > destination.index {
        MoveKind::TowardTop
    } else if source.index < destination.index {
        MoveKind::TowardBottom
    } else {
        MoveKind::InPlace
    };

    Some(ReorderPlan {
        card_id,
        kind,
        source,
        destination,
    })
}

/// Computes the card list that results from a drag gesture
///
/// Never fails: cancelled gestures return the cards unchanged. Card order in the returned
/// list matches the input.
pub fn reorder(cards: &[Card], drag: &DragResult) -> Vec<Card> {
    let mut next = cards.to_vec();
    if let Some(plan) = plan_reorder(cards, drag) {
        plan.apply(&mut next);
    }
    next
}
