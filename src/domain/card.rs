use crate::domain::column::ColumnId;
use crate::domain::ordering::{self, Positioned};
use crate::error::{Result, TaskboardError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
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

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for CardId {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TaskboardError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a board member, as issued by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work positioned within one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Owning column. Only `None` while a card is being moved between boards.
    pub list_id: Option<ColumnId>,
    pub index: u32,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub user_creator: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_assigned: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn is_in(&self, column_id: ColumnId) -> bool {
        self.list_id == Some(column_id)
    }

    /// Copies the editable content of `other` onto this card, keeping identity and position
    fn apply_content(&mut self, other: Card) {
        self.title = other.title;
        self.description = other.description;
        self.deadline = other.deadline;
        self.user_creator = other.user_creator;
        self.user_assigned = other.user_assigned;
    }
}

impl Positioned for Card {
    fn index(&self) -> u32 {
        self.index
    }

    fn set_index(&mut self, index: u32) {
        self.index = index;
    }
}

/// Content for a card that has not been placed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub user_creator: UserId,
    pub user_assigned: Option<UserId>,
}

impl CardDraft {
    pub fn new(title: String, user_creator: UserId) -> Self {
        Self {
            title,
            description: String::new(),
            deadline: None,
            user_creator,
            user_assigned: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn assigned_to(mut self, user: UserId) -> Self {
        self.user_assigned = Some(user);
        self
    }
}

/// Appends a new card at the bottom of a column
pub fn add_card(cards: &mut Vec<Card>, column_id: ColumnId, draft: CardDraft) -> &Card {
    let index = ordering::next_index(cards.iter().filter(|c| c.is_in(column_id)));
    cards.push(Card {
        id: CardId::new(),
        list_id: Some(column_id),
        index,
        title: draft.title,
        description: draft.description,
        deadline: draft.deadline,
        user_creator: draft.user_creator,
        user_assigned: draft.user_assigned,
        created_at: Utc::now(),
    });
    &cards[cards.len() - 1]
}

/// Replaces the content of the card sharing `updated`'s identity
///
/// The stored card keeps its column and index; moves go through the reorder engine.
pub fn edit_card(cards: &mut [Card], updated: Card) -> Result<()> {
    let card = cards
        .iter_mut()
        .find(|c| c.id == updated.id)
        .ok_or_else(|| TaskboardError::CardNotFound(updated.id.to_string()))?;
    card.apply_content(updated);
    Ok(())
}

/// Removes a card and closes the gap it leaves in its column
pub fn delete_card(cards: &mut Vec<Card>, card_id: CardId) -> Result<Card> {
    let position = cards
        .iter()
        .position(|c| c.id == card_id)
        .ok_or_else(|| TaskboardError::CardNotFound(card_id.to_string()))?;
    let removed = cards.remove(position);

    let column = removed.list_id;
    ordering::compact(cards, |c| c.list_id == column);

    Ok(removed)
}
