use crate::domain::card::Card;
use chrono::{DateTime, Utc};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Index,
    Title,
    Created,
    Deadline,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "index" | "position" => Ok(SortField::Index),
            "title" => Ok(SortField::Title),
            "created" => Ok(SortField::Created),
            "deadline" => Ok(SortField::Deadline),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: index, title, created, deadline",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts cards in-place by the given field and direction
///
/// Works on owned cards or references alike, so views can sort borrowed slices.
/// The sort is stable.
///
/// # Examples
/// ```
/// use taskboard_core::domain::card::{add_card, CardDraft, UserId};
/// use taskboard_core::domain::column::ColumnId;
/// use taskboard_core::domain::sorting::{sort_cards, SortField, SortOrder};
///
/// let column = ColumnId::new();
/// let mut cards = Vec::new();
/// add_card(&mut cards, column, CardDraft::new("b".to_string(), UserId::new("u")));
/// add_card(&mut cards, column, CardDraft::new("a".to_string(), UserId::new("u")));
///
/// sort_cards(&mut cards, SortField::Title, SortOrder::Ascending);
/// assert_eq!(cards[0].title, "a");
/// ```
pub fn sort_cards<C: Borrow<Card>>(cards: &mut [C], field: SortField, order: SortOrder) {
    cards.sort_by(|a, b| {
        let (a, b): (&Card, &Card) = (a.borrow(), b.borrow());
        let cmp = match field {
            SortField::Index => a.index.cmp(&b.index),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            // Missing deadlines stay last in either direction
            SortField::Deadline => {
                return match (a.deadline, b.deadline) {
                    (Some(_), Some(_)) => {
                        let cmp = compare_option_dates(a.deadline, b.deadline);
                        apply_order(cmp, order)
                    }
                    (x, y) => compare_option_dates(x, y),
                };
            }
        };

        apply_order(cmp, order)
    });
}

fn apply_order(cmp: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => cmp,
        SortOrder::Descending => cmp.reverse(),
    }
}

/// Compare Option<DateTime> with None always sorting to end
fn compare_option_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
