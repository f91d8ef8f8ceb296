use crate::domain::card::Card;
use crate::domain::column::{Column, ColumnId};
use crate::domain::sorting::{sort_cards, SortField, SortOrder};

/// One column paired with its cards in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    pub cards: Vec<&'a Card>,
}

impl<'a> ColumnView<'a> {
    pub fn id(&self) -> ColumnId {
        self.column.id
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Projects columns and cards into per-column ordered views
///
/// Columns come out left to right by index, and each column's cards top to bottom by index.
/// Nothing is copied or mutated; call again whenever either input changes.
pub fn build_board_view<'a>(columns: &'a [Column], cards: &'a [Card]) -> Vec<ColumnView<'a>> {
    let mut ordered: Vec<&Column> = columns.iter().collect();
    ordered.sort_by_key(|c| c.index);

    ordered
        .into_iter()
        .map(|column| {
            let mut column_cards: Vec<&Card> =
                cards.iter().filter(|card| card.is_in(column.id)).collect();
            sort_cards(&mut column_cards, SortField::Index, SortOrder::Ascending);
            ColumnView {
                column,
                cards: column_cards,
            }
        })
        .collect()
}
