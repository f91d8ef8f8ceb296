pub mod board;
pub mod card;
pub mod column;
pub mod ordering;
pub mod reorder;
pub mod sorting;
pub mod view;

pub use board::{Board, BoardConfig};
pub use card::{Card, CardDraft, CardId, UserId};
pub use column::{BoardRef, Column, ColumnId};
pub use reorder::{plan_reorder, reorder, DragLocation, DragResult, MoveKind, ReorderPlan};
pub use sorting::{sort_cards, SortField, SortOrder};
pub use view::{build_board_view, ColumnView};
