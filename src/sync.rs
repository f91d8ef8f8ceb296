//! Reconciling fetched board data with local edits, and the explicit persistence step.
//!
//! Fetches are asynchronous and can land after the user has already changed the board.
//! Local edits are tracked per column. A background fetch never overwrites a column with
//! unsaved local edits; it keeps the local data and reports the conflict. A refresh always
//! takes the fetched data and reports which local edits it discarded.

use crate::domain::{Board, BoardConfig, BoardRef, Card, CardId, Column, ColumnId};
use crate::error::Result;
use crate::storage::Storage;
use crate::store::BoardStore;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Why a fetch was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Routine load; unsaved local edits win
    Background,
    /// Explicitly requested reload; fetched data wins
    Refresh,
}

/// Columns and cards of one board as returned by storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedBoard {
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

/// Outcome of merging fetched data into a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Local column edits were kept over the fetched column set
    pub columns_kept_local: bool,
    /// Local column edits were discarded in favor of the fetched column set
    pub columns_overwritten: bool,
    /// Columns whose unsaved local cards were kept over fetched cards
    pub kept_local: Vec<ColumnId>,
    /// Columns whose unsaved local cards were discarded
    pub overwritten: Vec<ColumnId>,
    /// Cards whose fetched placement was ignored because a kept local column decides
    /// where they live. Each card still appears exactly once.
    pub displaced_cards: Vec<CardId>,
    /// Fetched cards that pointed at no known column
    pub dropped_cards: usize,
}

impl MergeReport {
    pub fn has_conflicts(&self) -> bool {
        self.columns_kept_local
            || self.columns_overwritten
            || !self.kept_local.is_empty()
            || !self.overwritten.is_empty()
            || !self.displaced_cards.is_empty()
    }
}

/// Reads a board's columns, then the cards of those columns
pub async fn fetch_board(storage: &dyn Storage, board: &BoardRef) -> Result<FetchedBoard> {
    let columns = storage.list_columns(board).await?;
    let column_ids: Vec<ColumnId> = columns.iter().map(|c| c.id).collect();
    let cards = if column_ids.is_empty() {
        Vec::new()
    } else {
        storage.list_cards(&column_ids).await?
    };
    debug!(board = %board, columns = columns.len(), cards = cards.len(), "fetched board");
    Ok(FetchedBoard { columns, cards })
}

impl BoardStore {
    /// Creates a store populated from storage
    pub async fn load(storage: &dyn Storage, board: BoardRef, config: BoardConfig) -> Result<Self> {
        let fetched = fetch_board(storage, &board).await?;
        let mut store = Self::empty(board, config);
        store.apply_fetched(fetched, FetchMode::Background);
        Ok(store)
    }

    /// Re-reads the board from storage and merges it
    pub async fn refresh(&mut self, storage: &dyn Storage, mode: FetchMode) -> Result<MergeReport> {
        let fetched = fetch_board(storage, &self.board_ref()).await?;
        Ok(self.apply_fetched(fetched, mode))
    }

    /// Writes the current board to storage and forgets the unsaved-edit markers
    pub async fn persist(&mut self, storage: &dyn Storage) -> Result<()> {
        storage.save_board(&self.board).await?;
        debug!(
            board = %self.board_ref(),
            columns = self.board.columns.len(),
            cards = self.board.cards.len(),
            "persisted board"
        );
        self.clear_dirty();
        Ok(())
    }

    /// Merges fetched data into the store according to `mode`
    pub fn apply_fetched(&mut self, fetched: FetchedBoard, mode: FetchMode) -> MergeReport {
        let board_ref = self.board_ref();
        let mut report = MergeReport::default();

        let fetched_columns: Vec<Column> = fetched
            .columns
            .into_iter()
            .filter(|c| {
                let ours = c.board == board_ref;
                if !ours {
                    warn!(column = %c.id, board = %c.board, "fetched column belongs to another board");
                }
                ours
            })
            .collect();

        let columns = match mode {
            FetchMode::Background if self.columns_dirty => {
                report.columns_kept_local = true;
                std::mem::take(&mut self.board.columns)
            }
            FetchMode::Refresh if self.columns_dirty => {
                report.columns_overwritten = true;
                fetched_columns
            }
            _ => fetched_columns,
        };

        let local_cards = std::mem::take(&mut self.board.cards);
        let mut cards = Vec::with_capacity(fetched.cards.len());
        let mut refetched: Vec<ColumnId> = Vec::with_capacity(columns.len());
        for column in &columns {
            if self.dirty.contains(&column.id) {
                match mode {
                    FetchMode::Background => {
                        report.kept_local.push(column.id);
                        cards.extend(local_cards.iter().filter(|c| c.is_in(column.id)).cloned());
                        continue;
                    }
                    FetchMode::Refresh => report.overwritten.push(column.id),
                }
            }
            refetched.push(column.id);
        }

        // A card id lives in one column only; local copies in kept columns come first
        let mut seen: HashSet<CardId> = cards.iter().map(|c| c.id).collect();
        let mut diverged: Vec<ColumnId> = Vec::new();
        for card in &fetched.cards {
            let Some(list_id) = card.list_id else { continue };
            if refetched.contains(&list_id) {
                if seen.insert(card.id) {
                    cards.push(card.clone());
                } else {
                    debug!(card = %card.id, column = %list_id, "fetched card already placed locally");
                    report.displaced_cards.push(card.id);
                    diverged.push(list_id);
                }
            } else if report.kept_local.contains(&list_id) && !seen.contains(&card.id) {
                // Fetched into a kept local column; keep the card where this board has it
                let local = local_cards
                    .iter()
                    .find(|c| c.id == card.id && c.list_id.is_some_and(|id| refetched.contains(&id)));
                if let Some(local) = local {
                    debug!(card = %card.id, column = %list_id, "fetched card moved into a kept local column");
                    seen.insert(local.id);
                    cards.push(local.clone());
                    report.displaced_cards.push(card.id);
                    diverged.extend(local.list_id);
                }
            }
        }

        report.dropped_cards = fetched
            .cards
            .iter()
            .filter(|card| {
                !card
                    .list_id
                    .is_some_and(|id| columns.iter().any(|c| c.id == id))
            })
            .count();

        self.board = Board {
            board: board_ref,
            columns,
            cards,
        };
        self.board.normalize();

        if report.has_conflicts() {
            warn!(
                board = %board_ref,
                ?mode,
                kept_local = report.kept_local.len(),
                displaced = report.displaced_cards.len(),
                overwritten = report.overwritten.len(),
                columns_kept_local = report.columns_kept_local,
                columns_overwritten = report.columns_overwritten,
                "fetched board conflicts with unsaved local edits"
            );
        }
        if report.dropped_cards > 0 {
            warn!(board = %board_ref, dropped = report.dropped_cards, "dropped fetched cards without a column");
        }

        match mode {
            FetchMode::Refresh => self.clear_dirty(),
            FetchMode::Background => {
                let known: Vec<ColumnId> = self.board.columns.iter().map(|c| c.id).collect();
                // Deleted columns stay marked so their cards are removed on persist
                let columns_dirty = self.columns_dirty;
                self.dirty.retain(|id| columns_dirty || known.contains(id));
                // Columns that now differ from storage get written on the next persist
                self.dirty
                    .extend(diverged.into_iter().filter(|id| known.contains(id)));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardDraft, CardId, DragLocation, DragResult, UserId};
    use uuid::Uuid;

    fn remote() -> Board {
        let config = BoardConfig::default();
        let mut board = Board::with_default_columns(BoardRef::new(Uuid::new_v4(), 1), &config);
        let todo = board.columns[0].id;
        for title in ["a", "b", "c"] {
            board
                .add_card(todo, CardDraft::new(title.to_string(), UserId::new("u")))
                .unwrap();
        }
        board
    }

    fn fetched(board: &Board) -> FetchedBoard {
        FetchedBoard {
            columns: board.columns.clone(),
            cards: board.cards.clone(),
        }
    }

    fn store_for(board: &Board) -> BoardStore {
        let mut store = BoardStore::empty(board.board, BoardConfig::default());
        store.apply_fetched(fetched(board), FetchMode::Background);
        store
    }

    #[test]
    fn test_initial_fetch_populates_store() {
        let remote = remote();
        let store = store_for(&remote);

        assert_eq!(store.board(), &remote);
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_background_fetch_keeps_unsaved_column_edits() {
        let remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;
        let c = remote.cards[2].id;

        store.on_drag_end(&DragResult::new(
            c,
            DragLocation::new(todo, 2),
            DragLocation::new(todo, 0),
        ));
        let report = store.apply_fetched(fetched(&remote), FetchMode::Background);

        assert_eq!(report.kept_local, vec![todo]);
        assert!(report.overwritten.is_empty());
        assert_eq!(store.board().card(c).unwrap().index, 0);
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_background_fetch_updates_clean_columns() {
        let mut remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;
        let done = remote.columns[2].id;

        store.on_add_card(done, UserId::new("u"));
        remote.cards[0].title = "changed remotely".to_string();
        let report = store.apply_fetched(fetched(&remote), FetchMode::Background);

        assert_eq!(report.kept_local, vec![done]);
        assert_eq!(
            store.board().card(remote.cards[0].id).unwrap().title,
            "changed remotely"
        );
        assert_eq!(store.board().cards_in(todo).count(), 3);
        assert_eq!(store.board().cards_in(done).count(), 1);
    }

    fn move_card(board: &mut Board, card: CardId, to: ColumnId) {
        let from = board
            .card(card)
            .map(|c| DragLocation::new(c.list_id.unwrap(), c.index))
            .unwrap();
        board
            .reorder(&DragResult::new(card, from, DragLocation::new(to, 0)))
            .unwrap();
    }

    fn copies(store: &BoardStore, card: CardId) -> usize {
        store.board().cards.iter().filter(|c| c.id == card).count()
    }

    #[test]
    fn test_remote_move_out_of_dirty_column_keeps_one_copy() {
        let mut remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;
        let done = remote.columns[2].id;
        let k = remote.cards[0].id;

        store.on_add_card(todo, UserId::new("u"));
        move_card(&mut remote, k, done);
        let report = store.apply_fetched(fetched(&remote), FetchMode::Background);

        assert_eq!(copies(&store, k), 1);
        assert_eq!(store.board().card(k).unwrap().list_id, Some(todo));
        assert_eq!(report.kept_local, vec![todo]);
        assert_eq!(report.displaced_cards, vec![k]);
        assert!(store.board().is_consistent());
        // Done no longer matches storage and must be rewritten
        assert!(store.dirty_columns().any(|id| id == done));
    }

    #[test]
    fn test_card_moved_locally_and_remotely_keeps_local_move() {
        let mut remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;
        let doing = remote.columns[1].id;
        let done = remote.columns[2].id;
        let k = remote.cards[1].id;

        assert!(store.on_drag_end(&DragResult::new(
            k,
            DragLocation::new(todo, 1),
            DragLocation::new(doing, 0),
        )));
        move_card(&mut remote, k, done);
        let report = store.apply_fetched(fetched(&remote), FetchMode::Background);

        assert_eq!(copies(&store, k), 1);
        assert_eq!(store.board().card(k).unwrap().list_id, Some(doing));
        assert_eq!(report.displaced_cards, vec![k]);
        assert_eq!(store.board().cards.len(), 3);
        assert!(store.board().cards_in(done).next().is_none());
        assert!(store.board().is_consistent());
    }

    #[test]
    fn test_remote_move_into_dirty_column_keeps_the_card() {
        let mut remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;
        let doing = remote.columns[1].id;
        let k = remote.cards[2].id;

        store.on_add_card(doing, UserId::new("u"));
        move_card(&mut remote, k, doing);
        let report = store.apply_fetched(fetched(&remote), FetchMode::Background);

        assert_eq!(copies(&store, k), 1);
        assert_eq!(store.board().card(k).unwrap().list_id, Some(todo));
        assert_eq!(report.displaced_cards, vec![k]);
        assert_eq!(store.board().cards.len(), 4);
        assert!(store.board().is_consistent());
        assert!(store.dirty_columns().any(|id| id == todo));
    }

    #[test]
    fn test_duplicate_fetched_cards_are_collapsed() {
        let remote = remote();
        let mut data = fetched(&remote);
        let mut copy = data.cards[0].clone();
        copy.list_id = Some(remote.columns[2].id);
        data.cards.push(copy);

        let mut store = BoardStore::empty(remote.board, BoardConfig::default());
        let report = store.apply_fetched(data, FetchMode::Refresh);

        assert_eq!(copies(&store, remote.cards[0].id), 1);
        assert_eq!(report.displaced_cards, vec![remote.cards[0].id]);
        assert!(store.board().is_consistent());
    }

    #[test]
    fn test_refresh_discards_and_reports_local_edits() {
        let remote = remote();
        let mut store = store_for(&remote);
        let todo = remote.columns[0].id;

        store.on_delete_card(remote.cards[0].id);
        store.on_add_column(None);
        let report = store.apply_fetched(fetched(&remote), FetchMode::Refresh);

        assert_eq!(report.overwritten, vec![todo]);
        assert!(report.columns_overwritten);
        assert_eq!(store.board(), &remote);
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_fetched_cards_without_column_are_dropped() {
        let remote = remote();
        let mut data = fetched(&remote);
        let mut stray = data.cards[0].clone();
        stray.id = crate::domain::CardId::new();
        stray.list_id = Some(ColumnId::new());
        data.cards.push(stray);

        let mut store = BoardStore::empty(remote.board, BoardConfig::default());
        let report = store.apply_fetched(data, FetchMode::Background);

        assert_eq!(report.dropped_cards, 1);
        assert_eq!(store.board().cards.len(), 3);
        assert!(store.board().is_consistent());
    }

    #[test]
    fn test_fetched_gaps_are_compacted() {
        let remote = remote();
        let mut data = fetched(&remote);
        data.cards[1].index = 5;
        data.cards[2].index = 9;

        let store = {
            let mut store = BoardStore::empty(remote.board, BoardConfig::default());
            store.apply_fetched(data, FetchMode::Background);
            store
        };

        assert!(store.board().is_consistent());
    }

    #[test]
    fn test_merge_report_conflicts() {
        assert!(!MergeReport::default().has_conflicts());
        let report = MergeReport {
            dropped_cards: 4,
            ..MergeReport::default()
        };
        assert!(!report.has_conflicts());
        let report = MergeReport {
            kept_local: vec![ColumnId::new()],
            ..MergeReport::default()
        };
        assert!(report.has_conflicts());
        let report = MergeReport {
            displaced_cards: vec![CardId::new()],
            ..MergeReport::default()
        };
        assert!(report.has_conflicts());
    }
}
