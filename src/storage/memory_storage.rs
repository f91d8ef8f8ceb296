use crate::{
    domain::{Board, BoardConfig, BoardRef, Card, Column, ColumnId},
    error::{Result, TaskboardError},
    storage::{sort_by_index, Storage},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    initialized: bool,
    columns: HashMap<BoardRef, Vec<Column>>,
    cards: HashMap<ColumnId, Vec<Card>>,
    config: Option<BoardConfig>,
}

/// Process-local storage, for tests and for boards that are never written to disk
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        self.state.write().await.initialized = true;
        Ok(())
    }

    async fn list_columns(&self, board: &BoardRef) -> Result<Vec<Column>> {
        let state = self.state.read().await;
        let mut columns = state.columns.get(board).cloned().unwrap_or_default();
        sort_by_index(&mut columns);
        Ok(columns)
    }

    async fn list_cards(&self, column_ids: &[ColumnId]) -> Result<Vec<Card>> {
        let state = self.state.read().await;
        let mut cards: Vec<Card> = column_ids
            .iter()
            .filter_map(|id| state.cards.get(id))
            .flatten()
            .cloned()
            .collect();
        sort_by_index(&mut cards);
        Ok(cards)
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.initialized {
            return Err(TaskboardError::StorageNotInitialized);
        }

        if let Some(previous) = state.columns.insert(board.board, board.columns.clone()) {
            for stale in previous.iter().filter(|old| board.column(old.id).is_none()) {
                state.cards.remove(&stale.id);
            }
        }
        for column in &board.columns {
            let cards: Vec<Card> = board.cards_in(column.id).cloned().collect();
            state.cards.insert(column.id, cards);
        }
        Ok(())
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        Ok(self.state.read().await.config.clone().unwrap_or_default())
    }

    async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        config.validate()?;
        self.state.write().await.config = Some(config.clone());
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }
}
