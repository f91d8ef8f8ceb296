use crate::{
    domain::{Board, BoardConfig, BoardRef, Card, Column, ColumnId},
    error::{Result, TaskboardError},
    storage::{sort_by_index, Storage},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based storage implementation
///
/// Layout under the project root:
///
/// ```text
/// .taskboard/
///   config.json
///   boards/<board id>/v<version>/columns.json
///   cards/<column id>.json
/// ```
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const ROOT_DIR: &'static str = ".taskboard";
    const BOARDS_DIR: &'static str = "boards";
    const CARDS_DIR: &'static str = "cards";
    const COLUMNS_FILE: &'static str = "columns.json";
    const CONFIG_FILE: &'static str = "config.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::ROOT_DIR),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn cards_dir(&self) -> PathBuf {
        self.root_path.join(Self::CARDS_DIR)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    fn board_dir(&self, board: &BoardRef) -> PathBuf {
        self.boards_dir()
            .join(board.id.to_string())
            .join(format!("v{}", board.version))
    }

    fn columns_file(&self, board: &BoardRef) -> PathBuf {
        self.board_dir(board).join(Self::COLUMNS_FILE)
    }

    fn cards_file(&self, column_id: &ColumnId) -> PathBuf {
        self.cards_dir().join(format!("{}.json", column_id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.boards_dir()).await?;
        self.ensure_directory_exists(&self.cards_dir()).await?;

        if !self.config_file().exists() {
            self.save_config(&BoardConfig::default()).await?;
        }

        Ok(())
    }

    async fn list_columns(&self, board: &BoardRef) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = Self::read_json(&self.columns_file(board))
            .await?
            .unwrap_or_default();
        sort_by_index(&mut columns);
        Ok(columns)
    }

    async fn list_cards(&self, column_ids: &[ColumnId]) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        for id in column_ids {
            let column_cards: Option<Vec<Card>> = Self::read_json(&self.cards_file(id)).await?;
            cards.extend(column_cards.unwrap_or_default());
        }
        sort_by_index(&mut cards);
        Ok(cards)
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        if !self.is_initialized().await {
            return Err(TaskboardError::StorageNotInitialized);
        }

        let columns_file = self.columns_file(&board.board);
        let previous: Vec<Column> = Self::read_json(&columns_file).await?.unwrap_or_default();

        self.ensure_directory_exists(&self.board_dir(&board.board))
            .await?;
        Self::write_json(&columns_file, &board.columns).await?;

        for column in &board.columns {
            let mut cards: Vec<&Card> = board.cards_in(column.id).collect();
            cards.sort_by_key(|c| c.index);
            Self::write_json(&self.cards_file(&column.id), &cards).await?;
        }

        for stale in previous
            .iter()
            .filter(|old| board.column(old.id).is_none())
        {
            let path = self.cards_file(&stale.id);
            if path.exists() {
                fs::remove_file(path).await?;
            }
            debug!(column = %stale.id, "removed cards of deleted column");
        }

        Ok(())
    }

    async fn load_config(&self) -> Result<BoardConfig> {
        let config: BoardConfig = Self::read_json(&self.config_file())
            .await?
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        config.validate()?;
        self.ensure_directory_exists(&self.root_path).await?;
        Self::write_json(&self.config_file(), config).await
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.boards_dir().exists() && self.cards_dir().exists()
    }
}
