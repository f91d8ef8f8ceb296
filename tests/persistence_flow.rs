use std::sync::{Arc, Mutex};
use taskboard_core::storage::{FileStorage, MemoryStorage};
use taskboard_core::{
    Board, BoardConfig, BoardEvent, BoardRef, BoardStore, DragLocation, DragResult, FetchMode,
    Storage, UserId,
};
use tempfile::TempDir;
use uuid::Uuid;

async fn seeded(storage: &dyn Storage) -> anyhow::Result<BoardRef> {
    storage.initialize().await?;
    let config = storage.load_config().await?;
    let board = Board::with_default_columns(BoardRef::new(Uuid::new_v4(), 1), &config);
    let board_ref = board.board;
    storage.save_board(&board).await?;
    Ok(board_ref)
}

fn titles_in(store: &BoardStore, position: usize) -> Vec<String> {
    store.view()[position]
        .cards
        .iter()
        .map(|c| c.title.clone())
        .collect()
}

#[tokio::test]
async fn reorder_is_only_stored_after_persist() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileStorage::new(temp_dir.path());
    let board_ref = seeded(&storage).await?;

    let mut store = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    let todo = store.view()[0].id();
    let done = store.view()[2].id();
    let first = store
        .on_add_card(todo, UserId::new("alice"))
        .expect("column exists");
    let second = store
        .on_add_card(todo, UserId::new("alice"))
        .expect("column exists");
    store.persist(&storage).await?;

    assert!(store.on_drag_end(&DragResult::new(
        first,
        DragLocation::new(todo, 0),
        DragLocation::new(done, 0),
    )));

    // Not yet written back
    let stale = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    assert_eq!(stale.board().card(first).and_then(|c| c.list_id), Some(todo));

    store.persist(&storage).await?;
    assert!(!store.has_unsaved_changes());

    let reloaded = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    assert_eq!(reloaded.board().card(first).and_then(|c| c.list_id), Some(done));
    assert_eq!(reloaded.board().card(second).map(|c| c.index), Some(0));
    assert!(reloaded.board().is_consistent());
    Ok(())
}

#[tokio::test]
async fn deleted_column_cards_are_gone_after_reload() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = FileStorage::new(temp_dir.path());
    let board_ref = seeded(&storage).await?;

    let mut store = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    let doing = store.view()[1].id();
    store.on_add_card(doing, UserId::new("bob"));
    store.on_add_card(doing, UserId::new("bob"));
    store.persist(&storage).await?;

    assert!(store.on_delete_column(doing));
    store.persist(&storage).await?;

    let reloaded = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    assert_eq!(reloaded.view().len(), 2);
    assert!(reloaded.board().cards.is_empty());
    assert!(storage.list_cards(&[doing]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_reports_discarded_local_moves() -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let board_ref = seeded(&storage).await?;

    let mut store = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    let todo = store.view()[0].id();
    let a = store.on_add_card(todo, UserId::new("carol")).expect("column exists");
    store.on_add_card(todo, UserId::new("carol"));
    store.persist(&storage).await?;

    store.on_drag_end(&DragResult::new(
        a,
        DragLocation::new(todo, 0),
        DragLocation::new(todo, 1),
    ));

    let background = store.refresh(&storage, FetchMode::Background).await?;
    assert_eq!(background.kept_local, vec![todo]);
    assert_eq!(store.board().card(a).map(|c| c.index), Some(1));

    let refresh = store.refresh(&storage, FetchMode::Refresh).await?;
    assert_eq!(refresh.overwritten, vec![todo]);
    assert_eq!(store.board().card(a).map(|c| c.index), Some(0));
    assert!(!store.has_unsaved_changes());
    Ok(())
}

#[tokio::test]
async fn observers_see_handler_events() -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let board_ref = seeded(&storage).await?;
    let mut store = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |event: &BoardEvent| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.clone());
        }
    });

    let todo = store.view()[0].id();
    let card = store.on_add_card(todo, UserId::new("dave")).expect("column exists");
    store.on_select_card(card);
    store.on_delete_card(card);
    store.on_delete_column(todo);

    let seen = events.lock().expect("observer lock");
    assert!(matches!(seen[0], BoardEvent::CardAdded(_)));
    assert!(matches!(seen[1], BoardEvent::CardSelectedForEdit(_)));
    assert!(matches!(seen[2], BoardEvent::CardDeleted(_)));
    assert!(matches!(
        &seen[3],
        BoardEvent::ColumnDeleted { removed_cards, .. } if removed_cards.is_empty()
    ));
    assert!(titles_in(&store, 0).is_empty());
    Ok(())
}

#[tokio::test]
async fn card_moved_by_another_client_is_stored_once() -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let board_ref = seeded(&storage).await?;

    let mut ours = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    let todo = ours.view()[0].id();
    let done = ours.view()[2].id();
    let k = ours.on_add_card(todo, UserId::new("erin")).expect("column exists");
    ours.persist(&storage).await?;

    let mut theirs = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    assert!(theirs.on_drag_end(&DragResult::new(
        k,
        DragLocation::new(todo, 0),
        DragLocation::new(done, 0),
    )));
    theirs.persist(&storage).await?;

    ours.on_add_card(todo, UserId::new("erin"));
    let report = ours.refresh(&storage, FetchMode::Background).await?;
    assert_eq!(report.displaced_cards, vec![k]);
    assert!(ours.board().is_consistent());
    ours.persist(&storage).await?;

    let stored = storage.list_cards(&[todo, done]).await?;
    assert_eq!(stored.iter().filter(|c| c.id == k).count(), 1);
    let reloaded = BoardStore::load(&storage, board_ref, BoardConfig::default()).await?;
    assert_eq!(reloaded.board().card(k).and_then(|c| c.list_id), Some(todo));
    assert!(reloaded.board().is_consistent());
    Ok(())
}
