use std::{path::Path, sync::Arc, time::Duration};

use photo_bingo::{
    config::AppConfig,
    dao::byte_store::InMemoryStorage,
    services::{
        loader::{LoadOutcome, load_state},
        persistence::{self, SnapshotPaths, SnapshotWriter, decode_snapshot, save_channel},
    },
    state::{
        AppState, SharedState,
        game::{GameState, PlayerRecord},
        store::StateStore,
    },
};
use tokio::{sync::watch, task::JoinHandle};

struct Running {
    state: SharedState,
    storage: Arc<InMemoryStorage>,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

fn paths() -> SnapshotPaths {
    SnapshotPaths {
        latest: "state.json".into(),
        backup: "state.prev.json".into(),
    }
}

fn snapshot_at(storage: &InMemoryStorage, path: &str) -> GameState {
    let contents = storage.contents(Path::new(path)).unwrap();
    decode_snapshot(&contents).unwrap()
}

/// Build the state and spawn the loop without giving it a chance to run yet.
fn start(queue_capacity: usize) -> Running {
    let storage = Arc::new(InMemoryStorage::new());
    let (trigger, queue) = save_channel(queue_capacity);
    let state = AppState::new(AppConfig::default(), trigger, storage.clone());
    let (stop, stopped) = watch::channel(false);
    let handle = tokio::spawn(persistence::run(
        state.clone(),
        SnapshotWriter::new(storage.clone(), paths()),
        queue,
        stopped,
    ));
    Running {
        state,
        storage,
        stop,
        handle,
    }
}

impl Running {
    async fn add_player(&self, name: &str) {
        self.state
            .game()
            .modify(|game| {
                game.players
                    .insert(name.into(), PlayerRecord::new("pw".into()));
                Ok::<_, std::convert::Infallible>(())
            })
            .await
            .unwrap();
    }

    async fn wait_for_writes(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.storage.write_count() < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("persistence loop did not write in time");
    }

    async fn shutdown(self) -> Arc<InMemoryStorage> {
        self.stop.send(true).unwrap();
        self.handle.await.unwrap();
        self.storage
    }

    fn latest(&self) -> GameState {
        snapshot_at(&self.storage, "state.json")
    }
}

#[tokio::test]
async fn queued_triggers_coalesce_into_one_save() {
    let running = start(64);
    running.add_player("ada").await;
    for _ in 0..20 {
        running.state.request_save();
    }

    running.wait_for_writes(1).await;
    assert!(running.latest().players.contains_key("ada"));

    let storage = running.shutdown().await;
    assert_eq!(storage.write_count(), 2);
}

#[tokio::test]
async fn shutdown_without_triggers_saves_once() {
    let running = start(4);
    running.add_player("grace").await;

    let storage = running.shutdown().await;
    assert_eq!(storage.write_count(), 1);
    let saved = snapshot_at(&storage, "state.json");
    assert!(saved.players.contains_key("grace"));
}

#[tokio::test]
async fn dropped_shutdown_sender_triggers_final_save() {
    let running = start(4);
    running.add_player("ada").await;

    drop(running.stop);
    running.handle.await.unwrap();
    assert_eq!(running.storage.write_count(), 1);
    let saved = snapshot_at(&running.storage, "state.json");
    assert!(saved.players.contains_key("ada"));
}

#[tokio::test]
async fn second_save_keeps_previous_snapshot_as_backup() {
    let running = start(4);
    running.add_player("first").await;
    running.state.request_save();
    running.wait_for_writes(1).await;

    running.add_player("second").await;
    let storage = running.shutdown().await;

    let backup = snapshot_at(&storage, "state.prev.json");
    let latest = snapshot_at(&storage, "state.json");
    assert_eq!(backup.players.len(), 1);
    assert_eq!(latest.players.len(), 2);
}

#[tokio::test]
async fn failed_save_does_not_stop_the_loop() {
    let running = start(4);
    running.storage.set_fail_writes(true);
    running.add_player("ada").await;
    running.state.request_save();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(running.storage.write_count(), 0);

    running.storage.set_fail_writes(false);
    let storage = running.shutdown().await;
    assert_eq!(storage.write_count(), 1);
    let saved = snapshot_at(&storage, "state.json");
    assert!(saved.players.contains_key("ada"));
}

#[tokio::test]
async fn saved_state_loads_back_identically() {
    let running = start(4);
    running.add_player("ada").await;
    running.add_player("grace").await;
    let expected = running.state.game().read(Clone::clone).await;
    let storage = running.shutdown().await;

    let restored = StateStore::new(GameState::default());
    let outcome = load_state(&restored, storage.as_ref(), Path::new("state.json"))
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Restored { players: 2 });
    assert_eq!(restored.read(Clone::clone).await, expected);
}
