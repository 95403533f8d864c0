/// Bingo boards and their rules.
pub mod board;
pub mod catalog;
/// Players and their boards.
pub mod game;
/// Lock-guarded container for shared state.
pub mod store;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::byte_store::ByteStorage,
    services::persistence::SaveTrigger,
    state::{game::GameState, store::StateStore},
};

/// Handle to the application state cloned into every handler.
pub type SharedState = Arc<AppState>;

/// Central application state handed to every request handler and to the
/// persistence loop.
pub struct AppState {
    game: StateStore<GameState>,
    save_trigger: SaveTrigger,
    storage: Arc<dyn ByteStorage>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The game state starts empty; the startup loader fills it before serving.
    pub fn new(
        config: AppConfig,
        save_trigger: SaveTrigger,
        storage: Arc<dyn ByteStorage>,
    ) -> SharedState {
        Arc::new(Self {
            game: StateStore::new(GameState::default()),
            save_trigger,
            storage,
            config,
        })
    }

    /// The shared game state.
    pub fn game(&self) -> &StateStore<GameState> {
        &self.game
    }

    /// Ask the persistence loop to save soon.
    pub fn request_save(&self) {
        self.save_trigger.request();
    }

    /// Storage uploaded photos are written to.
    pub fn storage(&self) -> &dyn ByteStorage {
        self.storage.as_ref()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
