use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::{
        board::{BoardView, SpaceAction, SpaceView},
        signup::SignupRequest,
    },
    error::ServiceError,
    services::{
        auth_service::{SessionToken, generate_password},
        upload_service,
    },
    state::{
        SharedState,
        board::{BoardError, Position},
        game::{GameState, PlayerRecord},
    },
};

/// Result of a successful signup.
#[derive(Debug)]
pub struct Signup {
    /// Session cookie value for the new player.
    pub session: String,
    /// The freshly drawn board.
    pub board: BoardView,
}

fn unknown_player(user: &str) -> ServiceError {
    ServiceError::NotFound(format!("player `{user}` not found"))
}

fn player<'a>(game: &'a GameState, user: &str) -> Result<&'a PlayerRecord, ServiceError> {
    game.players.get(user).ok_or_else(|| unknown_player(user))
}

fn player_mut<'a>(
    game: &'a mut GameState,
    user: &str,
) -> Result<&'a mut PlayerRecord, ServiceError> {
    game.players
        .get_mut(user)
        .ok_or_else(|| unknown_player(user))
}

/// Board coordinates from a request path.
pub fn position(x: usize, y: usize) -> Result<Position, ServiceError> {
    Ok(Position::new(x, y)?)
}

/// Register a new player with a random board and password.
pub async fn signup(state: &SharedState, request: SignupRequest) -> Result<Signup, ServiceError> {
    request.validate()?;

    let token = SessionToken {
        user: request.username,
        password: generate_password(),
    };
    let session = token
        .encode()
        .map_err(|err| ServiceError::Internal(format!("encoding session: {err}")))?;
    let record = PlayerRecord::new(token.password.clone());
    let board = BoardView::new(
        token.user.clone(),
        record.board.display(),
        record.board.score(),
        &state.config().base_path,
    );

    state
        .game()
        .modify(|game| {
            if game.players.contains_key(&token.user) {
                return Err(ServiceError::Conflict(format!(
                    "user name `{}` is already taken",
                    token.user
                )));
            }
            game.players.insert(token.user.clone(), record);
            Ok(())
        })
        .await?;

    info!(user = %token.user, "player signed up");
    state.request_save();
    Ok(Signup { session, board })
}

/// Whole board of `user` with its score.
pub async fn board(state: &SharedState, user: &str) -> Result<BoardView, ServiceError> {
    let (display, score) = state
        .game()
        .read(|game| {
            let board = &player(game, user)?.board;
            Ok::<_, ServiceError>((board.display(), board.score()))
        })
        .await?;

    Ok(BoardView::new(
        user.to_string(),
        display,
        score,
        &state.config().base_path,
    ))
}

/// Single space of `user`'s board.
pub async fn space(
    state: &SharedState,
    user: &str,
    position: Position,
) -> Result<SpaceView, ServiceError> {
    let space = state
        .game()
        .read(|game| Ok::<_, ServiceError>(player(game, user)?.board.display_space(position)))
        .await?;
    Ok(SpaceView::new(space, &state.config().base_path))
}

/// Complete or decomplete a space.
pub async fn apply_action(
    state: &SharedState,
    user: &str,
    position: Position,
    action: SpaceAction,
) -> Result<SpaceView, ServiceError> {
    let completed = matches!(action, SpaceAction::Complete);
    let space = state
        .game()
        .modify(|game| {
            let board = &mut player_mut(game, user)?.board;
            board.set_completed(position, completed)?;
            Ok::<_, ServiceError>(board.display_space(position))
        })
        .await?;

    debug!(%user, %position, ?action, "space updated");
    state.request_save();
    Ok(SpaceView::new(space, &state.config().base_path))
}

/// Attach an already stored image to a space, completing it. The photo it
/// replaces is removed from storage.
pub async fn attach_image(
    state: &SharedState,
    user: &str,
    position: Position,
    image: String,
) -> Result<SpaceView, ServiceError> {
    let (space, replaced) = state
        .game()
        .modify(|game| {
            let board = &mut player_mut(game, user)?.board;
            let replaced = board.attach_image(position, image)?;
            Ok::<_, ServiceError>((board.display_space(position), replaced))
        })
        .await?;

    debug!(%user, %position, "image attached");
    state.request_save();
    if let Some(replaced) = replaced.filter(|old| Some(old) != space.image.as_ref()) {
        upload_service::discard_image(state, &replaced).await;
    }
    Ok(SpaceView::new(space, &state.config().base_path))
}

/// Store an uploaded photo and attach it to a space.
///
/// The file is written before the state changes. If the space turns out to
/// be unavailable the file is removed again.
pub async fn upload_image(
    state: &SharedState,
    user: &str,
    position: Position,
    content_type: Option<&str>,
    contents: Vec<u8>,
) -> Result<SpaceView, ServiceError> {
    if position == Position::CENTER {
        return Err(BoardError::Locked(position).into());
    }

    let image = upload_service::store_image(state, user, position, content_type, contents).await?;
    match attach_image(state, user, position, image.clone()).await {
        Ok(view) => Ok(view),
        Err(err) => {
            upload_service::discard_image(state, &image).await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::byte_store::InMemoryStorage,
        services::persistence::save_channel,
        state::AppState,
    };

    struct Harness {
        state: SharedState,
        storage: Arc<InMemoryStorage>,
        saves: mpsc::Receiver<()>,
    }

    impl Harness {
        fn new() -> Self {
            let (trigger, saves) = save_channel(64);
            let storage = Arc::new(InMemoryStorage::new());
            let state = AppState::new(AppConfig::default(), trigger, storage.clone());
            Self {
                state,
                storage,
                saves,
            }
        }

        fn pending_saves(&mut self) -> usize {
            let mut count = 0;
            while self.saves.try_recv().is_ok() {
                count += 1;
            }
            count
        }
    }

    fn request(name: &str) -> SignupRequest {
        SignupRequest {
            username: name.into(),
        }
    }

    fn corner() -> Position {
        Position::new(0, 0).unwrap()
    }

    async fn corner_image(state: &SharedState, user: &str) -> String {
        state
            .game()
            .read(|game| game.players[user].board.space(corner()).image.clone())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn signup_creates_player_and_requests_save() {
        let mut harness = Harness::new();
        let signup = signup(&harness.state, request("ada")).await.unwrap();

        let token = SessionToken::decode(&signup.session).unwrap();
        assert_eq!(token.user, "ada");
        assert_eq!(signup.board.user, "ada");
        assert_eq!(signup.board.score, 0);
        assert_eq!(harness.pending_saves(), 1);

        let stored = harness
            .state
            .game()
            .read(|game| game.players["ada"].password.clone())
            .await;
        assert_eq!(stored, token.password);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_without_save() {
        let mut harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();
        harness.pending_saves();

        let err = signup(&harness.state, request("ada")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(harness.pending_saves(), 0);
        let players = harness.state.game().read(|game| game.players.len()).await;
        assert_eq!(players, 1);
    }

    #[tokio::test]
    async fn invalid_name_is_rejected() {
        let harness = Harness::new();
        let err = signup(&harness.state, request("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_with_one_name_admit_exactly_one() {
        let harness = Harness::new();
        let handles = (0..16)
            .map(|_| {
                let state = harness.state.clone();
                tokio::spawn(async move { signup(&state, request("grace")).await })
            })
            .collect::<Vec<_>>();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn completing_spaces_updates_the_score() {
        let mut harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();
        harness.pending_saves();

        for x in 0..5 {
            let position = Position::new(x, 2).unwrap();
            if position == Position::CENTER {
                continue;
            }
            let view = apply_action(&harness.state, "ada", position, SpaceAction::Complete)
                .await
                .unwrap();
            assert!(view.completed);
        }
        assert_eq!(harness.pending_saves(), 4);
        assert_eq!(board(&harness.state, "ada").await.unwrap().score, 1);

        let middle_left = Position::new(1, 2).unwrap();
        let view = apply_action(&harness.state, "ada", middle_left, SpaceAction::Decomplete)
            .await
            .unwrap();
        assert!(!view.completed);
        let stored = space(&harness.state, "ada", middle_left).await.unwrap();
        assert!(!stored.completed);
        assert_eq!(board(&harness.state, "ada").await.unwrap().score, 0);
    }

    #[tokio::test]
    async fn center_cannot_be_changed() {
        let mut harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();
        harness.pending_saves();

        let err = apply_action(
            &harness.state,
            "ada",
            Position::CENTER,
            SpaceAction::Decomplete,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = upload_image(
            &harness.state,
            "ada",
            Position::CENTER,
            Some("image/jpeg"),
            vec![0xff, 0xd8],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(harness.storage.write_count(), 0);
        assert_eq!(harness.pending_saves(), 0);
    }

    #[tokio::test]
    async fn upload_stores_file_and_completes_space() {
        let mut harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();
        harness.pending_saves();

        let view = upload_image(
            &harness.state,
            "ada",
            corner(),
            Some("image/jpeg"),
            vec![0xff, 0xd8, 0xff],
        )
        .await
        .unwrap();
        assert!(view.completed);
        assert_eq!(harness.pending_saves(), 1);

        let image = corner_image(&harness.state, "ada").await;
        assert_eq!(
            view.image_url.as_deref(),
            Some(format!("/photo-bingo/{image}").as_str())
        );
        assert_eq!(
            harness.storage.contents(Path::new(&image)),
            Some(vec![0xff, 0xd8, 0xff])
        );
    }

    #[tokio::test]
    async fn second_upload_removes_the_replaced_photo() {
        let harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();

        upload_image(
            &harness.state,
            "ada",
            corner(),
            Some("image/jpeg"),
            vec![1],
        )
        .await
        .unwrap();
        let first = corner_image(&harness.state, "ada").await;
        upload_image(
            &harness.state,
            "ada",
            corner(),
            Some("image/jpeg"),
            vec![2],
        )
        .await
        .unwrap();
        let second = corner_image(&harness.state, "ada").await;

        assert_ne!(first, second);
        assert_eq!(harness.storage.contents(Path::new(&first)), None);
        assert_eq!(harness.storage.contents(Path::new(&second)), Some(vec![2]));
        assert_eq!(harness.storage.file_count(), 1);
    }

    #[tokio::test]
    async fn upload_for_unknown_player_leaves_no_file() {
        let harness = Harness::new();
        let err = upload_image(
            &harness.state,
            "ghost",
            corner(),
            Some("image/jpeg"),
            vec![0xff, 0xd8],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(harness.storage.write_count(), 1);
        assert_eq!(harness.storage.file_count(), 0);
    }

    #[tokio::test]
    async fn failed_image_write_leaves_state_untouched() {
        let mut harness = Harness::new();
        signup(&harness.state, request("ada")).await.unwrap();
        harness.pending_saves();
        harness.storage.set_fail_writes(true);

        let err = upload_image(
            &harness.state,
            "ada",
            corner(),
            Some("image/jpeg"),
            vec![0xff, 0xd8],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(harness.pending_saves(), 0);
        let stored = space(&harness.state, "ada", corner()).await.unwrap();
        assert!(!stored.completed);
    }
}
