use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with the number of signed-up players.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let players = state.game().read(|game| game.players.len()).await;
    HealthResponse::ok(players)
}
