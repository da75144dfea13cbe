//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Card, Category, Exercise, ExerciseSource, InteractionState};
use crate::interaction::CardReview;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListExercises,
    StartSession {
        #[serde(rename = "exerciseId")]
        exercise_id: String,
        /// Previously persisted state to resume from.
        #[serde(default)]
        state: Option<serde_json::Value>,
        /// Card order of the session that produced `state`, as sent in `cardOrder`.
        #[serde(default, rename = "cardOrder")]
        card_order: Option<Vec<String>>,
    },
    GetSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Swipe {
        #[serde(rename = "sessionId")]
        session_id: String,
        direction: Category,
    },
    TrackWrongSwipe {
        #[serde(rename = "sessionId")]
        session_id: String,
        direction: Category,
    },
    Reset {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Review {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    EndSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Exercises { exercises: Vec<ExerciseOut> },
    Session { session: SessionOut },
    Review { review: ReviewOut },
    SessionEnded {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Error { message: String },
}

/// Exercise summary; cards are only delivered inside a session, in session order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOut {
    pub id: String,
    pub title: String,
    pub instructions: String,
    pub left_label: String,
    pub right_label: String,
    pub randomize: bool,
    pub source: ExerciseSource,
    pub card_count: usize,
}

pub fn exercise_out(e: &Exercise) -> ExerciseOut {
    ExerciseOut {
        id: e.id.clone(),
        title: e.title.clone(),
        instructions: e.instructions.clone(),
        left_label: e.left_label.clone(),
        right_label: e.right_label.clone(),
        randomize: e.randomize,
        source: e.source.clone(),
        card_count: e.cards.len(),
    }
}

/// Full session snapshot: raw state (persistable verbatim) plus derived views.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub session_id: String,
    pub exercise_id: String,
    /// Whether the action that produced this snapshot changed the state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<bool>,
    pub cards: Vec<Card>,
    /// Card ids in session order; send back with `state` to resume the same order.
    pub card_order: Vec<String>,
    pub current_card: Option<Card>,
    pub state: InteractionState,
    pub is_completed: bool,
    pub can_interact: bool,
    pub progress: f64,
    pub correct_swipes: usize,
    pub wrong_swipes_count: usize,
    pub score: u8,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOut {
    pub session_id: String,
    pub score: u8,
    pub is_completed: bool,
    pub cards: Vec<CardReview>,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionIn {
    pub exercise_id: String,
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    #[serde(default)]
    pub card_order: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SwipeIn {
    pub direction: Category,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
