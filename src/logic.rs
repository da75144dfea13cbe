//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting/resuming sessions
//!   - Applying swipe, wrong-swipe and reset actions
//!   - Building session snapshots (derived views + score) and reviews
//!
//! A client must wire a wrong-direction gesture to either `swipe` (commit it as
//! wrong) or `track_wrong_swipe` (log it and let the learner retry), not both.

use tracing::{debug, info, instrument};

use crate::domain::Category;
use crate::error::AppError;
use crate::protocol::{ReviewOut, SessionOut};
use crate::scoring::calculate_swipe_categorize_score;
use crate::state::{AppState, Session};

pub fn snapshot(session_id: &str, s: &Session, applied: Option<bool>) -> SessionOut {
  let ix = &s.interaction;
  SessionOut {
    session_id: session_id.to_string(),
    exercise_id: s.exercise_id.clone(),
    applied,
    cards: ix.cards().to_vec(),
    card_order: ix.cards().iter().map(|c| c.id.clone()).collect(),
    current_card: ix.current_card().cloned(),
    state: ix.state().clone(),
    is_completed: ix.is_completed(),
    can_interact: ix.can_interact(),
    progress: ix.progress(),
    correct_swipes: ix.correct_swipes(),
    wrong_swipes_count: ix.wrong_swipes_count(),
    score: calculate_swipe_categorize_score(ix.state(), ix.cards().len()),
  }
}

/// Start a fresh session, or resume one from a persisted `restore` blob.
/// Pass the previous snapshot's `card_order` along to keep the same traversal.
#[instrument(level = "info", skip(state, restore, card_order), fields(%exercise_id))]
pub async fn start_session(
  state: &AppState,
  exercise_id: &str,
  restore: Option<&serde_json::Value>,
  card_order: Option<&[String]>,
) -> Result<SessionOut, AppError> {
  let (id, handle) = state.start_session(exercise_id, restore, card_order).await?;
  let s = handle.lock().await;
  Ok(snapshot(&id, &s, None))
}

#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn get_session(state: &AppState, session_id: &str) -> Result<SessionOut, AppError> {
  let s = state.lock_session(session_id).await?;
  Ok(snapshot(session_id, &s, None))
}

#[instrument(level = "info", skip(state), fields(%session_id, %direction))]
pub async fn swipe(state: &AppState, session_id: &str, direction: Category) -> Result<SessionOut, AppError> {
  let mut s = state.lock_session(session_id).await?;
  let current = s.interaction.current_card().map(|c| (c.id.clone(), c.correct_category == direction));
  let applied = match direction {
    Category::Left => s.interaction.swipe_left(),
    Category::Right => s.interaction.swipe_right(),
  };
  if let (true, Some((card_id, correct))) = (applied, current) {
    info!(target: "interaction", %session_id, %card_id, %direction, %correct, "Card committed");
    if s.interaction.is_completed() {
      let score = calculate_swipe_categorize_score(s.interaction.state(), s.interaction.cards().len());
      info!(target: "interaction", %session_id, %score, "Exercise completed");
    }
  } else {
    debug!(target: "interaction", %session_id, %direction, "Swipe ignored: nothing to commit");
  }
  Ok(snapshot(session_id, &s, Some(applied)))
}

#[instrument(level = "info", skip(state), fields(%session_id, %direction))]
pub async fn track_wrong_swipe(state: &AppState, session_id: &str, direction: Category) -> Result<SessionOut, AppError> {
  let mut s = state.lock_session(session_id).await?;
  let applied = s.interaction.track_wrong_swipe(direction);
  if applied {
    info!(target: "interaction", %session_id, %direction, wrong = s.interaction.wrong_swipes_count(), "Wrong swipe tracked");
  } else {
    debug!(target: "interaction", %session_id, "Wrong swipe ignored: no current card");
  }
  Ok(snapshot(session_id, &s, Some(applied)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn reset_session(state: &AppState, session_id: &str) -> Result<SessionOut, AppError> {
  let mut s = state.lock_session(session_id).await?;
  s.interaction.reset();
  info!(target: "interaction", %session_id, "Session reset");
  Ok(snapshot(session_id, &s, Some(true)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn end_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
  state.remove_session(session_id).await?;
  info!(target: "interaction", %session_id, "Session ended");
  Ok(())
}

#[instrument(level = "debug", skip(state), fields(%session_id))]
pub async fn review_session(state: &AppState, session_id: &str) -> Result<ReviewOut, AppError> {
  let s = state.lock_session(session_id).await?;
  let ix = &s.interaction;
  Ok(ReviewOut {
    session_id: session_id.to_string(),
    score: calculate_swipe_categorize_score(ix.state(), ix.cards().len()),
    is_completed: ix.is_completed(),
    cards: ix.card_reviews(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::InteractionState;

  async fn started(st: &AppState) -> SessionOut {
    start_session(st, "seed-true-or-false", None, None).await.expect("session")
  }

  #[tokio::test]
  async fn full_run_through_logic_layer() {
    let st = AppState::from_config(None);
    let s = started(&st).await;
    assert_eq!(s.score, 0);
    assert!(s.can_interact);
    assert_eq!(s.current_card.as_ref().map(|c| c.id.as_str()), Some("water-boils"));

    let id = s.session_id;
    // water-boils: left, sun-planet: right, spider-legs: left
    let out = swipe(&st, &id, Category::Left).await.unwrap();
    assert_eq!(out.applied, Some(true));
    let out = track_wrong_swipe(&st, &id, Category::Left).await.unwrap();
    assert_eq!(out.state.current_card_index, 1);
    assert_eq!(out.wrong_swipes_count, 1);
    swipe(&st, &id, Category::Right).await.unwrap();
    let out = swipe(&st, &id, Category::Left).await.unwrap();
    assert!(out.is_completed);
    assert_eq!(out.progress, 100.0);
    assert_eq!(out.score, 85);

    let out = swipe(&st, &id, Category::Left).await.unwrap();
    assert_eq!(out.applied, Some(false));
    assert_eq!(out.state.current_card_index, 3);

    let review = review_session(&st, &id).await.unwrap();
    assert_eq!(review.cards.len(), 3);
    assert_eq!(review.cards[1].wrong_attempts, 1);
    assert!(review.cards.iter().all(|c| c.was_correct));

    let out = reset_session(&st, &id).await.unwrap();
    assert_eq!(out.state, InteractionState::default());
    assert_eq!(out.score, 0);
  }

  #[tokio::test]
  async fn restored_state_resumes_where_it_left_off() {
    let st = AppState::from_config(None);
    let first = started(&st).await;
    let mid = swipe(&st, &first.session_id, Category::Right).await.unwrap();
    let blob = serde_json::to_value(&mid.state).unwrap();

    let resumed = start_session(&st, "seed-true-or-false", Some(&blob), None).await.unwrap();
    assert_ne!(resumed.session_id, first.session_id);
    assert_eq!(resumed.state, mid.state);
    assert_eq!(resumed.wrong_swipes_count, 1);
    assert_eq!(resumed.current_card.map(|c| c.id), Some("sun-planet".to_string()));
  }

  #[tokio::test]
  async fn unknown_session_is_an_error() {
    let st = AppState::from_config(None);
    assert!(matches!(
      swipe(&st, "missing", Category::Left).await,
      Err(AppError::UnknownSession(_))
    ));
    assert!(review_session(&st, "missing").await.is_err());
    assert!(matches!(end_session(&st, "missing").await, Err(AppError::UnknownSession(_))));
  }

  #[tokio::test]
  async fn commit_log_matches_the_card_swiped() {
    let st = AppState::from_config(None);
    let id = started(&st).await.session_id;
    // water-boils belongs left; a right swipe commits it as wrong
    let out = swipe(&st, &id, Category::Right).await.unwrap();
    let last = out.state.all_attempts.last().expect("attempt");
    assert_eq!(last.card_id, "water-boils");
    assert!(!last.is_correct);
    assert!(!out.state.right_bucket[0].was_correct);
    let out = swipe(&st, &id, Category::Right).await.unwrap();
    assert!(out.state.right_bucket[1].was_correct);
  }

  fn ids_of<'a>(entries: impl Iterator<Item = &'a crate::domain::BucketEntry>) -> Vec<String> {
    entries.map(|e| e.card_id.clone()).collect()
  }

  #[tokio::test]
  async fn resumed_shuffled_session_never_recommits_a_card() {
    let st = AppState::from_config(None);
    for _ in 0..50 {
      let first = start_session(&st, "seed-fruit-or-vegetable", None, None).await.unwrap();
      let mut out = first;
      for _ in 0..3 {
        out = swipe(&st, &out.session_id, Category::Left).await.unwrap();
      }
      let blob = serde_json::to_value(&out.state).unwrap();

      let resumed = start_session(&st, "seed-fruit-or-vegetable", Some(&blob), None).await.unwrap();
      assert_eq!(&resumed.card_order[..3], &out.card_order[..3]);
      let mut out = resumed;
      for _ in 0..3 {
        out = swipe(&st, &out.session_id, Category::Right).await.unwrap();
      }

      assert!(out.is_completed);
      let left = ids_of(out.state.left_bucket.iter());
      let right = ids_of(out.state.right_bucket.iter());
      assert_eq!(left.len() + right.len(), 6);
      assert!(left.iter().all(|id| !right.contains(id)), "left {left:?} right {right:?}");
    }
  }

  #[tokio::test]
  async fn saved_card_order_is_reused_on_resume() {
    let st = AppState::from_config(None);
    let first = start_session(&st, "seed-fruit-or-vegetable", None, None).await.unwrap();
    let mid = swipe(&st, &first.session_id, Category::Left).await.unwrap();
    let blob = serde_json::to_value(&mid.state).unwrap();

    let resumed = start_session(&st, "seed-fruit-or-vegetable", Some(&blob), Some(mid.card_order.as_slice()))
      .await
      .unwrap();
    assert_eq!(resumed.card_order, first.card_order);
    assert_eq!(resumed.current_card.map(|c| c.id), Some(first.card_order[1].clone()));
  }

  #[tokio::test]
  async fn resume_with_foreign_cards_is_rejected() {
    let st = AppState::from_config(None);
    let first = start_session(&st, "seed-fruit-or-vegetable", None, None).await.unwrap();
    let mid = swipe(&st, &first.session_id, Category::Left).await.unwrap();
    let blob = serde_json::to_value(&mid.state).unwrap();

    // a fruit-deck blob handed to the true/false exercise
    let err = start_session(&st, "seed-true-or-false", Some(&blob), None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(ref v) if v.path == "leftBucket[0].cardId"), "{err:?}");

    let mut order = mid.card_order.clone();
    order[5] = "kiwi".into();
    let err = start_session(&st, "seed-fruit-or-vegetable", Some(&blob), Some(order.as_slice()))
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(ref v) if v.path == "cardOrder[5]"), "{err:?}");
  }

  #[tokio::test]
  async fn ended_session_is_gone() {
    let st = AppState::from_config(None);
    let id = started(&st).await.session_id;
    end_session(&st, &id).await.unwrap();
    assert!(matches!(get_session(&st, &id).await, Err(AppError::UnknownSession(_))));
  }
}
