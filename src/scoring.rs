//! Score for a swipe-categorize exercise, 0..=100.
//!
//! Every card is eventually committed, so the score approximates first-try accuracy
//! and is penalized per wrong attempt. Floors: 10 while in progress, 30 when done.

use crate::domain::InteractionState;

const WRONG_SWIPE_PENALTY: f64 = 15.0;
const IN_PROGRESS_FLOOR: f64 = 10.0;
const COMPLETED_FLOOR: f64 = 30.0;

pub fn calculate_swipe_categorize_score(state: &InteractionState, total_cards: usize) -> u8 {
  let total_swiped = state.total_swiped();
  if total_swiped == 0 {
    return 0;
  }

  let wrong = state.wrong_swipes.len() as f64;
  let penalty = WRONG_SWIPE_PENALTY * wrong;

  let score = if total_swiped < total_cards {
    // total_cards > total_swiped > 0 here, so the divisions are safe.
    let total = total_cards as f64;
    let first_try_correct = total_swiped as f64 - wrong;
    let first_try_accuracy = 100.0 * first_try_correct / total;
    let completion_rate = total_swiped as f64 / total;
    (first_try_accuracy - penalty * completion_rate).max(IN_PROGRESS_FLOOR)
  } else {
    (100.0 - penalty).max(COMPLETED_FLOOR)
  };

  score.round().min(100.0) as u8
}
