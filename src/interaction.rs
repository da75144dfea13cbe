//! Interaction state store for one swipe-categorize exercise instance.
//!
//! States are implicit in the data:
//!   - in progress: `current_card_index < cards.len()`
//!   - completed:   both buckets together hold every card
//!
//! Actions that are not allowed in the current state are silent no-ops. They
//! return `false` so a host can log them, but never error.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{Attempt, BucketEntry, Card, Category, InteractionState, WrongSwipe};

/// Per-card outcome derived from the attempt log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardReview {
  pub card_id: String,
  pub bucket: Category,
  pub correct_category: Category,
  pub was_correct: bool,
  pub wrong_attempts: usize,
}

#[derive(Clone, Debug)]
pub struct SwipeInteraction {
  cards: Vec<Card>,
  state: InteractionState,
}

impl SwipeInteraction {
  /// Fresh store over `cards`, already in traversal order.
  pub fn new(cards: Vec<Card>) -> Self {
    Self::restore(cards, InteractionState::default())
  }

  /// Store seeded with a previously persisted state, taken verbatim.
  pub fn restore(cards: Vec<Card>, state: InteractionState) -> Self {
    Self { cards, state }
  }

  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn state(&self) -> &InteractionState {
    &self.state
  }

  pub fn swipe_left(&mut self) -> bool {
    self.commit(Category::Left)
  }

  pub fn swipe_right(&mut self) -> bool {
    self.commit(Category::Right)
  }

  /// Commit the current card to `direction` and advance, right or wrong.
  fn commit(&mut self, direction: Category) -> bool {
    if !self.can_interact() {
      return false;
    }
    let Some(card) = self.cards.get(self.state.current_card_index) else {
      return false;
    };

    let timestamp = Utc::now();
    let was_correct = card.correct_category == direction;
    let entry = BucketEntry { card_id: card.id.clone(), timestamp, was_correct };
    match direction {
      Category::Left => self.state.left_bucket.push(entry),
      Category::Right => self.state.right_bucket.push(entry),
    }

    self.state.all_attempts.push(Attempt {
      card_id: card.id.clone(),
      swiped_to: direction,
      timestamp,
      is_correct: was_correct,
    });

    if !was_correct {
      self.state.wrong_swipes.push(WrongSwipe {
        card_id: card.id.clone(),
        swiped_to: direction,
        correct_category: card.correct_category,
        timestamp,
      });
    }

    self.state.current_card_index += 1;
    true
  }

  /// Log a wrong attempt on the current card without committing it.
  /// Only needs a current card; works even after completion checks fail.
  pub fn track_wrong_swipe(&mut self, direction: Category) -> bool {
    let Some(card) = self.cards.get(self.state.current_card_index) else {
      return false;
    };
    let timestamp = Utc::now();
    self.state.wrong_swipes.push(WrongSwipe {
      card_id: card.id.clone(),
      swiped_to: direction,
      correct_category: card.correct_category,
      timestamp,
    });
    self.state.all_attempts.push(Attempt {
      card_id: card.id.clone(),
      swiped_to: direction,
      timestamp,
      is_correct: false,
    });
    true
  }

  pub fn reset(&mut self) {
    self.state = InteractionState::default();
  }

  pub fn is_completed(&self) -> bool {
    self.state.total_swiped() == self.cards.len()
  }

  pub fn can_interact(&self) -> bool {
    !self.is_completed() && self.state.current_card_index < self.cards.len()
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.cards.get(self.state.current_card_index)
  }

  /// Percentage of cards committed, 0 when there are no cards.
  pub fn progress(&self) -> f64 {
    if self.cards.is_empty() {
      return 0.0;
    }
    100.0 * self.state.total_swiped() as f64 / self.cards.len() as f64
  }

  pub fn correct_swipes(&self) -> usize {
    self.state
      .left_bucket
      .iter()
      .chain(self.state.right_bucket.iter())
      .filter(|e| e.was_correct)
      .count()
  }

  pub fn wrong_swipes_count(&self) -> usize {
    self.state.wrong_swipes.len()
  }

  /// Outcome of every committed card, in traversal order.
  pub fn card_reviews(&self) -> Vec<CardReview> {
    let mut out = Vec::new();
    for card in &self.cards {
      let bucketed = self
        .state
        .left_bucket
        .iter()
        .find(|e| e.card_id == card.id)
        .map(|e| (Category::Left, e))
        .or_else(|| {
          self.state
            .right_bucket
            .iter()
            .find(|e| e.card_id == card.id)
            .map(|e| (Category::Right, e))
        });
      let Some((bucket, entry)) = bucketed else { continue };
      let wrong_attempts = self
        .state
        .wrong_swipes
        .iter()
        .filter(|w| w.card_id == card.id)
        .count();
      out.push(CardReview {
        card_id: card.id.clone(),
        bucket,
        correct_category: card.correct_category,
        was_correct: entry.was_correct,
        wrong_attempts,
      });
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scoring::calculate_swipe_categorize_score;

  fn card(id: &str, index: u32, correct: Category) -> Card {
    Card {
      id: id.into(),
      index,
      correct_category: correct,
      content_data: serde_json::json!({ "text": id }),
    }
  }

  fn three_cards() -> Vec<Card> {
    vec![
      card("c1", 0, Category::Left),
      card("c2", 1, Category::Right),
      card("c3", 2, Category::Left),
    ]
  }

  fn score(ix: &SwipeInteraction) -> u8 {
    calculate_swipe_categorize_score(ix.state(), ix.cards().len())
  }

  #[test]
  fn all_correct_first_try() {
    let mut ix = SwipeInteraction::new(three_cards());
    assert!(ix.swipe_left());
    assert!(ix.swipe_right());
    assert!(ix.swipe_left());

    let st = ix.state();
    assert_eq!(st.left_bucket.len(), 2);
    assert_eq!(st.right_bucket.len(), 1);
    assert!(st.wrong_swipes.is_empty());
    assert_eq!(st.current_card_index, 3);
    assert!(ix.is_completed());
    assert!(!ix.can_interact());
    assert!(ix.current_card().is_none());
    assert_eq!(ix.correct_swipes(), 3);
    assert_eq!(score(&ix), 100);
  }

  #[test]
  fn wrong_swipe_still_commits_and_advances() {
    let mut ix = SwipeInteraction::new(three_cards());
    assert!(ix.swipe_right()); // c1 belongs left

    let st = ix.state();
    assert_eq!(st.right_bucket.len(), 1);
    assert!(!st.right_bucket[0].was_correct);
    assert_eq!(st.wrong_swipes.len(), 1);
    assert_eq!(st.wrong_swipes[0].correct_category, Category::Left);
    assert_eq!(st.current_card_index, 1);
    assert!(!st.all_attempts[0].is_correct);

    ix.swipe_right();
    ix.swipe_left();
    assert!(ix.is_completed());
    assert_eq!(ix.correct_swipes(), 2);
    assert_eq!(score(&ix), 85);
  }

  #[test]
  fn partial_progress_score_and_progress() {
    let mut cards = three_cards();
    cards.push(card("c4", 3, Category::Right));
    let mut ix = SwipeInteraction::new(cards);
    ix.swipe_left();
    assert_eq!(ix.progress(), 25.0);
    assert_eq!(score(&ix), 25);
    assert!(ix.can_interact());
    assert_eq!(ix.current_card().map(|c| c.id.as_str()), Some("c2"));
  }

  #[test]
  fn empty_exercise_is_complete_and_inert() {
    let mut ix = SwipeInteraction::new(vec![]);
    assert!(ix.is_completed());
    assert!(!ix.can_interact());
    assert_eq!(ix.progress(), 0.0);
    assert_eq!(score(&ix), 0);
    assert!(!ix.swipe_left());
    assert!(!ix.track_wrong_swipe(Category::Left));
    assert_eq!(ix.state(), &InteractionState::default());
  }

  #[test]
  fn tracked_wrong_swipe_then_correct_commit() {
    let mut ix = SwipeInteraction::new(vec![card("only", 0, Category::Right)]);
    assert!(ix.track_wrong_swipe(Category::Left));
    assert_eq!(ix.state().wrong_swipes.len(), 1);
    assert_eq!(ix.state().current_card_index, 0);
    assert!(ix.state().left_bucket.is_empty());

    assert!(ix.swipe_right());
    assert_eq!(ix.state().right_bucket.len(), 1);
    assert_eq!(ix.state().current_card_index, 1);
    assert!(ix.is_completed());
    assert_eq!(ix.state().all_attempts.len(), 2);
    assert_eq!(ix.wrong_swipes_count(), 1);
    assert_eq!(score(&ix), 85);
  }

  #[test]
  fn swipes_after_completion_leave_state_unchanged() {
    let mut ix = SwipeInteraction::new(three_cards());
    ix.swipe_left();
    ix.swipe_right();
    ix.swipe_left();
    let before = ix.state().clone();
    assert!(!ix.swipe_left());
    assert!(!ix.swipe_right());
    assert_eq!(ix.state(), &before);
  }

  #[test]
  fn track_wrong_swipe_never_moves_pointer_or_buckets() {
    let mut ix = SwipeInteraction::new(three_cards());
    ix.swipe_left();
    for dir in [Category::Left, Category::Right, Category::Left] {
      let idx = ix.state().current_card_index;
      let left = ix.state().left_bucket.clone();
      let right = ix.state().right_bucket.clone();
      let attempts = ix.state().all_attempts.len();
      assert!(ix.track_wrong_swipe(dir));
      assert_eq!(ix.state().current_card_index, idx);
      assert_eq!(ix.state().left_bucket, left);
      assert_eq!(ix.state().right_bucket, right);
      assert_eq!(ix.state().all_attempts.len(), attempts + 1);
    }
    assert_eq!(ix.state().wrong_swipes.len(), 3);
    assert!(ix.state().wrong_swipes.iter().all(|w| w.card_id == "c2"));
  }

  #[test]
  fn reset_returns_to_initial_and_is_idempotent() {
    let mut ix = SwipeInteraction::new(three_cards());
    ix.swipe_right();
    ix.track_wrong_swipe(Category::Left);
    ix.reset();
    assert_eq!(ix.state(), &InteractionState::default());
    ix.reset();
    assert_eq!(ix.state(), &InteractionState::default());
    assert!(ix.can_interact());
  }

  #[test]
  fn invariants_hold_over_mixed_sequences() {
    // Walk every sequence of 5 actions drawn from swipe L/R, track L/R, reset.
    let actions = 5usize.pow(5);
    for code in 0..actions {
      let mut ix = SwipeInteraction::new(three_cards());
      let mut c = code;
      for _ in 0..5 {
        let prev_idx = ix.state().current_card_index;
        let could = ix.can_interact();
        match c % 5 {
          0 => {
            let applied = ix.swipe_left();
            assert_eq!(applied, could);
            assert_eq!(ix.state().current_card_index, prev_idx + usize::from(applied));
          }
          1 => {
            let applied = ix.swipe_right();
            assert_eq!(applied, could);
            assert_eq!(ix.state().current_card_index, prev_idx + usize::from(applied));
          }
          2 => {
            ix.track_wrong_swipe(Category::Left);
            assert_eq!(ix.state().current_card_index, prev_idx);
          }
          3 => {
            ix.track_wrong_swipe(Category::Right);
            assert_eq!(ix.state().current_card_index, prev_idx);
          }
          _ => ix.reset(),
        }
        c /= 5;

        let st = ix.state();
        assert_eq!(st.current_card_index, st.total_swiped());
        assert!(st.total_swiped() <= ix.cards().len());
        assert_eq!(ix.is_completed(), st.total_swiped() == ix.cards().len());
        for e in &st.left_bucket {
          assert!(st.right_bucket.iter().all(|r| r.card_id != e.card_id));
        }
        assert!(score(&ix) <= 100);
      }
    }
  }

  #[test]
  fn card_reviews_count_wrong_attempts_per_card() {
    let mut ix = SwipeInteraction::new(three_cards());
    ix.track_wrong_swipe(Category::Right);
    ix.track_wrong_swipe(Category::Right);
    ix.swipe_left();
    ix.swipe_left(); // c2 is right: wrong commit

    let reviews = ix.card_reviews();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].card_id, "c1");
    assert_eq!(reviews[0].wrong_attempts, 2);
    assert!(reviews[0].was_correct);
    assert_eq!(reviews[1].bucket, Category::Left);
    assert_eq!(reviews[1].correct_category, Category::Right);
    assert!(!reviews[1].was_correct);
    assert_eq!(reviews[1].wrong_attempts, 1);
  }
}
