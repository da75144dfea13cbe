//! Domain models: cards, categories, exercises, and the interaction state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two buckets a card can be sorted into.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Left,
  Right,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Category::Left => "left",
      Category::Right => "right",
    }
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Immutable unit of content to categorize.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: String,
  pub index: u32,
  pub correct_category: Category,
  /// Rich text or media reference, passed through untouched.
  #[serde(default)]
  pub content_data: serde_json::Value,
}

/// A card that ended up in a bucket.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketEntry {
  pub card_id: String,
  pub timestamp: DateTime<Utc>,
  pub was_correct: bool,
}

/// A swipe toward the wrong category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WrongSwipe {
  pub card_id: String,
  pub swiped_to: Category,
  pub correct_category: Category,
  pub timestamp: DateTime<Utc>,
}

/// Entry of the append-only attempt log (correct or not).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
  pub card_id: String,
  pub swiped_to: Category,
  pub timestamp: DateTime<Utc>,
  pub is_correct: bool,
}

/// Mutable record of one learner's progress through one exercise.
/// `Default` is the Initial state.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
  pub current_card_index: usize,
  pub left_bucket: Vec<BucketEntry>,
  pub right_bucket: Vec<BucketEntry>,
  pub wrong_swipes: Vec<WrongSwipe>,
  pub all_attempts: Vec<Attempt>,
}

impl InteractionState {
  /// Cards committed to either bucket.
  pub fn total_swiped(&self) -> usize {
    self.left_bucket.len() + self.right_bucket.len()
  }
}

/// Where did we get the exercise from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSource {
  LocalBank, // from user-provided TOML bank
  Seed,      // built-in seeds
}

/// A swipe-categorize exercise: labels for both buckets plus its cards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
  pub id: String,
  pub title: String,
  #[serde(default)] pub instructions: String,
  pub left_label: String,
  pub right_label: String,
  /// Shuffle card order once per session instead of using canonical order.
  #[serde(default)] pub randomize: bool,
  pub source: ExerciseSource,
  pub cards: Vec<Card>,
}
