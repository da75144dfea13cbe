//! Validation of persisted interaction state blobs handed back by clients.
//!
//! Missing fields fall back to the Initial state's values (empty lists, index 0).
//! Anything present but malformed is rejected with the offending field path.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{Attempt, BucketEntry, Card, Category, InteractionState, WrongSwipe};
use crate::error::ValidationError;

type Obj = Map<String, Value>;

pub fn parse_interaction_state(value: &Value) -> Result<InteractionState, ValidationError> {
  let obj = match value {
    Value::Null => return Ok(InteractionState::default()),
    Value::Object(o) => o,
    _ => return Err(ValidationError::new("$", "expected an object")),
  };

  let current_card_index = match obj.get("currentCardIndex") {
    None | Some(Value::Null) => 0,
    Some(v) => v
      .as_u64()
      .ok_or_else(|| ValidationError::new("currentCardIndex", "expected a non-negative integer"))?
      as usize,
  };

  Ok(InteractionState {
    current_card_index,
    left_bucket: parse_list(obj, "leftBucket", bucket_entry)?,
    right_bucket: parse_list(obj, "rightBucket", bucket_entry)?,
    wrong_swipes: parse_list(obj, "wrongSwipes", wrong_swipe)?,
    all_attempts: parse_list(obj, "allAttempts", attempt)?,
  })
}

/// Check a parsed state against the cards of the exercise it claims to belong to.
///
/// Every referenced card id must exist, a card sits in at most one bucket entry,
/// and the pointer must equal the number of committed cards.
pub fn check_against_cards(state: &InteractionState, cards: &[Card]) -> Result<(), ValidationError> {
  let known: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();

  let mut bucketed = HashSet::new();
  for (key, bucket) in [("leftBucket", &state.left_bucket), ("rightBucket", &state.right_bucket)] {
    for (i, e) in bucket.iter().enumerate() {
      if !known.contains(e.card_id.as_str()) {
        return Err(ValidationError::new(format!("{key}[{i}].cardId"), format!("unknown card {}", e.card_id)));
      }
      if !bucketed.insert(e.card_id.as_str()) {
        return Err(ValidationError::new(format!("{key}[{i}].cardId"), format!("card {} is already bucketed", e.card_id)));
      }
    }
  }

  let logged = state
    .wrong_swipes
    .iter()
    .map(|w| w.card_id.as_str())
    .enumerate()
    .map(|(i, id)| (format!("wrongSwipes[{i}].cardId"), id))
    .chain(
      state
        .all_attempts
        .iter()
        .enumerate()
        .map(|(i, a)| (format!("allAttempts[{i}].cardId"), a.card_id.as_str())),
    );
  for (path, id) in logged {
    if !known.contains(id) {
      return Err(ValidationError::new(path, format!("unknown card {id}")));
    }
  }

  if state.current_card_index != state.total_swiped() {
    return Err(ValidationError::new(
      "currentCardIndex",
      format!("expected {} (one per bucketed card)", state.total_swiped()),
    ));
  }
  Ok(())
}

fn parse_list<T>(
  obj: &Obj,
  key: &str,
  item: fn(&Obj, &str) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
  let arr = match obj.get(key) {
    None | Some(Value::Null) => return Ok(Vec::new()),
    Some(Value::Array(a)) => a,
    Some(_) => return Err(ValidationError::new(key, "expected an array")),
  };
  arr
    .iter()
    .enumerate()
    .map(|(i, v)| {
      let path = format!("{key}[{i}]");
      let o = v.as_object().ok_or_else(|| ValidationError::new(&path, "expected an object"))?;
      item(o, &path)
    })
    .collect()
}

fn bucket_entry(o: &Obj, path: &str) -> Result<BucketEntry, ValidationError> {
  Ok(BucketEntry {
    card_id: string_field(o, path, "cardId")?,
    timestamp: timestamp_field(o, path)?,
    was_correct: bool_field(o, path, "wasCorrect")?,
  })
}

fn wrong_swipe(o: &Obj, path: &str) -> Result<WrongSwipe, ValidationError> {
  Ok(WrongSwipe {
    card_id: string_field(o, path, "cardId")?,
    swiped_to: category_field(o, path, "swipedTo")?,
    correct_category: category_field(o, path, "correctCategory")?,
    timestamp: timestamp_field(o, path)?,
  })
}

fn attempt(o: &Obj, path: &str) -> Result<Attempt, ValidationError> {
  Ok(Attempt {
    card_id: string_field(o, path, "cardId")?,
    swiped_to: category_field(o, path, "swipedTo")?,
    timestamp: timestamp_field(o, path)?,
    is_correct: bool_field(o, path, "isCorrect")?,
  })
}

fn string_field(o: &Obj, path: &str, key: &str) -> Result<String, ValidationError> {
  o.get(key)
    .and_then(Value::as_str)
    .map(str::to_string)
    .ok_or_else(|| ValidationError::new(format!("{path}.{key}"), "expected a string"))
}

fn bool_field(o: &Obj, path: &str, key: &str) -> Result<bool, ValidationError> {
  o.get(key)
    .and_then(Value::as_bool)
    .ok_or_else(|| ValidationError::new(format!("{path}.{key}"), "expected a boolean"))
}

fn category_field(o: &Obj, path: &str, key: &str) -> Result<Category, ValidationError> {
  match o.get(key).and_then(Value::as_str) {
    Some("left") => Ok(Category::Left),
    Some("right") => Ok(Category::Right),
    _ => Err(ValidationError::new(format!("{path}.{key}"), "expected \"left\" or \"right\"")),
  }
}

/// Accepts RFC 3339 strings or epoch milliseconds.
fn timestamp_field(o: &Obj, path: &str) -> Result<DateTime<Utc>, ValidationError> {
  let field = format!("{path}.timestamp");
  match o.get("timestamp") {
    Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
      .map(|t| t.with_timezone(&Utc))
      .map_err(|e| ValidationError::new(field, format!("invalid RFC 3339 timestamp: {e}"))),
    Some(Value::Number(n)) => n
      .as_i64()
      .and_then(DateTime::<Utc>::from_timestamp_millis)
      .ok_or_else(|| ValidationError::new(field, "invalid epoch milliseconds")),
    _ => Err(ValidationError::new(field, "expected a timestamp")),
  }
}
