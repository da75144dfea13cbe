//! Card traversal order: canonical (by `index`) or a Fisher–Yates shuffle.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::domain::{Card, InteractionState};
use crate::error::ValidationError;

/// Copy of `cards` sorted by `index` ascending. Ties keep their input order.
pub fn canonical_order(cards: &[Card]) -> Vec<Card> {
  let mut out = cards.to_vec();
  out.sort_by_key(|c| c.index);
  out
}

/// Uniform shuffle of a copy of `cards`.
pub fn shuffled_order<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Vec<Card> {
  let mut out = cards.to_vec();
  for i in (1..out.len()).rev() {
    let j = rng.gen_range(0..=i);
    out.swap(i, j);
  }
  out
}

/// Order used for one session, chosen by the exercise's randomize setting.
pub fn order_cards<R: Rng + ?Sized>(cards: &[Card], randomize: bool, rng: &mut R) -> Vec<Card> {
  if randomize {
    shuffled_order(cards, rng)
  } else {
    canonical_order(cards)
  }
}

/// Order for a resumed session, so the restored pointer lands on an uncommitted card.
///
/// With `saved`, that exact order is reused; it must be a permutation of the
/// exercise's card ids whose first `current_card_index` entries are the bucketed
/// cards. Without it, committed cards come first in commit order and the rest
/// follow `order_cards`. `state` must already pass `check_against_cards`.
pub fn resume_order<R: Rng + ?Sized>(
  cards: &[Card],
  state: &InteractionState,
  saved: Option<&[String]>,
  randomize: bool,
  rng: &mut R,
) -> Result<Vec<Card>, ValidationError> {
  let bucketed: HashSet<&str> = state
    .left_bucket
    .iter()
    .chain(state.right_bucket.iter())
    .map(|e| e.card_id.as_str())
    .collect();

  if let Some(ids) = saved {
    let by_id: HashMap<&str, &Card> = cards.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
      let card = by_id
        .get(id.as_str())
        .ok_or_else(|| ValidationError::new(format!("cardOrder[{i}]"), format!("unknown card {id}")))?;
      if !seen.insert(id.as_str()) {
        return Err(ValidationError::new(format!("cardOrder[{i}]"), format!("card {id} listed twice")));
      }
      out.push((*card).clone());
    }
    if out.len() != cards.len() {
      return Err(ValidationError::new("cardOrder", "must list every card of the exercise"));
    }
    let prefix = state.current_card_index.min(out.len());
    if out[..prefix].iter().any(|c| !bucketed.contains(c.id.as_str())) {
      return Err(ValidationError::new("cardOrder", "committed cards must come first"));
    }
    return Ok(out);
  }

  // attempts are logged in commit order; buckets cover blobs without attempts
  let mut seen = HashSet::new();
  let committed_ids = state
    .all_attempts
    .iter()
    .map(|a| a.card_id.as_str())
    .chain(state.left_bucket.iter().map(|e| e.card_id.as_str()))
    .chain(state.right_bucket.iter().map(|e| e.card_id.as_str()))
    .filter(|id| bucketed.contains(id) && seen.insert(*id));

  let mut out: Vec<Card> = committed_ids
    .filter_map(|id| cards.iter().find(|c| c.id == id).cloned())
    .collect();
  let rest: Vec<Card> = cards.iter().filter(|c| !bucketed.contains(c.id.as_str())).cloned().collect();
  out.extend(order_cards(&rest, randomize, rng));
  Ok(out)
}
