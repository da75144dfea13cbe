//! Loading the exercise bank from TOML.
//!
//! Schema:
//! ```toml
//! [[exercises]]
//! id = "fruit-or-veg"          # optional, slug of the title when absent
//! title = "Fruit or vegetable?"
//! left_label = "Fruit"
//! right_label = "Vegetable"
//! randomize = true
//!
//! [[exercises.cards]]
//! id = "apple"                 # optional, "<exercise id>-<position>" when absent
//! correct_category = "left"
//! content = { text = "Apple" }
//! ```

use std::{collections::HashSet, fmt::Display, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{Card, Category, Exercise, ExerciseSource};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ExerciseConfig {
  #[serde(default)]
  pub exercises: Vec<ExerciseCfg>,
}

/// Exercise entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ExerciseCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub instructions: Option<String>,
  #[serde(default = "default_left_label")] pub left_label: String,
  #[serde(default = "default_right_label")] pub right_label: String,
  #[serde(default)] pub randomize: bool,
  #[serde(default)] pub cards: Vec<CardCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CardCfg {
  #[serde(default)] pub id: Option<String>,
  /// Defaults to the card's position in the list.
  #[serde(default)] pub index: Option<u32>,
  pub correct_category: Category,
  #[serde(default)] pub content: Option<toml::Value>,
}

fn default_left_label() -> String { "Left".into() }
fn default_right_label() -> String { "Right".into() }

impl ExerciseCfg {
  /// Build the domain exercise. Errors name the reason the entry must be skipped.
  ///
  /// Missing ids are derived from the title (or the entry's `position` in the
  /// bank) and the card's position, so they survive restarts and saved states
  /// keep pointing at the same cards.
  pub fn into_exercise(self, position: usize) -> Result<Exercise, String> {
    let id = self.id.unwrap_or_else(|| {
      let slug = slugify(&self.title);
      if slug.is_empty() { format!("exercise-{position}") } else { slug }
    });
    if self.cards.is_empty() {
      return Err(format!("exercise {id} has no cards"));
    }

    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(self.cards.len());
    for (pos, cc) in self.cards.into_iter().enumerate() {
      let card_id = cc.id.unwrap_or_else(|| format!("{id}-{pos}"));
      if !seen.insert(card_id.clone()) {
        return Err(format!("exercise {id} has duplicate card id {card_id}"));
      }
      let content_data = match cc.content {
        Some(v) => serde_json::to_value(v).map_err(|e| format!("card {card_id}: {e}"))?,
        None => serde_json::Value::Null,
      };
      cards.push(Card {
        id: card_id,
        index: cc.index.unwrap_or(pos as u32),
        correct_category: cc.correct_category,
        content_data,
      });
    }

    Ok(Exercise {
      id,
      title: self.title,
      instructions: self.instructions.unwrap_or_default(),
      left_label: self.left_label,
      right_label: self.right_label,
      randomize: self.randomize,
      source: ExerciseSource::LocalBank,
      cards,
    })
  }
}

/// Lowercase ASCII alphanumerics, everything else collapsed into single dashes.
fn slugify(title: &str) -> String {
  let mut out = String::with_capacity(title.len());
  for ch in title.chars() {
    if ch.is_ascii_alphanumeric() {
      out.push(ch.to_ascii_lowercase());
    } else if !out.is_empty() && !out.ends_with('-') {
      out.push('-');
    }
  }
  out.trim_end_matches('-').to_string()
}

/// Bounds on the in-memory session store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionLimits {
  /// Sessions untouched for longer than this are evicted by the sweeper.
  pub idle_timeout: Duration,
  /// Starting a session beyond this evicts the least recently touched one.
  pub max_sessions: usize,
  pub sweep_interval: Duration,
}

impl Default for SessionLimits {
  fn default() -> Self {
    Self {
      idle_timeout: Duration::from_secs(30 * 60),
      max_sessions: 10_000,
      sweep_interval: Duration::from_secs(60),
    }
  }
}

impl SessionLimits {
  /// SESSION_IDLE_SECS, MAX_SESSIONS, SESSION_SWEEP_SECS; invalid values keep the default.
  pub fn from_env() -> Self {
    let d = Self::default();
    Self {
      idle_timeout: Duration::from_secs(env_or("SESSION_IDLE_SECS", d.idle_timeout.as_secs())),
      max_sessions: env_or("MAX_SESSIONS", d.max_sessions).max(1),
      sweep_interval: Duration::from_secs(env_or("SESSION_SWEEP_SECS", d.sweep_interval.as_secs()).max(1)),
    }
  }
}

fn env_or<T: FromStr + Display>(key: &str, default: T) -> T {
  match std::env::var(key) {
    Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
      warn!(target: "swipe_backend", %key, %raw, %default, "Invalid value, using default");
      default
    }),
    Err(_) => default,
  }
}

pub fn parse_exercise_config(s: &str) -> Result<ExerciseConfig, toml::de::Error> {
  toml::from_str::<ExerciseConfig>(s)
}

/// Attempt to load `ExerciseConfig` from EXERCISE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_exercise_config_from_env() -> Option<ExerciseConfig> {
  let path = std::env::var("EXERCISE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_exercise_config(&s) {
      Ok(cfg) => {
        info!(target: "swipe_backend", %path, exercises = cfg.exercises.len(), "Loaded exercise config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "swipe_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "swipe_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
