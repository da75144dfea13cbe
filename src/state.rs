//! Application state: exercise catalogue and live interaction sessions.
//!
//! This module owns:
//!   - the exercise store (TOML bank + built-in seeds)
//!   - the session store, one `SwipeInteraction` per learner session
//!
//! Sessions are each behind their own mutex, so writes to one session are
//! serialized while different sessions proceed independently. Idle sessions are
//! swept periodically and the store is capped at `SessionLimits::max_sessions`.

use std::{collections::HashMap, sync::Arc, time::Instant};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_exercise_config_from_env, ExerciseConfig, SessionLimits};
use crate::domain::{Exercise, ExerciseSource, InteractionState};
use crate::error::AppError;
use crate::interaction::SwipeInteraction;
use crate::ordering::{order_cards, resume_order};
use crate::persisted::{check_against_cards, parse_interaction_state};
use crate::seeds::seed_exercises;

/// One learner working through one exercise.
#[derive(Debug)]
pub struct Session {
    pub exercise_id: String,
    pub interaction: SwipeInteraction,
    pub last_touched: Instant,
}

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    pub exercises: Arc<RwLock<HashMap<String, Exercise>>>,
    pub sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    pub limits: SessionLimits,
}

impl AppState {
    /// Build state from env: load config, seed exercises, session limits.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_exercise_config_from_env()).with_limits(SessionLimits::from_env())
    }

    pub fn from_config(cfg_opt: Option<ExerciseConfig>) -> Self {
        let mut by_id = HashMap::<String, Exercise>::new();

        if let Some(cfg) = cfg_opt {
            for (position, ec) in cfg.exercises.into_iter().enumerate() {
                let title = ec.title.clone();
                match ec.into_exercise(position) {
                    Ok(ex) => {
                        if by_id.contains_key(&ex.id) {
                            error!(target: "interaction", id = %ex.id, %title, "Skipping bank exercise: duplicate id.");
                            continue;
                        }
                        by_id.insert(ex.id.clone(), ex);
                    }
                    Err(reason) => {
                        error!(target: "interaction", %title, %reason, "Skipping bank exercise.");
                    }
                }
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for ex in seed_exercises() {
            by_id.entry(ex.id.clone()).or_insert(ex);
        }

        let bank = by_id.values().filter(|e| e.source == ExerciseSource::LocalBank).count();
        let seed = by_id.len() - bank;
        info!(target: "interaction", local_bank = bank, seed = seed, "Startup exercise inventory");

        Self {
            exercises: Arc::new(RwLock::new(by_id)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limits: SessionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        info!(target: "interaction", idle_secs = limits.idle_timeout.as_secs(), max_sessions = limits.max_sessions, "Session limits");
        self.limits = limits;
        self
    }

    /// All exercises, sorted by id for stable listings.
    pub async fn list_exercises(&self) -> Vec<Exercise> {
        let mut out: Vec<Exercise> = self.exercises.read().await.values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_exercise(&self, id: &str) -> Option<Exercise> {
        self.exercises.read().await.get(id).cloned()
    }

    /// Start a session. A fresh one fixes the card order once; a resumed one reuses
    /// `card_order` when given, or rebuilds an order consistent with the saved state.
    #[instrument(level = "info", skip(self, restore, card_order), fields(%exercise_id, restored = restore.is_some(), has_order = card_order.is_some()))]
    pub async fn start_session(
        &self,
        exercise_id: &str,
        restore: Option<&serde_json::Value>,
        card_order: Option<&[String]>,
    ) -> Result<(String, SessionHandle), AppError> {
        let exercise = self
            .get_exercise(exercise_id)
            .await
            .ok_or_else(|| AppError::UnknownExercise(exercise_id.to_string()))?;

        let (cards, initial) = if restore.is_none() && card_order.is_none() {
            let cards = order_cards(&exercise.cards, exercise.randomize, &mut rand::thread_rng());
            (cards, InteractionState::default())
        } else {
            let initial = match restore {
                Some(v) => parse_interaction_state(v)?,
                None => InteractionState::default(),
            };
            check_against_cards(&initial, &exercise.cards)?;
            let cards = resume_order(&exercise.cards, &initial, card_order, exercise.randomize, &mut rand::thread_rng())?;
            (cards, initial)
        };

        let session = Session {
            exercise_id: exercise.id.clone(),
            interaction: SwipeInteraction::restore(cards, initial),
            last_touched: Instant::now(),
        };

        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(session));
        {
            let mut sessions = self.sessions.write().await;
            while sessions.len() >= self.limits.max_sessions {
                // Busy sessions are never evicted; if all are busy the cap is briefly exceeded.
                let oldest = sessions
                    .iter()
                    .filter_map(|(sid, h)| h.try_lock().ok().map(|s| (s.last_touched, sid.clone())))
                    .min_by_key(|(t, _)| *t)
                    .map(|(_, sid)| sid);
                match oldest {
                    Some(sid) => {
                        sessions.remove(&sid);
                        warn!(target: "interaction", session_id = %sid, max = self.limits.max_sessions, "Session cap reached; evicted least recently used");
                    }
                    None => break,
                }
            }
            sessions.insert(id.clone(), handle.clone());
        }
        info!(target: "interaction", session_id = %id, %exercise_id, "Session started");
        Ok((id, handle))
    }

    /// Lock a session for one operation and mark it as recently used.
    pub async fn lock_session(&self, session_id: &str) -> Result<OwnedMutexGuard<Session>, AppError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))?;
        let mut guard = handle.lock_owned().await;
        guard.last_touched = Instant::now();
        Ok(guard)
    }

    #[instrument(level = "info", skip(self), fields(%session_id))]
    pub async fn remove_session(&self, session_id: &str) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `limits.idle_timeout` as of `now`.
    /// Sessions locked by an in-flight operation are kept. Returns how many were removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let idle = self.limits.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, h| match h.try_lock() {
            Ok(s) => now.saturating_duration_since(s.last_touched) < idle,
            Err(_) => true,
        });
        before - sessions.len()
    }
}

/// Periodically evict idle sessions for the lifetime of the process.
pub fn spawn_session_sweeper(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(state.limits.sweep_interval);
        loop {
            tick.tick().await;
            let evicted = state.evict_idle(Instant::now()).await;
            if evicted > 0 {
                let remaining = state.session_count().await;
                info!(target: "interaction", evicted, remaining, "Idle sessions evicted");
            } else {
                debug!(target: "interaction", "Session sweep: nothing idle");
            }
        }
    })
}
