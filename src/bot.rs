//! HelpdeskBot: per-turn coordinator between a channel, the router, the
//! dialog engine and the state store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::HelpdeskConfig;
use crate::dialogs::{Activity, DialogSet, DialogState, TurnStatus};
use crate::error::Result;
use crate::profile::{EntityProfile, state_keys};
use crate::router::{Route, Router};
use crate::store::{StateAccessor, StateStore};
use crate::topics::{self, greeting::MAIN_MENU};

pub const CANCELLED: &str = "Ok. I've cancelled our last activity.";
pub const NOTHING_TO_CANCEL: &str = "There is nothing to cancel.";
pub const HELP_TEXT: &str =
    "I can help with RP login, project assignment, report and approver issues. Please select one.";
pub const FALLBACK: &str = "Sorry, I didn't get that. Type help to see what I can do.";

/// Drives one conversation turn at a time.
///
/// Turns for the same conversation are serialized. Profile and dialog
/// state are loaded once at the start of a turn and written once at the
/// end, so a failed turn leaves the stored state untouched.
pub struct HelpdeskBot {
    profiles: StateAccessor<EntityProfile>,
    dialog_states: StateAccessor<DialogState>,
    dialogs: DialogSet,
    router: Router,
    config: HelpdeskConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl HelpdeskBot {
    pub fn new(
        store: Arc<dyn StateStore>,
        dialogs: DialogSet,
        router: Router,
        config: HelpdeskConfig,
    ) -> Self {
        Self {
            profiles: StateAccessor::new(Arc::clone(&store), state_keys::ENTITY_PROFILE),
            dialog_states: StateAccessor::new(store, state_keys::DIALOG_STATE),
            dialogs,
            router,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bot with every built-in topic and the default routing rules, using
    /// the limits from `config`.
    pub fn with_default_topics(store: Arc<dyn StateStore>, config: HelpdeskConfig) -> Result<Self> {
        let mut dialogs =
            DialogSet::with_limits(config.max_steps_per_turn, config.prompt_retry_limit);
        topics::register_all(&mut dialogs)?;
        Ok(Self::new(store, dialogs, Router::default_rules(), config))
    }

    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    /// Handle one user message and return the replies for this turn.
    pub async fn handle_message(&self, conversation_id: &str, text: &str) -> Result<Vec<Activity>> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_turn(conversation_id, text.trim()).await
        };
        self.release_lock(conversation_id, lock).await;
        result
    }

    /// Start `dialog` directly, bypassing the router.
    pub async fn begin_dialog(
        &self,
        conversation_id: &str,
        dialog: &str,
        options: Option<serde_json::Value>,
    ) -> Result<Vec<Activity>> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_begin(conversation_id, dialog, options).await
        };
        self.release_lock(conversation_id, lock).await;
        result
    }

    /// Cancel every running dialog. Returns how many were dropped.
    ///
    /// Same effect as a `cancel` message, without the reply.
    pub async fn cancel_all(&self, conversation_id: &str) -> Result<usize> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_cancel(conversation_id).await
        };
        self.release_lock(conversation_id, lock).await;
        result
    }

    /// Stored profile, `None` before the first turn.
    pub async fn profile(&self, conversation_id: &str) -> Result<Option<EntityProfile>> {
        Ok(self.profiles.get(conversation_id).await?)
    }

    /// Name of the innermost running dialog, if any.
    pub async fn active_dialog(&self, conversation_id: &str) -> Result<Option<String>> {
        let state = self.dialog_states.get(conversation_id).await?;
        Ok(state.and_then(|s| s.active_dialog().map(String::from)))
    }

    async fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(conversation_id.to_string()).or_default())
    }

    /// Drop the caller's handle and forget the lock once no other turn holds
    /// or waits on it.
    async fn release_lock(&self, conversation_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(conversation_id)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(conversation_id);
        }
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.locks.lock().await.len()
    }

    async fn run_turn(&self, conversation_id: &str, text: &str) -> Result<Vec<Activity>> {
        let mut profile = self.profiles.get_or_default(conversation_id).await?;
        let mut state = self.dialog_states.get_or_default(conversation_id).await?;
        let mut out = Vec::new();

        let status = match self.router.interruption(text) {
            Some(Route::Cancel) => {
                let dropped = self.dialogs.cancel_all(&mut state);
                profile.continuation = true;
                out.push(Activity::text(if dropped > 0 {
                    CANCELLED
                } else {
                    NOTHING_TO_CANCEL
                }));
                TurnStatus::Complete
            }
            Some(Route::Help) => {
                self.dialogs.cancel_all(&mut state);
                profile.continuation = true;
                out.push(Activity::suggested(HELP_TEXT, &MAIN_MENU));
                TurnStatus::Complete
            }
            _ if state.is_active() => {
                self.continue_active(conversation_id, text, &mut state, &mut profile, &mut out)?
            }
            _ => self.route(text, &mut state, &mut profile, &mut out)?,
        };

        if out.is_empty() && self.config.silent_turn_fallback {
            out.push(Activity::text(FALLBACK));
        }

        self.persist(conversation_id, &profile, &state).await?;
        info!(
            conversation_id,
            status = ?status,
            activities = out.len(),
            dialog = state.active_dialog().unwrap_or("-"),
            "Turn handled"
        );
        Ok(out)
    }

    async fn run_begin(
        &self,
        conversation_id: &str,
        dialog: &str,
        options: Option<serde_json::Value>,
    ) -> Result<Vec<Activity>> {
        let mut profile = self.profiles.get_or_default(conversation_id).await?;
        let mut state = self.dialog_states.get_or_default(conversation_id).await?;
        let mut out = Vec::new();

        let status = self
            .dialogs
            .begin(&mut state, &mut profile, dialog, options, &mut out)?;
        self.persist(conversation_id, &profile, &state).await?;
        debug!(conversation_id, dialog, status = ?status, "Dialog started directly");
        Ok(out)
    }

    async fn run_cancel(&self, conversation_id: &str) -> Result<usize> {
        let mut state = self.dialog_states.get_or_default(conversation_id).await?;
        let dropped = self.dialogs.cancel_all(&mut state);
        // No profile is created for a conversation that never had a turn.
        if let Some(mut profile) = self.profiles.get(conversation_id).await? {
            profile.continuation = true;
            self.profiles.set(conversation_id, &profile).await?;
        }
        self.dialog_states.delete(conversation_id).await?;
        debug!(conversation_id, dropped, "Dialogs cancelled");
        Ok(dropped)
    }

    fn continue_active(
        &self,
        conversation_id: &str,
        text: &str,
        state: &mut DialogState,
        profile: &mut EntityProfile,
        out: &mut Vec<Activity>,
    ) -> Result<TurnStatus> {
        let stale = state
            .stack
            .iter()
            .find(|cursor| !self.dialogs.contains(&cursor.dialog))
            .map(|cursor| cursor.dialog.clone());
        if let Some(name) = stale {
            warn!(
                conversation_id,
                dialog = %name,
                "Stored dialog is no longer registered, resetting conversation"
            );
            state.clear();
            return self.route(text, state, profile, out);
        }

        let status = self.dialogs.continue_turn(state, profile, text, out)?;
        if status == TurnStatus::Abandoned {
            profile.continuation = true;
        }
        Ok(status)
    }

    fn route(
        &self,
        text: &str,
        state: &mut DialogState,
        profile: &mut EntityProfile,
        out: &mut Vec<Activity>,
    ) -> Result<TurnStatus> {
        match self.router.classify(text) {
            Some(Route::Topic { dialog, entity }) => {
                profile.set_entity(entity);
                profile.continuation = true;
                Ok(self.dialogs.begin(state, profile, &dialog, None, out)?)
            }
            Some(Route::Cancel) | Some(Route::Help) | None => Ok(TurnStatus::Empty),
        }
    }

    async fn persist(
        &self,
        conversation_id: &str,
        profile: &EntityProfile,
        state: &DialogState,
    ) -> Result<()> {
        self.profiles.set(conversation_id, profile).await?;
        if state.is_active() {
            self.dialog_states.set(conversation_id, state).await?;
        } else {
            self.dialog_states.delete(conversation_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::topics::names;

    fn bot_with(config: HelpdeskConfig) -> (Arc<MemoryStore>, HelpdeskBot) {
        let store = Arc::new(MemoryStore::new());
        let bot = HelpdeskBot::with_default_topics(store.clone(), config).unwrap();
        (store, bot)
    }

    fn bot() -> (Arc<MemoryStore>, HelpdeskBot) {
        bot_with(HelpdeskConfig::default())
    }

    #[tokio::test]
    async fn routed_topic_sets_entity_and_persists() {
        let (_, bot) = bot();
        let out = bot.handle_message("c1", "Assign Project Button is disabled").await.unwrap();
        assert_eq!(out.len(), 3);

        let profile = bot.profile("c1").await.unwrap().unwrap();
        assert!(profile.entity_is("disabled"));
        assert!(!profile.continuation);
        assert_eq!(
            bot.active_dialog("c1").await.unwrap().as_deref(),
            Some(names::ASSIGNMENT)
        );
    }

    #[tokio::test]
    async fn finished_dialog_state_is_deleted() {
        let (store, bot) = bot();
        bot.handle_message("c1", "ldap").await.unwrap();
        assert!(bot.active_dialog("c1").await.unwrap().is_none());
        assert!(
            store
                .get_state("c1", state_keys::DIALOG_STATE)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get_state("c1", state_keys::ENTITY_PROFILE)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_prompt() {
        let (_, bot) = bot();
        bot.handle_message("c1", "birt").await.unwrap();
        let out = bot.handle_message("c1", "cancel").await.unwrap();
        assert_eq!(out, vec![Activity::text(CANCELLED)]);
        assert!(bot.active_dialog("c1").await.unwrap().is_none());
        assert!(bot.profile("c1").await.unwrap().unwrap().continuation);

        let out = bot.handle_message("c1", "stop").await.unwrap();
        assert_eq!(out, vec![Activity::text(NOTHING_TO_CANCEL)]);
    }

    #[tokio::test]
    async fn help_shows_main_menu() {
        let (_, bot) = bot();
        let out = bot.handle_message("c1", "help").await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].actions().len(), MAIN_MENU.len());
    }

    #[tokio::test]
    async fn unrouted_message_is_silent_by_default() {
        let (_, bot) = bot();
        assert!(bot.handle_message("c1", "weather?").await.unwrap().is_empty());
        assert!(bot.profile("c1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn silent_turn_fallback_when_enabled() {
        let (_, bot) = bot_with(HelpdeskConfig {
            silent_turn_fallback: true,
            ..HelpdeskConfig::default()
        });
        let out = bot.handle_message("c1", "weather?").await.unwrap();
        assert_eq!(out, vec![Activity::text(FALLBACK)]);
    }

    #[tokio::test]
    async fn stale_dialog_is_reset_and_rerouted() {
        let (store, bot) = bot();
        let mut state = DialogState::default();
        state.push(crate::dialogs::DialogCursor::new("retired_topic", None));
        store
            .set_state(
                "c1",
                state_keys::DIALOG_STATE,
                &serde_json::to_value(&state).unwrap(),
            )
            .await
            .unwrap();

        let out = bot.handle_message("c1", "invalid password").await.unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].content().contains("reset your password"));
    }

    #[tokio::test]
    async fn stale_parent_resets_before_any_step_runs() {
        let (store, bot) = bot();
        bot.handle_message("c1", "Assign Project Button is disabled").await.unwrap();

        let mut state: DialogState = serde_json::from_value(
            store
                .get_state("c1", state_keys::DIALOG_STATE)
                .await
                .unwrap()
                .unwrap(),
        )
        .unwrap();
        state
            .stack
            .insert(0, crate::dialogs::DialogCursor::new("retired_topic", None));
        store
            .set_state(
                "c1",
                state_keys::DIALOG_STATE,
                &serde_json::to_value(&state).unwrap(),
            )
            .await
            .unwrap();

        let out = bot.handle_message("c1", "Yes").await.unwrap();
        assert!(out.is_empty());
        assert!(bot.active_dialog("c1").await.unwrap().is_none());
        assert!(bot.profile("c1").await.unwrap().unwrap().entity_is("disabled"));
    }

    #[tokio::test]
    async fn cancel_all_resets_continuation() {
        let (_, bot) = bot();
        bot.handle_message("c1", "birt").await.unwrap();
        assert!(!bot.profile("c1").await.unwrap().unwrap().continuation);

        assert_eq!(bot.cancel_all("c1").await.unwrap(), 1);
        assert!(bot.active_dialog("c1").await.unwrap().is_none());
        assert!(bot.profile("c1").await.unwrap().unwrap().continuation);
    }

    #[tokio::test]
    async fn cancel_all_on_unknown_conversation_creates_nothing() {
        let (_, bot) = bot();
        assert_eq!(bot.cancel_all("nobody").await.unwrap(), 0);
        assert!(bot.profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conversation_locks_are_released_after_each_turn() {
        let (_, bot) = bot();
        for i in 0..50 {
            bot.handle_message(&format!("c{i}"), "ldap").await.unwrap();
        }
        bot.handle_message("c-open", "birt").await.unwrap();
        bot.cancel_all("c-open").await.unwrap();
        bot.begin_dialog("c-greet", names::GREETING, None).await.unwrap();
        assert_eq!(bot.tracked_locks().await, 0);
    }

    #[tokio::test]
    async fn begin_dialog_with_seed_options() {
        let (_, bot) = bot();
        let out = bot
            .begin_dialog(
                "c1",
                names::GREETING,
                Some(serde_json::json!({"entity_profile": {"entity": "qlikview"}})),
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            bot.active_dialog("c1").await.unwrap().as_deref(),
            Some(names::REPORT)
        );
        assert!(bot.profile("c1").await.unwrap().unwrap().entity_is("qlikview"));
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let (_, bot) = bot();
        bot.handle_message("a", "birt").await.unwrap();
        bot.handle_message("b", "qliksense").await.unwrap();

        assert!(bot.profile("a").await.unwrap().unwrap().entity_is("birt"));
        assert!(bot.profile("b").await.unwrap().unwrap().entity_is("qliksense"));
        assert_eq!(bot.cancel_all("a").await.unwrap(), 1);
        assert!(bot.active_dialog("b").await.unwrap().is_some());
    }
}
