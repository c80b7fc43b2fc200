//! The `!clock` wizard: one [`ClockSession`] per invocation, driven by
//! gateway interactions and per-session timers.
//!
//! Every session lives behind its own `tokio::sync::Mutex` inside the
//! [`SessionRegistry`], so a timer firing and an interaction for the same
//! session are applied one after the other, never interleaved.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use timeclock_core::config::ClockConfig;
use timeclock_core::flows::TransitionOutcome;
use timeclock_core::time::{parse_time_zone, Clock};
use timeclock_core::{
    ClockSession, Confirmation, DomainError, FlowAction, FlowState, PickOutcome, Roster,
    RosterPicker, SessionId, SessionUpdate,
};

use crate::commands::CommandService;
use crate::components::{
    confirmation_message, direction_prompt_message, hello_message, name_modal,
    name_prompt_message, picked_message, roster_picker_message, timed_out_message,
    MessageTemplate,
};
use crate::custom_ids::{CustomId, WizardAction, NAME_INPUT_ID};
use crate::events::{
    ComponentInteractionEvent, EventContext, EventHandlerError, HandlerResult, InteractionContext,
    InteractionService, MessageCreateEvent, ModalSubmitEvent,
};
use crate::http::{DiscordHttp, InteractionResponse};
use crate::timer::SessionTimer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardSettings {
    pub time_zone: Tz,
    pub wizard_timeout: Duration,
    pub picker_timeout: Duration,
}

impl WizardSettings {
    pub fn from_config(config: &ClockConfig) -> Result<Self, DomainError> {
        Ok(Self {
            time_zone: parse_time_zone(&config.timezone)?,
            wizard_timeout: Duration::from_secs(config.wizard_timeout_secs),
            picker_timeout: Duration::from_secs(config.picker_timeout_secs),
        })
    }
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            time_zone: Tz::Asia__Bangkok,
            wizard_timeout: Duration::from_secs(120),
            picker_timeout: Duration::from_secs(180),
        }
    }
}

struct SessionSlot {
    session: ClockSession,
    /// Last body rendered on the primary message.
    surface: MessageTemplate,
    picker: Option<RosterPicker>,
    wizard_timer: SessionTimer,
    wizard_generation: u64,
    picker_timer: SessionTimer,
    picker_generation: u64,
}

impl SessionSlot {
    fn picker_open(&self) -> bool {
        self.picker.as_ref().is_some_and(RosterPicker::is_open)
    }

    /// Nothing left that could still react to input or a deadline.
    fn is_finished(&self) -> bool {
        self.session.state().is_terminal() && !self.picker_open()
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<SessionSlot>>>>,
}

impl SessionRegistry {
    async fn insert(&self, slot: SessionSlot) -> Arc<Mutex<SessionSlot>> {
        let id = slot.session.id();
        let slot = Arc::new(Mutex::new(slot));
        self.sessions.lock().await.insert(id, Arc::clone(&slot));
        slot
    }

    async fn get(&self, id: SessionId) -> Option<Arc<Mutex<SessionSlot>>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    async fn remove(&self, id: SessionId) {
        self.sessions.lock().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub struct ClockWizard {
    me: Weak<ClockWizard>,
    roster: Arc<Roster>,
    settings: WizardSettings,
    http: Arc<dyn DiscordHttp>,
    clock: Arc<dyn Clock>,
    registry: SessionRegistry,
}

impl ClockWizard {
    pub fn new(
        roster: Arc<Roster>,
        settings: WizardSettings,
        http: Arc<dyn DiscordHttp>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            roster,
            settings,
            http,
            clock,
            registry: SessionRegistry::default(),
        })
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    pub async fn session_state(&self, id: SessionId) -> Option<FlowState> {
        let slot = self.registry.get(id).await?;
        let state = slot.lock().await.session.state();
        Some(state)
    }

    /// Posts the name prompt in `channel_id` and registers a new session.
    pub async fn start(
        &self,
        channel_id: &str,
        invoker_user_id: &str,
        ctx: &EventContext,
    ) -> Result<SessionId, EventHandlerError> {
        let id = SessionId::new();
        let surface = name_prompt_message(id);
        let handle = self.http.create_message(channel_id, &surface).await?;

        let mut session = ClockSession::new(id, invoker_user_id, channel_id);
        session.attach_message(handle);
        let slot = self
            .registry
            .insert(SessionSlot {
                session,
                surface,
                picker: None,
                wizard_timer: SessionTimer::default(),
                wizard_generation: 0,
                picker_timer: SessionTimer::default(),
                picker_generation: 0,
            })
            .await;
        self.arm_wizard_timer(&mut *slot.lock().await);

        info!(
            event_name = "wizard.session.started",
            session_id = %id,
            correlation_id = %ctx.correlation_id,
            channel_id,
            invoker_user_id,
            "started clock wizard"
        );
        Ok(id)
    }

    pub async fn say_hello(&self, channel_id: &str) -> Result<(), EventHandlerError> {
        self.http.create_message(channel_id, &hello_message()).await?;
        Ok(())
    }

    async fn acknowledge(&self, interaction: &InteractionContext) -> Result<(), EventHandlerError> {
        self.http.respond(interaction, &InteractionResponse::DeferredUpdate).await?;
        Ok(())
    }

    /// Stale, foreign and out-of-order activations are acknowledged without
    /// any visible change.
    async fn ignore(
        &self,
        interaction: &InteractionContext,
        ctx: &EventContext,
        reason: &str,
    ) -> Result<HandlerResult, EventHandlerError> {
        debug!(
            event_name = "wizard.interaction.ignored",
            correlation_id = %ctx.correlation_id,
            interaction_id = %interaction.interaction_id,
            reason,
            "ignoring interaction"
        );
        self.acknowledge(interaction).await?;
        Ok(HandlerResult::Ignored)
    }

    async fn session_for(
        &self,
        raw_custom_id: &str,
    ) -> Option<(CustomId, Arc<Mutex<SessionSlot>>)> {
        let custom_id = CustomId::parse(raw_custom_id)?;
        let slot = self.registry.get(custom_id.session_id).await?;
        Some((custom_id, slot))
    }

    async fn forget_if_finished(&self, slot: &SessionSlot) {
        if slot.is_finished() {
            self.registry.remove(slot.session.id()).await;
        }
    }

    /// Carries out the side effects of one accepted transition. Later
    /// actions still run when an earlier outbound call fails; the first
    /// failure is returned.
    async fn run_actions(
        &self,
        slot: &mut SessionSlot,
        outcome: &TransitionOutcome,
        interaction: Option<&InteractionContext>,
        confirmation: Option<&Confirmation>,
    ) -> Result<(), EventHandlerError> {
        let mut first_error = None;
        for action in &outcome.actions {
            let result = match action {
                FlowAction::ShowDirectionChoice => {
                    let captured_name = slot.session.captured_name().unwrap_or_default();
                    let message = direction_prompt_message(slot.session.id(), captured_name);
                    let result = self.replace_surface(slot, &message, interaction).await;
                    slot.surface = message;
                    result
                }
                FlowAction::OpenRosterPicker => self.open_picker(slot, interaction).await,
                FlowAction::RenderConfirmation => match confirmation {
                    Some(confirmation) => {
                        let message = confirmation_message(confirmation);
                        let result = self.replace_surface(slot, &message, None).await;
                        slot.surface = message;
                        result
                    }
                    None => Ok(()),
                },
                FlowAction::DisableControls => {
                    let message = timed_out_message(slot.surface.clone());
                    let result = self.replace_surface(slot, &message, None).await;
                    slot.surface = message;
                    result
                }
                FlowAction::RestartTimer => {
                    self.arm_wizard_timer(slot);
                    Ok(())
                }
                FlowAction::CancelTimer => {
                    slot.wizard_timer.cancel();
                    Ok(())
                }
            };
            if let Err(error) = result {
                warn!(
                    event_name = "wizard.action.failed",
                    session_id = %slot.session.id(),
                    action = ?action,
                    error = %error,
                    "wizard side effect failed"
                );
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Answers the interaction by updating the message it came from, or
    /// edits the primary message directly when there is no interaction to
    /// answer.
    async fn replace_surface(
        &self,
        slot: &SessionSlot,
        message: &MessageTemplate,
        interaction: Option<&InteractionContext>,
    ) -> Result<(), EventHandlerError> {
        match (interaction, slot.session.message_handle()) {
            (Some(interaction), _) => {
                let response = InteractionResponse::UpdateMessage(message.clone());
                self.http.respond(interaction, &response).await?;
            }
            (None, Some(handle)) => self.http.edit_message(handle, message).await?,
            (None, None) => {}
        }
        Ok(())
    }

    async fn open_picker(
        &self,
        slot: &mut SessionSlot,
        interaction: Option<&InteractionContext>,
    ) -> Result<(), EventHandlerError> {
        let picker = RosterPicker::new(&self.roster)?;
        let message = roster_picker_message(slot.session.id(), picker.pages());
        slot.picker = Some(picker);
        self.arm_picker_timer(slot);

        match interaction {
            Some(interaction) => {
                let response = InteractionResponse::ChannelMessage(message);
                self.http.respond(interaction, &response).await?;
            }
            None => {
                self.http.create_message(slot.session.channel_id(), &message).await?;
            }
        }
        Ok(())
    }

    fn arm_wizard_timer(&self, slot: &mut SessionSlot) {
        slot.wizard_generation += 1;
        let generation = slot.wizard_generation;
        let id = slot.session.id();
        let me = self.me.clone();
        slot.wizard_timer.arm(self.settings.wizard_timeout, move || async move {
            if let Some(wizard) = me.upgrade() {
                wizard.expire_session(id, generation).await;
            }
        });
    }

    fn arm_picker_timer(&self, slot: &mut SessionSlot) {
        slot.picker_generation += 1;
        let generation = slot.picker_generation;
        let id = slot.session.id();
        let me = self.me.clone();
        slot.picker_timer.arm(self.settings.picker_timeout, move || async move {
            if let Some(wizard) = me.upgrade() {
                wizard.expire_picker(id, generation).await;
            }
        });
    }

    /// Wizard deadline for `id`. A `generation` older than the slot's
    /// current one belongs to a timer that was re-armed in the meantime.
    pub async fn expire_session(&self, id: SessionId, generation: u64) {
        let Some(slot) = self.registry.get(id).await else {
            return;
        };
        let mut slot = slot.lock().await;
        if slot.wizard_generation != generation {
            return;
        }
        slot.wizard_timer.disarm();

        match slot.session.time_out() {
            SessionUpdate::Advanced(outcome) => {
                info!(
                    event_name = "wizard.session.timed_out",
                    session_id = %id,
                    from = ?outcome.from,
                    "clock wizard timed out"
                );
                if let Err(error) = self.run_actions(&mut slot, &outcome, None, None).await {
                    warn!(session_id = %id, error = %error, "could not disable wizard controls");
                }
            }
            update => debug!(session_id = %id, update = ?update, "timeout ignored"),
        }
        self.forget_if_finished(&slot).await;
    }

    /// Picker deadline: menus stop accepting picks. Nothing visible changes.
    pub async fn expire_picker(&self, id: SessionId, generation: u64) {
        let Some(slot) = self.registry.get(id).await else {
            return;
        };
        let mut slot = slot.lock().await;
        if slot.picker_generation != generation {
            return;
        }
        slot.picker_timer.disarm();

        if slot.picker.as_mut().is_some_and(RosterPicker::time_out) {
            info!(event_name = "wizard.picker.timed_out", session_id = %id, "roster picker timed out");
        }
        self.forget_if_finished(&slot).await;
    }

    async fn pick_employee(
        &self,
        slot: &mut SessionSlot,
        event: &ComponentInteractionEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Some(label) = event.values.first() else {
            return self.ignore(&event.interaction, ctx, "empty selection").await;
        };
        let Some(picker) = slot.picker.as_mut() else {
            return self.ignore(&event.interaction, ctx, "no picker open").await;
        };
        let label = match picker.pick(label) {
            PickOutcome::Accepted(label) => label,
            PickOutcome::UnknownLabel(_) => {
                return self.ignore(&event.interaction, ctx, "label not offered").await;
            }
            PickOutcome::Closed => {
                return self.ignore(&event.interaction, ctx, "picker closed").await;
            }
        };
        slot.picker_timer.cancel();

        let picked = picked_message(slot.session.id(), picker.pages(), &label);
        let responded = self
            .http
            .respond(&event.interaction, &InteractionResponse::UpdateMessage(picked))
            .await;
        if let Err(error) = &responded {
            warn!(
                session_id = %slot.session.id(),
                correlation_id = %ctx.correlation_id,
                error = %error,
                "could not disable roster picker"
            );
        }

        let recorded_at = self.clock.now_in(self.settings.time_zone);
        let finished = match slot.session.pick_employee(
            &label,
            &event.interaction.user_id,
            &self.roster,
            recorded_at,
        ) {
            SessionUpdate::Completed { outcome, confirmation } => {
                info!(
                    event_name = "wizard.session.completed",
                    session_id = %slot.session.id(),
                    correlation_id = %ctx.correlation_id,
                    direction = confirmation.direction.action_key(),
                    employee = %confirmation.employee_label,
                    "clock wizard completed"
                );
                self.run_actions(slot, &outcome, None, Some(&confirmation)).await
            }
            update => {
                debug!(
                    session_id = %slot.session.id(),
                    update = ?update,
                    "pick recorded on picker only"
                );
                Ok(())
            }
        };

        responded?;
        finished?;
        Ok(HandlerResult::Processed)
    }
}

#[async_trait]
impl CommandService for ClockWizard {
    async fn start_clock(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        self.start(&message.channel_id, &message.author_id, ctx).await?;
        Ok(HandlerResult::Processed)
    }

    async fn hello(
        &self,
        message: &MessageCreateEvent,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        self.say_hello(&message.channel_id).await?;
        Ok(HandlerResult::Processed)
    }
}

#[async_trait]
impl InteractionService for ClockWizard {
    async fn handle_component(
        &self,
        event: &ComponentInteractionEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Some((custom_id, slot)) = self.session_for(&event.custom_id).await else {
            return self.ignore(&event.interaction, ctx, "unknown session").await;
        };
        let mut slot = slot.lock().await;

        let result = match custom_id.action {
            WizardAction::EnterName if slot.session.state() == FlowState::AwaitingName => {
                let response = InteractionResponse::Modal(name_modal(custom_id.session_id));
                self.http.respond(&event.interaction, &response).await?;
                self.arm_wizard_timer(&mut slot);
                Ok(HandlerResult::Processed)
            }
            WizardAction::Direction(direction) => {
                match slot.session.choose_direction(direction) {
                    SessionUpdate::Advanced(outcome) => {
                        info!(
                            event_name = "wizard.direction.chosen",
                            session_id = %custom_id.session_id,
                            correlation_id = %ctx.correlation_id,
                            direction = direction.action_key(),
                            "direction chosen"
                        );
                        self.run_actions(&mut slot, &outcome, Some(&event.interaction), None)
                            .await?;
                        Ok(HandlerResult::Processed)
                    }
                    _ => self.ignore(&event.interaction, ctx, "direction already chosen").await,
                }
            }
            WizardAction::Employee { .. } => self.pick_employee(&mut slot, event, ctx).await,
            WizardAction::EnterName | WizardAction::NameModal => {
                self.ignore(&event.interaction, ctx, "not accepted in current state").await
            }
        };

        self.forget_if_finished(&slot).await;
        result
    }

    async fn handle_modal_submit(
        &self,
        event: &ModalSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Some((custom_id, slot)) = self.session_for(&event.custom_id).await else {
            return self.ignore(&event.interaction, ctx, "unknown session").await;
        };
        if custom_id.action != WizardAction::NameModal {
            return self.ignore(&event.interaction, ctx, "not a name dialog").await;
        }
        let mut slot = slot.lock().await;

        let name = event.field(NAME_INPUT_ID).unwrap_or_default();
        match slot.session.submit_name(name) {
            SessionUpdate::Advanced(outcome) => {
                info!(
                    event_name = "wizard.name.submitted",
                    session_id = %custom_id.session_id,
                    correlation_id = %ctx.correlation_id,
                    "name submitted"
                );
                self.run_actions(&mut slot, &outcome, Some(&event.interaction), None).await?;
                Ok(HandlerResult::Processed)
            }
            _ => self.ignore(&event.interaction, ctx, "name already submitted").await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use timeclock_core::time::FixedClock;
    use timeclock_core::{FlowState, MessageHandle, Roster, SessionId};

    use super::{ClockWizard, WizardSettings};
    use crate::components::{Component, MessageTemplate, TIMED_OUT_TEXT};
    use crate::custom_ids::CustomId;
    use crate::events::{
        ComponentInteractionEvent, EventContext, HandlerResult, InteractionContext,
        InteractionService, ModalSubmitEvent,
    };
    use crate::http::{DiscordHttp, HttpError, InteractionResponse};

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Create { channel_id: String, message: MessageTemplate },
        Edit { message_id: String, message: MessageTemplate },
        Respond { interaction_id: String, response: InteractionResponse },
    }

    #[derive(Default)]
    struct RecordingHttp {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingHttp {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("lock").clone()
        }

        fn last(&self) -> Call {
            self.calls().last().cloned().expect("at least one call")
        }
    }

    #[async_trait]
    impl DiscordHttp for RecordingHttp {
        async fn create_message(
            &self,
            channel_id: &str,
            message: &MessageTemplate,
        ) -> Result<MessageHandle, HttpError> {
            let mut calls = self.calls.lock().expect("lock");
            calls.push(Call::Create { channel_id: channel_id.to_owned(), message: message.clone() });
            Ok(MessageHandle {
                channel_id: channel_id.to_owned(),
                message_id: format!("M-{}", calls.len()),
            })
        }

        async fn edit_message(
            &self,
            handle: &MessageHandle,
            message: &MessageTemplate,
        ) -> Result<(), HttpError> {
            self.calls.lock().expect("lock").push(Call::Edit {
                message_id: handle.message_id.clone(),
                message: message.clone(),
            });
            Ok(())
        }

        async fn respond(
            &self,
            interaction: &InteractionContext,
            response: &InteractionResponse,
        ) -> Result<(), HttpError> {
            self.calls.lock().expect("lock").push(Call::Respond {
                interaction_id: interaction.interaction_id.clone(),
                response: response.clone(),
            });
            Ok(())
        }
    }

    struct Harness {
        wizard: Arc<ClockWizard>,
        http: Arc<RecordingHttp>,
        ctx: EventContext,
        next_interaction: Mutex<u32>,
    }

    impl Harness {
        fn new() -> Self {
            let http = Arc::new(RecordingHttp::default());
            let wizard = ClockWizard::new(
                Arc::new(Roster::builtin().expect("roster")),
                WizardSettings::default(),
                http.clone(),
                Arc::new(FixedClock::at(2026, 3, 9, 1, 30, 0)),
            );
            Self { wizard, http, ctx: EventContext::default(), next_interaction: Mutex::new(0) }
        }

        fn interaction(&self) -> InteractionContext {
            self.interaction_from("U-1")
        }

        fn interaction_from(&self, user_id: &str) -> InteractionContext {
            let mut next = self.next_interaction.lock().expect("lock");
            *next += 1;
            InteractionContext {
                interaction_id: format!("I-{next}"),
                token: "token".to_owned(),
                channel_id: "C-1".to_owned(),
                user_id: user_id.to_owned(),
                message_id: Some("M-1".to_owned()),
            }
        }

        async fn start(&self) -> SessionId {
            self.wizard.start("C-1", "U-1", &self.ctx).await.expect("start")
        }

        async fn click(&self, id: SessionId, action: &str, values: &[&str]) -> HandlerResult {
            self.click_as("U-1", id, action, values).await
        }

        async fn click_as(
            &self,
            user_id: &str,
            id: SessionId,
            action: &str,
            values: &[&str],
        ) -> HandlerResult {
            let event = ComponentInteractionEvent {
                interaction: self.interaction_from(user_id),
                custom_id: format!("timeclock:{id}:{action}"),
                values: values.iter().map(|value| (*value).to_owned()).collect(),
            };
            self.wizard.handle_component(&event, &self.ctx).await.expect("component")
        }

        async fn submit_name(&self, id: SessionId, name: &str) -> HandlerResult {
            let event = ModalSubmitEvent {
                interaction: self.interaction(),
                custom_id: format!("timeclock:{id}:name_modal"),
                fields: BTreeMap::from([("user_name".to_owned(), name.to_owned())]),
            };
            self.wizard.handle_modal_submit(&event, &self.ctx).await.expect("modal")
        }

        async fn open_picker(&self) -> SessionId {
            let id = self.start().await;
            self.submit_name(id, "Somchai").await;
            self.click(id, "clock_in", &[]).await;
            id
        }
    }

    fn responded(call: &Call) -> &InteractionResponse {
        match call {
            Call::Respond { response, .. } => response,
            other => panic!("expected an interaction response, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_walkthrough_renders_confirmation() {
        let harness = Harness::new();
        let id = harness.start().await;

        let Call::Create { message, .. } = harness.http.last() else {
            panic!("expected the name prompt to be posted");
        };
        let Some(Component::Button(button)) = message.all_components().next() else {
            panic!("expected an enter-name button");
        };
        assert_eq!(CustomId::parse(&button.custom_id).map(|custom_id| custom_id.session_id), Some(id));

        harness.click(id, "enter_name", &[]).await;
        assert!(matches!(responded(&harness.http.last()), InteractionResponse::Modal(_)));

        harness.submit_name(id, "Somchai").await;
        let last = harness.http.last();
        let InteractionResponse::UpdateMessage(direction) = responded(&last) else {
            panic!("expected the name prompt to be replaced");
        };
        assert!(direction.content.as_deref().is_some_and(|text| text.contains("`Somchai`")));
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::AwaitingDirection));

        harness.click(id, "clock_in", &[]).await;
        let last = harness.http.last();
        let InteractionResponse::ChannelMessage(picker) = responded(&last) else {
            panic!("expected an ephemeral roster picker");
        };
        assert!(picker.is_ephemeral());
        assert_eq!(picker.components.len(), 3);

        let result = harness.click(id, "employee:0", &["🇯🇵 Japan"]).await;
        assert_eq!(result, HandlerResult::Processed);

        let calls = harness.http.calls();
        let InteractionResponse::UpdateMessage(picked) = responded(&calls[calls.len() - 2]) else {
            panic!("expected the picker to be re-rendered");
        };
        assert_eq!(picked.content.as_deref(), Some("✅ คุณเลือก: 🇯🇵 Japan"));
        assert!(picked.all_components().all(Component::is_disabled));

        let Call::Edit { message_id, message } = harness.http.last() else {
            panic!("expected the primary message to be edited");
        };
        assert_eq!(message_id, "M-1");
        assert_eq!(message.content, None);
        assert!(message.components.is_empty());
        let embed = &message.embeds[0];
        assert!(embed.description.contains("`Somchai`"));
        assert!(embed.description.contains("`🇯🇵 Japan`"));
        assert!(embed.description.contains("2026-03-09 08:30:00 +07"));
        assert!(embed.image.is_some());
        assert_eq!(harness.wizard.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_wizard_times_out_exactly_once() {
        let harness = Harness::new();
        harness.start().await;

        tokio::time::sleep(Duration::from_secs(121)).await;
        let Call::Edit { message, .. } = harness.http.last() else {
            panic!("expected the wizard message to be disabled");
        };
        assert_eq!(message.content.as_deref(), Some(TIMED_OUT_TEXT));
        assert_eq!(message.components.len(), 1);
        assert!(message.all_components().all(Component::is_disabled));
        assert_eq!(harness.wizard.session_count().await, 0);

        let calls = harness.http.calls().len();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(harness.http.calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn interaction_restarts_the_wizard_deadline() {
        let harness = Harness::new();
        let id = harness.start().await;

        tokio::time::sleep(Duration::from_secs(100)).await;
        harness.submit_name(id, "Somchai").await;
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::AwaitingDirection));

        tokio::time::sleep(Duration::from_secs(21)).await;
        let Call::Edit { message, .. } = harness.http.last() else {
            panic!("expected a timeout edit");
        };
        assert_eq!(message.content.as_deref(), Some(TIMED_OUT_TEXT));
        assert_eq!(message.components[0].components.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn opening_the_name_dialog_restarts_the_wizard_deadline() {
        let harness = Harness::new();
        let id = harness.start().await;

        tokio::time::sleep(Duration::from_secs(110)).await;
        harness.click(id, "enter_name", &[]).await;
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::AwaitingName));

        tokio::time::sleep(Duration::from_secs(21)).await;
        let Call::Edit { message, .. } = harness.http.last() else {
            panic!("expected a timeout edit");
        };
        assert_eq!(message.content.as_deref(), Some(TIMED_OUT_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_mentions_the_user_who_picked() {
        let harness = Harness::new();
        let id = harness.open_picker().await;

        harness.click_as("U-2", id, "employee:0", &["🇯🇵 Japan"]).await;
        let Call::Edit { message, .. } = harness.http.last() else {
            panic!("expected the primary message to be edited");
        };
        assert!(message.embeds[0].description.starts_with("<@U-2> **ลงชื่อเข้างาน**"));
    }

    #[tokio::test(start_paused = true)]
    async fn pick_after_completion_is_inert() {
        let harness = Harness::new();
        let id = harness.open_picker().await;
        harness.click(id, "employee:0", &["🇯🇵 Japan"]).await;
        let before = harness.http.calls().len();

        let result = harness.click(id, "employee:2", &["🇺🇸 America"]).await;
        assert_eq!(result, HandlerResult::Ignored);
        let calls = harness.http.calls();
        assert_eq!(calls.len(), before + 1);
        assert_eq!(responded(&calls[before]), &InteractionResponse::DeferredUpdate);
    }

    #[tokio::test(start_paused = true)]
    async fn pick_after_wizard_timeout_only_closes_the_picker() {
        let harness = Harness::new();
        let id = harness.open_picker().await;

        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::TimedOut));
        let before = harness.http.calls().len();

        harness.click(id, "employee:1", &["🇫🇷 France"]).await;
        let calls = harness.http.calls();
        assert_eq!(calls.len(), before + 1);
        let InteractionResponse::UpdateMessage(picked) = responded(&calls[before]) else {
            panic!("expected the picker to be re-rendered");
        };
        assert_eq!(picked.content.as_deref(), Some("✅ คุณเลือก: 🇫🇷 France"));
        assert_eq!(harness.wizard.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_picker_rejects_picks() {
        let harness = Harness::new();
        let id = harness.open_picker().await;

        tokio::time::sleep(Duration::from_secs(181)).await;
        assert_eq!(harness.wizard.session_count().await, 0);

        let result = harness.click(id, "employee:0", &["🇯🇵 Japan"]).await;
        assert_eq!(result, HandlerResult::Ignored);
        assert_eq!(responded(&harness.http.last()), &InteractionResponse::DeferredUpdate);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_order_and_foreign_interactions_are_acknowledged_only() {
        let harness = Harness::new();
        let id = harness.start().await;

        assert_eq!(harness.click(id, "clock_out", &[]).await, HandlerResult::Ignored);
        assert_eq!(harness.click(id, "employee:0", &["🇯🇵 Japan"]).await, HandlerResult::Ignored);
        assert_eq!(harness.click(SessionId::new(), "enter_name", &[]).await, HandlerResult::Ignored);

        let event = ComponentInteractionEvent {
            interaction: harness.interaction(),
            custom_id: "some-other-bot".to_owned(),
            values: Vec::new(),
        };
        let foreign = harness.wizard.handle_component(&event, &harness.ctx).await;
        assert_eq!(foreign, Ok(HandlerResult::Ignored));

        let acknowledgements = harness.http.calls()[1..]
            .iter()
            .filter(|call| responded(call) == &InteractionResponse::DeferredUpdate)
            .count();
        assert_eq!(acknowledgements, 4);
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::AwaitingName));
    }

    #[tokio::test(start_paused = true)]
    async fn second_direction_click_is_ignored() {
        let harness = Harness::new();
        let id = harness.open_picker().await;

        assert_eq!(harness.click(id, "clock_out", &[]).await, HandlerResult::Ignored);
        assert_eq!(harness.wizard.session_state(id).await, Some(FlowState::AwaitingEmployee));
    }

    #[tokio::test(start_paused = true)]
    async fn hello_posts_a_greeting() {
        let harness = Harness::new();
        harness.wizard.say_hello("C-9").await.expect("hello");

        let Call::Create { channel_id, message } = harness.http.last() else {
            panic!("expected a greeting");
        };
        assert_eq!(channel_id, "C-9");
        assert_eq!(message.content.as_deref(), Some("สวัสดีครับ!"));
    }
}
