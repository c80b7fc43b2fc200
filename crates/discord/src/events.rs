use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use timeclock_core::DomainError;

use crate::commands::{CommandRouter, CommandService};
use crate::http::HttpError;

const MESSAGE_COMPONENT_INTERACTION: u8 = 3;
const MODAL_SUBMIT_INTERACTION: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayEnvelope {
    pub envelope_id: String,
    pub event: GatewayEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    MessageCreate(MessageCreateEvent),
    ComponentInteraction(ComponentInteractionEvent),
    ModalSubmit(ModalSubmitEvent),
    Unsupported { event_type: String },
}

impl GatewayEvent {
    pub fn event_type(&self) -> GatewayEventType {
        match self {
            Self::MessageCreate(_) => GatewayEventType::MessageCreate,
            Self::ComponentInteraction(_) => GatewayEventType::ComponentInteraction,
            Self::ModalSubmit(_) => GatewayEventType::ModalSubmit,
            Self::Unsupported { .. } => GatewayEventType::Unsupported,
        }
    }

    /// Decodes the `d` payload of a gateway dispatch named `event_name`
    /// (the `t` field). Dispatches the bot does not act on come back as
    /// [`GatewayEvent::Unsupported`].
    pub fn from_dispatch(event_name: &str, data: Value) -> Result<Self, serde_json::Error> {
        match event_name {
            "MESSAGE_CREATE" => {
                let raw: RawMessage = serde_json::from_value(data)?;
                Ok(Self::MessageCreate(MessageCreateEvent {
                    message_id: raw.id,
                    channel_id: raw.channel_id,
                    author_id: raw.author.id,
                    author_is_bot: raw.author.bot,
                    content: raw.content,
                }))
            }
            "INTERACTION_CREATE" => {
                let raw: RawInteraction = serde_json::from_value(data)?;
                Ok(raw.into_event())
            }
            other => Ok(Self::Unsupported { event_type: other.to_owned() }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    MessageCreate,
    ComponentInteraction,
    ModalSubmit,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageCreateEvent {
    pub message_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub author_is_bot: bool,
    pub content: String,
}

/// What every interaction callback needs: where to answer, and who asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionContext {
    pub interaction_id: String,
    pub token: String,
    pub channel_id: String,
    pub user_id: String,
    /// The message the activated component is attached to.
    pub message_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentInteractionEvent {
    pub interaction: InteractionContext,
    pub custom_id: String,
    /// Selected option values; empty for buttons.
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalSubmitEvent {
    pub interaction: InteractionContext,
    pub custom_id: String,
    pub fields: BTreeMap<String, String>,
}

impl ModalSubmitEvent {
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        self.fields.get(custom_id).map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    bot: bool,
}

#[derive(Deserialize)]
struct RawMessage {
    id: String,
    channel_id: String,
    author: RawUser,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct RawMember {
    user: RawUser,
}

#[derive(Deserialize)]
struct RawMessageRef {
    id: String,
}

#[derive(Deserialize, Default)]
struct RawInteractionData {
    #[serde(default)]
    custom_id: String,
    #[serde(default)]
    values: Vec<String>,
    #[serde(default)]
    components: Vec<RawRow>,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(default)]
    components: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    #[serde(default)]
    custom_id: String,
    value: Option<String>,
}

#[derive(Deserialize)]
struct RawInteraction {
    id: String,
    token: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    channel_id: String,
    member: Option<RawMember>,
    user: Option<RawUser>,
    message: Option<RawMessageRef>,
    data: Option<RawInteractionData>,
}

impl RawInteraction {
    fn into_event(self) -> GatewayEvent {
        let user_id = self
            .member
            .map(|member| member.user.id)
            .or(self.user.map(|user| user.id))
            .unwrap_or_default();
        let interaction = InteractionContext {
            interaction_id: self.id,
            token: self.token,
            channel_id: self.channel_id,
            user_id,
            message_id: self.message.map(|message| message.id),
        };
        let data = self.data.unwrap_or_default();

        match self.kind {
            MESSAGE_COMPONENT_INTERACTION => {
                GatewayEvent::ComponentInteraction(ComponentInteractionEvent {
                    interaction,
                    custom_id: data.custom_id,
                    values: data.values,
                })
            }
            MODAL_SUBMIT_INTERACTION => {
                let fields = data
                    .components
                    .into_iter()
                    .flat_map(|row| row.components)
                    .filter_map(|field| field.value.map(|value| (field.custom_id, value)))
                    .collect();
                GatewayEvent::ModalSubmit(ModalSubmitEvent {
                    interaction,
                    custom_id: data.custom_id,
                    fields,
                })
            }
            other => GatewayEvent::Unsupported { event_type: format!("INTERACTION_CREATE:{other}") },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> GatewayEventType;
    async fn handle(
        &self,
        envelope: &GatewayEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<GatewayEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &GatewayEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Wires the three wizard entry points to one shared service.
pub fn default_dispatcher<S>(service: Arc<S>, command_prefix: &str) -> EventDispatcher
where
    S: CommandService + InteractionService + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(MessageCommandHandler::new(command_prefix, Arc::clone(&service)));
    dispatcher.register(ComponentInteractionHandler::new(Arc::clone(&service)));
    dispatcher.register(ModalSubmitHandler::new(service));
    dispatcher
}

#[async_trait]
pub trait InteractionService: Send + Sync {
    async fn handle_component(
        &self,
        event: &ComponentInteractionEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;

    async fn handle_modal_submit(
        &self,
        event: &ModalSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[async_trait]
impl<S> InteractionService for Arc<S>
where
    S: InteractionService + ?Sized,
{
    async fn handle_component(
        &self,
        event: &ComponentInteractionEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        (**self).handle_component(event, ctx).await
    }

    async fn handle_modal_submit(
        &self,
        event: &ModalSubmitEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        (**self).handle_modal_submit(event, ctx).await
    }
}

pub struct MessageCommandHandler<S> {
    router: CommandRouter<S>,
}

impl<S> MessageCommandHandler<S>
where
    S: CommandService,
{
    pub fn new(prefix: &str, service: S) -> Self {
        Self { router: CommandRouter::new(prefix, service) }
    }
}

#[async_trait]
impl<S> EventHandler for MessageCommandHandler<S>
where
    S: CommandService + 'static,
{
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::MessageCreate
    }

    async fn handle(
        &self,
        envelope: &GatewayEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::MessageCreate(message) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        self.router.route(message, ctx).await
    }
}

pub struct ComponentInteractionHandler<S> {
    service: S,
}

impl<S> ComponentInteractionHandler<S>
where
    S: InteractionService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> EventHandler for ComponentInteractionHandler<S>
where
    S: InteractionService + 'static,
{
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::ComponentInteraction
    }

    async fn handle(
        &self,
        envelope: &GatewayEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::ComponentInteraction(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        self.service.handle_component(event, ctx).await
    }
}

pub struct ModalSubmitHandler<S> {
    service: S,
}

impl<S> ModalSubmitHandler<S>
where
    S: InteractionService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> EventHandler for ModalSubmitHandler<S>
where
    S: InteractionService + 'static,
{
    fn event_type(&self) -> GatewayEventType {
        GatewayEventType::ModalSubmit
    }

    async fn handle(
        &self,
        envelope: &GatewayEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let GatewayEvent::ModalSubmit(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        self.service.handle_modal_submit(event, ctx).await
    }
}
