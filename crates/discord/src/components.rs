use serde::Serialize;
use timeclock_core::{Confirmation, Direction, SessionId};

use crate::custom_ids::{CustomId, WizardAction, NAME_INPUT_ID};

pub const EPHEMERAL_FLAG: u64 = 1 << 6;
pub const CLOCK_IN_COLOR: u32 = 0x1e6aef;
pub const CLOCK_OUT_COLOR: u32 = 0xefc11e;

pub const NAME_PROMPT_TEXT: &str = "กรุณากรอกชื่อของคุณเพื่อทำรายการ";
pub const ENTER_NAME_LABEL: &str = "กรอกชื่อผู้ใช้";
pub const PICKER_PROMPT_TEXT: &str = "กรุณาเลือกชื่อพนักงานจากรายการ:";
pub const PICKER_PLACEHOLDER: &str = "เลือกพนักงาน ";
pub const TIMED_OUT_TEXT: &str = "⏰ การทำรายการหมดเวลาแล้ว";
pub const HELLO_TEXT: &str = "สวัสดีครับ!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

impl From<ButtonStyle> for u8 {
    fn from(style: ButtonStyle) -> Self {
        match style {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: u8,
    pub style: ButtonStyle,
    pub label: String,
    pub custom_id: String,
    pub disabled: bool,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: 2,
            style: ButtonStyle::Secondary,
            label: label.into(),
            custom_id: custom_id.into(),
            disabled: false,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self { value: label.clone(), label }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StringSelect {
    #[serde(rename = "type")]
    kind: u8,
    pub custom_id: String,
    pub placeholder: String,
    pub min_values: u8,
    pub max_values: u8,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
}

impl StringSelect {
    pub fn single(
        custom_id: impl Into<String>,
        placeholder: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            kind: 3,
            custom_id: custom_id.into(),
            placeholder: placeholder.into(),
            min_values: 1,
            max_values: 1,
            options,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextInput {
    #[serde(rename = "type")]
    kind: u8,
    pub custom_id: String,
    /// 1 = single line.
    pub style: u8,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
}

impl TextInput {
    pub fn short(
        custom_id: impl Into<String>,
        label: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            kind: 4,
            custom_id: custom_id.into(),
            style: 1,
            label: label.into(),
            placeholder: placeholder.into(),
            required: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    StringSelect(StringSelect),
    TextInput(TextInput),
}

impl Component {
    fn set_disabled(&mut self) {
        match self {
            Self::Button(button) => button.disabled = true,
            Self::StringSelect(select) => select.disabled = true,
            Self::TextInput(_) => {}
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Button(button) => button.disabled,
            Self::StringSelect(select) => select.disabled,
            Self::TextInput(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: u8,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: Vec<Component>) -> Self {
        Self { kind: 1, components }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

/// A message body as accepted by create/edit message and interaction
/// callbacks. `content: None` serializes as `null`, which clears existing
/// content on edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub components: Vec<ActionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessageTemplate {
    pub fn is_ephemeral(&self) -> bool {
        self.flags.is_some_and(|flags| flags & EPHEMERAL_FLAG != 0)
    }

    /// Same surface with every control greyed out.
    pub fn with_all_disabled(mut self) -> Self {
        for row in &mut self.components {
            for component in &mut row.components {
                component.set_disabled();
            }
        }
        self
    }

    pub fn all_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().flat_map(|row| row.components.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
    components: Vec<ActionRow>,
    flags: Option<u64>,
}

impl MessageBuilder {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), embeds: Vec::new(), components: Vec::new(), flags: None }
    }

    pub fn without_content() -> Self {
        Self { content: None, embeds: Vec::new(), components: Vec::new(), flags: None }
    }

    pub fn action_row<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut ActionRowBuilder),
    {
        let mut builder = ActionRowBuilder::default();
        build(&mut builder);
        self.components.push(ActionRow::new(builder.build()));
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or_default() | EPHEMERAL_FLAG);
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate {
            content: self.content,
            embeds: self.embeds,
            components: self.components,
            flags: self.flags,
        }
    }
}

#[derive(Default)]
pub struct ActionRowBuilder {
    components: Vec<Component>,
}

impl ActionRowBuilder {
    pub fn button(&mut self, button: Button) -> &mut Self {
        self.components.push(Component::Button(button));
        self
    }

    pub fn select(&mut self, select: StringSelect) -> &mut Self {
        self.components.push(Component::StringSelect(select));
        self
    }

    pub fn text_input(&mut self, input: TextInput) -> &mut Self {
        self.components.push(Component::TextInput(input));
        self
    }

    fn build(self) -> Vec<Component> {
        self.components
    }
}

pub fn name_prompt_message(session_id: SessionId) -> MessageTemplate {
    MessageBuilder::new(NAME_PROMPT_TEXT)
        .action_row(|row| {
            row.button(
                Button::new(CustomId::new(session_id, WizardAction::EnterName).encode(), ENTER_NAME_LABEL)
                    .style(ButtonStyle::Primary),
            );
        })
        .build()
}

pub fn name_modal(session_id: SessionId) -> Modal {
    Modal {
        custom_id: CustomId::new(session_id, WizardAction::NameModal).encode(),
        title: "ลงชื่อเข้างาน/ออกงาน".to_owned(),
        components: vec![ActionRow::new(vec![Component::TextInput(TextInput::short(
            NAME_INPUT_ID,
            "กรุณากรอกชื่อของคุณ",
            "เช่น: สมชาย",
        ))])],
    }
}

pub fn direction_prompt_message(session_id: SessionId, captured_name: &str) -> MessageTemplate {
    MessageBuilder::new(format!(
        "✅ คุณกรอกชื่อเป็น `{captured_name}`\nเลือก **{} / {}**",
        Direction::In.label(),
        Direction::Out.label()
    ))
    .action_row(|row| {
        row.button(
            Button::new(
                CustomId::new(session_id, WizardAction::Direction(Direction::In)).encode(),
                Direction::In.label(),
            )
            .style(ButtonStyle::Success),
        )
        .button(
            Button::new(
                CustomId::new(session_id, WizardAction::Direction(Direction::Out)).encode(),
                Direction::Out.label(),
            )
            .style(ButtonStyle::Danger),
        );
    })
    .build()
}

/// One single-select menu per page, all sharing the same placeholder.
pub fn roster_picker_message(session_id: SessionId, pages: &[Vec<String>]) -> MessageTemplate {
    pages
        .iter()
        .enumerate()
        .fold(MessageBuilder::new(PICKER_PROMPT_TEXT).ephemeral(), |builder, (page, labels)| {
            builder.action_row(|row| {
                row.select(StringSelect::single(
                    CustomId::new(session_id, WizardAction::Employee { page }).encode(),
                    PICKER_PLACEHOLDER,
                    labels.iter().cloned().map(SelectOption::new).collect(),
                ));
            })
        })
        .build()
}

pub fn picked_message(session_id: SessionId, pages: &[Vec<String>], label: &str) -> MessageTemplate {
    let mut message = roster_picker_message(session_id, pages).with_all_disabled();
    message.content = Some(format!("✅ คุณเลือก: {label}"));
    message
}

pub fn confirmation_embed(confirmation: &Confirmation) -> Embed {
    let direction = confirmation.direction.label();
    Embed {
        title: format!("🕒 {direction} สำเร็จ"),
        description: format!(
            "{} **{direction}** เรียบร้อย\n👤 ชื่อที่กรอก: `{}`\n🧑‍💼 พนักงาน: `{}`\n⏰ เวลา: {}",
            confirmation.actor_mention(),
            confirmation.captured_name,
            confirmation.employee_label,
            confirmation.display_time()
        ),
        color: match confirmation.direction {
            Direction::In => CLOCK_IN_COLOR,
            Direction::Out => CLOCK_OUT_COLOR,
        },
        timestamp: confirmation.iso_timestamp(),
        image: confirmation.image_url.clone().map(|url| EmbedImage { url }),
    }
}

/// Replaces content and every control on the primary wizard message.
pub fn confirmation_message(confirmation: &Confirmation) -> MessageTemplate {
    MessageBuilder::without_content().embed(confirmation_embed(confirmation)).build()
}

pub fn timed_out_message(surface: MessageTemplate) -> MessageTemplate {
    let mut message = surface.with_all_disabled();
    message.content = Some(TIMED_OUT_TEXT.to_owned());
    message
}

pub fn hello_message() -> MessageTemplate {
    MessageBuilder::new(HELLO_TEXT).build()
}
