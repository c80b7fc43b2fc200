//! Discord integration for the clock-in/out wizard
//!
//! - **Gateway** (`gateway`) - envelope pump with reconnection over a pluggable transport
//! - **Events** (`events`) - dispatch decoding and per-event-type handlers
//! - **Commands** (`commands`) - `!clock` and `!hello` prefix commands
//! - **Wizard** (`wizard`) - the clock session service, its registry and timers
//! - **Components** (`components`) - buttons, select menus, modals and embeds
//! - **HTTP** (`http`) - outbound REST calls behind the `DiscordHttp` trait
//!
//! # Architecture
//!
//! ```text
//! GatewayTransport → GatewayRunner → EventDispatcher → ClockWizard → timeclock-core
//!                                                          ↓
//!                                        DiscordHttp ← components
//! ```

pub mod commands;
pub mod components;
pub mod custom_ids;
pub mod events;
pub mod gateway;
pub mod http;
pub mod timer;
pub mod wizard;

pub use events::default_dispatcher;
pub use gateway::{GatewayRunner, GatewayTransport, NoopGatewayTransport, ReconnectPolicy};
pub use http::{DiscordHttp, RestDiscordHttp};
pub use wizard::{ClockWizard, WizardSettings};
