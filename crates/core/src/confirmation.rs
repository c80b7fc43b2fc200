use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::flows::Direction;

/// Immutable record of a completed clock-in/out, rendered once all wizard
/// fields are set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Confirmation {
    pub direction: Direction,
    pub captured_name: String,
    pub employee_label: String,
    /// The user whose pick completed the wizard.
    pub actor_user_id: String,
    #[serde(serialize_with = "serialize_recorded_at")]
    pub recorded_at: DateTime<Tz>,
    pub image_url: Option<String>,
}

impl Confirmation {
    /// `2026-03-09 08:30:00 +07`
    pub fn display_time(&self) -> String {
        self.recorded_at.format("%Y-%m-%d %H:%M:%S %Z").to_string()
    }

    pub fn iso_timestamp(&self) -> String {
        self.recorded_at.to_rfc3339()
    }

    pub fn actor_mention(&self) -> String {
        format!("<@{}>", self.actor_user_id)
    }
}

fn serialize_recorded_at<S>(value: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}
