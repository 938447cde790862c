//! Alarm model and sound resolution.
//!
//! An alarm is a one-shot time-of-day trigger: the registry removes it the
//! instant it matches the wall clock, and snoozing inserts a replacement.

use serde::{Deserialize, Serialize};

use crate::time::ClockTime;

pub const PRESET_CLASSIC: &str = "/sounds/classic-alarm.wav";
pub const PRESET_DIGITAL: &str = "/sounds/digital-alarm.wav";
pub const PRESET_CHIME: &str = "/sounds/chime-alarm.wav";

pub const SNOOZE_SUFFIX: &str = " (Snoozed)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    Classic,
    Digital,
    Chime,
    Custom,
}

/// Exactly one sound source resolves at dispatch time: a preset lookup or
/// the embedded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    Preset(&'static str),
    Custom(String),
}

impl SoundSource {
    pub fn as_str(&self) -> &str {
        match self {
            SoundSource::Preset(path) => path,
            SoundSource::Custom(uri) => uri,
        }
    }

    /// Invert a resolved source back into the alarm fields that produced it.
    /// Used when rebuilding an alarm from a notification payload, where only
    /// the resolved source travels.
    pub fn from_resolved(src: &str) -> (AlarmSound, Option<String>) {
        match src {
            PRESET_CLASSIC => (AlarmSound::Classic, None),
            PRESET_DIGITAL => (AlarmSound::Digital, None),
            PRESET_CHIME => (AlarmSound::Chime, None),
            other => (AlarmSound::Custom, Some(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    pub description: String,
    pub time: ClockTime,
    pub sound: AlarmSound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sound_data_uri: Option<String>,
}

impl Alarm {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        time: ClockTime,
        sound: AlarmSound,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            time,
            sound,
            custom_sound_data_uri: None,
        }
    }

    pub fn with_custom_sound(mut self, data_uri: impl Into<String>) -> Self {
        self.custom_sound_data_uri = Some(data_uri.into());
        self
    }

    /// Resolve the sound to play. Presets ignore any stale embedded payload;
    /// a custom alarm missing its payload falls back to the classic preset
    /// so dispatch never sees an empty source.
    pub fn resolve_sound(&self) -> SoundSource {
        match self.sound {
            AlarmSound::Classic => SoundSource::Preset(PRESET_CLASSIC),
            AlarmSound::Digital => SoundSource::Preset(PRESET_DIGITAL),
            AlarmSound::Chime => SoundSource::Preset(PRESET_CHIME),
            AlarmSound::Custom => match &self.custom_sound_data_uri {
                Some(uri) => SoundSource::Custom(uri.clone()),
                None => SoundSource::Preset(PRESET_CLASSIC),
            },
        }
    }

    /// The replacement alarm a snooze schedules: fresh id, fire time moved
    /// to `now + minutes`, description annotated, sound carried forward.
    pub fn snoozed(&self, new_id: impl Into<String>, now: ClockTime, minutes: u32) -> Alarm {
        Alarm {
            id: new_id.into(),
            description: format!("{}{}", self.description, SNOOZE_SUFFIX),
            time: now.plus_minutes(minutes),
            sound: self.sound,
            custom_sound_data_uri: self.custom_sound_data_uri.clone(),
        }
    }
}
