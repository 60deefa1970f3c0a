// ── Telemetry lines ──
//
// Decoding of inbound datagram payloads and best-effort extraction of the
// fan controller's periodic status report. The raw text is always kept;
// `FanStatus` is an optional structured view on top of it.

use chrono::{DateTime, Local};
use strum::{Display, EnumString};

/// One decoded telemetry datagram.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryLine {
    pub text: String,
    pub received_at: DateTime<Local>,
}

impl TelemetryLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self::at(text, Local::now())
    }

    pub fn at(text: impl Into<String>, received_at: DateTime<Local>) -> Self {
        Self {
            text: text.into(),
            received_at,
        }
    }

    /// Wall-clock arrival time as `HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.received_at.format("%H:%M:%S").to_string()
    }

    pub fn status(&self) -> Option<FanStatus> {
        FanStatus::parse(&self.text)
    }
}

/// Decode a payload as UTF-8, dropping any invalid byte sequences.
pub fn decode_payload(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

// ── FanStatus ────────────────────────────────────────────────────────

/// Control mode as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FanMode {
    #[strum(serialize = "AUTO")]
    Auto,
    #[strum(to_string = "MANUAL", serialize = "MAN")]
    Manual,
}

/// Structured view of a status report such as
/// `Temp: 28.5C | Hum: 61.0% | Set: 28.00C | Mode: AUTO | Speed: 40%`.
///
/// Every field is optional: sensor failures show up as `nan` and older
/// firmware omits fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FanStatus {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub threshold_c: Option<f32>,
    pub mode: Option<FanMode>,
    pub speed_pct: Option<u8>,
}

impl FanStatus {
    /// Returns `None` when the line carries none of the known fields.
    pub fn parse(text: &str) -> Option<Self> {
        let mut status = Self::default();
        let mut recognised = false;

        for segment in text.split('|') {
            let Some((key, value)) = segment.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "temp" => status.temperature_c = reading(value, 'C'),
                "hum" => status.humidity_pct = reading(value, '%'),
                "set" => status.threshold_c = reading(value, 'C'),
                "mode" => status.mode = value.parse().ok(),
                "speed" => {
                    status.speed_pct = value.trim_end_matches('%').trim().parse().ok();
                }
                _ => continue,
            }
            recognised = true;
        }

        recognised.then_some(status)
    }
}

fn reading(value: &str, unit: char) -> Option<f32> {
    value
        .trim_end_matches(unit)
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}
