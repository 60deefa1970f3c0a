// ── Operator command grammar ──
//
// Maps free-form operator text onto the device's text protocol. Parsing
// is pure and total: every input string yields exactly one `ParsedInput`,
// and validation problems come back as error feedback, never as `Err`.

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write as _;
use std::num::IntErrorKind;

/// Highest duty-cycle value the device accepts.
pub const PWM_MAX: u8 = 255;

/// Highest operator-facing percentage.
pub const PERCENT_MAX: u8 = 100;

/// Single keystrokes available in Monitor mode, mapped to the operator
/// text they stand for. Letters match case-insensitively.
pub const QUICK_KEYS: &[(char, &str)] = &[
    ('0', "0"),
    ('1', "30"),
    ('2', "50"),
    ('3', "60"),
    ('4', "80"),
    ('5', "100"),
    ('a', "AUTO"),
    ('m', "MANUAL"),
];

/// Resolve a quick key to its operator-text equivalent.
pub fn quick_key(key: char) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    QUICK_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

// ── DeviceCommand ────────────────────────────────────────────────────

/// A command the device understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// `SPEED:<pwm>` with a validated duty cycle.
    Speed(u8),
    /// `AUTO`: hand fan control back to the temperature curve.
    Auto,
    /// `MANUAL`: hold the last commanded speed.
    Manual,
    /// Operator text forwarded verbatim (uppercased).
    Raw(String),
}

impl DeviceCommand {
    /// Exact protocol text, without the line terminator.
    pub fn as_protocol(&self) -> Cow<'_, str> {
        match self {
            Self::Speed(pwm) => Cow::Owned(format!("SPEED:{pwm}")),
            Self::Auto => Cow::Borrowed("AUTO"),
            Self::Manual => Cow::Borrowed("MANUAL"),
            Self::Raw(raw) => Cow::Borrowed(raw),
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_protocol())
    }
}

// ── Feedback ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Info,
    Error,
}

/// Operator-visible outcome of parsing one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub text: String,
}

impl Feedback {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == FeedbackLevel::Error
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ── ParsedInput ──────────────────────────────────────────────────────

/// Result of [`parse`]: an optional command plus feedback for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub command: Option<DeviceCommand>,
    pub feedback: Feedback,
}

impl ParsedInput {
    fn send(command: DeviceCommand, feedback: impl Into<String>) -> Self {
        Self {
            command: Some(command),
            feedback: Feedback::info(feedback),
        }
    }

    fn nothing(feedback: Feedback) -> Self {
        Self {
            command: None,
            feedback,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

/// `round(percent * 255 / 100)`, rounding halves up. Clamps above 100%.
pub fn percent_to_pwm(percent: u8) -> u8 {
    let percent = u32::from(percent.min(PERCENT_MAX));
    let pwm = (percent * u32::from(PWM_MAX) + 50) / 100;
    u8::try_from(pwm).unwrap_or(PWM_MAX)
}

/// `round(pwm * 100 / 255)`. The quotient never lands on an exact half.
pub fn pwm_to_percent(pwm: u8) -> u8 {
    let pct = (u32::from(pwm) * 100 + 127) / u32::from(PWM_MAX);
    u8::try_from(pct).unwrap_or(PERCENT_MAX)
}

// ── Grammar ──────────────────────────────────────────────────────────

/// Parse one line of operator text.
///
/// Input is trimmed and uppercased before matching. Rules apply in order:
/// blank, help, bare percentage, `PWM:`/`P:` value, `A`/`AUTO`,
/// `M`/`MAN`/`MANUAL`, `SPEED:` passthrough, and finally raw passthrough.
pub fn parse(text: &str) -> ParsedInput {
    let input = text.trim().to_uppercase();

    if input.is_empty() {
        return ParsedInput::nothing(Feedback::info(""));
    }

    if matches!(input.as_str(), "H" | "HELP" | "?") {
        return ParsedInput::nothing(Feedback::info(help_text()));
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return parse_percent(&input);
    }

    if let Some(value) = input
        .strip_prefix("PWM:")
        .or_else(|| input.strip_prefix("P:"))
    {
        return parse_pwm(value);
    }

    match input.as_str() {
        "A" | "AUTO" => return ParsedInput::send(DeviceCommand::Auto, "switch to automatic mode"),
        "M" | "MAN" | "MANUAL" => {
            return ParsedInput::send(DeviceCommand::Manual, "switch to manual mode");
        }
        _ => {}
    }

    if input.starts_with("SPEED:") {
        let feedback = format!("sent {input}");
        return ParsedInput::send(DeviceCommand::Raw(input), feedback);
    }

    let feedback = format!("sent raw command {input} (advanced)");
    ParsedInput::send(DeviceCommand::Raw(input), feedback)
}

fn parse_percent(digits: &str) -> ParsedInput {
    // Overflowing digit strings are out of range all the same.
    let percent = digits
        .parse::<u32>()
        .ok()
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| *v <= PERCENT_MAX);

    match percent {
        Some(percent) => {
            let pwm = percent_to_pwm(percent);
            ParsedInput::send(
                DeviceCommand::Speed(pwm),
                format!("set speed {percent}% (PWM {pwm})"),
            )
        }
        None => ParsedInput::nothing(Feedback::error("percentage out of 0-100 range")),
    }
}

fn parse_pwm(value: &str) -> ParsedInput {
    let out_of_range = || ParsedInput::nothing(Feedback::error("PWM out of 0-255 range"));

    let value = match value.trim().parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            return match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
                _ => ParsedInput::nothing(Feedback::error("malformed PWM value")),
            };
        }
    };

    match u8::try_from(value) {
        Ok(pwm) => ParsedInput::send(
            DeviceCommand::Speed(pwm),
            format!("set speed PWM {pwm} (~{}%)", pwm_to_percent(pwm)),
        ),
        Err(_) => out_of_range(),
    }
}

/// Help text listing every accepted input form and the quick keys.
pub fn help_text() -> String {
    let mut out = String::from(
        "Commands:\n\
         \x20 0-100            set fan speed as a percentage\n\
         \x20 PWM:<0-255>      set raw duty cycle (short form P:<0-255>)\n\
         \x20 A, AUTO          switch to automatic mode\n\
         \x20 M, MAN, MANUAL   switch to manual mode\n\
         \x20 SPEED:<n>        send a speed command unchanged\n\
         \x20 H, HELP, ?       show this help\n\
         \x20 anything else    sent to the device as a raw command\n\
         Quick keys (monitor mode):",
    );
    for (key, text) in QUICK_KEYS {
        let _ = write!(out, " {key}={text}");
    }
    out
}
