//! Key events and hotkey patterns such as `mod+b` or `Enter`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Platform the editor runs on; decides what `mod` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// `mod` is the command key.
    Mac,
    /// `mod` is the control key.
    #[default]
    Other,
}

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Key name, e.g. `"Enter"`, `"b"`, `` "`" ``.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn key(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            ..KeyEvent::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("hotkey '{0}' has no key")]
    MissingKey(String),
    #[error("unknown modifier '{modifier}' in hotkey '{hotkey}'")]
    UnknownModifier { hotkey: String, modifier: String },
}

/// A parsed hotkey pattern. Modifiers must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    key: String,
    modifier: bool,
    ctrl: bool,
    meta: bool,
    shift: bool,
    alt: bool,
}

impl Hotkey {
    /// A hotkey for `key` with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Hotkey {
            key: key.into(),
            modifier: false,
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    /// Adds the platform modifier (`mod`).
    pub fn with_mod(mut self) -> Self {
        self.modifier = true;
        self
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let (want_ctrl, want_meta) = match platform {
            Platform::Mac => (self.ctrl, self.meta || self.modifier),
            Platform::Other => (self.ctrl || self.modifier, self.meta),
        };
        event.ctrl == want_ctrl
            && event.meta == want_meta
            && event.shift == self.shift
            && event.alt == self.alt
            && event.key.eq_ignore_ascii_case(&self.key)
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut hotkey = Hotkey::new("");
        // `+` alone (or as the final segment of `mod++`) names the plus key.
        let (modifiers, key) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match s.rsplit_once('+') {
                Some((modifiers, key)) => (modifiers, key),
                None => ("", s),
            },
        };
        if key.is_empty() {
            return Err(HotkeyError::MissingKey(s.to_string()));
        }
        for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "mod" => hotkey.modifier = true,
                "ctrl" | "control" => hotkey.ctrl = true,
                "meta" | "cmd" | "command" => hotkey.meta = true,
                "shift" => hotkey.shift = true,
                "alt" | "option" => hotkey.alt = true,
                _ => {
                    return Err(HotkeyError::UnknownModifier {
                        hotkey: s.to_string(),
                        modifier: modifier.to_string(),
                    })
                }
            }
        }
        hotkey.key = key.to_string();
        Ok(hotkey)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.modifier, "mod"),
            (self.ctrl, "ctrl"),
            (self.meta, "meta"),
            (self.alt, "alt"),
            (self.shift, "shift"),
        ];
        for (_, name) in flags.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }
        f.write_str(&self.key)
    }
}
