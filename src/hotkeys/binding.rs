// SPDX-License-Identifier: GPL-3.0-only
//! Hotkey actions, key combinations and bindings

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HotkeyError;

use super::keys::KeyCode;

/// Offset added to an action's ordinal to form its native registration id
pub const BASE_ID: i32 = 1000;

/// What a hotkey does: one brightness direction for one of the first four
/// monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HotkeyAction {
    BrightnessUpMonitor0,
    BrightnessDownMonitor0,
    BrightnessUpMonitor1,
    BrightnessDownMonitor1,
    BrightnessUpMonitor2,
    BrightnessDownMonitor2,
    BrightnessUpMonitor3,
    BrightnessDownMonitor3,
}

impl HotkeyAction {
    pub const ALL: [HotkeyAction; 8] = [
        HotkeyAction::BrightnessUpMonitor0,
        HotkeyAction::BrightnessDownMonitor0,
        HotkeyAction::BrightnessUpMonitor1,
        HotkeyAction::BrightnessDownMonitor1,
        HotkeyAction::BrightnessUpMonitor2,
        HotkeyAction::BrightnessDownMonitor2,
        HotkeyAction::BrightnessUpMonitor3,
        HotkeyAction::BrightnessDownMonitor3,
    ];

    /// `monitor * 2`, plus one for the decreasing direction
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    pub fn monitor_index(self) -> usize {
        self.ordinal() / 2
    }

    pub fn is_increase(self) -> bool {
        self.ordinal() % 2 == 0
    }

    pub fn registration_id(self) -> i32 {
        BASE_ID + self.ordinal() as i32
    }

    pub fn from_registration_id(id: i32) -> Option<Self> {
        id.checked_sub(BASE_ID)
            .and_then(|ordinal| usize::try_from(ordinal).ok())
            .and_then(Self::from_ordinal)
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.is_increase() { "up" } else { "down" };
        write!(f, "brightness {} on monitor {}", direction, self.monitor_index() + 1)
    }
}

/// Modifier bitset in `RegisterHotKey` layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(0x0001);
    pub const CTRL: Modifiers = Modifiers(0x0002);
    pub const SHIFT: Modifiers = Modifiers(0x0004);
    pub const WIN: Modifiers = Modifiers(0x0008);

    /// Display order: `Ctrl+Alt+Shift+Win`
    const ORDERED: [(Modifiers, &'static str); 4] = [
        (Modifiers::CTRL, "Ctrl"),
        (Modifiers::ALT, "Alt"),
        (Modifiers::SHIFT, "Shift"),
        (Modifiers::WIN, "Win"),
    ];

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "win" | "meta" | "super" => Some(Self::WIN),
            _ => None,
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Modifiers plus an optional key
///
/// Without a key the combination is "unbound".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: Option<KeyCode>,
}

impl KeyCombo {
    pub fn new(modifiers: Modifiers, key: KeyCode) -> Self {
        Self {
            modifiers,
            key: Some(key),
        }
    }

    pub fn unbound() -> Self {
        Self::default()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = self.key else {
            return f.write_str("(none)");
        };
        for (modifier, name) in Modifiers::ORDERED {
            if self.modifiers.contains(modifier) {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", key)
    }
}

impl FromStr for KeyCombo {
    type Err = HotkeyError;

    /// Parse `Ctrl+Alt+Up` style text. `(none)` and the empty string give an
    /// unbound combination.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("(none)") {
            return Ok(Self::unbound());
        }

        let mut combo = Self::unbound();
        for part in text.split('+').map(str::trim) {
            if let Some(modifier) = Modifiers::from_name(part) {
                combo.modifiers = combo.modifiers | modifier;
                continue;
            }
            if combo.key.is_some() {
                return Err(HotkeyError::Parse(s.to_string()));
            }
            let key = KeyCode::from_name(part).ok_or_else(|| HotkeyError::Parse(s.to_string()))?;
            combo.key = Some(key);
        }

        if combo.key.is_none() {
            return Err(HotkeyError::Parse(s.to_string()));
        }
        Ok(combo)
    }
}

/// One action bound to one key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HotkeyEntry", into = "HotkeyEntry")]
pub struct HotkeyBinding {
    pub action: HotkeyAction,
    pub combo: KeyCombo,
}

impl HotkeyBinding {
    pub fn new(action: HotkeyAction, combo: KeyCombo) -> Self {
        Self { action, combo }
    }

    /// A binding without a key is never registered
    pub fn is_valid(&self) -> bool {
        self.combo.key.is_some()
    }

    pub fn registration_id(&self) -> i32 {
        self.action.registration_id()
    }
}

/// Settings-file form of a binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyEntry {
    action: HotkeyAction,
    keys: String,
}

/// Unreadable key text loads as an unbound entry
impl From<HotkeyEntry> for HotkeyBinding {
    fn from(entry: HotkeyEntry) -> Self {
        let combo = entry.keys.parse().unwrap_or_else(|err| {
            warn!("Ignoring hotkey for {}: {}", entry.action, err);
            KeyCombo::unbound()
        });
        Self::new(entry.action, combo)
    }
}

impl From<HotkeyBinding> for HotkeyEntry {
    fn from(binding: HotkeyBinding) -> Self {
        Self {
            action: binding.action,
            keys: binding.combo.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_layout() {
        for (ordinal, action) in HotkeyAction::ALL.into_iter().enumerate() {
            assert_eq!(action.ordinal(), ordinal);
            assert_eq!(action.registration_id(), 1000 + ordinal as i32);
            assert_eq!(action.monitor_index(), ordinal / 2);
            assert_eq!(action.is_increase(), ordinal % 2 == 0);
            assert_eq!(HotkeyAction::from_registration_id(action.registration_id()), Some(action));
        }
        assert_eq!(HotkeyAction::from_registration_id(999), None);
        assert_eq!(HotkeyAction::from_registration_id(1008), None);
    }

    #[test]
    fn test_combo_display_order() {
        let combo = KeyCombo::new(
            Modifiers::WIN | Modifiers::SHIFT | Modifiers::ALT | Modifiers::CTRL,
            KeyCode(0x70),
        );
        assert_eq!(combo.to_string(), "Ctrl+Alt+Shift+Win+F1");
        assert_eq!(KeyCombo::unbound().to_string(), "(none)");
    }

    #[test]
    fn test_combo_parse() {
        let combo: KeyCombo = "control + alt + up".parse().unwrap();
        assert_eq!(combo.modifiers, Modifiers::CTRL | Modifiers::ALT);
        assert_eq!(combo.key, Some(KeyCode(0x26)));

        let combo: KeyCombo = "Super+PageDown".parse().unwrap();
        assert_eq!(combo.modifiers, Modifiers::WIN);

        assert_eq!("(none)".parse::<KeyCombo>().unwrap(), KeyCombo::unbound());
        assert_eq!("".parse::<KeyCombo>().unwrap(), KeyCombo::unbound());
    }

    #[test]
    fn test_combo_parse_rejects() {
        assert!(matches!("Ctrl+Alt".parse::<KeyCombo>(), Err(HotkeyError::Parse(_))));
        assert!(matches!("Ctrl+A+B".parse::<KeyCombo>(), Err(HotkeyError::Parse(_))));
        assert!(matches!("Ctrl+Banana".parse::<KeyCombo>(), Err(HotkeyError::Parse(_))));
    }

    #[test]
    fn test_combo_text_round_trip() {
        for text in ["Ctrl+Alt+Up", "Shift+Win+F12", "Numpad5", "Alt+OemPlus", "(none)"] {
            let combo: KeyCombo = text.parse().unwrap();
            assert_eq!(combo.to_string(), text);
        }
    }

    #[test]
    fn test_binding_json_shape() {
        let binding = HotkeyBinding::new(
            HotkeyAction::BrightnessDownMonitor1,
            "Ctrl+Alt+Down".parse().unwrap(),
        );
        let json = serde_json::to_value(binding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "action": "BrightnessDownMonitor1", "keys": "Ctrl+Alt+Down" })
        );
        let back: HotkeyBinding = serde_json::from_value(json).unwrap();
        assert_eq!(back, binding);
    }

    #[test]
    fn test_binding_json_bad_keys_load_unbound() {
        let json = serde_json::json!({ "action": "BrightnessUpMonitor0", "keys": "Ctrl+Nope" });
        let binding: HotkeyBinding = serde_json::from_value(json).unwrap();
        assert_eq!(binding.action, HotkeyAction::BrightnessUpMonitor0);
        assert!(!binding.is_valid());
    }

    #[test]
    fn test_unbound_binding_is_invalid() {
        let binding = HotkeyBinding::new(HotkeyAction::BrightnessUpMonitor0, KeyCombo::unbound());
        assert!(!binding.is_valid());
    }
}
