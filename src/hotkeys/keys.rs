// SPDX-License-Identifier: GPL-3.0-only
//! Virtual-key codes and their names

use std::fmt;

/// A Windows virtual-key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

/// Keys whose name isn't derived from a range
const NAMED_KEYS: &[(&str, u32)] = &[
    ("Backspace", 0x08),
    ("Tab", 0x09),
    ("Enter", 0x0D),
    ("Pause", 0x13),
    ("Escape", 0x1B),
    ("Space", 0x20),
    ("PageUp", 0x21),
    ("PageDown", 0x22),
    ("End", 0x23),
    ("Home", 0x24),
    ("Left", 0x25),
    ("Up", 0x26),
    ("Right", 0x27),
    ("Down", 0x28),
    ("PrintScreen", 0x2C),
    ("Insert", 0x2D),
    ("Delete", 0x2E),
    ("NumpadMultiply", 0x6A),
    ("NumpadAdd", 0x6B),
    ("NumpadSubtract", 0x6D),
    ("NumpadDecimal", 0x6E),
    ("NumpadDivide", 0x6F),
    ("ScrollLock", 0x91),
    ("VolumeMute", 0xAD),
    ("VolumeDown", 0xAE),
    ("VolumeUp", 0xAF),
    ("OemSemicolon", 0xBA),
    ("OemPlus", 0xBB),
    ("OemComma", 0xBC),
    ("OemMinus", 0xBD),
    ("OemPeriod", 0xBE),
];

/// Accepted on input only
const ALIASES: &[(&str, u32)] = &[
    ("Esc", 0x1B),
    ("Return", 0x0D),
    ("Del", 0x2E),
    ("Ins", 0x2D),
    ("PgUp", 0x21),
    ("PgDn", 0x22),
    ("Plus", 0xBB),
    ("Minus", 0xBD),
];

impl KeyCode {
    /// Look up a key by name, case-insensitively.
    ///
    /// Accepts letters, digits (also in the `D0`..`D9` form), `F1`..`F24`,
    /// `Numpad0`..`Numpad9`, the named keys above and raw `0x..` codes.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return None;
        }

        if upper.len() == 1 {
            let c = upper.as_bytes()[0];
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                return Some(Self(u32::from(c)));
            }
        }

        if let Some(digit) = upper.strip_prefix('D').filter(|d| d.len() == 1) {
            let c = digit.as_bytes()[0];
            if c.is_ascii_digit() {
                return Some(Self(u32::from(c)));
            }
        }

        if let Some(n) = upper.strip_prefix("NUMPAD").and_then(|n| n.parse::<u32>().ok()) {
            return (n <= 9).then_some(Self(0x60 + n));
        }

        if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
            return (1..=24).contains(&n).then_some(Self(0x70 + n - 1));
        }

        if let Some(hex) = upper.strip_prefix("0X") {
            return u32::from_str_radix(hex, 16)
                .ok()
                .filter(|code| (1..=0xFE).contains(code))
                .map(Self);
        }

        NAMED_KEYS
            .iter()
            .chain(ALIASES)
            .find(|(key, _)| key.eq_ignore_ascii_case(&upper))
            .map(|&(_, code)| Self(code))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.0;
        match code {
            0x30..=0x39 | 0x41..=0x5A => write!(f, "{}", char::from(code as u8)),
            0x60..=0x69 => write!(f, "Numpad{}", code - 0x60),
            0x70..=0x87 => write!(f, "F{}", code - 0x70 + 1),
            _ => match NAMED_KEYS.iter().find(|&&(_, c)| c == code) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "0x{:02X}", code),
            },
        }
    }
}
