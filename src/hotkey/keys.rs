//! Chord parsing and key token definitions
//!
//! A chord is a string like "ctrl+alt+d": zero or more modifier tokens
//! followed by exactly one key token, joined by '+'. Chords are validated
//! here, at registration time, against a finite token grammar.

use std::fmt;
use std::str::FromStr;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};

/// A parsed key combination: modifier set plus one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    /// Modifier keys that must be held
    pub modifiers: Modifiers,
    /// The non-modifier key completing the combination
    pub key: Code,
}

/// Errors produced while parsing a chord string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordError {
    #[error("empty chord")]
    Empty,

    #[error("chord has no key, only modifiers")]
    MissingKey,

    #[error("unknown key token {0:?}")]
    UnknownKey(String),

    #[error("token {0:?} found after the key; the key must come last")]
    KeyNotLast(String),
}

impl Chord {
    /// Parse a chord string such as "ctrl+alt+d" or "shift+f5".
    ///
    /// Tokens are case-insensitive and surrounding whitespace is ignored,
    /// so "Ctrl + Alt + D" parses to the same chord as "ctrl+alt+d".
    pub fn parse(input: &str) -> Result<Self, ChordError> {
        if input.trim().is_empty() {
            return Err(ChordError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        let mut key = None;

        for token in input.split('+') {
            let token = token.trim().to_ascii_lowercase();
            if token.is_empty() {
                return Err(ChordError::Empty);
            }
            if key.is_some() {
                return Err(ChordError::KeyNotLast(token));
            }
            match modifier_for_token(&token) {
                Some(modifier) => modifiers |= modifier,
                None => {
                    key = Some(key_for_token(&token).ok_or(ChordError::UnknownKey(token))?);
                }
            }
        }

        let key = key.ok_or(ChordError::MissingKey)?;
        Ok(Self { modifiers, key })
    }

    /// Canonical string form: modifiers in ctrl, alt, shift, super order,
    /// then the key token. Aliases collapse, so "option+control+d" and
    /// "ctrl+alt+d" share one canonical form.
    pub fn canonical(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(Modifiers::CONTROL) {
            parts.push("ctrl");
        }
        if self.modifiers.contains(Modifiers::ALT) {
            parts.push("alt");
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            parts.push("shift");
        }
        if self.modifiers.contains(Modifiers::META) {
            parts.push("super");
        }
        parts.push(token_for_key(self.key));
        parts.join("+")
    }

    /// Convert to the backend hotkey type used for OS registration
    pub(crate) fn to_hotkey(&self) -> HotKey {
        let modifiers = if self.modifiers.is_empty() {
            None
        } else {
            Some(self.modifiers)
        };
        HotKey::new(modifiers, self.key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Map a modifier token (lowercase) to its modifier flag
fn modifier_for_token(token: &str) -> Option<Modifiers> {
    match token {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "super" | "cmd" | "command" | "meta" | "win" => Some(Modifiers::META),
        _ => None,
    }
}

/// Map a key token (lowercase) to its key code
fn key_for_token(token: &str) -> Option<Code> {
    let code = match token {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "tab" => Code::Tab,
        "enter" | "return" => Code::Enter,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" | "del" => Code::Delete,
        "insert" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "minus" | "-" => Code::Minus,
        "equal" | "=" => Code::Equal,
        "comma" | "," => Code::Comma,
        "period" | "." => Code::Period,
        "slash" | "/" => Code::Slash,
        "backslash" | "\\" => Code::Backslash,
        "semicolon" | ";" => Code::Semicolon,
        "quote" | "'" => Code::Quote,
        "grave" | "`" => Code::Backquote,
        "bracketleft" | "[" => Code::BracketLeft,
        "bracketright" | "]" => Code::BracketRight,
        _ => return None,
    };
    Some(code)
}

/// Canonical token for a key code (inverse of `key_for_token`)
fn token_for_key(code: Code) -> &'static str {
    match code {
        Code::KeyA => "a",
        Code::KeyB => "b",
        Code::KeyC => "c",
        Code::KeyD => "d",
        Code::KeyE => "e",
        Code::KeyF => "f",
        Code::KeyG => "g",
        Code::KeyH => "h",
        Code::KeyI => "i",
        Code::KeyJ => "j",
        Code::KeyK => "k",
        Code::KeyL => "l",
        Code::KeyM => "m",
        Code::KeyN => "n",
        Code::KeyO => "o",
        Code::KeyP => "p",
        Code::KeyQ => "q",
        Code::KeyR => "r",
        Code::KeyS => "s",
        Code::KeyT => "t",
        Code::KeyU => "u",
        Code::KeyV => "v",
        Code::KeyW => "w",
        Code::KeyX => "x",
        Code::KeyY => "y",
        Code::KeyZ => "z",
        Code::Digit0 => "0",
        Code::Digit1 => "1",
        Code::Digit2 => "2",
        Code::Digit3 => "3",
        Code::Digit4 => "4",
        Code::Digit5 => "5",
        Code::Digit6 => "6",
        Code::Digit7 => "7",
        Code::Digit8 => "8",
        Code::Digit9 => "9",
        Code::F1 => "f1",
        Code::F2 => "f2",
        Code::F3 => "f3",
        Code::F4 => "f4",
        Code::F5 => "f5",
        Code::F6 => "f6",
        Code::F7 => "f7",
        Code::F8 => "f8",
        Code::F9 => "f9",
        Code::F10 => "f10",
        Code::F11 => "f11",
        Code::F12 => "f12",
        Code::Space => "space",
        Code::Tab => "tab",
        Code::Enter => "enter",
        Code::Escape => "escape",
        Code::Backspace => "backspace",
        Code::Delete => "delete",
        Code::Insert => "insert",
        Code::Home => "home",
        Code::End => "end",
        Code::PageUp => "pageup",
        Code::PageDown => "pagedown",
        Code::ArrowUp => "up",
        Code::ArrowDown => "down",
        Code::ArrowLeft => "left",
        Code::ArrowRight => "right",
        Code::Minus => "minus",
        Code::Equal => "equal",
        Code::Comma => "comma",
        Code::Period => "period",
        Code::Slash => "slash",
        Code::Backslash => "backslash",
        Code::Semicolon => "semicolon",
        Code::Quote => "quote",
        Code::Backquote => "grave",
        Code::BracketLeft => "bracketleft",
        Code::BracketRight => "bracketright",
        _ => "unknown",
    }
}
