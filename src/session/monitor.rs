use std::fmt;
use std::sync::Arc;

use super::host::{ListenerId, SessionHost};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: impl Into<String>) -> Self {
        Self { key: key.into(), ctrl: false, alt: false, shift: false }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self { ctrl: true, ..Self::plain(key) }
    }

    pub fn alt(key: impl Into<String>) -> Self {
        Self { alt: true, ..Self::plain(key) }
    }

    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self { ctrl: true, shift: true, ..Self::plain(key) }
    }

    /// Parses combos such as `ctrl+shift+i`, `alt+tab` or `f11`.
    pub fn parse(combo: &str) -> Option<Self> {
        let mut press = Self::plain(String::new());
        let mut key = None;

        for part in combo.split('+').map(str::trim).filter(|part| !part.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => press.ctrl = true,
                "alt" => press.alt = true,
                "shift" => press.shift = true,
                "tab" => key = Some("Tab".to_string()),
                lower if lower.len() > 1 && lower.starts_with('f') && lower[1..].parse::<u8>().is_ok() => {
                    key = Some(lower.to_ascii_uppercase());
                }
                _ => key = Some(part.to_string()),
            }
        }

        press.key = key?;
        Some(press)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserSignal {
    VisibilityChanged { hidden: bool },
    FullscreenChanged { active: bool },
    KeyDown(KeyPress),
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspiciousShortcut {
    AppSwitch,
    TabSwitch,
    FullscreenToggle,
    Reload,
    DevTools,
}

impl SuspiciousShortcut {
    pub fn classify(key: &KeyPress) -> Option<Self> {
        let name = key.key.as_str();
        if name == "Tab" && key.alt {
            Some(Self::AppSwitch)
        } else if name == "Tab" && key.ctrl {
            Some(Self::TabSwitch)
        } else if name == "F11" {
            Some(Self::FullscreenToggle)
        } else if key.ctrl && key.shift && name.eq_ignore_ascii_case("i") {
            Some(Self::DevTools)
        } else if key.ctrl && name.eq_ignore_ascii_case("r") {
            Some(Self::Reload)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatingSignal {
    WindowHidden,
    FullscreenExited,
    Shortcut(SuspiciousShortcut),
}

impl fmt::Display for CheatingSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowHidden => f.write_str("window hidden"),
            Self::FullscreenExited => f.write_str("full-screen exited"),
            Self::Shortcut(shortcut) => write!(f, "shortcut {shortcut:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Armed,
    Detected,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalResponse {
    pub suppress_default: bool,
    /// Present on the one signal that moved the monitor from armed to detected.
    pub detection: Option<CheatingSignal>,
}

#[derive(Debug)]
pub struct AntiCheatMonitor {
    state: MonitorState,
}

impl Default for AntiCheatMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AntiCheatMonitor {
    pub fn new() -> Self {
        Self { state: MonitorState::Armed }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn observe(&mut self, signal: &BrowserSignal) -> SignalResponse {
        if self.state == MonitorState::Released {
            return SignalResponse::default();
        }

        let (suppress_default, trigger) = match signal {
            BrowserSignal::VisibilityChanged { hidden: true } => (false, Some(CheatingSignal::WindowHidden)),
            BrowserSignal::FullscreenChanged { active: false } => {
                (false, Some(CheatingSignal::FullscreenExited))
            }
            BrowserSignal::KeyDown(key) => match SuspiciousShortcut::classify(key) {
                Some(shortcut) => (true, Some(CheatingSignal::Shortcut(shortcut))),
                None => (false, None),
            },
            BrowserSignal::ContextMenu => (true, None),
            BrowserSignal::VisibilityChanged { hidden: false }
            | BrowserSignal::FullscreenChanged { active: true } => (false, None),
        };

        let detection = match (trigger, self.state) {
            (Some(signal), MonitorState::Armed) => {
                self.state = MonitorState::Detected;
                Some(signal)
            }
            _ => None,
        };

        SignalResponse { suppress_default, detection }
    }

    pub fn release(&mut self) {
        self.state = MonitorState::Released;
    }
}

/// Keeps the host's listeners attached for as long as it lives.
pub struct MonitorGuard {
    host: Arc<dyn SessionHost>,
    id: ListenerId,
}

impl MonitorGuard {
    pub fn attach(host: Arc<dyn SessionHost>) -> Self {
        let id = host.attach_listeners();
        Self { host, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        self.host.detach_listeners(self.id);
    }
}
