use super::{Authorization, UsageSource};
use crate::error::AppError;
use crate::models::{current_timestamp, UsageSample};
use log::debug;
use std::time::Duration;
use x11rb::connection::Connection;
use x11rb::protocol::screensaver;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};

/// Foreground-app source backed by an X11 server with EWMH support.
///
/// The focused window's `WM_CLASS` is the app identifier. Its sample is
/// stamped `now - idle`, so a user who walked away longer than the lookback
/// window produces no eligible sample.
pub struct LinuxTracker {
    conn: x11rb::rust_connection::RustConnection,
    root: Window,
}

impl LinuxTracker {
    pub fn new() -> Result<Self, AppError> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| AppError::Platform(format!("Failed to connect to X server: {e}")))?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| AppError::Platform(format!("X screen {screen_num} not found")))?;

        Ok(Self { conn, root })
    }

    fn get_atom(&self, name: &str) -> Option<u32> {
        self.conn
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    fn get_window_property(&self, window: Window, atom: u32) -> Option<Vec<u8>> {
        let reply = self
            .conn
            .get_property(false, window, atom, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        Some(reply.value)
    }

    fn get_active_window_id(&self) -> Option<Window> {
        let atom = self.get_atom("_NET_ACTIVE_WINDOW")?;
        let reply = self
            .conn
            .get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        let window = reply.value32()?.next().filter(|&id| id != x11rb::NONE);
        window
    }

    fn get_active_app(&self) -> Option<String> {
        let window_id = self.get_active_window_id()?;
        let class = self.get_window_property(window_id, AtomEnum::WM_CLASS.into())?;
        app_from_wm_class(&class)
    }

    fn get_idle_time_ms(&self) -> i64 {
        let info = screensaver::query_info(&self.conn, self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok());

        info.map(|i| i64::from(i.ms_since_user_input)).unwrap_or(0)
    }
}

/// `WM_CLASS` holds `instance\0class\0`; the class names the application
/// (`firefox`), the instance often names a window role (`Navigator`).
fn app_from_wm_class(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    text.split('\0')
        .rev()
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

impl Authorization for LinuxTracker {
    fn has_usage_authorization(&self) -> bool {
        let Some(atom) = self.get_atom("_NET_ACTIVE_WINDOW") else {
            return false;
        };
        // Format 0 means the root window does not carry the property at all.
        self.conn
            .get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 1)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some_and(|reply| reply.format != 0)
    }
}

impl UsageSource for LinuxTracker {
    fn query_recent_usage(&self, _window: Duration) -> Vec<UsageSample> {
        let Some(app) = self.get_active_app() else {
            debug!("No active window");
            return Vec::new();
        };
        let last_active_at = current_timestamp().saturating_sub(self.get_idle_time_ms());
        vec![UsageSample::new(app.as_str(), last_active_at)]
    }
}
