//! Bringing another application's window to the front.

use crate::error::{ControllerError, Result};

/// Raises a window by application or title name.
pub trait WindowFocus {
    fn focus(&self, app_name: &str) -> Result<()>;
}

/// Uses the platform's native mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFocus;

impl WindowFocus for SystemFocus {
    fn focus(&self, app_name: &str) -> Result<()> {
        if app_name.is_empty() {
            return Err(ControllerError::Focus("no window name given".to_string()));
        }
        platform::focus(app_name)
    }
}

#[cfg(windows)]
mod platform {
    use windows_sys::Win32::UI::WindowsAndMessaging::{FindWindowW, SetForegroundWindow};

    use crate::error::{ControllerError, Result};

    pub fn focus(app_name: &str) -> Result<()> {
        let title: Vec<u16> = app_name.encode_utf16().chain(std::iter::once(0)).collect();
        // SAFETY: `title` is a NUL-terminated UTF-16 buffer that outlives both calls.
        let hwnd = unsafe { FindWindowW(std::ptr::null(), title.as_ptr()) };
        if hwnd.is_null() {
            return Err(ControllerError::Focus(format!("no window titled {app_name:?}")));
        }
        // SAFETY: `hwnd` was just returned by FindWindowW.
        if unsafe { SetForegroundWindow(hwnd) } == 0 {
            return Err(ControllerError::Focus(format!(
                "could not raise window {app_name:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::process::Command;

    use crate::error::{ControllerError, Result};

    pub fn focus(app_name: &str) -> Result<()> {
        let script = format!(
            "tell application \"{}\" to activate",
            app_name.replace('\\', "\\\\").replace('"', "\\\"")
        );
        let status = Command::new("osascript").arg("-e").arg(script).status()?;
        if !status.success() {
            return Err(ControllerError::Focus(format!("osascript exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
mod platform {
    use std::process::{Command, Stdio};

    use crate::error::{ControllerError, Result};

    pub fn focus(app_name: &str) -> Result<()> {
        let status = Command::new("wmctrl")
            .arg("-a")
            .arg(app_name)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(ControllerError::Focus(format!("wmctrl exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(not(any(windows, unix)))]
mod platform {
    use crate::error::{ControllerError, Result};

    pub fn focus(_app_name: &str) -> Result<()> {
        Err(ControllerError::Focus(
            "window focus is not supported on this platform".to_string(),
        ))
    }
}
