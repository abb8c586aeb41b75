use crate::native_window::{
    BackdropKind, BackdropPreference, MaximizeGlyph, NativeWindowServices, ResizeDirection,
    WindowState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowChromeState {
    pub(crate) window_state: WindowState,
    /// Set only while a chrome-initiated resize is being handed to the OS.
    pub(crate) resize_direction: Option<ResizeDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChromeAction {
    MoveDrag,
    ToggleMaximize(WindowState),
    ResizeStarted,
    ResizeIgnoredWhileMaximized,
}

/// Custom title bar behavior for the single top-level window.
///
/// The window state is a mirror of what the OS reports. It is only written
/// ahead of the OS when this controller issues the command itself; every OS
/// notification goes through [`WindowChrome::sync_from_os`].
pub(crate) struct WindowChrome<N> {
    services: N,
    state: WindowChromeState,
    backdrop: Option<BackdropPreference>,
}

impl<N: NativeWindowServices> WindowChrome<N> {
    pub(crate) fn new(services: N) -> Self {
        let window_state = services.window_state().unwrap_or(WindowState::Normal);
        Self {
            services,
            state: WindowChromeState {
                window_state,
                resize_direction: None,
            },
            backdrop: None,
        }
    }

    pub(crate) fn state(&self) -> WindowChromeState {
        self.state
    }

    pub(crate) fn maximize_glyph(&self) -> MaximizeGlyph {
        MaximizeGlyph::for_state(self.state.window_state)
    }

    pub(crate) fn applied_backdrop(&self) -> Option<BackdropPreference> {
        self.backdrop
    }

    fn set_window_state(&mut self, next: WindowState) -> bool {
        let previous_glyph = self.maximize_glyph();
        self.state.window_state = next;
        self.maximize_glyph() != previous_glyph
    }

    pub(crate) fn push_glyph(&self) -> Result<(), String> {
        self.services.show_maximize_glyph(self.maximize_glyph())
    }

    /// Re-reads the OS window state. Returns whether the maximize glyph changed.
    pub(crate) fn sync_from_os(&mut self) -> Result<bool, String> {
        let reported = self.services.window_state()?;
        if reported == self.state.window_state {
            return Ok(false);
        }
        let glyph_changed = self.set_window_state(reported);
        if glyph_changed {
            self.push_glyph()?;
        }
        Ok(glyph_changed)
    }

    /// Single press starts a window move; a double press toggles maximize.
    pub(crate) fn drag_region_pressed(&mut self, click_count: u32) -> Result<ChromeAction, String> {
        if click_count >= 2 {
            let state = self.toggle_maximize()?;
            return Ok(ChromeAction::ToggleMaximize(state));
        }
        self.services.start_move_drag()?;
        Ok(ChromeAction::MoveDrag)
    }

    /// Bottom-right grip. Does nothing at all while maximized.
    pub(crate) fn resize_grip_pressed(&mut self) -> Result<ChromeAction, String> {
        // Best effort: a failed read keeps the mirrored state.
        self.sync_from_os().ok();
        if self.state.window_state == WindowState::Maximized {
            return Ok(ChromeAction::ResizeIgnoredWhileMaximized);
        }

        self.state.resize_direction = Some(ResizeDirection::BottomRight);
        let result = self.services.start_resize_drag(ResizeDirection::BottomRight);
        self.state.resize_direction = None;
        result.map(|()| ChromeAction::ResizeStarted)
    }

    pub(crate) fn toggle_maximize(&mut self) -> Result<WindowState, String> {
        self.sync_from_os().ok();

        let next = if self.state.window_state == WindowState::Maximized {
            self.services.restore()?;
            WindowState::Normal
        } else {
            self.services.maximize()?;
            WindowState::Maximized
        };
        self.set_window_state(next);
        self.push_glyph()?;
        Ok(next)
    }

    pub(crate) fn minimize(&mut self) -> Result<(), String> {
        self.services.minimize()?;
        if self.set_window_state(WindowState::Minimized) {
            self.push_glyph()?;
        }
        Ok(())
    }

    pub(crate) fn close(&mut self) -> Result<(), String> {
        self.services.close()
    }

    pub(crate) fn reload(&self) -> Result<(), String> {
        self.services.reload()
    }

    pub(crate) fn open_devtools(&self) -> Result<(), String> {
        self.services.open_devtools()
    }

    /// Applies dark mode and the backdrop the first time it is called; later
    /// calls do nothing. Native failures are reported through `log` only.
    pub(crate) fn apply_backdrop_once<F>(&mut self, preference: BackdropPreference, log: F) -> bool
    where
        F: Fn(&str),
    {
        if self.backdrop.is_some() {
            return false;
        }
        self.backdrop = Some(preference);

        if let Err(error) = self.services.set_dark_mode(preference.dark_mode) {
            log(&format!("dark mode not applied: {error}"));
        }
        if preference.backdrop != BackdropKind::None {
            if let Err(error) = self.services.set_backdrop(preference.backdrop) {
                log(&format!("backdrop not applied: {error}"));
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum NativeCall {
        MoveDrag,
        ResizeDrag(ResizeDirection),
        Minimize,
        Maximize,
        Restore,
        Close,
        DarkMode(bool),
        Backdrop(BackdropKind),
        Glyph(MaximizeGlyph),
        Reload,
        Devtools,
    }

    /// Window double that behaves like a cooperative window manager and
    /// records every native call.
    #[derive(Default)]
    pub(crate) struct FakeWindow {
        pub(crate) os_state: Cell<Option<WindowState>>,
        pub(crate) calls: RefCell<Vec<NativeCall>>,
        pub(crate) fail_theming: bool,
    }

    impl FakeWindow {
        pub(crate) fn with_state(state: WindowState) -> Self {
            Self {
                os_state: Cell::new(Some(state)),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<NativeCall> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: NativeCall) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl NativeWindowServices for &FakeWindow {
        fn window_state(&self) -> Result<WindowState, String> {
            Ok(self.os_state.get().unwrap_or(WindowState::Normal))
        }

        fn start_move_drag(&self) -> Result<(), String> {
            self.record(NativeCall::MoveDrag);
            Ok(())
        }

        fn start_resize_drag(&self, direction: ResizeDirection) -> Result<(), String> {
            self.record(NativeCall::ResizeDrag(direction));
            Ok(())
        }

        fn minimize(&self) -> Result<(), String> {
            self.record(NativeCall::Minimize);
            self.os_state.set(Some(WindowState::Minimized));
            Ok(())
        }

        fn maximize(&self) -> Result<(), String> {
            self.record(NativeCall::Maximize);
            self.os_state.set(Some(WindowState::Maximized));
            Ok(())
        }

        fn restore(&self) -> Result<(), String> {
            self.record(NativeCall::Restore);
            self.os_state.set(Some(WindowState::Normal));
            Ok(())
        }

        fn close(&self) -> Result<(), String> {
            self.record(NativeCall::Close);
            Ok(())
        }

        fn set_dark_mode(&self, enabled: bool) -> Result<(), String> {
            self.record(NativeCall::DarkMode(enabled));
            if self.fail_theming {
                return Err("DWMWA_USE_IMMERSIVE_DARK_MODE unsupported".to_string());
            }
            Ok(())
        }

        fn set_backdrop(&self, kind: BackdropKind) -> Result<(), String> {
            self.record(NativeCall::Backdrop(kind));
            if self.fail_theming {
                return Err("DWMWA_SYSTEMBACKDROP_TYPE unsupported".to_string());
            }
            Ok(())
        }

        fn show_maximize_glyph(&self, glyph: MaximizeGlyph) -> Result<(), String> {
            self.record(NativeCall::Glyph(glyph));
            Ok(())
        }

        fn reload(&self) -> Result<(), String> {
            self.record(NativeCall::Reload);
            Ok(())
        }

        fn open_devtools(&self) -> Result<(), String> {
            self.record(NativeCall::Devtools);
            Ok(())
        }
    }
}
