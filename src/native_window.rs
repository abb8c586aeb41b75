use serde::Serialize;
use tauri::{
    utils::config::WindowEffectsConfig,
    window::{Effect, EffectsBuilder},
    Theme, WebviewWindow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum WindowState {
    Normal,
    Minimized,
    Maximized,
}

/// Edge a chrome-initiated resize is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResizeDirection {
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackdropKind {
    None,
    TranslucentMain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BackdropPreference {
    pub(crate) dark_mode: bool,
    pub(crate) backdrop: BackdropKind,
}

impl Default for BackdropPreference {
    fn default() -> Self {
        Self {
            dark_mode: true,
            backdrop: BackdropKind::TranslucentMain,
        }
    }
}

/// Glyphs from Segoe MDL2 Assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaximizeGlyph {
    Maximize,
    Restore,
}

impl MaximizeGlyph {
    pub(crate) fn for_state(state: WindowState) -> Self {
        if state == WindowState::Maximized {
            Self::Restore
        } else {
            Self::Maximize
        }
    }

    pub(crate) fn codepoint(self) -> char {
        match self {
            Self::Maximize => '\u{E922}',
            Self::Restore => '\u{E923}',
        }
    }
}

/// Window-manager operations the chrome needs. Implemented over a real Tauri
/// window in production and by a recording fake in tests.
pub(crate) trait NativeWindowServices {
    fn window_state(&self) -> Result<WindowState, String>;
    fn start_move_drag(&self) -> Result<(), String>;
    fn start_resize_drag(&self, direction: ResizeDirection) -> Result<(), String>;
    fn minimize(&self) -> Result<(), String>;
    fn maximize(&self) -> Result<(), String>;
    fn restore(&self) -> Result<(), String>;
    fn close(&self) -> Result<(), String>;
    fn set_dark_mode(&self, enabled: bool) -> Result<(), String>;
    fn set_backdrop(&self, kind: BackdropKind) -> Result<(), String>;
    fn show_maximize_glyph(&self, glyph: MaximizeGlyph) -> Result<(), String>;
    fn reload(&self) -> Result<(), String>;
    fn open_devtools(&self) -> Result<(), String>;
}

pub(crate) struct TauriWindowServices {
    window: WebviewWindow,
}

impl TauriWindowServices {
    pub(crate) fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

fn to_native_resize_direction(direction: ResizeDirection) -> tauri_runtime::ResizeDirection {
    match direction {
        ResizeDirection::BottomRight => tauri_runtime::ResizeDirection::SouthEast,
    }
}

#[cfg(target_os = "windows")]
fn translucent_effect() -> Option<Effect> {
    Some(Effect::Mica)
}

#[cfg(target_os = "macos")]
fn translucent_effect() -> Option<Effect> {
    Some(Effect::UnderWindowBackground)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn translucent_effect() -> Option<Effect> {
    None
}

impl NativeWindowServices for TauriWindowServices {
    fn window_state(&self) -> Result<WindowState, String> {
        let minimized = self
            .window
            .is_minimized()
            .map_err(|error| format!("Failed to read minimized state: {error}"))?;
        if minimized {
            return Ok(WindowState::Minimized);
        }
        let maximized = self
            .window
            .is_maximized()
            .map_err(|error| format!("Failed to read maximized state: {error}"))?;
        Ok(if maximized {
            WindowState::Maximized
        } else {
            WindowState::Normal
        })
    }

    fn start_move_drag(&self) -> Result<(), String> {
        self.window
            .start_dragging()
            .map_err(|error| format!("Failed to start window drag: {error}"))
    }

    fn start_resize_drag(&self, direction: ResizeDirection) -> Result<(), String> {
        self.window
            .as_ref()
            .window()
            .start_resize_dragging(to_native_resize_direction(direction))
            .map_err(|error| format!("Failed to start window resize: {error}"))
    }

    fn minimize(&self) -> Result<(), String> {
        self.window
            .minimize()
            .map_err(|error| format!("Failed to minimize window: {error}"))
    }

    fn maximize(&self) -> Result<(), String> {
        self.window
            .maximize()
            .map_err(|error| format!("Failed to maximize window: {error}"))
    }

    fn restore(&self) -> Result<(), String> {
        self.window
            .unmaximize()
            .map_err(|error| format!("Failed to restore window: {error}"))
    }

    fn close(&self) -> Result<(), String> {
        self.window
            .close()
            .map_err(|error| format!("Failed to close window: {error}"))
    }

    fn set_dark_mode(&self, enabled: bool) -> Result<(), String> {
        let theme = if enabled { Some(Theme::Dark) } else { None };
        self.window
            .set_theme(theme)
            .map_err(|error| format!("Failed to set window theme: {error}"))
    }

    fn set_backdrop(&self, kind: BackdropKind) -> Result<(), String> {
        match kind {
            BackdropKind::None => self
                .window
                .set_effects(None::<WindowEffectsConfig>)
                .map_err(|error| format!("Failed to clear window effects: {error}")),
            BackdropKind::TranslucentMain => {
                let effect = translucent_effect()
                    .ok_or_else(|| "Translucent backdrop is not supported here.".to_string())?;
                self.window
                    .set_effects(EffectsBuilder::new().effect(effect).build())
                    .map_err(|error| format!("Failed to apply window backdrop: {error}"))?;
                self.window
                    .set_shadow(true)
                    .map_err(|error| format!("Failed to enable window shadow: {error}"))
            }
        }
    }

    fn show_maximize_glyph(&self, glyph: MaximizeGlyph) -> Result<(), String> {
        let glyph_literal = serde_json::to_string(&glyph.codepoint().to_string())
            .map_err(|error| format!("Failed to encode maximize glyph: {error}"))?;
        let js = format!(
            "window.__stresslessChrome && window.__stresslessChrome.setMaximizeGlyph({}, {});",
            glyph_literal,
            glyph == MaximizeGlyph::Restore
        );
        self.window
            .eval(&js)
            .map_err(|error| format!("Failed to update maximize glyph: {error}"))
    }

    fn reload(&self) -> Result<(), String> {
        self.window
            .eval("window.location.reload();")
            .map_err(|error| format!("Failed to reload renderer: {error}"))
    }

    fn open_devtools(&self) -> Result<(), String> {
        self.window.open_devtools();
        Ok(())
    }
}
