use tauri::Webview;
use url::Url;

/// Title bar overlay injected into the splash page and the backend's pages. The
/// window is undecorated, so this is its only chrome. Presses are forwarded to
/// the shell's chrome commands; the shell pushes the maximize glyph back through
/// `window.__stresslessChrome.setMaximizeGlyph`.
const CHROME_BRIDGE_SCRIPT: &str = r#"(() => {
  if (window.__stresslessChrome) return;
  const invoke = (cmd, args) =>
    window.__TAURI_INTERNALS__
      ? window.__TAURI_INTERNALS__.invoke(cmd, args || {}).catch(() => {})
      : Promise.resolve();

  const style = document.createElement("style");
  style.textContent = `
    #stressless-titlebar { position: fixed; top: 0; left: 0; right: 0; height: 32px; z-index: 2147483646;
      display: flex; align-items: stretch; background: rgba(20, 22, 27, 0.72); color: #d7dae0;
      font: 10px "Segoe MDL2 Assets", "Segoe Fluent Icons", sans-serif; user-select: none; }
    #stressless-titlebar .sl-drag { flex: 1; }
    #stressless-titlebar button { width: 46px; border: 0; background: transparent; color: inherit;
      font: inherit; cursor: default; }
    #stressless-titlebar button:hover { background: rgba(255, 255, 255, 0.08); }
    #stressless-titlebar button.sl-close:hover { background: #c42b1c; color: #fff; }
    #stressless-grip { position: fixed; right: 0; bottom: 0; width: 14px; height: 14px;
      z-index: 2147483646; cursor: nwse-resize; }
    body { padding-top: 32px !important; box-sizing: border-box; }`;

  const bar = document.createElement("div");
  bar.id = "stressless-titlebar";
  bar.innerHTML =
    '<div class="sl-drag"></div>' +
    '<button data-cmd="chrome_reload" title="Reload">&#xE72C;</button>' +
    '<button data-cmd="chrome_open_devtools" title="Developer tools">&#xEC7A;</button>' +
    '<button data-cmd="chrome_minimize" title="Minimize">&#xE921;</button>' +
    '<button data-cmd="chrome_toggle_maximize" class="sl-max" title="Maximize">&#xE922;</button>' +
    '<button data-cmd="chrome_close" class="sl-close" title="Close">&#xE8BB;</button>';
  const grip = document.createElement("div");
  grip.id = "stressless-grip";

  bar.querySelector(".sl-drag").addEventListener("mousedown", (event) => {
    if (event.button !== 0) return;
    invoke("chrome_drag_region_pressed", { clickCount: event.detail });
  });
  bar.querySelectorAll("button[data-cmd]").forEach((button) => {
    button.addEventListener("click", () => invoke(button.dataset.cmd));
  });
  grip.addEventListener("mousedown", (event) => {
    if (event.button !== 0) return;
    event.preventDefault();
    invoke("chrome_resize_grip_pressed");
  });

  const maxButton = bar.querySelector(".sl-max");
  window.__stresslessChrome = {
    setMaximizeGlyph(glyph, maximized) {
      maxButton.textContent = glyph;
      maxButton.title = maximized ? "Restore" : "Maximize";
    },
  };

  const mount = () => {
    document.head.appendChild(style);
    document.body.prepend(bar);
    document.body.appendChild(grip);
    invoke("chrome_sync_window_state");
  };
  if (document.body) mount();
  else document.addEventListener("DOMContentLoaded", mount, { once: true });
})();"#;

fn same_origin(left: &Url, right: &Url) -> bool {
    left.scheme() == right.scheme()
        && left.host_str() == right.host_str()
        && left.port_or_known_default() == right.port_or_known_default()
}

/// Bundled assets are served from `tauri://localhost` on macOS and Linux and
/// from `http(s)://tauri.localhost` on Windows.
fn is_app_local_origin(page_url: &Url) -> bool {
    match page_url.scheme() {
        "tauri" => page_url.host_str() == Some("localhost"),
        "http" | "https" => page_url.host_str() == Some("tauri.localhost"),
        _ => false,
    }
}

/// The splash page and pages served by the backend get the overlay. Anything
/// else the renderer is pointed at is left alone.
pub(crate) fn should_inject_chrome_bridge(backend_url: &str, page_url: &Url) -> bool {
    if is_app_local_origin(page_url) {
        return true;
    }
    match Url::parse(backend_url) {
        Ok(backend) => same_origin(&backend, page_url),
        Err(_) => false,
    }
}

pub(crate) fn inject_chrome_bridge<F>(webview: &Webview, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = webview.eval(CHROME_BRIDGE_SCRIPT) {
        log(&format!("failed to inject chrome bridge: {error}"));
    }
}
