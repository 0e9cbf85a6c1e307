use std::rc::Rc;

/// Navigation seam so the session machinery can redirect without reaching for
/// `window.location` directly. Tests substitute a recording implementation.
pub trait Navigate {
    fn navigate(&self, to: &str);
}

#[derive(Clone, Default)]
pub struct BrowserNavigator;

impl Navigate for BrowserNavigator {
    #[cfg(target_arch = "wasm32")]
    fn navigate(&self, to: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(to);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn navigate(&self, _to: &str) {}
}

impl<T: Navigate + ?Sized> Navigate for Rc<T> {
    fn navigate(&self, to: &str) {
        (**self).navigate(to);
    }
}

/// Current pathname, or "/" when there is no window (host tests).
pub fn current_path() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        "/".to_string()
    }
}
