use web_sys::{Storage, Window};

/// `web_sys::window()` aborts on non-wasm targets, so host builds get an
/// error instead; callers already treat a missing window as "degrade".
pub fn window() -> Result<Window, String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().ok_or_else(|| "no window object".to_string())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Err("no window object".to_string())
    }
}

pub fn local_storage() -> Result<Storage, String> {
    window()?
        .local_storage()
        .map_err(|_| "no localStorage".to_string())?
        .ok_or_else(|| "no localStorage".to_string())
}
