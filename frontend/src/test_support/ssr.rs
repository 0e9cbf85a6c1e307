use leptos::*;

/// Runs `f` inside a fresh reactive runtime and tears the runtime down
/// afterwards, so signals created in one test never leak into another.
pub fn with_runtime<T>(f: impl FnOnce() -> T) -> T {
    let runtime = leptos::create_runtime();
    let result = f();
    runtime.dispose();
    result
}

/// Renders a view to its HTML string on the host. Resource loading is
/// suppressed for the duration; components must tolerate never-resolving
/// resources when rendered this way.
pub fn render_to_string<F, N>(view: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView + 'static,
{
    leptos_reactive::suppress_resource_load(true);
    let html = with_runtime(move || view().into_view().render_to_string().to_string());
    leptos_reactive::suppress_resource_load(false);
    html
}
