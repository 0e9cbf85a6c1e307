#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("starting TaskDeck frontend");

    wasm_bindgen_futures::spawn_local(async {
        taskdeck_frontend::config::init().await;
        taskdeck_frontend::router::mount_app();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {}
