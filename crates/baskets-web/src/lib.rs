pub mod runner;

pub use runner::SessionRunner;

use std::cell::RefCell;

use baskets_core::glam::{Quat, Vec3};
use baskets_core::{
    ControllerId, EntityKind, GameConfig, Handedness, InputEvent, ModelManifest, PowerUpKind,
};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut SessionRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .expect("Session not initialized. Call game_init() first.");
        f(runner)
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

fn init_error(what: &str, detail: &str) -> JsValue {
    let msg = JsValue::from_str(&format!("baskets: bad {}: {}", what, detail));
    web_sys::console::error_1(&msg);
    msg
}

/// Create a session. Both arguments may be empty strings for defaults.
#[wasm_bindgen]
pub fn game_init(config_json: &str, manifest_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        GameConfig::default()
    } else {
        GameConfig::from_json(config_json).map_err(|e| init_error("config", &e.to_string()))?
    };
    let manifest = if manifest_json.trim().is_empty() {
        ModelManifest::default()
    } else {
        ModelManifest::from_json(manifest_json).map_err(|e| init_error("manifest", &e.to_string()))?
    };

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(SessionRunner::new(config, &manifest));
    });
    log::info!("baskets: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

// ---- XR input ----

#[wasm_bindgen]
pub fn game_surface_added(label: &str, min_x: f32, min_y: f32, min_z: f32, max_x: f32, max_y: f32, max_z: f32) {
    push(InputEvent::SurfaceAdded {
        label: label.to_string(),
        min: Vec3::new(min_x, min_y, min_z),
        max: Vec3::new(max_x, max_y, max_z),
    });
}

#[wasm_bindgen]
pub fn game_camera_pose(x: f32, y: f32, z: f32, qx: f32, qy: f32, qz: f32, qw: f32) {
    push(InputEvent::CameraPose {
        position: Vec3::new(x, y, z),
        rotation: Quat::from_xyzw(qx, qy, qz, qw).normalize(),
    });
}

#[wasm_bindgen]
pub fn game_controller_connected(id: u32, handedness: &str) {
    push(InputEvent::ControllerConnected {
        id: ControllerId(id),
        handedness: Handedness::from_label(handedness),
    });
}

#[wasm_bindgen]
pub fn game_controller_disconnected(id: u32) {
    push(InputEvent::ControllerDisconnected { id: ControllerId(id) });
}

#[wasm_bindgen]
pub fn game_controller_pose(id: u32, x: f32, y: f32, z: f32, qx: f32, qy: f32, qz: f32, qw: f32) {
    push(InputEvent::ControllerPose {
        id: ControllerId(id),
        position: Vec3::new(x, y, z),
        rotation: Quat::from_xyzw(qx, qy, qz, qw).normalize(),
    });
}

#[wasm_bindgen]
pub fn game_grab_start(id: u32) {
    push(InputEvent::GrabStart { id: ControllerId(id) });
}

#[wasm_bindgen]
pub fn game_grab_end(id: u32) {
    push(InputEvent::GrabEnd { id: ControllerId(id) });
}

/// `asset`: 0 = ball, 1 = hoop.
#[wasm_bindgen]
pub fn game_asset_loaded(asset: u32, ok: bool) {
    match EntityKind::from_code(asset) {
        Some(asset) => push(InputEvent::AssetLoaded { asset, ok }),
        None => log::warn!("Unknown asset code {}", asset),
    }
}

// ---- Game flow ----

#[wasm_bindgen]
pub fn game_start() {
    push(InputEvent::StartGame);
}

#[wasm_bindgen]
pub fn game_reset() {
    push(InputEvent::ResetGame);
}

/// `kind`: 0 = fire, 1 = ice.
#[wasm_bindgen]
pub fn game_power_up(kind: u32) {
    match PowerUpKind::from_code(kind) {
        Some(kind) => push(InputEvent::PowerUp { kind }),
        None => log::warn!("Unknown power-up code {}", kind),
    }
}

/// Queue teardown; it runs on the next tick.
#[wasm_bindgen]
pub fn game_end() {
    push(InputEvent::EndSession);
}

#[wasm_bindgen]
pub fn game_is_ended() -> bool {
    with_runner(|r| r.is_ended())
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    with_runner(|r| r.frame_ptr())
}

#[wasm_bindgen]
pub fn get_frame_floats() -> u32 {
    with_runner(|r| r.frame_floats())
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_runner(|r| r.max_events())
}

/// Copy of the current frame, for debugging without touching WASM memory.
#[wasm_bindgen]
pub fn get_frame_copy() -> js_sys::Float32Array {
    with_runner(|r| js_sys::Float32Array::from(r.frame()))
}
