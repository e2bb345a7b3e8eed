use baskets_core::{FrameBuffer, GameConfig, InputEvent, ModelManifest, ProtocolLayout, Session};

/// Owns the session and the flat buffer the front end reads after each tick.
///
/// `lib.rs` keeps one of these in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// structs that borrow or hold closures.
pub struct SessionRunner {
    session: Session,
    frame: FrameBuffer,
}

impl SessionRunner {
    pub fn new(config: GameConfig, manifest: &ModelManifest) -> Self {
        let frame = FrameBuffer::new(ProtocolLayout::from_config(&config));
        Self {
            session: Session::with_manifest(config, manifest),
            frame,
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.session.push_input(event);
    }

    /// Run the session for one frame, then pack the frame buffer.
    pub fn tick(&mut self, dt: f32) {
        if self.session.is_ended() {
            return;
        }
        self.session.tick(dt);
        let snapshot = self.session.snapshot();
        self.frame.write(&snapshot, self.session.frame_events());
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_ended(&self) -> bool {
        self.session.is_ended()
    }

    // ---- Pointer accessors for direct memory reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn frame_floats(&self) -> u32 {
        self.frame.layout().buffer_total_floats as u32
    }

    pub fn max_events(&self) -> u32 {
        self.frame.layout().max_events as u32
    }

    pub fn frame(&self) -> &[f32] {
        self.frame.as_slice()
    }
}
