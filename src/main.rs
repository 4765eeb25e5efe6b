//! Isle Voyage entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent};

    use isle_voyage::consts::*;
    use isle_voyage::hud;
    use isle_voyage::sim::{Command, InputQueue, SessionEvent, SessionState, Telemetry, tick};
    use isle_voyage::snapshot::{FrameSnapshot, flags};
    use isle_voyage::{Settings, WorldConfig};

    /// Session plus browser-side bookkeeping
    struct Game {
        state: SessionState,
        queue: InputQueue,
        settings: Settings,
        snapshot: FrameSnapshot,
        last_time: f64,
        last_telemetry: Option<Telemetry>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(world: WorldConfig, settings: Settings) -> Self {
            let mut state = SessionState::new(world);
            settings.apply(&mut state);
            let snapshot = FrameSnapshot::capture(&state);
            Self {
                state,
                queue: InputQueue::new(),
                settings,
                snapshot,
                last_time: 0.0,
                last_telemetry: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one frame of simulation and route its events
        fn update(&mut self, dt: f32, time: f64) {
            let events = tick(&mut self.state, &mut self.queue, dt);
            for event in events {
                match event {
                    SessionEvent::Telemetry(t) => self.last_telemetry = Some(t),
                    SessionEvent::ModeChanged { island } => {
                        self.update_island_panel(island.as_deref());
                    }
                    SessionEvent::EntitySelected { entity } => {
                        self.update_entity_panel(entity.as_deref());
                    }
                    SessionEvent::Proximity { .. } | SessionEvent::Collision => {}
                }
            }
            self.snapshot = FrameSnapshot::capture(&self.state);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(t) = &self.last_telemetry {
                let marker = hud::BoatMarker::from_telemetry(t, &self.state.world);
                if let Some(el) = document.get_element_by_id("minimap-boat") {
                    let _ = el.set_attribute(
                        "transform",
                        &format!(
                            "translate({:.1} {:.1}) rotate({:.1})",
                            hud::MINIMAP_SIZE / 2.0 + marker.offset.x,
                            hud::MINIMAP_SIZE / 2.0 + marker.offset.y,
                            marker.rotation_deg
                        ),
                    );
                }
            }

            // Landing prompt
            if let Some(el) = document.get_element_by_id("landing-prompt") {
                match hud::landing_prompt(&self.state) {
                    Some(text) if self.snapshot.has(flags::LANDING_AVAILABLE) => {
                        el.set_text_content(Some(&text));
                        let _ = el.set_attribute("class", "");
                    }
                    _ => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("controls-hint") {
                let class = if self.snapshot.has(flags::CONTROLS_HINT) { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.query_selector("#hud-speed .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.1}", self.snapshot.speed.abs())));
            }

            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }

            if let Some(el) = document.get_element_by_id("boost-toggle") {
                let class = if self.snapshot.has(flags::BOOST) { "active" } else { "" };
                let _ = el.set_attribute("class", class);
            }
        }

        fn update_island_panel(&self, island: Option<&str>) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(panel) = document.get_element_by_id("island-panel") else {
                return;
            };

            let Some(island) = island.and_then(|id| self.state.world.island(id).ok()) else {
                let _ = panel.set_attribute("class", "hidden");
                return;
            };
            let _ = panel.set_attribute("class", "");
            if let Some(el) = document.get_element_by_id("island-title") {
                el.set_text_content(Some(&island.panel.title));
            }
            if let Some(el) = document.get_element_by_id("island-description") {
                el.set_text_content(Some(&island.panel.description));
            }
            if let Some(el) = document.get_element_by_id("undock-hint") {
                el.set_text_content(Some(hud::UNDOCK_HINT));
            }
            if let Some(list) = document.get_element_by_id("entity-list") {
                list.set_inner_html("");
                for entity in &island.entities {
                    if let Ok(button) = document.create_element("button") {
                        let _ = button.set_attribute("data-entity", &entity.id);
                        button.set_text_content(Some(&entity.label));
                        let _ = list.append_child(&button);
                    }
                }
            }
            self.update_entity_panel(None);
        }

        fn update_entity_panel(&self, entity: Option<&str>) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(panel) = document.get_element_by_id("entity-panel") else {
                return;
            };
            let selected = entity.and_then(|id| self.state.entities.as_ref()?.entity(id));
            match selected {
                Some(entity) => {
                    let _ = panel.set_attribute("class", "");
                    let links = entity
                        .links
                        .iter()
                        .map(|l| format!("{} ({})", l.label, l.href))
                        .collect::<Vec<_>>()
                        .join(" · ");
                    panel.set_text_content(Some(&format!("{} - {}", entity.label, links)));
                }
                None => {
                    let _ = panel.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Isle Voyage starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let world = match WorldConfig::builtin() {
            Ok(world) => world,
            Err(err) => {
                log::error!("Failed to load world: {}", err);
                return;
            }
        };
        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(world, settings)));

        setup_input_handlers(&canvas, game.clone());
        setup_entity_list(game.clone());
        setup_boost_toggle(game.clone());
        setup_auto_release(game.clone());

        if let Some(el) = document.get_element_by_id("walk-hint") {
            el.set_text_content(Some(hud::WALK_HINT));
        }
        if let Some(hud_el) = document.get_element_by_id("hud") {
            let _ = hud_el.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Isle Voyage running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(command) = Command::from_key_down(&event.code(), event.repeat()) {
                    if event.code() == "Space" || event.code().starts_with("Arrow") {
                        event.prevent_default();
                    }
                    game.borrow_mut().queue.push(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(command) = Command::from_key_up(&event.code()) {
                    game.borrow_mut().queue.push(command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer drag orbits the chase camera
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                game.borrow_mut().queue.push(Command::PointerDown {
                    pointer_id: event.pointer_id(),
                    button: event.button(),
                    pos: Vec2::new(event.client_x() as f32, event.client_y() as f32),
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut().queue.push(Command::PointerMove {
                    pointer_id: event.pointer_id(),
                    pos: Vec2::new(event.client_x() as f32, event.client_y() as f32),
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.release_pointer_capture(event.pointer_id());
                game.borrow_mut().queue.push(Command::PointerUp {
                    pointer_id: event.pointer_id(),
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut().queue.push(Command::PointerCancel {
                    pointer_id: Some(event.pointer_id()),
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().queue.push(Command::PointerLeave);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Clicking open water while docked drops the selection
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !g.state.is_sailing() {
                    g.queue.push(Command::PointerMissed);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_entity_list(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(list) = document.get_element_by_id("entity-list") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.get_attribute("data-entity"));
            if let Some(id) = id {
                game.borrow_mut().queue.push(Command::SelectEntity(id));
            }
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_boost_toggle(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(btn) = document.get_element_by_id("boost-toggle") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            g.settings.boost = !g.settings.boost;
            g.settings.save();
            g.queue.push(Command::ToggleBoost);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Release held keys and drags when the page loses focus
    fn setup_auto_release(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().queue.push(Command::Blur);
                    log::info!("Controls released (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().queue.push(Command::Blur);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                DEFAULT_FRAME_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Isle Voyage (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve` for the web version");

    match headless_voyage() {
        Ok(()) => log::info!("Voyage complete"),
        Err(err) => {
            log::error!("Voyage failed: {}", err);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Sail from spawn to the first island in range, walk around, and sail off
#[cfg(not(target_arch = "wasm32"))]
fn headless_voyage() -> Result<(), isle_voyage::WorldError> {
    use isle_voyage::consts::DEFAULT_FRAME_DT;
    use isle_voyage::sim::{Action, Command, InputQueue, SessionEvent, SessionState, tick};
    use isle_voyage::snapshot::FrameSnapshot;
    use isle_voyage::{Settings, WorldConfig};

    const MAX_VOYAGE_SECS: f32 = 120.0;
    const SHORE_LEAVE_SECS: f32 = 3.0;

    let world = WorldConfig::builtin()?;
    let mut state = SessionState::new(world);
    Settings::load().apply(&mut state);
    let mut queue = InputQueue::new();

    queue.push(Command::Press(Action::Forward));
    let mut docked_at: Option<f32> = None;
    let mut last_report = 0.0;

    while state.elapsed < MAX_VOYAGE_SECS {
        for event in tick(&mut state, &mut queue, DEFAULT_FRAME_DT) {
            match event {
                SessionEvent::Telemetry(t) if state.elapsed - last_report >= 5.0 => {
                    last_report = state.elapsed;
                    log::info!(
                        "t={:.1}s x={:.1} z={:.1} heading={:.2} speed={:.2}",
                        state.elapsed,
                        t.x,
                        t.z,
                        t.heading,
                        state.boat.speed
                    );
                }
                SessionEvent::ModeChanged { island } => {
                    log::info!("Mode changed: {:?}", island);
                }
                SessionEvent::Collision => log::debug!("Bumped a shoreline"),
                _ => {}
            }
        }

        match docked_at {
            None if state.is_sailing() && state.mode.landing.is_some() => {
                queue.push(Command::Release(Action::Forward));
                queue.push(Command::Dock);
                queue.push(Command::Press(Action::Right));
                docked_at = Some(state.elapsed);
            }
            Some(t) if !state.is_sailing() && state.elapsed - t >= SHORE_LEAVE_SECS => {
                let snapshot = FrameSnapshot::capture(&state);
                log::info!(
                    "Avatar at ({:.1}, {:.1}, {:.1}) among {} entities",
                    snapshot.avatar[0],
                    snapshot.avatar[1],
                    snapshot.avatar[2],
                    snapshot.entity_count
                );
                queue.push(Command::Release(Action::Right));
                queue.push(Command::Undock);
                queue.push(Command::Press(Action::Backward));
            }
            Some(t) if state.is_sailing() && state.elapsed - t >= SHORE_LEAVE_SECS + 2.0 => break,
            _ => {}
        }
    }

    let t = state.telemetry();
    log::info!("Final position x={:.1} z={:.1} heading={:.2}", t.x, t.z, t.heading);
    Ok(())
}
