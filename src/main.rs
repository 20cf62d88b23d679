//! Breath Bubbles entry point
//!
//! Handles platform-specific initialization. The browser build wires the
//! canvas, DOM and Web Audio to a [`SessionDriver`] and the companion
//! activities; the native build runs a headless session on a virtual clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use breath_bubbles::audio::WebAudio;
    use breath_bubbles::consts::*;
    use breath_bubbles::driver::Hud;
    use breath_bubbles::platform::{BrowserScheduler, CanvasPointer, IntervalTimer, TimerHandle};
    use breath_bubbles::renderer::CanvasSurface;
    use breath_bubbles::sim::{Exercise, MemoryGame, SeededRandom, SessionState, format_time};
    use breath_bubbles::{
        GuideDriver, HighScores, MemoryDriver, MindfulnessDriver, Result, SessionConfig,
        SessionDriver, Settings,
    };

    /// HUD refresh period
    const HUD_MS: u32 = 100;
    /// Pairs on the memory board
    const MEMORY_PAIRS: usize = 8;

    /// App instance shared by the DOM handlers
    struct App {
        driver: SessionDriver,
        scheduler: BrowserScheduler,
        audio_ctx: WebAudio,
        guide: GuideDriver,
        mindfulness: MindfulnessDriver,
        memory: MemoryDriver,
        /// Keeps the HUD refresh alive for the page lifetime
        #[allow(dead_code)]
        hud_timer: Option<TimerHandle>,
    }

    impl App {
        fn start(&mut self) {
            self.audio_ctx.resume();
            if let Err(e) = self.driver.start(&mut self.scheduler) {
                log::error!("Failed to start session: {}", e);
            }
        }

        fn toggle_pause(&mut self) {
            match self.driver.hud().session {
                SessionState::Active => self.driver.pause(),
                SessionState::Paused => self.driver.resume(),
                _ => {}
            }
        }

        fn toggle_guide(&mut self) {
            if let Err(e) = self.guide.toggle(&mut self.scheduler) {
                log::error!("Failed to toggle breathing guide: {}", e);
            }
        }

        fn toggle_mindfulness(&mut self) {
            self.audio_ctx.resume();
            if let Err(e) = self.mindfulness.toggle(&mut self.scheduler) {
                log::error!("Failed to toggle mindfulness timer: {}", e);
            }
        }

        fn reset_mindfulness(&mut self) {
            self.mindfulness.reset();
        }

        fn new_memory_game(&mut self) {
            self.audio_ctx.resume();
            self.memory.deal(MEMORY_PAIRS);
        }

        fn pick_card(&mut self, index: usize) {
            if let Err(e) = self.memory.pick(index, &mut self.scheduler) {
                log::error!("Failed to schedule card flip-back: {}", e);
            }
        }
    }

    fn default_exercise() -> Exercise {
        Exercise {
            title: "Breath Awareness".to_string(),
            minutes: 5,
            instructions: vec![
                "Sit comfortably and close your eyes".into(),
                "Notice the air moving in and out".into(),
                "When your mind wanders, return to the breath".into(),
                "Let each exhale soften your shoulders".into(),
            ],
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Memory cards as buttons carrying their index
    fn render_memory(document: &web_sys::Document, game: &MemoryGame) {
        let Some(board) = document.get_element_by_id("memory-board") else {
            return;
        };
        let html: String = game
            .cards()
            .iter()
            .enumerate()
            .map(|(i, card)| {
                let (class, label) = match (card.matched, card.is_face_up()) {
                    (true, _) => ("card matched", card.symbol()),
                    (false, true) => ("card flipped", card.symbol()),
                    (false, false) => ("card", "?"),
                };
                format!(r#"<button class="{}" data-index="{}">{}</button>"#, class, i, label)
            })
            .collect();
        board.set_inner_html(&html);
        set_text(document, "memory-turns", &game.turns().to_string());
        set_hidden(document, "memory-complete", !game.is_complete());
    }

    /// Update activity panels in DOM
    fn update_activities(app: &App) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        app.mindfulness.with_timer(|timer| {
            set_text(&document, "mindfulness-time", &format_time(timer.remaining()));
            set_text(
                &document,
                "mindfulness-instruction",
                timer.current_instruction().unwrap_or(""),
            );
            set_text(
                &document,
                "mindfulness-button",
                match (timer.is_running(), timer.has_started()) {
                    (true, _) => "Pause",
                    (false, true) => "Resume",
                    (false, false) => "Begin",
                },
            );
        });
        set_text(
            &document,
            "guide-button",
            if app.guide.is_active() { "Stop" } else { "Start Guide" },
        );
        app.memory.with_game(|game| render_memory(&document, game));
    }

    /// Update HUD elements in DOM
    fn update_hud(hud: &Hud, best: Option<u64>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        set_text(&document, "hud-score", &hud.score.to_string());
        set_text(&document, "hud-time", &format_time(hud.time_remaining));
        set_text(&document, "hud-phase", hud.phase.prompt());
        if let Some(best) = best {
            set_text(&document, "hud-best", &best.to_string());
        }

        set_hidden(&document, "pause-menu", hud.session != SessionState::Paused);
        set_hidden(&document, "game-over", hud.session != SessionState::Ended);
        if hud.session == SessionState::Ended {
            set_text(&document, "final-score", &hud.score.to_string());
        }
        set_text(
            &document,
            "start-button",
            match hud.session {
                SessionState::Idle => "Start",
                _ => "Restart",
            },
        );
    }

    pub fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Breath Bubbles starting...");

        let window = web_sys::window()
            .ok_or_else(|| breath_bubbles::Error::Platform("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| breath_bubbles::Error::Platform("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| breath_bubbles::Error::Platform("no canvas element".into()))?;

        // Drawing happens in CSS pixels; fall back to the default size when unstyled
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        if client_w > 0 && client_h > 0 {
            canvas.set_width(client_w as u32);
            canvas.set_height(client_h as u32);
        } else {
            canvas.set_width(SURFACE_WIDTH as u32);
            canvas.set_height(SURFACE_HEIGHT as u32);
        }

        let settings = Settings::load();
        let highscores = HighScores::load();
        let config = settings.session_config(SessionConfig::default());
        config.validate()?;

        let seed = js_sys::Date::now() as u64;
        let audio_ctx = WebAudio::new();
        let guide = guide_driver(&document)?;
        let mindfulness = MindfulnessDriver::new(default_exercise(), Box::new(audio_ctx.clone()));
        let memory = MemoryDriver::new(
            Box::new(SeededRandom::new(seed.wrapping_add(1))),
            Box::new(audio_ctx.clone()),
        );
        let mut driver = SessionDriver::new(
            config,
            Box::new(SeededRandom::new(seed)),
            Box::new(audio_ctx.clone()),
            settings,
            highscores,
        )
        .with_wall_clock(js_sys::Date::now);
        driver.attach_surface(Box::new(CanvasSurface::new(&canvas)?));
        driver.connect_pointer(&mut CanvasPointer::new(&canvas))?;
        driver.redraw(0.0);
        log::info!("Session ready with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            driver,
            scheduler: BrowserScheduler::new()?,
            audio_ctx,
            guide,
            mindfulness,
            memory,
            hud_timer: None,
        }));

        setup_buttons(app.clone());
        setup_memory_board(app.clone());
        setup_resize(app.clone(), canvas);
        setup_auto_pause(app.clone());
        setup_hud(app.clone())?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        log::info!("Breath Bubbles running!");
        Ok(())
    }

    /// Guide drawn on its own canvas when the page has one
    fn guide_driver(document: &web_sys::Document) -> Result<GuideDriver> {
        let mut guide = GuideDriver::new();
        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("guide-canvas")
            .and_then(|el| el.dyn_into().ok());
        if let Some(canvas) = canvas {
            guide.attach_surface(Box::new(CanvasSurface::new(&canvas)?));
        }
        Ok(guide)
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let bind = |id: &str, action: fn(&mut App)| {
            let Some(button) = document.get_element_by_id(id) else {
                return;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                action(&mut app.borrow_mut());
            });
            let _ =
                button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        };

        bind("start-button", App::start);
        bind("play-again-button", App::start);
        bind("pause-button", App::toggle_pause);
        bind("resume-button", App::toggle_pause);
        bind("guide-button", App::toggle_guide);
        bind("mindfulness-button", App::toggle_mindfulness);
        bind("mindfulness-reset", App::reset_mindfulness);
        bind("memory-new-button", App::new_memory_game);

        // Space toggles pause, Enter (re)starts
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            match event.key().as_str() {
                " " | "Escape" => app.borrow_mut().toggle_pause(),
                "Enter" => app.borrow_mut().start(),
                _ => return,
            }
            event.prevent_default();
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Card clicks are delegated to the board
    fn setup_memory_board(app: Rc<RefCell<App>>) {
        let Some(board) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("memory-board"))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let index = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.get_attribute("data-index"))
                .and_then(|i| i.parse::<usize>().ok());
            if let Some(index) = index {
                app.borrow_mut().pick_card(index);
            }
        });
        let _ = board.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Keep the canvas at its CSS size; the session spawns within the new bounds
    fn setup_resize(app: Rc<RefCell<App>>, canvas: HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = (canvas.client_width(), canvas.client_height());
            if w <= 0 || h <= 0 {
                return;
            }
            let mut app = app.borrow_mut();
            app.driver.resize_surface(w as f32, h as f32);
            // Resizing clears the canvas; redraw until the next frame
            app.driver.redraw(js_sys::Date::now());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pause automatically when the tab is hidden or the window loses focus
    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let app = app.borrow();
                    if app.driver.settings().pause_on_blur && app.driver.hud().session.is_active() {
                        app.driver.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let app = app.borrow();
                if app.driver.settings().pause_on_blur && app.driver.hud().session.is_active() {
                    app.driver.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_hud(app: Rc<RefCell<App>>) -> Result<()> {
        let weak = Rc::downgrade(&app);
        let mut scheduler = app.borrow().scheduler.clone();
        let handle = scheduler.set_interval(
            HUD_MS,
            Box::new(move || {
                let Some(app) = weak.upgrade() else {
                    return std::ops::ControlFlow::Break(());
                };
                let app = app.borrow();
                update_hud(&app.driver.hud(), app.driver.highscores().top_score());
                update_activities(&app);
                std::ops::ControlFlow::Continue(())
            }),
        )?;
        app.borrow_mut().hud_timer = Some(handle);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_app::run() {
        log::error!("Breath Bubbles failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Breath Bubbles (native) starting...");
    log::info!("Native mode runs one headless session - use `trunk serve` for the web version");

    if let Err(e) = headless::run() {
        log::error!("Headless session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// A full session on a virtual clock with a scripted player who taps the
/// oldest bubble twice a second, followed by a short run of each companion
/// activity.
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use breath_bubbles::audio::RecordingAudio;
    use breath_bubbles::consts::*;
    use breath_bubbles::platform::{VirtualClock, VirtualPointer};
    use breath_bubbles::renderer::RecordingSurface;
    use breath_bubbles::sim::{Exercise, FLIP_BACK_MS, SeededRandom, SessionState, format_time};
    use breath_bubbles::{
        GuideDriver, HighScores, MemoryDriver, MindfulnessDriver, Result, SessionConfig,
        SessionDriver, Settings,
    };

    const TAP_MS: u64 = 500;
    const MEMORY_PAIRS: usize = 8;

    fn unix_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<()> {
        let seed = std::env::var("BREATH_BUBBLES_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(42);
        let config = match std::env::var("BREATH_BUBBLES_CONFIG") {
            Ok(json) => SessionConfig::from_json(&json)?,
            Err(_) => SessionConfig::default(),
        };
        config.validate()?;

        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut driver = SessionDriver::new(
            config,
            Box::new(SeededRandom::new(seed)),
            Box::new(audio),
            Settings::load(),
            HighScores::load(),
        )
        .with_wall_clock(unix_ms);
        driver.attach_surface(Box::new(RecordingSurface::new(
            SURFACE_WIDTH,
            SURFACE_HEIGHT,
        )));

        let mut pointer = VirtualPointer::new();
        driver.connect_pointer(&mut pointer)?;

        let mut clock = VirtualClock::new();
        driver.start(&mut clock)?;
        log::info!("Headless session started with seed {}", seed);

        while driver.hud().session != SessionState::Ended {
            clock.advance(TAP_MS);
            let oldest = driver.with_state(|s| s.field.bubbles().first().map(|b| b.pos));
            if let Some(pos) = oldest {
                pointer.press(pos.x, pos.y);
            }
        }

        let hud = driver.hud();
        log::info!(
            "Session over after {} ms: score {}, {} bubbles left, {} cues played",
            clock.now_ms(),
            hud.score,
            hud.bubbles,
            cues.borrow().len()
        );
        if let Some(result) = driver.last_result() {
            match result.rank {
                Some(rank) => log::info!("Leaderboard rank #{}", rank),
                None => log::info!("Score did not place"),
            }
        }

        run_activities(&mut clock, seed)
    }

    fn run_activities(clock: &mut VirtualClock, seed: u64) -> Result<()> {
        let mut guide = GuideDriver::new();
        guide.attach_surface(Box::new(RecordingSurface::new(400.0, 400.0)));
        guide.toggle(clock)?;
        clock.advance(12_000);
        log::info!("Breathing guide at {:?} after one cycle", guide.guide().phase());
        guide.toggle(clock)?;

        let exercise = Exercise {
            title: "Breath Awareness".to_string(),
            minutes: 1,
            instructions: vec!["Notice the breath".into(), "Let thoughts pass".into()],
        };
        let mut mindfulness = MindfulnessDriver::new(exercise, Box::new(RecordingAudio::new()));
        mindfulness.toggle(clock)?;
        clock.advance(60_000);
        log::info!(
            "Mindfulness timer at {}",
            mindfulness.with_timer(|t| format_time(t.remaining()))
        );

        // A player who guesses left to right and remembers every card seen
        let mut memory = MemoryDriver::new(
            Box::new(SeededRandom::new(seed.wrapping_add(1))),
            Box::new(RecordingAudio::new()),
        );
        memory.deal(MEMORY_PAIRS);
        let mut seen: Vec<Option<usize>> = vec![None; 2 * MEMORY_PAIRS];
        while !memory.with_game(|g| g.is_complete()) {
            let hidden: Vec<usize> = memory.with_game(|g| {
                g.cards()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_face_up())
                    .map(|(i, _)| i)
                    .collect()
            });
            let Some(&first) = hidden.first() else {
                break;
            };
            memory.pick(first, clock)?;
            let face = memory.with_game(|g| g.cards()[first].face);
            seen[first] = Some(face);
            let partner = hidden[1..]
                .iter()
                .copied()
                .find(|&i| seen[i] == Some(face))
                .or_else(|| hidden[1..].iter().copied().find(|&i| seen[i].is_none()));
            if let Some(second) = partner {
                memory.pick(second, clock)?;
                seen[second] = memory.with_game(|g| Some(g.cards()[second].face));
            }
            clock.advance(FLIP_BACK_MS as u64);
        }
        log::info!(
            "Memory board cleared in {} turns",
            memory.with_game(|g| g.turns())
        );
        Ok(())
    }
}
