//! Headless walkthrough of the transition engine.
//!
//! Drives a two-screen app through a forward navigation with a shared
//! element, a back-swipe that commits, a swipe that reverts and a
//! programmatic back navigation, logging every lifecycle event.
//!
//! Logging follows `RUST_LOG`, or `diagnostics.log_filter` / `GLIDE_LOG`
//! from the configuration.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Result;
use glide_config::GlideConfig;
use glide_motion::animation::{AnimationConfig, AnimationKind, AnimationPair, SoftwareClock, TRANSLATE_X};
use glide_motion::headless::{HeadlessElement, HeadlessOverlay, HeadlessSurface};
use glide_motion::{
    GestureRecognizer, GhostCompositor, NavigationEngine, Rect, Screen, ScreenConfig,
    SharedElementConfig, SwipeEnd, SwipeMove, SwipeStart, Timeline,
};
use tracing::info;

const FRAME_MS: f64 = 16.0;
const VIEWPORT: Rect = Rect::new(0.0, 0.0, 390.0, 844.0);

fn init_logging(config: &GlideConfig) {
    let filter = config.diagnostics.log_filter.as_deref().unwrap_or("info");
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Pump frames until the engine is idle again.
fn run_frames(engine: &mut NavigationEngine, clock: &SoftwareClock) -> usize {
    let mut frames = 0;
    while engine.is_transitioning() || engine.ghost().is_active() {
        clock.advance(FRAME_MS);
        engine.on_frame();
        frames += 1;
        if frames > 1_000 {
            break;
        }
    }
    frames
}

fn main() -> Result<()> {
    let config = GlideConfig::load();
    init_logging(&config);

    let clock = SoftwareClock::new();
    let overlay = HeadlessOverlay::new(&clock);
    let engine_config = config.engine_config();
    let mut engine = NavigationEngine::new(
        Timeline::new(),
        GhostCompositor::new(overlay.clone()),
        GestureRecognizer::new(engine_config.gesture),
        engine_config,
    );

    let home_surface = HeadlessSurface::new(&clock, VIEWPORT);
    let details_surface = HeadlessSurface::new(&clock, VIEWPORT);
    let slide = AnimationPair::symmetric(AnimationConfig::new(AnimationKind::Slide));
    let home = Screen::new("home", home_surface, ScreenConfig::new("/").keep_alive(true).animation(slide.clone()));
    let details = Screen::new("details", details_surface.clone(), ScreenConfig::new("/details").animation(slide));
    engine.register_screen(Rc::clone(&home))?;
    engine.register_screen(Rc::clone(&details))?;

    let _events = engine.subscribe(|event| info!(event = event.name(), progress = ?event.progress(), "event"));

    engine.start("/")?;
    let thumbnail = HeadlessElement::new(&clock, Rect::new(16.0, 120.0, 80.0, 80.0));
    home.register_element("hero", thumbnail, SharedElementConfig::default())?;

    info!("navigate to /details");
    engine.navigate("/details", BTreeMap::from([("id".to_string(), "42".to_string())]))?;
    let banner = HeadlessElement::new(&clock, Rect::new(0.0, 0.0, 390.0, 260.0));
    details.register_element("hero", banner, SharedElementConfig::default())?;
    engine.on_frame();
    info!(clones = overlay.clones().len(), "shared element clones in the overlay");
    let frames = run_frames(&mut engine, &clock);
    info!(frames, route = ?engine.current_route(), "forward navigation done");

    info!("back swipe, released past the threshold");
    let start = SwipeStart::new(8.0, 400.0, engine.recognizer().config().swipe_direction, VIEWPORT);
    if engine.swipe_start(&start) {
        engine.on_frame();
        for x in [60.0, 140.0, 240.0] {
            engine.swipe_move(&SwipeMove { x, y: 400.0 });
            engine.on_frame();
        }
        let release = engine.swipe_end(&SwipeEnd { x: 240.0, y: 400.0, velocity: 120.0 });
        info!(?release, "released");
        let frames = run_frames(&mut engine, &clock);
        info!(frames, route = ?engine.current_route(), "back swipe done");
    }

    info!("navigate again, then swipe a little and let go");
    engine.navigate("/details", BTreeMap::new())?;
    run_frames(&mut engine, &clock);
    if engine.swipe_start(&start) {
        engine.swipe_move(&SwipeMove { x: 40.0, y: 400.0 });
        let release = engine.swipe_end(&SwipeEnd { x: 40.0, y: 400.0, velocity: 0.0 });
        info!(?release, "released");
        run_frames(&mut engine, &clock);
        info!(route = ?engine.current_route(), "swipe reverted");
    }

    info!("programmatic back navigation");
    engine.go_back()?;
    run_frames(&mut engine, &clock);
    info!(
        route = ?engine.current_route(),
        details_x = ?details_surface.rendered().borrow().number(TRANSLATE_X),
        "back navigation done"
    );
    Ok(())
}
