use proptest::prelude::*;

use glide_motion::animation::{AnimationOptions, KeyframeSet, ResolvedAnimation, SoftwareClock};
use glide_motion::headless::{HeadlessElement, HeadlessSurface};
use glide_motion::timeline::TimelineOptions;
use glide_motion::{Rect, Scene, SharedElementConfig, Timeline, match_scenes};

fn still(duration_ms: f64) -> ResolvedAnimation {
    ResolvedAnimation { keyframes: KeyframeSet::default(), options: AnimationOptions::new(duration_ms) }
}

fn unique_ids(raw: Vec<u8>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for n in raw {
        let id = format!("el-{n}");
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn scene(owner: &str, ids: &[String], clock: &SoftwareClock) -> Scene {
    let mut scene = Scene::new(owner);
    for id in ids {
        scene
            .register(id.clone(), HeadlessElement::new(clock, Rect::default()), SharedElementConfig::default())
            .expect("ids are unique");
    }
    scene
}

proptest! {
    #[test]
    fn paused_seek_is_clamped(progress in -500.0f64..500.0, duration in 1.0f64..2000.0) {
        let clock = SoftwareClock::new();
        let exit = HeadlessSurface::new(&clock, Rect::default());
        let enter = HeadlessSurface::new(&clock, Rect::default());
        let mut timeline = Timeline::new();
        timeline.start(&*exit, &still(duration), &*enter, &still(duration), TimelineOptions::gesture(duration));

        prop_assert!(timeline.set_progress(progress));
        prop_assert_eq!(timeline.progress(), progress.clamp(0.0, 100.0));
    }

    #[test]
    fn matched_ids_are_the_ordered_intersection(
        outgoing in prop::collection::vec(0u8..12, 0..10),
        incoming in prop::collection::vec(0u8..12, 0..10),
    ) {
        let clock = SoftwareClock::new();
        let outgoing = unique_ids(outgoing);
        let incoming = unique_ids(incoming);
        let a = scene("a", &outgoing, &clock);
        let b = scene("b", &incoming, &clock);

        let pairs = match_scenes(&a.snapshot(Rect::default()), &b.snapshot(Rect::default()));
        let matched: Vec<&str> = pairs.iter().map(|p| p.id.as_str()).collect();
        let expected: Vec<&str> =
            outgoing.iter().filter(|id| incoming.contains(id)).map(String::as_str).collect();
        prop_assert_eq!(matched, expected);
    }
}
