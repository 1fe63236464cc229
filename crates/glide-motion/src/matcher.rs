//! Matching shared elements across the outgoing and incoming scene.

use tracing::debug;

use crate::scene::{NodeSnapshot, SceneSnapshot, TransitionStyle};

/// Two snapshots of the same shared element, one per screen.
#[derive(Debug, Clone)]
pub struct TransitionPair {
    pub id: String,
    pub start: NodeSnapshot,
    pub end: NodeSnapshot,
    pub style: TransitionStyle,
}

/// Pair up every id present in both snapshots, in the outgoing scene's
/// order. Ids present on one side only are left to animate with their
/// screen. An empty result is a valid transition without shared elements.
pub fn match_scenes(outgoing: &SceneSnapshot, incoming: &SceneSnapshot) -> Vec<TransitionPair> {
    if outgoing.is_empty() || incoming.is_empty() {
        return Vec::new();
    }

    let pairs: Vec<TransitionPair> = outgoing
        .nodes
        .iter()
        .filter_map(|start| {
            let end = incoming.get(&start.id)?;
            Some(TransitionPair {
                id: start.id.clone(),
                start: start.clone(),
                end: end.clone(),
                style: resolve_style(start, end),
            })
        })
        .collect();

    debug!(
        from = %outgoing.owner,
        to = %incoming.owner,
        pairs = pairs.len(),
        "matched shared elements"
    );
    pairs
}

/// End node config wins over start node config; `morph` otherwise.
fn resolve_style(start: &NodeSnapshot, end: &NodeSnapshot) -> TransitionStyle {
    end.config.transition.or(start.config.transition).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SoftwareClock;
    use crate::headless::HeadlessElement;
    use crate::scene::{Rect, Scene, SharedElementConfig};

    fn scene(owner: &str, ids: &[(&str, Option<TransitionStyle>)]) -> Scene {
        let clock = SoftwareClock::new();
        let mut scene = Scene::new(owner);
        for (id, style) in ids {
            let config = SharedElementConfig { transition: *style, ..Default::default() };
            scene.register(*id, HeadlessElement::new(&clock, Rect::default()), config).unwrap();
        }
        scene
    }

    #[test]
    fn test_pairs_are_the_intersection_in_outgoing_order() {
        let a = scene("a", &[("x", None), ("y", None), ("z", None)]);
        let b = scene("b", &[("z", None), ("w", None), ("x", None)]);
        let pairs = match_scenes(&a.snapshot(Rect::default()), &b.snapshot(Rect::default()));
        let ids: Vec<&str> = pairs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "z"]);
        assert!(pairs.iter().all(|p| p.start.owner == "a" && p.end.owner == "b"));
    }

    #[test]
    fn test_empty_scene_yields_no_pairs() {
        let a = scene("a", &[("x", None)]);
        let b = scene("b", &[]);
        assert!(match_scenes(&a.snapshot(Rect::default()), &b.snapshot(Rect::default())).is_empty());
        assert!(match_scenes(&b.snapshot(Rect::default()), &a.snapshot(Rect::default())).is_empty());
    }

    #[test]
    fn test_style_resolution() {
        let a = scene(
            "a",
            &[("both", Some(TransitionStyle::Fade)), ("start", Some(TransitionStyle::CrossFade)), ("none", None)],
        );
        let b = scene(
            "b",
            &[("both", Some(TransitionStyle::FadeThrough)), ("start", None), ("none", None)],
        );
        let pairs = match_scenes(&a.snapshot(Rect::default()), &b.snapshot(Rect::default()));
        assert_eq!(pairs[0].style, TransitionStyle::FadeThrough);
        assert_eq!(pairs[1].style, TransitionStyle::CrossFade);
        assert_eq!(pairs[2].style, TransitionStyle::Morph);
    }
}
