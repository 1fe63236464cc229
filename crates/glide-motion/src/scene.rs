//! Per-screen registry of shared elements.
//!
//! A [`Scene`] maps identifiers to the shared element nodes mounted inside
//! one screen. It is created with the screen and dropped with it. Taking a
//! [`SceneSnapshot`] reads every node's geometry and computed style right
//! away; the snapshot keeps only weak references to the nodes, so a node that
//! unmounts before the compositor runs shows up as a missing endpoint instead
//! of being kept alive by the transition.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{Animatable, EasingFunction};
use crate::error::{GlideError, Result};

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// This rectangle expressed relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect { x: self.x - origin.x, y: self.y - origin.y, ..*self }
    }
}

/// Computed style snapshot: property name to serialized value.
pub type StyleMap = BTreeMap<String, String>;

/// How a matched pair is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionStyle {
    /// Only the start clone is shown and moved to the end position.
    #[default]
    Morph,
    /// The start clone fades out over the end clone.
    Fade,
    /// Both clones pass through transparent at the midpoint.
    FadeThrough,
    /// The start clone fades out while the end clone fades in.
    CrossFade,
}

/// Timing override for one axis of a shared element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
}

/// Resolved per-axis timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTiming {
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: EasingFunction,
}

/// Transition options attached to a shared element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SharedElementConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
    #[serde(default)]
    pub x: AxisConfig,
    #[serde(default)]
    pub y: AxisConfig,
}

impl SharedElementConfig {
    pub fn with_transition(style: TransitionStyle) -> Self {
        Self { transition: Some(style), ..Self::default() }
    }

    fn axis_timing(&self, axis: &AxisConfig, fallback_duration_ms: f64) -> AxisTiming {
        AxisTiming {
            duration_ms: axis.duration_ms.or(self.duration_ms).unwrap_or(fallback_duration_ms),
            delay_ms: axis.delay_ms.or(self.delay_ms).unwrap_or(0.0),
            easing: axis.easing.or(self.easing).unwrap_or(EasingFunction::Ease),
        }
    }

    /// Horizontal timing: axis value, then element value, then the engine
    /// duration and `ease`.
    pub fn x_timing(&self, fallback_duration_ms: f64) -> AxisTiming {
        self.axis_timing(&self.x, fallback_duration_ms)
    }

    pub fn y_timing(&self, fallback_duration_ms: f64) -> AxisTiming {
        self.axis_timing(&self.y, fallback_duration_ms)
    }
}

/// A live shared element node supplied by the host.
pub trait ElementNode: Animatable {
    fn client_rect(&self) -> Rect;
    fn computed_style(&self) -> StyleMap;
    fn set_hidden(&self, hidden: bool);
    fn is_hidden(&self) -> bool;
    /// Whether the node is still attached to the render tree.
    fn is_connected(&self) -> bool {
        true
    }
}

pub type ElementRef = Rc<dyn ElementNode>;

/// A registered shared element.
#[derive(Clone)]
pub struct SharedElement {
    pub id: String,
    pub node: ElementRef,
    pub config: SharedElementConfig,
}

impl fmt::Debug for SharedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedElement")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shared elements of one screen, in registration order.
#[derive(Debug, Default)]
pub struct Scene {
    owner: String,
    elements: HashMap<String, SharedElement>,
    order: Vec<String>,
}

impl Scene {
    pub fn new(owner: impl Into<String>) -> Self {
        Self { owner: owner.into(), ..Self::default() }
    }

    /// Name of the owning screen.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Add a shared element. Fails with [`GlideError::DuplicateId`] if the id
    /// is already registered; the existing element is left untouched.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        node: ElementRef,
        config: SharedElementConfig,
    ) -> Result<()> {
        let id = id.into();
        if self.elements.contains_key(&id) {
            return Err(GlideError::DuplicateId { scene: self.owner.clone(), id });
        }
        trace!(scene = %self.owner, %id, "register shared element");
        self.order.push(id.clone());
        self.elements.insert(id.clone(), SharedElement { id, node, config });
        Ok(())
    }

    /// Remove a shared element. Absent ids are ignored.
    pub fn unregister(&mut self, id: &str) -> Option<SharedElement> {
        let removed = self.elements.remove(id)?;
        self.order.retain(|existing| existing != id);
        trace!(scene = %self.owner, %id, "unregister shared element");
        Some(removed)
    }

    /// Change an element's id. This is a removal followed by a fresh
    /// registration, so animations bound to the old id never see the new one.
    pub fn rename(&mut self, old_id: &str, new_id: impl Into<String>) -> Result<()> {
        let new_id = new_id.into();
        if old_id == new_id {
            return Ok(());
        }
        if self.elements.contains_key(&new_id) {
            return Err(GlideError::DuplicateId { scene: self.owner.clone(), id: new_id });
        }
        if let Some(element) = self.unregister(old_id) {
            debug!(scene = %self.owner, old = old_id, new = %new_id, "shared element re-identified");
            self.register(new_id, element.node, element.config)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SharedElement> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Capture every element's geometry now, relative to `origin` (the owning
    /// screen's rectangle).
    pub fn snapshot(&self, origin: Rect) -> SceneSnapshot {
        let nodes = self
            .order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .map(|element| NodeSnapshot {
                id: element.id.clone(),
                owner: self.owner.clone(),
                node: Rc::downgrade(&element.node),
                rect: element.node.client_rect().relative_to(&origin),
                style: element.node.computed_style(),
                config: element.config,
            })
            .collect();
        SceneSnapshot { owner: self.owner.clone(), origin, nodes }
    }
}

/// One element as captured by [`Scene::snapshot`].
#[derive(Clone)]
pub struct NodeSnapshot {
    pub id: String,
    /// Owning screen, by name.
    pub owner: String,
    pub node: Weak<dyn ElementNode>,
    /// Client rect relative to the scene origin.
    pub rect: Rect,
    pub style: StyleMap,
    pub config: SharedElementConfig,
}

impl NodeSnapshot {
    /// The live node, if it still exists and is attached.
    pub fn live_node(&self) -> Option<ElementRef> {
        self.node.upgrade().filter(|node| node.is_connected())
    }
}

impl fmt::Debug for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSnapshot")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("rect", &self.rect)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Immutable copy of a scene at one instant.
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub owner: String,
    pub origin: Rect,
    pub nodes: Vec<NodeSnapshot>,
}

impl SceneSnapshot {
    pub fn get(&self, id: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
