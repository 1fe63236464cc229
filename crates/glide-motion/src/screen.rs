//! Screen handles.
//!
//! A [`Screen`] pairs the host surface of a screen with its [`Scene`] of
//! shared elements and its animation settings. Handles are shared as
//! [`ScreenHandle`] (`Rc<Screen>`) between the navigator, the compositor's
//! scene sources and the host; the scene itself is only reachable through
//! its screen.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{Animatable, AnimationOptions, AnimationPair, BoxedAnimation, KeyframeSet};
use crate::error::Result;
use crate::ghost::SceneSource;
use crate::gesture::GestureOverrides;
use crate::scene::{ElementRef, Rect, Scene, SceneSnapshot, SharedElementConfig};

/// Host side of a screen: the node whole-screen animations run against.
pub trait ScreenSurface: Animatable {
    /// Attach the screen's content to the render tree.
    fn mount(&self);
    /// Detach the screen's content.
    fn unmount(&self);
    fn is_mounted(&self) -> bool;
    /// Hide a mounted screen without detaching it.
    fn set_hidden(&self, hidden: bool);
    fn set_interactive(&self, interactive: bool);
    fn client_rect(&self) -> Rect;
}

/// Routes a factory is resolved against. `current` is the screen being left
/// and `next` the one being shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteContext {
    pub current: Option<String>,
    pub next: Option<String>,
    pub gesture_navigating: bool,
}

type AnimationFactory = dyn Fn(&RouteContext) -> AnimationPair;

/// Where a screen gets its enter/exit animations from.
#[derive(Clone)]
pub enum AnimationSource {
    Static(AnimationPair),
    /// Resolved from the routes involved in each transition.
    Factory(Rc<AnimationFactory>),
}

impl AnimationSource {
    pub fn factory(f: impl Fn(&RouteContext) -> AnimationPair + 'static) -> Self {
        Self::Factory(Rc::new(f))
    }

    pub fn resolve(&self, ctx: &RouteContext) -> AnimationPair {
        match self {
            Self::Static(pair) => pair.clone(),
            Self::Factory(factory) => factory(ctx),
        }
    }
}

impl Default for AnimationSource {
    fn default() -> Self {
        Self::Static(AnimationPair::default())
    }
}

impl From<AnimationPair> for AnimationSource {
    fn from(pair: AnimationPair) -> Self {
        Self::Static(pair)
    }
}

impl fmt::Debug for AnimationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(pair) => f.debug_tuple("Static").field(pair).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Static configuration of a screen.
#[derive(Debug, Clone, Default)]
pub struct ScreenConfig {
    /// Route this screen answers to; `None` makes it the fallback screen.
    pub path: Option<String>,
    pub keep_alive: bool,
    /// `None` uses the engine's default animations.
    pub animation: Option<AnimationSource>,
    pub gesture: GestureOverrides,
}

impl ScreenConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: Some(path.into()), ..Self::default() }
    }

    /// A screen shown for routes no other screen matches.
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn animation(mut self, animation: impl Into<AnimationSource>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    pub fn gesture(mut self, gesture: GestureOverrides) -> Self {
        self.gesture = gesture;
        self
    }
}

/// A mounted or mountable screen.
pub struct Screen {
    name: String,
    path: Option<String>,
    surface: Rc<dyn ScreenSurface>,
    scene: RefCell<Scene>,
    animation: Option<AnimationSource>,
    gesture: GestureOverrides,
    keep_alive: Cell<bool>,
    entering: Cell<bool>,
    exiting: Cell<bool>,
}

pub type ScreenHandle = Rc<Screen>;

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("keep_alive", &self.keep_alive.get())
            .field("entering", &self.entering.get())
            .field("exiting", &self.exiting.get())
            .field("shared_elements", &self.scene.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Screen {
    pub fn new(name: impl Into<String>, surface: Rc<dyn ScreenSurface>, config: ScreenConfig) -> ScreenHandle {
        let name = name.into();
        Rc::new(Self {
            scene: RefCell::new(Scene::new(name.clone())),
            name,
            path: config.path,
            surface,
            animation: config.animation,
            gesture: config.gesture,
            keep_alive: Cell::new(config.keep_alive),
            entering: Cell::new(false),
            exiting: Cell::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn surface(&self) -> &Rc<dyn ScreenSurface> {
        &self.surface
    }

    pub fn gesture_overrides(&self) -> &GestureOverrides {
        &self.gesture
    }

    /// Whether this screen answers `route`.
    pub fn matches(&self, route: &str) -> bool {
        self.path.as_deref() == Some(route)
    }

    pub fn is_fallback(&self) -> bool {
        self.path.is_none()
    }

    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive.get()
    }

    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.keep_alive.set(keep_alive);
    }

    pub fn is_entering(&self) -> bool {
        self.entering.get()
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.get()
    }

    pub(crate) fn set_transition_role(&self, entering: bool, exiting: bool) {
        self.entering.set(entering);
        self.exiting.set(exiting);
    }

    /// This screen's own animations, if it configures any.
    pub fn animations(&self, ctx: &RouteContext) -> Option<AnimationPair> {
        self.animation.as_ref().map(|source| source.resolve(ctx))
    }

    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, Scene> {
        self.scene.borrow_mut()
    }

    /// Register a shared element inside this screen.
    pub fn register_element(
        &self,
        id: impl Into<String>,
        node: ElementRef,
        config: SharedElementConfig,
    ) -> Result<()> {
        self.scene.borrow_mut().register(id, node, config)
    }

    pub fn unregister_element(&self, id: &str) {
        self.scene.borrow_mut().unregister(id);
    }

    pub fn rename_element(&self, old_id: &str, new_id: impl Into<String>) -> Result<()> {
        self.scene.borrow_mut().rename(old_id, new_id)
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_mounted()
    }

    /// Mount (or reveal a kept-alive) screen.
    pub fn mount(&self) {
        self.surface.set_hidden(false);
        if !self.surface.is_mounted() {
            debug!(screen = %self.name, "mount");
            self.surface.mount();
        }
    }

    /// Unmount the screen. Kept-alive screens are only hidden. Unmounting
    /// drops every shared element registered in the scene.
    pub fn unmount(&self) {
        self.set_transition_role(false, false);
        if self.keep_alive.get() {
            trace!(screen = %self.name, "hide kept-alive screen");
            self.surface.set_hidden(true);
            return;
        }
        if self.surface.is_mounted() {
            debug!(screen = %self.name, "unmount");
            self.surface.unmount();
        }
        *self.scene.borrow_mut() = Scene::new(self.name.clone());
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.surface.set_interactive(interactive);
    }

    pub fn client_rect(&self) -> Rect {
        self.surface.client_rect()
    }
}

impl Animatable for Screen {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation {
        self.surface.animate(keyframes, options)
    }
}

impl SceneSource for Screen {
    fn scene_snapshot(&self) -> SceneSnapshot {
        let origin = self.surface.client_rect();
        self.scene.borrow().snapshot(origin)
    }

    fn keep_alive(&self) -> bool {
        self.keep_alive.get()
    }
}
