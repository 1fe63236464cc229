//! Software host for running the engine without a renderer.
//!
//! Every node here animates through [`SoftwareTarget`], so all of them share
//! one [`SoftwareClock`] and move together when it advances. Tests and the
//! demo binary drive the engine with these types; a real host implements
//! [`ElementNode`], [`ScreenSurface`] and [`OverlaySurface`] itself.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::animation::{
    Animatable, AnimatedValue, AnimationOptions, BoxedAnimation, KeyframeSet, SoftwareClock,
    SoftwareTarget, StyleCell, TRANSLATE_X, TRANSLATE_Y, Z_INDEX,
};
use crate::ghost::{GhostNode, GhostRef, OverlaySurface};
use crate::scene::{ElementNode, ElementRef, Rect, StyleMap};
use crate::screen::ScreenSurface;

/// A shared element node with settable geometry and computed style.
#[derive(Debug)]
pub struct HeadlessElement {
    target: SoftwareTarget,
    rect: Cell<Rect>,
    computed: RefCell<StyleMap>,
    hidden: Cell<bool>,
    connected: Cell<bool>,
}

impl HeadlessElement {
    pub fn new(clock: &SoftwareClock, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            target: SoftwareTarget::new(clock.clone()),
            rect: Cell::new(rect),
            computed: RefCell::new(StyleMap::new()),
            hidden: Cell::new(false),
            connected: Cell::new(true),
        })
    }

    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    /// Set one property of the computed style the scene snapshots.
    pub fn set_style(&self, property: &str, value: &str) {
        self.computed.borrow_mut().insert(property.to_string(), value.to_string());
    }

    /// Simulate the node being detached from the document.
    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    /// Animated style of the node itself.
    pub fn rendered(&self) -> StyleCell {
        Rc::clone(&self.target.style)
    }
}

impl Animatable for HeadlessElement {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation {
        self.target.animate(keyframes, options)
    }
}

impl ElementNode for HeadlessElement {
    fn client_rect(&self) -> Rect {
        self.rect.get()
    }

    fn computed_style(&self) -> StyleMap {
        self.computed.borrow().clone()
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

/// A screen surface that records mount and interactivity changes.
#[derive(Debug)]
pub struct HeadlessSurface {
    target: SoftwareTarget,
    rect: Cell<Rect>,
    mounted: Cell<bool>,
    hidden: Cell<bool>,
    interactive: Cell<bool>,
    mount_count: Cell<usize>,
}

impl HeadlessSurface {
    pub fn new(clock: &SoftwareClock, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            target: SoftwareTarget::new(clock.clone()),
            rect: Cell::new(rect),
            mounted: Cell::new(false),
            hidden: Cell::new(false),
            interactive: Cell::new(true),
            mount_count: Cell::new(0),
        })
    }

    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive.get()
    }

    /// How many times the surface went from unmounted to mounted.
    pub fn mount_count(&self) -> usize {
        self.mount_count.get()
    }

    /// Animated style of the whole screen.
    pub fn rendered(&self) -> StyleCell {
        Rc::clone(&self.target.style)
    }
}

impl Animatable for HeadlessSurface {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation {
        self.target.animate(keyframes, options)
    }
}

impl ScreenSurface for HeadlessSurface {
    fn mount(&self) {
        if !self.mounted.replace(true) {
            self.mount_count.set(self.mount_count.get() + 1);
        }
    }

    fn unmount(&self) {
        self.mounted.set(false);
        self.target.style.borrow_mut().base.clear();
    }

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn set_interactive(&self, interactive: bool) {
        self.interactive.set(interactive);
    }

    fn client_rect(&self) -> Rect {
        self.rect.get()
    }
}

/// A clone attached to a [`HeadlessOverlay`].
#[derive(Debug)]
pub struct HeadlessClone {
    target: SoftwareTarget,
    z_index: i32,
    removed: Cell<bool>,
}

impl HeadlessClone {
    pub fn style(&self) -> StyleCell {
        Rc::clone(&self.target.style)
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }
}

impl Animatable for HeadlessClone {
    fn animate(&self, keyframes: &KeyframeSet, options: AnimationOptions) -> BoxedAnimation {
        self.target.animate(keyframes, options)
    }
}

impl GhostNode for HeadlessClone {
    fn remove(&self) {
        self.removed.set(true);
    }
}

/// Overlay keeping every clone it ever created, so tests can inspect them.
#[derive(Debug)]
pub struct HeadlessOverlay {
    clock: SoftwareClock,
    visible: Cell<bool>,
    clones: RefCell<Vec<Rc<HeadlessClone>>>,
    max_clone_count: Cell<usize>,
}

impl HeadlessOverlay {
    pub fn new(clock: &SoftwareClock) -> Rc<Self> {
        Rc::new(Self {
            clock: clock.clone(),
            visible: Cell::new(false),
            clones: RefCell::new(Vec::new()),
            max_clone_count: Cell::new(0),
        })
    }

    /// Clones currently attached, in insertion order.
    pub fn clones(&self) -> Vec<Rc<HeadlessClone>> {
        self.clones.borrow().iter().filter(|c| !c.is_removed()).cloned().collect()
    }

    /// Highest number of clones attached at the same time.
    pub fn max_clone_count(&self) -> usize {
        self.max_clone_count.get()
    }
}

impl OverlaySurface for HeadlessOverlay {
    fn show(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        self.visible.set(false);
        self.clones.borrow_mut().retain(|c| !c.is_removed());
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn insert_clone(&self, _source: &ElementRef, style: &StyleMap, rect: Rect, z_index: i32) -> GhostRef {
        let target = SoftwareTarget::new(self.clock.clone());
        {
            let mut rendered = target.style.borrow_mut();
            for (property, value) in style {
                rendered.base.insert(property.clone(), AnimatedValue::parse_css(value));
            }
            rendered.base.insert(TRANSLATE_X.to_string(), AnimatedValue::px(rect.x));
            rendered.base.insert(TRANSLATE_Y.to_string(), AnimatedValue::px(rect.y));
            rendered.base.insert("width".to_string(), AnimatedValue::px(rect.width));
            rendered.base.insert("height".to_string(), AnimatedValue::px(rect.height));
            rendered.base.insert(Z_INDEX.to_string(), AnimatedValue::number(f64::from(z_index)));
        }
        let clone = Rc::new(HeadlessClone { target, z_index, removed: Cell::new(false) });
        self.clones.borrow_mut().push(Rc::clone(&clone));
        let count = self.clone_count();
        self.max_clone_count.set(self.max_clone_count.get().max(count));
        trace!(x = rect.x, y = rect.y, z_index, count, "clone inserted");
        clone
    }

    fn clone_count(&self) -> usize {
        self.clones.borrow().iter().filter(|c| !c.is_removed()).count()
    }
}
