//! Minimal route history: enough to know the current and previous route.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{GlideError, Result};

/// Result of stepping back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackStep {
    /// Route shown after the step.
    pub route: String,
    /// Route that was left.
    pub left: String,
    /// The history ran out and the default route replaced the last entry.
    pub replace_state: bool,
}

/// Stack of visited routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    stack: Vec<String>,
    default_route: String,
}

impl History {
    /// Start at `initial`. When a different default route is given it sits
    /// below the initial entry so going back lands on it.
    pub fn new(initial: impl Into<String>, default_route: Option<String>) -> Self {
        let initial = initial.into();
        let mut stack = Vec::new();
        let default_route = default_route.unwrap_or_else(|| "/".to_string());
        if default_route != initial {
            stack.push(default_route.clone());
        }
        stack.push(initial);
        Self { stack, default_route }
    }

    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn previous(&self) -> Option<&str> {
        self.stack.len().checked_sub(2).map(|i| self.stack[i].as_str())
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    pub fn set_default_route(&mut self, route: impl Into<String>) {
        self.default_route = route.into();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.stack
    }

    /// Push `route`, or replace the current entry.
    pub fn push(&mut self, route: impl Into<String>, replace: bool) {
        let route = route.into();
        trace!(%route, replace, "history push");
        if replace {
            self.stack.pop();
        }
        self.stack.push(route);
    }

    /// Whether [`back`](Self::back) would change the current route.
    pub fn can_go_back(&self) -> bool {
        match self.stack.as_slice() {
            [] => false,
            [only] => *only != self.default_route,
            _ => true,
        }
    }

    /// Step back. Backing out of the last entry replaces it with the default
    /// route.
    pub fn back(&mut self) -> Result<BackStep> {
        if !self.can_go_back() {
            return Err(GlideError::NoPreviousRoute);
        }
        let left = self.stack.pop().ok_or(GlideError::NoPreviousRoute)?;
        let replace_state = self.stack.is_empty();
        if replace_state {
            self.stack.push(self.default_route.clone());
        }
        let route = self.current().unwrap_or(&self.default_route).to_string();
        trace!(%left, %route, replace_state, "history back");
        Ok(BackStep { route, left, replace_state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_sits_below_initial() {
        let history = History::new("/details", None);
        assert_eq!(history.entries(), ["/".to_string(), "/details".to_string()]);
        assert_eq!(history.previous(), Some("/"));

        let history = History::new("/", None);
        assert_eq!(history.len(), 1);
        assert_eq!(history.previous(), None);
    }

    #[test]
    fn test_push_and_replace() {
        let mut history = History::new("/", None);
        history.push("/a", false);
        history.push("/b", true);
        assert_eq!(history.current(), Some("/b"));
        assert_eq!(history.previous(), Some("/"));
    }

    #[test]
    fn test_back() {
        let mut history = History::new("/", None);
        history.push("/a", false);
        let step = history.back().unwrap();
        assert_eq!(step, BackStep { route: "/".into(), left: "/a".into(), replace_state: false });
        assert_eq!(history.back(), Err(GlideError::NoPreviousRoute));
    }

    #[test]
    fn test_back_out_of_last_entry_uses_default() {
        let mut history = History::new("/", Some("/home".into()));
        history.push("/x", true);
        history.push("/y", true);
        assert_eq!(history.len(), 2);
        let mut history = History::new("/y", Some("/y".into()));
        history.push("/z", true);
        let step = history.back().unwrap();
        assert!(step.replace_state);
        assert_eq!(step.route, "/y");
        assert_eq!(history.entries(), ["/y".to_string()]);
    }
}
