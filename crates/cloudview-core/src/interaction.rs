//! Key-press handlers bound to a display session.

use crate::scene::Scene;

/// Whether a handler consumed a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// The key was handled; the scene needs a redraw.
    Handled,
    /// The key was not for this handler.
    Ignored,
}

/// Reacts to key presses by mutating the scene.
///
/// `key` is the logical key symbol, e.g. `"+"` or `"r"`.
pub trait KeyHandler {
    fn on_key(&mut self, key: &str, scene: &mut Scene) -> KeyResponse;
}

/// Grows one viewport's point size by one pixel on every `+` press.
///
/// There is no upper bound and no shrinking binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointSizeHandler {
    viewport: usize,
}

impl PointSizeHandler {
    /// Binds the handler to the cloud in the given viewport.
    #[must_use]
    pub fn new(viewport: usize) -> Self {
        Self { viewport }
    }

    /// The viewport this handler acts on.
    #[must_use]
    pub fn viewport(&self) -> usize {
        self.viewport
    }
}

impl KeyHandler for PointSizeHandler {
    fn on_key(&mut self, key: &str, scene: &mut Scene) -> KeyResponse {
        if key != "+" {
            return KeyResponse::Ignored;
        }
        let Ok(size) = scene.point_size(self.viewport) else {
            return KeyResponse::Ignored;
        };
        if scene.set_point_size(self.viewport, size + 1.0).is_err() {
            return KeyResponse::Ignored;
        }
        log::info!("{size} {key}");
        KeyResponse::Handled
    }
}

/// An ordered set of key handlers.
#[derive(Default)]
pub struct KeyHandlers {
    handlers: Vec<Box<dyn KeyHandler>>,
}

impl KeyHandlers {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One point-size handler per viewport of the scene.
    #[must_use]
    pub fn point_size_per_viewport(scene: &Scene) -> Self {
        let mut handlers = Self::new();
        for i in 0..scene.len() {
            handlers.push(PointSizeHandler::new(i));
        }
        handlers
    }

    /// Adds a handler.
    pub fn push(&mut self, handler: impl KeyHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if there are no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Offers the key to every handler. Handled if any handler took it.
    pub fn dispatch(&mut self, key: &str, scene: &mut Scene) -> KeyResponse {
        let mut response = KeyResponse::Ignored;
        for handler in &mut self.handlers {
            if handler.on_key(key, scene) == KeyResponse::Handled {
                response = KeyResponse::Handled;
            }
        }
        response
    }
}

impl std::fmt::Debug for KeyHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DisplayOptions;
    use ndarray::{array, Array2};

    fn scene(clouds: usize) -> Scene {
        let points: Vec<Array2<f32>> = (0..clouds).map(|_| array![[0.0, 0.0, 0.0]]).collect();
        let colors: Vec<Array2<u8>> = (0..clouds).map(|_| array![[0, 0, 0]]).collect();
        Scene::from_arrays(&points, &colors, &DisplayOptions::default()).unwrap()
    }

    #[test]
    fn test_plus_grows_point_size_by_one() {
        let mut scene = scene(1);
        let mut handler = PointSizeHandler::new(0);
        for expected in [5.0, 6.0, 7.0] {
            assert_eq!(handler.on_key("+", &mut scene), KeyResponse::Handled);
            assert_eq!(scene.point_size(0).unwrap(), expected);
        }
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut scene = scene(1);
        let mut handler = PointSizeHandler::new(0);
        for key in ["-", "=", "a", "plus"] {
            assert_eq!(handler.on_key(key, &mut scene), KeyResponse::Ignored);
        }
        assert_eq!(scene.point_size(0).unwrap(), 4.0);
    }

    #[test]
    fn test_handler_only_touches_its_viewport() {
        let mut scene = scene(2);
        let mut handler = PointSizeHandler::new(1);
        handler.on_key("+", &mut scene);
        assert_eq!(scene.point_size(0).unwrap(), 4.0);
        assert_eq!(scene.point_size(1).unwrap(), 5.0);
    }

    #[test]
    fn test_missing_viewport_is_ignored() {
        let mut scene = scene(1);
        let mut handler = PointSizeHandler::new(3);
        assert_eq!(handler.on_key("+", &mut scene), KeyResponse::Ignored);
    }

    #[test]
    fn test_dispatch_reaches_every_viewport() {
        let mut scene = scene(3);
        let mut handlers = KeyHandlers::point_size_per_viewport(&scene);
        assert_eq!(handlers.len(), 3);
        assert_eq!(handlers.dispatch("+", &mut scene), KeyResponse::Handled);
        assert_eq!(handlers.dispatch("x", &mut scene), KeyResponse::Ignored);
        for i in 0..3 {
            assert_eq!(scene.point_size(i).unwrap(), 5.0);
        }
    }
}
