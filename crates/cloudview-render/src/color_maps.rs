//! Color maps for depth coloring.

use std::collections::HashMap;

use glam::Vec3;

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Samples the color map at a given value (0 to 1).
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        if self.colors.is_empty() {
            return Vec3::ZERO;
        }

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let n = self.colors.len() - 1;
        let idx = (t * n as f32).floor() as usize;
        let idx = idx.min(n - 1);
        let frac = t * n as f32 - idx as f32;

        self.colors[idx].lerp(self.colors[idx + 1], frac)
    }

    /// Maps `value` within `[min, max]` to a color. A degenerate range maps
    /// everything to the low end.
    pub fn map_range(&self, value: f32, min: f32, max: f32) -> Vec3 {
        let span = max - min;
        let t = if span > f32::EPSILON {
            (value - min) / span
        } else {
            0.0
        };
        self.sample(t)
    }
}

/// Registry for looking up color maps by name.
#[derive(Default)]
pub struct ColorMapRegistry {
    color_maps: HashMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Name of the map used when a lookup fails.
    pub const FALLBACK: &'static str = "rainbow";

    /// Creates a new color map registry with default color maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        // Hue sweep from red to blue, the usual scalar lookup table
        self.register(ColorMap::new(
            "rainbow",
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
        ));

        self.register(ColorMap::new(
            "viridis",
            vec![
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.457),
                Vec3::new(0.253, 0.265, 0.529),
                Vec3::new(0.206, 0.371, 0.553),
                Vec3::new(0.163, 0.471, 0.558),
                Vec3::new(0.127, 0.566, 0.550),
                Vec3::new(0.134, 0.658, 0.517),
                Vec3::new(0.266, 0.749, 0.440),
                Vec3::new(0.477, 0.821, 0.318),
                Vec3::new(0.741, 0.873, 0.150),
                Vec3::new(0.993, 0.906, 0.144),
            ],
        ));
    }

    /// Registers a color map, replacing any map with the same name.
    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Gets a color map by name.
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }

    /// Gets a color map by name, falling back to the rainbow map.
    pub fn get_or_fallback(&self, name: &str) -> Option<&ColorMap> {
        self.get(name).or_else(|| {
            log::warn!("unknown color map '{name}', using '{}'", Self::FALLBACK);
            self.get(Self::FALLBACK)
        })
    }

    /// Returns all color map names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.color_maps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainbow_endpoints() {
        let registry = ColorMapRegistry::new();
        let rainbow = registry.get("rainbow").unwrap();
        assert_eq!(rainbow.sample(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rainbow.sample(1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(rainbow.sample(0.5), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_map_range_clamps_and_handles_flat_range() {
        let registry = ColorMapRegistry::new();
        let rainbow = registry.get("rainbow").unwrap();
        assert_eq!(rainbow.map_range(-5.0, 0.0, 1.0), rainbow.sample(0.0));
        assert_eq!(rainbow.map_range(5.0, 0.0, 1.0), rainbow.sample(1.0));
        assert_eq!(rainbow.map_range(3.0, 3.0, 3.0), rainbow.sample(0.0));
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let registry = ColorMapRegistry::new();
        assert!(registry.get("magma").is_none());
        assert_eq!(registry.get_or_fallback("magma").unwrap().name, "rainbow");
        assert_eq!(registry.names(), vec!["rainbow", "viridis"]);
    }
}
