use crate::error::ConfigError;
use crate::registry::ChildAttributes;
use cgmath::Vector2;
use serde::Deserialize;

/// Client configuration, injected when creating a [`NodeTree`](crate::NodeTree).
///
/// ```json
/// { "viewport": [80, 24], "child_attributes": { "Tabs": ["tabs"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The size the root is laid out to.
    pub viewport: [f64; 2],
    /// Child properties per type, on top of the built-in ones.
    pub child_attributes: ChildAttributes,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            viewport: [80., 24.],
            child_attributes: ChildAttributes::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [width, height] = self.viewport;
        if !(width >= 0. && height >= 0.) {
            return Err(ConfigError::Viewport(width, height));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Vector2<f64> {
        Vector2::new(self.viewport[0], self.viewport[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_with_defaults() {
        let config = Config::from_json(r#"{ "child_attributes": { "Tabs": ["tabs"] } }"#).unwrap();
        assert_eq!(config.viewport, [80., 24.]);
        assert_eq!(config.child_attributes.for_type("Tabs"), ["tabs"]);
        assert_eq!(config.child_attributes.for_type("Row"), ["children"]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Config::from_json(r#"{ "viewport": [-1, 10] }"#),
            Err(ConfigError::Viewport(..))
        ));
        assert!(matches!(Config::from_json("[1, 2]"), Err(ConfigError::Json(_))));
    }
}
