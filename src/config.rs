/*

    Build-time settings of the KD-tree.

    The config is consumed by KDTree::build and kept read-only
    inside the tree afterwards, nothing can change it once the
    tree exists.

    Can be deserialized from JSON, e.g.
    "KDTree": { "MaxTrianglesPerLeaf": "10", "Traversal": "NearFirst" }
    Missing fields take their defaults.

    @date: 12 Nov, 2025
*/

use std::fmt;

use crate::json_parser::{deser_bool, deser_usize};
use crate::prelude::*;

/// A node holding fewer triangles than this becomes a leaf.
pub const MAX_TRIANGLES_PER_LEAF: usize = 10;

/// Recursion limit, reached only when triangles pile up on a point
/// and halving the box no longer separates them.
pub const MAX_DEPTH: usize = 64;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TraversalOrder {
    /// left subtree, right subtree, then the node's own triangles
    #[default]
    Fixed,
    /// own triangles, then the child the ray enters first, skipping
    /// children that start beyond the closest hit found so far
    NearFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TreeConfig {
    #[default(MAX_TRIANGLES_PER_LEAF)]
    #[serde(deserialize_with = "deser_usize")]
    pub max_triangles_per_leaf: usize,

    #[default(MAX_DEPTH)]
    #[serde(deserialize_with = "deser_usize")]
    pub max_depth: usize,

    #[default = false]
    #[serde(deserialize_with = "deser_bool")]
    pub parallel_build: bool,

    pub traversal: TraversalOrder,
}

impl TreeConfig {
    pub fn with_leaf_capacity(max_triangles_per_leaf: usize) -> Self {
        Self {
            max_triangles_per_leaf,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_triangles_per_leaf == 0 {
            return Err(ConfigError::ZeroLeafCapacity);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroLeafCapacity,
    ZeroDepth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLeafCapacity => write!(f, "MaxTrianglesPerLeaf must be at least 1"),
            ConfigError::ZeroDepth => write!(f, "MaxDepth must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.max_triangles_per_leaf, MAX_TRIANGLES_PER_LEAF);
        assert_eq!(config.max_depth, MAX_DEPTH);
        assert!(!config.parallel_build);
        assert_eq!(config.traversal, TraversalOrder::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_with_strings_and_numbers() {
        let json = r#"{ "MaxTrianglesPerLeaf": "4", "MaxDepth": 20, "ParallelBuild": "true", "Traversal": "NearFirst" }"#;
        let config: TreeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_triangles_per_leaf, 4);
        assert_eq!(config.max_depth, 20);
        assert!(config.parallel_build);
        assert_eq!(config.traversal, TraversalOrder::NearFirst);
    }

    #[test]
    fn test_from_json_partial() {
        let config: TreeConfig = serde_json::from_str(r#"{ "MaxTrianglesPerLeaf": 1 }"#).unwrap();
        assert_eq!(config, TreeConfig::with_leaf_capacity(1));
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert_eq!(TreeConfig::with_leaf_capacity(0).validate(), Err(ConfigError::ZeroLeafCapacity));
        let config = TreeConfig { max_depth: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDepth));
    }
}
