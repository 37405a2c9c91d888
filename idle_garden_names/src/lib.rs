// Automation name pools for the idle garden.
//
// Every automation the player buys gets a display name drawn from a
// per-category pool (harvesters, planters, sellers). Names must be unique
// among the automations currently registered in a garden, so the picker
// takes a membership predicate supplied by the caller (the sim keeps the
// registry; this crate never sees it).
//
// Architecture:
// - `lib.rs` (this file): `NamePool`, loads and queries the JSON pools.
// - `pick.rs`: deterministic unique-name picking from a pool.
//
// The pools are loaded from `data/automation_names.json` via
// `NamePool::from_json()`, following the same JSON-string-in, typed-struct-out
// pattern as `GameConfig` in the sim crate. `default_pool()` embeds the file
// at compile time with `include_str!`.
//
// Determinism constraint: all randomness goes through
// `idle_garden_prng::GameRng`. Pools preserve file order.

pub mod pick;

pub use pick::pick_unique_name;

use serde::{Deserialize, Serialize};

/// Which pool a name is drawn from. One category per automation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCategory {
    Harvester,
    Planter,
    Seller,
}

/// On-disk layout of the name file.
#[derive(Debug, Deserialize)]
struct NameFile {
    #[serde(default)]
    harvester: Vec<String>,
    #[serde(default)]
    planter: Vec<String>,
    #[serde(default)]
    seller: Vec<String>,
}

/// Loaded name pools, one list per category.
#[derive(Debug, Clone)]
pub struct NamePool {
    harvester: Vec<String>,
    planter: Vec<String>,
    seller: Vec<String>,
}

impl NamePool {
    /// Parse name pools from a JSON string. Blank entries are dropped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: NameFile = serde_json::from_str(json)?;
        let clean = |names: Vec<String>| -> Vec<String> {
            names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        };
        Ok(NamePool {
            harvester: clean(file.harvester),
            planter: clean(file.planter),
            seller: clean(file.seller),
        })
    }

    /// Names for one category, in file order.
    pub fn names(&self, category: NameCategory) -> &[String] {
        match category {
            NameCategory::Harvester => &self.harvester,
            NameCategory::Planter => &self.planter,
            NameCategory::Seller => &self.seller,
        }
    }
}

/// Load the name pools embedded at compile time.
///
/// Panics if the embedded JSON is malformed, which a unit test rules out.
pub fn default_pool() -> NamePool {
    let json = include_str!("../../data/automation_names.json");
    NamePool::from_json(json).expect("embedded automation_names.json is malformed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_from_json_keeps_file_order() {
        let json = r#"{
            "harvester": ["Thistle", "Bramble"],
            "planter": ["Sprout"],
            "seller": []
        }"#;
        let pool = NamePool::from_json(json).unwrap();
        assert_eq!(pool.names(NameCategory::Harvester), ["Thistle", "Bramble"]);
        assert_eq!(pool.names(NameCategory::Planter), ["Sprout"]);
        assert!(pool.names(NameCategory::Seller).is_empty());
    }

    #[test]
    fn missing_categories_default_to_empty() {
        let pool = NamePool::from_json(r#"{"planter": ["Moss"]}"#).unwrap();
        assert!(pool.names(NameCategory::Harvester).is_empty());
        assert_eq!(pool.names(NameCategory::Planter).len(), 1);
    }

    #[test]
    fn blank_names_are_dropped() {
        let pool = NamePool::from_json(r#"{"seller": ["  ", "Penny ", ""]}"#).unwrap();
        assert_eq!(pool.names(NameCategory::Seller), ["Penny"]);
    }

    #[test]
    fn default_pool_has_every_category() {
        let pool = default_pool();
        for category in [
            NameCategory::Harvester,
            NameCategory::Planter,
            NameCategory::Seller,
        ] {
            assert!(
                pool.names(category).len() >= 10,
                "{category:?} pool is too small"
            );
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(NamePool::from_json("{\"harvester\": 3}").is_err());
    }
}
