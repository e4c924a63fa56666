use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Which borders are reported and how they are linked.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RetrievalMode {
    /// Only the outermost outer borders, linked as siblings
    External,
    /// Every border, all siblings, no parent/child links
    #[default]
    List,
    /// Two levels: outer borders on top, their holes as children
    #[serde(rename = "ccomp")]
    #[strum(serialize = "ccomp")]
    CComp,
    /// Full nesting tree
    Tree,
}

impl RetrievalMode {
    pub fn description(&self) -> &'static str {
        match self {
            Self::External => "Retrieve only the extreme outer contours",
            Self::List => "Retrieve all contours without any hierarchical relationships",
            Self::CComp => "Retrieve all contours organised into a two-level hierarchy",
            Self::Tree => "Retrieve all contours and reconstruct the full nesting hierarchy",
        }
    }
}

/// Point reduction applied to each traced border.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApproximationMethod {
    /// Keep every border pixel
    None,
    /// Compress horizontal, vertical and diagonal runs to their end points
    #[default]
    Simple,
}

impl ApproximationMethod {
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "Store every border point",
            Self::Simple => "Compress straight horizontal, vertical and diagonal segments to their end points",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_names_parse() {
        assert_eq!(RetrievalMode::from_str("ccomp").unwrap(), RetrievalMode::CComp);
        assert_eq!(RetrievalMode::from_str("tree").unwrap(), RetrievalMode::Tree);
        assert_eq!(ApproximationMethod::from_str("none").unwrap(), ApproximationMethod::None);
        assert!(RetrievalMode::from_str("floodfill").is_err());
    }

    #[test]
    fn test_mode_serde_matches_display() {
        for mode in [RetrievalMode::External, RetrievalMode::List, RetrievalMode::CComp, RetrievalMode::Tree] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode));
        }
    }

    #[test]
    fn test_every_variant_is_described() {
        use strum::IntoEnumIterator;

        assert!(RetrievalMode::iter().all(|mode| !mode.description().is_empty()));
        assert!(ApproximationMethod::iter().all(|method| !method.description().is_empty()));
        assert_ne!(RetrievalMode::Tree.description(), RetrievalMode::CComp.description());
    }
}
