use crate::choices::NoParams;
use crate::classifiers::proximity_tree::BinarySplitMode;
use crate::core::dimensions::{DimensionConversionMode, DimensionSamplingMode, DistanceMode};
use crate::distances::DistanceMeasureSpace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

fn default_seed() -> u64 {
    0
}
fn default_r() -> usize {
    1
}
fn default_distance_spaces() -> Vec<DistanceMeasureSpace> {
    DistanceMeasureSpace::defaults()
}
fn default_checkpoint_interval_secs() -> u64 {
    0
}
fn default_checkpoint_loading_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(SplitCriterionKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum SplitCriterionChoice {
    #[strum_discriminants(strum(
        message = "Gini Split Criterion",
        detailed_message = "Gain in Gini impurity over the parent."
    ))]
    Gini(NoParams),
    #[strum_discriminants(strum(
        message = "Information Gain Split Criterion",
        detailed_message = "Gain in entropy over the parent."
    ))]
    InfoGain(NoParams),
}
impl Default for SplitCriterionChoice {
    fn default() -> Self {
        Self::Gini(NoParams::default())
    }
}

/// Named configurations kept from the classic proximity tree setups.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display, IntoStaticStr, EnumMessage,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ProximityTreePreset {
    #[strum(serialize = "pt-r1", message = "One candidate split per node")]
    PtR1,
    #[strum(serialize = "pt-r5", message = "Best of five candidate splits per node")]
    PtR5,
    #[strum(serialize = "pt-r10", message = "Best of ten candidate splits per node")]
    PtR10,
}

impl ProximityTreePreset {
    pub fn params(self) -> ProximityTreeParams {
        let r = match self {
            Self::PtR1 => 1,
            Self::PtR5 => 5,
            Self::PtR10 => 10,
        };
        ProximityTreeParams {
            r,
            ..ProximityTreeParams::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProximityTreeParams {
    #[serde(default = "default_seed")]
    #[schemars(
        title = "Seed",
        description = "Seed of the random stream driving every split.",
        default = "default_seed"
    )]
    pub seed: u64,

    #[serde(default = "default_r")]
    #[schemars(
        title = "Candidate splits",
        description = "Candidate splits compared at each node (at least 1).",
        range(min = 1),
        default = "default_r"
    )]
    pub r: usize,

    #[serde(default = "default_distance_spaces")]
    #[schemars(skip)]
    pub distance_spaces: Vec<DistanceMeasureSpace>,

    #[serde(default)]
    #[schemars(skip)]
    pub split_criterion: SplitCriterionChoice,

    #[serde(default)]
    #[schemars(
        title = "Breadth first?",
        description = "Grow level by level instead of depth first."
    )]
    pub breadth_first: bool,

    #[serde(default)]
    #[schemars(
        title = "Race candidate splits?",
        description = "Abandon candidate splits that cannot win."
    )]
    pub early_abandon_splits: bool,

    #[serde(default)]
    #[schemars(
        title = "Abandon distances?",
        description = "Stop distance computations past the closest exemplar so far."
    )]
    pub early_abandon_distances: bool,

    #[serde(default)]
    #[schemars(
        title = "Check exemplars first?",
        description = "Assign exemplars to their own partition without distances."
    )]
    pub early_exemplar_check: bool,

    #[serde(default)]
    #[schemars(
        title = "Reorder partitions?",
        description = "Examine popular partitions first. Implies abandoned distances."
    )]
    pub partition_examination_reordering: bool,

    #[serde(default)]
    #[schemars(skip)]
    pub dimension_sampling_mode: DimensionSamplingMode,

    #[serde(default)]
    #[schemars(skip)]
    pub dimension_conversion_mode: DimensionConversionMode,

    #[serde(default)]
    #[schemars(skip)]
    pub distance_mode: DistanceMode,

    #[serde(default)]
    #[schemars(skip)]
    pub binary_split_mode: Option<BinarySplitMode>,

    #[serde(default)]
    #[schemars(
        title = "Train time limit (s)",
        description = "Soft limit on train time; unset grows the full tree.",
        range(min = 0.0)
    )]
    pub train_time_limit_secs: Option<f64>,

    #[serde(default)]
    #[schemars(
        title = "Test time limit (s)",
        description = "Soft limit on the time spent classifying one instance.",
        range(min = 0.0)
    )]
    pub test_time_limit_secs: Option<f64>,

    #[serde(default)]
    #[schemars(
        title = "Checkpoint path",
        description = "File or directory to checkpoint to; unset disables checkpointing."
    )]
    pub checkpoint_path: Option<String>,

    #[serde(default = "default_checkpoint_interval_secs")]
    #[schemars(
        title = "Checkpoint interval (s)",
        description = "Minimum time between unforced checkpoints.",
        default = "default_checkpoint_interval_secs"
    )]
    pub checkpoint_interval_secs: u64,

    #[serde(default = "default_checkpoint_loading_enabled")]
    #[schemars(
        title = "Load checkpoints?",
        description = "Resume from an existing checkpoint.",
        default = "default_checkpoint_loading_enabled"
    )]
    pub checkpoint_loading_enabled: bool,
}
impl Default for ProximityTreeParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            r: default_r(),
            distance_spaces: default_distance_spaces(),
            split_criterion: SplitCriterionChoice::default(),
            breadth_first: false,
            early_abandon_splits: false,
            early_abandon_distances: false,
            early_exemplar_check: false,
            partition_examination_reordering: false,
            dimension_sampling_mode: DimensionSamplingMode::default(),
            dimension_conversion_mode: DimensionConversionMode::default(),
            distance_mode: DistanceMode::default(),
            binary_split_mode: None,
            train_time_limit_secs: None,
            test_time_limit_secs: None,
            checkpoint_path: None,
            checkpoint_interval_secs: default_checkpoint_interval_secs(),
            checkpoint_loading_enabled: default_checkpoint_loading_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::schema_for;
    use serde_json::{Value, json};
    use std::str::FromStr;
    use strum::EnumMessage;

    fn root_props_of<T: JsonSchema>() -> Value {
        let root = schema_for!(T);
        let v = serde_json::to_value(root).expect("schema to JSON");
        v.get("schema")
            .cloned()
            .unwrap_or(v)
            .get("properties")
            .cloned()
            .unwrap_or_else(|| json!({}))
    }

    #[test]
    fn params_default_is_populated() {
        let p = ProximityTreeParams::default();
        assert_eq!(p.seed, 0);
        assert_eq!(p.r, 1);
        assert_eq!(p.distance_spaces, DistanceMeasureSpace::defaults());
        assert!(matches!(p.split_criterion, SplitCriterionChoice::Gini(_)));
        assert!(!p.breadth_first);
        assert!(!p.early_abandon_splits);
        assert_eq!(p.binary_split_mode, None);
        assert_eq!(p.train_time_limit_secs, None);
        assert_eq!(p.checkpoint_path, None);
        assert!(p.checkpoint_loading_enabled);
    }

    #[test]
    fn serde_missing_fields_apply_defaults() {
        let p: ProximityTreeParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p, ProximityTreeParams::default());
    }

    #[test]
    fn serde_reads_kebab_case_modes() {
        let p: ProximityTreeParams = serde_json::from_value(json!({
            "r": 5,
            "distance_spaces": ["euclidean", "lcss-restricted"],
            "split_criterion": { "type": "info-gain", "params": {} },
            "dimension_sampling_mode": "shuffle",
            "distance_mode": "independent",
            "binary_split_mode": "majority-class",
            "train_time_limit_secs": 1.5
        }))
        .unwrap();
        assert_eq!(p.r, 5);
        assert_eq!(
            p.distance_spaces,
            vec![
                DistanceMeasureSpace::Euclidean,
                DistanceMeasureSpace::LcssRestricted
            ]
        );
        assert!(matches!(p.split_criterion, SplitCriterionChoice::InfoGain(_)));
        assert_eq!(p.dimension_sampling_mode, DimensionSamplingMode::Shuffle);
        assert_eq!(p.distance_mode, DistanceMode::Independent);
        assert_eq!(p.binary_split_mode, Some(BinarySplitMode::MajorityClass));
        assert_eq!(p.train_time_limit_secs, Some(1.5));
    }

    #[test]
    fn unknown_distance_space_is_rejected() {
        let p = serde_json::from_value::<ProximityTreeParams>(json!({
            "distance_spaces": ["manhattan"]
        }));
        assert!(p.is_err());
    }

    #[test]
    fn tagged_enum_serialization_split_criterion() {
        let v = serde_json::to_value(SplitCriterionChoice::default()).unwrap();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("gini"));
        assert!(
            v.get("params")
                .map(|p| p.as_object().unwrap().is_empty())
                .unwrap_or(false)
        );
    }

    #[test]
    fn schema_skips_nested_choice_fields() {
        let props = root_props_of::<ProximityTreeParams>();
        let obj = props.as_object().expect("props object");
        assert!(!obj.contains_key("split_criterion"));
        assert!(!obj.contains_key("distance_spaces"));
        for key in [
            "seed",
            "r",
            "breadth_first",
            "early_abandon_splits",
            "partition_examination_reordering",
            "train_time_limit_secs",
            "checkpoint_path",
            "checkpoint_loading_enabled",
        ] {
            assert!(obj.contains_key(key), "missing key in schema: {key}");
        }
        let r = obj.get("r").unwrap().as_object().unwrap();
        assert_eq!(r.get("minimum").and_then(Value::as_f64), Some(1.0));
    }

    #[test]
    fn presets_differ_only_in_r() {
        let r5 = ProximityTreePreset::from_str("pt-r5").unwrap().params();
        assert_eq!(r5.r, 5);
        assert_eq!(
            ProximityTreeParams { r: 1, ..r5 },
            ProximityTreeParams::default()
        );
        assert_eq!(ProximityTreePreset::PtR10.params().r, 10);
        assert_eq!(ProximityTreePreset::PtR1.to_string(), "pt-r1");
        assert!(ProximityTreePreset::from_str("pt-r7").is_err());
    }

    #[test]
    fn discriminant_messages_are_available() {
        assert_eq!(
            SplitCriterionKind::Gini.get_message(),
            Some("Gini Split Criterion")
        );
        assert!(SplitCriterionKind::InfoGain.get_detailed_message().is_some());
        assert!(ProximityTreePreset::PtR5.get_message().is_some());
    }
}
