//! Foreign types mirroring the XGBoost JSON schema.
//!
//! Only the parts needed for tree-ensemble inference are modelled; unknown
//! fields (training parameters, attributes, metrics) are ignored.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

// =============================================================================
// Lenient scalar deserializers
// =============================================================================

/// `base_score` appears as `0.5`, `"0.5"`, `"[5E-1]"`, `"[1E-1,9E-1]"` or
/// `[0.5]` depending on the XGBoost version. Vector scores hold one entry per
/// output group.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    fn parse<E: SerdeError>(s: &str) -> Result<f32, E> {
        s.trim()
            .parse::<f32>()
            .map_err(|_| E::custom(format!("cannot parse base_score from {s:?}")))
    }

    fn number<E: SerdeError>(value: &Value) -> Result<f32, E> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| E::custom("invalid base_score number")),
            Value::String(s) => parse(s),
            other => Err(E::custom(format!("invalid base_score entry {other}"))),
        }
    }

    let scores = match Value::deserialize(deserializer)? {
        Value::String(s) => {
            let t = s.trim();
            let t = t.strip_prefix('[').and_then(|t| t.strip_suffix(']')).unwrap_or(t);
            t.split(',').map(parse::<D::Error>).collect::<Result<Vec<_>, _>>()?
        }
        Value::Array(arr) => arr.iter().map(number::<D::Error>).collect::<Result<Vec<_>, _>>()?,
        value @ Value::Number(_) => vec![number::<D::Error>(&value)?],
        _ => {
            return Err(SerdeError::custom(
                "base_score must be a number, string or array",
            ));
        }
    };
    if scores.is_empty() {
        return Err(SerdeError::custom("empty base_score"));
    }
    Ok(scores)
}

/// Per-node flags are integers in current releases and booleans in some
/// older ones.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|v| match v {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => n
                .as_i64()
                .map(|i| i != 0)
                .ok_or_else(|| SerdeError::custom("invalid number for flag")),
            other => Err(SerdeError::custom(format!("invalid flag value {other}"))),
        })
        .collect()
}

fn default_num_target() -> i64 {
    1
}

// =============================================================================
// Trees
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub num_feature: i64,
}

/// One regression tree in XGBoost's parallel-array layout.
///
/// Leaves have `left_children[i] == -1`; their value is `base_weights[i]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    #[serde(default)]
    pub id: i32,
    pub base_weights: Vec<f32>,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    /// 0 = numeric, 1 = categorical. Absent in pre-1.5 models.
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(default)]
    pub categories_nodes: Vec<i32>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeModelParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_trees: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub gbtree_model_param: GBTreeModelParam,
    pub trees: Vec<Tree>,
    /// Output group of each tree.
    pub tree_info: Vec<i32>,
}

impl ModelTrees {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Dart {
        gbtree: GBTreeDefinition,
        weight_drop: Vec<f32>,
    },
    /// Parsed only to report it as unsupported.
    Gblinear {},
}

impl GradientBooster {
    pub fn name(&self) -> &'static str {
        match self {
            GradientBooster::Gbtree { .. } => "gbtree",
            GradientBooster::Dart { .. } => "dart",
            GradientBooster::Gblinear {} => "gblinear",
        }
    }
}

// =============================================================================
// Learner
// =============================================================================

/// Training objective; parameters beyond the name are irrelevant at inference.
#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: Vec<f32>,
    #[serde(rename = "num_class")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_class: i64,
    #[serde(rename = "num_feature")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_features: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_num_target")]
    pub num_target: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

// =============================================================================
// Top-level model
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub version: [u32; 3],
    pub learner: Learner,
}

impl XgbModel {
    /// Load a model from a JSON file.
    ///
    /// Parse failures are returned as `InvalidData` I/O errors.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Parse a model from an in-memory JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// `major.minor.patch` of the XGBoost release that wrote the model.
    pub fn version_string(&self) -> String {
        let [major, minor, patch] = self.version;
        format!("{major}.{minor}.{patch}")
    }
}
