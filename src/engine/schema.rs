//! Feature schema resolution for freshly loaded classifiers.

use serde::Serialize;

use super::Classifier;

/// Schema used when a model name is not one of the known families.
pub const DEFAULT_FEATURES: &[&str] = &["distance_from_net"];

/// Feature sets of the model families trained for this service.
const KNOWN_FEATURE_SETS: &[(&str, &[&str])] = &[
    ("logreg_distance", &["distance_from_net"]),
    ("logreg_angle", &["angle_from_net"]),
    ("logreg_distance_angle", &["distance_from_net", "angle_from_net"]),
];

/// Where a resolved schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// Names recorded by the classifier at training time.
    Classifier,
    /// Static table entry for a known model family.
    KnownModel,
    /// Name not recognized; default feature list.
    Default,
}

/// Ordered feature names a model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    pub names: Vec<String>,
    pub source: SchemaSource,
}

/// Resolve the feature schema for `classifier` loaded under `model_name`.
///
/// Never fails: classifiers without recorded names fall back to the
/// static table, then to [`DEFAULT_FEATURES`].
pub fn resolve_schema(classifier: &dyn Classifier, model_name: &str) -> FeatureSchema {
    if let Some(names) = classifier.trained_feature_names() {
        return FeatureSchema { names: names.to_vec(), source: SchemaSource::Classifier };
    }

    match KNOWN_FEATURE_SETS.iter().find(|(name, _)| *name == model_name) {
        Some((_, features)) => FeatureSchema {
            names: to_owned(features),
            source: SchemaSource::KnownModel,
        },
        None => FeatureSchema {
            names: to_owned(DEFAULT_FEATURES),
            source: SchemaSource::Default,
        },
    }
}

fn to_owned(features: &[&str]) -> Vec<String> {
    features.iter().map(|f| f.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LogisticRegression;

    #[test]
    fn test_classifier_names_win() {
        let model = LogisticRegression::new(vec![0.1, 0.2], 0.0)
            .with_feature_names(["angle_from_net", "distance_from_net"]);
        let schema = resolve_schema(&model, "logreg_distance");
        assert_eq!(schema.names, vec!["angle_from_net", "distance_from_net"]);
        assert_eq!(schema.source, SchemaSource::Classifier);
    }

    #[test]
    fn test_known_family_fallback() {
        let model = LogisticRegression::new(vec![0.1], 0.0);
        let schema = resolve_schema(&model, "logreg_angle");
        assert_eq!(schema.names, vec!["angle_from_net"]);
        assert_eq!(schema.source, SchemaSource::KnownModel);

        let schema = resolve_schema(&model, "logreg_distance_angle");
        assert_eq!(schema.names, vec!["distance_from_net", "angle_from_net"]);
    }

    #[test]
    fn test_unknown_name_defaults_to_distance() {
        let model = LogisticRegression::new(vec![0.1], 0.0);
        let schema = resolve_schema(&model, "xgboost_all_features");
        assert_eq!(schema.names, vec!["distance_from_net"]);
        assert_eq!(schema.source, SchemaSource::Default);
    }
}
