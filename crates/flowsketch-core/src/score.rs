//! Decision scoring attached to nodes.
//!
//! A node in score mode carries four weighted inputs and a derived score:
//! `((benefit × knowledge) − harm) / irreversibility`, rounded to one decimal.

use serde::{Deserialize, Serialize};

/// Lowest benefit a node can be rated with.
pub const MIN_BENEFIT: f64 = 1.0;
/// Highest benefit a node can be rated with.
pub const MAX_BENEFIT: f64 = 10.0;
/// Lowest harm a node can be rated with.
pub const MIN_HARM: f64 = 0.0;
/// Highest harm a node can be rated with.
pub const MAX_HARM: f64 = 10.0;

/// How well the outcome of a decision is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeFactor {
    /// Factor 1.0
    #[default]
    Certain,
    /// Factor 0.8
    Likely,
    /// Factor 0.5
    Uncertain,
}

impl KnowledgeFactor {
    pub fn value(self) -> f64 {
        match self {
            KnowledgeFactor::Certain => 1.0,
            KnowledgeFactor::Likely => 0.8,
            KnowledgeFactor::Uncertain => 0.5,
        }
    }

    /// Map a raw factor back to its level, if it is one of the allowed values.
    pub fn from_value(value: f64) -> Option<Self> {
        [Self::Certain, Self::Likely, Self::Uncertain]
            .into_iter()
            .find(|k| (k.value() - value).abs() < 1e-9)
    }
}

/// Whether the effects of a decision can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Irreversibility {
    /// Divisor 1.0
    #[default]
    Reversible,
    /// Divisor 2.0
    Irreversible,
}

impl Irreversibility {
    pub fn value(self) -> f64 {
        match self {
            Irreversibility::Reversible => 1.0,
            Irreversibility::Irreversible => 2.0,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        [Self::Reversible, Self::Irreversible]
            .into_iter()
            .find(|k| (k.value() - value).abs() < 1e-9)
    }
}

/// Compute the score for a set of inputs, rounded to one decimal place.
pub fn compute_score(
    benefit: f64,
    knowledge: KnowledgeFactor,
    harm: f64,
    irreversibility: Irreversibility,
) -> f64 {
    let raw = (benefit * knowledge.value() - harm) / irreversibility.value();
    round1(raw)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serialized shape of the score record. The score is recomputed on load.
#[derive(Deserialize)]
struct ScoreFields {
    benefit: f64,
    #[serde(default)]
    knowledge: KnowledgeFactor,
    #[serde(default)]
    harm: f64,
    #[serde(default)]
    irreversibility: Irreversibility,
    #[serde(default)]
    notes: String,
}

impl From<ScoreFields> for ScoreAttributes {
    fn from(fields: ScoreFields) -> Self {
        let mut attrs = ScoreAttributes::default();
        attrs.apply(ScorePatch {
            benefit: Some(fields.benefit),
            knowledge: Some(fields.knowledge),
            harm: Some(fields.harm),
            irreversibility: Some(fields.irreversibility),
            notes: Some(fields.notes),
        });
        attrs
    }
}

/// Score inputs plus the derived score.
///
/// Fields are private so the score can only change through [`ScoreAttributes::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoreFields")]
pub struct ScoreAttributes {
    benefit: f64,
    knowledge: KnowledgeFactor,
    harm: f64,
    irreversibility: Irreversibility,
    notes: String,
    score: f64,
}

impl Default for ScoreAttributes {
    fn default() -> Self {
        let benefit = 5.0;
        let harm = 0.0;
        Self {
            benefit,
            knowledge: KnowledgeFactor::Certain,
            harm,
            irreversibility: Irreversibility::Reversible,
            notes: String::new(),
            score: compute_score(
                benefit,
                KnowledgeFactor::Certain,
                harm,
                Irreversibility::Reversible,
            ),
        }
    }
}

impl ScoreAttributes {
    pub fn benefit(&self) -> f64 {
        self.benefit
    }

    pub fn knowledge(&self) -> KnowledgeFactor {
        self.knowledge
    }

    pub fn harm(&self) -> f64 {
        self.harm
    }

    pub fn irreversibility(&self) -> Irreversibility {
        self.irreversibility
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Merge the given fields and recompute the score.
    ///
    /// Numeric inputs are clamped into their ranges; non-finite values are ignored.
    pub fn apply(&mut self, patch: ScorePatch) {
        if let Some(benefit) = patch.benefit.filter(|v| v.is_finite()) {
            self.benefit = benefit.clamp(MIN_BENEFIT, MAX_BENEFIT);
        }
        if let Some(knowledge) = patch.knowledge {
            self.knowledge = knowledge;
        }
        if let Some(harm) = patch.harm.filter(|v| v.is_finite()) {
            self.harm = harm.clamp(MIN_HARM, MAX_HARM);
        }
        if let Some(irreversibility) = patch.irreversibility {
            self.irreversibility = irreversibility;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.score = compute_score(self.benefit, self.knowledge, self.harm, self.irreversibility);
    }
}

/// A partial update of score inputs. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorePatch {
    pub benefit: Option<f64>,
    pub knowledge: Option<KnowledgeFactor>,
    pub harm: Option<f64>,
    pub irreversibility: Option<Irreversibility>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score() {
        let attrs = ScoreAttributes::default();
        assert_eq!(attrs.benefit(), 5.0);
        assert_eq!(attrs.knowledge(), KnowledgeFactor::Certain);
        assert_eq!(attrs.harm(), 0.0);
        assert_eq!(attrs.irreversibility(), Irreversibility::Reversible);
        assert!((attrs.score() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_formula_over_domain() {
        let knowledge = [
            KnowledgeFactor::Certain,
            KnowledgeFactor::Likely,
            KnowledgeFactor::Uncertain,
        ];
        let irreversibility = [Irreversibility::Reversible, Irreversibility::Irreversible];
        for benefit in 1..=10 {
            for harm in 0..=10 {
                for k in knowledge {
                    for r in irreversibility {
                        let b = benefit as f64;
                        let h = harm as f64;
                        let expected = (((b * k.value()) - h) / r.value() * 10.0).round() / 10.0;
                        assert!((compute_score(b, k, h, r) - expected).abs() < 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_apply_recomputes() {
        let mut attrs = ScoreAttributes::default();
        attrs.apply(ScorePatch {
            benefit: Some(7.0),
            knowledge: Some(KnowledgeFactor::Likely),
            harm: Some(3.0),
            irreversibility: Some(Irreversibility::Irreversible),
            notes: Some("risky".to_string()),
        });
        // (7 * 0.8 - 3) / 2 = 1.3
        assert!((attrs.score() - 1.3).abs() < 1e-9);
        assert_eq!(attrs.notes(), "risky");
    }

    #[test]
    fn test_partial_patch_keeps_other_fields() {
        let mut attrs = ScoreAttributes::default();
        attrs.apply(ScorePatch {
            harm: Some(8.0),
            ..Default::default()
        });
        assert_eq!(attrs.benefit(), 5.0);
        assert!((attrs.score() - -3.0).abs() < 1e-9);
    }

    #[test]
    fn test_inputs_are_clamped() {
        let mut attrs = ScoreAttributes::default();
        attrs.apply(ScorePatch {
            benefit: Some(42.0),
            harm: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(attrs.benefit(), MAX_BENEFIT);
        assert_eq!(attrs.harm(), MIN_HARM);

        attrs.apply(ScorePatch {
            benefit: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(attrs.benefit(), MAX_BENEFIT);
    }

    #[test]
    fn test_factor_lookup() {
        assert_eq!(KnowledgeFactor::from_value(0.8), Some(KnowledgeFactor::Likely));
        assert_eq!(KnowledgeFactor::from_value(0.7), None);
        assert_eq!(Irreversibility::from_value(2.0), Some(Irreversibility::Irreversible));
    }

    #[test]
    fn test_deserialize_recomputes_score() {
        let json = r#"{"benefit": 10.0, "knowledge": "uncertain", "harm": 1.0,
                       "irreversibility": "reversible", "notes": "", "score": 99.0}"#;
        let attrs: ScoreAttributes = serde_json::from_str(json).unwrap();
        assert!((attrs.score() - 4.0).abs() < 1e-9);
    }
}
