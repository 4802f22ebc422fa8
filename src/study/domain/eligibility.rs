//! Data-driven eligibility rules and typed screener answers.
//!
//! A study owns an [`EligibilityRuleSet`]: a schema version plus an ordered
//! list of [`EligibilityCriterion`] predicates. Evaluation is a pure function
//! of the rule set and the submitted [`ScreenerAnswers`].
//!
//! # Examples
//!
//! ```
//! use cohort::study::domain::{EligibilityRuleSet, ScreenerAnswers, ScreenerValue};
//!
//! let rules = EligibilityRuleSet::baseline();
//! let answers = ScreenerAnswers::baseline()
//!     .with_answer("age", ScreenerValue::Integer(16))
//!     .with_answer("smoker", ScreenerValue::Text("no".to_owned()));
//!
//! let verdict = rules.evaluate(&answers).expect("answers are well formed");
//! assert!(!verdict.is_eligible());
//! ```

use super::{EligibilityError, StudyDomainError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema version of the baseline screener.
pub const BASELINE_SCHEMA_VERSION: u32 = 1;

/// Minimum age accepted by the baseline rule set.
const BASELINE_MINIMUM_AGE: i64 = 18;

/// A single typed screener answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScreenerValue {
    /// Yes/no answer.
    Boolean(bool),
    /// Whole-number answer.
    Integer(i64),
    /// Free-text or choice answer.
    Text(String),
}

impl ScreenerValue {
    /// Reads the value as an integer, accepting numeric text.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Boolean(_) => None,
        }
    }

    /// Reads the value as a yes/no flag, accepting `yes`/`no`/`true`/`false`
    /// text.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Some(true),
                "no" | "false" => Some(false),
                _ => None,
            },
            Self::Integer(_) => None,
        }
    }

    /// Compares two answers using screener matching rules.
    ///
    /// Text compares trimmed and case-insensitively. Mixed representations
    /// match when both read as the same flag or the same integer.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => {
                left.trim().eq_ignore_ascii_case(right.trim())
            }
            (Self::Integer(left), Self::Integer(right)) => left == right,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            _ => {
                if let (Some(left), Some(right)) = (self.as_flag(), other.as_flag()) {
                    return left == right;
                }
                matches!(
                    (self.as_integer(), other.as_integer()),
                    (Some(left), Some(right)) if left == right
                )
            }
        }
    }

    fn from_json(question: &str, value: &serde_json::Value) -> Result<Self, EligibilityError> {
        match value {
            serde_json::Value::Bool(flag) => Ok(Self::Boolean(*flag)),
            serde_json::Value::String(text) => Ok(Self::Text(text.clone())),
            serde_json::Value::Number(number) => {
                number
                    .as_i64()
                    .map(Self::Integer)
                    .ok_or_else(|| EligibilityError::MalformedAnswer {
                        question: question.to_owned(),
                        reason: format!("expected a whole number, got {number}"),
                    })
            }
            other => Err(EligibilityError::MalformedAnswer {
                question: question.to_owned(),
                reason: format!("unsupported answer shape: {other}"),
            }),
        }
    }
}

impl fmt::Display for ScreenerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "\"{value}\""),
        }
    }
}

/// Screener answers tagged with the schema version they were collected
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerAnswers {
    schema_version: u32,
    answers: BTreeMap<String, ScreenerValue>,
}

impl ScreenerAnswers {
    /// Creates an empty answer set for the given schema version.
    #[must_use]
    pub const fn new(schema_version: u32) -> Self {
        Self {
            schema_version,
            answers: BTreeMap::new(),
        }
    }

    /// Creates an empty answer set for the baseline screener.
    #[must_use]
    pub const fn baseline() -> Self {
        Self::new(BASELINE_SCHEMA_VERSION)
    }

    /// Adds or replaces an answer.
    #[must_use]
    pub fn with_answer(mut self, question: impl Into<String>, value: ScreenerValue) -> Self {
        self.answers.insert(question.into(), value);
        self
    }

    /// Builds answers from a free-form JSON object as received from a form.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::MalformedAnswer`] when the payload is not
    /// an object or an answer is not a boolean, whole number, or string.
    pub fn from_json(
        schema_version: u32,
        payload: &serde_json::Value,
    ) -> Result<Self, EligibilityError> {
        let object = payload
            .as_object()
            .ok_or_else(|| EligibilityError::MalformedAnswer {
                question: String::new(),
                reason: "screener responses must be a JSON object".to_owned(),
            })?;
        let answers = object
            .iter()
            .map(|(question, value)| {
                ScreenerValue::from_json(question, value).map(|parsed| (question.clone(), parsed))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self {
            schema_version,
            answers,
        })
    }

    /// Returns the schema version.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Returns the answer for a question, if present.
    #[must_use]
    pub fn get(&self, question: &str) -> Option<&ScreenerValue> {
        self.answers.get(question)
    }

    /// Returns all answers keyed by question.
    #[must_use]
    pub const fn answers(&self) -> &BTreeMap<String, ScreenerValue> {
        &self.answers
    }
}

/// One predicate of an eligibility rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityCriterion {
    /// The numeric answer must be at least `minimum`.
    MinimumValue {
        /// Question key.
        question: String,
        /// Inclusive lower bound.
        minimum: i64,
    },
    /// The numeric answer must be at most `maximum`.
    MaximumValue {
        /// Question key.
        question: String,
        /// Inclusive upper bound.
        maximum: i64,
    },
    /// The answer must match `expected`.
    RequiredAnswer {
        /// Question key.
        question: String,
        /// Answer the participant must give.
        expected: ScreenerValue,
    },
    /// The answer must not match any of `values`. An unanswered question
    /// does not disqualify.
    DisqualifyingAnswer {
        /// Question key.
        question: String,
        /// Answers that exclude the participant.
        values: Vec<ScreenerValue>,
    },
}

impl EligibilityCriterion {
    /// Returns the question key the criterion reads.
    #[must_use]
    pub fn question(&self) -> &str {
        match self {
            Self::MinimumValue { question, .. }
            | Self::MaximumValue { question, .. }
            | Self::RequiredAnswer { question, .. }
            | Self::DisqualifyingAnswer { question, .. } => question,
        }
    }

    /// Returns `Ok(true)` when the answers satisfy this criterion.
    fn is_met_by(&self, answers: &ScreenerAnswers) -> Result<bool, EligibilityError> {
        match self {
            Self::MinimumValue { question, minimum } => {
                integer_answer(answers, question).map(|value| value >= *minimum)
            }
            Self::MaximumValue { question, maximum } => {
                integer_answer(answers, question).map(|value| value <= *maximum)
            }
            Self::RequiredAnswer { question, expected } => {
                required_answer(answers, question).map(|value| value.matches(expected))
            }
            Self::DisqualifyingAnswer { question, values } => Ok(answers
                .get(question)
                .is_none_or(|value| !values.iter().any(|excluded| value.matches(excluded)))),
        }
    }
}

impl fmt::Display for EligibilityCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinimumValue { question, minimum } => write!(f, "{question} >= {minimum}"),
            Self::MaximumValue { question, maximum } => write!(f, "{question} <= {maximum}"),
            Self::RequiredAnswer { question, expected } => write!(f, "{question} == {expected}"),
            Self::DisqualifyingAnswer { question, values } => {
                let excluded: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{question} not in [{}]", excluded.join(", "))
            }
        }
    }
}

fn required_answer<'a>(
    answers: &'a ScreenerAnswers,
    question: &str,
) -> Result<&'a ScreenerValue, EligibilityError> {
    answers
        .get(question)
        .ok_or_else(|| EligibilityError::MissingAnswer(question.to_owned()))
}

fn integer_answer(answers: &ScreenerAnswers, question: &str) -> Result<i64, EligibilityError> {
    let value = required_answer(answers, question)?;
    value
        .as_integer()
        .ok_or_else(|| EligibilityError::MalformedAnswer {
            question: question.to_owned(),
            reason: format!("expected a whole number, got {value}"),
        })
}

/// Per-study eligibility rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRuleSet {
    schema_version: u32,
    criteria: Vec<EligibilityCriterion>,
}

impl EligibilityRuleSet {
    /// Creates a rule set for the given screener schema.
    ///
    /// # Errors
    ///
    /// Returns [`StudyDomainError::EmptyQuestion`] when a criterion names a
    /// blank question key.
    pub fn new(
        schema_version: u32,
        criteria: Vec<EligibilityCriterion>,
    ) -> Result<Self, StudyDomainError> {
        if criteria
            .iter()
            .any(|criterion| criterion.question().trim().is_empty())
        {
            return Err(StudyDomainError::EmptyQuestion);
        }
        Ok(Self {
            schema_version,
            criteria,
        })
    }

    /// Returns the baseline rule set: adults who do not currently smoke.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            schema_version: BASELINE_SCHEMA_VERSION,
            criteria: vec![
                EligibilityCriterion::MinimumValue {
                    question: "age".to_owned(),
                    minimum: BASELINE_MINIMUM_AGE,
                },
                EligibilityCriterion::RequiredAnswer {
                    question: "smoker".to_owned(),
                    expected: ScreenerValue::Text("no".to_owned()),
                },
            ],
        }
    }

    /// Returns the screener schema version these rules read.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Returns the criteria in evaluation order.
    #[must_use]
    pub fn criteria(&self) -> &[EligibilityCriterion] {
        &self.criteria
    }

    /// Evaluates screener answers against every criterion.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError`] when the schema versions differ, a
    /// required answer is missing, or an answer has the wrong shape.
    pub fn evaluate(
        &self,
        answers: &ScreenerAnswers,
    ) -> Result<EligibilityVerdict, EligibilityError> {
        if answers.schema_version() != self.schema_version {
            return Err(EligibilityError::SchemaVersionMismatch {
                expected: self.schema_version,
                actual: answers.schema_version(),
            });
        }

        let mut unmet = Vec::new();
        for criterion in &self.criteria {
            if !criterion.is_met_by(answers)? {
                unmet.push(criterion.to_string());
            }
        }
        Ok(EligibilityVerdict::from_unmet(unmet))
    }
}

impl Default for EligibilityRuleSet {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Outcome of evaluating screener answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    is_eligible: bool,
    unmet_criteria: Vec<String>,
}

impl EligibilityVerdict {
    /// Builds a verdict from the criteria that were not met; an empty list
    /// is an eligible verdict.
    #[must_use]
    pub fn from_unmet(unmet_criteria: Vec<String>) -> Self {
        Self {
            is_eligible: unmet_criteria.is_empty(),
            unmet_criteria,
        }
    }

    /// Returns `true` when every criterion was met.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.is_eligible
    }

    /// Returns a description of each criterion that was not met.
    #[must_use]
    pub fn unmet_criteria(&self) -> &[String] {
        &self.unmet_criteria
    }
}
