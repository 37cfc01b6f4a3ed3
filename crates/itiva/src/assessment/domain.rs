use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The four fixed buckets every question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Website Strength", alias = "ws")]
    WebsiteStrength,
    #[serde(rename = "Devices & Network", alias = "dn")]
    DevicesAndNetwork,
    #[serde(rename = "Compliance Documentation", alias = "cd")]
    ComplianceDocumentation,
    #[serde(rename = "Cyber Security Implementations", alias = "cs")]
    CyberSecurityImplementations,
}

/// Divisor for the overall score. Empty categories still count.
pub const CATEGORY_COUNT: usize = 4;

impl Category {
    pub const fn ordered() -> [Category; CATEGORY_COUNT] {
        [
            Category::WebsiteStrength,
            Category::DevicesAndNetwork,
            Category::ComplianceDocumentation,
            Category::CyberSecurityImplementations,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Category::WebsiteStrength => "ws",
            Category::DevicesAndNetwork => "dn",
            Category::ComplianceDocumentation => "cd",
            Category::CyberSecurityImplementations => "cs",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::WebsiteStrength => "Website Strength",
            Category::DevicesAndNetwork => "Devices & Network",
            Category::ComplianceDocumentation => "Compliance Documentation",
            Category::CyberSecurityImplementations => "Cyber Security Implementations",
        }
    }

    /// Accepts either the short key or the display label, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Category::ordered().into_iter().find(|category| {
            category.key().eq_ignore_ascii_case(trimmed)
                || category.label().eq_ignore_ascii_case(trimmed)
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable catalog identifier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point value of an option, guaranteed to lie in `[-2, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct OptionScore(i8);

impl OptionScore {
    pub const MIN: OptionScore = OptionScore(-2);
    pub const MAX: OptionScore = OptionScore(2);

    pub const fn value(self) -> i8 {
        self.0
    }

    pub const fn is_best(self) -> bool {
        self.0 == Self::MAX.0
    }

    /// Position of the score on `[0, 1]`: -2 maps to 0, 2 maps to 1.
    pub fn normalized(self) -> f64 {
        f64::from(self.0 - Self::MIN.0) / f64::from(Self::MAX.0 - Self::MIN.0)
    }
}

impl TryFrom<i8> for OptionScore {
    type Error = ScoreOutOfRange;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }
}

impl From<OptionScore> for i8 {
    fn from(score: OptionScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("option score {0} is outside [-2, 2]")]
pub struct ScoreOutOfRange(pub i8);

/// A selectable answer. Explanation and recommendation are surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub score: OptionScore,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: Category,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, index: usize) -> Option<&AnswerOption> {
        self.options.get(index)
    }

    /// Position of the first option scored 2.
    pub fn best_option_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.score.is_best())
    }

    /// Options with their positions, highest score first. Equal scores keep catalog order.
    pub fn ranked_options(&self) -> Vec<(usize, &AnswerOption)> {
        let mut ranked: Vec<(usize, &AnswerOption)> = self.options.iter().enumerate().collect();
        ranked.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score));
        ranked
    }
}

/// Zero-based position of an option within its question.
pub type OptionIndex = usize;

/// Selected option position per question. May be partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, OptionIndex>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, question: QuestionId, option_index: OptionIndex) -> Self {
        self.select(question, option_index);
        self
    }

    pub fn select(&mut self, question: QuestionId, option_index: OptionIndex) {
        self.0.insert(question, option_index);
    }

    pub fn remove(&mut self, question: QuestionId) -> Option<OptionIndex> {
        self.0.remove(&question)
    }

    pub fn get(&self, question: QuestionId) -> Option<OptionIndex> {
        self.0.get(&question).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, OptionIndex)> + '_ {
        self.0.iter().map(|(question, index)| (*question, *index))
    }
}

impl FromIterator<(QuestionId, OptionIndex)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, OptionIndex)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Desired per-category scores driving synthetic answer generation.
///
/// Values are kept signed so out-of-range input can be reported as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScores {
    pub ws: i32,
    pub dn: i32,
    pub cd: i32,
    pub cs: i32,
}

impl TargetScores {
    pub const fn new(ws: i32, dn: i32, cd: i32, cs: i32) -> Self {
        Self { ws, dn, cd, cs }
    }

    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn get(&self, category: Category) -> i32 {
        match category {
            Category::WebsiteStrength => self.ws,
            Category::DevicesAndNetwork => self.dn,
            Category::ComplianceDocumentation => self.cd,
            Category::CyberSecurityImplementations => self.cs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub ws: u8,
    pub dn: u8,
    pub cd: u8,
    pub cs: u8,
}

impl CategoryScores {
    pub const fn get(&self, category: Category) -> u8 {
        match category {
            Category::WebsiteStrength => self.ws,
            Category::DevicesAndNetwork => self.dn,
            Category::ComplianceDocumentation => self.cd,
            Category::CyberSecurityImplementations => self.cs,
        }
    }

    pub fn set(&mut self, category: Category, score: u8) {
        match category {
            Category::WebsiteStrength => self.ws = score,
            Category::DevicesAndNetwork => self.dn = score,
            Category::ComplianceDocumentation => self.cd = score,
            Category::CyberSecurityImplementations => self.cs = score,
        }
    }

    pub fn total(&self) -> u32 {
        Category::ordered()
            .into_iter()
            .map(|category| u32::from(self.get(category)))
            .sum()
    }
}

/// Improvement suggestion for one non-maximal answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub text: String,
    /// Points recoverable in the category by switching to the best option.
    pub impact_score: u8,
    pub category: Category,
    pub question_id: QuestionId,
}

/// Scores and ranked recommendations for one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    #[serde(flatten)]
    pub scores: CategoryScores,
    pub overall: u8,
    pub recommendations: Vec<Recommendation>,
}

/// Synthetic answers together with the report they produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub answers: AnswerSet,
    pub report: AssessmentReport,
}
