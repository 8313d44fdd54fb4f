use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Pyq,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Pyq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Pyq => "PYQ",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid difficulty. Must be one of: {}",
                    Difficulty::ALL.map(|d| d.as_str()).join(", ")
                )
            })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical option slot of a question. Graders always compare against these
/// labels, never against a presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(format!(
                "Invalid selected_option '{}'. Must be one of: A, B, C, D",
                other
            )),
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a question came from: curated previous-year papers or the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionSource {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "PYQ")]
    Pyq,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Ai => "AI",
            QuestionSource::Pyq => "PYQ",
        }
    }
}

impl FromStr for QuestionSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI" => Ok(QuestionSource::Ai),
            "PYQ" => Ok(QuestionSource::Pyq),
            other => Err(format!("Unknown question source '{}'", other)),
        }
    }
}

/// The (exam, subject, topic, difficulty) key that identifies a class of questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryTuple {
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
}

impl CategoryTuple {
    pub fn new(
        exam: impl Into<String>,
        subject: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            exam: exam.into(),
            subject: subject.into(),
            topic: topic.into(),
            difficulty,
        }
    }
}

impl fmt::Display for CategoryTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.exam, self.subject, self.topic, self.difficulty
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub exam: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: OptionLabel,
    pub explanation: String,
    pub source: QuestionSource,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// A curated (previous-year) question with a fresh identity.
    pub fn curated(
        category: &CategoryTuple,
        question_text: &str,
        options: [&str; 4],
        correct_option: OptionLabel,
        explanation: &str,
    ) -> Self {
        let [a, b, c, d] = options;
        Self {
            id: Uuid::new_v4(),
            exam: category.exam.clone(),
            subject: category.subject.clone(),
            topic: category.topic.clone(),
            difficulty: category.difficulty,
            question_text: question_text.to_string(),
            option_a: a.to_string(),
            option_b: b.to_string(),
            option_c: c.to_string(),
            option_d: d.to_string(),
            correct_option,
            explanation: explanation.to_string(),
            source: QuestionSource::Pyq,
            created_at: Utc::now(),
        }
    }

    pub fn category(&self) -> CategoryTuple {
        CategoryTuple::new(
            self.exam.clone(),
            self.subject.clone(),
            self.topic.clone(),
            self.difficulty,
        )
    }

    pub fn matches(&self, category: &CategoryTuple) -> bool {
        self.exam == category.exam
            && self.subject == category.subject
            && self.topic == category.topic
            && self.difficulty == category.difficulty
    }

    pub fn option_text(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.option_a,
            OptionLabel::B => &self.option_b,
            OptionLabel::C => &self.option_c,
            OptionLabel::D => &self.option_d,
        }
    }

    /// The four options in canonical A-D order.
    pub fn options(&self) -> [(OptionLabel, &str); 4] {
        OptionLabel::ALL.map(|label| (label, self.option_text(label)))
    }

    pub fn is_correct(&self, selected: Option<OptionLabel>) -> bool {
        selected == Some(self.correct_option)
    }
}
