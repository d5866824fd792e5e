use quaderno_types::Color;
use serde::Deserialize;

use crate::quiz::QuizEntry;

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Root of the course JSON. A document without an `areas` array is
/// rejected before any page is created.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Course {
    pub areas: Vec<Area>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Area {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Chapter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Topics either nest their templates under modules or carry them
/// directly; data entry was inconsistent about this, so both are accepted.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Topic {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub banner_color: Option<Color>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Module {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// One content unit. Consecutive templates with the same id are a single
/// logical unit split across entries for data-entry reasons; the walker
/// derives the continuation flags from id equality.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Template {
    #[serde(default, deserialize_with = "crate::course::id_as_string")]
    pub id: String,
    #[serde(default, alias = "text_md", deserialize_with = "one_or_many")]
    pub text: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub roadsigns: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub videos: Vec<String>,
    #[serde(default)]
    pub quiz: Vec<QuizEntry>,
}

pub(crate) fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Num(u64),
        Str(String),
    }
    Ok(match IdValue::deserialize(deserializer)? {
        IdValue::Num(n) => n.to_string(),
        IdValue::Str(s) => s,
    })
}

impl Template {
    /// Text items with empty entries dropped and surrounding whitespace
    /// trimmed, the way the layouts consume them.
    pub fn cleaned_text(&self) -> Vec<String> {
        self.text
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
