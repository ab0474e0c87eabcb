use serde::{Deserialize, Serialize};

use crate::validation::{Checker, Validate, ValidationError};

/// Portfolio entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
}

/// Technologies arrive either as a JSON array or as the comma-separated
/// text of the admin form field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<String>),
    Csv(String),
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(list) => list,
            TagList::Csv(text) => text.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub technologies: Option<TagList>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
}

impl Validate for ProjectInput {
    type Output = NewProject;

    fn validate(self) -> Result<NewProject, ValidationError> {
        let mut c = Checker::new();
        let title = c.text("title", self.title, 2);
        let description = c.text("description", self.description, 10);
        let image_url = c.optional_url("image_url", self.image_url);
        let technologies = c.tags(
            "technologies",
            self.technologies.map(TagList::into_vec).unwrap_or_default(),
            1,
        );
        let url = c.optional_url("url", self.url);
        c.finish(NewProject { title, description, image_url, technologies, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_technologies_are_rejected() {
        let input: ProjectInput = serde_json::from_value(json!({
            "title": "Fleet tracker",
            "description": "Realtime telemetry for delivery vans",
            "technologies": []
        }))
        .unwrap();
        assert_eq!(input.validate().unwrap_err().field, "technologies");
    }

    #[test]
    fn comma_separated_technologies_are_split() {
        let input: ProjectInput = serde_json::from_value(json!({
            "title": "Fleet tracker",
            "description": "Realtime telemetry for delivery vans",
            "technologies": "Rust, Postgres , ,Kafka"
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert_eq!(draft.technologies, vec!["Rust", "Postgres", "Kafka"]);
    }
}
