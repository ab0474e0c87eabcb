use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{check_url, Checker, Validate, ValidationError};

/// Image shown when a course has none of its own
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=200&width=400";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: f64,
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub price: Option<Value>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: f64,
    pub image_url: String,
}

impl Validate for CourseInput {
    type Output = NewCourse;

    fn validate(self) -> Result<NewCourse, ValidationError> {
        let mut c = Checker::new();
        let title = c.text("title", self.title, 2);
        let description = c.text("description", self.description, 10);
        let duration = c.text("duration", self.duration, 1);
        let price = c.number_at_least("price", self.price, 0.0);

        // missing image falls back to the placeholder rather than failing
        let image_url = match self.image_url.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() => PLACEHOLDER_IMAGE.to_string(),
            None => PLACEHOLDER_IMAGE.to_string(),
            Some(v) if v.starts_with('/') => v,
            Some(v) => {
                if let Err(reason) = check_url(&v) {
                    c.fail("image_url", reason);
                }
                v
            }
        };

        c.finish(NewCourse { title, description, duration, price, image_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> CourseInput {
        CourseInput {
            title: Some("Rust in Practice".into()),
            description: Some("Ten weeks of systems programming".into()),
            duration: Some("10 weeks".into()),
            price: Some(json!(899)),
            image_url: None,
        }
    }

    #[test]
    fn missing_image_defaults_to_placeholder() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(draft.price, 899.0);
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut bad = input();
        bad.price = Some(json!(-10));
        assert_eq!(bad.validate().unwrap_err().field, "price");
    }

    #[test]
    fn short_description_is_rejected() {
        let mut bad = input();
        bad.description = Some("short".into());
        assert_eq!(bad.validate().unwrap_err().field, "description");
    }

    #[test]
    fn relative_image_paths_are_kept() {
        let mut ok = input();
        ok.image_url = Some("/images/rust.png".into());
        assert_eq!(ok.validate().unwrap().image_url, "/images/rust.png");
    }
}
