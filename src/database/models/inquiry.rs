use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Checker, Validate, ValidationError};

/// Contact form submission; never updated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InquiryInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// `created_at` is left to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl Validate for InquiryInput {
    type Output = NewInquiry;

    fn validate(self) -> Result<NewInquiry, ValidationError> {
        let mut c = Checker::new();
        let name = c.text("name", self.name, 2);
        let email = c.email("email", self.email);
        let subject = c.text("subject", self.subject, 2);
        let message = c.text("message", self.message, 10);
        c.finish(NewInquiry { name, email, subject, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_email_is_rejected() {
        let input = InquiryInput {
            name: Some("Grace".into()),
            email: Some("grace.example.com".into()),
            subject: Some("Training".into()),
            message: Some("Do you run on-site workshops?".into()),
        };
        assert_eq!(input.validate().unwrap_err().field, "email");
    }
}
