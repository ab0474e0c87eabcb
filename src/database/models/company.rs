use serde::{Deserialize, Serialize};

use crate::validation::{Checker, Validate, ValidationError};

/// Partner/client company shown in the logo strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub logo_url: String,
    pub website: Option<String>,
}

/// Raw admin form body
#[derive(Debug, Default, Deserialize)]
pub struct CompanyInput {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
}

/// Validated row ready for insert/update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCompany {
    pub name: String,
    pub logo_url: String,
    pub website: Option<String>,
}

impl Validate for CompanyInput {
    type Output = NewCompany;

    fn validate(self) -> Result<NewCompany, ValidationError> {
        let mut c = Checker::new();
        let name = c.text("name", self.name, 2);
        let logo_url = c.url("logo_url", self.logo_url);
        let website = c.optional_url("website", self.website);
        c.finish(NewCompany { name, logo_url, website })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_logo_url_is_reported_on_logo_url() {
        let input = CompanyInput {
            name: Some("Acme".into()),
            logo_url: Some("not-a-url".into()),
            website: None,
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "logo_url");
    }

    #[test]
    fn website_is_optional() {
        let input = CompanyInput {
            name: Some("Acme".into()),
            logo_url: Some("https://x/y.png".into()),
            website: Some("".into()),
        };
        let draft = input.validate().unwrap();
        assert_eq!(draft.website, None);
        assert_eq!(draft.logo_url, "https://x/y.png");
    }
}
