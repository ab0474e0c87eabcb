/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::filter::FilterOrderInfo;

/// Store operations, used for logging and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Select,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Select => "select",
        };
        f.write_str(s)
    }
}

/// The four record kinds managed by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Company,
    Course,
    Project,
    Inquiry,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Company,
        Resource::Course,
        Resource::Project,
        Resource::Inquiry,
    ];

    /// Backing table name, also used as the path segment on the wire
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Company => "companies",
            Resource::Course => "courses",
            Resource::Project => "projects",
            Resource::Inquiry => "inquiries",
        }
    }

    /// Columns of the provisioned table, `id` first
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Resource::Company => &["id", "name", "logo_url", "website"],
            Resource::Course => &["id", "title", "description", "duration", "price", "image_url"],
            Resource::Project => &["id", "title", "description", "image_url", "technologies", "url"],
            Resource::Inquiry => &["id", "name", "email", "subject", "message", "created_at"],
        }
    }

    /// Inquiries are immutable once submitted
    pub fn supports_update(&self) -> bool {
        !matches!(self, Resource::Inquiry)
    }

    /// Display ordering used by list endpoints
    pub fn default_order(&self) -> FilterOrderInfo {
        match self {
            Resource::Inquiry => FilterOrderInfo::desc("created_at"),
            _ => FilterOrderInfo::asc("id"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Company => "company",
            Resource::Course => "course",
            Resource::Project => "project",
            Resource::Inquiry => "inquiry",
        };
        f.write_str(s)
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "companies" | "company" => Ok(Resource::Company),
            "courses" | "course" => Ok(Resource::Course),
            "projects" | "project" => Ok(Resource::Project),
            "inquiries" | "inquiry" => Ok(Resource::Inquiry),
            other => Err(format!("unknown resource '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plural_and_singular_names() {
        assert_eq!("courses".parse::<Resource>().unwrap(), Resource::Course);
        assert_eq!("Inquiry".parse::<Resource>().unwrap(), Resource::Inquiry);
        assert!("users".parse::<Resource>().is_err());
    }

    #[test]
    fn table_names_round_trip_through_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.table().parse::<Resource>().unwrap(), resource);
        }
    }

    #[test]
    fn only_inquiries_are_immutable() {
        assert!(Resource::Company.supports_update());
        assert!(Resource::Course.supports_update());
        assert!(Resource::Project.supports_update());
        assert!(!Resource::Inquiry.supports_update());
    }
}
