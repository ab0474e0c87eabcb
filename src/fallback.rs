//! Built-in catalog served when the store is unavailable, unconfigured or
//! empty, so public pages render before the operator provisions anything.

use chrono::{DateTime, Utc};

use crate::database::models::{Company, Course, Inquiry, Project, Record, PLACEHOLDER_IMAGE};
use crate::types::Resource;

/// 2024-01-15T09:00:00Z
const SAMPLE_INQUIRY_TIMESTAMP: i64 = 1_705_309_200;

pub fn courses() -> Vec<Course> {
    vec![
        Course {
            id: 1,
            title: "Full-Stack Web Development".to_string(),
            description: "Build and deploy production web applications from database to browser, with code review on every project.".to_string(),
            duration: "12 weeks".to_string(),
            price: 1499.0,
            image_url: PLACEHOLDER_IMAGE.to_string(),
        },
        Course {
            id: 2,
            title: "Data Engineering with Python".to_string(),
            description: "Design reliable data pipelines, model warehouses and automate reporting with modern tooling.".to_string(),
            duration: "10 weeks".to_string(),
            price: 1299.0,
            image_url: PLACEHOLDER_IMAGE.to_string(),
        },
        Course {
            id: 3,
            title: "Cloud & DevOps Foundations".to_string(),
            description: "Containers, CI/CD pipelines and infrastructure as code for teams shipping to the cloud.".to_string(),
            duration: "8 weeks".to_string(),
            price: 999.0,
            image_url: PLACEHOLDER_IMAGE.to_string(),
        },
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            title: "Learning Management Platform".to_string(),
            description: "Course delivery portal with progress tracking, cohort scheduling and instructor dashboards.".to_string(),
            image_url: None,
            technologies: vec!["Next.js".to_string(), "PostgreSQL".to_string(), "Tailwind CSS".to_string()],
            url: None,
        },
        Project {
            id: 2,
            title: "Logistics Tracking Dashboard".to_string(),
            description: "Realtime shipment visibility for a regional carrier, replacing spreadsheet-based dispatch.".to_string(),
            image_url: None,
            technologies: vec!["React".to_string(), "Node.js".to_string(), "WebSockets".to_string()],
            url: None,
        },
        Project {
            id: 3,
            title: "Clinic Booking App".to_string(),
            description: "Mobile-first appointment booking with reminders and staff calendar sync.".to_string(),
            image_url: None,
            technologies: vec!["React Native".to_string(), "Firebase".to_string()],
            url: None,
        },
    ]
}

pub fn companies() -> Vec<Company> {
    vec![
        Company {
            id: 1,
            name: "Northwind Traders".to_string(),
            logo_url: "https://placehold.co/160x80?text=Northwind".to_string(),
            website: None,
        },
        Company {
            id: 2,
            name: "Contoso Ltd".to_string(),
            logo_url: "https://placehold.co/160x80?text=Contoso".to_string(),
            website: None,
        },
        Company {
            id: 3,
            name: "Fabrikam".to_string(),
            logo_url: "https://placehold.co/160x80?text=Fabrikam".to_string(),
            website: None,
        },
        Company {
            id: 4,
            name: "Tailspin Toys".to_string(),
            logo_url: "https://placehold.co/160x80?text=Tailspin".to_string(),
            website: None,
        },
    ]
}

pub fn inquiries() -> Vec<Inquiry> {
    vec![Inquiry {
        id: 1,
        name: "Sample Visitor".to_string(),
        email: "visitor@example.com".to_string(),
        subject: "Welcome".to_string(),
        message: "Inquiries submitted through the contact form will appear here once the store is set up.".to_string(),
        created_at: DateTime::<Utc>::from_timestamp(SAMPLE_INQUIRY_TIMESTAMP, 0).unwrap_or_default(),
    }]
}

/// Fallback list for any resource; never empty
pub fn records(resource: Resource) -> Vec<Record> {
    match resource {
        Resource::Company => companies().into_iter().map(Record::from).collect(),
        Resource::Course => courses().into_iter().map(Record::from).collect(),
        Resource::Project => projects().into_iter().map(Record::from).collect(),
        Resource::Inquiry => inquiries().into_iter().map(Record::from).collect(),
    }
}
