pub mod company;
pub mod course;
pub mod inquiry;
pub mod project;

pub use company::{Company, CompanyInput, NewCompany};
pub use course::{Course, CourseInput, NewCourse, PLACEHOLDER_IMAGE};
pub use inquiry::{Inquiry, InquiryInput, NewInquiry};
pub use project::{NewProject, Project, ProjectInput, TagList};

use serde::Serialize;

use crate::types::Resource;

/// Any persisted record, serialized as its bare struct
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Company(Company),
    Course(Course),
    Project(Project),
    Inquiry(Inquiry),
}

impl Record {
    pub fn id(&self) -> i64 {
        match self {
            Record::Company(r) => r.id,
            Record::Course(r) => r.id,
            Record::Project(r) => r.id,
            Record::Inquiry(r) => r.id,
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Record::Company(_) => Resource::Company,
            Record::Course(_) => Resource::Course,
            Record::Project(_) => Resource::Project,
            Record::Inquiry(_) => Resource::Inquiry,
        }
    }
}

impl From<Company> for Record {
    fn from(r: Company) -> Self { Record::Company(r) }
}

impl From<Course> for Record {
    fn from(r: Course) -> Self { Record::Course(r) }
}

impl From<Project> for Record {
    fn from(r: Project) -> Self { Record::Project(r) }
}

impl From<Inquiry> for Record {
    fn from(r: Inquiry) -> Self { Record::Inquiry(r) }
}
