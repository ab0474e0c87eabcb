use serde::{Deserialize, Serialize};

/// Narrow query description understood by every store backend:
/// an optional primary-key match, an ordering, and a row cap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    pub id: Option<i64>,
    #[serde(default)]
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<u32>,
}

impl FilterData {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), limit: Some(1), ..Default::default() }
    }

    pub fn ordered(order: FilterOrderInfo) -> Self {
        Self { order: vec![order], ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Suffix used by the hosted REST dialect (`order=created_at.desc`)
    pub fn to_rest(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

impl FilterOrderInfo {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Asc }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Desc }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<i64>,
}
