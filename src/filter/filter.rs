use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{FilterData, SqlResult};

pub struct Filter {
    table_name: String,
    data: FilterData,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self { table_name, data: FilterData::default() })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        for info in &data.order {
            Self::validate_column_name(&info.column)?;
        }
        if data.limit == Some(0) {
            return Err(FilterError::InvalidLimit("Limit must be positive".to_string()));
        }
        self.data = data;
        Ok(self)
    }

    /// Build `SELECT row_to_json(t) ...` so rows come back as JSON objects
    /// regardless of the table's column set.
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = Vec::new();
        let mut inner = format!("SELECT * FROM \"{}\"", self.table_name);

        if let Some(id) = self.data.id {
            params.push(id);
            inner.push_str(&format!(" WHERE \"id\" = ${}", params.len()));
        }

        let order = FilterOrder::generate(&self.data.order)?;
        if !order.is_empty() {
            inner.push(' ');
            inner.push_str(&order);
        }

        if let Some(limit) = self.data.limit {
            inner.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM ({}) t", inner),
            params,
        })
    }

    /// Query-string pairs for the hosted REST dialect
    pub fn to_rest_query(&self) -> Result<Vec<(String, String)>, FilterError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        if let Some(id) = self.data.id {
            query.push(("id".to_string(), format!("eq.{}", id)));
        }
        if let Some(order) = FilterOrder::generate_rest(&self.data.order)? {
            query.push(("order".to_string(), order));
        }
        if let Some(limit) = self.data.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        Ok(query)
    }

    pub fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if Self::is_identifier(name) {
            Ok(())
        } else {
            Err(FilterError::InvalidTableName(name.to_string()))
        }
    }

    pub fn validate_column_name(name: &str) -> Result<(), FilterError> {
        if Self::is_identifier(name) {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(name.to_string()))
        }
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOrderInfo;

    #[test]
    fn builds_plain_select() {
        let filter = Filter::new("courses").unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"courses\") t");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn builds_id_lookup_with_order_and_limit() {
        let mut filter = Filter::new("inquiries").unwrap();
        filter
            .assign(FilterData {
                id: Some(7),
                order: vec![FilterOrderInfo::desc("created_at")],
                limit: Some(1),
            })
            .unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"inquiries\" WHERE \"id\" = $1 ORDER BY \"created_at\" DESC LIMIT 1) t"
        );
        assert_eq!(sql.params, vec![7]);

        let rest = filter.to_rest_query().unwrap();
        assert!(rest.contains(&("id".to_string(), "eq.7".to_string())));
        assert!(rest.contains(&("order".to_string(), "created_at.desc".to_string())));
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert!(Filter::new("courses\"; --").is_err());
        assert!(Filter::new("1courses").is_err());
        assert!(Filter::new("").is_err());
    }
}
