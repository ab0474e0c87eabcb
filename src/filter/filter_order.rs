use super::error::FilterError;
use super::filter::Filter;
use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            Filter::validate_column_name(&info.column)?;
            parts.push(format!("\"{}\" {}", info.column, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    /// Render the `order` query parameter of the hosted REST dialect
    pub fn generate_rest(infos: &[FilterOrderInfo]) -> Result<Option<String>, FilterError> {
        if infos.is_empty() { return Ok(None); }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            Filter::validate_column_name(&info.column)?;
            parts.push(format!("{}.{}", info.column, info.sort.to_rest()));
        }
        Ok(Some(parts.join(",")))
    }
}
