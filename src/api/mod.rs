use serde::Deserialize;

pub mod auth;
pub mod discussions;
pub mod health;
pub mod questions;
pub mod resources;
pub mod swagger;
pub mod users;

/// Tags arrive either as a JSON array or as a comma-separated string,
/// depending on the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Csv(String),
}

impl TagsField {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagsField::List(tags) => tags,
            TagsField::Csv(csv) => csv
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// Presence plus maximum-length check shared by the create/update
/// handlers. `field` is the lowercase label used in messages.
pub(crate) fn require_max_len(
    field: &str,
    value: &str,
    max: usize,
) -> Result<(), crate::utils::error::AppError> {
    if value.trim().is_empty() {
        return Err(crate::utils::error::AppError::Validation(format!(
            "Please provide a {}",
            field
        )));
    }
    if value.chars().count() > max {
        let mut label = field.to_string();
        if let Some(first) = label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        return Err(crate::utils::error::AppError::Validation(format!(
            "{} cannot exceed {} characters",
            label, max
        )));
    }
    Ok(())
}

/// Normalizes page/limit query params: page >= 1, limit in 1..=100.
/// Returns (page, limit, skip).
pub(crate) fn pagination(page: Option<i64>, limit: Option<i64>) -> (i64, i64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    (page, limit, ((page - 1) * limit) as u64)
}

pub(crate) fn page_count(total: u64, limit: i64) -> u64 {
    (total + limit as u64 - 1) / limit as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(pagination(None, None), (1, 10, 0));
        assert_eq!(pagination(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(pagination(Some(0), Some(500)), (1, 100, 0));
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(30, 10), 3);
    }

    #[test]
    fn tags_accept_array_or_csv() {
        let list = TagsField::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.into_vec(), vec!["a", "b"]);

        let csv = TagsField::Csv("a, b, ,c".into());
        assert_eq!(csv.into_vec(), vec!["a", "b", "c"]);
    }
}
