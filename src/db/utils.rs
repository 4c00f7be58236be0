//! Database utility functions.

use sqlx::types::chrono::Utc;

/// Get current datetime as string in SQLite format
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Generate a fresh API key for a newly registered entity.
pub fn generate_api_key() -> String {
    format!("kb_{}", uuid::Uuid::new_v4().simple())
}

/// Encode a string list for a JSON text column.
pub fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text column into a string list, tolerating bad data.
pub fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_sqlite_shape() {
        let ts = current_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }

    #[test]
    fn api_keys_are_unique_and_prefixed() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert!(a.starts_with("kb_"));
        assert_ne!(a, b);
    }

    #[test]
    fn list_columns_survive_a_write_and_read() {
        let skills = vec!["ai".to_string(), "design".to_string()];
        assert_eq!(decode_list(&encode_list(&skills)), skills);
        assert!(decode_list("not json").is_empty());
    }
}
