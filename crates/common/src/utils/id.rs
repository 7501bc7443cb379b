use uuid::Uuid;

/// Generate a unique connection session identifier
/// Format: "sess_" followed by a UUID v4
pub fn generate_session_id() -> String {
    format!("sess_{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_session_id_format() {
        let session_id = generate_session_id();

        assert!(session_id.starts_with("sess_"));
        assert_eq!(session_id.len(), 5 + 36);

        let uuid = Uuid::parse_str(&session_id[5..]).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[test]
    fn test_generate_session_id_uniqueness() {
        let mut ids = HashSet::new();

        for _ in 0..1000 {
            let id = generate_session_id();
            assert!(ids.insert(id), "Generated duplicate session ID");
        }
    }
}
