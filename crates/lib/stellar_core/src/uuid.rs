// Helpers for generating and parsing document identifiers.
//
// Bodies, planets and log entries use UUIDv7 so that creation order is also
// id order. Users keep PG's gen_random_uuid() (v4) since their order is
// irrelevant.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse an identifier taken from a request path.
///
/// Returns `None` for anything that is not a syntactically valid UUID so the
/// caller can reject it before touching the store.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::try_parse(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuidv7_is_valid() {
        let id = uuidv7();
        assert_eq!(id.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn uuidv7_is_monotonic() {
        let a = uuidv7();
        let b = uuidv7();
        assert!(b >= a);
    }

    #[test]
    fn parse_id_accepts_hyphenated_form() {
        let id = uuidv7();
        assert_eq!(parse_id(&id.to_string()), Some(id));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id("not-an-id"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("65f1c2a9e4b0a1b2c3d4e5f6"), None);
    }
}
