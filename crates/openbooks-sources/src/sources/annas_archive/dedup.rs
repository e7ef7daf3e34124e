use std::collections::HashSet;

/// Identifiers already accepted during one search call.
#[derive(Debug, Default)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `false` when it was already seen.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_is_rejected() {
        let mut seen = SeenIds::new();
        assert!(seen.insert("abc"));
        assert!(!seen.insert("abc"));
        assert!(seen.insert("def"));
        assert!(!seen.insert("def"));
    }
}
