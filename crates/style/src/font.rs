use std::collections::HashMap;

/// Prioritized font lookup: a requested family is first normalized through
/// the alias table, then tried together with the general candidate list.
/// The surface decides which names actually exist; this type only produces
/// the order in which to try them.
#[derive(Debug, Clone)]
pub struct FontCatalog {
    pub default_family: String,
    pub candidates: Vec<String>,
    pub aliases: HashMap<String, String>,
}

impl Default for FontCatalog {
    fn default() -> Self {
        let aliases = HashMap::from([
            (
                "Myriad Pro Condensed".to_string(),
                "Myriad Pro Cond".to_string(),
            ),
            ("Myriad Pro".to_string(), "Myriad Pro Cond".to_string()),
            ("SansSerifCollection".to_string(), "sans-serif".to_string()),
        ]);
        Self {
            default_family: "Arial".to_string(),
            candidates: vec![
                "Myriad Pro Cond".to_string(),
                "Arial".to_string(),
                "Verdana".to_string(),
            ],
            aliases,
        }
    }
}

impl FontCatalog {
    /// Candidate names for `family`, best first, ending with the general
    /// fallback list. Duplicates are removed while keeping the first
    /// occurrence.
    pub fn resolution_order(&self, family: Option<&str>) -> Vec<String> {
        let mut order = Vec::new();
        if let Some(requested) = family {
            order.push(requested.to_string());
            if let Some(alias) = self.aliases.get(requested) {
                order.push(alias.clone());
            }
            // Spelling variants commonly seen across installations.
            order.push(requested.replace(' ', ""));
            order.push(requested.replace(' ', "-"));
        }
        order.push(self.default_family.clone());
        order.extend(self.candidates.iter().cloned());

        let mut seen = std::collections::HashSet::new();
        order.retain(|name| seen.insert(name.clone()));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_is_tried_right_after_the_request() {
        let catalog = FontCatalog::default();
        let order = catalog.resolution_order(Some("Myriad Pro"));
        assert_eq!(order[0], "Myriad Pro");
        assert_eq!(order[1], "Myriad Pro Cond");
        assert!(order.contains(&"Arial".to_string()));
    }

    #[test]
    fn no_request_starts_with_default() {
        let catalog = FontCatalog::default();
        let order = catalog.resolution_order(None);
        assert_eq!(order[0], "Arial");
        // Deduplicated: Arial appears once even though it is also a candidate.
        assert_eq!(order.iter().filter(|n| *n == "Arial").count(), 1);
    }
}
