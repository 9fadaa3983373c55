//! Registry of known resources.

use std::collections::HashMap;

use super::resources::{
    EuropePmcStrategy, OlsStrategy, ResourceStrategy, SolrStrategy, UniprotStrategy,
};

/// Known services keyed by normalized resource name.
pub struct ResourceRegistry {
    resources: HashMap<&'static str, Box<dyn ResourceStrategy>>,
}

impl ResourceRegistry {
    /// Create a registry with all built-in services.
    pub fn new() -> Self {
        let mut registry = Self {
            resources: HashMap::new(),
        };

        registry.register(Box::new(OlsStrategy::all_ontologies()));
        registry.register(Box::new(OlsStrategy::gene_ontology()));
        registry.register(Box::new(SolrStrategy::emdb()));
        registry.register(Box::new(UniprotStrategy));
        registry.register(Box::new(SolrStrategy::pdb()));
        registry.register(Box::new(EuropePmcStrategy));
        registry.register(Box::new(SolrStrategy::empiar()));

        registry
    }

    /// Register a strategy under its spec key.
    pub fn register(&mut self, strategy: Box<dyn ResourceStrategy>) {
        self.resources.insert(strategy.spec().key, strategy);
    }

    /// Look up a resource; matching ignores case, spaces, hyphens and underscores.
    pub fn get(&self, name: &str) -> Option<&dyn ResourceStrategy> {
        self.resources
            .get(normalize_key(name).as_str())
            .map(|s| s.as_ref())
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.resources.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a resource name to a registry key.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resources() {
        let registry = ResourceRegistry::new();
        assert_eq!(
            registry.keys(),
            vec!["emdb", "empiar", "europepmc", "go", "ols", "pdb", "uniprot"]
        );
    }

    #[test]
    fn test_lookup_is_forgiving() {
        let registry = ResourceRegistry::new();

        assert_eq!(registry.get("Europe PMC").unwrap().spec().name, "Europe PMC");
        assert_eq!(registry.get("europe_pmc").unwrap().spec().key, "europepmc");
        assert_eq!(registry.get("UniProt").unwrap().spec().key, "uniprot");
        assert_eq!(registry.get("EMDB").unwrap().spec().key, "emdb");
        assert!(registry.get("ncit").is_none());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" Europe-PMC "), "europepmc");
        assert_eq!(normalize_key("NCBI_Taxon"), "ncbitaxon");
    }
}
