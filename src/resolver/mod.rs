//! External reference resolution.
//!
//! Turns `(resource, url, accession)` into a human readable label and
//! description by querying the matching public service. Lookups are
//! blocking and issued one at a time; any failure is reported as a
//! [`ResolveError`] that callers treat as a warning.
//!
//! Resource names not in the [`ResourceRegistry`] are taken to be ontology
//! prefixes and looked up through OLS restricted to that ontology.

mod error;
mod http;
mod registry;
mod resources;

use std::time::Duration;

pub use error::ResolveError;
pub use http::{HttpClient, HttpResponse, OfflineClient, UreqClient};
pub use registry::{ResourceRegistry, normalize_key};
pub use resources::{
    EuropePmcStrategy, LookupResults, OlsStrategy, Resolution, ResourceSpec, ResourceStrategy,
    ResponseShape, SolrStrategy, UniprotStrategy, value_at,
};

#[cfg(test)]
pub(crate) use http::testing;

use crate::config::ResolverConfig;
use crate::model::ExternalReference;

/// Resolves external references through an [`HttpClient`].
pub struct Resolver {
    registry: ResourceRegistry,
    client: Box<dyn HttpClient>,
}

impl Resolver {
    /// Create a resolver using `client` for every request.
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self {
            registry: ResourceRegistry::new(),
            client,
        }
    }

    /// Create a resolver that never touches the network.
    pub fn offline() -> Self {
        Self::new(Box::new(OfflineClient))
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        if config.offline {
            log::debug!("Resolver running offline");
            return Self::offline();
        }
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::new(Box::new(UreqClient::new(timeout)))
    }

    /// Known resources.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Look up the label and description of `reference`.
    ///
    /// The first returned record wins when a term matches several entries.
    pub fn resolve(&self, reference: &ExternalReference) -> Result<Resolution, ResolveError> {
        let scoped;
        let strategy: &dyn ResourceStrategy = match self.registry.get(&reference.resource) {
            Some(strategy) => strategy,
            None => {
                scoped = OlsStrategy::scoped(&normalize_key(&reference.resource));
                &scoped
            }
        };
        let resource = strategy.spec().name;

        let term = strategy
            .lookup_term(reference)
            .ok_or_else(|| ResolveError::MissingTerm {
                resource: reference.resource.clone(),
            })?;

        let url = strategy.query_url(&term);
        log::debug!("Resolving {} '{}' via {}", reference.resource, term, url);

        let response = self
            .client
            .get(&url)
            .map_err(|reason| ResolveError::unavailable(resource, &term, reason))?;
        log::trace!(
            "{} answered {} with {} bytes",
            resource,
            response.status,
            response.body.len()
        );

        if response.status != 200 {
            return Err(ResolveError::unavailable(
                resource,
                &term,
                format!("server responded with status {}", response.status),
            ));
        }

        let results = strategy
            .parse(&response.body)
            .map_err(|reason| ResolveError::unavailable(resource, &term, reason))?;

        let record = results.records.first().ok_or_else(|| ResolveError::NoMatch {
            resource: resource.to_string(),
            term: term.clone(),
        })?;

        if results.total.is_some_and(|total| total > 1) {
            log::debug!(
                "{} returned {:?} matches for '{}'; using the first",
                resource,
                results.total,
                term
            );
        }

        Ok(strategy.describe(record))
    }

    /// Resolve `reference` and store the result on it.
    pub fn annotate(&self, reference: &mut ExternalReference) -> Result<(), ResolveError> {
        let resolution = self.resolve(reference)?;
        reference.label = resolution.label;
        reference.description = resolution.description;
        Ok(())
    }
}
