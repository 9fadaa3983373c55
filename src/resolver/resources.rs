//! Per-resource query grammars and response mappings.
//!
//! Each remote service gets a [`ResourceStrategy`]: it builds the query URL
//! for a lookup term, knows where the result list lives in the response, and
//! maps the first record onto a [`Resolution`].

use serde_json::{Map, Value};

use crate::model::ExternalReference;

/// Encoding of a service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// JSON document.
    Json,
    /// Tab-separated rows with a header line.
    Tab,
}

/// Static description of a remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Registry key (normalized resource name).
    pub key: &'static str,
    /// Display name of the service.
    pub name: &'static str,
    /// Endpoint the query string is appended to.
    pub root_url: &'static str,
    /// Encoding of the response body.
    pub shape: ResponseShape,
    /// Path to the list of records in a JSON response.
    pub result_path: &'static [&'static str],
    /// Path to the total hit count in a JSON response.
    pub result_count_path: &'static [&'static str],
}

/// Canonical label/description pair extracted from a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub label: Option<String>,
    pub description: Option<String>,
}

impl Resolution {
    /// True when the record yielded neither field.
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.description.is_none()
    }
}

/// Records extracted from a response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupResults {
    /// Result records, in service order.
    pub records: Vec<Value>,
    /// Total hit count reported by the service, if any.
    pub total: Option<u64>,
}

/// Query grammar and field mapping for one service.
pub trait ResourceStrategy: Send + Sync {
    /// Static description of the service.
    fn spec(&self) -> &ResourceSpec;

    /// Full query URL for `term`.
    fn query_url(&self, term: &str) -> String;

    /// Map one result record to a label/description pair.
    fn describe(&self, record: &Value) -> Resolution;

    /// The term to look up: the accession, or the last path segment of the
    /// URL when the accession is empty.
    fn lookup_term(&self, reference: &ExternalReference) -> Option<String> {
        let accession = reference.accession.trim();
        if !accession.is_empty() {
            return Some(accession.to_string());
        }
        last_path_segment(&reference.url)
    }

    /// Extract result records from a response body.
    fn parse(&self, body: &str) -> Result<LookupResults, String> {
        let spec = self.spec();
        match spec.shape {
            ResponseShape::Json => {
                let json: Value = serde_json::from_str(body)
                    .map_err(|err| format!("invalid JSON response: {err}"))?;
                let records = value_at(&json, spec.result_path)
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or_else(|| {
                        format!("response has no result list at '{}'", spec.result_path.join("."))
                    })?;
                let total = value_at(&json, spec.result_count_path).and_then(Value::as_u64);
                Ok(LookupResults { records, total })
            }
            ResponseShape::Tab => {
                let records = parse_tab(body);
                let total = Some(records.len() as u64);
                Ok(LookupResults { records, total })
            }
        }
    }
}

/// Follow `path` through nested JSON objects.
pub fn value_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Turn tab-separated rows into JSON objects keyed by lowercased header.
fn parse_tab(body: &str) -> Vec<Value> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = header
        .split('\t')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();

    lines
        .map(|line| {
            let row: Map<String, Value> = columns
                .iter()
                .zip(line.split('\t'))
                .map(|(column, cell)| (column.clone(), Value::String(cell.trim().to_string())))
                .collect();
            Value::Object(row)
        })
        .collect()
}

/// Text of a record field; arrays yield their first element.
fn text_field(record: &Value, key: &str) -> Option<String> {
    let value = match record.get(key)? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn last_path_segment(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

const OLS_ROOT: &str = "https://www.ebi.ac.uk/ols4/api/";

pub(crate) const OLS: ResourceSpec = ResourceSpec {
    key: "ols",
    name: "OLS",
    root_url: OLS_ROOT,
    shape: ResponseShape::Json,
    result_path: &["response", "docs"],
    result_count_path: &["response", "numFound"],
};

pub(crate) const GO: ResourceSpec = ResourceSpec {
    key: "go",
    name: "GO",
    ..OLS
};

pub(crate) const EMDB: ResourceSpec = ResourceSpec {
    key: "emdb",
    name: "EMDB",
    root_url: "https://www.ebi.ac.uk/emdb/api/search/",
    shape: ResponseShape::Json,
    result_path: &["response", "docs"],
    result_count_path: &["response", "numFound"],
};

pub(crate) const UNIPROT: ResourceSpec = ResourceSpec {
    key: "uniprot",
    name: "UniProt",
    root_url: "https://rest.uniprot.org/uniprotkb/search",
    shape: ResponseShape::Tab,
    result_path: &[],
    result_count_path: &[],
};

pub(crate) const PDB: ResourceSpec = ResourceSpec {
    key: "pdb",
    name: "PDB",
    root_url: "https://www.ebi.ac.uk/pdbe/search/pdb/select",
    shape: ResponseShape::Json,
    result_path: &["response", "docs"],
    result_count_path: &["response", "numFound"],
};

pub(crate) const EUROPE_PMC: ResourceSpec = ResourceSpec {
    key: "europepmc",
    name: "Europe PMC",
    root_url: "https://www.ebi.ac.uk/europepmc/webservices/rest/search",
    shape: ResponseShape::Json,
    result_path: &["resultList", "result"],
    result_count_path: &["hitCount"],
};

pub(crate) const EMPIAR: ResourceSpec = ResourceSpec {
    key: "empiar",
    name: "EMPIAR",
    root_url: "https://www.ebi.ac.uk/pdbe/search/empiar/select",
    shape: ResponseShape::Json,
    result_path: &["response", "docs"],
    result_count_path: &["response", "numFound"],
};

/// Ontology lookup through OLS, optionally restricted to one ontology.
pub struct OlsStrategy {
    spec: ResourceSpec,
    ontology: Option<String>,
}

impl OlsStrategy {
    /// Search across every ontology.
    pub fn all_ontologies() -> Self {
        Self {
            spec: OLS,
            ontology: None,
        }
    }

    /// Search the Gene Ontology only.
    pub fn gene_ontology() -> Self {
        Self {
            spec: GO,
            ontology: Some("go".to_string()),
        }
    }

    /// Search one ontology by its prefix (e.g. `ncit`, `ncbitaxon`).
    pub fn scoped(ontology: &str) -> Self {
        Self {
            spec: OLS,
            ontology: Some(ontology.trim().to_ascii_lowercase()),
        }
    }

    /// Ontology the search is restricted to.
    pub fn ontology(&self) -> Option<&str> {
        self.ontology.as_deref()
    }
}

impl ResourceStrategy for OlsStrategy {
    fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    fn query_url(&self, term: &str) -> String {
        let mut url = format!(
            "{}search?q={}&exact=on&rows=1&start=0",
            self.spec.root_url,
            encode(term)
        );
        if let Some(ontology) = &self.ontology {
            url.push_str("&local=true&ontology=");
            url.push_str(&encode(ontology));
        }
        url
    }

    fn describe(&self, record: &Value) -> Resolution {
        Resolution {
            label: text_field(record, "label"),
            description: text_field(record, "description"),
        }
    }

    /// Ontology services accept the full IRI, so an empty accession falls
    /// back to the whole URL.
    fn lookup_term(&self, reference: &ExternalReference) -> Option<String> {
        [reference.accession.trim(), reference.url.trim()]
            .into_iter()
            .find(|term| !term.is_empty())
            .map(str::to_string)
    }
}

/// Solr-style entry search used by the EMDB, PDB and EMPIAR indexes.
pub struct SolrStrategy {
    spec: ResourceSpec,
    query_field: Option<&'static str>,
    fields: &'static str,
    label_field: &'static str,
    description_field: &'static str,
}

impl SolrStrategy {
    /// EM density map index: the accession is the label, the entry title
    /// the description.
    pub fn emdb() -> Self {
        Self {
            spec: EMDB,
            query_field: None,
            fields: "emdb_id,title",
            label_field: "emdb_id",
            description_field: "title",
        }
    }

    /// Macromolecular structure index.
    pub fn pdb() -> Self {
        Self {
            spec: PDB,
            query_field: Some("pdb_id"),
            fields: "pdb_id,title,organism_scientific_name",
            label_field: "pdb_id",
            description_field: "title",
        }
    }

    /// Imaging archive index.
    pub fn empiar() -> Self {
        Self {
            spec: EMPIAR,
            query_field: None,
            fields: "title,experiment_type",
            label_field: "title",
            description_field: "experiment_type",
        }
    }
}

impl ResourceStrategy for SolrStrategy {
    fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    fn query_url(&self, term: &str) -> String {
        let query = match self.query_field {
            Some(field) => format!("{}:{}", field, term),
            None => term.to_string(),
        };
        format!(
            "{}?q={}&wt=json&fl={}&start=0&rows=1",
            self.spec.root_url,
            encode(&query),
            self.fields
        )
    }

    fn describe(&self, record: &Value) -> Resolution {
        Resolution {
            label: text_field(record, self.label_field),
            description: text_field(record, self.description_field),
        }
    }
}

/// Protein lookup against UniProtKB, answered as tab-separated rows.
pub struct UniprotStrategy;

impl ResourceStrategy for UniprotStrategy {
    fn spec(&self) -> &ResourceSpec {
        &UNIPROT
    }

    fn query_url(&self, term: &str) -> String {
        format!(
            "{}?query=accession:{}&format=tsv&fields=accession,id,protein_name,organism_name&size=1",
            UNIPROT.root_url,
            encode(term)
        )
    }

    /// Label is the entry name; description is `"<protein names> (Organism: <organism>)"`.
    fn describe(&self, record: &Value) -> Resolution {
        let protein = text_field(record, "protein names");
        let organism = text_field(record, "organism");
        let description = match (protein, organism) {
            (Some(protein), Some(organism)) => Some(format!("{} (Organism: {})", protein, organism)),
            (protein, None) => protein,
            (None, Some(organism)) => Some(format!("(Organism: {})", organism)),
        };
        Resolution {
            label: text_field(record, "entry name"),
            description,
        }
    }
}

/// Literature lookup against Europe PMC.
pub struct EuropePmcStrategy;

impl ResourceStrategy for EuropePmcStrategy {
    fn spec(&self) -> &ResourceSpec {
        &EUROPE_PMC
    }

    fn query_url(&self, term: &str) -> String {
        format!(
            "{}?query={}&resultType=lite&pageSize=1&format=json",
            EUROPE_PMC.root_url,
            encode(&format!("ext_id:{}", term))
        )
    }

    fn describe(&self, record: &Value) -> Resolution {
        Resolution {
            label: text_field(record, "authorString"),
            description: text_field(record, "title"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_at() {
        let doc = json!({"response": {"numFound": 2, "docs": [1, 2]}});
        assert_eq!(value_at(&doc, &["response", "numFound"]), Some(&json!(2)));
        assert_eq!(value_at(&doc, &["response", "missing"]), None);
        assert_eq!(value_at(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_lookup_term_falls_back_to_url() {
        let strategy = SolrStrategy::empiar();
        let reference =
            ExternalReference::new("EMPIAR", "https://www.ebi.ac.uk/pdbe/emdb/empiar/entry/10087/", "");
        assert_eq!(strategy.lookup_term(&reference).as_deref(), Some("10087"));

        let reference = ExternalReference::new("EMPIAR", "", "  ");
        assert_eq!(strategy.lookup_term(&reference), None);
    }

    #[test]
    fn test_ols_lookup_term_uses_iri() {
        let strategy = OlsStrategy::scoped("NCIT");
        let reference = ExternalReference::new("ncit", "http://purl.obolibrary.org/obo/NCIT_C62195", "");

        assert_eq!(strategy.ontology(), Some("ncit"));
        assert_eq!(
            strategy.lookup_term(&reference).as_deref(),
            Some("http://purl.obolibrary.org/obo/NCIT_C62195")
        );
    }

    #[test]
    fn test_query_urls_are_encoded() {
        let url = OlsStrategy::scoped("ncit").query_url("NCIT C62195");
        assert_eq!(
            url,
            "https://www.ebi.ac.uk/ols4/api/search?q=NCIT%20C62195&exact=on&rows=1&start=0&local=true&ontology=ncit"
        );

        let url = SolrStrategy::pdb().query_url("4gzw");
        assert!(url.starts_with("https://www.ebi.ac.uk/pdbe/search/pdb/select?q=pdb_id%3A4gzw&wt=json"));

        let url = EuropePmcStrategy.query_url("30932919");
        assert!(url.contains("query=ext_id%3A30932919"));
    }

    #[test]
    fn test_parse_json_results() {
        let body = r#"{"response": {"numFound": 1, "docs": [{"label": "Wild Type", "description": ["The naturally-occurring version."]}]}}"#;
        let strategy = OlsStrategy::all_ontologies();
        let results = strategy.parse(body).unwrap();

        assert_eq!(results.total, Some(1));
        let resolution = strategy.describe(&results.records[0]);
        assert_eq!(resolution.label.as_deref(), Some("Wild Type"));
        assert_eq!(
            resolution.description.as_deref(),
            Some("The naturally-occurring version.")
        );
    }

    #[test]
    fn test_parse_json_missing_result_list() {
        let strategy = EuropePmcStrategy;
        assert!(strategy.parse(r#"{"hitCount": 0}"#).is_err());
        assert!(strategy.parse("<html>").is_err());
    }

    #[test]
    fn test_uniprot_tab_rows() {
        let body = "Entry\tEntry Name\tProtein names\tOrganism\n\
                    A0A1Q8WSX6\tA0A1Q8WSX6_9ACTO\tType I-E CRISPR-associated protein Cas5/CasD\tActinomyces oris\n";
        let results = UniprotStrategy.parse(body).unwrap();
        assert_eq!(results.total, Some(1));

        let resolution = UniprotStrategy.describe(&results.records[0]);
        assert_eq!(resolution.label.as_deref(), Some("A0A1Q8WSX6_9ACTO"));
        assert_eq!(
            resolution.description.as_deref(),
            Some("Type I-E CRISPR-associated protein Cas5/CasD (Organism: Actinomyces oris)")
        );
    }

    #[test]
    fn test_uniprot_header_only_is_empty() {
        let results = UniprotStrategy.parse("Entry\tEntry Name\n").unwrap();
        assert!(results.records.is_empty());
        assert!(UniprotStrategy.parse("").unwrap().records.is_empty());
    }

    #[test]
    fn test_europepmc_mapping() {
        let record = json!({"authorString": "Perugi G, Sani G.", "title": "Precision medicine."});
        let resolution = EuropePmcStrategy.describe(&record);
        assert_eq!(resolution.label.as_deref(), Some("Perugi G, Sani G."));
        assert_eq!(resolution.description.as_deref(), Some("Precision medicine."));
    }

    #[test]
    fn test_blank_fields_are_none() {
        let record = json!({"title": "  ", "experiment_type": "SXT"});
        let resolution = SolrStrategy::empiar().describe(&record);
        assert_eq!(resolution.label, None);
        assert_eq!(resolution.description.as_deref(), Some("SXT"));
        assert!(!resolution.is_empty());
    }
}
