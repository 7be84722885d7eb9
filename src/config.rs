use std::path::PathBuf;
use std::time::Duration;

pub const SPARQL_ENDPOINT: &str = "https://publications.europa.eu/webapi/rdf/sparql";
pub const USER_AGENT: &str = "TED-Explorer/1.0";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Nominal match count reported by the synthetic fallback dataset.
pub const MOCK_TOTAL: u64 = 150;

/// Base IRI of the EU country authority table; a country code is appended.
pub const COUNTRY_AUTHORITY_BASE: &str =
    "http://publications.europa.eu/resource/authority/country/";

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DATABASE_FILE: &str = "ted-explorer.duckdb";

// Environment overrides read by `TedExplorerBuilder::from_env`.
pub const ENV_ENDPOINT: &str = "TED_SPARQL_ENDPOINT";
pub const ENV_PAGE_SIZE: &str = "TED_PAGE_SIZE";
pub const ENV_FALLBACK: &str = "TED_FALLBACK_ON_ERROR";
pub const ENV_DATABASE_PATH: &str = "TED_DATABASE_PATH";

pub fn sparql_prefixes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("dct", "http://purl.org/dc/terms/"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ("epo", "http://data.europa.eu/a4g/ontology#"),
    ]
}

/// CPV divisions offered as search filters.
pub fn cpv_codes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("03000000", "Agricultural, farming, fishing, forestry and related products"),
        ("09000000", "Petroleum products, fuel, electricity and other sources of energy"),
        ("30000000", "Office and computing machinery, equipment and supplies"),
        ("32000000", "Radio, television, communication, telecommunication and related equipment"),
        ("33000000", "Medical equipments, pharmaceuticals and personal care products"),
        ("34000000", "Transport equipment and auxiliary products to transportation"),
        ("45000000", "Construction work"),
        ("48000000", "Software package and information systems"),
        ("50000000", "Repair and maintenance services"),
        ("60000000", "Transport services (excl. Waste transport)"),
        ("72000000", "IT services: consulting, software development, Internet and support"),
        ("79000000", "Business services: law, marketing, consulting, recruitment, printing and security"),
        ("85000000", "Health and social work services"),
        ("90000000", "Sewage, refuse, cleaning and environmental services"),
    ]
}

/// Countries offered as search filters: `(alpha-2, authority code, name)`.
///
/// The EU country authority table is keyed by ISO 3166-1 alpha-3 codes.
pub fn countries() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("AT", "AUT", "Austria"),
        ("BE", "BEL", "Belgium"),
        ("CZ", "CZE", "Czechia"),
        ("DE", "DEU", "Germany"),
        ("DK", "DNK", "Denmark"),
        ("ES", "ESP", "Spain"),
        ("FI", "FIN", "Finland"),
        ("FR", "FRA", "France"),
        ("IE", "IRL", "Ireland"),
        ("IT", "ITA", "Italy"),
        ("NL", "NLD", "Netherlands"),
        ("PL", "POL", "Poland"),
        ("PT", "PRT", "Portugal"),
        ("SE", "SWE", "Sweden"),
    ]
}

/// Authority code for a listed alpha-2 code.
pub fn country_authority_code(alpha2: &str) -> Option<&'static str> {
    countries()
        .into_iter()
        .find(|(a2, _, _)| a2.eq_ignore_ascii_case(alpha2))
        .map(|(_, a3, _)| a3)
}

/// Name of a listed country, looked up by either code form.
pub fn country_name(code: &str) -> Option<&'static str> {
    countries()
        .into_iter()
        .find(|(a2, a3, _)| a2.eq_ignore_ascii_case(code) || a3.eq_ignore_ascii_case(code))
        .map(|(_, _, name)| name)
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("ted-explorer")
    } else {
        PathBuf::from(".ted-explorer")
    }
}

/// Property path from a notice to its CPV classification, directly or via
/// the tender it refers to.
pub const CPV_PATH: &str =
    "(epo:hasMainClassification|epo:refersToTender/epo:hasMainClassification)";

/// Property path from a notice to its country, directly or via the tender
/// it refers to.
pub const COUNTRY_PATH: &str = "(epo:hasCountryCode|epo:refersToTender/epo:hasCountryCode)";
