use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpvCode {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    /// Alpha-3 code used by the country authority table and in results.
    pub authority_code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Metadata: Pick lists offered to search forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub cpv_codes: Vec<CpvCode>,
    pub countries: Vec<Country>,
}

impl Metadata {
    /// The built-in CPV division and country lists.
    pub fn builtin() -> Self {
        Self {
            cpv_codes: config::cpv_codes()
                .into_iter()
                .map(|(code, description)| CpvCode {
                    code: code.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            countries: config::countries()
                .into_iter()
                .map(|(code, authority_code, name)| Country {
                    code: code.to_string(),
                    authority_code: authority_code.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}
