//! WHOIS XML API response shapes.

use serde::Deserialize;

/// Geolocation lookup body.
#[derive(Debug, Deserialize)]
pub struct GeoResponse {
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub country: Option<String>,
}

/// WHOIS lookup body.
#[derive(Debug, Deserialize)]
pub struct WhoisResponse {
    #[serde(default, rename = "WhoisRecord")]
    pub whois_record: Option<WhoisRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    #[serde(default)]
    pub registry_data: Option<RegistryData>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub registrant: Option<Contact>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub organization: Option<String>,
}

impl GeoResponse {
    pub fn country(self) -> Option<String> {
        self.location?.country
    }
}

impl WhoisResponse {
    pub fn organization(self) -> Option<String> {
        self.whois_record?.registry_data?.registrant?.organization
    }
}
