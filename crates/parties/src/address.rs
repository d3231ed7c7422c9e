use serde::{Deserialize, Serialize};

use invoify_core::validate::normalize_optional;

/// Postal address; every component is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// Trim every component and drop blanks.
    pub fn normalized(self) -> Self {
        Self {
            address: normalize_optional(self.address),
            city: normalize_optional(self.city),
            state: normalize_optional(self.state),
            zip_code: normalize_optional(self.zip_code),
            country: normalize_optional(self.country),
        }
    }

    /// Printable lines, in order: street, "city, state", zip code, country.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(street) = &self.address {
            lines.push(street.clone());
        }

        let locality = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        if !locality.is_empty() {
            lines.push(locality.join(", "));
        }

        if let Some(zip) = &self.zip_code {
            lines.push(zip.clone());
        }
        if let Some(country) = &self.country {
            lines.push(country.clone());
        }
        lines
    }
}
