//! Brands, endpoints and fixed request headers for the NuHeat cloud API.
//!
//! The same API is served under two hostnames depending on which brand the
//! thermostats were sold under. All endpoint paths are identical between
//! brands; only the base URL changes.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN};

use crate::error::{Error, Result};

/// Base URL of the NuHeat branded portal.
pub const NUHEAT_BASE_URL: &str = "https://mynuheat.com";

/// Base URL of the Mapeheat branded portal.
pub const MAPEHEAT_BASE_URL: &str = "https://mymapeheat.com";

/// Vendor brand the thermostats are registered under.
///
/// NuHeat and Mapeheat thermostats use the same cloud API behind different
/// hostnames. Accounts are tied to one brand portal, so requests have to be
/// sent to the matching base URL.
///
/// # Examples
///
/// ```
/// use nuheat::Brand;
///
/// assert_eq!(Brand::NuHeat.base_url(), "https://mynuheat.com");
/// assert_eq!(Brand::default(), Brand::NuHeat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Brand {
    /// NuHeat / nVent Signature thermostats (`mynuheat.com`).
    #[default]
    NuHeat,
    /// Mapeheat thermostats (`mymapeheat.com`).
    Mapeheat,
}

impl Brand {
    /// Returns the base URL of the brand's portal.
    pub fn base_url(&self) -> &'static str {
        match self {
            Brand::NuHeat => NUHEAT_BASE_URL,
            Brand::Mapeheat => MAPEHEAT_BASE_URL,
        }
    }
}

/// URL of the authentication endpoint.
pub(crate) fn auth_url(base_url: &str) -> String {
    format!("{}/api/authenticate/user", base_url)
}

/// URL of the single-thermostat endpoint (GET state, POST updates).
pub(crate) fn thermostat_url(base_url: &str) -> String {
    format!("{}/api/thermostat", base_url)
}

/// URL of the account-wide thermostat listing endpoint.
pub(crate) fn thermostats_url(base_url: &str) -> String {
    format!("{}/api/thermostats", base_url)
}

/// Builds the fixed headers the portal expects on every request.
///
/// The `HTTP_ACCEPT` header is non-standard but required by the vendor
/// backend. `Origin` mirrors the portal base URL.
///
/// # Errors
///
/// Returns [`Error::InvalidBaseUrl`] if the base URL contains characters
/// that are not valid in an `Origin` header value.
pub(crate) fn request_headers(base_url: &str) -> Result<HeaderMap> {
    let origin =
        HeaderValue::from_str(base_url).map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("http_accept"),
        HeaderValue::from_static(
            "application/json, application/xml, text/json, text/x-json, text/javascript, text/xml",
        ),
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers.insert(ORIGIN, origin);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_base_urls() {
        assert_eq!(Brand::NuHeat.base_url(), "https://mynuheat.com");
        assert_eq!(Brand::Mapeheat.base_url(), "https://mymapeheat.com");
    }

    #[test]
    fn test_default_brand_is_nuheat() {
        assert_eq!(Brand::default(), Brand::NuHeat);
    }

    #[test]
    fn test_auth_url() {
        assert_eq!(
            auth_url("https://mynuheat.com"),
            "https://mynuheat.com/api/authenticate/user"
        );
    }

    #[test]
    fn test_thermostat_urls() {
        assert_eq!(
            thermostat_url("https://mymapeheat.com"),
            "https://mymapeheat.com/api/thermostat"
        );
        assert_eq!(
            thermostats_url("https://mymapeheat.com"),
            "https://mymapeheat.com/api/thermostats"
        );
    }

    #[test]
    fn test_request_headers() {
        let headers = request_headers("https://mynuheat.com").unwrap();

        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(ORIGIN).unwrap(), "https://mynuheat.com");
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert!(
            headers
                .get("http_accept")
                .unwrap()
                .to_str()
                .unwrap()
                .contains("application/json")
        );
    }

    #[test]
    fn test_request_headers_invalid_base_url() {
        let result = request_headers("https://bad\nurl");
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }
}
