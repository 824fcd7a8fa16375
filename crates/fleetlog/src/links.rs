//! Links to the public report form.
//!
//! The QR code on a vehicle encodes a link to the public form carrying the
//! vehicle's barcode as the `barcode` query parameter.

use tracing::debug;

use crate::config::PublicFormConfig;

const BARCODE_PARAM: &str = "barcode";

/// Link to the public form pre-filled with `barcode`.
#[must_use]
pub fn public_form_url(base_url: &str, route: &str, barcode: &str) -> String {
    let separator = if route.contains('?') { '&' } else { '?' };
    format!(
        "{}{route}{separator}{BARCODE_PARAM}={}",
        base_url.trim().trim_end_matches('/'),
        urlencoding::encode(barcode.trim())
    )
}

/// [`public_form_url`] with the configured base URL and route.
#[must_use]
pub fn configured_form_url(config: &PublicFormConfig, barcode: &str) -> String {
    public_form_url(&config.base_url, &config.route, barcode)
}

/// The barcode carried by a public form link or bare query string.
///
/// Returns `None` if there is no non-empty `barcode` parameter.
#[must_use]
pub fn barcode_from_link(link: &str) -> Option<String> {
    let query = match link.split_once('?') {
        Some((_, query)) => query,
        None if link.contains('=') => link,
        None => return None,
    };

    let raw = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == BARCODE_PARAM)
        .map(|(_, value)| value)?;

    let decoded = match urlencoding::decode(&raw.replace('+', " ")) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            debug!(error = %err, "Barcode parameter is not valid UTF-8");
            return None;
        }
    };

    let barcode = decoded.trim();
    (!barcode.is_empty()).then(|| barcode.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_form_url() {
        assert_eq!(
            public_form_url("https://fleet.example.com/", "/#/public", "BAR001"),
            "https://fleet.example.com/#/public?barcode=BAR001"
        );
    }

    #[test]
    fn test_public_form_url_encodes_barcode() {
        let url = public_form_url("http://localhost:8080", "/#/public", "123-45 678/א");
        assert!(url.starts_with("http://localhost:8080/#/public?barcode=123-45%20678%2F"));
        assert_eq!(barcode_from_link(&url).as_deref(), Some("123-45 678/א"));
    }

    #[test]
    fn test_public_form_url_route_with_query() {
        assert_eq!(
            public_form_url("http://localhost:8080", "/#/public?lang=he", "BAR001"),
            "http://localhost:8080/#/public?lang=he&barcode=BAR001"
        );
    }

    #[test]
    fn test_configured_form_url() {
        let config = PublicFormConfig::default();
        assert_eq!(
            configured_form_url(&config, "BAR002"),
            "http://localhost:8080/#/public?barcode=BAR002"
        );
    }

    #[test]
    fn test_barcode_from_link_variants() {
        assert_eq!(
            barcode_from_link("https://x.test/#/public?barcode=BAR001").as_deref(),
            Some("BAR001")
        );
        assert_eq!(barcode_from_link("barcode=BAR002").as_deref(), Some("BAR002"));
        assert_eq!(
            barcode_from_link("?lang=he&barcode=BAR+003").as_deref(),
            Some("BAR 003")
        );
    }

    #[test]
    fn test_barcode_from_link_missing() {
        assert_eq!(barcode_from_link("https://x.test/#/public"), None);
        assert_eq!(barcode_from_link("https://x.test/#/public?lang=he"), None);
        assert_eq!(barcode_from_link("https://x.test/#/public?barcode="), None);
        assert_eq!(barcode_from_link("https://x.test/?barcode=%FF"), None);
    }
}
