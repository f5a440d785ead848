// src/source/http.rs
use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::Client;
use url::Url;

use crate::models::{Dimension, FilterState, RawRecord};
use crate::source::{parse_payload, RecordSource};

/// Fetches records from the property API with a GET request.
///
/// `with_filter` passes a filter along as query parameters so the server may
/// pre-narrow. A narrowed record set is unsuitable for facet counting: counts
/// for unselected options need the properties the filter excludes, so sources
/// feeding `FacetEngine` should stay unfiltered.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: Client,
    endpoint: Url,
    filter: FilterState,
}

impl HttpRecordSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .with_context(|| format!("Invalid property source URL: {}", endpoint))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            filter: FilterState::new(),
        })
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if !self.filter.is_unconstrained() {
            let mut pairs = url.query_pairs_mut();
            for dimension in Dimension::ALL {
                for value in self.filter.values(dimension) {
                    pairs.append_pair(dimension.query_key(), value);
                }
            }
        }
        url
    }
}

impl RecordSource for HttpRecordSource {
    fn describe(&self) -> String {
        self.endpoint.to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let url = self.request_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("Property source returned status: {}", response.status()));
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read property source response body")?;
        parse_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_carries_filter() {
        let filter = FilterState::new()
            .select(Dimension::State, "Texas")
            .select(Dimension::State, "Utah")
            .select(Dimension::RateCategory, "$550+");
        let source = HttpRecordSource::new("https://api.example.com/properties?limit=500")
            .unwrap()
            .with_filter(filter);

        let url = source.request_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("limit".to_string(), "500".to_string()));
        assert!(pairs.contains(&("state".to_string(), "Utah".to_string())));
        assert!(pairs.contains(&("rateRange".to_string(), "$550+".to_string())));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_unconstrained_url_is_untouched() {
        let source = HttpRecordSource::new(" https://api.example.com/properties ").unwrap();
        assert_eq!(source.request_url().as_str(), "https://api.example.com/properties");
        assert!(HttpRecordSource::new("not a url").is_err());
    }
}
