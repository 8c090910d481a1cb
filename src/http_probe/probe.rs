use std::time::Instant;

use reqwest::Client;

use super::measure::elapsed_ms;
use super::prelude::*;
use crate::error::report;

/// Checks one site: a plain GET for reachability and timing, then a page measurement when a
/// response came back.
pub struct SiteProber<M> {
    client: Client,
    measurer: M,
}

impl<M: PageMeasurer> SiteProber<M> {
    /// `client` is shared by every probe; reqwest pools its keep-alive connections internally.
    pub fn new(client: Client, measurer: M) -> Self {
        Self { client, measurer }
    }

    /// Probe a site. Never fails: transport and measurement errors end up in the record.
    pub async fn probe(&self, site: &Site) -> StatusRecord {
        // Measure HTTP probe
        let start = Instant::now();
        let status_result = self.client.get(&site.url).send().await;
        let response_time_ms = elapsed_ms(start);

        // The body is read to the end so the connection goes back to the idle pool.
        let http_status = match status_result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if let Err(e) = resp.bytes().await {
                    log::debug!("Site {} ({}) body not fully read: {}", site.id, site.url, e);
                }
                Some(status)
            }
            Err(e) => {
                log::warn!("Site {} ({}) unreachable: {}", site.id, site.url, report(&e));
                None
            }
        };

        // Any response counts, not only 200: error pages are measured as well.
        let page = match http_status {
            Some(_) => self.measure_page(site).await,
            None => None,
        };

        StatusRecord::new(site.id, http_status, response_time_ms, page)
    }

    async fn measure_page(&self, site: &Site) -> Option<PageMeasurement> {
        match self.measurer.measure(&site.url).await {
            Ok(page) => Some(page),
            Err(e) => {
                log::warn!("Error analyzing page {}: {}", site.url, report(&e));
                None
            }
        }
    }
}
