use std::sync::Arc;

use super::prelude::*;

/// Probe every site concurrently and return one record per site, in input order.
///
/// Each site gets its own task. Handles are kept in input order and joined in that order, so
/// slot `i` only ever receives the record produced for `sites[i]`, whatever order the probes
/// finish in. The call returns once every task has completed. A task that panics still yields
/// an unreachable record for its site.
pub async fn run_batch<M: PageMeasurer>(prober: &Arc<SiteProber<M>>, sites: &[Site]) -> Vec<StatusRecord> {
    let mut handles = Vec::with_capacity(sites.len());

    for site in sites {
        let prober = Arc::clone(prober);
        let site = site.clone();
        handles.push(tokio::spawn(async move { prober.probe(&site).await }));
    }

    let mut statuses = Vec::with_capacity(sites.len());
    for (site, handle) in sites.iter().zip(handles) {
        let status = match handle.await {
            Ok(status) => status,
            Err(e) => {
                log::error!("Probe task for site {} ({}) aborted: {}", site.id, site.url, e);
                StatusRecord::unreachable(site.id, 0)
            }
        };
        statuses.push(status);
    }

    statuses
}
