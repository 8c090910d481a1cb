use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use url::Url;

use super::prelude::*;

/// A capability that loads a page and reports how long it took and how large it was.
pub trait PageMeasurer: Send + Sync + 'static {
    fn measure(&self, url: &str) -> impl Future<Output = Result<PageMeasurement, MeasureError>> + Send;
}

impl<T: PageMeasurer> PageMeasurer for Arc<T> {
    fn measure(&self, url: &str) -> impl Future<Output = Result<PageMeasurement, MeasureError>> + Send {
        (**self).measure(url)
    }
}

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.1";

/// Measures the HTML document of a page.
/// Only the document itself is transferred: images, stylesheets and scripts it references are
/// never requested. Load time covers the request and the full body transfer.
#[derive(Clone)]
pub struct HttpPageMeasurer {
    client: Client,
    timeout: Duration,
}

impl HttpPageMeasurer {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl PageMeasurer for HttpPageMeasurer {
    async fn measure(&self, url: &str) -> Result<PageMeasurement, MeasureError> {
        let url = Url::parse(url)?;

        let start = Instant::now();
        let body = tokio::time::timeout(self.timeout, async {
            let response = self
                .client
                .get(url)
                .header(ACCEPT, HeaderValue::from_static(HTML_ACCEPT))
                .send()
                .await?;
            response.bytes().await
        })
        .await
        .map_err(|_| MeasureError::Timeout(self.timeout))??;

        Ok(PageMeasurement {
            load_time_ms: elapsed_ms(start),
            size_bytes: body.len() as u64,
        })
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// A URL whose port has nothing listening on it.
    pub fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    /// Answers measurements from a fixed table. URLs missing from the table fail.
    #[derive(Default)]
    pub struct StubMeasurer {
        pages: HashMap<String, PageMeasurement>,
        calls: AtomicUsize,
    }

    impl StubMeasurer {
        pub fn with_page(mut self, url: &str, load_time_ms: u64, size_bytes: u64) -> Self {
            self.pages.insert(
                url.to_string(),
                PageMeasurement {
                    load_time_ms,
                    size_bytes,
                },
            );
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageMeasurer for StubMeasurer {
        async fn measure(&self, url: &str) -> Result<PageMeasurement, MeasureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .copied()
                .ok_or(MeasureError::Timeout(Duration::ZERO))
        }
    }
}
