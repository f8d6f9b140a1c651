//! Signed request execution.
//!
//! ```text
//! request(operation, params)
//!   ├─ timestamp + signature (fresh per call)
//!   ├─ merge common parameters, flatten
//!   ├─ POST ── Connect error → sleep, double delay, retry (up to max_attempts)
//!   │       └─ Http error    → Transport (no retry)
//!   └─ decode XML → Response
//! ```

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::{ClientSettings, Credentials, Endpoint};
use crate::error::{RequesterError, RequesterResult};
use crate::flatten::flatten;
use crate::node::Node;
use crate::response::Response;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::signature;
use crate::transport::{HttpTransport, Transport, TransportError};

/// API version sent with every request.
pub const API_VERSION: &str = "2014-08-15";

/// Client for the requester API. Holds only immutable credentials and
/// settings; each request is independent.
pub struct Requester {
    credentials: Credentials,
    endpoint: Endpoint,
    retry: RetryPolicy,
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
}

impl Requester {
    /// Build a client backed by the blocking HTTP transport.
    pub fn new(credentials: Credentials, settings: ClientSettings) -> RequesterResult<Self> {
        settings.validate()?;
        let transport = HttpTransport::new(settings.verify_ssl, settings.http_timeout())?;
        Ok(Self::with_transport(
            credentials,
            &settings,
            Box::new(transport),
            Box::new(ThreadSleeper),
        ))
    }

    /// Build a client over an arbitrary transport and sleeper.
    pub fn with_transport(
        credentials: Credentials,
        settings: &ClientSettings,
        transport: Box<dyn Transport>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            credentials,
            endpoint: settings.endpoint(),
            retry: settings.retry_policy(),
            transport,
            sleeper,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Submit URL for hosted task forms on the configured marketplace.
    pub fn external_form_action(&self) -> &'static str {
        self.endpoint.external_submit_url()
    }

    /// Sign and send `operation` with the given parameters.
    ///
    /// Semantic failures come back as a [`Response`] with `valid == false`.
    pub fn request<I, K>(&self, operation: &str, params: I) -> RequesterResult<Response>
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        if operation.is_empty() {
            return Err(RequesterError::InvalidOperation);
        }

        let timestamp = signature::timestamp(Utc::now());
        let flattened = self.signed_parameters(operation, params, &timestamp);

        let xml = self.post_with_retry(operation, &flattened)?;
        let response = Response::from_xml(xml)?;
        debug!(operation, valid = response.valid, "Requester API response");
        Ok(response)
    }

    /// Merge the common signed parameters into `params` and flatten.
    pub fn signed_parameters<I, K>(
        &self,
        operation: &str,
        params: I,
        timestamp: &str,
    ) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        let signature = signature::sign(operation, timestamp, &self.credentials.secret_access_key);

        let mut tree = Node::mapping(params);
        tree.set("Operation", operation);
        tree.set("Version", API_VERSION);
        tree.set("AWSAccessKeyId", self.credentials.access_key_id.as_str());
        tree.set("Signature", signature);
        tree.set("Timestamp", timestamp);

        flatten(&tree)
    }

    fn post_with_retry(
        &self,
        operation: &str,
        params: &BTreeMap<String, String>,
    ) -> RequesterResult<String> {
        let url = self.endpoint.service_url();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.transport.post(url, params) {
                Ok(body) => return Ok(body),
                Err(TransportError::Connect(reason)) => {
                    if !self.retry.should_retry(attempts) {
                        warn!(
                            operation,
                            attempts,
                            error = %reason,
                            "Connection failed, retries exhausted"
                        );
                        return Err(RequesterError::Connectivity {
                            attempts,
                            last: reason,
                        });
                    }
                    let backoff = self.retry.delay_after(attempts);
                    warn!(
                        operation,
                        attempt = attempts,
                        max_attempts = self.retry.max_attempts,
                        backoff_secs = backoff.as_secs_f64(),
                        error = %reason,
                        "Connection failed, retrying"
                    );
                    self.sleeper.sleep(backoff);
                }
                Err(err @ TransportError::Http(_)) => return Err(err.into()),
            }
        }
    }
}
