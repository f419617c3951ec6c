//! Entity managers
//!
//! A manager is a plain value binding an entity name to the API root and the
//! injected signer/transport capabilities; every operation (`get`, `save`,
//! `put`, `filter`, `all`) builds a request descriptor without performing
//! I/O, hands it to the transport, classifies the outcome and decodes the
//! payload. Managers hold no mutable state, so any number of operations may
//! run concurrently on the same or different managers.

use std::sync::Arc;

use crate::client::ClientConfig;
use crate::credentials::RequestSigner;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{Error, Result};
use crate::query::{self, FilterParams};
use crate::response::{Classification, classify};
use crate::transport::{Method, RawResponse, RequestBody, RequestDescriptor, Transport};
use crate::value::{Record, Value};

/// Decoded outcome of a successful exchange.
enum Payload {
    Envelope(Record),
    Pdf(Vec<u8>),
}

/// Operations on one named resource collection.
#[derive(Clone)]
pub struct Manager {
    name: String,
    singular: String,
    url: String,
    signer: Arc<dyn RequestSigner>,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Manager {
    pub(crate) fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        config: Arc<ClientConfig>,
    ) -> Self {
        let name = name.into();
        let singular = config.tables.singularize(&name);
        Self {
            name,
            singular,
            url: url.into(),
            signer,
            transport,
            config,
        }
    }

    /// Entity name this manager operates on (e.g. `"Invoices"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Singular form of the entity name (e.g. `"Invoice"`).
    pub fn singular(&self) -> &str {
        &self.singular
    }

    // ---- request building (no I/O) ----

    fn collection_uri(&self) -> String {
        format!("{}/{}", self.url, self.name)
    }

    fn get_request(&self, id: &str) -> RequestDescriptor {
        RequestDescriptor::new(format!("{}/{}", self.collection_uri(), id), Method::Get)
    }

    fn filter_request(&self, params: FilterParams) -> RequestDescriptor {
        let built = query::build_query(params);
        let mut uri = self.collection_uri();
        if let Some(where_clause) = &built.where_clause {
            uri.push_str("?where=");
            uri.push_str(where_clause);
        }
        if let Some(page) = built.page {
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&format!("page={page}"));
        }
        let mut request = RequestDescriptor::new(uri, Method::Get);
        for (name, value) in built.headers {
            request.headers.insert(name, value);
        }
        request
    }

    fn save_request(&self, records: &[Record], method: Method) -> Result<RequestDescriptor> {
        let xml = Encoder::new(&self.config.tables).encode_entity(&self.name, records)?;
        let mut request = RequestDescriptor::new(self.collection_uri(), method);
        request.body = Some(RequestBody::Form(vec![("xml".to_string(), xml)]));
        Ok(request)
    }

    // ---- operations ----

    /// Fetch a single record by identifier.
    ///
    /// A response that structurally resolves to more than one entry is a
    /// data-shape error and fails loudly rather than picking the first.
    pub async fn get(&self, id: &str) -> Result<Record> {
        let value = self.fetch(self.get_request(id)).await?;
        match value {
            Value::List(mut items) => match items.len() {
                0 => Ok(Record::new()),
                1 => into_record(items.remove(0), &self.name),
                _ => Err(Error::MultipleResultsForSingleGet),
            },
            other => into_record(other, &self.name),
        }
    }

    /// Fetch a record rendered as PDF (invoices, credit notes).
    pub async fn get_pdf(&self, id: &str) -> Result<Vec<u8>> {
        let mut request = self.get_request(id);
        request
            .headers
            .insert("Accept".to_string(), "application/pdf".to_string());
        let response = self.perform(request).await?;
        match self.decode_payload(&response)? {
            Payload::Pdf(bytes) => Ok(bytes),
            Payload::Envelope(_) => {
                Err(Error::MalformedDocument("expected a PDF payload".to_string()))
            }
        }
    }

    /// Fetch the records matching a constraint set.
    pub async fn filter(&self, params: FilterParams) -> Result<Vec<Record>> {
        let value = self.fetch(self.filter_request(params)).await?;
        self.into_records(value)
    }

    /// Fetch every record, page by page.
    ///
    /// Pages of [`ClientConfig::page_size`] records are requested
    /// sequentially starting at page 1 and concatenated until the server
    /// returns a short or empty page. Cancelling the returned future between
    /// page fetches discards the accumulated prefix; no partial result is
    /// surfaced.
    pub async fn all(&self) -> Result<Vec<Record>> {
        let page_size = self.config.page_size;
        let mut results = Vec::new();
        let mut page: i64 = 1;
        loop {
            let batch = self
                .filter(FilterParams::new().param("page", page))
                .await?;
            let fetched = batch.len();
            results.extend(batch);
            if fetched == 0 || fetched % page_size != 0 {
                break;
            }
            page += 1;
        }
        Ok(results)
    }

    /// Create records (POST). Returns the server's echo of the saved data.
    pub async fn save(&self, records: &[Record]) -> Result<Vec<Record>> {
        let request = self.save_request(records, Method::Post)?;
        let value = self.fetch(request).await?;
        self.into_records(value)
    }

    /// Create-or-update records (PUT). Returns the server's echo.
    pub async fn put(&self, records: &[Record]) -> Result<Vec<Record>> {
        let request = self.save_request(records, Method::Put)?;
        let value = self.fetch(request).await?;
        self.into_records(value)
    }

    // ---- execution ----

    async fn fetch(&self, request: RequestDescriptor) -> Result<Value> {
        let response = self.perform(request).await?;
        match self.decode_payload(&response)? {
            Payload::Envelope(envelope) => self.extract_results(envelope),
            Payload::Pdf(_) => Err(Error::MalformedDocument(
                "unexpected PDF payload".to_string(),
            )),
        }
    }

    /// Sign and execute, classifying the outcome. A 500 while the structured
    /// representation was requested is reissued exactly once with the Accept
    /// header cleared before giving up.
    async fn perform(&self, mut request: RequestDescriptor) -> Result<RawResponse> {
        let accept_structured = if self.config.prefer_json && !request.headers.contains_key("Accept")
        {
            request
                .headers
                .insert("Accept".to_string(), "application/json".to_string());
            true
        } else {
            request
                .headers
                .get("Accept")
                .map(|a| a == "application/json")
                .unwrap_or(false)
        };

        let response = self.send(&request).await?;
        match classify(&response, accept_structured) {
            Classification::Success => Ok(response),
            Classification::Failure(err) => Err(err),
            Classification::RetryWithoutAccept => {
                log::debug!(
                    "re-running request to {} without the structured Accept header",
                    request.uri
                );
                request.headers.remove("Accept");
                let retry = self.send(&request).await?;
                match classify(&retry, false) {
                    Classification::Success => Ok(retry),
                    Classification::Failure(err) => Err(err),
                    Classification::RetryWithoutAccept => Err(Error::InternalError),
                }
            }
        }
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let mut signed = request.clone();
        for (name, value) in self.signer.sign(request)? {
            signed.headers.insert(name, value);
        }
        let response = self.transport.execute(&signed).await?;
        log::debug!(
            "{} {} -> {}",
            request.method.as_str(),
            request.uri,
            response.status
        );
        Ok(response)
    }

    // ---- payload handling ----

    fn decode_payload(&self, response: &RawResponse) -> Result<Payload> {
        let content_type = response.content_type().unwrap_or("");
        if content_type.starts_with("application/pdf") {
            return Ok(Payload::Pdf(response.body.clone()));
        }
        let decoder = Decoder::new(&self.config.tables);
        let decoded = if content_type.contains("json") {
            let json: serde_json::Value = serde_json::from_slice(&response.body)
                .map_err(|e| Error::MalformedDocument(e.to_string()))?;
            decoder.decode_json(&json)?
        } else {
            decoder.decode_document(&response.text())?
        };
        match decoded {
            Value::Record(envelope) => Ok(Payload::Envelope(envelope)),
            other => Err(Error::MalformedDocument(format!(
                "expected a structured envelope, found {}",
                other.type_name()
            ))),
        }
    }

    /// Unwrap the response envelope. Resources whose wrapper uses the plural
    /// form of the entity name are special-cased before the entity's own key
    /// is consulted.
    fn extract_results(&self, mut envelope: Record) -> Result<Value> {
        let plural_key = format!("{}s", self.name);
        if let Some(value) = envelope.shift_remove(&plural_key) {
            // The plural-collapse rule has already promoted a singleton
            // wrapper into a one-element list.
            return Ok(match value {
                Value::List(mut items) if items.len() == 1 => items.remove(0),
                other => other,
            });
        }
        envelope.shift_remove(&self.name).ok_or_else(|| {
            Error::MalformedDocument(format!("response envelope has no {:?} entry", self.name))
        })
    }

    fn into_records(&self, value: Value) -> Result<Vec<Record>> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| into_record(item, &self.name))
                .collect(),
            Value::Record(rec) => Ok(vec![rec]),
            // An empty non-plural element decodes to an empty string.
            Value::String(s) if s.is_empty() => Ok(Vec::new()),
            other => Err(Error::MalformedDocument(format!(
                "expected records, found {}",
                other.type_name()
            ))),
        }
    }
}

fn into_record(value: Value, entity: &str) -> Result<Record> {
    match value {
        Value::Record(rec) => Ok(rec),
        Value::String(s) if s.is_empty() => Ok(Record::new()),
        other => Err(Error::MalformedDocument(format!(
            "expected a {entity} record, found {}",
            other.type_name()
        ))),
    }
}
