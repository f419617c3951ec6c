//! Response classification
//!
//! Pure mapping from an executed exchange to "success, decode the payload",
//! "retry once without the structured Accept header" or a typed error. The
//! only genuinely ambiguous status is 503, which the API uses both for rate
//! limiting (form-encoded body) and for downtime (empty body); the body
//! decides.

use std::collections::HashMap;

use crate::error::Error;
use crate::transport::RawResponse;

/// Outcome of classifying a response.
#[derive(Debug)]
pub enum Classification {
    /// 200: hand the payload to the decoder (or pass a PDF through).
    Success,
    /// 500 while the structured representation was requested: the server has
    /// a known defect reporting validation errors in that representation, so
    /// the identical request is reissued once with the Accept header
    /// cleared.
    RetryWithoutAccept,
    /// Anything else: a typed error for the caller.
    Failure(Error),
}

/// Classify an exchange. `accept_was_structured` reports whether the request
/// carried the structured-representation Accept header, which gates the
/// one-time 500 fallback.
pub fn classify(response: &RawResponse, accept_was_structured: bool) -> Classification {
    match response.status {
        200 => Classification::Success,
        400 => Classification::Failure(Error::BadRequest {
            body: response.text(),
        }),
        401 => Classification::Failure(Error::Unauthorized),
        403 => Classification::Failure(Error::Forbidden),
        404 => Classification::Failure(Error::NotFound),
        500 if accept_was_structured => Classification::RetryWithoutAccept,
        500 => Classification::Failure(Error::InternalError),
        501 => Classification::Failure(Error::NotImplemented),
        503 => {
            let payload = parse_form_body(&response.text());
            if payload.is_empty() {
                Classification::Failure(Error::ServiceNotAvailable)
            } else {
                Classification::Failure(Error::RateLimitExceeded { payload })
            }
        }
        status => Classification::Failure(Error::UnknownResponse {
            status,
            body: response.text(),
        }),
    }
}

/// Decode a form-encoded body (`key=value&key=value`) into a multi-map.
/// Pairs with a blank value and fragments without `=` are dropped, so an
/// HTML error page decodes to nothing.
pub(crate) fn parse_form_body(text: &str) -> HashMap<String, Vec<String>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for pair in text.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let decode = |s: &str| {
            urlencoding::decode(&s.replace('+', " "))
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| s.to_string())
        };
        out.entry(decode(key)).or_default().push(decode(value));
    }
    out
}
