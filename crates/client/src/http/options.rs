//! Request options and header merging

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::Form;

use crate::errors::InvaroError;

/// Optional pieces of a request: JSON body, multipart form, extra headers.
#[derive(Default)]
pub(crate) struct RequestOptions {
    pub json: Option<serde_json::Value>,
    pub form: Option<Form>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Options carrying a JSON body.
    pub fn json(body: serde_json::Value) -> Self {
        Self { json: Some(body), ..Self::default() }
    }

    /// Options carrying a multipart form.
    pub fn form(form: Form) -> Self {
        Self { form: Some(form), ..Self::default() }
    }
}

/// Merge caller-supplied headers with the bearer token.
///
/// Precedence is fixed: caller headers are taken first, then the
/// `Authorization` bearer header is inserted last, so it is always present
/// and a caller-supplied `Authorization` value never wins.
pub(crate) fn merge_headers(api_key: &str, extra: HeaderMap) -> Result<HeaderMap, InvaroError> {
    let mut headers = extra;

    let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
        InvaroError::Config("API key contains characters not valid in a header".into())
    })?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}
