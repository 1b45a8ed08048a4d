//! 1inch HTTP API client implementation.
//!
//! Covers the two upstream services the gateway proxies: the multi-chain
//! Token API and the Fusion+ quoter, consult:
//! <https://portal.1inch.dev/documentation>

use {
    alloy_primitives::Address,
    anyhow::Result,
    reqwest::{Client, IntoUrl, StatusCode, Url, header},
    serde::{Deserialize, Serialize, Serializer},
    serde_json::Value,
    serde_with::{DisplayFromStr, serde_as},
    std::collections::BTreeMap,
};

/// Symbolic failure tag used when the upstream error body carries no `code`.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

// The `Display` implementation for `Address` prints an EIP-55 checksummed
// address. The upstream API expects plain lower-case hex, which is what the
// `LowerHex` implementation produces.
fn addr2str(addr: Address) -> String {
    format!("{addr:#x}")
}

/// Parses a wallet address, accepting only the canonical `0x` + 40 hex digit
/// form.
pub fn parse_wallet_address(address: &str) -> Option<Address> {
    let digits = address.strip_prefix("0x")?;
    if digits.len() != 40 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    address.parse().ok()
}

fn serialize_lowercase_address<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&addr2str(*address))
}

fn serialize_lowercase<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_lowercase())
}

/// Multi-chain token list query parameters. Unset fields fall back to the
/// values the client was configured with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenListQuery {
    pub provider: Option<String>,
    pub country: Option<String>,
}

/// The raw multi-chain token catalog.
///
/// The upstream payload is either keyed by token address directly or nests
/// that same mapping under a `tokens` field. The nested form wins when both
/// interpretations are possible. Any other shape fails deserialization.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawCatalog {
    Nested { tokens: BTreeMap<String, RawToken> },
    Flat(BTreeMap<String, RawToken>),
}

/// A single catalog record, kept as loose JSON so unknown metadata fields
/// survive the round trip to the caller.
pub type RawToken = serde_json::Map<String, Value>;

impl RawCatalog {
    pub fn into_tokens(self) -> BTreeMap<String, RawToken> {
        match self {
            Self::Nested { tokens } => tokens,
            Self::Flat(tokens) => tokens,
        }
    }
}

/// A Fusion+ quote query.
///
/// Required fields are non-optional by construction, so a query cannot reach
/// the network with any of them missing. All values are serialized as strings
/// because the upstream API expects string-typed query parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteQuery {
    /// Chain id the swapped amount originates from.
    pub src_chain: u64,
    /// Chain id the swapped amount settles on.
    pub dst_chain: u64,
    /// Contract address of the token to sell.
    pub src_token_address: String,
    /// Contract address of the token to buy.
    pub dst_token_address: String,
    /// Amount to swap in the source token's smallest unit, as a decimal
    /// string. Never parsed as a number to avoid precision loss.
    pub amount: String,
    /// Address of the wallet the swap is quoted for.
    pub wallet_address: Address,
    /// Flag to request an executable estimate rather than an indicative one.
    pub enable_estimate: bool,
    /// Integrator fee in basis points, as a decimal string.
    pub fee: String,
    /// Whether the attached permit uses Permit2.
    pub is_permit2: Option<String>,
    /// Signed permit payload authorizing the swap amount.
    pub permit: Option<String>,
}

impl QuoteQuery {
    fn into_url(self, base_url: &Url) -> Url {
        let mut url = base_url
            .join("fusion-plus/quoter/v1.0/quote/receive")
            .expect("unexpectedly invalid URL segment");

        url.query_pairs_mut()
            .append_pair("srcChain", &self.src_chain.to_string())
            .append_pair("dstChain", &self.dst_chain.to_string())
            .append_pair("srcTokenAddress", &self.src_token_address.to_lowercase())
            .append_pair("dstTokenAddress", &self.dst_token_address.to_lowercase())
            .append_pair("amount", &self.amount)
            .append_pair("walletAddress", &addr2str(self.wallet_address))
            .append_pair("enableEstimate", &self.enable_estimate.to_string())
            .append_pair("fee", &self.fee);

        if let Some(is_permit2) = self.is_permit2 {
            url.query_pairs_mut().append_pair("isPermit2", &is_permit2);
        }
        if let Some(permit) = self.permit {
            url.query_pairs_mut().append_pair("permit", &permit);
        }

        url
    }
}

/// A Fusion+ build-order request body.
///
/// Optional fields are omitted from the body entirely rather than sent as
/// null or empty strings. Numeric fields are serialized as strings because
/// the upstream API expects string-typed values.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOrderRequest {
    #[serde_as(as = "DisplayFromStr")]
    pub src_chain: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub dst_chain: u64,
    #[serde(serialize_with = "serialize_lowercase")]
    pub src_token_address: String,
    #[serde(serialize_with = "serialize_lowercase")]
    pub dst_token_address: String,
    pub amount: String,
    #[serde(serialize_with = "serialize_lowercase_address")]
    pub wallet_address: Address,
    pub fee: String,
    /// Who is referring this order to 1inch.
    pub source: String,
    /// Speed/cost tradeoff tier to build the order from.
    pub preset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_permit2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit: Option<String>,
}

/// Uniform failure envelope for token catalog calls. `message` and `code` are
/// lifted from the upstream error body when present.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("1inch API error {status} ({code}): {message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub code: String,
}

impl ApiError {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: 500,
            code: UNKNOWN_ERROR.to_string(),
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err
                .status()
                .map(|status| status.as_u16())
                .unwrap_or(500),
            code: UNKNOWN_ERROR.to_string(),
        }
    }

    fn from_response(status: StatusCode, body: &str) -> Self {
        let body = serde_json::from_str::<UpstreamErrorBody>(body).unwrap_or_default();
        Self {
            message: body.message.unwrap_or_else(|| {
                format!("request failed with status code {}", status.as_u16())
            }),
            status: status.as_u16(),
            code: body.code.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        }
    }
}

/// Relevant parts of an upstream error body.
#[derive(Debug, Default, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Failure of a Fusion+ quoter call.
///
/// Carries the upstream error payload verbatim together with the outgoing
/// request so API consumers get the same diagnostics the gateway logs.
#[derive(Clone, Debug, thiserror::Error)]
#[error("1inch quoter call failed with status {status}")]
pub struct SwapApiError {
    pub status: u16,
    /// Upstream error body, or the transport error message.
    pub details: Value,
    pub request: RequestDiagnostics,
}

/// The outgoing request that produced an upstream failure. The bearer
/// credential is redacted down to a short prefix before it gets here.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDiagnostics {
    pub url: String,
    pub method: &'static str,
    pub headers: RequestHeaders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RequestHeaders {
    #[serde(rename = "Accept")]
    pub accept: &'static str,
    #[serde(rename = "Authorization")]
    pub authorization: String,
}

impl RequestHeaders {
    fn redacted(api_key: &str) -> Self {
        let prefix: String = api_key.chars().take(5).collect();
        Self {
            accept: "application/json",
            authorization: format!("Bearer {prefix}..."),
        }
    }
}

impl RequestDiagnostics {
    fn for_get(url: &Url, api_key: &str) -> Self {
        let params: serde_json::Map<String, Value> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        let mut base = url.clone();
        base.set_query(None);
        Self {
            url: base.to_string(),
            method: "GET",
            headers: RequestHeaders::redacted(api_key),
            params: Some(Value::Object(params)),
            data: None,
        }
    }

    fn for_post(url: &Url, api_key: &str, body: &impl Serialize) -> Self {
        Self {
            url: url.to_string(),
            method: "POST",
            headers: RequestHeaders::redacted(api_key),
            params: None,
            data: serde_json::to_value(body).ok(),
        }
    }
}

// Mockable version of API client
#[mockall::automock]
#[async_trait::async_trait]
pub trait OneInchApi: Send + Sync {
    /// Retrieves the multi-chain token catalog from the 1inch Token API.
    async fn get_token_list(&self, query: TokenListQuery) -> Result<RawCatalog, ApiError>;

    /// Requests a cross-chain swap quote for the specified parameters.
    async fn get_quote(&self, query: QuoteQuery) -> Result<Value, SwapApiError>;

    /// Assembles an unsigned swap order from a previously quoted trade.
    async fn build_order(&self, request: BuildOrderRequest) -> Result<Value, SwapApiError>;
}

/// 1inch API client implementation.
#[derive(Debug)]
pub struct OneInchClient {
    client: Client,
    base_url: Url,
    api_key: String,
    default_provider: String,
    default_country: String,
}

impl OneInchClient {
    pub const DEFAULT_URL: &'static str = "https://api.1inch.dev/";

    /// Create a new 1inch HTTP API client with the specified base URL and
    /// bearer credential.
    pub fn new(
        base_url: impl IntoUrl,
        api_key: String,
        default_provider: String,
        default_country: String,
        client: Client,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url.into_url()?,
            api_key,
            default_provider,
            default_country,
        })
    }

    fn token_list_url(&self, query: &TokenListQuery) -> Url {
        let mut url = self
            .base_url
            .join("token/v1.3/multi-chain/token-list")
            .expect("unexpectedly invalid URL segment");
        url.query_pairs_mut()
            .append_pair(
                "provider",
                query.provider.as_deref().unwrap_or(&self.default_provider),
            )
            .append_pair(
                "country",
                query.country.as_deref().unwrap_or(&self.default_country),
            );
        url
    }

    async fn quoter_request(
        &self,
        request: reqwest::RequestBuilder,
        diagnostics: RequestDiagnostics,
    ) -> Result<Value, SwapApiError> {
        let transport_failure = |err: reqwest::Error, diagnostics: RequestDiagnostics| SwapApiError {
            status: 500,
            details: Value::String(err.to_string()),
            request: diagnostics,
        };

        let response = request
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => return Err(transport_failure(err, diagnostics)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Err(transport_failure(err, diagnostics)),
        };

        if !status.is_success() {
            let details =
                serde_json::from_str(&body).unwrap_or_else(|_| Value::String(body.clone()));
            return Err(SwapApiError {
                status: status.as_u16(),
                details,
                request: diagnostics,
            });
        }

        serde_json::from_str(&body).map_err(|err| SwapApiError {
            status: 500,
            details: Value::String(format!("invalid JSON from 1inch quoter: {err}")),
            request: diagnostics,
        })
    }
}

#[async_trait::async_trait]
impl OneInchApi for OneInchClient {
    async fn get_token_list(&self, query: TokenListQuery) -> Result<RawCatalog, ApiError> {
        let url = self.token_list_url(&query);
        tracing::debug!(%url, "fetching token list from 1inch");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);
            tracing::warn!(%error, "token list request failed");
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|err| {
            tracing::warn!(?err, "malformed token list payload");
            ApiError::unknown("Invalid response from 1inch API")
        })
    }

    async fn get_quote(&self, query: QuoteQuery) -> Result<Value, SwapApiError> {
        let url = query.into_url(&self.base_url);
        let diagnostics = RequestDiagnostics::for_get(&url, &self.api_key);
        tracing::debug!(url = %diagnostics.url, "fetching quote from 1inch");
        self.quoter_request(self.client.get(url), diagnostics).await
    }

    async fn build_order(&self, request: BuildOrderRequest) -> Result<Value, SwapApiError> {
        let url = self
            .base_url
            .join("fusion-plus/quoter/v1.0/quote/build")
            .expect("unexpectedly invalid URL segment");
        let diagnostics = RequestDiagnostics::for_post(&url, &self.api_key, &request);
        tracing::debug!(url = %diagnostics.url, "building swap order at 1inch");
        self.quoter_request(self.client.post(url).json(&request), diagnostics)
            .await
    }
}
