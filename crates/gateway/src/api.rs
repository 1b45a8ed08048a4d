use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header},
        response::{IntoResponse, Json, Response},
    },
    chrono::{DateTime, Utc},
    serde::Serialize,
    serde_json::Value,
    shared::{
        oneinch_api::{ApiError, OneInchApi, RequestDiagnostics, SwapApiError},
        token_catalog::TokenCatalog,
    },
    std::sync::Arc,
    tower_http::{cors::CorsLayer, trace::TraceLayer},
    url::Url,
};

mod get_quote;
mod get_tokens;
mod get_tokens_by_chains;
mod health;
mod index;
mod post_build_order;

/// Centralized application state shared across all API handlers.
pub struct AppState {
    pub catalog: TokenCatalog,
    pub oneinch: Arc<dyn OneInchApi>,
    pub default_chain_id: u64,
}

const MAX_JSON_BODY_PAYLOAD: usize = 1024 * 16;

pub fn handle_all_routes(state: Arc<AppState>, frontend_origin: &Url) -> Router {
    let router = Router::new()
        .route("/", axum::routing::get(index::index_handler))
        .route("/health", axum::routing::get(health::health_handler))
        .route(
            "/api/tokens",
            axum::routing::get(get_tokens::get_tokens_handler),
        )
        .route(
            "/api/tokens/chains",
            axum::routing::get(get_tokens_by_chains::get_tokens_by_chains_handler),
        )
        .route("/quote", axum::routing::get(get_quote::get_quote_handler))
        .route(
            "/swap/build",
            axum::routing::post(post_build_order::post_build_order_handler),
        )
        .fallback(endpoint_not_found)
        .with_state(state);

    finalize_router(router, frontend_origin)
}

/// Sets up cors, body limits and proper log tracing for all routes.
fn finalize_router(router: Router, frontend_origin: &Url) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(frontend_origin))
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    router
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_PAYLOAD))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn allowed_origins(frontend_origin: &Url) -> Vec<HeaderValue> {
    let mut origins = vec![frontend_origin.origin().ascii_serialization()];
    for dev_origin in ["http://localhost:3000", "http://127.0.0.1:3000"] {
        if !origins.iter().any(|origin| origin == dev_origin) {
            origins.push(dev_origin.to_string());
        }
    }
    origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin).expect("origin is not a valid header value"))
        .collect()
}

/// Uniform failure body used by the token endpoints.
#[derive(Serialize)]
pub(crate) struct ErrorReply {
    pub success: bool,
    pub message: String,
    pub error: ErrorDetail,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub code: String,
}

/// Maps an upstream failure onto the upstream's status code, falling back to
/// 500 when it does not translate.
pub(crate) fn envelope_error(message: &str, error: &ApiError) -> Response {
    let status =
        StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorReply {
            success: false,
            message: message.to_string(),
            error: ErrorDetail {
                message: error.message.clone(),
                status: Some(error.status),
                code: error.code.clone(),
            },
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

pub(crate) fn internal_error_reply(message: &str, detail: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorReply {
            success: false,
            message: message.to_string(),
            error: ErrorDetail {
                message: detail.into(),
                status: None,
                code: "INTERNAL_ERROR".to_string(),
            },
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

/// Body returned for failed quoter calls: the upstream payload verbatim plus
/// the outgoing request for debugging.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoterFailureReply {
    error: &'static str,
    details: Value,
    request_info: RequestDiagnostics,
}

pub(crate) fn quoter_failure_reply(message: &'static str, error: SwapApiError) -> Response {
    tracing::warn!(status = error.status, message, "1inch quoter call failed");
    let status =
        StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(QuoterFailureReply {
            error: message,
            details: error.details,
            request_info: error.request,
        }),
    )
        .into_response()
}

/// Parameter validation failure, rejected before any upstream call happens.
#[derive(Debug, PartialEq)]
pub(crate) enum ValidationError {
    MissingParameters(&'static [&'static str]),
    InvalidWalletAddress(String),
    InvalidChainId(String),
}

#[derive(Serialize)]
struct MissingParametersReply {
    error: &'static str,
    required: &'static [&'static str],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvalidWalletAddressReply {
    error: &'static str,
    wallet_address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvalidChainIdReply {
    error: &'static str,
    chain_id: String,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::MissingParameters(required) => Json(MissingParametersReply {
                error: "Missing required parameters",
                required,
            })
            .into_response(),
            Self::InvalidWalletAddress(wallet_address) => Json(InvalidWalletAddressReply {
                error: "Invalid wallet address format",
                wallet_address,
            })
            .into_response(),
            Self::InvalidChainId(chain_id) => Json(InvalidChainIdReply {
                error: "Invalid chain id",
                chain_id,
            })
            .into_response(),
        };
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

#[derive(Serialize)]
struct NotFoundReply {
    success: bool,
    message: &'static str,
    path: String,
    timestamp: DateTime<Utc>,
}

async fn endpoint_not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundReply {
            success: false,
            message: "Endpoint not found",
            path: uri.path().to_string(),
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{body::Body, http::Request},
        http_body_util::BodyExt,
        shared::oneinch_api::MockOneInchApi,
        tower::ServiceExt,
    };

    fn test_router(api: MockOneInchApi) -> Router {
        let api: Arc<dyn OneInchApi> = Arc::new(api);
        let state = Arc::new(AppState {
            catalog: TokenCatalog::new(api.clone()),
            oneinch: api,
            default_chain_id: 1,
        });
        handle_all_routes(state, &Url::parse("http://localhost:3000").unwrap())
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn example_catalog() -> shared::oneinch_api::RawCatalog {
        serde_json::from_str(
            r#"{
                "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa": {"chainId": "1", "symbol": "X"},
                "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb": {"chainId": "137", "symbol": "Y"}
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let router = test_router(MockOneInchApi::new());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn unknown_endpoints_get_a_404_body() {
        let router = test_router(MockOneInchApi::new());
        let response = router
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["path"], "/nope");
    }

    #[tokio::test]
    async fn tokens_endpoint_returns_normalized_catalog() {
        let mut api = MockOneInchApi::new();
        api.expect_get_token_list()
            .times(1)
            .return_once(|_| Ok(example_catalog()));
        let router = test_router(api);

        let response = router
            .oneshot(Request::get("/api/tokens").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][1]["chainId"], 137);
        assert_eq!(body["data"][1]["symbol"], "Y");
    }

    #[tokio::test]
    async fn tokens_endpoint_passes_the_upstream_status_through() {
        let mut api = MockOneInchApi::new();
        api.expect_get_token_list().times(1).return_once(|_| {
            Err(ApiError {
                message: "invalid token".to_string(),
                status: 401,
                code: "AUTH_FAILED".to_string(),
            })
        });
        let router = test_router(api);

        let response = router
            .oneshot(Request::get("/api/tokens").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["status"], 401);
        assert_eq!(body["error"]["code"], "AUTH_FAILED");
    }

    #[tokio::test]
    async fn chain_filter_reports_counts() {
        let mut api = MockOneInchApi::new();
        api.expect_get_token_list()
            .times(1)
            .return_once(|_| Ok(example_catalog()));
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get("/api/tokens/chains?chainIds=137")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["filteredChains"], serde_json::json!([137]));
        assert_eq!(body["totalTokens"], 2);
        assert_eq!(body["filteredCount"], 1);
    }

    #[tokio::test]
    async fn unmatched_chain_filter_is_not_an_empty_success() {
        let mut api = MockOneInchApi::new();
        api.expect_get_token_list()
            .times(1)
            .return_once(|_| Ok(example_catalog()));
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get("/api/tokens/chains?chainIds=999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "FILTER_ERROR");
    }

    #[tokio::test]
    async fn unparseable_chain_list_is_rejected_without_an_upstream_call() {
        let mut api = MockOneInchApi::new();
        api.expect_get_token_list().times(0);
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get("/api/tokens/chains?chainIds=foo,bar")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "No valid chain IDs provided");
    }

    #[tokio::test]
    async fn quote_with_missing_parameters_never_calls_upstream() {
        let mut api = MockOneInchApi::new();
        api.expect_get_quote().times(0);
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get("/quote?amount=1000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Missing required parameters");
        assert!(body["required"].as_array().unwrap().len() >= 4);
    }

    #[tokio::test]
    async fn quote_with_malformed_wallet_never_calls_upstream() {
        let mut api = MockOneInchApi::new();
        api.expect_get_quote().times(0);
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get(
                    "/quote?srcTokenAddress=0xa&dstTokenAddress=0xb\
                     &amount=1000&walletAddress=not-an-address",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid wallet address format");
        assert_eq!(body["walletAddress"], "not-an-address");
    }

    #[tokio::test]
    async fn quote_passes_the_raw_upstream_body_through() {
        let mut api = MockOneInchApi::new();
        api.expect_get_quote()
            .times(1)
            .withf(|query| {
                // unspecified chain ids fall back to the configured default
                query.src_chain == 1
                    && query.dst_chain == 1
                    && query.amount == "1000"
                    && !query.enable_estimate
            })
            .return_once(|_| Ok(serde_json::json!({"quoteId": "deadbeef", "presets": {}})));
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::get(
                    "/quote?srcTokenAddress=0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE\
                     &dstTokenAddress=0x111111111117dc0aa78b770fa6a738034120c302\
                     &amount=1000&walletAddress=0x00000000219ab540356cBB839Cbe05303d7705Fa",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["quoteId"], "deadbeef");
    }

    #[tokio::test]
    async fn build_with_missing_parameters_never_calls_upstream() {
        let mut api = MockOneInchApi::new();
        api.expect_build_order().times(0);
        let router = test_router(api);

        let response = router
            .oneshot(
                Request::post("/swap/build")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Missing required parameters");
        assert_eq!(body["required"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn build_failure_echoes_upstream_details_and_diagnostics() {
        let mut api = MockOneInchApi::new();
        api.expect_build_order().times(1).return_once(|request| {
            Err(SwapApiError {
                status: 400,
                details: serde_json::json!({"description": "insufficient liquidity"}),
                request: RequestDiagnostics {
                    url: "https://api.1inch.dev/fusion-plus/quoter/v1.0/quote/build".to_string(),
                    method: "POST",
                    headers: shared::oneinch_api::RequestHeaders {
                        accept: "application/json",
                        authorization: "Bearer secre...".to_string(),
                    },
                    params: None,
                    data: serde_json::to_value(&request).ok(),
                },
            })
        });
        let router = test_router(api);

        let body = serde_json::json!({
            "srcChain": 1,
            "dstChain": 137,
            "srcTokenAddress": "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE",
            "dstTokenAddress": "0x111111111117dc0aa78b770fa6a738034120c302",
            "amount": "1000",
            "walletAddress": "0x00000000219ab540356cBB839Cbe05303d7705Fa",
        });
        let response = router
            .oneshot(
                Request::post("/swap/build")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to build swap order");
        assert_eq!(body["details"]["description"], "insufficient liquidity");
        assert_eq!(body["requestInfo"]["method"], "POST");
    }
}
