use {
    axum::response::{IntoResponse, Json},
    chrono::{DateTime, Utc},
    serde::Serialize,
};

#[derive(Serialize)]
struct EndpointInfo {
    path: &'static str,
    method: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'static [&'static str]>,
}

const ENDPOINTS: &[EndpointInfo] = &[
    EndpointInfo {
        path: "/health",
        method: "GET",
        description: "Health check endpoint",
        parameters: None,
    },
    EndpointInfo {
        path: "/api/tokens",
        method: "GET",
        description: "Fetch all available tokens from 1inch",
        parameters: Some(&["provider (optional)", "country (optional)"]),
    },
    EndpointInfo {
        path: "/api/tokens/chains",
        method: "GET",
        description: "Fetch tokens for specific chain IDs",
        parameters: Some(&["chainIds (comma-separated)"]),
    },
    EndpointInfo {
        path: "/quote",
        method: "GET",
        description: "Fetch a cross-chain swap quote from 1inch",
        parameters: Some(&[
            "srcTokenAddress",
            "dstTokenAddress",
            "amount",
            "walletAddress",
            "srcChain (optional)",
            "dstChain (optional)",
        ]),
    },
    EndpointInfo {
        path: "/swap/build",
        method: "POST",
        description: "Assemble an unsigned swap order from a quoted trade",
        parameters: None,
    },
];

#[derive(Serialize)]
struct IndexReply {
    message: &'static str,
    version: &'static str,
    endpoints: &'static [EndpointInfo],
    timestamp: DateTime<Utc>,
}

pub async fn index_handler() -> impl IntoResponse {
    Json(IndexReply {
        message: "swap gateway API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
        timestamp: Utc::now(),
    })
}
