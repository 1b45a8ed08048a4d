use {
    crate::api::{AppState, envelope_error},
    axum::{
        extract::{Query, State},
        response::{IntoResponse, Json, Response},
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    shared::{oneinch_api::TokenListQuery, token_catalog::Token},
    std::sync::Arc,
};

#[derive(Deserialize)]
pub(crate) struct QueryParams {
    pub provider: Option<String>,
    pub country: Option<String>,
}

#[derive(Serialize)]
struct TokensReply {
    success: bool,
    message: &'static str,
    data: Vec<Token>,
    timestamp: DateTime<Utc>,
}

pub async fn get_tokens_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> Response {
    tracing::debug!(provider = ?query.provider, country = ?query.country, "fetching token list");
    let result = state
        .catalog
        .all_tokens(TokenListQuery {
            provider: query.provider,
            country: query.country,
        })
        .await;
    match result {
        Ok(tokens) => Json(TokensReply {
            success: true,
            message: "Token list fetched successfully",
            data: tokens,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(err) => envelope_error("Failed to fetch token list", &err),
    }
}
