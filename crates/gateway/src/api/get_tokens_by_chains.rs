use {
    crate::api::{AppState, envelope_error, internal_error_reply},
    axum::{
        extract::{Query, State},
        response::{IntoResponse, Json, Response},
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    shared::token_catalog::Token,
    std::sync::Arc,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryParams {
    /// Comma-separated chain ids, e.g. "1,137,56".
    pub chain_ids: Option<String>,
}

/// Malformed entries are dropped rather than failing the whole list.
fn parse_chain_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilteredTokensReply {
    success: bool,
    message: String,
    data: Vec<Token>,
    filtered_chains: Vec<u64>,
    total_tokens: usize,
    filtered_count: usize,
    timestamp: DateTime<Utc>,
}

pub async fn get_tokens_by_chains_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> Response {
    let chain_ids = match &query.chain_ids {
        Some(raw) => {
            let parsed = parse_chain_ids(raw);
            if parsed.is_empty() {
                return internal_error_reply(
                    "Failed to fetch tokens for specified chains",
                    "No valid chain IDs provided",
                );
            }
            parsed
        }
        None => Vec::new(),
    };
    tracing::debug!(chains = ?chain_ids, "fetching tokens for chains");

    match state.catalog.tokens_for_chains(&chain_ids).await {
        Ok(catalog) => {
            let message = if catalog.filtered_chains.is_empty() {
                "All tokens fetched successfully".to_string()
            } else {
                format!(
                    "Tokens fetched successfully for chains: {}",
                    catalog
                        .filtered_chains
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            };
            Json(FilteredTokensReply {
                success: true,
                message,
                data: catalog.tokens,
                filtered_chains: catalog.filtered_chains,
                total_tokens: catalog.total_tokens,
                filtered_count: catalog.filtered_count,
                timestamp: Utc::now(),
            })
            .into_response()
        }
        Err(err) => envelope_error("Failed to fetch tokens for specified chains", &err),
    }
}
