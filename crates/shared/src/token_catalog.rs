//! Normalization and filtering of the multi-chain token catalog.

use {
    crate::oneinch_api::{ApiError, OneInchApi, RawCatalog, TokenListQuery},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::sync::Arc,
};

/// Chain id assumed for catalog records that do not carry one.
const DEFAULT_CHAIN_ID: u64 = 1;

/// Symbolic failure tag for a chain filter that matched nothing.
pub const FILTER_ERROR: &str = "FILTER_ERROR";

/// One fungible asset on one chain. `(address, chain_id)` uniquely identifies
/// an entry within one normalized catalog; any further metadata the upstream
/// catalog carries is passed through verbatim.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub chain_id: u64,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, Value>,
}

/// A catalog restricted to a requested set of chains, along with the counts
/// the API reports back to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredCatalog {
    pub tokens: Vec<Token>,
    pub filtered_chains: Vec<u64>,
    pub total_tokens: usize,
    pub filtered_count: usize,
}

/// Produces flat, chain-tagged token lists from the upstream catalog.
pub struct TokenCatalog {
    api: Arc<dyn OneInchApi>,
}

impl TokenCatalog {
    pub fn new(api: Arc<dyn OneInchApi>) -> Self {
        Self { api }
    }

    /// Fetches and normalizes the full catalog.
    pub async fn all_tokens(&self, query: TokenListQuery) -> Result<Vec<Token>, ApiError> {
        let catalog = self.api.get_token_list(query).await?;
        let tokens = normalize(catalog);
        tracing::debug!(tokens = tokens.len(), "normalized token catalog");
        Ok(tokens)
    }

    /// Fetches the full catalog and retains only tokens on the requested
    /// chains. An empty `chain_ids` list is a no-op filter, not an error.
    pub async fn tokens_for_chains(&self, chain_ids: &[u64]) -> Result<FilteredCatalog, ApiError> {
        let all = self.all_tokens(TokenListQuery::default()).await?;
        let total_tokens = all.len();

        if chain_ids.is_empty() {
            return Ok(FilteredCatalog {
                tokens: all,
                filtered_chains: Vec::new(),
                total_tokens,
                filtered_count: total_tokens,
            });
        }

        let tokens: Vec<_> = all
            .into_iter()
            .filter(|token| chain_ids.contains(&token.chain_id))
            .collect();
        tracing::debug!(
            filtered = tokens.len(),
            total = total_tokens,
            chains = ?chain_ids,
            "filtered token catalog"
        );

        if tokens.is_empty() {
            // An empty result for an explicitly requested chain most likely
            // indicates a bad chain id rather than a genuinely empty market.
            return Err(ApiError {
                message: format!(
                    "No tokens found for chain IDs: {}",
                    chain_ids
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                status: 500,
                code: FILTER_ERROR.to_string(),
            });
        }

        Ok(FilteredCatalog {
            filtered_count: tokens.len(),
            filtered_chains: chain_ids.to_vec(),
            total_tokens,
            tokens,
        })
    }
}

fn normalize(catalog: RawCatalog) -> Vec<Token> {
    catalog
        .into_tokens()
        .into_iter()
        .map(|(address, mut record)| {
            let chain_id = record
                .remove("chainId")
                .as_ref()
                .and_then(parse_chain_id)
                .unwrap_or(DEFAULT_CHAIN_ID);
            Token {
                address,
                chain_id,
                metadata: record,
            }
        })
        .collect()
}

/// The upstream catalog is inconsistent about the type of the chain id field.
fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(raw) => raw.parse().ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}
