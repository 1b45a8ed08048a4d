use {
    crate::api::{AppState, ValidationError, quoter_failure_reply},
    axum::{
        extract::{Query, State},
        response::{IntoResponse, Json, Response},
    },
    serde::Deserialize,
    shared::oneinch_api::{QuoteQuery, parse_wallet_address},
    std::sync::Arc,
};

const REQUIRED_PARAMETERS: &[&str] = &[
    "srcTokenAddress or fromTokenAddress",
    "dstTokenAddress or toTokenAddress",
    "amount",
    "walletAddress",
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryParams {
    pub src_token_address: Option<String>,
    pub dst_token_address: Option<String>,
    // Legacy parameter names, still accepted as fallbacks.
    pub from_token_address: Option<String>,
    pub to_token_address: Option<String>,
    pub src_chain: Option<String>,
    pub dst_chain: Option<String>,
    pub amount: Option<String>,
    pub wallet_address: Option<String>,
    pub enable_estimate: Option<String>,
    pub fee: Option<String>,
    pub is_permit2: Option<String>,
    pub permit: Option<String>,
}

impl QueryParams {
    fn validate(self, default_chain_id: u64) -> Result<QuoteQuery, ValidationError> {
        let src_token_address = self.src_token_address.or(self.from_token_address);
        let dst_token_address = self.dst_token_address.or(self.to_token_address);
        let (Some(src_token_address), Some(dst_token_address), Some(amount), Some(wallet)) =
            (src_token_address, dst_token_address, self.amount, self.wallet_address)
        else {
            return Err(ValidationError::MissingParameters(REQUIRED_PARAMETERS));
        };
        let wallet_address =
            parse_wallet_address(&wallet).ok_or(ValidationError::InvalidWalletAddress(wallet))?;

        Ok(QuoteQuery {
            src_chain: parse_chain(self.src_chain, default_chain_id)?,
            dst_chain: parse_chain(self.dst_chain, default_chain_id)?,
            src_token_address,
            dst_token_address,
            amount,
            wallet_address,
            enable_estimate: self
                .enable_estimate
                .as_deref()
                .map(|value| value == "true")
                .unwrap_or(false),
            fee: self.fee.unwrap_or_else(|| "0".to_string()),
            is_permit2: self.is_permit2,
            permit: self.permit,
        })
    }
}

fn parse_chain(raw: Option<String>, default_chain_id: u64) -> Result<u64, ValidationError> {
    match raw {
        None => Ok(default_chain_id),
        Some(raw) => raw.parse().map_err(|_| ValidationError::InvalidChainId(raw)),
    }
}

pub async fn get_quote_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> Response {
    let query = match query.validate(state.default_chain_id) {
        Ok(query) => query,
        Err(err) => return err.into_response(),
    };

    tracing::debug!(
        src_chain = query.src_chain,
        dst_chain = query.dst_chain,
        "fetching quote"
    );
    match state.oneinch.get_quote(query).await {
        Ok(quote) => Json(quote).into_response(),
        Err(err) => quoter_failure_reply("Failed to fetch quote", err),
    }
}
