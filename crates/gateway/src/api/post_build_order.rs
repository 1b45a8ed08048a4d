use {
    crate::api::{AppState, ValidationError, quoter_failure_reply},
    axum::{
        extract::{Json, State},
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    serde_json::Value,
    shared::oneinch_api::{BuildOrderRequest, parse_wallet_address},
    std::sync::Arc,
};

const REQUIRED_PARAMETERS: &[&str] = &[
    "srcChain",
    "dstChain",
    "srcTokenAddress",
    "dstTokenAddress",
    "amount",
    "walletAddress",
];

/// Chain ids and amounts arrive as either JSON numbers or strings depending
/// on the caller; both forms are accepted and forwarded as strings.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BodyParams {
    pub src_chain: Option<Value>,
    pub dst_chain: Option<Value>,
    pub src_token_address: Option<String>,
    pub dst_token_address: Option<String>,
    pub amount: Option<Value>,
    pub wallet_address: Option<String>,
    pub fee: Option<Value>,
    pub source: Option<String>,
    pub preset: Option<String>,
    pub is_permit2: Option<Value>,
    pub is_mobile: Option<Value>,
    pub fee_receiver: Option<String>,
    pub permit: Option<String>,
}

impl BodyParams {
    fn validate(self) -> Result<BuildOrderRequest, ValidationError> {
        let (
            Some(src_chain),
            Some(dst_chain),
            Some(src_token_address),
            Some(dst_token_address),
            Some(amount),
            Some(wallet),
        ) = (
            self.src_chain,
            self.dst_chain,
            self.src_token_address,
            self.dst_token_address,
            self.amount,
            self.wallet_address,
        )
        else {
            return Err(ValidationError::MissingParameters(REQUIRED_PARAMETERS));
        };

        let amount = stringified(&amount)
            .ok_or(ValidationError::MissingParameters(REQUIRED_PARAMETERS))?;
        let wallet_address =
            parse_wallet_address(&wallet).ok_or(ValidationError::InvalidWalletAddress(wallet))?;

        Ok(BuildOrderRequest {
            src_chain: parse_chain(&src_chain)?,
            dst_chain: parse_chain(&dst_chain)?,
            src_token_address,
            dst_token_address,
            amount,
            wallet_address,
            fee: self
                .fee
                .as_ref()
                .and_then(stringified)
                .unwrap_or_else(|| "0".to_string()),
            source: self.source.unwrap_or_else(|| "Frontend".to_string()),
            preset: self.preset.unwrap_or_else(|| "fast".to_string()),
            is_permit2: self.is_permit2.as_ref().and_then(stringified),
            is_mobile: self.is_mobile.as_ref().and_then(stringified),
            fee_receiver: self.fee_receiver,
            permit: self.permit,
        })
    }
}

fn parse_chain(value: &Value) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidChainId(value.to_string());
    match value {
        Value::Number(number) => number.as_u64().ok_or_else(invalid),
        Value::String(raw) => raw.parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn stringified(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub async fn post_build_order_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BodyParams>,
) -> Response {
    let request = match body.validate() {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    tracing::debug!(
        src_chain = request.src_chain,
        dst_chain = request.dst_chain,
        preset = %request.preset,
        "building swap order"
    );
    match state.oneinch.build_order(request).await {
        Ok(order) => Json(order).into_response(),
        Err(err) => quoter_failure_reply("Failed to build swap order", err),
    }
}
