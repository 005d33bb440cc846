//! Wire DTOs for the HTTP boundary. Handlers translate to/from
//! these; no core type is serialized directly to the wire.

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::lifecycle::{PersistedQuote, QuoteStatus};
use crate::providers::ProviderId;
use crate::types::MultiStepRoute;
use crate::units::BaseUnits;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteBody {
    pub sell_asset_id: AssetId,
    pub buy_asset_id: AssetId,
    pub sell_amount_crypto_base_unit: BaseUnits,
    pub receive_address: String,
    pub swapper_name: String,
    pub expected_buy_amount_crypto_base_unit: BaseUnits,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDto {
    pub quote_id: String,
    pub status: QuoteStatus,
    pub sell_asset_id: AssetId,
    pub buy_asset_id: AssetId,
    pub sell_amount_crypto_base_unit: BaseUnits,
    pub expected_buy_amount_crypto_base_unit: BaseUnits,
    pub deposit_address: String,
    pub receive_address: String,
    pub provider: ProviderId,
    pub gas_overhead_base_unit: Option<BaseUnits>,
    pub deposit_tx_hash: Option<String>,
    pub execution_tx_hash: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub qr_data: String,
}

impl From<PersistedQuote> for QuoteDto {
    fn from(q: PersistedQuote) -> Self {
        let qr_data = crate::lifecycle::payment_uri(&q);
        Self {
            quote_id: q.quote_id,
            status: q.status,
            sell_asset_id: q.sell_aid,
            buy_asset_id: q.buy_aid,
            sell_amount_crypto_base_unit: q.sell_amount_base_unit,
            expected_buy_amount_crypto_base_unit: q.expected_buy_amount_base_unit,
            deposit_address: q.deposit_address,
            receive_address: q.receive_address,
            provider: q.provider,
            gas_overhead_base_unit: q.gas_overhead_base_unit,
            deposit_tx_hash: q.deposit_tx_hash,
            execution_tx_hash: q.execution_tx_hash,
            created_at: q.created_at,
            expires_at: q.expires_at,
            qr_data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStepQuoteBody {
    pub sell_asset_id: AssetId,
    pub buy_asset_id: AssetId,
    pub sell_amount_crypto_base_unit: BaseUnits,
    pub user_address: String,
    pub receive_address: String,
    pub max_hops: Option<usize>,
    pub max_cross_chain_hops: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStepQuoteResponse {
    pub success: bool,
    pub route: Option<MultiStepRoute>,
    pub alternative_routes: Option<Vec<MultiStepRoute>>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
