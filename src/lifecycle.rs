//! Creates send-swap quotes, persists them, and walks each one through its
//! state machine.
//!
//! Every mutation checks a precondition on the current record before
//! writing, rather than trusting the caller.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::{chain_family, resolve_precision, AssetId, ChainFamily};
use crate::derivation::Deriver;
use crate::error::{CoreError, CoreResult};
use crate::gas::hop_overhead;
use crate::providers::classifier::ProviderClassifier;
use crate::providers::ProviderId;
use crate::types::ProviderType;
use crate::units::BaseUnits;

const QUOTE_TTL: ChronoDuration = ChronoDuration::minutes(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Active,
    DepositReceived,
    Executing,
    Completed,
    Expired,
    Failed,
}

impl QuoteStatus {
    fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Completed | QuoteStatus::Expired | QuoteStatus::Failed)
    }
}

/// Persisted send-swap quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedQuote {
    pub quote_id: String,
    pub status: QuoteStatus,
    pub sell_aid: AssetId,
    pub buy_aid: AssetId,
    pub sell_amount_base_unit: BaseUnits,
    pub expected_buy_amount_base_unit: BaseUnits,
    pub deposit_address: String,
    pub receive_address: String,
    pub provider: ProviderId,
    pub provider_type: ProviderType,
    pub gas_overhead_base_unit: Option<BaseUnits>,
    pub deposit_tx_hash: Option<String>,
    pub execution_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

pub struct CreateQuoteRequest {
    pub sell_aid: AssetId,
    pub buy_aid: AssetId,
    pub sell_amount_base_unit: BaseUnits,
    pub expected_buy_amount_base_unit: BaseUnits,
    pub receive_address: String,
    pub provider: ProviderId,
}

/// In-memory reference implementation of the quote store; the persistence
/// layout is the contract any backing database must honor, but
/// the database choice itself is out of scope.
pub struct QuoteStore {
    quotes: RwLock<HashMap<String, PersistedQuote>>,
    by_deposit_address: RwLock<HashMap<String, String>>,
    deriver: Deriver,
    account: u32,
}

impl QuoteStore {
    pub fn new(deriver: Deriver, account: u32) -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
            by_deposit_address: RwLock::new(HashMap::new()),
            deriver,
            account,
        }
    }

    fn quote_count(&self) -> u32 {
        self.quotes.read().expect("quote store lock poisoned").len() as u32
    }

    /// Creates a send-swap quote.
    pub fn create(&self, request: CreateQuoteRequest) -> CoreResult<PersistedQuote> {
        ProviderClassifier::validate_for_quote(request.provider).map_err(CoreError::Validation)?;

        let chain_id = request.sell_aid.chain_id();
        if chain_family(chain_id) == ChainFamily::Unknown {
            return Err(CoreError::UnsupportedAssetOrChain(format!(
                "cannot resolve chain family for {}",
                request.sell_aid
            )));
        }

        let address_index = self.quote_count();
        let deposit_address = self.deriver.derive(chain_id, self.account, address_index)?;

        let provider_type = ProviderClassifier::type_of(request.provider);
        let gas_overhead_base_unit = match provider_type {
            ProviderType::ServiceCustody => Some(hop_overhead(provider_type, chain_id)),
            ProviderType::Direct => None,
        };

        let now = Utc::now();
        let quote = PersistedQuote {
            quote_id: Uuid::new_v4().to_string(),
            status: QuoteStatus::Active,
            sell_aid: request.sell_aid,
            buy_aid: request.buy_aid,
            sell_amount_base_unit: request.sell_amount_base_unit,
            expected_buy_amount_base_unit: request.expected_buy_amount_base_unit,
            deposit_address: deposit_address.clone(),
            receive_address: request.receive_address,
            provider: request.provider,
            provider_type,
            gas_overhead_base_unit,
            deposit_tx_hash: None,
            execution_tx_hash: None,
            created_at: now,
            expires_at: now + QUOTE_TTL,
            executed_at: None,
        };

        self.quotes
            .write()
            .expect("quote store lock poisoned")
            .insert(quote.quote_id.clone(), quote.clone());
        self.by_deposit_address
            .write()
            .expect("deposit address index lock poisoned")
            .insert(deposit_address, quote.quote_id.clone());

        Ok(quote)
    }

    /// Reads a quote, applying lazy expiration if its window has elapsed.
    pub fn get(&self, quote_id: &str) -> Option<PersistedQuote> {
        let mut quotes = self.quotes.write().expect("quote store lock poisoned");
        let quote = quotes.get_mut(quote_id)?;
        expire_if_stale(quote);
        Some(quote.clone())
    }

    pub fn get_by_deposit_address(&self, deposit_address: &str) -> Option<PersistedQuote> {
        let quote_id = self
            .by_deposit_address
            .read()
            .expect("deposit address index lock poisoned")
            .get(deposit_address)?
            .clone();
        self.get(&quote_id)
    }

    pub fn list_active(&self) -> Vec<PersistedQuote> {
        let mut quotes = self.quotes.write().expect("quote store lock poisoned");
        quotes
            .values_mut()
            .map(|q| {
                expire_if_stale(q);
                q.clone()
            })
            .filter(|q| q.status == QuoteStatus::Active)
            .collect()
    }

    /// Quotes the deposit monitor should scan: not yet terminal.
    pub fn list_to_monitor(&self) -> Vec<PersistedQuote> {
        let mut quotes = self.quotes.write().expect("quote store lock poisoned");
        quotes
            .values_mut()
            .map(|q| {
                expire_if_stale(q);
                q.clone()
            })
            .filter(|q| matches!(q.status, QuoteStatus::Active | QuoteStatus::DepositReceived))
            .collect()
    }

    pub fn mark_deposit_received(&self, quote_id: &str, tx_hash: String) -> CoreResult<PersistedQuote> {
        self.transition(quote_id, |q| {
            if q.status == QuoteStatus::DepositReceived {
                return Ok(()); // idempotent: already observed this deposit
            }
            if q.status != QuoteStatus::Active {
                return Err(invalid_state(q.status, "mark_deposit_received"));
            }
            q.status = QuoteStatus::DepositReceived;
            q.deposit_tx_hash = Some(tx_hash.clone());
            Ok(())
        })
    }

    pub fn mark_executing(&self, quote_id: &str) -> CoreResult<PersistedQuote> {
        self.transition(quote_id, |q| {
            if q.status != QuoteStatus::DepositReceived {
                return Err(invalid_state(q.status, "mark_executing"));
            }
            q.status = QuoteStatus::Executing;
            Ok(())
        })
    }

    pub fn mark_completed(&self, quote_id: &str, tx_hash: String) -> CoreResult<PersistedQuote> {
        self.transition(quote_id, |q| {
            if q.status != QuoteStatus::Executing {
                return Err(invalid_state(q.status, "mark_completed"));
            }
            q.status = QuoteStatus::Completed;
            q.execution_tx_hash = Some(tx_hash.clone());
            q.executed_at = Some(Utc::now());
            Ok(())
        })
    }

    pub fn mark_failed(&self, quote_id: &str) -> CoreResult<PersistedQuote> {
        self.transition(quote_id, |q| {
            if q.status.is_terminal() {
                return Err(invalid_state(q.status, "mark_failed"));
            }
            q.status = QuoteStatus::Failed;
            Ok(())
        })
    }

    /// Batch lazy-expiration sweep; returns the
    /// number of quotes transitioned.
    pub fn expire_stale(&self) -> usize {
        let mut quotes = self.quotes.write().expect("quote store lock poisoned");
        let mut count = 0;
        for q in quotes.values_mut() {
            if expire_if_stale(q) {
                count += 1;
            }
        }
        count
    }

    fn transition(
        &self,
        quote_id: &str,
        mutate: impl FnOnce(&mut PersistedQuote) -> CoreResult<()>,
    ) -> CoreResult<PersistedQuote> {
        let mut quotes = self.quotes.write().expect("quote store lock poisoned");
        let quote = quotes
            .get_mut(quote_id)
            .ok_or_else(|| CoreError::InvalidState(format!("no such quote {quote_id}")))?;
        expire_if_stale(quote);
        mutate(quote)?;
        Ok(quote.clone())
    }
}

fn invalid_state(status: QuoteStatus, operation: &str) -> CoreError {
    CoreError::InvalidState(format!("cannot {operation} from status {status:?}"))
}

/// Transitions `quote` from `Active` to `Expired` if its window has elapsed.
/// Returns whether a transition occurred.
fn expire_if_stale(quote: &mut PersistedQuote) -> bool {
    if quote.status == QuoteStatus::Active && Utc::now() > quote.expires_at {
        quote.status = QuoteStatus::Expired;
        true
    } else {
        false
    }
}

/// Builds a chain-prefixed payment URI for display, with amounts rendered
/// in human-readable precision rather than base units.
pub fn payment_uri(quote: &PersistedQuote) -> String {
    let chain_id = quote.sell_aid.chain_id();
    let decimals = resolve_precision(&quote.sell_aid);
    let amount = quote.sell_amount_base_unit.to_decimal(decimals);

    match chain_family(chain_id) {
        ChainFamily::Evm => format!(
            "ethereum:{}@{}?value={}",
            quote.deposit_address, chain_id, quote.sell_amount_base_unit
        ),
        ChainFamily::Utxo => {
            let scheme = utxo_scheme(chain_id);
            format!("{scheme}:{}?amount={amount}", quote.deposit_address)
        }
        ChainFamily::Cosmos => {
            let scheme = cosmos_scheme(chain_id);
            format!("{scheme}:{}?amount={amount}", quote.deposit_address)
        }
        ChainFamily::Solana => format!("solana:{}?amount={amount}", quote.deposit_address),
        ChainFamily::Unknown => format!("{}?amount={amount}", quote.deposit_address),
    }
}

fn utxo_scheme(chain_id: &str) -> &'static str {
    match chain_id {
        "bip122:000000000019d6689c085ae165831e93" => "bitcoin",
        "bip122:12a765e31ffd4059bada1e25190f6e98" => "litecoin",
        "bip122:1a91e3dace36e2be3bf030a65679fe82" => "dogecoin",
        "bip122:000000000000000000651ef99cb9fcbe" => "bitcoincash",
        _ => "bitcoin",
    }
}

fn cosmos_scheme(chain_id: &str) -> &'static str {
    match chain_id {
        "cosmos:osmosis-1" => "osmosis",
        _ => "cosmos",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> QuoteStore {
        QuoteStore::new(Deriver::from_raw_seed(vec![4u8; 64]), 0)
    }

    fn request() -> CreateQuoteRequest {
        CreateQuoteRequest {
            sell_aid: AssetId::new("eip155:1/slip44:60"),
            buy_aid: AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0"),
            sell_amount_base_unit: BaseUnits::from_u64(1_000_000_000_000_000_000),
            expected_buy_amount_base_unit: BaseUnits::from_u64(4_000_000),
            receive_address: "bc1receiveraddress".to_string(),
            provider: ProviderId::Thorchain,
        }
    }

    #[test]
    fn create_persists_active_quote_with_deposit_address() {
        let store = store();
        let quote = store.create(request()).unwrap();
        assert_eq!(quote.status, QuoteStatus::Active);
        assert!(!quote.deposit_address.is_empty());
        assert!(quote.gas_overhead_base_unit.is_none()); // Thorchain is DIRECT
    }

    #[test]
    fn service_custody_provider_gets_gas_overhead() {
        let store = store();
        let mut req = request();
        req.provider = ProviderId::Bebop;
        let quote = store.create(req).unwrap();
        assert!(quote.gas_overhead_base_unit.is_some());
    }

    #[test]
    fn full_happy_path_transition_sequence() {
        let store = store();
        let quote = store.create(request()).unwrap();

        let received = store.mark_deposit_received(&quote.quote_id, "0xabc".to_string()).unwrap();
        assert_eq!(received.status, QuoteStatus::DepositReceived);

        // Idempotent re-application.
        let again = store.mark_deposit_received(&quote.quote_id, "0xabc".to_string()).unwrap();
        assert_eq!(again.status, QuoteStatus::DepositReceived);

        let executing = store.mark_executing(&quote.quote_id).unwrap();
        assert_eq!(executing.status, QuoteStatus::Executing);

        let completed = store.mark_completed(&quote.quote_id, "0xdef".to_string()).unwrap();
        assert_eq!(completed.status, QuoteStatus::Completed);
        assert!(completed.executed_at.is_some());
    }

    #[test]
    fn terminal_state_rejects_further_transitions() {
        let store = store();
        let quote = store.create(request()).unwrap();
        store.mark_failed(&quote.quote_id).unwrap();
        let err = store.mark_deposit_received(&quote.quote_id, "x".to_string()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn cosmos_scheme_distinguishes_osmosis_from_other_cosmos_chains() {
        assert_eq!(cosmos_scheme("cosmos:osmosis-1"), "osmosis");
        assert_eq!(cosmos_scheme("cosmos:cosmoshub-4"), "cosmos");
        assert_eq!(cosmos_scheme("cosmos:thorchain-1"), "cosmos");
    }

    #[test]
    fn address_index_is_monotonic_across_creates() {
        let store = store();
        let q1 = store.create(request()).unwrap();
        let q2 = store.create(request()).unwrap();
        assert_ne!(q1.deposit_address, q2.deposit_address);
    }

    #[test]
    fn expired_quote_rejects_deposit_received_and_reports_expired_on_get() {
        let store = store();
        let quote = store.create(request()).unwrap();

        {
            let mut quotes = store.quotes.write().unwrap();
            let stored = quotes.get_mut(&quote.quote_id).unwrap();
            stored.expires_at = Utc::now() - ChronoDuration::seconds(1);
        }

        let fetched = store.get(&quote.quote_id).unwrap();
        assert_eq!(fetched.status, QuoteStatus::Expired);

        let err = store
            .mark_deposit_received(&quote.quote_id, "0xabc".to_string())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn list_to_monitor_includes_active_and_deposit_received_only() {
        let store = store();
        let q1 = store.create(request()).unwrap();
        let q2 = store.create(request()).unwrap();
        store.mark_deposit_received(&q2.quote_id, "0xabc".to_string()).unwrap();
        store.mark_executing(&q2.quote_id).unwrap();

        let to_monitor = store.list_to_monitor();
        assert_eq!(to_monitor.len(), 1);
        assert_eq!(to_monitor[0].quote_id, q1.quote_id);
    }
}
