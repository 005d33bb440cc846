//! A periodic task that scans active quotes' deposit addresses for incoming
//! funds and advances their state on confirmation.
//!
//! A `tokio::time::interval` loop that logs and continues past individual
//! failures rather than aborting the scan.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use num_traits::CheckedSub;

use crate::error::CoreResult;
use crate::lifecycle::{PersistedQuote, QuoteStore};
use crate::units::BaseUnits;

pub const SCAN_PERIOD: Duration = Duration::from_secs(30);

/// A deposit observed on-chain at a given address.
#[derive(Debug, Clone)]
pub struct ObservedDeposit {
    pub tx_hash: String,
    pub amount_base_unit: BaseUnits,
    pub confirmations: u32,
}

/// The chain-appropriate lookup the monitor performs against a blockchain
/// indexer, keyed on deposit address and minimum amount.
/// Concrete implementations (mempool.space, a Cosmos LCD, etc.) are external
/// collaborators; only this contract is normative here.
#[async_trait]
pub trait DepositIndexer: Send + Sync {
    async fn find_deposit(
        &self,
        chain_id: &str,
        deposit_address: &str,
        minimum_amount_base_unit: &BaseUnits,
    ) -> CoreResult<Option<ObservedDeposit>>;
}

/// Confirmations required before a deposit is considered final, independent
/// of the chain-specific indexer's own reorg handling.
const MIN_CONFIRMATIONS: u32 = 1;

/// Tolerance subtracted from the expected sell amount so dust-level fee
/// deductions upstream of the deposit don't cause a false miss.
fn minimum_amount(quote: &PersistedQuote) -> BaseUnits {
    let expected = quote.sell_amount_base_unit.as_biguint();
    let hundred = num_bigint::BigUint::from(100u32);
    let tolerance = expected / &hundred; // 1% tolerance
    BaseUnits::from(expected.checked_sub(&tolerance).unwrap_or_else(num_bigint::BigUint::default))
}

pub struct DepositMonitor {
    store: Arc<QuoteStore>,
    indexer: Arc<dyn DepositIndexer>,
}

impl DepositMonitor {
    pub fn new(store: Arc<QuoteStore>, indexer: Arc<dyn DepositIndexer>) -> Self {
        Self { store, indexer }
    }

    /// One scan pass. Individual failures are logged
    /// and never abort the rest of the scan; detecting the same deposit
    /// twice is a no-op because `mark_deposit_received` is idempotent and a
    /// non-`ACTIVE` quote is no longer on the monitor list.
    pub async fn scan_once(&self) -> ScanSummary {
        let quotes = self.store.list_to_monitor();
        let mut matched = 0;
        let mut errored = 0;

        for quote in &quotes {
            let chain_id = quote.sell_aid.chain_id();
            let minimum = minimum_amount(quote);

            let lookup = self
                .indexer
                .find_deposit(chain_id, &quote.deposit_address, &minimum)
                .await;

            match lookup {
                Ok(Some(deposit)) if deposit.confirmations >= MIN_CONFIRMATIONS => {
                    if let Err(err) = self
                        .store
                        .mark_deposit_received(&quote.quote_id, deposit.tx_hash.clone())
                    {
                        tracing::warn!(quote_id = %quote.quote_id, error = %err, "failed to record deposit");
                        errored += 1;
                    } else {
                        matched += 1;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(quote_id = %quote.quote_id, error = %err, "deposit lookup failed");
                    errored += 1;
                }
            }
        }

        ScanSummary { scanned: quotes.len(), matched, errored }
    }

    /// Runs `scan_once` on a fixed interval until the process shuts down.
    pub async fn run_forever(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(SCAN_PERIOD);
        loop {
            ticker.tick().await;
            let summary = self.scan_once().await;
            if summary.matched > 0 || summary.errored > 0 {
                tracing::info!(?summary, "deposit monitor scan complete");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub matched: usize,
    pub errored: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use crate::derivation::Deriver;
    use crate::lifecycle::CreateQuoteRequest;
    use crate::providers::ProviderId;
    use std::sync::Mutex;

    struct StubIndexer {
        deposit: Option<ObservedDeposit>,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl DepositIndexer for StubIndexer {
        async fn find_deposit(
            &self,
            _chain_id: &str,
            _address: &str,
            _minimum: &BaseUnits,
        ) -> CoreResult<Option<ObservedDeposit>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.deposit.clone())
        }
    }

    fn quote_request() -> CreateQuoteRequest {
        CreateQuoteRequest {
            sell_aid: AssetId::new("eip155:1/slip44:60"),
            buy_aid: AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0"),
            sell_amount_base_unit: BaseUnits::from_u64(1_000_000_000_000_000_000),
            expected_buy_amount_base_unit: BaseUnits::from_u64(4_000_000),
            receive_address: "bc1receiveraddress".to_string(),
            provider: ProviderId::Thorchain,
        }
    }

    #[tokio::test]
    async fn scan_marks_deposit_received_on_match() {
        let store = Arc::new(QuoteStore::new(Deriver::from_raw_seed(vec![8u8; 64]), 0));
        let quote = store.create(quote_request()).unwrap();

        let indexer = Arc::new(StubIndexer {
            deposit: Some(ObservedDeposit {
                tx_hash: "0xdeadbeef".to_string(),
                amount_base_unit: BaseUnits::from_u64(1_000_000_000_000_000_000),
                confirmations: 3,
            }),
            calls: Mutex::new(0),
        });

        let monitor = DepositMonitor::new(store.clone(), indexer);
        let summary = monitor.scan_once().await;
        assert_eq!(summary.matched, 1);

        let updated = store.get(&quote.quote_id).unwrap();
        assert_eq!(updated.status, crate::lifecycle::QuoteStatus::DepositReceived);
    }

    #[tokio::test]
    async fn scan_is_a_noop_without_a_deposit() {
        let store = Arc::new(QuoteStore::new(Deriver::from_raw_seed(vec![8u8; 64]), 0));
        store.create(quote_request()).unwrap();

        let indexer = Arc::new(StubIndexer { deposit: None, calls: Mutex::new(0) });
        let monitor = DepositMonitor::new(store, indexer);
        let summary = monitor.scan_once().await;
        assert_eq!(summary.matched, 0);
        assert_eq!(summary.scanned, 1);
    }
}
