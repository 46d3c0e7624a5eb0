use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt;

use crate::intelligence::classifier::lovelace_to_ada;
use crate::ledger::TxUtxos;

/// Max counterparties kept per direction for each address.
pub const COUNTERPARTY_PREVIEW: usize = 3;

/// Part an address played in a block's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Receiver,
    SelfTransfer,
    Sender,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Receiver => "receiver",
            Role::SelfTransfer => "self",
            Role::Sender => "sender",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one block says about a single address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressActivity {
    pub address: String,
    /// First transaction in block order that touched the address.
    pub tx_id: String,
    /// Total output of `tx_id`, shared by every address in that transaction.
    pub amount: Decimal,
    pub roles: BTreeSet<Role>,
    pub sent_to: IndexSet<String>,
    pub received_from: IndexSet<String>,
}

impl AddressActivity {
    fn new(address: &str, tx_id: &str, amount: Decimal) -> Self {
        Self {
            address: address.to_string(),
            tx_id: tx_id.to_string(),
            amount,
            roles: BTreeSet::new(),
            sent_to: IndexSet::new(),
            received_from: IndexSet::new(),
        }
    }

    /// `"sender"`, `"receiver/sender"`, ... sorted by name; `"unknown"` when empty.
    pub fn role_label(&self) -> String {
        let mut names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        if names.is_empty() {
            return "unknown".into();
        }
        names.sort_unstable();
        names.join("/")
    }
}

fn merge_preview<'a>(list: &mut IndexSet<String>, addresses: impl Iterator<Item = &'a String>) {
    for address in addresses {
        if list.len() >= COUNTERPARTY_PREVIEW {
            break;
        }
        if !list.contains(address) {
            list.insert(address.clone());
        }
    }
}

/// Folds a block's transactions into per-address activity, in the order
/// addresses are first seen.
#[derive(Debug, Default)]
pub struct TransactionAggregator {
    activity: IndexMap<String, AddressActivity>,
}

impl TransactionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one transaction into the running per-address state.
    pub fn record(&mut self, tx_id: &str, utxos: &TxUtxos) {
        let total_output = lovelace_to_ada(utxos.total_output_lovelace());

        let senders: IndexSet<&String> = utxos.inputs.iter().collect();
        let receivers: IndexSet<&String> = utxos.outputs.iter().map(|o| &o.address).collect();
        let all_addresses: IndexSet<&String> = senders.union(&receivers).copied().collect();

        for address in all_addresses {
            let entry = self
                .activity
                .entry(address.clone())
                .or_insert_with(|| AddressActivity::new(address, tx_id, total_output));

            let is_sender = senders.contains(address);
            let is_receiver = receivers.contains(address);
            let sent_to_others: Vec<&String> =
                receivers.iter().copied().filter(|r| *r != address).collect();
            let received_from_others: Vec<&String> =
                senders.iter().copied().filter(|s| *s != address).collect();

            if is_sender && is_receiver && sent_to_others.is_empty() && received_from_others.is_empty() {
                entry.roles.insert(Role::SelfTransfer);
                continue;
            }

            if is_sender && !sent_to_others.is_empty() {
                entry.roles.insert(Role::Sender);
                merge_preview(&mut entry.sent_to, sent_to_others.into_iter());
            }

            if is_receiver && !received_from_others.is_empty() {
                entry.roles.insert(Role::Receiver);
                merge_preview(&mut entry.received_from, received_from_others.into_iter());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&AddressActivity> {
        self.activity.get(address)
    }

    pub fn into_activity(self) -> IndexMap<String, AddressActivity> {
        self.activity
    }
}

/// Aggregate a whole block in one call.
pub fn aggregate<'a, I>(transactions: I) -> IndexMap<String, AddressActivity>
where
    I: IntoIterator<Item = (&'a str, &'a TxUtxos)>,
{
    let mut aggregator = TransactionAggregator::new();
    for (tx_id, utxos) in transactions {
        aggregator.record(tx_id, utxos);
    }
    aggregator.into_activity()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
