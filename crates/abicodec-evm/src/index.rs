//! Selector → entry lookup table.
//!
//! Built once over an [`AbiDefinition`] and read-only afterwards. Keys are
//! lower-case hex selectors without a `0x` prefix: 8 characters for
//! functions and errors, 64 for events and constructors.

use std::{collections::HashMap, sync::Arc};
use tracing::warn;

use crate::definition::AbiDefinition;
use crate::entry::{Entry, FunctionKind};

/// Immutable selector index.
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    by_selector: HashMap<String, Arc<Entry>>,
}

impl SignatureIndex {
    /// Index every entry of `abi`.
    ///
    /// Two entries with the same selector is not an error: the entry that
    /// appears later in the document replaces the earlier one and a warning
    /// is logged.
    pub fn build(abi: &AbiDefinition) -> Self {
        let mut by_selector: HashMap<String, Arc<Entry>> = HashMap::with_capacity(abi.len());
        for entry in abi.iter() {
            // fallback/receive have no selector of their own
            if matches!(entry.as_function(), Some(f) if f.kind() != FunctionKind::Function) {
                continue;
            }
            let key = entry.selector_hex();
            if let Some(prev) = by_selector.insert(key.clone(), Arc::clone(entry)) {
                warn!(
                    selector = %key,
                    replaced = %prev.canonical_signature(),
                    by = %entry.canonical_signature(),
                    "selector collision; keeping the later entry"
                );
            }
        }
        Self { by_selector }
    }

    /// Exact lookup by hex selector. Accepts an optional `0x` prefix and
    /// either case.
    pub fn get(&self, selector_hex: &str) -> Option<&Arc<Entry>> {
        let key = abicodec_core::hash::strip_0x(selector_hex);
        match self.by_selector.get(key) {
            Some(entry) => Some(entry),
            None if key.bytes().any(|b| b.is_ascii_uppercase()) => {
                self.by_selector.get(&key.to_ascii_lowercase())
            }
            None => None,
        }
    }

    /// Lookup by raw selector bytes.
    pub fn get_bytes(&self, selector: &[u8]) -> Option<&Arc<Entry>> {
        self.by_selector.get(&hex::encode(selector))
    }

    pub fn contains(&self, selector_hex: &str) -> bool {
        self.get(selector_hex).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_selector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_selector.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Function, StateMutability};
    use crate::param::Param;
    use abicodec_core::types::SolidityType;

    fn function(name: &str, param_name: &str) -> Entry {
        Entry::Function(Function::new(
            name,
            vec![Param::new(param_name, SolidityType::Address)],
            vec![],
            StateMutability::NonPayable,
        ))
    }

    #[test]
    fn lookup_ignores_prefix_and_case() {
        let abi = AbiDefinition::new(vec![function("transfer", "to")]);
        let index = SignatureIndex::build(&abi);
        let key = index.by_selector.keys().next().unwrap().clone();
        assert!(index.contains(&key));
        assert!(index.contains(&format!("0x{}", key.to_uppercase())));
        assert!(index.get_bytes(&hex::decode(&key).unwrap()).is_some());
        assert!(!index.contains("deadbeef"));
    }

    #[test]
    fn receive_is_not_indexed() {
        let receive = Entry::Function(Function::with_kind(
            FunctionKind::Receive,
            "",
            vec![],
            vec![],
            StateMutability::Payable,
        ));
        let abi = AbiDefinition::new(vec![receive, function("transfer", "to")]);
        assert_eq!(SignatureIndex::build(&abi).len(), 1);
    }

    #[test]
    fn later_entry_wins_on_collision() {
        // same signature, different param names: identical selectors
        let abi = AbiDefinition::new(vec![function("approve", "first"), function("approve", "second")]);
        let index = SignatureIndex::build(&abi);
        assert_eq!(index.len(), 1);
        let entry = index.by_selector.values().next().unwrap();
        assert_eq!(entry.inputs()[0].name, "second");
    }
}
