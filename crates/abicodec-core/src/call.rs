//! Output type shared by every decode request: function calls, event logs,
//! revert data and constructor arguments all produce a `DecodedCall`.

use crate::value::AbiValue;
use serde::Serialize;
use std::fmt;

/// One decoded parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedParam {
    /// Declared parameter name (may be empty)
    pub name: String,
    /// Declared type, e.g. "uint256", "address[]", "tuple"
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: AbiValue,
}

impl DecodedParam {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: AbiValue) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value,
        }
    }
}

/// Result of decoding a function call, event log, error or constructor.
///
/// Params keep declaration order and duplicates; name lookup is a derived,
/// case-insensitive convenience on top of that list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCall {
    /// Function / event / error name ("" for constructors)
    pub name: String,
    /// Decoded params in declaration order
    pub params: Vec<DecodedParam>,
}

impl DecodedCall {
    pub fn new(name: impl Into<String>, params: Vec<DecodedParam>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// First param whose name matches `name`, ignoring ASCII case.
    pub fn param(&self, name: &str) -> Option<&DecodedParam> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Value of the first param named `name`, ignoring ASCII case.
    pub fn value(&self, name: &str) -> Option<&AbiValue> {
        self.param(name).map(|p| &p.value)
    }

    /// Values in declaration order.
    pub fn values(&self) -> Vec<AbiValue> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// `name(arg=value, ...)`
impl fmt::Display for DecodedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .params
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        write!(f, "{}({})", self.name, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecodedCall {
        DecodedCall::new(
            "transfer",
            vec![
                DecodedParam::new("to", "address", AbiValue::Hex("0xabc".into())),
                DecodedParam::new("Amount", "uint256", AbiValue::uint(1000)),
                DecodedParam::new("amount", "uint256", AbiValue::uint(2000)),
            ],
        )
    }

    #[test]
    fn lookup_is_case_insensitive_and_first_wins() {
        let call = sample();
        assert_eq!(call.value("AMOUNT"), Some(&AbiValue::uint(1000)));
        assert!(call.param("nonexistent").is_none());
        assert_eq!(call.len(), 3);
    }

    #[test]
    fn display_summary() {
        assert_eq!(
            sample().to_string(),
            "transfer(to=0xabc, Amount=1000, amount=2000)"
        );
    }

    #[test]
    fn serializes_with_type_key() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["params"][0]["type"], "address");
        assert_eq!(json["params"][1]["value"], "1000");
    }
}
