//! Proposal IDs and values are written by hand in simulation files, sometimes as YAML integers and
//! sometimes as decimal or hex strings. This helper accepts all three and serializes [`U256`] as a
//! decimal string.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer, de::Error};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    String(String),
}

impl Quantity {
    fn into_u256<E: Error>(self) -> Result<U256, E> {
        match self {
            Self::Number(n) => Ok(U256::from(n)),
            Self::String(s) => U256::from_str(s.trim()).map_err(E::custom),
        }
    }
}

/// Serializes a [`U256`] as a decimal string.
pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Deserializes a [`U256`] from an integer, a decimal string or a `0x`-prefixed hex string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    Quantity::deserialize(deserializer)?.into_u256()
}

/// Same as the parent module, for lists of quantities.
pub mod vec {
    use super::Quantity;
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

    /// Serializes each [`U256`] as a decimal string.
    pub fn serialize<S>(values: &[U256], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    /// Deserializes a list of integers, decimal strings or hex strings.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<Quantity>::deserialize(deserializer)?.into_iter().map(Quantity::into_u256).collect()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wrapper {
        #[serde(with = "super")]
        id: U256,
        #[serde(with = "super::vec")]
        values: Vec<U256>,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let parsed: Wrapper =
            serde_yaml::from_str("id: 42\nvalues: [0, \"1000\", \"0x10\"]").unwrap();
        assert_eq!(parsed.id, U256::from(42));
        assert_eq!(parsed.values, vec![U256::ZERO, U256::from(1000), U256::from(16)]);
    }

    #[test]
    fn serializes_as_decimal_strings() {
        let wrapper = Wrapper { id: U256::from(255), values: vec![U256::from(16)] };
        assert_eq!(serde_json::to_string(&wrapper).unwrap(), r#"{"id":"255","values":["16"]}"#);
    }

    #[test]
    fn large_ids_survive_as_strings() {
        let id = "94993538235316183604131627446208186698745506498389440234931478437566939766627";
        let parsed: Wrapper =
            serde_json::from_str(&format!(r#"{{"id":"{id}","values":[]}}"#)).unwrap();
        assert_eq!(parsed.id.to_string(), id);
    }
}
