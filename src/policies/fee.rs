use crate::policies::PathSelector;
use crate::protobuf::varint::varint_from_le_bytes;
use crate::protobuf::{Decision, DecodePolicy, FieldPath, WireType};

/// Path of each `Tx.auth_info.fee.amount[]` coin in a Cosmos SDK transaction.
const FEE_COIN_PATH: [u64; 3] = [2, 2, 1];

/// Path of `Tx.auth_info.fee.amount[].denom` in a Cosmos SDK transaction.
pub const FEE_DENOM_PATH: [u64; 4] = [2, 2, 1, 1];

/// Path of `Tx.auth_info.fee.amount[].amount` in a Cosmos SDK transaction.
pub const FEE_AMOUNT_PATH: [u64; 4] = [2, 2, 1, 2];

/// Path of `Tx.auth_info.fee.gas_limit` in a Cosmos SDK transaction.
pub const GAS_LIMIT_PATH: [u64; 3] = [2, 2, 2];

/// Fee paid by a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fee {
    pub denom: String,

    /// Amount as a decimal string. Cosmos SDK amounts are arbitrary precision
    /// integers, so this is not parsed.
    pub amount: String,

    pub gas_limit: Option<u64>,
}

/// Policy which extracts the fee from an encoded Cosmos SDK `Tx` message.
///
/// Only the messages on the way to the fee are parsed. The transaction body
/// and signatures, which make up most of the message, are skipped. If the fee
/// has several coins, the last one wins. The denomination and amount always
/// come from the same coin, so if the last coin lacks either one there is no
/// [`fee`](FeeExtractor::fee).
///
/// ```
/// use protoscan::policies::FeeExtractor;
/// use protoscan::protobuf::parse;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Tx { auth_info: { fee: { amount: [{ denom: "uatom", amount: "5000" }] } } }
/// let tx = [
///     0x12, 0x11, 0x12, 0x0f, 0x0a, 0x0d, 0x0a, 0x05, b'u', b'a', b't', b'o', b'm',
///     0x12, 0x04, b'5', b'0', b'0', b'0',
/// ];
/// let mut extractor = FeeExtractor::new();
/// parse(&tx, &mut extractor)?;
/// assert_eq!(extractor.fee_denom(), Some("uatom"));
/// assert_eq!(extractor.fee_amount(), Some("5000"));
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct FeeExtractor {
    selector: PathSelector,
    fee_denom: Option<String>,
    fee_amount: Option<String>,
    gas_limit: Option<u64>,
}

impl FeeExtractor {
    pub fn new() -> Self {
        let selector = PathSelector::new()
            .with_target(&FEE_DENOM_PATH)
            .with_target(&FEE_AMOUNT_PATH)
            .with_target(&GAS_LIMIT_PATH);
        Self {
            selector,
            fee_denom: None,
            fee_amount: None,
            gas_limit: None,
        }
    }

    pub fn fee_denom(&self) -> Option<&str> {
        self.fee_denom.as_deref()
    }

    pub fn fee_amount(&self) -> Option<&str> {
        self.fee_amount.as_deref()
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    /// Return the extracted fee, if both a denomination and amount were found.
    pub fn fee(&self) -> Option<Fee> {
        Some(Fee {
            denom: self.fee_denom.clone()?,
            amount: self.fee_amount.clone()?,
            gas_limit: self.gas_limit,
        })
    }
}

impl Default for FeeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodePolicy for FeeExtractor {
    fn decide(&mut self, number: u64, parent: FieldPath) -> Decision {
        if parent.child_matches(number, &FEE_COIN_PATH) {
            // Start of a new coin.
            self.fee_denom = None;
            self.fee_amount = None;
        }
        self.selector.decide(number, parent)
    }

    fn on_field(&mut self, wire_type: WireType, _number: u64, value: &[u8], path: FieldPath) {
        let text = || String::from_utf8_lossy(value).into_owned();
        match (wire_type, path.as_slice()) {
            (WireType::LengthDelimited, p) if p == FEE_DENOM_PATH => {
                self.fee_denom = Some(text());
            }
            (WireType::LengthDelimited, p) if p == FEE_AMOUNT_PATH => {
                self.fee_amount = Some(text());
            }
            (WireType::Varint, p) if p == GAS_LIMIT_PATH => {
                self.gas_limit = Some(varint_from_le_bytes(value));
            }
            _ => {}
        }
    }
}
