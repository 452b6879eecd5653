//! Contract call encoding for the ledger entry points.
//!
//! Calls use the Ethereum ABI: a 4-byte selector (the first four bytes of the
//! keccak-256 of the function signature) followed by 32-byte argument words.
//! Dynamic `bytes` arguments are encoded as an offset word in the head and a
//! length word plus right-padded data in the tail.

use claim_crypto::keccak256;
use claim_types::{Address, IdentityToken, Nonce, Signature, TokenAmount};

use crate::error::LedgerError;

pub const CLAIM_REWARD: &str = "claimReward(bytes32,address,uint256,bytes)";
pub const HAS_EMAIL_CLAIMED: &str = "hasEmailClaimed(bytes32)";
pub const IS_NONCE_USED: &str = "isNonceUsed(uint256)";
pub const GET_BALANCE: &str = "getBalance()";
pub const FUND_CONTRACT: &str = "fundContract(uint256)";
pub const ROTATE_AUTHORITY: &str = "rotateAuthority(address)";
pub const WITHDRAW: &str = "withdraw(address,uint256)";

const WORD: usize = 32;

/// Function selector for a canonical signature string.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// A decoded call to one of the ledger entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    ClaimReward {
        identity: IdentityToken,
        recipient: Address,
        nonce: Nonce,
        signature: Signature,
    },
    HasEmailClaimed(IdentityToken),
    IsNonceUsed(Nonce),
    GetBalance,
    FundContract(TokenAmount),
    RotateAuthority(Address),
    Withdraw { to: Address, amount: TokenAmount },
}

impl LedgerCall {
    pub fn signature(&self) -> &'static str {
        match self {
            Self::ClaimReward { .. } => CLAIM_REWARD,
            Self::HasEmailClaimed(_) => HAS_EMAIL_CLAIMED,
            Self::IsNonceUsed(_) => IS_NONCE_USED,
            Self::GetBalance => GET_BALANCE,
            Self::FundContract(_) => FUND_CONTRACT,
            Self::RotateAuthority(_) => ROTATE_AUTHORITY,
            Self::Withdraw { .. } => WITHDRAW,
        }
    }

    /// Whether the call only reads state.
    pub fn is_view(&self) -> bool {
        matches!(
            self,
            Self::HasEmailClaimed(_) | Self::IsNonceUsed(_) | Self::GetBalance
        )
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = selector(self.signature()).to_vec();
        match self {
            Self::ClaimReward {
                identity,
                recipient,
                nonce,
                signature,
            } => {
                out.extend_from_slice(identity.as_bytes());
                out.extend_from_slice(&address_word(recipient));
                out.extend_from_slice(&nonce.to_be_bytes());
                // Four head words precede the tail.
                out.extend_from_slice(&usize_word(4 * WORD));
                out.extend_from_slice(&usize_word(signature.as_bytes().len()));
                out.extend_from_slice(&pad_right(signature.as_bytes()));
            }
            Self::HasEmailClaimed(identity) => out.extend_from_slice(identity.as_bytes()),
            Self::IsNonceUsed(nonce) => out.extend_from_slice(&nonce.to_be_bytes()),
            Self::GetBalance => {}
            Self::FundContract(amount) => out.extend_from_slice(&encode_amount(*amount)),
            Self::RotateAuthority(authority) => out.extend_from_slice(&address_word(authority)),
            Self::Withdraw { to, amount } => {
                out.extend_from_slice(&address_word(to));
                out.extend_from_slice(&encode_amount(*amount));
            }
        }
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self, LedgerError> {
        if data.len() < 4 {
            return Err(invalid("call data shorter than a selector"));
        }
        let (sel, args) = data.split_at(4);

        if sel == selector(CLAIM_REWARD) {
            let identity = IdentityToken::new(word(args, 0)?);
            let recipient = decode_address(&word(args, 1)?)?;
            let nonce = Nonce::from_be_bytes(word(args, 2)?);
            let offset = word_to_usize(&word(args, 3)?)?;
            let signature = Signature::from_slice(dynamic_bytes(args, offset)?)
                .map_err(|e| invalid(&e.to_string()))?;
            Ok(Self::ClaimReward {
                identity,
                recipient,
                nonce,
                signature,
            })
        } else if sel == selector(HAS_EMAIL_CLAIMED) {
            Ok(Self::HasEmailClaimed(IdentityToken::new(word(args, 0)?)))
        } else if sel == selector(IS_NONCE_USED) {
            Ok(Self::IsNonceUsed(Nonce::from_be_bytes(word(args, 0)?)))
        } else if sel == selector(GET_BALANCE) {
            Ok(Self::GetBalance)
        } else if sel == selector(FUND_CONTRACT) {
            Ok(Self::FundContract(decode_amount(&word(args, 0)?)?))
        } else if sel == selector(ROTATE_AUTHORITY) {
            Ok(Self::RotateAuthority(decode_address(&word(args, 0)?)?))
        } else if sel == selector(WITHDRAW) {
            Ok(Self::Withdraw {
                to: decode_address(&word(args, 0)?)?,
                amount: decode_amount(&word(args, 1)?)?,
            })
        } else {
            Err(invalid(&format!("unknown selector 0x{}", hex_of(sel))))
        }
    }
}

pub fn encode_bool(value: bool) -> Vec<u8> {
    let mut out = vec![0u8; WORD];
    out[WORD - 1] = u8::from(value);
    out
}

pub fn decode_bool(data: &[u8]) -> Result<bool, LedgerError> {
    let w = word(data, 0)?;
    if w[..WORD - 1].iter().any(|b| *b != 0) || w[WORD - 1] > 1 {
        return Err(invalid("bool word out of range"));
    }
    Ok(w[WORD - 1] == 1)
}

pub fn encode_amount(amount: TokenAmount) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&amount.raw().to_be_bytes());
    out
}

/// Decode a `uint256` word into a token amount. Values above `u128::MAX`
/// cannot be held by the pool and are rejected as overflow.
pub fn decode_amount(data: &[u8]) -> Result<TokenAmount, LedgerError> {
    let w = word(data, 0)?;
    if w[..16].iter().any(|b| *b != 0) {
        return Err(LedgerError::Overflow);
    }
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&w[16..]);
    Ok(TokenAmount::new(u128::from_be_bytes(raw)))
}

fn word(data: &[u8], index: usize) -> Result<[u8; 32], LedgerError> {
    let start = index * WORD;
    let slice = data
        .get(start..start + WORD)
        .ok_or_else(|| invalid(&format!("missing argument word {index}")))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(slice);
    Ok(out)
}

fn dynamic_bytes(args: &[u8], offset: usize) -> Result<&[u8], LedgerError> {
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| invalid("bytes offset out of range"))?;
    let len_word = args
        .get(offset..start)
        .ok_or_else(|| invalid("bytes offset out of range"))?;
    let mut buf = [0u8; 32];
    buf.copy_from_slice(len_word);
    let len = word_to_usize(&buf)?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| invalid("bytes length out of range"))?;
    args.get(start..end)
        .ok_or_else(|| invalid("bytes length out of range"))
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    out
}

fn decode_address(w: &[u8; 32]) -> Result<Address, LedgerError> {
    if w[..12].iter().any(|b| *b != 0) {
        return Err(invalid("dirty address padding"));
    }
    Ok(Address::from_word(w))
}

fn usize_word(value: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&(value as u64).to_be_bytes());
    out
}

fn word_to_usize(w: &[u8; 32]) -> Result<usize, LedgerError> {
    if w[..24].iter().any(|b| *b != 0) {
        return Err(invalid("length word too large"));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&w[24..]);
    usize::try_from(u64::from_be_bytes(raw)).map_err(|_| invalid("length word too large"))
}

fn pad_right(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = data.to_vec();
    out.resize(padded, 0);
    out
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn invalid(reason: &str) -> LedgerError {
    LedgerError::InvalidCall(reason.to_string())
}
