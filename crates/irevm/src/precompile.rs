//! Precompile dispatch.
//!
//! The engine owns the address map and the gas formulas; the cryptography
//! itself is host-provided through [`CryptoBackend`]. A `CALL` targeting a
//! precompile address skips bytecode execution entirely: the formula is
//! charged, the primitive invoked, and its output becomes the frame's
//! return data.

use core::fmt;
use primitives::{address, b256, Address, Bytes, SpecId, B256, U256};

/// ECRECOVER at 0x01.
pub const ECRECOVER: Address = address!("0000000000000000000000000000000000000001");
/// SHA2-256 at 0x02.
pub const SHA256: Address = address!("0000000000000000000000000000000000000002");
/// RIPEMD-160 at 0x03.
pub const RIPEMD160: Address = address!("0000000000000000000000000000000000000003");
/// The identity copy at 0x04.
pub const IDENTITY: Address = address!("0000000000000000000000000000000000000004");
/// MODEXP at 0x05 (EIP-198, repriced by EIP-2565).
pub const MODEXP: Address = address!("0000000000000000000000000000000000000005");
/// BN254 point addition at 0x06.
pub const BN254_ADD: Address = address!("0000000000000000000000000000000000000006");
/// BN254 scalar multiplication at 0x07.
pub const BN254_MUL: Address = address!("0000000000000000000000000000000000000007");
/// BN254 pairing check at 0x08.
pub const BN254_PAIRING: Address = address!("0000000000000000000000000000000000000008");
/// BLAKE2 compression at 0x09 (EIP-152).
pub const BLAKE2F: Address = address!("0000000000000000000000000000000000000009");
/// KZG point evaluation at 0x0a (EIP-4844).
pub const KZG_POINT_EVALUATION: Address = address!("000000000000000000000000000000000000000a");
/// BLS12-381 G1 addition at 0x0b (EIP-2537).
pub const BLS12_381_G1_ADD: Address = address!("000000000000000000000000000000000000000b");
/// BLS12-381 G1 multi-scalar multiplication at 0x0c.
pub const BLS12_381_G1_MSM: Address = address!("000000000000000000000000000000000000000c");
/// BLS12-381 G2 addition at 0x0d.
pub const BLS12_381_G2_ADD: Address = address!("000000000000000000000000000000000000000d");
/// BLS12-381 G2 multi-scalar multiplication at 0x0e.
pub const BLS12_381_G2_MSM: Address = address!("000000000000000000000000000000000000000e");
/// BLS12-381 pairing check at 0x0f.
pub const BLS12_381_PAIRING: Address = address!("000000000000000000000000000000000000000f");
/// BLS12-381 field-to-G1 mapping at 0x10.
pub const BLS12_381_MAP_FP_TO_G1: Address = address!("0000000000000000000000000000000000000010");
/// BLS12-381 field-to-G2 mapping at 0x11.
pub const BLS12_381_MAP_FP2_TO_G2: Address = address!("0000000000000000000000000000000000000011");

// EIP-2537 gas schedule and encoding sizes. Field elements are padded to
// 64 bytes, so a G1 point is 128 bytes and a G2 point 256.
const BLS_G1_ADD_GAS: u64 = 375;
const BLS_G2_ADD_GAS: u64 = 600;
const BLS_G1_MSM_MUL_GAS: u64 = 12000;
const BLS_G2_MSM_MUL_GAS: u64 = 22500;
const BLS_PAIRING_PER_PAIR_GAS: u64 = 32600;
const BLS_PAIRING_BASE_GAS: u64 = 37700;
const BLS_MAP_FP_TO_G1_GAS: u64 = 5500;
const BLS_MAP_FP2_TO_G2_GAS: u64 = 23800;
const BLS_MSM_MULTIPLIER: u64 = 1000;

/// Padded G1 point size.
const BLS_PADDED_G1: usize = 128;
/// Padded G2 point size.
const BLS_PADDED_G2: usize = 256;
/// One G1 MSM pair: a G1 point and a 32-byte scalar.
const BLS_G1_MSM_PAIR: usize = BLS_PADDED_G1 + 32;
/// One G2 MSM pair.
const BLS_G2_MSM_PAIR: usize = BLS_PADDED_G2 + 32;
/// One pairing-check pair: a G1 point and a G2 point.
const BLS_PAIRING_PAIR: usize = BLS_PADDED_G1 + BLS_PADDED_G2;

/// EIP-2537 multi-scalar multiplication discounts per pair count, in units
/// of [`BLS_MSM_MULTIPLIER`]. Counts beyond the table use the last entry.
static BLS_G1_MSM_DISCOUNT: [u16; 128] = [
    1000, 949, 848, 797, 764, 750, 738, 728, 719, 712, 705, 698, 692, 687, 682, 677, 673, 669, 665,
    661, 658, 654, 651, 648, 645, 642, 640, 637, 635, 632, 630, 627, 625, 623, 621, 619, 617, 615,
    613, 611, 609, 608, 606, 604, 603, 601, 599, 598, 596, 595, 593, 592, 591, 589, 588, 586, 585,
    584, 582, 581, 580, 579, 577, 576, 575, 574, 573, 572, 570, 569, 568, 567, 566, 565, 564, 563,
    562, 561, 560, 559, 558, 557, 556, 555, 554, 553, 552, 551, 550, 549, 548, 547, 547, 546, 545,
    544, 543, 542, 541, 540, 540, 539, 538, 537, 536, 536, 535, 534, 533, 532, 532, 531, 530, 529,
    528, 528, 527, 526, 525, 525, 524, 523, 522, 522, 521, 520, 520, 519,
];
static BLS_G2_MSM_DISCOUNT: [u16; 128] = [
    1000, 1000, 923, 884, 855, 832, 812, 796, 782, 770, 759, 749, 740, 732, 724, 717, 711, 704,
    699, 693, 688, 683, 679, 674, 670, 666, 663, 659, 655, 652, 649, 646, 643, 640, 637, 634, 632,
    629, 627, 624, 622, 620, 618, 615, 613, 611, 609, 607, 606, 604, 602, 600, 598, 597, 595, 593,
    592, 590, 589, 587, 586, 584, 583, 582, 580, 579, 578, 576, 575, 574, 573, 571, 570, 569, 568,
    567, 566, 565, 563, 562, 561, 560, 559, 558, 557, 556, 555, 554, 553, 552, 552, 551, 550, 549,
    548, 547, 546, 545, 545, 544, 543, 542, 541, 541, 540, 539, 538, 537, 537, 536, 535, 535, 534,
    533, 532, 532, 531, 530, 530, 529, 528, 528, 527, 526, 526, 525, 524, 524,
];

/// EIP-2537 multi-scalar multiplication gas, assuming 30 MGas/second.
#[inline]
fn bls_msm_gas(pairs: usize, discount_table: &[u16], multiplication_cost: u64) -> u64 {
    if pairs == 0 {
        return 0;
    }
    let index = core::cmp::min(pairs - 1, discount_table.len() - 1);
    let discount = discount_table[index] as u64;
    (pairs as u64)
        .saturating_mul(discount)
        .saturating_mul(multiplication_cost)
        / BLS_MSM_MULTIPLIER
}

/// Scalar field modulus of BLS12-381, the second half of the point
/// evaluation output.
pub const BLS_MODULUS: B256 =
    b256!("73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001");
/// Field elements per blob, the first half of the point evaluation output.
pub const FIELD_ELEMENTS_PER_BLOB: u64 = 4096;

/// Failure of a precompile invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecompileError {
    /// The gas formula exceeds the forwarded gas.
    OutOfGas,
    /// Malformed input (wrong length, invalid point, bad final byte, ...).
    InvalidInput,
    /// The host provides no implementation for this primitive.
    Unsupported(&'static str),
}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfGas => f.write_str("precompile ran out of gas"),
            Self::InvalidInput => f.write_str("invalid precompile input"),
            Self::Unsupported(name) => write!(f, "host does not implement {name}"),
        }
    }
}

impl std::error::Error for PrecompileError {}

/// Successful precompile invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Gas charged by the formula.
    pub gas_used: u64,
    /// Output bytes, surfaced as the frame's return data.
    pub bytes: Bytes,
}

/// Result of a precompile invocation.
pub type PrecompileResult = Result<PrecompileOutput, PrecompileError>;

/// Host-provided cryptographic primitives. Every method receives the raw
/// precompile input, already gas-charged and length-checked by the
/// dispatcher.
///
/// The BLS12-381 operations of EIP-2537 carry default implementations that
/// report the primitive as unsupported, so hosts that stop at Cancun need
/// not provide them.
pub trait CryptoBackend {
    /// Signature recovery; `None` for unrecoverable signatures.
    fn ecrecover(&self, msg: B256, recovery_id: u8, r: B256, s: B256)
        -> Result<Option<Address>, PrecompileError>;

    /// SHA2-256 digest.
    fn sha256(&self, input: &[u8]) -> Result<[u8; 32], PrecompileError>;

    /// RIPEMD-160 digest.
    fn ripemd160(&self, input: &[u8]) -> Result<[u8; 20], PrecompileError>;

    /// `base ** exp % modulus` over big-endian byte strings. The result is
    /// `modulus`-length.
    fn modexp(&self, base: &[u8], exp: &[u8], modulus: &[u8]) -> Result<Vec<u8>, PrecompileError>;

    /// BN254 point addition over one 128-byte input.
    fn bn254_add(&self, input: &[u8]) -> Result<[u8; 64], PrecompileError>;

    /// BN254 scalar multiplication over one 96-byte input.
    fn bn254_mul(&self, input: &[u8]) -> Result<[u8; 64], PrecompileError>;

    /// BN254 pairing check over `k` 192-byte pairs; returns the check bit.
    fn bn254_pairing(&self, input: &[u8]) -> Result<bool, PrecompileError>;

    /// BLAKE2 compression function F (EIP-152); input is the 213-byte
    /// encoding with the rounds prefix, output the 64-byte state.
    fn blake2f(&self, input: &[u8]) -> Result<[u8; 64], PrecompileError>;

    /// KZG point evaluation (EIP-4844); verifies the 192-byte proof input.
    fn kzg_point_evaluation(&self, input: &[u8]) -> Result<(), PrecompileError>;

    /// BLS12-381 G1 addition over two 128-byte padded points (EIP-2537).
    fn bls12_381_g1_add(&self, _input: &[u8]) -> Result<[u8; 128], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_g1_add"))
    }

    /// BLS12-381 G1 multi-scalar multiplication over `k` point/scalar
    /// pairs of 160 bytes each.
    fn bls12_381_g1_msm(&self, _input: &[u8]) -> Result<[u8; 128], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_g1_msm"))
    }

    /// BLS12-381 G2 addition over two 256-byte padded points.
    fn bls12_381_g2_add(&self, _input: &[u8]) -> Result<[u8; 256], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_g2_add"))
    }

    /// BLS12-381 G2 multi-scalar multiplication over `k` point/scalar
    /// pairs of 288 bytes each.
    fn bls12_381_g2_msm(&self, _input: &[u8]) -> Result<[u8; 256], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_g2_msm"))
    }

    /// BLS12-381 pairing check over `k` G1/G2 pairs of 384 bytes each;
    /// returns the check bit.
    fn bls12_381_pairing(&self, _input: &[u8]) -> Result<bool, PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_pairing"))
    }

    /// Maps a 64-byte padded field element to a G1 point.
    fn bls12_381_map_fp_to_g1(&self, _input: &[u8]) -> Result<[u8; 128], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_map_fp_to_g1"))
    }

    /// Maps a 128-byte padded Fp2 element to a G2 point.
    fn bls12_381_map_fp2_to_g2(&self, _input: &[u8]) -> Result<[u8; 256], PrecompileError> {
        Err(PrecompileError::Unsupported("bls12_381_map_fp2_to_g2"))
    }
}

/// Crypto backend that implements nothing. The identity precompile still
/// works; everything else reports [`PrecompileError::Unsupported`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCrypto;

impl CryptoBackend for NoCrypto {
    fn ecrecover(
        &self,
        _msg: B256,
        _recovery_id: u8,
        _r: B256,
        _s: B256,
    ) -> Result<Option<Address>, PrecompileError> {
        Err(PrecompileError::Unsupported("ecrecover"))
    }

    fn sha256(&self, _input: &[u8]) -> Result<[u8; 32], PrecompileError> {
        Err(PrecompileError::Unsupported("sha256"))
    }

    fn ripemd160(&self, _input: &[u8]) -> Result<[u8; 20], PrecompileError> {
        Err(PrecompileError::Unsupported("ripemd160"))
    }

    fn modexp(
        &self,
        _base: &[u8],
        _exp: &[u8],
        _modulus: &[u8],
    ) -> Result<Vec<u8>, PrecompileError> {
        Err(PrecompileError::Unsupported("modexp"))
    }

    fn bn254_add(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
        Err(PrecompileError::Unsupported("bn254_add"))
    }

    fn bn254_mul(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
        Err(PrecompileError::Unsupported("bn254_mul"))
    }

    fn bn254_pairing(&self, _input: &[u8]) -> Result<bool, PrecompileError> {
        Err(PrecompileError::Unsupported("bn254_pairing"))
    }

    fn blake2f(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
        Err(PrecompileError::Unsupported("blake2f"))
    }

    fn kzg_point_evaluation(&self, _input: &[u8]) -> Result<(), PrecompileError> {
        Err(PrecompileError::Unsupported("kzg_point_evaluation"))
    }
}

/// A set of precompiled contracts the execution loop consults before
/// creating a call frame.
pub trait PrecompileSet {
    /// Whether `address` is a precompile under `spec`.
    fn contains(&self, address: &Address, spec: SpecId) -> bool;

    /// Runs the precompile; `None` if `address` is not one. Charges the
    /// canonical gas formula against `gas_limit`.
    fn run(
        &self,
        address: &Address,
        input: &[u8],
        gas_limit: u64,
        spec: SpecId,
    ) -> Option<PrecompileResult>;

    /// Addresses warmed at transaction start per EIP-2929.
    fn warm_addresses(&self, spec: SpecId) -> Vec<Address>;
}

/// A precompile set that never matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrecompiles;

impl PrecompileSet for NoPrecompiles {
    fn contains(&self, _address: &Address, _spec: SpecId) -> bool {
        false
    }

    fn run(
        &self,
        _address: &Address,
        _input: &[u8],
        _gas_limit: u64,
        _spec: SpecId,
    ) -> Option<PrecompileResult> {
        None
    }

    fn warm_addresses(&self, _spec: SpecId) -> Vec<Address> {
        Vec::new()
    }
}

/// The standard precompile set: 0x01..=0x0a through Cancun, plus the
/// EIP-2537 BLS12-381 range 0x0b..=0x11 from Prague. The math is delegated
/// to a [`CryptoBackend`].
#[derive(Clone, Debug, Default)]
pub struct HostPrecompiles<C> {
    crypto: C,
}

impl<C: CryptoBackend> HostPrecompiles<C> {
    /// Wraps a crypto backend.
    pub fn new(crypto: C) -> Self {
        Self { crypto }
    }

    /// The wrapped backend.
    pub fn crypto(&self) -> &C {
        &self.crypto
    }
}

#[inline]
fn cost_per_word(len: usize, base: u64, word: u64) -> u64 {
    base + word * (len as u64).div_ceil(32)
}

/// Right-pads `input` to `len` with zeros, the convention for fixed-layout
/// precompile inputs.
fn right_pad(input: &[u8], len: usize) -> Vec<u8> {
    let mut padded = vec![0u8; len];
    let count = input.len().min(len);
    padded[..count].copy_from_slice(&input[..count]);
    padded
}

impl<C: CryptoBackend> HostPrecompiles<C> {
    fn run_inner(
        &self,
        address: &Address,
        input: &[u8],
        gas_limit: u64,
        spec: SpecId,
    ) -> PrecompileResult {
        let charge = |cost: u64| {
            if cost > gas_limit {
                Err(PrecompileError::OutOfGas)
            } else {
                Ok(cost)
            }
        };

        match *address {
            ECRECOVER => {
                let gas_used = charge(3000)?;
                let padded = right_pad(input, 128);
                let msg = B256::from_slice(&padded[0..32]);
                let v = U256::from_be_slice(&padded[32..64]);
                let r = B256::from_slice(&padded[64..96]);
                let s = B256::from_slice(&padded[96..128]);
                // Only v in {27, 28} recovers.
                let recovered = if v == U256::from(27) || v == U256::from(28) {
                    self.crypto
                        .ecrecover(msg, v.to::<u8>() - 27, r, s)?
                } else {
                    None
                };
                let bytes = match recovered {
                    Some(address) => Bytes::copy_from_slice(address.into_word().as_slice()),
                    None => Bytes::new(),
                };
                Ok(PrecompileOutput { gas_used, bytes })
            }
            SHA256 => {
                let gas_used = charge(cost_per_word(input.len(), 60, 12))?;
                let digest = self.crypto.sha256(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&digest),
                })
            }
            RIPEMD160 => {
                let gas_used = charge(cost_per_word(input.len(), 600, 120))?;
                let digest = self.crypto.ripemd160(input)?;
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(&digest);
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&word),
                })
            }
            IDENTITY => {
                let gas_used = charge(cost_per_word(input.len(), 15, 3))?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(input),
                })
            }
            MODEXP => self.run_modexp(input, gas_limit, spec),
            BN254_ADD => {
                let cost = if spec.is_enabled_in(SpecId::ISTANBUL) { 150 } else { 500 };
                let gas_used = charge(cost)?;
                let padded = right_pad(input, 128);
                let sum = self.crypto.bn254_add(&padded)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&sum),
                })
            }
            BN254_MUL => {
                let cost = if spec.is_enabled_in(SpecId::ISTANBUL) { 6000 } else { 40000 };
                let gas_used = charge(cost)?;
                let padded = right_pad(input, 96);
                let product = self.crypto.bn254_mul(&padded)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&product),
                })
            }
            BN254_PAIRING => {
                if input.len() % 192 != 0 {
                    return Err(PrecompileError::InvalidInput);
                }
                let pairs = (input.len() / 192) as u64;
                let (per_pair, base) = if spec.is_enabled_in(SpecId::ISTANBUL) {
                    (34000, 45000)
                } else {
                    (80000, 100000)
                };
                let gas_used = charge(base + per_pair * pairs)?;
                let ok = self.crypto.bn254_pairing(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&B256::with_last_byte(ok as u8).0),
                })
            }
            BLAKE2F => {
                if input.len() != 213 {
                    return Err(PrecompileError::InvalidInput);
                }
                let rounds = u32::from_be_bytes(input[0..4].try_into().expect("four bytes"));
                let gas_used = charge(rounds as u64)?;
                let state = self.crypto.blake2f(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&state),
                })
            }
            KZG_POINT_EVALUATION => {
                let gas_used = charge(50000)?;
                if input.len() != 192 {
                    return Err(PrecompileError::InvalidInput);
                }
                self.crypto.kzg_point_evaluation(input)?;
                // The output is constant on success.
                let mut bytes = [0u8; 64];
                bytes[..32]
                    .copy_from_slice(&U256::from(FIELD_ELEMENTS_PER_BLOB).to_be_bytes::<32>());
                bytes[32..].copy_from_slice(BLS_MODULUS.as_slice());
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&bytes),
                })
            }
            BLS12_381_G1_ADD => {
                let gas_used = charge(BLS_G1_ADD_GAS)?;
                if input.len() != 2 * BLS_PADDED_G1 {
                    return Err(PrecompileError::InvalidInput);
                }
                let sum = self.crypto.bls12_381_g1_add(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&sum),
                })
            }
            BLS12_381_G1_MSM => {
                if input.is_empty() || input.len() % BLS_G1_MSM_PAIR != 0 {
                    return Err(PrecompileError::InvalidInput);
                }
                let pairs = input.len() / BLS_G1_MSM_PAIR;
                let gas_used =
                    charge(bls_msm_gas(pairs, &BLS_G1_MSM_DISCOUNT, BLS_G1_MSM_MUL_GAS))?;
                let product = self.crypto.bls12_381_g1_msm(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&product),
                })
            }
            BLS12_381_G2_ADD => {
                let gas_used = charge(BLS_G2_ADD_GAS)?;
                if input.len() != 2 * BLS_PADDED_G2 {
                    return Err(PrecompileError::InvalidInput);
                }
                let sum = self.crypto.bls12_381_g2_add(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&sum),
                })
            }
            BLS12_381_G2_MSM => {
                if input.is_empty() || input.len() % BLS_G2_MSM_PAIR != 0 {
                    return Err(PrecompileError::InvalidInput);
                }
                let pairs = input.len() / BLS_G2_MSM_PAIR;
                let gas_used =
                    charge(bls_msm_gas(pairs, &BLS_G2_MSM_DISCOUNT, BLS_G2_MSM_MUL_GAS))?;
                let product = self.crypto.bls12_381_g2_msm(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&product),
                })
            }
            BLS12_381_PAIRING => {
                if input.is_empty() || input.len() % BLS_PAIRING_PAIR != 0 {
                    return Err(PrecompileError::InvalidInput);
                }
                let pairs = (input.len() / BLS_PAIRING_PAIR) as u64;
                let gas_used =
                    charge(BLS_PAIRING_BASE_GAS + BLS_PAIRING_PER_PAIR_GAS * pairs)?;
                let ok = self.crypto.bls12_381_pairing(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&B256::with_last_byte(ok as u8).0),
                })
            }
            BLS12_381_MAP_FP_TO_G1 => {
                let gas_used = charge(BLS_MAP_FP_TO_G1_GAS)?;
                if input.len() != 64 {
                    return Err(PrecompileError::InvalidInput);
                }
                let point = self.crypto.bls12_381_map_fp_to_g1(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&point),
                })
            }
            BLS12_381_MAP_FP2_TO_G2 => {
                let gas_used = charge(BLS_MAP_FP2_TO_G2_GAS)?;
                if input.len() != 2 * 64 {
                    return Err(PrecompileError::InvalidInput);
                }
                let point = self.crypto.bls12_381_map_fp2_to_g2(input)?;
                Ok(PrecompileOutput {
                    gas_used,
                    bytes: Bytes::copy_from_slice(&point),
                })
            }
            _ => Err(PrecompileError::InvalidInput),
        }
    }

    /// EIP-198 with the EIP-2565 repricing.
    fn run_modexp(&self, input: &[u8], gas_limit: u64, spec: SpecId) -> PrecompileResult {
        let header = right_pad(input, 96);
        let base_len = usize::try_from(U256::from_be_slice(&header[0..32]))
            .map_err(|_| PrecompileError::OutOfGas)?;
        let exp_len = usize::try_from(U256::from_be_slice(&header[32..64]))
            .map_err(|_| PrecompileError::OutOfGas)?;
        let mod_len = usize::try_from(U256::from_be_slice(&header[64..96]))
            .map_err(|_| PrecompileError::OutOfGas)?;

        // The exponent head is read straight off the input so gas can be
        // charged before any body-sized allocation happens.
        let exp_head = {
            let start = 96usize.saturating_add(base_len).min(input.len());
            let end = start.saturating_add(exp_len.min(32)).min(input.len());
            let head = right_pad(&input[start..end], exp_len.min(32));
            U256::from_be_slice(&head)
        };
        let exp_head_bits = exp_head.bit_len() as u64;
        let adjusted_exp_len = if exp_len <= 32 {
            exp_head_bits.saturating_sub(1)
        } else {
            8 * (exp_len as u64 - 32) + exp_head_bits.saturating_sub(1)
        };

        let max_len = base_len.max(mod_len) as u64;
        let gas = if spec.is_enabled_in(SpecId::BERLIN) {
            // EIP-2565.
            let words = max_len.div_ceil(8);
            let multiplication_complexity = words.saturating_mul(words);
            multiplication_complexity
                .saturating_mul(adjusted_exp_len.max(1))
                .checked_div(3)
                .unwrap_or(u64::MAX)
                .max(200)
        } else {
            // EIP-198.
            let complexity = if max_len <= 64 {
                max_len * max_len
            } else if max_len <= 1024 {
                max_len * max_len / 4 + 96 * max_len - 3072
            } else {
                max_len * max_len / 16 + 480 * max_len - 199_680
            };
            complexity
                .saturating_mul(adjusted_exp_len.max(1))
                .checked_div(20)
                .unwrap_or(u64::MAX)
        };
        if gas > gas_limit {
            return Err(PrecompileError::OutOfGas);
        }

        let body = if input.len() > 96 { &input[96..] } else { &[][..] };
        let body = right_pad(body, base_len + exp_len + mod_len);
        let base = &body[..base_len];
        let exp = &body[base_len..base_len + exp_len];
        let modulus = &body[base_len + exp_len..];

        let mut result = self.crypto.modexp(base, exp, modulus)?;
        // The output is mod_len bytes, left-padded.
        if result.len() < mod_len {
            let mut padded = vec![0u8; mod_len];
            padded[mod_len - result.len()..].copy_from_slice(&result);
            result = padded;
        }
        Ok(PrecompileOutput {
            gas_used: gas,
            bytes: result.into(),
        })
    }
}

impl<C: CryptoBackend> PrecompileSet for HostPrecompiles<C> {
    fn contains(&self, address: &Address, spec: SpecId) -> bool {
        match *address {
            ECRECOVER | SHA256 | RIPEMD160 | IDENTITY => true,
            MODEXP | BN254_ADD | BN254_MUL | BN254_PAIRING => {
                spec.is_enabled_in(SpecId::BYZANTIUM)
            }
            BLAKE2F => spec.is_enabled_in(SpecId::ISTANBUL),
            KZG_POINT_EVALUATION => spec.is_enabled_in(SpecId::CANCUN),
            BLS12_381_G1_ADD | BLS12_381_G1_MSM | BLS12_381_G2_ADD | BLS12_381_G2_MSM
            | BLS12_381_PAIRING | BLS12_381_MAP_FP_TO_G1 | BLS12_381_MAP_FP2_TO_G2 => {
                spec.is_enabled_in(SpecId::PRAGUE)
            }
            _ => false,
        }
    }

    fn run(
        &self,
        address: &Address,
        input: &[u8],
        gas_limit: u64,
        spec: SpecId,
    ) -> Option<PrecompileResult> {
        if !self.contains(address, spec) {
            return None;
        }
        Some(self.run_inner(address, input, gas_limit, spec))
    }

    fn warm_addresses(&self, spec: SpecId) -> Vec<Address> {
        let mut addresses = vec![ECRECOVER, SHA256, RIPEMD160, IDENTITY];
        if spec.is_enabled_in(SpecId::BYZANTIUM) {
            addresses.extend([MODEXP, BN254_ADD, BN254_MUL, BN254_PAIRING]);
        }
        if spec.is_enabled_in(SpecId::ISTANBUL) {
            addresses.push(BLAKE2F);
        }
        if spec.is_enabled_in(SpecId::CANCUN) {
            addresses.push(KZG_POINT_EVALUATION);
        }
        if spec.is_enabled_in(SpecId::PRAGUE) {
            addresses.extend([
                BLS12_381_G1_ADD,
                BLS12_381_G1_MSM,
                BLS12_381_G2_ADD,
                BLS12_381_G2_MSM,
                BLS12_381_PAIRING,
                BLS12_381_MAP_FP_TO_G1,
                BLS12_381_MAP_FP2_TO_G2,
            ]);
        }
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> HostPrecompiles<NoCrypto> {
        HostPrecompiles::new(NoCrypto)
    }

    #[test]
    fn identity_copies_input() {
        let result = set()
            .run(&IDENTITY, b"hello", 1_000, SpecId::CANCUN)
            .unwrap()
            .unwrap();
        // 15 + 3 * ceil(5/32)
        assert_eq!(result.gas_used, 18);
        assert_eq!(result.bytes.as_ref(), b"hello");
    }

    #[test]
    fn gas_formula_overdraft() {
        let result = set().run(&IDENTITY, b"hello", 17, SpecId::CANCUN).unwrap();
        assert_eq!(result, Err(PrecompileError::OutOfGas));
    }

    #[test]
    fn unsupported_crypto_reports() {
        let result = set().run(&SHA256, b"", 1_000, SpecId::CANCUN).unwrap();
        assert_eq!(result, Err(PrecompileError::Unsupported("sha256")));
    }

    #[test]
    fn fork_gating() {
        let set = set();
        assert!(!set.contains(&KZG_POINT_EVALUATION, SpecId::SHANGHAI));
        assert!(set.contains(&KZG_POINT_EVALUATION, SpecId::CANCUN));
        assert!(!set.contains(&BLAKE2F, SpecId::BYZANTIUM));
        assert!(set
            .run(&KZG_POINT_EVALUATION, &[], 1_000, SpecId::SHANGHAI)
            .is_none());
    }

    #[test]
    fn bls_range_activates_with_prague() {
        let set = set();
        for address in [
            BLS12_381_G1_ADD,
            BLS12_381_G1_MSM,
            BLS12_381_G2_ADD,
            BLS12_381_G2_MSM,
            BLS12_381_PAIRING,
            BLS12_381_MAP_FP_TO_G1,
            BLS12_381_MAP_FP2_TO_G2,
        ] {
            assert!(!set.contains(&address, SpecId::CANCUN));
            assert!(set.contains(&address, SpecId::PRAGUE));
            assert!(set.run(&address, &[], 1_000_000, SpecId::CANCUN).is_none());
        }
        assert!(set
            .warm_addresses(SpecId::PRAGUE)
            .contains(&BLS12_381_PAIRING));
        assert!(!set
            .warm_addresses(SpecId::CANCUN)
            .contains(&BLS12_381_G1_ADD));
    }

    #[test]
    fn bls_g1_add_charges_before_the_backend() {
        let set = set();
        // Under the formula: out of gas before anything else.
        assert_eq!(
            set.run(&BLS12_381_G1_ADD, &[0u8; 256], 374, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::OutOfGas)
        );
        // Charged, then the length gate.
        assert_eq!(
            set.run(&BLS12_381_G1_ADD, &[0u8; 255], 1_000, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::InvalidInput)
        );
        // Well-formed input reaches the (absent) host primitive.
        assert_eq!(
            set.run(&BLS12_381_G1_ADD, &[0u8; 256], 1_000, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::Unsupported("bls12_381_g1_add"))
        );
    }

    #[test]
    fn bls_msm_discounts() {
        assert_eq!(bls_msm_gas(0, &BLS_G1_MSM_DISCOUNT, BLS_G1_MSM_MUL_GAS), 0);
        assert_eq!(
            bls_msm_gas(1, &BLS_G1_MSM_DISCOUNT, BLS_G1_MSM_MUL_GAS),
            12000
        );
        assert_eq!(
            bls_msm_gas(2, &BLS_G1_MSM_DISCOUNT, BLS_G1_MSM_MUL_GAS),
            2 * 949 * 12000 / 1000
        );
        // Past the table the last discount holds.
        assert_eq!(
            bls_msm_gas(200, &BLS_G1_MSM_DISCOUNT, BLS_G1_MSM_MUL_GAS),
            200 * 519 * 12000 / 1000
        );
        assert_eq!(
            bls_msm_gas(3, &BLS_G2_MSM_DISCOUNT, BLS_G2_MSM_MUL_GAS),
            3 * 923 * 22500 / 1000
        );
    }

    #[test]
    fn bls_msm_and_pairing_validate_shape() {
        let set = set();
        // Empty and ragged inputs are rejected before any gas math.
        assert_eq!(
            set.run(&BLS12_381_G1_MSM, &[], 1_000_000, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::InvalidInput)
        );
        assert_eq!(
            set.run(&BLS12_381_PAIRING, &[0u8; 100], 1_000_000, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::InvalidInput)
        );
        // One pairing pair prices at base + per-pair.
        assert_eq!(
            set.run(&BLS12_381_PAIRING, &[0u8; 384], 70_299, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::OutOfGas)
        );
        assert_eq!(
            set.run(&BLS12_381_PAIRING, &[0u8; 384], 70_300, SpecId::PRAGUE)
                .unwrap(),
            Err(PrecompileError::Unsupported("bls12_381_pairing"))
        );
    }

    #[test]
    fn ecrecover_with_bad_v_returns_empty() {
        // v = 0 never reaches the crypto backend.
        let result = set()
            .run(&ECRECOVER, &[0u8; 128], 10_000, SpecId::CANCUN)
            .unwrap()
            .unwrap();
        assert_eq!(result.gas_used, 3000);
        assert!(result.bytes.is_empty());
    }

    /// Backend that computes modexp over small operands, enough to verify
    /// the dispatcher's parsing, pricing and output padding.
    #[derive(Clone, Copy, Debug, Default)]
    struct SmallModexp;

    impl CryptoBackend for SmallModexp {
        fn ecrecover(
            &self,
            _msg: B256,
            _recovery_id: u8,
            _r: B256,
            _s: B256,
        ) -> Result<Option<Address>, PrecompileError> {
            Err(PrecompileError::Unsupported("ecrecover"))
        }
        fn sha256(&self, _input: &[u8]) -> Result<[u8; 32], PrecompileError> {
            Err(PrecompileError::Unsupported("sha256"))
        }
        fn ripemd160(&self, _input: &[u8]) -> Result<[u8; 20], PrecompileError> {
            Err(PrecompileError::Unsupported("ripemd160"))
        }
        fn modexp(
            &self,
            base: &[u8],
            exp: &[u8],
            modulus: &[u8],
        ) -> Result<Vec<u8>, PrecompileError> {
            let base = u128::from(U256::from_be_slice(base).to::<u64>());
            let exp = U256::from_be_slice(exp).to::<u64>();
            let modulus = u128::from(U256::from_be_slice(modulus).to::<u64>());
            if modulus == 0 {
                return Ok(vec![0]);
            }
            let mut result = 1u128;
            for _ in 0..exp {
                result = result * base % modulus;
            }
            Ok(vec![result as u8])
        }
        fn bn254_add(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
            Err(PrecompileError::Unsupported("bn254_add"))
        }
        fn bn254_mul(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
            Err(PrecompileError::Unsupported("bn254_mul"))
        }
        fn bn254_pairing(&self, _input: &[u8]) -> Result<bool, PrecompileError> {
            Err(PrecompileError::Unsupported("bn254_pairing"))
        }
        fn blake2f(&self, _input: &[u8]) -> Result<[u8; 64], PrecompileError> {
            Err(PrecompileError::Unsupported("blake2f"))
        }
        fn kzg_point_evaluation(&self, _input: &[u8]) -> Result<(), PrecompileError> {
            Err(PrecompileError::Unsupported("kzg_point_evaluation"))
        }
    }

    #[test]
    fn modexp_parses_prices_and_pads() {
        let set = HostPrecompiles::new(SmallModexp);
        // base_len = exp_len = mod_len = 1; 3^5 % 7 = 5.
        let mut input = vec![0u8; 96];
        input[31] = 1;
        input[63] = 1;
        input[95] = 1;
        input.extend_from_slice(&[3, 5, 7]);
        let result = set
            .run(&MODEXP, &input, 10_000, SpecId::CANCUN)
            .unwrap()
            .unwrap();
        // EIP-2565 floor price.
        assert_eq!(result.gas_used, 200);
        assert_eq!(result.bytes.as_ref(), &[5]);

        // A two-byte modulus pads the output on the left.
        let mut input = vec![0u8; 96];
        input[31] = 1;
        input[63] = 1;
        input[95] = 2;
        input.extend_from_slice(&[3, 5, 0, 7]);
        let result = set
            .run(&MODEXP, &input, 10_000, SpecId::CANCUN)
            .unwrap()
            .unwrap();
        assert_eq!(result.bytes.as_ref(), &[0, 5]);
    }

    #[test]
    fn blake2f_charges_per_round_and_checks_length() {
        let set = set();
        assert_eq!(
            set.run(&BLAKE2F, &[0u8; 212], 10_000, SpecId::CANCUN).unwrap(),
            Err(PrecompileError::InvalidInput)
        );
        // 100000 rounds exceed a 10k gas limit before the backend runs.
        let mut input = [0u8; 213];
        input[0..4].copy_from_slice(&100_000u32.to_be_bytes());
        assert_eq!(
            set.run(&BLAKE2F, &input, 10_000, SpecId::CANCUN).unwrap(),
            Err(PrecompileError::OutOfGas)
        );
    }
}
