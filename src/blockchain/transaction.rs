//! Transaction building, signing, and wire encoding.
//!
//! # Responsibilities
//! - Build system-program transfer instructions
//! - Compile instructions into a message with deduplicated account keys
//! - Sign the message and serialize the transaction for `sendTransaction`
//!
//! # Wire Format
//! ```text
//! transaction = compact_u16(n) ‖ n × signature[64] ‖ message
//! message     = header[3] ‖ compact_u16(k) ‖ k × pubkey[32]
//!             ‖ recent_blockhash[32] ‖ compact_u16(m) ‖ m × instruction
//! instruction = program_id_index ‖ compact_u16(a) ‖ a × account_index
//!             ‖ compact_u16(d) ‖ d × data
//! ```

use crate::blockchain::types::{BlockchainError, BlockchainResult, Hash, Pubkey, Signature};
use crate::blockchain::wallet::Wallet;

/// The system program owns native balances and executes transfers.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// Index of `Transfer` in the system program's instruction enum.
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// An account referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Build a native transfer of `lamports` from `from` to `to`.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    }
}

/// Read back the lamport amount of a system transfer instruction.
pub fn transfer_lamports(instruction: &Instruction) -> Option<u64> {
    if instruction.program_id != SYSTEM_PROGRAM_ID || instruction.data.len() != 12 {
        return None;
    }
    let (index, amount) = instruction.data.split_at(4);
    if u32::from_le_bytes(index.try_into().ok()?) != SYSTEM_TRANSFER_INDEX {
        return None;
    }
    Some(u64::from_le_bytes(amount.try_into().ok()?))
}

/// Append `len` in Solana's compact-u16 (shortvec) encoding.
pub fn encode_compact_u16(len: usize, out: &mut Vec<u8>) -> BlockchainResult<()> {
    let mut value = u16::try_from(len)
        .map_err(|_| BlockchainError::Encoding(format!("length {} exceeds u16", len)))?;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return Ok(());
        }
        out.push(byte | 0x80);
    }
}

/// Counts of signed and read-only accounts at the front of the key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its keys replaced by indexes into the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile instructions into a message paid for by `payer`.
    ///
    /// Keys are ordered writable signers, read-only signers, writable
    /// non-signers, read-only non-signers, with the payer always first.
    pub fn compile(
        instructions: &[Instruction],
        payer: &Pubkey,
        recent_blockhash: Hash,
    ) -> BlockchainResult<Self> {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::new(*payer, true)];
        let mut merge = |meta: AccountMeta| {
            match metas.iter_mut().find(|m| m.pubkey == meta.pubkey) {
                Some(existing) => {
                    existing.is_signer |= meta.is_signer;
                    existing.is_writable |= meta.is_writable;
                }
                None => metas.push(meta),
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                merge(meta.clone());
            }
            merge(AccountMeta::new_readonly(ix.program_id, false));
        }

        // Stable sort keeps the payer at index 0
        metas.sort_by_key(|m| match (m.is_signer, m.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if metas.len() > u8::MAX as usize {
            return Err(BlockchainError::Encoding(format!(
                "{} accounts exceed the per-message limit",
                metas.len()
            )));
        }

        let count = |signer: bool, writable: bool| {
            metas
                .iter()
                .filter(|m| m.is_signer == signer && m.is_writable == writable)
                .count() as u8
        };
        let header = MessageHeader {
            num_required_signatures: count(true, true) + count(true, false),
            num_readonly_signed_accounts: count(true, false),
            num_readonly_unsigned_accounts: count(false, false),
        };

        let account_keys: Vec<Pubkey> = metas.iter().map(|m| m.pubkey).collect();
        let index_of = |key: &Pubkey| -> u8 {
            // Every key was merged above, and the count fits in u8
            account_keys.iter().position(|k| k == key).unwrap_or_default() as u8
        };

        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// Serialize to the bytes that signers sign.
    pub fn serialize(&self) -> BlockchainResult<Vec<u8>> {
        let mut out = vec![
            self.header.num_required_signatures,
            self.header.num_readonly_signed_accounts,
            self.header.num_readonly_unsigned_accounts,
        ];
        encode_compact_u16(self.account_keys.len(), &mut out)?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(&self.recent_blockhash.0);
        encode_compact_u16(self.instructions.len(), &mut out)?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_compact_u16(ix.accounts.len(), &mut out)?;
            out.extend_from_slice(&ix.accounts);
            encode_compact_u16(ix.data.len(), &mut out)?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }
}

/// An ordered list of instructions submitted as one atomic unit.
///
/// The fee payer and recent blockhash are usually left empty by the caller
/// and filled in by the wallet right before signing.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    instructions: Vec<Instruction>,
    fee_payer: Option<Pubkey>,
    recent_blockhash: Option<Hash>,
    signatures: Vec<Signature>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction.
    pub fn add(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self.signatures.clear();
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn fee_payer(&self) -> Option<Pubkey> {
        self.fee_payer
    }

    pub fn set_fee_payer(&mut self, payer: Pubkey) {
        self.fee_payer = Some(payer);
        self.signatures.clear();
    }

    pub fn recent_blockhash(&self) -> Option<Hash> {
        self.recent_blockhash
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) {
        self.recent_blockhash = Some(blockhash);
        self.signatures.clear();
    }

    /// The transaction's identifier, available once signed.
    pub fn signature(&self) -> Option<Signature> {
        self.signatures.first().copied()
    }

    /// Compile the message from the current fee payer and blockhash.
    pub fn compile_message(&self) -> BlockchainResult<Message> {
        let payer = self
            .fee_payer
            .ok_or_else(|| BlockchainError::Encoding("fee payer not set".to_string()))?;
        let blockhash = self
            .recent_blockhash
            .ok_or_else(|| BlockchainError::Encoding("recent blockhash not set".to_string()))?;
        if self.instructions.is_empty() {
            return Err(BlockchainError::Encoding("no instructions".to_string()));
        }
        Message::compile(&self.instructions, &payer, blockhash)
    }

    /// Sign with `wallet`, which must be the only required signer.
    pub fn sign(&mut self, wallet: &Wallet) -> BlockchainResult<Signature> {
        let message = self.compile_message()?;
        let required = message.header.num_required_signatures as usize;
        let signers = &message.account_keys[..required];
        if signers != [wallet.pubkey()].as_slice() {
            return Err(BlockchainError::Wallet(format!(
                "transaction requires signers {:?}, wallet holds {}",
                signers,
                wallet.pubkey()
            )));
        }

        let signature = wallet.sign_message(&message.serialize()?);
        self.signatures = vec![signature];
        Ok(signature)
    }

    /// Serialize a signed transaction into wire bytes.
    pub fn serialize(&self) -> BlockchainResult<Vec<u8>> {
        let message = self.compile_message()?;
        if self.signatures.len() != message.header.num_required_signatures as usize {
            return Err(BlockchainError::Encoding(format!(
                "expected {} signatures, have {}",
                message.header.num_required_signatures,
                self.signatures.len()
            )));
        }

        let mut out = Vec::new();
        encode_compact_u16(self.signatures.len(), &mut out)?;
        for signature in &self.signatures {
            out.extend_from_slice(signature.as_bytes());
        }
        out.extend_from_slice(&message.serialize()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    fn shortvec(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_compact_u16(len, &mut out).unwrap();
        out
    }

    #[test]
    fn test_compact_u16_encoding() {
        assert_eq!(shortvec(0), vec![0x00]);
        assert_eq!(shortvec(0x7f), vec![0x7f]);
        assert_eq!(shortvec(0x80), vec![0x80, 0x01]);
        assert_eq!(shortvec(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(shortvec(0x4000), vec![0x80, 0x80, 0x01]);

        let mut out = Vec::new();
        assert!(encode_compact_u16(70_000, &mut out).is_err());
    }

    #[test]
    fn test_system_transfer_encoding() {
        let from = Pubkey::new([1u8; 32]);
        let to = Pubkey::new([2u8; 32]);
        let ix = system_transfer(&from, &to, 1_500_000_000);

        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(transfer_lamports(&ix), Some(1_500_000_000));
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn test_message_compile_orders_keys() {
        let from = Pubkey::new([1u8; 32]);
        let to = Pubkey::new([2u8; 32]);
        let ix = system_transfer(&from, &to, 10);

        let message = Message::compile(&[ix], &from, Hash([9u8; 32])).unwrap();
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            }
        );
        assert_eq!(message.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(message.instructions[0].program_id_index, 2);
        assert_eq!(message.instructions[0].accounts, vec![0, 1]);

        let bytes = message.serialize().unwrap();
        // header + len + 3 keys + blockhash + len + (idx + len + 2 + len + 12)
        assert_eq!(bytes.len(), 3 + 1 + 96 + 32 + 1 + 1 + 1 + 2 + 1 + 12);
    }

    #[test]
    fn test_self_transfer_deduplicates_keys() {
        let key = Pubkey::new([7u8; 32]);
        let ix = system_transfer(&key, &key, 1);
        let message = Message::compile(&[ix], &key, Hash::default()).unwrap();
        assert_eq!(message.account_keys, vec![key, SYSTEM_PROGRAM_ID]);
        assert_eq!(message.instructions[0].accounts, vec![0, 0]);
    }

    #[test]
    fn test_sign_and_serialize() {
        let wallet = Wallet::generate();
        let to = Pubkey::new([2u8; 32]);
        let mut tx = Transaction::new().add(system_transfer(&wallet.pubkey(), &to, 5));
        tx.set_fee_payer(wallet.pubkey());
        tx.set_recent_blockhash(Hash([3u8; 32]));

        let signature = tx.sign(&wallet).unwrap();
        assert_eq!(tx.signature(), Some(signature));

        let wire = tx.serialize().unwrap();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], signature.as_bytes());

        let verifying_key = VerifyingKey::from_bytes(wallet.pubkey().as_bytes()).unwrap();
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        assert!(verifying_key.verify(&wire[65..], &sig).is_ok());
    }

    #[test]
    fn test_unsigned_transaction_rejected() {
        let mut tx = Transaction::new();
        assert!(tx.compile_message().is_err());

        tx = tx.add(system_transfer(&Pubkey::new([1u8; 32]), &Pubkey::new([2u8; 32]), 1));
        tx.set_fee_payer(Pubkey::new([1u8; 32]));
        tx.set_recent_blockhash(Hash::default());
        let err = tx.serialize().unwrap_err();
        assert!(err.to_string().contains("expected 1 signatures"));
    }

    #[test]
    fn test_sign_with_foreign_wallet_fails() {
        let wallet = Wallet::generate();
        let mut tx = Transaction::new().add(system_transfer(
            &Pubkey::new([1u8; 32]),
            &Pubkey::new([2u8; 32]),
            1,
        ));
        tx.set_fee_payer(wallet.pubkey());
        tx.set_recent_blockhash(Hash::default());
        // Sender [1; 32] must sign as well
        assert!(tx.sign(&wallet).is_err());
    }
}
