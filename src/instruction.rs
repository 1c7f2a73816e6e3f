use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::mem::size_of;

use crate::state::find_config_address;

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Create the lottery: config PDA plus the round account. All
    /// parameters are immutable afterwards; there are no update
    /// instructions.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The authority funding account creation
    /// 1. `[writable]` The config account (PDA, seed `b"config"`)
    /// 2. `[writable]` The lottery round account (pre-created, program-owned)
    /// 3. `[]` The randomness oracle program
    /// 4. `[]` The oracle authority allowed to fulfill requests
    /// 5. `[]` The system program
    Initialize {
        /// Minimum entry amount in lamports
        entrance_fee: u64,
        /// Minimum round duration in seconds
        interval: i64,
        /// Oracle request lane (key-hash) parameter
        gas_lane: [u8; 32],
        /// Oracle subscription funding the requests
        subscription_id: u64,
        /// Gas limit forwarded for the fulfillment callback
        callback_gas_limit: u32,
        /// Confirmations the oracle waits for before responding
        request_confirmations: u16,
    },

    /// Enter the current round by paying at least the entrance fee.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The participant paying the fee
    /// 1. `[writable]` The lottery round account
    /// 2. `[]` The config account
    /// 3. `[]` The system program
    Enter {
        /// Amount transferred into the pool, in lamports
        amount: u64,
    },

    /// Evaluate and log draw eligibility. Read-only; succeeds whether or
    /// not the round is ready, so a scheduler can poll it freely.
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery round account
    /// 1. `[]` The config account
    CheckEligibility {},

    /// Start a draw: re-checks eligibility, moves the round to
    /// Calculating and sends a randomness request to the oracle.
    /// Callable by anyone.
    ///
    /// Accounts expected:
    /// 0. `[writable]` The lottery round account
    /// 1. `[]` The config account
    /// 2. `[]` The randomness oracle program
    TriggerDraw {},

    /// Oracle callback delivering the random words for an outstanding
    /// request. Pays the entire pool to the selected winner and reopens
    /// the round.
    ///
    /// Accounts expected:
    /// 0. `[signer]` The configured oracle authority
    /// 1. `[writable]` The lottery round account
    /// 2. `[]` The config account
    /// 3. `[writable]` The winner (must match the selected participant)
    Fulfill {
        /// Id of the request being fulfilled
        request_id: u64,
        /// Random words from the oracle; only the first is consumed
        random_words: Vec<u64>,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_i64(rest)?;
                let (gas_lane, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (request_confirmations, _) = Self::unpack_u16(rest)?;
                Self::Initialize {
                    entrance_fee,
                    interval,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                    request_confirmations,
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::Enter { amount }
            }
            2 => Self::CheckEligibility {},
            3 => Self::TriggerDraw {},
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let mut random_words = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (word, remaining) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = remaining;
                }
                Self::Fulfill {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match *self {
            Self::Initialize {
                entrance_fee,
                interval,
                ref gas_lane,
                subscription_id,
                callback_gas_limit,
                request_confirmations,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(gas_lane);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&request_confirmations.to_le_bytes());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckEligibility {} => buf.push(2),
            Self::TriggerDraw {} => buf.push(3),
            Self::Fulfill {
                request_id,
                ref random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((u64::from_le_bytes(bytes), rest))
    }

    fn unpack_i64(input: &[u8]) -> Result<(i64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((i64::from_le_bytes(bytes), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<4>(input)?;
        Ok((u32::from_le_bytes(bytes), rest))
    }

    fn unpack_u16(input: &[u8]) -> Result<(u16, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<2>(input)?;
        Ok((u16::from_le_bytes(bytes), rest))
    }

    fn unpack_fixed_bytes<const N: usize>(
        input: &[u8],
    ) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (bytes, rest) = input.split_at(N);
        let bytes: [u8; N] = bytes
            .try_into()
            .map_err(|_| ProgramError::InvalidInstructionData)?;
        Ok((bytes, rest))
    }
}

/// Create an initialize instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &Pubkey,
    authority: &Pubkey,
    lottery_account: &Pubkey,
    oracle_program: &Pubkey,
    oracle_authority: &Pubkey,
    entrance_fee: u64,
    interval: i64,
    gas_lane: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
    request_confirmations: u16,
) -> Instruction {
    let (config_account, _) = find_config_address(program_id);
    let data = LotteryInstruction::Initialize {
        entrance_fee,
        interval,
        gas_lane,
        subscription_id,
        callback_gas_limit,
        request_confirmations,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(config_account, false),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(*oracle_program, false),
        AccountMeta::new_readonly(*oracle_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create an enter instruction
pub fn enter(
    program_id: &Pubkey,
    participant: &Pubkey,
    lottery_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let (config_account, _) = find_config_address(program_id);
    let data = LotteryInstruction::Enter { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*participant, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(config_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a check_eligibility instruction
pub fn check_eligibility(program_id: &Pubkey, lottery_account: &Pubkey) -> Instruction {
    let (config_account, _) = find_config_address(program_id);
    let data = LotteryInstruction::CheckEligibility {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*lottery_account, false),
        AccountMeta::new_readonly(config_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a trigger_draw instruction
pub fn trigger_draw(
    program_id: &Pubkey,
    lottery_account: &Pubkey,
    oracle_program: &Pubkey,
) -> Instruction {
    let (config_account, _) = find_config_address(program_id);
    let data = LotteryInstruction::TriggerDraw {}.pack();

    let accounts = vec![
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(config_account, false),
        AccountMeta::new_readonly(*oracle_program, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create a fulfill instruction
pub fn fulfill(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    lottery_account: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    let (config_account, _) = find_config_address(program_id);
    let data = LotteryInstruction::Fulfill {
        request_id,
        random_words,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(config_account, false),
        AccountMeta::new(*winner, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_enter() {
        let mut data = vec![1u8];
        data.extend_from_slice(&250u64.to_le_bytes());
        assert_eq!(
            LotteryInstruction::unpack(&data).unwrap(),
            LotteryInstruction::Enter { amount: 250 }
        );
    }

    #[test]
    fn unpacks_fulfill_with_word_list() {
        let original = LotteryInstruction::Fulfill {
            request_id: 3,
            random_words: vec![7, 11],
        };
        assert_eq!(
            LotteryInstruction::unpack(&original.pack()).unwrap(),
            original
        );
    }

    #[test]
    fn rejects_unknown_tag_and_truncated_input() {
        assert!(LotteryInstruction::unpack(&[99u8]).is_err());
        assert!(LotteryInstruction::unpack(&[]).is_err());
        // Enter with a truncated amount
        assert!(LotteryInstruction::unpack(&[1u8, 0, 0]).is_err());
    }
}
