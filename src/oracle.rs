//! Outbound interface to the randomness oracle program.
//!
//! The lottery never consumes oracle account data directly; it sends a
//! request carrying a correlation id and receives the random words back
//! through the Fulfill instruction, signed by the configured oracle
//! authority. The id in the request is the only thing binding the two
//! halves together.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    msg,
    program::invoke,
    program_error::ProgramError,
};

use crate::state::LotteryConfig;

/// Every draw asks the oracle for exactly one random word.
pub const REQUEST_NUM_WORDS: u32 = 1;

/// Request payload handed to the oracle program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct RandomnessRequest {
    /// Correlation id the oracle must echo back on fulfillment
    pub request_id: u64,
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

impl RandomnessRequest {
    pub fn new(request_id: u64, config: &LotteryConfig) -> Self {
        Self {
            request_id,
            gas_lane: config.gas_lane,
            subscription_id: config.subscription_id,
            request_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: REQUEST_NUM_WORDS,
        }
    }
}

/// Submit a randomness request to the oracle program via CPI.
pub fn request_random_words<'a>(
    oracle_program_info: &AccountInfo<'a>,
    lottery_info: &AccountInfo<'a>,
    request: &RandomnessRequest,
) -> ProgramResult {
    let data = request
        .try_to_vec()
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    let instruction = Instruction {
        program_id: *oracle_program_info.key,
        accounts: vec![AccountMeta::new_readonly(*lottery_info.key, false)],
        data,
    };

    invoke(
        &instruction,
        &[lottery_info.clone(), oracle_program_info.clone()],
    )?;

    msg!("Randomness request {} submitted to oracle", request.request_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::pubkey::Pubkey;

    #[test]
    fn request_carries_config_parameters_and_one_word() {
        let config = LotteryConfig {
            is_initialized: true,
            authority: Pubkey::new_unique(),
            oracle_program: Pubkey::new_unique(),
            oracle_authority: Pubkey::new_unique(),
            entrance_fee: 100,
            interval: 60,
            gas_lane: [9u8; 32],
            subscription_id: 7,
            callback_gas_limit: 500_000,
            request_confirmations: 3,
        };

        let request = RandomnessRequest::new(11, &config);
        assert_eq!(request.request_id, 11);
        assert_eq!(request.gas_lane, [9u8; 32]);
        assert_eq!(request.subscription_id, 7);
        assert_eq!(request.request_confirmations, 3);
        assert_eq!(request.callback_gas_limit, 500_000);
        assert_eq!(request.num_words, REQUEST_NUM_WORDS);

        // the payload decodes on the oracle side
        let bytes = request.try_to_vec().unwrap();
        assert_eq!(RandomnessRequest::try_from_slice(&bytes).unwrap(), request);
    }
}
