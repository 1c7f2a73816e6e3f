use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::eligibility;
use crate::error::LotteryError;
use crate::instruction::LotteryInstruction;
use crate::oracle::{self, RandomnessRequest};
use crate::state::{find_config_address, Lottery, LotteryConfig, LotteryPhase, CONFIG_SEED};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize {
                entrance_fee,
                interval,
                gas_lane,
                subscription_id,
                callback_gas_limit,
                request_confirmations,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(
                    accounts,
                    entrance_fee,
                    interval,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                    request_confirmations,
                    program_id,
                )
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(accounts, amount, program_id)
            }
            LotteryInstruction::CheckEligibility {} => {
                msg!("Instruction: Check Eligibility");
                Self::process_check_eligibility(accounts, program_id)
            }
            LotteryInstruction::TriggerDraw {} => {
                msg!("Instruction: Trigger Draw");
                Self::process_trigger_draw(accounts, program_id)
            }
            LotteryInstruction::Fulfill {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill");
                Self::process_fulfill(accounts, request_id, &random_words, program_id)
            }
        }
    }

    /// Create the config PDA and the round account. All parameters become
    /// immutable here; the round opens immediately.
    #[allow(clippy::too_many_arguments)]
    fn process_initialize(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: i64,
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
        request_confirmations: u16,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let oracle_program_info = next_account_info(account_info_iter)?;
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if entrance_fee == 0 || interval <= 0 {
            msg!("Entrance fee and interval must both be positive");
            return Err(LotteryError::InvalidConfiguration.into());
        }

        if !oracle_program_info.executable {
            msg!("Oracle program account is not executable");
            return Err(LotteryError::InvalidConfiguration.into());
        }

        let (expected_config_pubkey, bump_seed) = find_config_address(program_id);
        if *config_info.key != expected_config_pubkey {
            msg!("Invalid config account address");
            return Err(ProgramError::InvalidArgument);
        }

        if config_info.owner != program_id {
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(LotteryConfig::LEN);

            invoke_signed(
                &system_instruction::create_account(
                    authority_info.key,
                    config_info.key,
                    rent_lamports,
                    LotteryConfig::LEN as u64,
                    program_id,
                ),
                &[
                    authority_info.clone(),
                    config_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[CONFIG_SEED, &[bump_seed]]],
            )?;
        } else if LotteryConfig::unpack_unchecked(&config_info.data.borrow())?.is_initialized {
            msg!("Config account is already initialized");
            return Err(LotteryError::AlreadyInUse.into());
        }

        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        if lottery_info.data_len() < Lottery::BASE_LEN {
            msg!("Lottery account is too small");
            return Err(ProgramError::AccountDataTooSmall);
        }
        if Lottery::load(&lottery_info.data.borrow())?.is_initialized {
            msg!("Lottery account is already initialized");
            return Err(LotteryError::AlreadyInUse.into());
        }

        let clock = Clock::get()?;

        let config = LotteryConfig {
            is_initialized: true,
            authority: *authority_info.key,
            oracle_program: *oracle_program_info.key,
            oracle_authority: *oracle_authority_info.key,
            entrance_fee,
            interval,
            gas_lane,
            subscription_id,
            callback_gas_limit,
            request_confirmations,
        };
        LotteryConfig::pack(config, &mut config_info.data.borrow_mut())?;

        let lottery = Lottery::new(clock.unix_timestamp);
        lottery.save(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: fee={} interval={}s oracle={} started_at={}",
            entrance_fee,
            interval,
            oracle_program_info.key,
            clock.unix_timestamp
        );
        Ok(())
    }

    /// Join the current round. The entry amount is transferred into the
    /// pool before the ledger update is persisted; a failed transfer
    /// aborts the whole instruction.
    fn process_enter(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let participant_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !participant_info.is_signer {
            msg!("Participant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let config = Self::checked_config(config_info, program_id)?;
        let mut lottery = Self::checked_lottery(lottery_info, program_id)?;

        if let Err(e) = lottery.record_entry(*participant_info.key, amount, config.entrance_fee) {
            msg!("Entry rejected: {}", e);
            return Err(e.into());
        }

        invoke(
            &system_instruction::transfer(participant_info.key, lottery_info.key, amount),
            &[
                participant_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        lottery.save(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Entered: participant={} amount={} entries={} pool={}",
            participant_info.key,
            amount,
            lottery.participant_count(),
            lottery.pool_balance
        );
        Ok(())
    }

    /// Evaluate draw eligibility and log the diagnostics. Never fails for
    /// a round that simply is not ready; schedulers poll this freely.
    fn process_check_eligibility(
        accounts: &[AccountInfo],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;

        let config = Self::checked_config(config_info, program_id)?;
        let lottery = Self::checked_lottery(lottery_info, program_id)?;

        let now = Clock::get()?.unix_timestamp;
        let result = eligibility::evaluate(&lottery, config.interval, now);

        msg!(
            "Eligibility: ready={} open={} interval_elapsed={} has_participants={} has_pool={}",
            result.ready(),
            result.is_open,
            result.interval_elapsed,
            result.has_participants,
            result.has_pool
        );
        Ok(())
    }

    /// Start a draw. Eligibility is re-evaluated here no matter what the
    /// caller saw beforehand, so stale or speculative triggers bounce off.
    fn process_trigger_draw(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let oracle_program_info = next_account_info(account_info_iter)?;

        let config = Self::checked_config(config_info, program_id)?;
        let mut lottery = Self::checked_lottery(lottery_info, program_id)?;

        if *oracle_program_info.key != config.oracle_program {
            msg!("Oracle program does not match the configured oracle");
            return Err(LotteryError::OracleMismatch.into());
        }

        // Phase gate first: a second trigger while a request is already
        // outstanding is an InvalidPhase, not merely "upkeep not needed".
        if lottery.phase != LotteryPhase::Open {
            msg!("Draw already in progress");
            return Err(LotteryError::InvalidPhase.into());
        }

        let now = Clock::get()?.unix_timestamp;
        let result = eligibility::evaluate(&lottery, config.interval, now);
        if !result.ready() {
            msg!(
                "Upkeep not needed: open={} interval_elapsed={} has_participants={} has_pool={}",
                result.is_open,
                result.interval_elapsed,
                result.has_participants,
                result.has_pool
            );
            return Err(LotteryError::UpkeepNotNeeded.into());
        }

        let request_id = lottery.begin_draw()?;
        lottery.save(&mut lottery_info.data.borrow_mut())?;

        oracle::request_random_words(
            oracle_program_info,
            lottery_info,
            &RandomnessRequest::new(request_id, &config),
        )?;

        msg!("DrawRequested: request_id={}", request_id);
        Ok(())
    }

    /// Oracle callback: validate the request id against the outstanding
    /// one, pay the entire pool to the selected participant, then reset
    /// the round. Any payout failure aborts before the reset so the
    /// fulfillment can be retried.
    fn process_fulfill(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !oracle_authority_info.is_signer {
            msg!("Oracle authority must sign the fulfillment");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let config = Self::checked_config(config_info, program_id)?;
        let mut lottery = Self::checked_lottery(lottery_info, program_id)?;

        if *oracle_authority_info.key != config.oracle_authority {
            msg!("Fulfillment not signed by the configured oracle authority");
            return Err(LotteryError::OracleMismatch.into());
        }

        let random_word = *random_words
            .first()
            .ok_or(LotteryError::InvalidRequest)?;

        let (winner_index, winner) = lottery.select_winner(request_id, random_word)?;

        if *winner_info.key != winner {
            msg!(
                "Winner account {} does not match selected participant {}",
                winner_info.key,
                winner
            );
            return Err(LotteryError::PayoutFailed.into());
        }

        let prize = lottery.pool_balance;
        let remaining = lottery_info
            .lamports()
            .checked_sub(prize)
            .ok_or(LotteryError::PayoutFailed)?;
        let credited = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(LotteryError::PayoutFailed)?;
        **lottery_info.lamports.borrow_mut() = remaining;
        **winner_info.lamports.borrow_mut() = credited;

        let now = Clock::get()?.unix_timestamp;
        lottery.complete_draw(winner, now);
        lottery.save(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "WinnerSelected: winner={} amount={} index={} next_round_started_at={}",
            winner,
            prize,
            winner_index,
            now
        );
        Ok(())
    }

    /// Unpack the config PDA after verifying its address and owner
    fn checked_config(
        config_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<LotteryConfig, ProgramError> {
        let (expected_config_pubkey, _) = find_config_address(program_id);
        if *config_info.key != expected_config_pubkey {
            msg!("Invalid config account address");
            return Err(ProgramError::InvalidArgument);
        }
        if config_info.owner != program_id {
            msg!("Config account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        LotteryConfig::unpack(&config_info.data.borrow())
    }

    /// Load the round account after verifying owner and initialization
    fn checked_lottery(
        lottery_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<Lottery, ProgramError> {
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let lottery = Lottery::load(&lottery_info.data.borrow())?;
        if !lottery.is_initialized {
            msg!("Lottery account is not initialized");
            return Err(LotteryError::NotInitialized.into());
        }
        Ok(lottery)
    }
}
