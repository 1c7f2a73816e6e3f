use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    borsh::try_from_slice_unchecked,
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Sentinel for "no randomness request outstanding". Request ids start at 1.
pub const NO_PENDING_REQUEST: u64 = 0;

/// Seed of the config PDA
pub const CONFIG_SEED: &[u8] = b"config";

/// Find the program derived address of the config account
pub fn find_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], program_id)
}

/// Phase of the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq)]
pub enum LotteryPhase {
    /// Accepting entries
    Open,
    /// Randomness request outstanding, entries rejected
    Calculating,
}

/// Immutable lottery configuration, written once at initialization.
/// Lives in the `b"config"` PDA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotteryConfig {
    pub is_initialized: bool,
    /// Account that initialized the lottery (recorded for provenance only)
    pub authority: Pubkey,
    /// Randomness oracle program that receives draw requests
    pub oracle_program: Pubkey,
    /// The only key whose signature is accepted on Fulfill
    pub oracle_authority: Pubkey,
    /// Minimum entry amount in lamports
    pub entrance_fee: u64,
    /// Minimum round duration in seconds
    pub interval: i64,
    /// Oracle request lane (key-hash) parameter, passed through verbatim
    pub gas_lane: [u8; 32],
    /// Oracle subscription funding the requests
    pub subscription_id: u64,
    /// Gas limit forwarded for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Confirmations the oracle should wait for before responding
    pub request_confirmations: u16,
}

/// Round state for the lottery. A single account holds the one round that
/// exists at a time; a completed draw resets it in place rather than
/// creating a new account, so past rounds are only visible in the logs.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Lottery {
    pub is_initialized: bool,
    pub phase: LotteryPhase,
    /// When the current round began (Unix timestamp)
    pub started_at: UnixTimestamp,
    /// Id of the outstanding randomness request, or NO_PENDING_REQUEST
    pub pending_request_id: u64,
    /// Monotonic counter from which request ids are issued
    pub request_counter: u64,
    /// Sum of all entry amounts received this round, in lamports
    pub pool_balance: u64,
    /// Winner of the most recent completed round
    pub recent_winner: Pubkey,
    /// Entries for the current round, insertion order preserved.
    /// The same participant may appear more than once; each entry is a
    /// distinct weighted slot in the draw.
    pub participants: Vec<Pubkey>,
}

impl Lottery {
    /// Serialized size excluding participant entries
    pub const BASE_LEN: usize = 1 + 1 + 8 + 8 + 8 + 8 + 32 + 4;

    /// Account space needed to hold up to `max_participants` entries.
    ///
    /// Account data cannot grow after allocation, so this caps the total
    /// entries a round can take: once the ledger outgrows the space, the
    /// next entry fails with `AccountDataTooSmall`. Size the account for
    /// the largest round you intend to run.
    pub fn space_for(max_participants: usize) -> usize {
        Self::BASE_LEN + max_participants * 32
    }

    pub fn new(started_at: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            phase: LotteryPhase::Open,
            started_at,
            pending_request_id: NO_PENDING_REQUEST,
            request_counter: 0,
            pool_balance: 0,
            recent_winner: Pubkey::default(),
            participants: Vec::new(),
        }
    }

    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        try_from_slice_unchecked::<Lottery>(data)
            .map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn save(&self, data: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut data[..])
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    pub fn participant_count(&self) -> u64 {
        self.participants.len() as u64
    }

    pub fn participant(&self, index: usize) -> Option<&Pubkey> {
        self.participants.get(index)
    }

    /// Append an entry to the current round. Rejected outside the Open
    /// phase and below the entrance fee; no state is touched on rejection.
    pub fn record_entry(
        &mut self,
        participant: Pubkey,
        amount: u64,
        entrance_fee: u64,
    ) -> Result<(), LotteryError> {
        if self.phase != LotteryPhase::Open {
            return Err(LotteryError::RoundNotOpen);
        }
        if amount < entrance_fee {
            return Err(LotteryError::InsufficientFee);
        }
        self.pool_balance = self
            .pool_balance
            .checked_add(amount)
            .ok_or(LotteryError::ArithmeticOverflow)?;
        self.participants.push(participant);
        Ok(())
    }

    /// Transition Open -> Calculating and issue a fresh request id.
    /// The id stays pending until the matching fulfillment succeeds.
    pub fn begin_draw(&mut self) -> Result<u64, LotteryError> {
        if self.phase != LotteryPhase::Open {
            return Err(LotteryError::InvalidPhase);
        }
        self.request_counter = self
            .request_counter
            .checked_add(1)
            .ok_or(LotteryError::ArithmeticOverflow)?;
        self.pending_request_id = self.request_counter;
        self.phase = LotteryPhase::Calculating;
        Ok(self.pending_request_id)
    }

    /// Validate a fulfillment against the outstanding request and select
    /// the winner. Winner index is `random_word % participant_count`; the
    /// modulo reduction is the documented selection rule, kept verbatim
    /// even though it is not perfectly uniform for counts that do not
    /// divide the word range.
    pub fn select_winner(
        &self,
        request_id: u64,
        random_word: u64,
    ) -> Result<(usize, Pubkey), LotteryError> {
        if self.phase != LotteryPhase::Calculating
            || self.pending_request_id == NO_PENDING_REQUEST
            || request_id != self.pending_request_id
        {
            return Err(LotteryError::InvalidRequest);
        }
        if self.participants.is_empty() {
            return Err(LotteryError::InvalidRequest);
        }
        let index = (random_word % self.participant_count()) as usize;
        Ok((index, self.participants[index]))
    }

    /// Reset the round after a successful payout: Calculating -> Open,
    /// ledger emptied, request cleared, clock restarted. Only called once
    /// the prize transfer has already succeeded.
    pub fn complete_draw(&mut self, winner: Pubkey, now: UnixTimestamp) {
        self.recent_winner = winner;
        self.participants.clear();
        self.pool_balance = 0;
        self.pending_request_id = NO_PENDING_REQUEST;
        self.started_at = now;
        self.phase = LotteryPhase::Open;
    }
}

impl Sealed for LotteryConfig {}

impl IsInitialized for LotteryConfig {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for LotteryConfig {
    const LEN: usize = 1 + 32 + 32 + 32 + 8 + 8 + 32 + 8 + 4 + 2;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, LotteryConfig::LEN];
        let (
            is_initialized,
            authority,
            oracle_program,
            oracle_authority,
            entrance_fee,
            interval,
            gas_lane,
            subscription_id,
            callback_gas_limit,
            request_confirmations,
        ) = array_refs![src, 1, 32, 32, 32, 8, 8, 32, 8, 4, 2];

        Ok(LotteryConfig {
            is_initialized: is_initialized[0] != 0,
            authority: Pubkey::new_from_array(*authority),
            oracle_program: Pubkey::new_from_array(*oracle_program),
            oracle_authority: Pubkey::new_from_array(*oracle_authority),
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: i64::from_le_bytes(*interval),
            gas_lane: *gas_lane,
            subscription_id: u64::from_le_bytes(*subscription_id),
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            request_confirmations: u16::from_le_bytes(*request_confirmations),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, LotteryConfig::LEN];
        let (
            is_initialized_dst,
            authority_dst,
            oracle_program_dst,
            oracle_authority_dst,
            entrance_fee_dst,
            interval_dst,
            gas_lane_dst,
            subscription_id_dst,
            callback_gas_limit_dst,
            request_confirmations_dst,
        ) = mut_array_refs![dst, 1, 32, 32, 32, 8, 8, 32, 8, 4, 2];

        is_initialized_dst[0] = self.is_initialized as u8;
        authority_dst.copy_from_slice(self.authority.as_ref());
        oracle_program_dst.copy_from_slice(self.oracle_program.as_ref());
        oracle_authority_dst.copy_from_slice(self.oracle_authority.as_ref());
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        gas_lane_dst.copy_from_slice(&self.gas_lane);
        *subscription_id_dst = self.subscription_id.to_le_bytes();
        *callback_gas_limit_dst = self.callback_gas_limit.to_le_bytes();
        *request_confirmations_dst = self.request_confirmations.to_le_bytes();
    }
}
