use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum LotteryError {
    /// Entry amount is below the configured entrance fee
    #[error("Entry amount is below the entrance fee")]
    InsufficientFee,

    /// Entry attempted while a draw is in progress
    #[error("Round is not open for entries")]
    RoundNotOpen,

    /// Draw trigger attempted while the round is not eligible
    #[error("Upkeep not needed: round is not eligible for a draw")]
    UpkeepNotNeeded,

    /// Draw trigger attempted while a draw is already in progress
    #[error("Invalid phase for this operation")]
    InvalidPhase,

    /// Fulfillment with a mismatched request id or while no request is outstanding
    #[error("Fulfillment does not match the outstanding randomness request")]
    InvalidRequest,

    /// Prize transfer could not be completed
    #[error("Payout to the selected winner failed")]
    PayoutFailed,

    /// Account has not been initialized
    #[error("Account is not initialized")]
    NotInitialized,

    /// Account is already initialized
    #[error("Account is already in use")]
    AlreadyInUse,

    /// Fulfillment signed by a key other than the configured oracle authority
    #[error("Caller is not the configured oracle authority")]
    OracleMismatch,

    /// Construction parameters out of range
    #[error("Invalid lottery configuration")]
    InvalidConfiguration,

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
