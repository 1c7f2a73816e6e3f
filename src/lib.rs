// Solotto - an automated, verifiably-random prize-pool lottery on Solana.
// Participants pay an entrance fee into a shared pool; once the configured
// interval has elapsed an off-chain scheduler triggers a draw, a randomness
// oracle supplies the winning word, and the whole pool pays out to the
// selected participant before the round reopens.

pub mod eligibility;
pub mod error;
pub mod instruction;
pub mod oracle;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
