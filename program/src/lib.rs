// RaffleHub
// Vaults, verifiable randomness requests and raffles on Solana

// Core modules
pub mod constants;
pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod utils;

// Account state
pub mod hub_state;
pub mod raffle_state;
pub mod requester_state;
pub mod vault_state;

// Instruction handlers
pub mod distributor;
pub mod hub_processor;
pub mod raffle_processor;
pub mod requester_processor;
pub mod vault_processor;

pub mod randomness;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process_instruction(program_id, accounts, instruction_data)
}
