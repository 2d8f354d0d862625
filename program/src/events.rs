use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{entrypoint::ProgramResult, log::sol_log_data, pubkey::Pubkey};

use crate::raffle_state::{CancelationReason, RaffleType};

/// Structured events, logged as borsh bytes so indexers can decode them from `Program data:` lines
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum HubEvent {
    HubConfigured {
        admin: Pubkey,
        operator: Pubkey,
        treasury: Pubkey,
        raffle_cut: u8,
        yolo_raffle_cut: u8,
    },
    PriceFeedUpdated {
        mint: Pubkey,
        value: u128,
    },
    VaultCreated {
        index: u64,
        vault: Pubkey,
        ownership_mint: Option<Pubkey>,
    },
    VaultOwnershipTransferred {
        vault: Pubkey,
        new_owner: Pubkey,
    },
    WithdrawEnabled {
        vault: Pubkey,
        caller: Pubkey,
    },
    WithdrawNative {
        vault: Pubkey,
        recipient: Pubkey,
        amount: u64,
    },
    WithdrawToken {
        vault: Pubkey,
        mint: Pubkey,
        recipient: Pubkey,
        amount: u64,
    },
    WithdrawNft {
        vault: Pubkey,
        mint: Pubkey,
        recipient: Pubkey,
    },
    RequestParametersSet {
        requester: Pubkey,
        provider: Pubkey,
        sponsor: Pubkey,
        sponsor_wallet: Pubkey,
    },
    EndpointAdded {
        requester: Pubkey,
        endpoint_id: [u8; 32],
        selector: [u8; 4],
    },
    NewWinnerRequest {
        request_id: [u8; 32],
        consumer: Pubkey,
    },
    NewPickerRequest {
        request_id: [u8; 32],
        consumer: Pubkey,
    },
    RequestFulfilled {
        request_id: [u8; 32],
        endpoint_id: [u8; 32],
    },
    ResultsDelivered {
        request_id: [u8; 32],
        results: Vec<u64>,
    },
    RaffleCreated {
        raffle_id: u64,
        raffle_type: RaffleType,
        creator: Pubkey,
    },
    RaffleOpened {
        raffle_id: u64,
        prizes_vault: Pubkey,
        tickets_vault: Pubkey,
    },
    RaffleEntered {
        raffle_id: u64,
        participant: Pubkey,
        tickets: u64,
        paid: u64,
    },
    RaffleClosed {
        raffle_id: u64,
        request_id: [u8; 32],
    },
    RaffleFinished {
        raffle_id: u64,
        raffle_type: RaffleType,
        winner_indexes: Vec<u64>,
        winners: Vec<Pubkey>,
        available_amount: u64,
        treasury_amount: u64,
    },
    RaffleCanceled {
        raffle_id: u64,
        raffle_type: RaffleType,
        reason: CancelationReason,
    },
    PrizeClaimed {
        raffle_id: u64,
        prize_index: u8,
        mint: Pubkey,
        amount: u64,
        recipient: Pubkey,
    },
    RefundClaimed {
        raffle_id: u64,
        participant: Pubkey,
        amount: u64,
    },
    SetRaffleBeneficiaries {
        raffle_id: u64,
        beneficiaries: Vec<Pubkey>,
        shares: Vec<u8>,
    },
    UpdateRaffleBeneficiary {
        raffle_id: u64,
        beneficiary: Pubkey,
        old_share: u8,
        new_share: u8,
    },
}

/// Logs the event as a single `Program data:` entry
pub fn emit(event: HubEvent) -> ProgramResult {
    let data = event.try_to_vec()?;
    sol_log_data(&[&data]);
    Ok(())
}
