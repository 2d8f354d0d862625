use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey};

use crate::{
    distributor::DistributorProcessor,
    hub_processor::HubProcessor,
    instruction::HubInstruction,
    raffle_processor::RaffleProcessor,
    requester_processor::RequesterProcessor,
    requester_state::RequestParams,
    vault_processor::VaultProcessor,
};

/// Program state handler.
pub struct Processor {}

impl Processor {
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = HubInstruction::unpack(instruction_data)?;

        match instruction {
            HubInstruction::InitializeHub { settings } => {
                msg!("Instruction: InitializeHub");
                HubProcessor::process_initialize_hub(program_id, accounts, settings)
            }
            HubInstruction::UpdateHubConfig { settings } => {
                msg!("Instruction: UpdateHubConfig");
                HubProcessor::process_update_hub_config(program_id, accounts, settings)
            }
            HubInstruction::SetPriceFeed { value } => {
                msg!("Instruction: SetPriceFeed");
                HubProcessor::process_set_price_feed(program_id, accounts, value)
            }
            HubInstruction::CreateVault { mode } => {
                msg!("Instruction: CreateVault");
                VaultProcessor::process_create_vault(program_id, accounts, mode)
            }
            HubInstruction::EnableWithdraw => {
                msg!("Instruction: EnableWithdraw");
                VaultProcessor::process_enable_withdraw(program_id, accounts)
            }
            HubInstruction::WithdrawNative { amount } => {
                msg!("Instruction: WithdrawNative");
                VaultProcessor::process_withdraw_native(program_id, accounts, amount)
            }
            HubInstruction::WithdrawToken { amount } => {
                msg!("Instruction: WithdrawToken");
                VaultProcessor::process_withdraw_token(program_id, accounts, amount)
            }
            HubInstruction::WithdrawNft => {
                msg!("Instruction: WithdrawNft");
                VaultProcessor::process_withdraw_nft(program_id, accounts)
            }
            HubInstruction::BatchAmountWithdraw { asset, amounts } => {
                msg!("Instruction: BatchAmountWithdraw");
                VaultProcessor::process_batch_amount_withdraw(program_id, accounts, asset, amounts)
            }
            HubInstruction::BatchPercentageWithdraw { asset, percentages } => {
                msg!("Instruction: BatchPercentageWithdraw");
                VaultProcessor::process_batch_percentage_withdraw(program_id, accounts, asset, percentages)
            }
            HubInstruction::TransferVaultOwnership { new_owner } => {
                msg!("Instruction: TransferVaultOwnership");
                VaultProcessor::process_transfer_vault_ownership(program_id, accounts, new_owner)
            }
            HubInstruction::DistributeNative { amounts } => {
                msg!("Instruction: DistributeNative");
                DistributorProcessor::process_distribute_native(accounts, amounts)
            }
            HubInstruction::DistributeTokens { amounts } => {
                msg!("Instruction: DistributeTokens");
                DistributorProcessor::process_distribute_tokens(accounts, amounts)
            }
            HubInstruction::InitializeRequester { kind } => {
                msg!("Instruction: InitializeRequester");
                RequesterProcessor::process_initialize_requester(program_id, accounts, kind)
            }
            HubInstruction::SetRequestParameters { parameters } => {
                msg!("Instruction: SetRequestParameters");
                RequesterProcessor::process_set_request_parameters(program_id, accounts, parameters)
            }
            HubInstruction::AddNewEndpoint { endpoint_id, signature } => {
                msg!("Instruction: AddNewEndpoint");
                RequesterProcessor::process_add_new_endpoint(program_id, accounts, endpoint_id, signature)
            }
            HubInstruction::RequestWinners {
                selector,
                total_winners,
                total_entries,
            } => {
                msg!("Instruction: RequestWinners");
                let params = RequestParams::winners(total_winners, total_entries)?;
                RequesterProcessor::process_request(program_id, accounts, selector, params)
            }
            HubInstruction::RequestNumbers { selector, cap, count } => {
                msg!("Instruction: RequestNumbers");
                let params = RequestParams::numbers(cap, count)?;
                RequesterProcessor::process_request(program_id, accounts, selector, params)
            }
            HubInstruction::FulfillRequest {
                request_id,
                selector,
                data,
            } => {
                msg!("Instruction: FulfillRequest");
                RequesterProcessor::process_fulfill(program_id, accounts, request_id, selector, data)
            }
            HubInstruction::RequestResults { request_id } => {
                msg!("Instruction: RequestResults");
                RequesterProcessor::process_request_results(program_id, accounts, request_id)
            }
            HubInstruction::CreateRaffle { params } => {
                msg!("Instruction: CreateRaffle");
                HubProcessor::process_create_raffle(program_id, accounts, params)
            }
            HubInstruction::CreateYoloRaffle {
                ticket_price,
                ticket_token,
                required_balance,
                metadata,
            } => {
                msg!("Instruction: CreateYoloRaffle");
                HubProcessor::process_create_yolo_raffle(
                    program_id,
                    accounts,
                    ticket_price,
                    ticket_token,
                    required_balance,
                    metadata,
                )
            }
            HubInstruction::UpdateWinners { winner_number } => {
                msg!("Instruction: UpdateWinners");
                RaffleProcessor::process_update_winners(program_id, accounts, winner_number)
            }
            HubInstruction::UpdateMetadata { metadata } => {
                msg!("Instruction: UpdateMetadata");
                RaffleProcessor::process_update_metadata(program_id, accounts, metadata)
            }
            HubInstruction::SetBeneficiaries { beneficiaries, shares } => {
                msg!("Instruction: SetBeneficiaries");
                RaffleProcessor::process_set_beneficiaries(program_id, accounts, beneficiaries, shares)
            }
            HubInstruction::UpdateBeneficiary { beneficiary, share } => {
                msg!("Instruction: UpdateBeneficiary");
                RaffleProcessor::process_update_beneficiary(program_id, accounts, beneficiary, share)
            }
            HubInstruction::OpenRaffle { prize_amounts } => {
                msg!("Instruction: OpenRaffle");
                RaffleProcessor::process_open_raffle(program_id, accounts, prize_amounts)
            }
            HubInstruction::EnterRaffle {
                participant,
                ticket_count,
            } => {
                msg!("Instruction: EnterRaffle");
                RaffleProcessor::process_enter_raffle(program_id, accounts, participant, ticket_count)
            }
            HubInstruction::CloseRaffle => {
                msg!("Instruction: CloseRaffle");
                RaffleProcessor::process_close_raffle(program_id, accounts)
            }
            HubInstruction::FinishRaffle => {
                msg!("Instruction: FinishRaffle");
                RaffleProcessor::process_finish_raffle(program_id, accounts)
            }
            HubInstruction::CancelRaffle => {
                msg!("Instruction: CancelRaffle");
                RaffleProcessor::process_cancel_raffle(program_id, accounts)
            }
            HubInstruction::ForceRecover => {
                msg!("Instruction: ForceRecover");
                RaffleProcessor::process_force_recover(program_id, accounts)
            }
            HubInstruction::ClaimPrize { prize_index } => {
                msg!("Instruction: ClaimPrize");
                RaffleProcessor::process_claim_prize(program_id, accounts, prize_index)
            }
            HubInstruction::ClaimRefund => {
                msg!("Instruction: ClaimRefund");
                RaffleProcessor::process_claim_refund(program_id, accounts)
            }
        }
    }
}
