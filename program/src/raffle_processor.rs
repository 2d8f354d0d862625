use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar::Sysvar,
};

use crate::{
    constants::{ENTRY_SEED, RAFFLE_SEED},
    error::HubError,
    events::{emit, HubEvent},
    hub_processor::load_hub,
    hub_state::{PriceFeed, Role},
    raffle_state::{
        CancelationReason, Entry, Metadata, PrizeItem, Raffle, RaffleStatus, RaffleType, TicketToken,
        VaultRef,
    },
    randomness::Callback,
    requester_processor::{issue_request, retrieve_results},
    requester_state::{RequestParams, RequesterKind},
    utils::{
        assert_address, assert_owned_by, assert_signer, assert_system_program, assert_token_program,
        create_ata_idempotent, create_pda_account, find_entry_address,
        find_vault_mint_address, load_borsh, load_mint, load_token_account, save_borsh,
        transfer_lamports, transfer_tokens,
    },
    vault_processor::{create_vault, VaultCreation, VaultGate},
    vault_state::OwnershipMode,
};

pub fn load_raffle(program_id: &Pubkey, info: &AccountInfo) -> Result<Raffle, ProgramError> {
    let raffle: Raffle = load_borsh(info, program_id)?;
    if !raffle.is_initialized {
        return Err(ProgramError::UninitializedAccount);
    }
    let expected = Pubkey::create_program_address(
        &[RAFFLE_SEED, &raffle.raffle_id.to_le_bytes(), &[raffle.bump]],
        program_id,
    )?;
    assert_address(info, &expected)?;
    Ok(raffle)
}

/// Loads one of the raffle's vaults, authorized with the raffle as its operator
fn raffle_vault<'a, 'info>(
    program_id: &Pubkey,
    raffle_key: &Pubkey,
    vault_ref: Option<VaultRef>,
    vault_info: &'a AccountInfo<'info>,
    proof_info: &AccountInfo<'info>,
) -> Result<VaultGate<'a, 'info>, ProgramError> {
    let vault_ref = vault_ref.ok_or(HubError::WrongRaffleStatus)?;
    assert_address(vault_info, &vault_ref.address)?;
    let gate = VaultGate::load(program_id, vault_info)?;
    gate.authorize(raffle_key, Some(proof_info))?;
    Ok(gate)
}

/// The vault's account in the ticket token, when tickets are not paid in lamports
fn ticket_account<'a, 'info, I>(
    raffle: &Raffle,
    vault: &Pubkey,
    account_info_iter: &mut I,
) -> Result<Option<&'a AccountInfo<'info>>, ProgramError>
where
    I: Iterator<Item = &'a AccountInfo<'info>>,
    'info: 'a,
{
    match raffle.params.ticket_token.mint() {
        None => Ok(None),
        Some(mint) => {
            let info = next_account_info(account_info_iter)?;
            load_token_account(info, &mint, vault)?;
            Ok(Some(info))
        }
    }
}

/// Checks where a payout in the ticket token to `owner` lands
fn assert_payee(ticket_token: &TicketToken, payee: &AccountInfo, owner: &Pubkey) -> ProgramResult {
    match ticket_token.mint() {
        None => assert_address(payee, owner),
        Some(mint) => load_token_account(payee, &mint, owner).map(|_| ()),
    }
}

pub struct RaffleProcessor;

impl RaffleProcessor {
    pub fn process_update_winners(program_id: &Pubkey, accounts: &[AccountInfo], winner_number: u8) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        raffle.update_winners(winner_number)?;
        save_borsh(&raffle, raffle_info)?;

        msg!("Raffle {} now draws {} winners", raffle.raffle_id, winner_number);
        Ok(())
    }

    pub fn process_update_metadata(program_id: &Pubkey, accounts: &[AccountInfo], metadata: Metadata) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        raffle.update_metadata(metadata)?;
        save_borsh(&raffle, raffle_info)?;

        msg!("Raffle {} metadata updated", raffle.raffle_id);
        Ok(())
    }

    pub fn process_set_beneficiaries(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        beneficiaries: Vec<Pubkey>,
        shares: Vec<u8>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        raffle.set_beneficiaries(&beneficiaries, &shares)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::SetRaffleBeneficiaries {
            raffle_id: raffle.raffle_id,
            beneficiaries,
            shares,
        })?;
        msg!("Raffle {} beneficiaries total {}%", raffle.raffle_id, raffle.beneficiary_total());
        Ok(())
    }

    pub fn process_update_beneficiary(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        beneficiary: Pubkey,
        share: u8,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        let old_share = raffle.update_beneficiary(&beneficiary, share)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::UpdateRaffleBeneficiary {
            raffle_id: raffle.raffle_id,
            beneficiary,
            old_share,
            new_share: share,
        })?;
        msg!("Beneficiary {} share {}% -> {}%", beneficiary, old_share, share);
        Ok(())
    }

    /// Accounts: creator, raffle, factory,
    /// prizes vault, its ownership mint, the raffle's ownership token account,
    /// tickets vault, its ownership mint, the raffle's ownership token account,
    /// system program, token program, associated token program,
    /// for token tickets: ticket mint, tickets vault ticket account,
    /// then per prize: prize mint, creator source account, prizes vault account
    pub fn process_open_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        prize_amounts: Vec<u64>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let factory_info = next_account_info(account_info_iter)?;
        let prizes_vault_info = next_account_info(account_info_iter)?;
        let prizes_mint_info = next_account_info(account_info_iter)?;
        let prizes_proof_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let tickets_mint_info = next_account_info(account_info_iter)?;
        let tickets_proof_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;
        let associated_token_program_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        assert_system_program(system_program_info)?;
        assert_token_program(token_program_info)?;

        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        let now = Clock::get()?.unix_timestamp;
        raffle.validate_open(now, prize_amounts.len())?;
        if prize_amounts.iter().any(|amount| *amount == 0) {
            return Err(HubError::InvalidParameter.into());
        }

        let prizes_vault = create_vault(
            program_id,
            &VaultCreation {
                payer: creator_info,
                factory: factory_info,
                vault: prizes_vault_info,
                vault_mint: prizes_mint_info,
                owner: raffle_info,
                owner_token_account: prizes_proof_info,
                system_program: system_program_info,
                token_program: token_program_info,
                associated_token_program: associated_token_program_info,
            },
            OwnershipMode::Token,
        )?;
        let tickets_vault = create_vault(
            program_id,
            &VaultCreation {
                payer: creator_info,
                factory: factory_info,
                vault: tickets_vault_info,
                vault_mint: tickets_mint_info,
                owner: raffle_info,
                owner_token_account: tickets_proof_info,
                system_program: system_program_info,
                token_program: token_program_info,
                associated_token_program: associated_token_program_info,
            },
            OwnershipMode::Token,
        )?;

        if let Some(mint) = raffle.params.ticket_token.mint() {
            let ticket_mint_info = next_account_info(account_info_iter)?;
            let tickets_vault_ata_info = next_account_info(account_info_iter)?;
            assert_address(ticket_mint_info, &mint)?;
            create_ata_idempotent(
                creator_info,
                tickets_vault_ata_info,
                tickets_vault_info,
                ticket_mint_info,
                system_program_info,
                token_program_info,
                associated_token_program_info,
            )?;
        }

        let mut prizes = Vec::with_capacity(prize_amounts.len());
        for amount in prize_amounts {
            let mint_info = next_account_info(account_info_iter)?;
            let source_info = next_account_info(account_info_iter)?;
            let vault_account_info = next_account_info(account_info_iter)?;

            load_mint(mint_info)?;
            load_token_account(source_info, mint_info.key, creator_info.key)?;
            create_ata_idempotent(
                creator_info,
                vault_account_info,
                prizes_vault_info,
                mint_info,
                system_program_info,
                token_program_info,
                associated_token_program_info,
            )?;
            transfer_tokens(token_program_info, source_info, vault_account_info, creator_info, amount, &[])?;
            prizes.push(PrizeItem::new(*mint_info.key, amount));
        }

        raffle.open(now, prizes, prizes_vault, tickets_vault)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleOpened {
            raffle_id: raffle.raffle_id,
            prizes_vault: prizes_vault.address,
            tickets_vault: tickets_vault.address,
        })?;
        msg!("Raffle {} open with {} prizes", raffle.raffle_id, raffle.prizes.len());
        Ok(())
    }

    /// Accounts: payer, raffle, entry, tickets vault, system program,
    /// for token tickets: token program, payer token account, tickets vault ticket account,
    /// and for price-fed tickets the price feed
    pub fn process_enter_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        participant: Pubkey,
        ticket_count: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let entry_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(payer_info)?;
        assert_system_program(system_program_info)?;
        if participant == Pubkey::default() {
            return Err(HubError::ZeroAddress.into());
        }

        let mut raffle = load_raffle(program_id, raffle_info)?;
        let now = Clock::get()?.unix_timestamp;
        raffle.validate_entry(now, ticket_count)?;
        let tickets_vault = raffle.tickets_vault.ok_or(HubError::WrongRaffleStatus)?;
        assert_address(tickets_vault_info, &tickets_vault.address)?;

        let token_accounts = match raffle.params.ticket_token.mint() {
            None => None,
            Some(mint) => {
                let token_program_info = next_account_info(account_info_iter)?;
                let source_info = next_account_info(account_info_iter)?;
                let destination_info = next_account_info(account_info_iter)?;
                assert_token_program(token_program_info)?;
                load_token_account(destination_info, &mint, tickets_vault_info.key)?;
                Some((token_program_info, source_info, destination_info))
            }
        };
        let cost = match raffle.params.ticket_token {
            TicketToken::PriceFed { feed, .. } => {
                let feed_info = next_account_info(account_info_iter)?;
                assert_address(feed_info, &feed)?;
                assert_owned_by(feed_info, program_id)?;
                PriceFeed::unpack(&feed_info.data.borrow())?.ticket_cost(raffle.params.ticket_price, ticket_count)?
            }
            _ => raffle.fixed_cost(ticket_count)?,
        };
        if cost == 0 {
            return Err(HubError::InvalidParameter.into());
        }

        match token_accounts {
            None => transfer_lamports(payer_info, tickets_vault_info, system_program_info, cost)?,
            Some((token_program_info, source_info, destination_info)) => {
                transfer_tokens(token_program_info, source_info, destination_info, payer_info, cost, &[])?
            }
        }

        let (entry_key, entry_bump) = find_entry_address(program_id, raffle_info.key, &participant);
        assert_address(entry_info, &entry_key)?;
        let mut entry = if entry_info.owner == program_id {
            Entry::unpack(&entry_info.data.borrow())?
        } else {
            create_pda_account(
                payer_info,
                entry_info,
                system_program_info,
                Entry::LEN,
                program_id,
                &[ENTRY_SEED, raffle_info.key.as_ref(), participant.as_ref(), &[entry_bump]],
            )?;
            Entry {
                is_initialized: true,
                raffle: *raffle_info.key,
                participant,
                entries: 0,
                paid: 0,
                bump: entry_bump,
            }
        };
        entry.add(ticket_count, cost)?;
        Entry::pack(entry, &mut entry_info.data.borrow_mut())?;

        raffle.record_entry(now, participant, ticket_count, cost)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleEntered {
            raffle_id: raffle.raffle_id,
            participant,
            tickets: ticket_count,
            paid: cost,
        })?;
        msg!("{} bought {} tickets for {}", participant, ticket_count, cost);
        Ok(())
    }

    /// Accounts: caller, raffle, hub, tickets vault, winner requester, request, system program,
    /// and for token tickets the tickets vault ticket account
    pub fn process_close_raffle(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_system_program(system_program_info)?;
        let hub = load_hub(program_id, hub_info)?;
        assert_address(requester_info, &hub.winner_requester)?;

        let mut raffle = load_raffle(program_id, raffle_info)?;
        let tickets_vault = raffle.tickets_vault.ok_or(HubError::WrongRaffleStatus)?;
        assert_address(tickets_vault_info, &tickets_vault.address)?;
        let tickets = VaultGate::load(program_id, tickets_vault_info)?;
        let ticket_source = ticket_account(&raffle, tickets_vault_info.key, account_info_iter)?;
        let pot = tickets.balance(ticket_source)?;

        let now = Clock::get()?.unix_timestamp;
        raffle.validate_close(now, pot)?;
        let params = RequestParams::winners(raffle.params.winner_number as u64, raffle.total_entries)?;
        let callback = if raffle.params.winner_number == 1 {
            Callback::Single
        } else {
            Callback::Multiple
        };
        let selector = RequesterKind::WinnerSelection.callback_selector(callback);

        let request = issue_request(
            program_id,
            requester_info,
            request_info,
            caller_info,
            system_program_info,
            raffle_info.key,
            selector,
            params,
        )?;
        raffle.mark_closed(request)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleClosed {
            raffle_id: raffle.raffle_id,
            request_id: request.request_id,
        })?;
        msg!("Raffle {} closed with {} in the pot", raffle.raffle_id, pot);
        Ok(())
    }

    /// Accounts: caller, raffle, hub, request,
    /// prizes vault, the raffle's prizes ownership token account,
    /// tickets vault, the raffle's tickets ownership token account, token program,
    /// for token tickets the tickets vault ticket account, then
    /// traditional: treasury payee, creator payee, one payee per beneficiary;
    /// yolo: for token tickets the pot vault ticket account, treasury payee,
    /// and the winner's account for the pot ownership token.
    /// Traditional prizes stay in the prizes vault until claimed with `ClaimPrize`.
    pub fn process_finish_raffle(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let prizes_vault_info = next_account_info(account_info_iter)?;
        let prizes_proof_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let tickets_proof_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_token_program(token_program_info)?;
        let hub = load_hub(program_id, hub_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        if raffle.status != RaffleStatus::Close {
            return Err(HubError::WrongRaffleStatus.into());
        }
        let request = raffle.request.ok_or(HubError::WrongRaffleStatus)?;
        assert_address(request_info, &request.address)?;

        let winner_indexes = retrieve_results(program_id, request_info, raffle_info.key)?;
        let winners = raffle.winners_for(&winner_indexes)?;

        let mut prizes = raffle_vault(
            program_id,
            raffle_info.key,
            raffle.prizes_vault,
            prizes_vault_info,
            prizes_proof_info,
        )?;
        let mut tickets = raffle_vault(
            program_id,
            raffle_info.key,
            raffle.tickets_vault,
            tickets_vault_info,
            tickets_proof_info,
        )?;
        let ticket_source = ticket_account(&raffle, tickets_vault_info.key, account_info_iter)?;
        let balance = tickets.balance(ticket_source)?;
        let ticket_token = raffle.params.ticket_token;
        tickets.enable_withdraw()?;

        let (available_amount, treasury_amount) = match raffle.raffle_type {
            RaffleType::Traditional => {
                let settlement = raffle.settlement(balance, hub.raffle_cut)?;

                let treasury_payee = next_account_info(account_info_iter)?;
                let creator_payee = next_account_info(account_info_iter)?;
                assert_payee(&ticket_token, treasury_payee, &hub.treasury)?;
                assert_payee(&ticket_token, creator_payee, &raffle.creator)?;

                let mut recipients = vec![treasury_payee.clone()];
                let mut amounts = vec![settlement.treasury_amount];
                for (beneficiary, amount) in raffle.beneficiaries.iter().zip(&settlement.beneficiary_amounts) {
                    let payee = next_account_info(account_info_iter)?;
                    assert_payee(&ticket_token, payee, &beneficiary.address)?;
                    recipients.push(payee.clone());
                    amounts.push(*amount);
                }
                recipients.push(creator_payee.clone());
                amounts.push(settlement.creator_amount);
                tickets.pay_out(
                    ticket_source.map(|source| (token_program_info, source)),
                    &recipients,
                    &amounts,
                )?;

                prizes.enable_withdraw()?;

                (settlement.available_amount, settlement.treasury_amount)
            }
            RaffleType::Yolo => {
                let pot_destination = match ticket_token.mint() {
                    None => prizes_vault_info,
                    Some(mint) => {
                        let pot_account_info = next_account_info(account_info_iter)?;
                        load_token_account(pot_account_info, &mint, prizes_vault_info.key)?;
                        pot_account_info
                    }
                };
                let treasury_payee = next_account_info(account_info_iter)?;
                let winner_account_info = next_account_info(account_info_iter)?;
                assert_payee(&ticket_token, treasury_payee, &hub.treasury)?;

                let split = raffle.settlement(balance, hub.yolo_raffle_cut)?;
                let (treasury_amount, pot_amount) = (split.treasury_amount, split.available_amount);
                tickets.pay_out(
                    ticket_source.map(|source| (token_program_info, source)),
                    &[treasury_payee.clone(), pot_destination.clone()],
                    &[treasury_amount, pot_amount],
                )?;

                // the pot vault stays disabled; its ownership token moves to the winner
                let pot_mint = raffle.prizes.first().ok_or(HubError::InvalidParameter)?.mint;
                let winner = winners.first().ok_or(HubError::InvalidParameter)?;
                load_token_account(winner_account_info, &pot_mint, winner)?;
                let id_bytes = raffle.raffle_id.to_le_bytes();
                let raffle_seeds: &[&[u8]] = &[RAFFLE_SEED, &id_bytes, &[raffle.bump]];
                transfer_tokens(
                    token_program_info,
                    prizes_proof_info,
                    winner_account_info,
                    raffle_info,
                    1,
                    &[raffle_seeds],
                )?;

                (pot_amount, treasury_amount)
            }
        };

        raffle.finish(winner_indexes.clone(), winners.clone())?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleFinished {
            raffle_id: raffle.raffle_id,
            raffle_type: raffle.raffle_type,
            winner_indexes,
            winners,
            available_amount,
            treasury_amount,
        })?;
        msg!(
            "Raffle {} finished, {} available, {} to treasury",
            raffle.raffle_id,
            available_amount,
            treasury_amount
        );
        Ok(())
    }

    /// Accounts: creator, raffle, hub, treasury, system program, and when the raffle is open:
    /// prizes vault, the raffle's prizes ownership token account,
    /// tickets vault, the raffle's tickets ownership token account.
    /// Prizes go back with `ClaimPrize` and entries are refunded with `ClaimRefund`.
    pub fn process_cancel_raffle(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let treasury_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        assert_system_program(system_program_info)?;
        let hub = load_hub(program_id, hub_info)?;
        assert_address(treasury_info, &hub.treasury)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_creator(creator_info.key)?;
        let was_open = raffle.status == RaffleStatus::Open;
        raffle.cancel()?;

        if was_open {
            let prizes_vault_info = next_account_info(account_info_iter)?;
            let prizes_proof_info = next_account_info(account_info_iter)?;
            let tickets_vault_info = next_account_info(account_info_iter)?;
            let tickets_proof_info = next_account_info(account_info_iter)?;

            let mut tickets = raffle_vault(
                program_id,
                raffle_info.key,
                raffle.tickets_vault,
                tickets_vault_info,
                tickets_proof_info,
            )?;
            tickets.enable_withdraw()?;
            // a yolo pot vault is still empty
            if raffle.raffle_type == RaffleType::Traditional {
                let mut prizes = raffle_vault(
                    program_id,
                    raffle_info.key,
                    raffle.prizes_vault,
                    prizes_vault_info,
                    prizes_proof_info,
                )?;
                prizes.enable_withdraw()?;
            }
        }

        transfer_lamports(creator_info, treasury_info, system_program_info, hub.cancellation_fee)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleCanceled {
            raffle_id: raffle.raffle_id,
            raffle_type: raffle.raffle_type,
            reason: CancelationReason::CreatorDecision,
        })?;
        msg!("Raffle {} canceled, {} to refund", raffle.raffle_id, raffle.total_collected);
        Ok(())
    }

    /// Accounts: caller, raffle, prizes vault, the raffle's prizes ownership token account,
    /// the prizes vault account for the prize mint, the recipient's account for it, token program
    pub fn process_claim_prize(program_id: &Pubkey, accounts: &[AccountInfo], prize_index: u8) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let prizes_vault_info = next_account_info(account_info_iter)?;
        let prizes_proof_info = next_account_info(account_info_iter)?;
        let source_info = next_account_info(account_info_iter)?;
        let destination_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_token_program(token_program_info)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        let (prize, recipient) = raffle.claim_prize(prize_index as usize)?;

        let prizes = raffle_vault(
            program_id,
            raffle_info.key,
            raffle.prizes_vault,
            prizes_vault_info,
            prizes_proof_info,
        )?;
        load_token_account(source_info, &prize.mint, prizes_vault_info.key)?;
        load_token_account(destination_info, &prize.mint, &recipient)?;
        prizes.withdraw_tokens(token_program_info, source_info, destination_info, prize.amount)?;
        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::PrizeClaimed {
            raffle_id: raffle.raffle_id,
            prize_index,
            mint: prize.mint,
            amount: prize.amount,
            recipient,
        })?;
        msg!("Raffle {} prize {} sent to {}", raffle.raffle_id, prize_index, recipient);
        Ok(())
    }

    /// Accounts: caller, raffle, entry, tickets vault, the raffle's tickets ownership token account,
    /// token program, for token tickets the tickets vault ticket account, then the participant's payee
    pub fn process_claim_refund(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let entry_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let tickets_proof_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_token_program(token_program_info)?;
        let raffle = load_raffle(program_id, raffle_info)?;
        raffle.assert_refundable()?;

        assert_owned_by(entry_info, program_id)?;
        let mut entry = Entry::unpack(&entry_info.data.borrow())?;
        let expected = Pubkey::create_program_address(
            &[ENTRY_SEED, raffle_info.key.as_ref(), entry.participant.as_ref(), &[entry.bump]],
            program_id,
        )?;
        assert_address(entry_info, &expected)?;

        let tickets = raffle_vault(
            program_id,
            raffle_info.key,
            raffle.tickets_vault,
            tickets_vault_info,
            tickets_proof_info,
        )?;
        let ticket_source = ticket_account(&raffle, tickets_vault_info.key, account_info_iter)?;
        let destination_info = next_account_info(account_info_iter)?;
        assert_payee(&raffle.params.ticket_token, destination_info, &entry.participant)?;

        let amount = entry.take_refund()?;
        Entry::pack(entry, &mut entry_info.data.borrow_mut())?;
        match ticket_source {
            None => tickets.withdraw_native(destination_info, amount)?,
            Some(source_info) => tickets.withdraw_tokens(token_program_info, source_info, destination_info, amount)?,
        }

        emit(HubEvent::RefundClaimed {
            raffle_id: raffle.raffle_id,
            participant: entry.participant,
            amount,
        })?;
        msg!("Refunded {} to {}", amount, entry.participant);
        Ok(())
    }

    /// Accounts: operator, raffle, hub, token program, and once the vaults exist:
    /// the raffle's prizes ownership token account, the operator's account for it,
    /// the raffle's tickets ownership token account, the operator's account for it
    pub fn process_force_recover(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(operator_info)?;
        assert_token_program(token_program_info)?;
        load_hub(program_id, hub_info)?.require(operator_info.key, Role::Operator)?;
        let mut raffle = load_raffle(program_id, raffle_info)?;
        raffle.force_recover()?;

        let id_bytes = raffle.raffle_id.to_le_bytes();
        let raffle_seeds: &[&[u8]] = &[RAFFLE_SEED, &id_bytes, &[raffle.bump]];
        for vault in [raffle.prizes_vault, raffle.tickets_vault].into_iter().flatten() {
            let proof_info = next_account_info(account_info_iter)?;
            let destination_info = next_account_info(account_info_iter)?;
            let (mint, _) = find_vault_mint_address(program_id, &vault.address);
            load_token_account(proof_info, &mint, raffle_info.key)?;
            load_token_account(destination_info, &mint, operator_info.key)?;
            transfer_tokens(
                token_program_info,
                proof_info,
                destination_info,
                raffle_info,
                1,
                &[raffle_seeds],
            )?;
            msg!("Vault {} handed to {}", vault.address, operator_info.key);
        }

        save_borsh(&raffle, raffle_info)?;

        emit(HubEvent::RaffleCanceled {
            raffle_id: raffle.raffle_id,
            raffle_type: raffle.raffle_type,
            reason: CancelationReason::ForcedCancelation,
        })?;
        msg!("Raffle {} force recovered", raffle.raffle_id);
        Ok(())
    }
}
