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
    constants::{FACTORY_SEED, HUB_SEED, PRICE_FEED_SEED, RAFFLE_SEED},
    error::HubError,
    events::{emit, HubEvent},
    hub_state::{HubConfig, HubSettings, PriceFeed, Role},
    raffle_state::{Metadata, Raffle, RaffleParams, RaffleType, TicketToken},
    utils::{
        assert_address, assert_owned_by, assert_signer, assert_system_program, assert_token_program,
        create_ata_idempotent, create_pda_account, find_factory_address, find_hub_address,
        find_price_feed_address, find_raffle_address, load_mint, save_borsh,
    },
    vault_processor::{create_vault, VaultCreation},
    vault_state::{OwnershipMode, VaultFactory},
};

pub fn load_hub(program_id: &Pubkey, info: &AccountInfo) -> Result<HubConfig, ProgramError> {
    let (hub_key, _) = find_hub_address(program_id);
    assert_address(info, &hub_key)?;
    assert_owned_by(info, program_id)?;
    HubConfig::unpack(&info.data.borrow())
}

/// A price-fed ticket must point at the feed kept for its mint
fn validate_ticket_token(program_id: &Pubkey, ticket_token: &TicketToken) -> ProgramResult {
    if let TicketToken::PriceFed { mint, feed } = ticket_token {
        if find_price_feed_address(program_id, mint).0 != *feed {
            msg!("Feed {} is not the price feed of {}", feed, mint);
            return Err(HubError::InvalidPriceFeed.into());
        }
    }
    Ok(())
}

/// Allocates the raffle account for the hub's next id
fn create_raffle_account<'info>(
    program_id: &Pubkey,
    hub: &mut HubConfig,
    payer_info: &AccountInfo<'info>,
    raffle_info: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
) -> Result<(u64, u8), ProgramError> {
    let raffle_id = hub.next_raffle_id()?;
    let (raffle_key, bump) = find_raffle_address(program_id, raffle_id);
    assert_address(raffle_info, &raffle_key)?;
    create_pda_account(
        payer_info,
        raffle_info,
        system_program_info,
        Raffle::LEN,
        program_id,
        &[RAFFLE_SEED, &raffle_id.to_le_bytes(), &[bump]],
    )?;
    Ok((raffle_id, bump))
}

pub struct HubProcessor;

impl HubProcessor {
    pub fn process_initialize_hub(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        settings: HubSettings,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let factory_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        assert_system_program(system_program_info)?;
        settings.validate()?;

        let (hub_key, hub_bump) = find_hub_address(program_id);
        assert_address(hub_info, &hub_key)?;
        let (factory_key, factory_bump) = find_factory_address(program_id);
        assert_address(factory_info, &factory_key)?;
        if hub_info.owner == program_id {
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        create_pda_account(
            admin_info,
            hub_info,
            system_program_info,
            HubConfig::LEN,
            program_id,
            &[HUB_SEED, &[hub_bump]],
        )?;
        create_pda_account(
            admin_info,
            factory_info,
            system_program_info,
            VaultFactory::LEN,
            program_id,
            &[FACTORY_SEED, &[factory_bump]],
        )?;

        let mut hub = HubConfig {
            is_initialized: true,
            admin: *admin_info.key,
            operator: Pubkey::default(),
            treasury: Pubkey::default(),
            raffle_cut: 0,
            yolo_raffle_cut: 0,
            cancellation_fee: 0,
            yolo_duration: 0,
            winner_requester: Pubkey::default(),
            raffle_count: 0,
            bump: hub_bump,
        };
        hub.apply(&settings)?;
        HubConfig::pack(hub, &mut hub_info.data.borrow_mut())?;
        VaultFactory::pack(
            VaultFactory {
                is_initialized: true,
                vault_count: 0,
                bump: factory_bump,
            },
            &mut factory_info.data.borrow_mut(),
        )?;

        emit(HubEvent::HubConfigured {
            admin: hub.admin,
            operator: hub.operator,
            treasury: hub.treasury,
            raffle_cut: hub.raffle_cut,
            yolo_raffle_cut: hub.yolo_raffle_cut,
        })?;
        msg!("Hub initialized, admin {}", hub.admin);
        Ok(())
    }

    pub fn process_update_hub_config(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        settings: HubSettings,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        let mut hub = load_hub(program_id, hub_info)?;
        hub.require(admin_info.key, Role::Admin)?;
        hub.apply(&settings)?;
        HubConfig::pack(hub, &mut hub_info.data.borrow_mut())?;

        emit(HubEvent::HubConfigured {
            admin: hub.admin,
            operator: hub.operator,
            treasury: hub.treasury,
            raffle_cut: hub.raffle_cut,
            yolo_raffle_cut: hub.yolo_raffle_cut,
        })?;
        msg!("Hub configuration updated");
        Ok(())
    }

    pub fn process_set_price_feed(program_id: &Pubkey, accounts: &[AccountInfo], value: u128) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let feed_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        load_hub(program_id, hub_info)?.require(admin_info.key, Role::Admin)?;
        if value == 0 {
            return Err(HubError::InvalidParameter.into());
        }
        load_mint(mint_info)?;

        let (feed_key, bump) = find_price_feed_address(program_id, mint_info.key);
        assert_address(feed_info, &feed_key)?;
        if feed_info.owner != program_id {
            assert_system_program(system_program_info)?;
            create_pda_account(
                admin_info,
                feed_info,
                system_program_info,
                PriceFeed::LEN,
                program_id,
                &[PRICE_FEED_SEED, mint_info.key.as_ref(), &[bump]],
            )?;
        }

        let feed = PriceFeed {
            is_initialized: true,
            mint: *mint_info.key,
            value,
            updated_at: Clock::get()?.unix_timestamp,
            bump,
        };
        PriceFeed::pack(feed, &mut feed_info.data.borrow_mut())?;

        emit(HubEvent::PriceFeedUpdated { mint: feed.mint, value })?;
        msg!("Price feed for {} set to {}", feed.mint, value);
        Ok(())
    }

    pub fn process_create_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        params: RaffleParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(creator_info)?;
        assert_system_program(system_program_info)?;
        let mut hub = load_hub(program_id, hub_info)?;
        params.validate()?;
        validate_ticket_token(program_id, &params.ticket_token)?;

        let (raffle_id, bump) =
            create_raffle_account(program_id, &mut hub, creator_info, raffle_info, system_program_info)?;
        let raffle = Raffle::new(raffle_id, RaffleType::Traditional, *creator_info.key, params, bump)?;
        save_borsh(&raffle, raffle_info)?;
        HubConfig::pack(hub, &mut hub_info.data.borrow_mut())?;

        emit(HubEvent::RaffleCreated {
            raffle_id,
            raffle_type: RaffleType::Traditional,
            creator: *creator_info.key,
        })?;
        msg!("Raffle {} created by {}", raffle_id, creator_info.key);
        Ok(())
    }

    /// Accounts: operator, hub, raffle, factory,
    /// tickets vault, its ownership mint, the raffle's ownership token account,
    /// pot vault, its ownership mint, the raffle's ownership token account,
    /// system program, token program, associated token program,
    /// and for token tickets: ticket mint, tickets vault ticket account, pot vault ticket account
    pub fn process_create_yolo_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        ticket_price: u64,
        ticket_token: TicketToken,
        required_balance: u64,
        metadata: Metadata,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let factory_info = next_account_info(account_info_iter)?;
        let tickets_vault_info = next_account_info(account_info_iter)?;
        let tickets_mint_info = next_account_info(account_info_iter)?;
        let tickets_proof_info = next_account_info(account_info_iter)?;
        let pot_vault_info = next_account_info(account_info_iter)?;
        let pot_mint_info = next_account_info(account_info_iter)?;
        let pot_proof_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;
        let associated_token_program_info = next_account_info(account_info_iter)?;

        assert_signer(operator_info)?;
        assert_system_program(system_program_info)?;
        assert_token_program(token_program_info)?;
        let mut hub = load_hub(program_id, hub_info)?;
        hub.require(operator_info.key, Role::Operator)?;
        validate_ticket_token(program_id, &ticket_token)?;

        let now = Clock::get()?.unix_timestamp;
        let params = RaffleParams {
            start_time: now,
            expected_end_time: now
                .checked_add(hub.yolo_duration)
                .ok_or(HubError::ArithmeticOverflow)?,
            ticket_price,
            required_balance,
            metadata,
            ticket_token,
            winner_number: 1,
        };
        params.validate()?;

        let (raffle_id, bump) =
            create_raffle_account(program_id, &mut hub, operator_info, raffle_info, system_program_info)?;

        let tickets_vault = create_vault(
            program_id,
            &VaultCreation {
                payer: operator_info,
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
        let pot_vault = create_vault(
            program_id,
            &VaultCreation {
                payer: operator_info,
                factory: factory_info,
                vault: pot_vault_info,
                vault_mint: pot_mint_info,
                owner: raffle_info,
                owner_token_account: pot_proof_info,
                system_program: system_program_info,
                token_program: token_program_info,
                associated_token_program: associated_token_program_info,
            },
            OwnershipMode::Token,
        )?;

        if let Some(mint) = ticket_token.mint() {
            let ticket_mint_info = next_account_info(account_info_iter)?;
            let tickets_vault_ata_info = next_account_info(account_info_iter)?;
            let pot_vault_ata_info = next_account_info(account_info_iter)?;
            assert_address(ticket_mint_info, &mint)?;
            for (vault_info, ata_info) in [
                (tickets_vault_info, tickets_vault_ata_info),
                (pot_vault_info, pot_vault_ata_info),
            ] {
                create_ata_idempotent(
                    operator_info,
                    ata_info,
                    vault_info,
                    ticket_mint_info,
                    system_program_info,
                    token_program_info,
                    associated_token_program_info,
                )?;
            }
        }

        let raffle = Raffle::new_yolo(
            raffle_id,
            *operator_info.key,
            params,
            pot_vault,
            *pot_mint_info.key,
            tickets_vault,
            bump,
        )?;
        save_borsh(&raffle, raffle_info)?;
        HubConfig::pack(hub, &mut hub_info.data.borrow_mut())?;

        emit(HubEvent::RaffleCreated {
            raffle_id,
            raffle_type: RaffleType::Yolo,
            creator: *operator_info.key,
        })?;
        emit(HubEvent::RaffleOpened {
            raffle_id,
            prizes_vault: pot_vault.address,
            tickets_vault: tickets_vault.address,
        })?;
        msg!("Yolo raffle {} open until {}", raffle_id, raffle.params.expected_end_time);
        Ok(())
    }
}
