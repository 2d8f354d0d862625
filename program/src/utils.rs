// RaffleHub - Utility Functions
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    borsh::try_from_slice_unchecked,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};
use spl_token::state::{Account as TokenAccount, Mint};

use crate::{
    constants::{
        ENTRY_SEED, FACTORY_SEED, HUB_SEED, PRICE_FEED_SEED, RAFFLE_SEED, REQUESTER_SEED,
        REQUEST_SEED, TOTAL_PCT, VAULT_MINT_SEED, VAULT_SEED,
    },
    error::HubError,
};

/// Find the hub config PDA
pub fn find_hub_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[HUB_SEED], program_id)
}

/// Find the vault factory PDA
pub fn find_factory_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FACTORY_SEED], program_id)
}

/// Find the vault PDA for a factory index
pub fn find_vault_address(program_id: &Pubkey, index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, &index.to_le_bytes()], program_id)
}

/// Find the ownership token mint of a vault
pub fn find_vault_mint_address(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_MINT_SEED, vault.as_ref()], program_id)
}

/// Find a program derived address for a raffle
pub fn find_raffle_address(program_id: &Pubkey, raffle_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED, &raffle_id.to_le_bytes()], program_id)
}

/// Find a program derived address for a raffle entry
pub fn find_entry_address(program_id: &Pubkey, raffle: &Pubkey, participant: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ENTRY_SEED, raffle.as_ref(), participant.as_ref()], program_id)
}

/// Find the requester PDA of a kind
pub fn find_requester_address(program_id: &Pubkey, kind: u8) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REQUESTER_SEED, &[kind]], program_id)
}

/// Find the request record PDA for a requester's n-th request
pub fn find_request_address(program_id: &Pubkey, requester: &Pubkey, request_index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[REQUEST_SEED, requester.as_ref(), &request_index.to_le_bytes()],
        program_id,
    )
}

/// Find the price feed PDA for a mint
pub fn find_price_feed_address(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PRICE_FEED_SEED, mint.as_ref()], program_id)
}

/// Calculate a whole-percentage share of an amount, rounding down
pub fn calculate_share(amount: u64, percentage: u8) -> Result<u64, HubError> {
    if percentage > TOTAL_PCT {
        return Err(HubError::InvalidParameter);
    }
    let share = (amount as u128)
        .checked_mul(percentage as u128)
        .ok_or(HubError::ArithmeticOverflow)?
        / TOTAL_PCT as u128;
    Ok(share as u64)
}

/// `a * b / denominator` without intermediate overflow
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u64, HubError> {
    if denominator == 0 {
        return Err(HubError::InvalidParameter);
    }
    let product = a.checked_mul(b).ok_or(HubError::ArithmeticOverflow)?;
    u64::try_from(product / denominator).map_err(|_| HubError::ArithmeticOverflow)
}

pub fn assert_signer(info: &AccountInfo) -> ProgramResult {
    if !info.is_signer {
        msg!("{} must sign the transaction", info.key);
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

pub fn assert_owned_by(info: &AccountInfo, owner: &Pubkey) -> ProgramResult {
    if info.owner != owner {
        msg!("Account {} has the wrong owner", info.key);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

pub fn assert_address(info: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if info.key != expected {
        msg!("Expected account {}, got {}", expected, info.key);
        return Err(ProgramError::InvalidArgument);
    }
    Ok(())
}

pub fn assert_system_program(info: &AccountInfo) -> ProgramResult {
    assert_address(info, &system_program::id())
}

pub fn assert_token_program(info: &AccountInfo) -> ProgramResult {
    assert_address(info, &spl_token::id())
}

/// Unpacks a token account and checks its mint and owner
pub fn load_token_account(
    info: &AccountInfo,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<TokenAccount, ProgramError> {
    assert_owned_by(info, &spl_token::id())?;
    let account = TokenAccount::unpack(&info.data.borrow())?;
    if account.mint != *mint {
        msg!("Token account {} holds the wrong mint", info.key);
        return Err(ProgramError::InvalidAccountData);
    }
    if account.owner != *owner {
        msg!("Token account {} is not owned by {}", info.key, owner);
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(account)
}

pub fn load_mint(info: &AccountInfo) -> Result<Mint, ProgramError> {
    assert_owned_by(info, &spl_token::id())?;
    Ok(Mint::unpack(&info.data.borrow())?)
}

/// Reads borsh state from a program-owned account allocated at its maximum size
pub fn load_borsh<T: BorshDeserialize>(info: &AccountInfo, program_id: &Pubkey) -> Result<T, ProgramError> {
    assert_owned_by(info, program_id)?;
    Ok(try_from_slice_unchecked::<T>(&info.data.borrow())?)
}

pub fn save_borsh<T: BorshSerialize>(state: &T, info: &AccountInfo) -> ProgramResult {
    state.serialize(&mut &mut info.data.borrow_mut()[..])?;
    Ok(())
}

/// Creates a rent-exempt account at a PDA, signed by its seeds
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    target: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    invoke_signed(
        &system_instruction::create_account(
            payer.key,
            target.key,
            rent.minimum_balance(space),
            space as u64,
            owner,
        ),
        &[payer.clone(), target.clone(), system_program_info.clone()],
        &[seeds],
    )
}

/// Lamports held above the rent-exempt minimum
pub fn spendable_lamports(info: &AccountInfo) -> Result<u64, ProgramError> {
    let rent = Rent::get()?;
    Ok(info
        .lamports()
        .saturating_sub(rent.minimum_balance(info.data_len())))
}

/// Moves lamports out of a program-owned account
pub fn debit_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    if spendable_lamports(from)? < amount {
        msg!("{} cannot pay {} lamports", from.key, amount);
        return Err(HubError::InsufficientFunds.into());
    }
    let from_balance = from
        .lamports()
        .checked_sub(amount)
        .ok_or(HubError::ArithmeticOverflow)?;
    let to_balance = to
        .lamports()
        .checked_add(amount)
        .ok_or(HubError::ArithmeticOverflow)?;
    **from.try_borrow_mut_lamports()? = from_balance;
    **to.try_borrow_mut_lamports()? = to_balance;
    Ok(())
}

/// System transfer from a signing wallet
pub fn transfer_lamports<'a>(
    from: &AccountInfo<'a>,
    to: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    invoke(
        &system_instruction::transfer(from.key, to.key, amount),
        &[from.clone(), to.clone(), system_program_info.clone()],
    )
}

/// SPL transfer, optionally signed by a PDA authority
pub fn transfer_tokens<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    let ix = spl_token::instruction::transfer(
        token_program.key,
        source.key,
        destination.key,
        authority.key,
        &[],
        amount,
    )?;
    invoke_signed(
        &ix,
        &[
            source.clone(),
            destination.clone(),
            authority.clone(),
            token_program.clone(),
        ],
        signer_seeds,
    )
}

/// Creates the associated token account of `wallet` for `mint` unless it already exists
pub fn create_ata_idempotent<'a>(
    payer: &AccountInfo<'a>,
    ata: &AccountInfo<'a>,
    wallet: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    token_program: &AccountInfo<'a>,
    associated_token_program: &AccountInfo<'a>,
) -> ProgramResult {
    invoke(
        &spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            payer.key,
            wallet.key,
            mint.key,
            token_program.key,
        ),
        &[
            payer.clone(),
            ata.clone(),
            wallet.clone(),
            mint.clone(),
            system_program_info.clone(),
            token_program.clone(),
            associated_token_program.clone(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_rounds_down() {
        assert_eq!(calculate_share(3_000_000_000, 5).unwrap(), 150_000_000);
        assert_eq!(calculate_share(99, 10).unwrap(), 9);
        assert_eq!(calculate_share(u64::MAX, 100).unwrap(), u64::MAX);
        assert_eq!(calculate_share(1, 101), Err(HubError::InvalidParameter));
    }

    #[test]
    fn mul_div_handles_wide_products() {
        // a price of 2 (18 decimals) at 0.5 per token costs 4 * 10^18 base units
        let price = 2 * 10u128.pow(18);
        let feed = 5 * 10u128.pow(17);
        assert_eq!(mul_div(price, 10u128.pow(18), feed).unwrap() as u128, 4 * 10u128.pow(18));
        assert_eq!(mul_div(1, 1, 0), Err(HubError::InvalidParameter));
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(HubError::ArithmeticOverflow));
    }

    #[test]
    fn vault_addresses_are_distinct_per_index() {
        let program_id = Pubkey::new_unique();
        let (first, _) = find_vault_address(&program_id, 0);
        let (second, _) = find_vault_address(&program_id, 1);
        assert_ne!(first, second);
        let (mint, _) = find_vault_mint_address(&program_id, &first);
        assert_ne!(mint, first);
    }
}
