// Fan-out payments across many recipients
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_pack::Pack,
};
use spl_token::state::Account as TokenAccount;

use crate::{
    constants::{MAX_BATCH_RECIPIENTS, TOTAL_PCT},
    error::HubError,
    utils::{
        assert_signer, assert_system_program, assert_token_program, calculate_share, debit_lamports,
        spendable_lamports, transfer_lamports, transfer_tokens,
    },
};

/// Where native payouts come from
pub enum NativeSource<'a, 'info> {
    /// A signing wallet, paid out through the system program
    Wallet {
        wallet: &'a AccountInfo<'info>,
        system_program: &'a AccountInfo<'info>,
    },
    /// A program-owned escrow, debited directly
    Escrow(&'a AccountInfo<'info>),
}

/// Checks the list shapes and returns the total to pay
pub fn validate_batch(recipients: usize, amounts: &[u64]) -> Result<u64, HubError> {
    if recipients == 0 || recipients != amounts.len() || recipients > MAX_BATCH_RECIPIENTS {
        return Err(HubError::InvalidArrayLength);
    }
    amounts.iter().try_fold(0u64, |total, amount| {
        total.checked_add(*amount).ok_or(HubError::ArithmeticOverflow)
    })
}

/// Turns percentage shares of `balance` into amounts
pub fn percentage_amounts(balance: u64, percentages: &[u8]) -> Result<Vec<u64>, HubError> {
    let total: u32 = percentages.iter().map(|pct| *pct as u32).sum();
    if total > TOTAL_PCT as u32 {
        return Err(HubError::InvalidParameter);
    }
    percentages
        .iter()
        .map(|pct| calculate_share(balance, *pct))
        .collect()
}

pub fn distribute_native<'a, 'info>(
    source: NativeSource<'a, 'info>,
    recipients: &[AccountInfo<'info>],
    amounts: &[u64],
) -> ProgramResult {
    let total = validate_batch(recipients.len(), amounts)?;

    match source {
        NativeSource::Wallet { wallet, system_program } => {
            if wallet.lamports() < total {
                return Err(HubError::InsufficientFunds.into());
            }
            for (recipient, amount) in recipients.iter().zip(amounts) {
                transfer_lamports(wallet, recipient, system_program, *amount)?;
            }
        }
        NativeSource::Escrow(escrow) => {
            if spendable_lamports(escrow)? < total {
                return Err(HubError::InsufficientFunds.into());
            }
            for (recipient, amount) in recipients.iter().zip(amounts) {
                debit_lamports(escrow, recipient, *amount)?;
            }
        }
    }

    msg!("Distributed {} lamports to {} recipients", total, recipients.len());
    Ok(())
}

/// Pays every recipient token account from `source`. The balance is checked once up front.
pub fn distribute_tokens<'info>(
    token_program: &AccountInfo<'info>,
    source: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    recipients: &[AccountInfo<'info>],
    amounts: &[u64],
    signer_seeds: &[&[&[u8]]],
) -> ProgramResult {
    let total = validate_batch(recipients.len(), amounts)?;

    let balance = TokenAccount::unpack(&source.data.borrow())
        .map_err(|_| ProgramError::InvalidAccountData)?
        .amount;
    if balance < total {
        return Err(HubError::InsufficientFunds.into());
    }

    for (recipient, amount) in recipients.iter().zip(amounts) {
        transfer_tokens(token_program, source, recipient, authority, *amount, signer_seeds)?;
    }

    msg!("Distributed {} tokens to {} recipients", total, recipients.len());
    Ok(())
}

pub struct DistributorProcessor;

impl DistributorProcessor {
    /// Accounts: payer, system program, recipients...
    pub fn process_distribute_native(accounts: &[AccountInfo], amounts: Vec<u64>) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(payer_info)?;
        assert_system_program(system_program_info)?;
        distribute_native(
            NativeSource::Wallet {
                wallet: payer_info,
                system_program: system_program_info,
            },
            account_info_iter.as_slice(),
            &amounts,
        )
    }

    /// Accounts: authority, token program, source token account, recipient token accounts...
    pub fn process_distribute_tokens(accounts: &[AccountInfo], amounts: Vec<u64>) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;
        let source_info = next_account_info(account_info_iter)?;

        assert_signer(authority_info)?;
        assert_token_program(token_program_info)?;
        distribute_tokens(
            token_program_info,
            source_info,
            authority_info,
            account_info_iter.as_slice(),
            &amounts,
            &[],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_shape() {
        assert_eq!(validate_batch(2, &[1, 2]), Ok(3));
        assert_eq!(validate_batch(0, &[]), Err(HubError::InvalidArrayLength));
        assert_eq!(validate_batch(2, &[1]), Err(HubError::InvalidArrayLength));
        assert_eq!(
            validate_batch(2, &[u64::MAX, 1]),
            Err(HubError::ArithmeticOverflow)
        );
        let many = vec![1u64; MAX_BATCH_RECIPIENTS + 1];
        assert_eq!(
            validate_batch(many.len(), &many),
            Err(HubError::InvalidArrayLength)
        );
    }

    #[test]
    fn percentages_of_balance() {
        assert_eq!(percentage_amounts(1_000, &[50, 25]).unwrap(), vec![500, 250]);
        assert_eq!(percentage_amounts(10, &[33, 33, 34]).unwrap(), vec![3, 3, 3]);
        assert_eq!(percentage_amounts(10, &[60, 41]), Err(HubError::InvalidParameter));
    }
}
