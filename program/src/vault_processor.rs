use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
};
use spl_token::{instruction::AuthorityType, state::Account as TokenAccount};

use crate::{
    constants::{FACTORY_SEED, VAULT_MINT_SEED, VAULT_SEED},
    distributor::{self, NativeSource},
    error::HubError,
    events::{emit, HubEvent},
    raffle_state::VaultRef,
    utils::{
        assert_address, assert_owned_by, assert_signer, assert_token_program, create_ata_idempotent,
        create_pda_account, debit_lamports, find_factory_address, find_vault_address,
        find_vault_mint_address, load_mint, spendable_lamports, transfer_tokens,
    },
    vault_state::{AssetKind, OwnershipMode, Vault, VaultFactory, VaultOwner},
};

/// Accounts the factory needs to create one vault
pub struct VaultCreation<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub factory: &'a AccountInfo<'info>,
    pub vault: &'a AccountInfo<'info>,
    /// Unused for directly owned vaults
    pub vault_mint: &'a AccountInfo<'info>,
    pub owner: &'a AccountInfo<'info>,
    /// Owner's associated token account for the ownership mint. Unused for directly owned vaults.
    pub owner_token_account: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    pub associated_token_program: &'a AccountInfo<'info>,
}

/// Creates the next vault, minting its ownership token when asked to
pub fn create_vault(
    program_id: &Pubkey,
    accounts: &VaultCreation,
    mode: OwnershipMode,
) -> Result<VaultRef, ProgramError> {
    let (factory_key, factory_bump) = find_factory_address(program_id);
    assert_address(accounts.factory, &factory_key)?;
    assert_owned_by(accounts.factory, program_id)?;
    let mut factory = VaultFactory::unpack(&accounts.factory.data.borrow())?;

    let index = factory.next_index()?;
    let index_bytes = index.to_le_bytes();
    let (vault_key, vault_bump) = find_vault_address(program_id, index);
    assert_address(accounts.vault, &vault_key)?;

    create_pda_account(
        accounts.payer,
        accounts.vault,
        accounts.system_program,
        Vault::LEN,
        program_id,
        &[VAULT_SEED, &index_bytes, &[vault_bump]],
    )?;

    let owner = match mode {
        OwnershipMode::Direct => VaultOwner::Direct(*accounts.owner.key),
        OwnershipMode::Token => {
            mint_ownership_token(program_id, accounts, &vault_key, factory_bump)?;
            VaultOwner::Token { mint: *accounts.vault_mint.key }
        }
    };

    Vault::pack(
        Vault {
            is_initialized: true,
            index,
            owner,
            withdraw_enabled: false,
            bump: vault_bump,
        },
        &mut accounts.vault.data.borrow_mut(),
    )?;
    VaultFactory::pack(factory, &mut accounts.factory.data.borrow_mut())?;

    let ownership_mint = match owner {
        VaultOwner::Token { mint } => Some(mint),
        VaultOwner::Direct(_) => None,
    };
    emit(HubEvent::VaultCreated { index, vault: vault_key, ownership_mint })?;
    msg!("Vault {} created at {}", index, vault_key);

    Ok(VaultRef { index, address: vault_key })
}

/// Fixed supply of one: mint to the owner, then drop the mint authority
fn mint_ownership_token(
    program_id: &Pubkey,
    accounts: &VaultCreation,
    vault_key: &Pubkey,
    factory_bump: u8,
) -> ProgramResult {
    assert_token_program(accounts.token_program)?;
    let (mint_key, mint_bump) = find_vault_mint_address(program_id, vault_key);
    assert_address(accounts.vault_mint, &mint_key)?;

    create_pda_account(
        accounts.payer,
        accounts.vault_mint,
        accounts.system_program,
        spl_token::state::Mint::LEN,
        &spl_token::id(),
        &[VAULT_MINT_SEED, vault_key.as_ref(), &[mint_bump]],
    )?;
    invoke(
        &spl_token::instruction::initialize_mint2(
            accounts.token_program.key,
            &mint_key,
            accounts.factory.key,
            None,
            0,
        )?,
        &[accounts.vault_mint.clone(), accounts.token_program.clone()],
    )?;

    create_ata_idempotent(
        accounts.payer,
        accounts.owner_token_account,
        accounts.owner,
        accounts.vault_mint,
        accounts.system_program,
        accounts.token_program,
        accounts.associated_token_program,
    )?;

    let factory_seeds: &[&[u8]] = &[FACTORY_SEED, &[factory_bump]];
    invoke_signed(
        &spl_token::instruction::mint_to(
            accounts.token_program.key,
            &mint_key,
            accounts.owner_token_account.key,
            accounts.factory.key,
            &[],
            1,
        )?,
        &[
            accounts.vault_mint.clone(),
            accounts.owner_token_account.clone(),
            accounts.factory.clone(),
            accounts.token_program.clone(),
        ],
        &[factory_seeds],
    )?;
    invoke_signed(
        &spl_token::instruction::set_authority(
            accounts.token_program.key,
            &mint_key,
            None,
            AuthorityType::MintTokens,
            accounts.factory.key,
            &[],
        )?,
        &[
            accounts.vault_mint.clone(),
            accounts.factory.clone(),
            accounts.token_program.clone(),
        ],
        &[factory_seeds],
    )
}

/// A loaded vault together with its account. Every privileged path goes through `authorize`.
pub struct VaultGate<'a, 'info> {
    pub info: &'a AccountInfo<'info>,
    pub state: Vault,
}

impl<'a, 'info> VaultGate<'a, 'info> {
    pub fn load(program_id: &Pubkey, info: &'a AccountInfo<'info>) -> Result<Self, ProgramError> {
        assert_owned_by(info, program_id)?;
        let state = Vault::unpack(&info.data.borrow())?;
        let (expected, _) = find_vault_address(program_id, state.index);
        assert_address(info, &expected)?;
        Ok(Self { info, state })
    }

    /// Checks `caller` against the vault owner. `proof` is the caller's ownership token account.
    pub fn authorize(&self, caller: &Pubkey, proof: Option<&AccountInfo>) -> ProgramResult {
        let holder = match proof {
            Some(info) if info.owner == &spl_token::id() => TokenAccount::unpack(&info.data.borrow()).ok(),
            _ => None,
        };
        self.state.authorize(caller, holder.as_ref()).map_err(|e| {
            msg!("{} does not operate vault {}", caller, self.info.key);
            e.into()
        })
    }

    pub fn enable_withdraw(&mut self) -> ProgramResult {
        self.state.enable_withdraw()?;
        self.save()
    }

    pub fn withdraw_native(&self, recipient: &AccountInfo<'info>, amount: u64) -> ProgramResult {
        self.state.assert_withdrawable()?;
        debit_lamports(self.info, recipient, amount)
    }

    pub fn withdraw_tokens(
        &self,
        token_program: &AccountInfo<'info>,
        source: &AccountInfo<'info>,
        destination: &AccountInfo<'info>,
        amount: u64,
    ) -> ProgramResult {
        self.state.assert_withdrawable()?;
        self.assert_holds(source)?;
        let index_bytes = self.state.index.to_le_bytes();
        let seeds: &[&[u8]] = &[VAULT_SEED, &index_bytes, &[self.state.bump]];
        transfer_tokens(token_program, source, destination, self.info, amount, &[seeds])
    }

    /// Fans a payment out of the vault. `token` is the token program and the vault's token account;
    /// without it the vault's lamports are paid out.
    pub fn pay_out(
        &self,
        token: Option<(&AccountInfo<'info>, &AccountInfo<'info>)>,
        recipients: &[AccountInfo<'info>],
        amounts: &[u64],
    ) -> ProgramResult {
        self.state.assert_withdrawable()?;
        if amounts.len() != recipients.len() {
            return Err(HubError::BatchLengthMismatch.into());
        }
        match token {
            None => distributor::distribute_native(NativeSource::Escrow(self.info), recipients, amounts),
            Some((token_program, source)) => {
                self.assert_holds(source)?;
                let index_bytes = self.state.index.to_le_bytes();
                let seeds: &[&[u8]] = &[VAULT_SEED, &index_bytes, &[self.state.bump]];
                distributor::distribute_tokens(token_program, source, self.info, recipients, amounts, &[seeds])
            }
        }
    }

    /// Spendable lamports or the balance of one of the vault's token accounts
    pub fn balance(&self, token_account: Option<&AccountInfo>) -> Result<u64, ProgramError> {
        match token_account {
            None => spendable_lamports(self.info),
            Some(info) => Ok(self.assert_holds(info)?.amount),
        }
    }

    fn assert_holds(&self, token_account: &AccountInfo) -> Result<TokenAccount, ProgramError> {
        assert_owned_by(token_account, &spl_token::id())?;
        let account = TokenAccount::unpack(&token_account.data.borrow())?;
        if account.owner != *self.info.key {
            msg!("Token account {} does not belong to vault {}", token_account.key, self.info.key);
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(account)
    }

    pub fn save(&self) -> ProgramResult {
        Vault::pack(self.state, &mut self.info.data.borrow_mut())
    }
}

pub struct VaultProcessor;

impl VaultProcessor {
    /// Accounts: payer, factory, vault, vault mint, owner, owner token account,
    /// system program, token program, associated token program
    pub fn process_create_vault(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        mode: OwnershipMode,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creation = VaultCreation {
            payer: next_account_info(account_info_iter)?,
            factory: next_account_info(account_info_iter)?,
            vault: next_account_info(account_info_iter)?,
            vault_mint: next_account_info(account_info_iter)?,
            owner: next_account_info(account_info_iter)?,
            owner_token_account: next_account_info(account_info_iter)?,
            system_program: next_account_info(account_info_iter)?,
            token_program: next_account_info(account_info_iter)?,
            associated_token_program: next_account_info(account_info_iter)?,
        };
        assert_signer(creation.payer)?;
        create_vault(program_id, &creation, mode)?;
        Ok(())
    }

    pub fn process_enable_withdraw(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let proof_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        let mut gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, Some(proof_info))?;
        gate.enable_withdraw()?;

        emit(HubEvent::WithdrawEnabled { vault: *vault_info.key, caller: *caller_info.key })?;
        msg!("Withdraws enabled for vault {}", vault_info.key);
        Ok(())
    }

    pub fn process_withdraw_native(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let proof_info = next_account_info(account_info_iter)?;
        let recipient_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        let gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, Some(proof_info))?;
        gate.withdraw_native(recipient_info, amount)?;

        emit(HubEvent::WithdrawNative {
            vault: *vault_info.key,
            recipient: *recipient_info.key,
            amount,
        })?;
        msg!("Withdrew {} lamports from vault {}", amount, vault_info.key);
        Ok(())
    }

    pub fn process_withdraw_token(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let proof_info = next_account_info(account_info_iter)?;
        let source_info = next_account_info(account_info_iter)?;
        let destination_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_token_program(token_program_info)?;
        let gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, Some(proof_info))?;
        let mint = TokenAccount::unpack(&source_info.data.borrow())?.mint;
        gate.withdraw_tokens(token_program_info, source_info, destination_info, amount)?;

        emit(HubEvent::WithdrawToken {
            vault: *vault_info.key,
            mint,
            recipient: *destination_info.key,
            amount,
        })?;
        msg!("Withdrew {} tokens of {} from vault {}", amount, mint, vault_info.key);
        Ok(())
    }

    pub fn process_withdraw_nft(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let proof_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let source_info = next_account_info(account_info_iter)?;
        let destination_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        assert_token_program(token_program_info)?;
        let mint = load_mint(mint_info)?;
        if mint.decimals != 0 || mint.supply != 1 {
            msg!("Mint {} is not a non-fungible token", mint_info.key);
            return Err(HubError::InvalidParameter.into());
        }
        if TokenAccount::unpack(&source_info.data.borrow())?.mint != *mint_info.key {
            return Err(ProgramError::InvalidAccountData);
        }

        let gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, Some(proof_info))?;
        gate.withdraw_tokens(token_program_info, source_info, destination_info, 1)?;

        emit(HubEvent::WithdrawNft {
            vault: *vault_info.key,
            mint: *mint_info.key,
            recipient: *destination_info.key,
        })?;
        msg!("Withdrew token {} from vault {}", mint_info.key, vault_info.key);
        Ok(())
    }

    /// Native: caller, vault, proof, recipients...
    /// Token: caller, vault, proof, token program, vault token account, recipient token accounts...
    pub fn process_batch_amount_withdraw(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        asset: AssetKind,
        amounts: Vec<u64>,
    ) -> ProgramResult {
        Self::batch_withdraw(program_id, accounts, asset, |_| Ok(amounts))
    }

    pub fn process_batch_percentage_withdraw(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        asset: AssetKind,
        percentages: Vec<u8>,
    ) -> ProgramResult {
        Self::batch_withdraw(program_id, accounts, asset, |balance| {
            Ok(distributor::percentage_amounts(balance, &percentages)?)
        })
    }

    fn batch_withdraw<F>(program_id: &Pubkey, accounts: &[AccountInfo], asset: AssetKind, amounts_for: F) -> ProgramResult
    where
        F: FnOnce(u64) -> Result<Vec<u64>, ProgramError>,
    {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let proof_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        let gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, Some(proof_info))?;
        gate.state.assert_withdrawable()?;

        match asset {
            AssetKind::Native => {
                let recipients = account_info_iter.as_slice();
                let amounts = amounts_for(gate.balance(None)?)?;
                gate.pay_out(None, recipients, &amounts)
            }
            AssetKind::Token => {
                let token_program_info = next_account_info(account_info_iter)?;
                let source_info = next_account_info(account_info_iter)?;
                assert_token_program(token_program_info)?;
                let recipients = account_info_iter.as_slice();
                let amounts = amounts_for(gate.balance(Some(source_info))?)?;
                gate.pay_out(Some((token_program_info, source_info)), recipients, &amounts)
            }
        }
    }

    /// Only directly owned vaults; token owned vaults move with their token
    pub fn process_transfer_vault_ownership(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        new_owner: Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info)?;
        let mut gate = VaultGate::load(program_id, vault_info)?;
        gate.authorize(caller_info.key, None)?;
        match gate.state.owner {
            VaultOwner::Direct(_) => {}
            VaultOwner::Token { .. } => return Err(HubError::InvalidParameter.into()),
        }
        if new_owner == Pubkey::default() {
            return Err(HubError::ZeroAddress.into());
        }
        gate.state.owner = VaultOwner::Direct(new_owner);
        gate.save()?;

        emit(HubEvent::VaultOwnershipTransferred { vault: *vault_info.key, new_owner })?;
        msg!("Vault {} now owned by {}", vault_info.key, new_owner);
        Ok(())
    }
}
