use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};
use spl_token::state::Account as TokenAccount;

use crate::{
    error::HubError,
    utils::{find_vault_address, find_vault_mint_address},
};

/// Who may operate a vault
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaultOwner {
    /// A fixed address
    Direct(Pubkey),
    /// Whoever holds the single ownership token of this mint
    Token { mint: Pubkey },
}

impl VaultOwner {
    /// Resolves the current operator. Token ownership needs the account holding the token.
    pub fn resolve(&self, holder: Option<&TokenAccount>) -> Option<Pubkey> {
        match self {
            VaultOwner::Direct(owner) => Some(*owner),
            VaultOwner::Token { mint } => holder
                .filter(|account| account.mint == *mint && account.amount == 1)
                .map(|account| account.owner),
        }
    }
}

/// How a new vault's ownership is recorded
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnershipMode {
    Direct,
    /// Mint a single ownership token to the owner
    Token,
}

/// Asset class a batch withdraw pays out in
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Native,
    Token,
}

/// Escrow account state. Balances live in the account's lamports and its token accounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vault {
    pub is_initialized: bool,
    pub index: u64,
    pub owner: VaultOwner,
    /// Monotonic: once true it is never reset
    pub withdraw_enabled: bool,
    pub bump: u8,
}

impl Vault {
    /// The single authorization gate of the vault
    pub fn authorize(&self, caller: &Pubkey, proof: Option<&TokenAccount>) -> Result<(), HubError> {
        match self.owner {
            VaultOwner::Direct(owner) if owner == *caller => Ok(()),
            VaultOwner::Token { .. } if self.owner.resolve(proof) == Some(*caller) => Ok(()),
            _ => Err(HubError::CallerNotOwner),
        }
    }

    pub fn enable_withdraw(&mut self) -> Result<(), HubError> {
        if self.withdraw_enabled {
            return Err(HubError::VaultWithdrawsEnabled);
        }
        self.withdraw_enabled = true;
        Ok(())
    }

    pub fn assert_withdrawable(&self) -> Result<(), HubError> {
        if !self.withdraw_enabled {
            return Err(HubError::WithdrawsDisabled);
        }
        Ok(())
    }
}

impl Sealed for Vault {}

impl IsInitialized for Vault {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Vault {
    const LEN: usize = 1 + 8 + 1 + 32 + 1 + 1;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Vault::LEN];
        let (is_initialized, index, owner_tag, owner_key, withdraw_enabled, bump) =
            array_refs![src, 1, 8, 1, 32, 1, 1];

        let key = Pubkey::new_from_array(*owner_key);
        let owner = match owner_tag[0] {
            0 => VaultOwner::Direct(key),
            1 => VaultOwner::Token { mint: key },
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(Vault {
            is_initialized: is_initialized[0] != 0,
            index: u64::from_le_bytes(*index),
            owner,
            withdraw_enabled: withdraw_enabled[0] != 0,
            bump: bump[0],
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Vault::LEN];
        let (is_initialized_dst, index_dst, owner_tag_dst, owner_key_dst, withdraw_enabled_dst, bump_dst) =
            mut_array_refs![dst, 1, 8, 1, 32, 1, 1];

        is_initialized_dst[0] = self.is_initialized as u8;
        *index_dst = self.index.to_le_bytes();
        let (tag, key) = match self.owner {
            VaultOwner::Direct(owner) => (0u8, owner),
            VaultOwner::Token { mint } => (1u8, mint),
        };
        owner_tag_dst[0] = tag;
        owner_key_dst.copy_from_slice(key.as_ref());
        withdraw_enabled_dst[0] = self.withdraw_enabled as u8;
        bump_dst[0] = self.bump;
    }
}

/// Singleton counter handing out vault indexes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VaultFactory {
    pub is_initialized: bool,
    pub vault_count: u64,
    pub bump: u8,
}

impl VaultFactory {
    pub fn instance_at_index(program_id: &Pubkey, index: u64) -> Pubkey {
        find_vault_address(program_id, index).0
    }

    /// Vault ids are their factory index
    pub fn instance_at(program_id: &Pubkey, id: u64) -> Pubkey {
        Self::instance_at_index(program_id, id)
    }

    pub fn ownership_mint_of(program_id: &Pubkey, vault: &Pubkey) -> Pubkey {
        find_vault_mint_address(program_id, vault).0
    }

    /// Current operator of a vault, given the token account that holds its ownership token
    pub fn owner_of(vault: &Vault, holder: Option<&TokenAccount>) -> Option<Pubkey> {
        vault.owner.resolve(holder)
    }

    /// Number of vault ownership tokens `owner` holds among `holdings`
    pub fn balance_of(owner: &Pubkey, holdings: &[TokenAccount], vault_mints: &[Pubkey]) -> u64 {
        holdings
            .iter()
            .filter(|account| {
                account.owner == *owner && account.amount == 1 && vault_mints.contains(&account.mint)
            })
            .count() as u64
    }

    pub fn next_index(&mut self) -> Result<u64, HubError> {
        let index = self.vault_count;
        self.vault_count = index.checked_add(1).ok_or(HubError::ArithmeticOverflow)?;
        Ok(index)
    }
}

impl Sealed for VaultFactory {}

impl IsInitialized for VaultFactory {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for VaultFactory {
    const LEN: usize = 1 + 8 + 1;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, VaultFactory::LEN];
        let (is_initialized, vault_count, bump) = array_refs![src, 1, 8, 1];
        Ok(VaultFactory {
            is_initialized: is_initialized[0] != 0,
            vault_count: u64::from_le_bytes(*vault_count),
            bump: bump[0],
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, VaultFactory::LEN];
        let (is_initialized_dst, vault_count_dst, bump_dst) = mut_array_refs![dst, 1, 8, 1];
        is_initialized_dst[0] = self.is_initialized as u8;
        *vault_count_dst = self.vault_count.to_le_bytes();
        bump_dst[0] = self.bump;
    }
}
