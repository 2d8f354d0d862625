use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::{
    constants::{PRICE_SCALE, TOTAL_PCT},
    error::HubError,
    utils::mul_div,
};

/// Roles checked by the hub's access control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Operator,
}

/// Admin supplied part of the configuration, shared by initialize and update
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HubSettings {
    pub operator: Pubkey,
    pub treasury: Pubkey,
    pub raffle_cut: u8,
    pub yolo_raffle_cut: u8,
    pub cancellation_fee: u64,
    pub yolo_duration: i64,
    pub winner_requester: Pubkey,
}

impl HubSettings {
    pub fn validate(&self) -> Result<(), HubError> {
        if self.operator == Pubkey::default()
            || self.treasury == Pubkey::default()
            || self.winner_requester == Pubkey::default()
        {
            return Err(HubError::ZeroAddress);
        }
        if self.yolo_duration <= 0 {
            return Err(HubError::InvalidParameter);
        }
        HubConfig::validate_cuts(self.raffle_cut, self.yolo_raffle_cut)
    }
}

/// Global configuration consumed by every raffle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HubConfig {
    pub is_initialized: bool,
    /// Updates configuration, price feeds and requesters
    pub admin: Pubkey,
    /// Creates yolo raffles and force-recovers stuck raffles
    pub operator: Pubkey,
    /// Receives raffle cuts and cancellation fees
    pub treasury: Pubkey,
    /// Percentage of a traditional raffle's pot taken by the treasury
    pub raffle_cut: u8,
    /// Percentage of a yolo pot taken by the treasury
    pub yolo_raffle_cut: u8,
    /// Lamports a creator pays to cancel
    pub cancellation_fee: u64,
    /// Lifetime of a yolo raffle in seconds
    pub yolo_duration: i64,
    /// Winner-selection requester used at close
    pub winner_requester: Pubkey,
    /// Number of raffles created so far
    pub raffle_count: u64,
    pub bump: u8,
}

impl HubConfig {
    /// Admin may act as operator; the operator may not act as admin
    pub fn can_call(&self, caller: &Pubkey, role: Role) -> bool {
        match role {
            Role::Admin => *caller == self.admin,
            Role::Operator => *caller == self.operator || *caller == self.admin,
        }
    }

    pub fn require(&self, caller: &Pubkey, role: Role) -> Result<(), HubError> {
        if self.can_call(caller, role) {
            Ok(())
        } else {
            Err(HubError::AccessDenied)
        }
    }

    pub fn validate_cuts(raffle_cut: u8, yolo_raffle_cut: u8) -> Result<(), HubError> {
        if raffle_cut > TOTAL_PCT || yolo_raffle_cut > TOTAL_PCT {
            return Err(HubError::InvalidParameter);
        }
        Ok(())
    }

    pub fn apply(&mut self, settings: &HubSettings) -> Result<(), HubError> {
        settings.validate()?;
        self.operator = settings.operator;
        self.treasury = settings.treasury;
        self.raffle_cut = settings.raffle_cut;
        self.yolo_raffle_cut = settings.yolo_raffle_cut;
        self.cancellation_fee = settings.cancellation_fee;
        self.yolo_duration = settings.yolo_duration;
        self.winner_requester = settings.winner_requester;
        Ok(())
    }

    /// Reserves the next raffle id, starting from 1
    pub fn next_raffle_id(&mut self) -> Result<u64, HubError> {
        self.raffle_count = self
            .raffle_count
            .checked_add(1)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(self.raffle_count)
    }
}

impl Sealed for HubConfig {}

impl IsInitialized for HubConfig {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for HubConfig {
    const LEN: usize = 1 + 32 + 32 + 32 + 1 + 1 + 8 + 8 + 32 + 8 + 1;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, HubConfig::LEN];
        let (
            is_initialized,
            admin,
            operator,
            treasury,
            raffle_cut,
            yolo_raffle_cut,
            cancellation_fee,
            yolo_duration,
            winner_requester,
            raffle_count,
            bump,
        ) = array_refs![src, 1, 32, 32, 32, 1, 1, 8, 8, 32, 8, 1];

        Ok(HubConfig {
            is_initialized: is_initialized[0] != 0,
            admin: Pubkey::new_from_array(*admin),
            operator: Pubkey::new_from_array(*operator),
            treasury: Pubkey::new_from_array(*treasury),
            raffle_cut: raffle_cut[0],
            yolo_raffle_cut: yolo_raffle_cut[0],
            cancellation_fee: u64::from_le_bytes(*cancellation_fee),
            yolo_duration: i64::from_le_bytes(*yolo_duration),
            winner_requester: Pubkey::new_from_array(*winner_requester),
            raffle_count: u64::from_le_bytes(*raffle_count),
            bump: bump[0],
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, HubConfig::LEN];
        let (
            is_initialized_dst,
            admin_dst,
            operator_dst,
            treasury_dst,
            raffle_cut_dst,
            yolo_raffle_cut_dst,
            cancellation_fee_dst,
            yolo_duration_dst,
            winner_requester_dst,
            raffle_count_dst,
            bump_dst,
        ) = mut_array_refs![dst, 1, 32, 32, 32, 1, 1, 8, 8, 32, 8, 1];

        is_initialized_dst[0] = self.is_initialized as u8;
        admin_dst.copy_from_slice(self.admin.as_ref());
        operator_dst.copy_from_slice(self.operator.as_ref());
        treasury_dst.copy_from_slice(self.treasury.as_ref());
        raffle_cut_dst[0] = self.raffle_cut;
        yolo_raffle_cut_dst[0] = self.yolo_raffle_cut;
        *cancellation_fee_dst = self.cancellation_fee.to_le_bytes();
        *yolo_duration_dst = self.yolo_duration.to_le_bytes();
        winner_requester_dst.copy_from_slice(self.winner_requester.as_ref());
        *raffle_count_dst = self.raffle_count.to_le_bytes();
        bump_dst[0] = self.bump;
    }
}

/// Admin maintained conversion rate for price-fed tickets.
/// `value` is the price of one whole token in ticket-price units, scaled by 1e18.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFeed {
    pub is_initialized: bool,
    pub mint: Pubkey,
    pub value: u128,
    pub updated_at: UnixTimestamp,
    pub bump: u8,
}

impl PriceFeed {
    /// Token amount owed for `tickets` tickets of `ticket_price` each
    pub fn ticket_cost(&self, ticket_price: u64, tickets: u64) -> Result<u64, HubError> {
        if self.value == 0 {
            return Err(HubError::InvalidPriceFeed);
        }
        let per_ticket = mul_div(ticket_price as u128, PRICE_SCALE, self.value)?;
        per_ticket
            .checked_mul(tickets)
            .ok_or(HubError::ArithmeticOverflow)
    }
}

impl Sealed for PriceFeed {}

impl IsInitialized for PriceFeed {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for PriceFeed {
    const LEN: usize = 1 + 32 + 16 + 8 + 1;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, PriceFeed::LEN];
        let (is_initialized, mint, value, updated_at, bump) = array_refs![src, 1, 32, 16, 8, 1];
        Ok(PriceFeed {
            is_initialized: is_initialized[0] != 0,
            mint: Pubkey::new_from_array(*mint),
            value: u128::from_le_bytes(*value),
            updated_at: UnixTimestamp::from_le_bytes(*updated_at),
            bump: bump[0],
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, PriceFeed::LEN];
        let (is_initialized_dst, mint_dst, value_dst, updated_at_dst, bump_dst) =
            mut_array_refs![dst, 1, 32, 16, 8, 1];
        is_initialized_dst[0] = self.is_initialized as u8;
        mint_dst.copy_from_slice(self.mint.as_ref());
        *value_dst = self.value.to_le_bytes();
        *updated_at_dst = self.updated_at.to_le_bytes();
        bump_dst[0] = self.bump;
    }
}
