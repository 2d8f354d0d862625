use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::{
    constants::{
        MAX_BENEFICIARIES, MAX_PARTICIPANT_SLOTS, MAX_PRIZES, MAX_WINNERS, TOTAL_PCT,
    },
    error::HubError,
    utils::calculate_share,
};

/// Status of a raffle. Only moves forward, except for the exits into `Canceled`.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleStatus {
    /// Created, prizes not deposited yet
    Uninitialized,
    Canceled,
    /// Accepting entries
    Open,
    /// Waiting for the winner request to be fulfilled
    Close,
    Finish,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleType {
    Traditional,
    /// Pot raffle: the pooled tickets become the prize
    Yolo,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelationReason {
    ForcedCancelation,
    CreatorDecision,
}

/// What tickets are paid with
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketToken {
    /// Lamports
    Native,
    /// An SPL token, `ticket_price` is in base units of the mint
    Fungible { mint: Pubkey },
    /// An SPL token, `ticket_price` is converted through the price feed at entry time
    PriceFed { mint: Pubkey, feed: Pubkey },
}

impl TicketToken {
    pub const LEN: usize = 1 + 32 + 32;

    pub fn mint(&self) -> Option<Pubkey> {
        match self {
            TicketToken::Native => None,
            TicketToken::Fungible { mint } | TicketToken::PriceFed { mint, .. } => Some(*mint),
        }
    }
}

/// Multihash digest of the off-chain raffle description
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub hash_function: u8,
    pub size: u8,
    pub digest: [u8; 32],
}

impl Metadata {
    pub const LEN: usize = 1 + 1 + 32;
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrizeItem {
    pub mint: Pubkey,
    pub amount: u64,
    /// Paid out to its winner, or back to the creator after a cancel
    pub claimed: bool,
}

impl PrizeItem {
    pub const LEN: usize = 32 + 8 + 1;

    pub fn new(mint: Pubkey, amount: u64) -> Self {
        Self { mint, amount, claimed: false }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beneficiary {
    pub address: Pubkey,
    pub share: u8,
}

impl Beneficiary {
    pub const LEN: usize = 32 + 1;
}

/// One `enter` call. The same participant may own several slots.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantSlot {
    pub participant: Pubkey,
    pub tickets: u64,
}

impl ParticipantSlot {
    pub const LEN: usize = 32 + 8;
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultRef {
    pub index: u64,
    pub address: Pubkey,
}

impl VaultRef {
    pub const LEN: usize = 8 + 32;
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestRef {
    pub request_id: [u8; 32],
    pub address: Pubkey,
}

/// Creation parameters, fixed once the raffle exists except for `winner_number` and `metadata`
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleParams {
    pub start_time: UnixTimestamp,
    pub expected_end_time: UnixTimestamp,
    pub ticket_price: u64,
    /// Minimum pot needed to close; below it the raffle can only be canceled and refunded
    pub required_balance: u64,
    pub metadata: Metadata,
    pub ticket_token: TicketToken,
    pub winner_number: u8,
}

impl RaffleParams {
    pub const LEN: usize = 8 + 8 + 8 + 8 + Metadata::LEN + TicketToken::LEN + 1;

    pub fn validate(&self) -> Result<(), HubError> {
        if self.expected_end_time <= self.start_time || self.ticket_price == 0 {
            return Err(HubError::InvalidParameter);
        }
        validate_winner_number(self.winner_number)
    }
}

fn validate_winner_number(winner_number: u8) -> Result<(), HubError> {
    if winner_number == 0 || winner_number as usize > MAX_WINNERS {
        return Err(HubError::InvalidWinnerNumber);
    }
    Ok(())
}

/// How the tickets pot is split at finish
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub treasury_amount: u64,
    pub available_amount: u64,
    /// Same order as the raffle's beneficiaries
    pub beneficiary_amounts: Vec<u64>,
    /// Whatever the beneficiaries leave, rounding dust included
    pub creator_amount: u64,
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Raffle {
    pub is_initialized: bool,
    pub raffle_id: u64,
    pub raffle_type: RaffleType,
    pub creator: Pubkey,
    pub bump: u8,
    pub params: RaffleParams,
    pub status: RaffleStatus,
    pub cancelation: Option<CancelationReason>,
    /// For yolo raffles this is the pot vault
    pub prizes_vault: Option<VaultRef>,
    pub tickets_vault: Option<VaultRef>,
    pub prizes: Vec<PrizeItem>,
    pub participants: Vec<ParticipantSlot>,
    pub total_participants: u64,
    pub total_entries: u64,
    pub total_collected: u64,
    pub beneficiaries: Vec<Beneficiary>,
    pub winners: Vec<Pubkey>,
    pub winner_indexes: Vec<u64>,
    pub request: Option<RequestRef>,
}

impl Raffle {
    pub const LEN: usize = 1
        + 8
        + 1
        + 32
        + 1
        + RaffleParams::LEN
        + 1
        + (1 + 1)
        + 2 * (1 + VaultRef::LEN)
        + (4 + MAX_PRIZES * PrizeItem::LEN)
        + (4 + MAX_PARTICIPANT_SLOTS * ParticipantSlot::LEN)
        + 8
        + 8
        + 8
        + (4 + MAX_BENEFICIARIES * Beneficiary::LEN)
        + (4 + MAX_WINNERS * 32)
        + (4 + MAX_WINNERS * 8)
        + (1 + 32 + 32);

    pub fn new(
        raffle_id: u64,
        raffle_type: RaffleType,
        creator: Pubkey,
        params: RaffleParams,
        bump: u8,
    ) -> Result<Self, HubError> {
        params.validate()?;
        Ok(Self {
            is_initialized: true,
            raffle_id,
            raffle_type,
            creator,
            bump,
            params,
            status: RaffleStatus::Uninitialized,
            cancelation: None,
            prizes_vault: None,
            tickets_vault: None,
            prizes: Vec::new(),
            participants: Vec::new(),
            total_participants: 0,
            total_entries: 0,
            total_collected: 0,
            beneficiaries: Vec::new(),
            winners: Vec::new(),
            winner_indexes: Vec::new(),
            request: None,
        })
    }

    /// A yolo raffle opens at creation with its pot vault ownership token as the only prize
    pub fn new_yolo(
        raffle_id: u64,
        creator: Pubkey,
        params: RaffleParams,
        pot_vault: VaultRef,
        pot_ownership_mint: Pubkey,
        tickets_vault: VaultRef,
        bump: u8,
    ) -> Result<Self, HubError> {
        let mut raffle = Self::new(raffle_id, RaffleType::Yolo, creator, params, bump)?;
        if raffle.params.winner_number != 1 {
            return Err(HubError::InvalidWinnerNumber);
        }
        raffle.prizes = vec![PrizeItem::new(pot_ownership_mint, 1)];
        raffle.prizes_vault = Some(pot_vault);
        raffle.tickets_vault = Some(tickets_vault);
        raffle.status = RaffleStatus::Open;
        Ok(raffle)
    }

    pub fn assert_creator(&self, caller: &Pubkey) -> Result<(), HubError> {
        if self.creator != *caller {
            return Err(HubError::CallerNotCreator);
        }
        Ok(())
    }

    fn assert_status(&self, allowed: &[RaffleStatus]) -> Result<(), HubError> {
        if !allowed.contains(&self.status) {
            return Err(HubError::WrongRaffleStatus);
        }
        Ok(())
    }

    pub fn update_winners(&mut self, winner_number: u8) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized])?;
        if self.raffle_type == RaffleType::Yolo {
            return Err(HubError::InvalidParameter);
        }
        validate_winner_number(winner_number)?;
        self.params.winner_number = winner_number;
        Ok(())
    }

    pub fn update_metadata(&mut self, metadata: Metadata) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized, RaffleStatus::Open])?;
        self.params.metadata = metadata;
        Ok(())
    }

    pub fn beneficiary_total(&self) -> u32 {
        self.beneficiaries.iter().map(|b| b.share as u32).sum()
    }

    /// Adds new beneficiaries. All checks run before anything is recorded.
    pub fn set_beneficiaries(&mut self, addresses: &[Pubkey], shares: &[u8]) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized, RaffleStatus::Open])?;
        if self.raffle_type == RaffleType::Yolo {
            return Err(HubError::InvalidParameter);
        }
        if addresses.len() != shares.len() || addresses.is_empty() {
            return Err(HubError::BatchLengthMismatch);
        }

        let mut added: Vec<Beneficiary> = Vec::with_capacity(addresses.len());
        for (address, share) in addresses.iter().zip(shares) {
            if *address == Pubkey::default() {
                return Err(HubError::ZeroAddress);
            }
            if *share == 0 {
                return Err(HubError::InvalidParameter);
            }
            let known = self
                .beneficiaries
                .iter()
                .chain(added.iter())
                .any(|b| b.address == *address);
            if known {
                return Err(HubError::ParameterAlreadySet);
            }
            added.push(Beneficiary { address: *address, share: *share });
        }

        if self.beneficiaries.len() + added.len() > MAX_BENEFICIARIES {
            return Err(HubError::InvalidParameter);
        }
        let total = self.beneficiary_total() + added.iter().map(|b| b.share as u32).sum::<u32>();
        if total > TOTAL_PCT as u32 {
            return Err(HubError::InvalidParameter);
        }

        self.beneficiaries.extend(added);
        Ok(())
    }

    /// Changes the share of an existing beneficiary, returning the previous share
    pub fn update_beneficiary(&mut self, address: &Pubkey, share: u8) -> Result<u8, HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized, RaffleStatus::Open])?;
        if *address == Pubkey::default() {
            return Err(HubError::ZeroAddress);
        }
        if share == 0 {
            return Err(HubError::InvalidParameter);
        }
        let position = self
            .beneficiaries
            .iter()
            .position(|b| b.address == *address)
            .ok_or(HubError::ParameterNotSet)?;
        let old_share = self.beneficiaries[position].share;
        let total = self.beneficiary_total() - old_share as u32 + share as u32;
        if total > TOTAL_PCT as u32 {
            return Err(HubError::InvalidParameter);
        }
        self.beneficiaries[position].share = share;
        Ok(old_share)
    }

    pub fn validate_open(&self, now: UnixTimestamp, prize_count: usize) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized])?;
        if now < self.params.start_time {
            return Err(HubError::RaffleNotStarted);
        }
        if prize_count == 0
            || prize_count > MAX_PRIZES
            || prize_count < self.params.winner_number as usize
        {
            return Err(HubError::InvalidParameter);
        }
        Ok(())
    }

    pub fn open(
        &mut self,
        now: UnixTimestamp,
        prizes: Vec<PrizeItem>,
        prizes_vault: VaultRef,
        tickets_vault: VaultRef,
    ) -> Result<(), HubError> {
        self.validate_open(now, prizes.len())?;
        if prizes.iter().any(|prize| prize.amount == 0) {
            return Err(HubError::InvalidParameter);
        }
        self.prizes = prizes;
        self.prizes_vault = Some(prizes_vault);
        self.tickets_vault = Some(tickets_vault);
        self.status = RaffleStatus::Open;
        Ok(())
    }

    pub fn validate_entry(&self, now: UnixTimestamp, tickets: u64) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Open])?;
        if now >= self.params.expected_end_time {
            return Err(HubError::RaffleEnded);
        }
        if tickets == 0 {
            return Err(HubError::InvalidParameter);
        }
        if self.participants.len() >= MAX_PARTICIPANT_SLOTS {
            return Err(HubError::RaffleFull);
        }
        Ok(())
    }

    /// Cost of `tickets` at the fixed price. Price-fed raffles convert through their feed instead.
    pub fn fixed_cost(&self, tickets: u64) -> Result<u64, HubError> {
        self.params
            .ticket_price
            .checked_mul(tickets)
            .ok_or(HubError::ArithmeticOverflow)
    }

    pub fn record_entry(
        &mut self,
        now: UnixTimestamp,
        participant: Pubkey,
        tickets: u64,
        paid: u64,
    ) -> Result<(), HubError> {
        self.validate_entry(now, tickets)?;
        let total_entries = self
            .total_entries
            .checked_add(tickets)
            .ok_or(HubError::ArithmeticOverflow)?;
        let total_collected = self
            .total_collected
            .checked_add(paid)
            .ok_or(HubError::ArithmeticOverflow)?;
        self.participants.push(ParticipantSlot { participant, tickets });
        self.total_participants = self.participants.len() as u64;
        self.total_entries = total_entries;
        self.total_collected = total_collected;
        Ok(())
    }

    pub fn validate_close(&self, now: UnixTimestamp, pot: u64) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Open])?;
        if now < self.params.expected_end_time {
            return Err(HubError::RaffleNotEnded);
        }
        if pot < self.params.required_balance {
            return Err(HubError::RequiredBalanceNotMet);
        }
        Ok(())
    }

    pub fn mark_closed(&mut self, request: RequestRef) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Open])?;
        self.request = Some(request);
        self.status = RaffleStatus::Close;
        Ok(())
    }

    /// Maps ticket indexes onto participants. Every ticket is one equally likely index.
    pub fn winners_for(&self, indexes: &[u64]) -> Result<Vec<Pubkey>, HubError> {
        indexes
            .iter()
            .map(|index| {
                let mut covered = 0u64;
                for slot in self.participants.iter() {
                    covered = covered.checked_add(slot.tickets).ok_or(HubError::ArithmeticOverflow)?;
                    if *index < covered {
                        return Ok(slot.participant);
                    }
                }
                Err(HubError::InvalidParameter)
            })
            .collect()
    }

    /// Prize `i` goes round-robin over the winners
    pub fn prize_recipient(prize_index: usize, winners: &[Pubkey]) -> Option<Pubkey> {
        if winners.is_empty() {
            return None;
        }
        Some(winners[prize_index % winners.len()])
    }

    pub fn settlement(&self, balance: u64, cut: u8) -> Result<Settlement, HubError> {
        let treasury_amount = calculate_share(balance, cut)?;
        let available_amount = balance
            .checked_sub(treasury_amount)
            .ok_or(HubError::ArithmeticOverflow)?;
        let beneficiary_amounts = self
            .beneficiaries
            .iter()
            .map(|b| calculate_share(available_amount, b.share))
            .collect::<Result<Vec<u64>, HubError>>()?;
        let paid_out: u64 = beneficiary_amounts.iter().sum();
        let creator_amount = available_amount
            .checked_sub(paid_out)
            .ok_or(HubError::ArithmeticOverflow)?;
        Ok(Settlement {
            treasury_amount,
            available_amount,
            beneficiary_amounts,
            creator_amount,
        })
    }

    pub fn finish(&mut self, winner_indexes: Vec<u64>, winners: Vec<Pubkey>) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Close])?;
        self.winner_indexes = winner_indexes;
        self.winners = winners;
        self.status = RaffleStatus::Finish;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), HubError> {
        self.assert_status(&[RaffleStatus::Uninitialized, RaffleStatus::Open])?;
        self.status = RaffleStatus::Canceled;
        self.cancelation = Some(CancelationReason::CreatorDecision);
        Ok(())
    }

    /// Marks prize `prize_index` paid and returns it with its recipient:
    /// the drawn winner once finished, the creator once the creator canceled
    pub fn claim_prize(&mut self, prize_index: usize) -> Result<(PrizeItem, Pubkey), HubError> {
        if self.raffle_type != RaffleType::Traditional {
            return Err(HubError::WrongRaffleStatus);
        }
        let recipient = match (self.status, self.cancelation) {
            (RaffleStatus::Finish, _) => {
                Self::prize_recipient(prize_index, &self.winners).ok_or(HubError::InvalidParameter)?
            }
            (RaffleStatus::Canceled, Some(CancelationReason::CreatorDecision)) => self.creator,
            _ => return Err(HubError::WrongRaffleStatus),
        };
        let prize = self.prizes.get_mut(prize_index).ok_or(HubError::InvalidParameter)?;
        if prize.claimed {
            return Err(HubError::NothingToClaim);
        }
        prize.claimed = true;
        Ok((*prize, recipient))
    }

    /// Entries are refunded one by one after the creator canceled an open raffle
    pub fn assert_refundable(&self) -> Result<(), HubError> {
        if self.status != RaffleStatus::Canceled
            || self.cancelation != Some(CancelationReason::CreatorDecision)
            || self.tickets_vault.is_none()
        {
            return Err(HubError::WrongRaffleStatus);
        }
        Ok(())
    }

    /// Emergency exit, also for raffles stuck waiting on the provider
    pub fn force_recover(&mut self) -> Result<(), HubError> {
        self.assert_status(&[
            RaffleStatus::Uninitialized,
            RaffleStatus::Open,
            RaffleStatus::Close,
        ])?;
        self.status = RaffleStatus::Canceled;
        self.cancelation = Some(CancelationReason::ForcedCancelation);
        Ok(())
    }
}

/// Per-participant tally of one raffle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub is_initialized: bool,
    pub raffle: Pubkey,
    pub participant: Pubkey,
    pub entries: u64,
    /// Amount paid in the ticket token, zeroed once refunded
    pub paid: u64,
    pub bump: u8,
}

impl Entry {
    pub fn add(&mut self, tickets: u64, paid: u64) -> Result<(), HubError> {
        self.entries = self.entries.checked_add(tickets).ok_or(HubError::ArithmeticOverflow)?;
        self.paid = self.paid.checked_add(paid).ok_or(HubError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Takes the refundable amount out of the entry
    pub fn take_refund(&mut self) -> Result<u64, HubError> {
        match std::mem::take(&mut self.paid) {
            0 => Err(HubError::NothingToClaim),
            paid => Ok(paid),
        }
    }
}

impl Sealed for Entry {}

impl IsInitialized for Entry {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Entry {
    const LEN: usize = 1 + 32 + 32 + 8 + 8 + 1;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Entry::LEN];
        let (is_initialized, raffle, participant, entries, paid, bump) =
            array_refs![src, 1, 32, 32, 8, 8, 1];
        Ok(Entry {
            is_initialized: is_initialized[0] != 0,
            raffle: Pubkey::new_from_array(*raffle),
            participant: Pubkey::new_from_array(*participant),
            entries: u64::from_le_bytes(*entries),
            paid: u64::from_le_bytes(*paid),
            bump: bump[0],
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Entry::LEN];
        let (is_initialized_dst, raffle_dst, participant_dst, entries_dst, paid_dst, bump_dst) =
            mut_array_refs![dst, 1, 32, 32, 8, 8, 1];
        is_initialized_dst[0] = self.is_initialized as u8;
        raffle_dst.copy_from_slice(self.raffle.as_ref());
        participant_dst.copy_from_slice(self.participant.as_ref());
        *entries_dst = self.entries.to_le_bytes();
        *paid_dst = self.paid.to_le_bytes();
        bump_dst[0] = self.bump;
    }
}
