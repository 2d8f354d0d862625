use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::get_associated_token_address;

use crate::{
    error::HubError,
    hub_state::HubSettings,
    raffle_state::{Metadata, Raffle, RaffleParams, RaffleStatus, RaffleType, TicketToken},
    requester_state::{RequestParameters, RequesterKind},
    utils::{
        find_entry_address, find_factory_address, find_hub_address, find_price_feed_address,
        find_raffle_address, find_request_address, find_requester_address, find_vault_address,
        find_vault_mint_address,
    },
    vault_state::{AssetKind, OwnershipMode},
};

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum HubInstruction {
    /// Create the hub configuration and the vault factory
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Admin, pays for both accounts
    /// 1. `[writable]` Hub config PDA
    /// 2. `[writable]` Vault factory PDA
    /// 3. `[]` System program
    InitializeHub { settings: HubSettings },

    /// Accounts expected:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Hub config PDA
    UpdateHubConfig { settings: HubSettings },

    /// Create or update the price feed of a mint
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Admin
    /// 1. `[]` Hub config PDA
    /// 2. `[]` Mint
    /// 3. `[writable]` Price feed PDA
    /// 4. `[]` System program
    SetPriceFeed { value: u128 },

    /// Accounts expected:
    /// 0. `[signer, writable]` Payer
    /// 1. `[writable]` Vault factory PDA
    /// 2. `[writable]` Vault PDA at the factory's next index
    /// 3. `[writable]` Ownership mint PDA
    /// 4. `[]` Owner
    /// 5. `[writable]` Owner's associated token account for the ownership mint
    /// 6. `[]` System program
    /// 7. `[]` Token program
    /// 8. `[]` Associated token program
    CreateVault { mode: OwnershipMode },

    /// Accounts expected:
    /// 0. `[signer]` Vault owner
    /// 1. `[writable]` Vault
    /// 2. `[]` Owner's ownership token account, any account for directly owned vaults
    EnableWithdraw,

    /// Accounts expected:
    /// 0-2. As `EnableWithdraw`
    /// 3. `[writable]` Recipient
    WithdrawNative { amount: u64 },

    /// Accounts expected:
    /// 0-2. As `EnableWithdraw`
    /// 3. `[writable]` Vault token account
    /// 4. `[writable]` Recipient token account
    /// 5. `[]` Token program
    WithdrawToken { amount: u64 },

    /// Accounts expected:
    /// 0-2. As `EnableWithdraw`
    /// 3. `[]` Mint
    /// 4. `[writable]` Vault token account
    /// 5. `[writable]` Recipient token account
    /// 6. `[]` Token program
    WithdrawNft,

    /// Accounts expected:
    /// 0-2. As `EnableWithdraw`
    /// Native: 3.. `[writable]` Recipients
    /// Token: 3. `[]` Token program, 4. `[writable]` Vault token account, 5.. `[writable]` Recipient token accounts
    BatchAmountWithdraw { asset: AssetKind, amounts: Vec<u64> },

    /// Same accounts as `BatchAmountWithdraw`
    BatchPercentageWithdraw { asset: AssetKind, percentages: Vec<u8> },

    /// Accounts expected:
    /// 0. `[signer]` Current owner
    /// 1. `[writable]` Vault
    TransferVaultOwnership { new_owner: Pubkey },

    /// Accounts expected:
    /// 0. `[signer, writable]` Payer
    /// 1. `[]` System program
    /// 2.. `[writable]` Recipients
    DistributeNative { amounts: Vec<u64> },

    /// Accounts expected:
    /// 0. `[signer]` Source authority
    /// 1. `[]` Token program
    /// 2. `[writable]` Source token account
    /// 3.. `[writable]` Recipient token accounts
    DistributeTokens { amounts: Vec<u64> },

    /// Accounts expected:
    /// 0. `[signer, writable]` Hub admin, becomes the requester admin
    /// 1. `[]` Hub config PDA
    /// 2. `[writable]` Requester PDA
    /// 3. `[]` System program
    InitializeRequester { kind: RequesterKind },

    /// Accounts expected:
    /// 0. `[signer]` Requester admin
    /// 1. `[writable]` Requester PDA
    SetRequestParameters { parameters: RequestParameters },

    /// Same accounts as `SetRequestParameters`
    AddNewEndpoint { endpoint_id: [u8; 32], signature: String },

    /// Accounts expected:
    /// 0. `[signer, writable]` Consumer, pays for the request record
    /// 1. `[writable]` Winner-selection requester PDA
    /// 2. `[writable]` Request PDA at the requester's next index
    /// 3. `[]` System program
    RequestWinners { selector: [u8; 4], total_winners: u64, total_entries: u64 },

    /// Same accounts as `RequestWinners`, against the number-picker requester
    RequestNumbers { selector: [u8; 4], cap: u64, count: u64 },

    /// Accounts expected:
    /// 0. `[signer]` Sponsor wallet
    /// 1. `[]` Requester PDA
    /// 2. `[writable]` Request PDA
    FulfillRequest { request_id: [u8; 32], selector: [u8; 4], data: Vec<u8> },

    /// Accounts expected:
    /// 0. `[signer]` Consumer
    /// 1. `[writable]` Request PDA
    RequestResults { request_id: [u8; 32] },

    /// Accounts expected:
    /// 0. `[signer, writable]` Creator
    /// 1. `[writable]` Hub config PDA
    /// 2. `[writable]` Raffle PDA for the next raffle id
    /// 3. `[]` System program
    CreateRaffle { params: RaffleParams },

    /// See `HubProcessor::process_create_yolo_raffle` for the accounts
    CreateYoloRaffle {
        ticket_price: u64,
        ticket_token: TicketToken,
        required_balance: u64,
        metadata: Metadata,
    },

    /// Accounts expected:
    /// 0. `[signer]` Creator
    /// 1. `[writable]` Raffle
    UpdateWinners { winner_number: u8 },

    /// Same accounts as `UpdateWinners`
    UpdateMetadata { metadata: Metadata },

    /// Same accounts as `UpdateWinners`
    SetBeneficiaries { beneficiaries: Vec<Pubkey>, shares: Vec<u8> },

    /// Same accounts as `UpdateWinners`
    UpdateBeneficiary { beneficiary: Pubkey, share: u8 },

    /// See `RaffleProcessor::process_open_raffle` for the accounts
    OpenRaffle { prize_amounts: Vec<u64> },

    /// See `RaffleProcessor::process_enter_raffle` for the accounts
    EnterRaffle { participant: Pubkey, ticket_count: u64 },

    /// See `RaffleProcessor::process_close_raffle` for the accounts
    CloseRaffle,

    /// See `RaffleProcessor::process_finish_raffle` for the accounts
    FinishRaffle,

    /// See `RaffleProcessor::process_cancel_raffle` for the accounts
    CancelRaffle,

    /// See `RaffleProcessor::process_force_recover` for the accounts
    ForceRecover,

    /// Pays one prize out of the prizes vault: to its winner after finish,
    /// back to the creator after a cancel
    ///
    /// Accounts expected:
    /// 0. `[signer]` Anyone
    /// 1. `[writable]` Raffle
    /// 2. `[]` Prizes vault
    /// 3. `[]` Raffle's ownership token account for the prizes vault
    /// 4. `[writable]` Prizes vault token account for the prize mint
    /// 5. `[writable]` Recipient token account for the prize mint
    /// 6. `[]` Token program
    ClaimPrize { prize_index: u8 },

    /// Refunds one participant of a canceled raffle
    ///
    /// Accounts expected:
    /// 0. `[signer]` Anyone
    /// 1. `[]` Raffle
    /// 2. `[writable]` Participant entry
    /// 3. `[writable]` Tickets vault
    /// 4. `[]` Raffle's ownership token account for the tickets vault
    /// 5. `[]` Token program
    /// 6. `[writable]` Tickets vault token account, token tickets only
    /// 7. `[writable]` Participant wallet, or its token account for token tickets
    ClaimRefund,
}

impl HubInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| HubError::InvalidInstructionData.into())
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        Ok(self.try_to_vec()?)
    }
}

fn build(program_id: &Pubkey, accounts: Vec<AccountMeta>, data: HubInstruction) -> Result<Instruction, ProgramError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: data.pack()?,
    })
}

/// Where a payout in `ticket_token` to `owner` goes
fn payee(ticket_token: &TicketToken, owner: &Pubkey) -> Pubkey {
    match ticket_token.mint() {
        None => *owner,
        Some(mint) => get_associated_token_address(owner, &mint),
    }
}

/// Vault, ownership mint and the holder's ownership token account for a factory index
pub fn vault_accounts(program_id: &Pubkey, index: u64, holder: &Pubkey) -> (Pubkey, Pubkey, Pubkey) {
    let (vault, _) = find_vault_address(program_id, index);
    let (mint, _) = find_vault_mint_address(program_id, &vault);
    (vault, mint, get_associated_token_address(holder, &mint))
}

/// The holder's ownership token account for a vault
pub fn ownership_account(program_id: &Pubkey, vault: &Pubkey, holder: &Pubkey) -> Pubkey {
    let (mint, _) = find_vault_mint_address(program_id, vault);
    get_associated_token_address(holder, &mint)
}

pub fn initialize_hub(program_id: &Pubkey, admin: &Pubkey, settings: HubSettings) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(find_hub_address(program_id).0, false),
        AccountMeta::new(find_factory_address(program_id).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build(program_id, accounts, HubInstruction::InitializeHub { settings })
}

pub fn update_hub_config(program_id: &Pubkey, admin: &Pubkey, settings: HubSettings) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*admin, true),
        AccountMeta::new(find_hub_address(program_id).0, false),
    ];
    build(program_id, accounts, HubInstruction::UpdateHubConfig { settings })
}

pub fn set_price_feed(program_id: &Pubkey, admin: &Pubkey, mint: &Pubkey, value: u128) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(find_price_feed_address(program_id, mint).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build(program_id, accounts, HubInstruction::SetPriceFeed { value })
}

/// `index` is the factory's current vault count
pub fn create_vault(
    program_id: &Pubkey,
    payer: &Pubkey,
    owner: &Pubkey,
    index: u64,
    mode: OwnershipMode,
) -> Result<Instruction, ProgramError> {
    let (vault, mint, owner_token_account) = vault_accounts(program_id, index, owner);
    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(find_factory_address(program_id).0, false),
        AccountMeta::new(vault, false),
        AccountMeta::new(mint, false),
        AccountMeta::new_readonly(*owner, false),
        AccountMeta::new(owner_token_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
    ];
    build(program_id, accounts, HubInstruction::CreateVault { mode })
}

/// Owner, vault and proof metas shared by every vault operation.
/// `proof` is the caller's ownership token account; directly owned vaults pass `None`.
fn vault_gate_metas(caller: &Pubkey, vault: &Pubkey, proof: Option<&Pubkey>) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*vault, false),
        AccountMeta::new_readonly(*proof.unwrap_or(caller), false),
    ]
}

pub fn enable_withdraw(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
) -> Result<Instruction, ProgramError> {
    build(program_id, vault_gate_metas(caller, vault, proof), HubInstruction::EnableWithdraw)
}

pub fn withdraw_native(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    recipient: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vault_gate_metas(caller, vault, proof);
    accounts.push(AccountMeta::new(*recipient, false));
    build(program_id, accounts, HubInstruction::WithdrawNative { amount })
}

/// Withdraws from the vault's associated token account for `mint`
pub fn withdraw_token(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    mint: &Pubkey,
    destination: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vault_gate_metas(caller, vault, proof);
    accounts.push(AccountMeta::new(get_associated_token_address(vault, mint), false));
    accounts.push(AccountMeta::new(*destination, false));
    accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
    build(program_id, accounts, HubInstruction::WithdrawToken { amount })
}

pub fn withdraw_nft(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    mint: &Pubkey,
    destination: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vault_gate_metas(caller, vault, proof);
    accounts.push(AccountMeta::new_readonly(*mint, false));
    accounts.push(AccountMeta::new(get_associated_token_address(vault, mint), false));
    accounts.push(AccountMeta::new(*destination, false));
    accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
    build(program_id, accounts, HubInstruction::WithdrawNft)
}

fn batch_metas(
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    mint: Option<&Pubkey>,
    recipients: &[Pubkey],
) -> (AssetKind, Vec<AccountMeta>) {
    let mut accounts = vault_gate_metas(caller, vault, proof);
    let asset = match mint {
        None => AssetKind::Native,
        Some(mint) => {
            accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
            accounts.push(AccountMeta::new(get_associated_token_address(vault, mint), false));
            AssetKind::Token
        }
    };
    accounts.extend(recipients.iter().map(|recipient| AccountMeta::new(*recipient, false)));
    (asset, accounts)
}

/// Token batches pay from the vault's associated token account for `mint`
/// into the given recipient token accounts
pub fn batch_amount_withdraw(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    mint: Option<&Pubkey>,
    recipients: &[Pubkey],
    amounts: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let (asset, accounts) = batch_metas(caller, vault, proof, mint, recipients);
    build(program_id, accounts, HubInstruction::BatchAmountWithdraw { asset, amounts })
}

pub fn batch_percentage_withdraw(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    proof: Option<&Pubkey>,
    mint: Option<&Pubkey>,
    recipients: &[Pubkey],
    percentages: Vec<u8>,
) -> Result<Instruction, ProgramError> {
    let (asset, accounts) = batch_metas(caller, vault, proof, mint, recipients);
    build(program_id, accounts, HubInstruction::BatchPercentageWithdraw { asset, percentages })
}

pub fn transfer_vault_ownership(
    program_id: &Pubkey,
    caller: &Pubkey,
    vault: &Pubkey,
    new_owner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*vault, false),
    ];
    build(program_id, accounts, HubInstruction::TransferVaultOwnership { new_owner: *new_owner })
}

pub fn distribute_native(
    program_id: &Pubkey,
    payer: &Pubkey,
    recipients: &[Pubkey],
    amounts: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(recipients.iter().map(|recipient| AccountMeta::new(*recipient, false)));
    build(program_id, accounts, HubInstruction::DistributeNative { amounts })
}

pub fn distribute_tokens(
    program_id: &Pubkey,
    authority: &Pubkey,
    source: &Pubkey,
    recipients: &[Pubkey],
    amounts: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let mut accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new(*source, false),
    ];
    accounts.extend(recipients.iter().map(|recipient| AccountMeta::new(*recipient, false)));
    build(program_id, accounts, HubInstruction::DistributeTokens { amounts })
}

pub fn initialize_requester(program_id: &Pubkey, admin: &Pubkey, kind: RequesterKind) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new(find_requester_address(program_id, kind.seed()).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build(program_id, accounts, HubInstruction::InitializeRequester { kind })
}

pub fn set_request_parameters(
    program_id: &Pubkey,
    admin: &Pubkey,
    kind: RequesterKind,
    parameters: RequestParameters,
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*admin, true),
        AccountMeta::new(find_requester_address(program_id, kind.seed()).0, false),
    ];
    build(program_id, accounts, HubInstruction::SetRequestParameters { parameters })
}

pub fn add_new_endpoint(
    program_id: &Pubkey,
    admin: &Pubkey,
    kind: RequesterKind,
    endpoint_id: [u8; 32],
    signature: &str,
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*admin, true),
        AccountMeta::new(find_requester_address(program_id, kind.seed()).0, false),
    ];
    build(
        program_id,
        accounts,
        HubInstruction::AddNewEndpoint {
            endpoint_id,
            signature: signature.to_string(),
        },
    )
}

fn request_metas(program_id: &Pubkey, consumer: &Pubkey, kind: RequesterKind, request_index: u64) -> Vec<AccountMeta> {
    let (requester, _) = find_requester_address(program_id, kind.seed());
    vec![
        AccountMeta::new(*consumer, true),
        AccountMeta::new(requester, false),
        AccountMeta::new(find_request_address(program_id, &requester, request_index).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ]
}

/// `request_index` is the requester's current request count
pub fn request_winners(
    program_id: &Pubkey,
    consumer: &Pubkey,
    request_index: u64,
    selector: [u8; 4],
    total_winners: u64,
    total_entries: u64,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        request_metas(program_id, consumer, RequesterKind::WinnerSelection, request_index),
        HubInstruction::RequestWinners {
            selector,
            total_winners,
            total_entries,
        },
    )
}

pub fn request_numbers(
    program_id: &Pubkey,
    consumer: &Pubkey,
    request_index: u64,
    selector: [u8; 4],
    cap: u64,
    count: u64,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        request_metas(program_id, consumer, RequesterKind::NumberPicker, request_index),
        HubInstruction::RequestNumbers { selector, cap, count },
    )
}

pub fn fulfill_request(
    program_id: &Pubkey,
    sponsor_wallet: &Pubkey,
    kind: RequesterKind,
    request: &Pubkey,
    request_id: [u8; 32],
    selector: [u8; 4],
    data: Vec<u8>,
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*sponsor_wallet, true),
        AccountMeta::new_readonly(find_requester_address(program_id, kind.seed()).0, false),
        AccountMeta::new(*request, false),
    ];
    build(
        program_id,
        accounts,
        HubInstruction::FulfillRequest {
            request_id,
            selector,
            data,
        },
    )
}

pub fn request_results(
    program_id: &Pubkey,
    consumer: &Pubkey,
    request: &Pubkey,
    request_id: [u8; 32],
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new_readonly(*consumer, true),
        AccountMeta::new(*request, false),
    ];
    build(program_id, accounts, HubInstruction::RequestResults { request_id })
}

/// `raffle_id` is the hub's raffle count plus one
pub fn create_raffle(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle_id: u64,
    params: RaffleParams,
) -> Result<Instruction, ProgramError> {
    let accounts = vec![
        AccountMeta::new(*creator, true),
        AccountMeta::new(find_hub_address(program_id).0, false),
        AccountMeta::new(find_raffle_address(program_id, raffle_id).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build(program_id, accounts, HubInstruction::CreateRaffle { params })
}

/// `vault_index` is the factory's current vault count; the tickets vault takes it, the pot vault the next
pub fn create_yolo_raffle(
    program_id: &Pubkey,
    operator: &Pubkey,
    raffle_id: u64,
    vault_index: u64,
    ticket_price: u64,
    ticket_token: TicketToken,
    required_balance: u64,
    metadata: Metadata,
) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id, raffle_id);
    let (tickets_vault, tickets_mint, tickets_proof) = vault_accounts(program_id, vault_index, &raffle);
    let (pot_vault, pot_mint, pot_proof) = vault_accounts(program_id, vault_index + 1, &raffle);
    let mut accounts = vec![
        AccountMeta::new(*operator, true),
        AccountMeta::new(find_hub_address(program_id).0, false),
        AccountMeta::new(raffle, false),
        AccountMeta::new(find_factory_address(program_id).0, false),
        AccountMeta::new(tickets_vault, false),
        AccountMeta::new(tickets_mint, false),
        AccountMeta::new(tickets_proof, false),
        AccountMeta::new(pot_vault, false),
        AccountMeta::new(pot_mint, false),
        AccountMeta::new(pot_proof, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
    ];
    if let Some(mint) = ticket_token.mint() {
        accounts.push(AccountMeta::new_readonly(mint, false));
        accounts.push(AccountMeta::new(get_associated_token_address(&tickets_vault, &mint), false));
        accounts.push(AccountMeta::new(get_associated_token_address(&pot_vault, &mint), false));
    }
    build(
        program_id,
        accounts,
        HubInstruction::CreateYoloRaffle {
            ticket_price,
            ticket_token,
            required_balance,
            metadata,
        },
    )
}

fn creator_metas(program_id: &Pubkey, creator: &Pubkey, raffle_id: u64) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new_readonly(*creator, true),
        AccountMeta::new(find_raffle_address(program_id, raffle_id).0, false),
    ]
}

pub fn update_winners(program_id: &Pubkey, creator: &Pubkey, raffle_id: u64, winner_number: u8) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        creator_metas(program_id, creator, raffle_id),
        HubInstruction::UpdateWinners { winner_number },
    )
}

pub fn update_metadata(program_id: &Pubkey, creator: &Pubkey, raffle_id: u64, metadata: Metadata) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        creator_metas(program_id, creator, raffle_id),
        HubInstruction::UpdateMetadata { metadata },
    )
}

pub fn set_beneficiaries(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle_id: u64,
    beneficiaries: Vec<Pubkey>,
    shares: Vec<u8>,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        creator_metas(program_id, creator, raffle_id),
        HubInstruction::SetBeneficiaries { beneficiaries, shares },
    )
}

pub fn update_beneficiary(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle_id: u64,
    beneficiary: &Pubkey,
    share: u8,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        creator_metas(program_id, creator, raffle_id),
        HubInstruction::UpdateBeneficiary {
            beneficiary: *beneficiary,
            share,
        },
    )
}

/// Prizes are `(mint, amount)` pulled from the creator's associated token accounts.
/// `vault_index` is the factory's current vault count; the prizes vault takes it, the tickets vault the next.
pub fn open_raffle(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle_id: u64,
    ticket_token: &TicketToken,
    vault_index: u64,
    prizes: &[(Pubkey, u64)],
) -> Result<Instruction, ProgramError> {
    let (raffle, _) = find_raffle_address(program_id, raffle_id);
    let (prizes_vault, prizes_mint, prizes_proof) = vault_accounts(program_id, vault_index, &raffle);
    let (tickets_vault, tickets_mint, tickets_proof) = vault_accounts(program_id, vault_index + 1, &raffle);
    let mut accounts = vec![
        AccountMeta::new(*creator, true),
        AccountMeta::new(raffle, false),
        AccountMeta::new(find_factory_address(program_id).0, false),
        AccountMeta::new(prizes_vault, false),
        AccountMeta::new(prizes_mint, false),
        AccountMeta::new(prizes_proof, false),
        AccountMeta::new(tickets_vault, false),
        AccountMeta::new(tickets_mint, false),
        AccountMeta::new(tickets_proof, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
    ];
    if let Some(mint) = ticket_token.mint() {
        accounts.push(AccountMeta::new_readonly(mint, false));
        accounts.push(AccountMeta::new(get_associated_token_address(&tickets_vault, &mint), false));
    }
    for (mint, _) in prizes {
        accounts.push(AccountMeta::new_readonly(*mint, false));
        accounts.push(AccountMeta::new(get_associated_token_address(creator, mint), false));
        accounts.push(AccountMeta::new(get_associated_token_address(&prizes_vault, mint), false));
    }
    let prize_amounts = prizes.iter().map(|(_, amount)| *amount).collect();
    build(program_id, accounts, HubInstruction::OpenRaffle { prize_amounts })
}

/// Token tickets are paid from the payer's associated token account
pub fn enter_raffle(
    program_id: &Pubkey,
    payer: &Pubkey,
    raffle: &Raffle,
    participant: &Pubkey,
    ticket_count: u64,
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let tickets_vault = raffle
        .tickets_vault
        .ok_or(HubError::WrongRaffleStatus)?
        .address;
    let mut accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new(find_entry_address(program_id, &raffle_key, participant).0, false),
        AccountMeta::new(tickets_vault, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(mint) = raffle.params.ticket_token.mint() {
        accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
        accounts.push(AccountMeta::new(get_associated_token_address(payer, &mint), false));
        accounts.push(AccountMeta::new(get_associated_token_address(&tickets_vault, &mint), false));
    }
    if let TicketToken::PriceFed { feed, .. } = raffle.params.ticket_token {
        accounts.push(AccountMeta::new_readonly(feed, false));
    }
    build(
        program_id,
        accounts,
        HubInstruction::EnterRaffle {
            participant: *participant,
            ticket_count,
        },
    )
}

/// `request_index` is the winner requester's current request count
pub fn close_raffle(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Raffle,
    request_index: u64,
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let tickets_vault = raffle
        .tickets_vault
        .ok_or(HubError::WrongRaffleStatus)?
        .address;
    let (requester, _) = find_requester_address(program_id, RequesterKind::WinnerSelection.seed());
    let mut accounts = vec![
        AccountMeta::new(*caller, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new_readonly(tickets_vault, false),
        AccountMeta::new(requester, false),
        AccountMeta::new(find_request_address(program_id, &requester, request_index).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(mint) = raffle.params.ticket_token.mint() {
        accounts.push(AccountMeta::new_readonly(get_associated_token_address(&tickets_vault, &mint), false));
    }
    build(program_id, accounts, HubInstruction::CloseRaffle)
}

fn vault_pair_metas(program_id: &Pubkey, raffle: &Raffle, raffle_key: &Pubkey) -> Result<Vec<AccountMeta>, ProgramError> {
    let prizes_vault = raffle.prizes_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    let tickets_vault = raffle.tickets_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    Ok(vec![
        AccountMeta::new(prizes_vault, false),
        AccountMeta::new(ownership_account(program_id, &prizes_vault, raffle_key), false),
        AccountMeta::new(tickets_vault, false),
        AccountMeta::new(ownership_account(program_id, &tickets_vault, raffle_key), false),
    ])
}

/// `winners` are the participants the fulfilled request maps to, in draw order.
/// Only a yolo finish pays a winner directly.
pub fn finish_raffle(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Raffle,
    treasury: &Pubkey,
    winners: &[Pubkey],
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let request = raffle.request.ok_or(HubError::WrongRaffleStatus)?.address;
    let prizes_vault = raffle.prizes_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    let tickets_vault = raffle.tickets_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    let ticket_token = &raffle.params.ticket_token;

    let mut accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new(request, false),
    ];
    accounts.extend(vault_pair_metas(program_id, raffle, &raffle_key)?);
    accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
    if let Some(mint) = ticket_token.mint() {
        accounts.push(AccountMeta::new(get_associated_token_address(&tickets_vault, &mint), false));
    }

    match raffle.raffle_type {
        RaffleType::Traditional => {
            accounts.push(AccountMeta::new(payee(ticket_token, treasury), false));
            accounts.push(AccountMeta::new(payee(ticket_token, &raffle.creator), false));
            for beneficiary in raffle.beneficiaries.iter() {
                accounts.push(AccountMeta::new(payee(ticket_token, &beneficiary.address), false));
            }
        }
        RaffleType::Yolo => {
            if let Some(mint) = ticket_token.mint() {
                accounts.push(AccountMeta::new(get_associated_token_address(&prizes_vault, &mint), false));
            }
            accounts.push(AccountMeta::new(payee(ticket_token, treasury), false));
            let winner = winners.first().ok_or(HubError::InvalidParameter)?;
            accounts.push(AccountMeta::new(ownership_account(program_id, &prizes_vault, winner), false));
        }
    }
    build(program_id, accounts, HubInstruction::FinishRaffle)
}

pub fn cancel_raffle(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle: &Raffle,
    treasury: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let mut accounts = vec![
        AccountMeta::new(*creator, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new(*treasury, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if raffle.status == RaffleStatus::Open {
        accounts.extend(vault_pair_metas(program_id, raffle, &raffle_key)?);
    }
    build(program_id, accounts, HubInstruction::CancelRaffle)
}

/// `recipient` is the winner of the prize, or the creator after a cancel
pub fn claim_prize(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Raffle,
    prize_index: u8,
    recipient: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let prizes_vault = raffle.prizes_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    let prize = raffle
        .prizes
        .get(prize_index as usize)
        .ok_or(HubError::InvalidParameter)?;
    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new_readonly(prizes_vault, false),
        AccountMeta::new_readonly(ownership_account(program_id, &prizes_vault, &raffle_key), false),
        AccountMeta::new(get_associated_token_address(&prizes_vault, &prize.mint), false),
        AccountMeta::new(get_associated_token_address(recipient, &prize.mint), false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    build(program_id, accounts, HubInstruction::ClaimPrize { prize_index })
}

/// Refunds go to the participant's wallet, or its associated token account for token tickets
pub fn claim_refund(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Raffle,
    participant: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let tickets_vault = raffle.tickets_vault.ok_or(HubError::WrongRaffleStatus)?.address;
    let ticket_token = &raffle.params.ticket_token;
    let mut accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new_readonly(raffle_key, false),
        AccountMeta::new(find_entry_address(program_id, &raffle_key, participant).0, false),
        AccountMeta::new(tickets_vault, false),
        AccountMeta::new_readonly(ownership_account(program_id, &tickets_vault, &raffle_key), false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    if let Some(mint) = ticket_token.mint() {
        accounts.push(AccountMeta::new(get_associated_token_address(&tickets_vault, &mint), false));
    }
    accounts.push(AccountMeta::new(payee(ticket_token, participant), false));
    build(program_id, accounts, HubInstruction::ClaimRefund)
}

/// The operator receives both ownership tokens in its associated token accounts
pub fn force_recover(program_id: &Pubkey, operator: &Pubkey, raffle: &Raffle) -> Result<Instruction, ProgramError> {
    let (raffle_key, _) = find_raffle_address(program_id, raffle.raffle_id);
    let mut accounts = vec![
        AccountMeta::new_readonly(*operator, true),
        AccountMeta::new(raffle_key, false),
        AccountMeta::new_readonly(find_hub_address(program_id).0, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    for vault in [raffle.prizes_vault, raffle.tickets_vault].into_iter().flatten() {
        accounts.push(AccountMeta::new(ownership_account(program_id, &vault.address, &raffle_key), false));
        accounts.push(AccountMeta::new(ownership_account(program_id, &vault.address, operator), false));
    }
    build(program_id, accounts, HubInstruction::ForceRecover)
}
