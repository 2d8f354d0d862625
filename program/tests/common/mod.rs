#![allow(dead_code)]

use borsh::BorshSerialize;
use solana_program::{borsh::try_from_slice_unchecked, program_pack::Pack};
use solana_program_test::*;
use solana_sdk::{
    account::Account,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction, system_program,
    sysvar::clock::Clock,
    transaction::{Transaction, TransactionError},
};
use spl_associated_token_account::get_associated_token_address;

use rafflehub::{
    constants::{INDIVIDUAL_WINNER_CALLBACK, MULTIPLE_WINNERS_CALLBACK},
    error::HubError,
    hub_state::HubSettings,
    instruction,
    process_instruction,
    raffle_state::Raffle,
    randomness::Callback,
    requester_state::{RandomnessRequest, RequestParameters, RequesterKind},
    utils::{find_raffle_address, find_requester_address},
};

pub const STARTING_LAMPORTS: u64 = 10_000_000_000;
pub const CANCELLATION_FEE: u64 = 1_000_000;
pub const RAFFLE_CUT: u8 = 5;
pub const YOLO_RAFFLE_CUT: u8 = 10;
pub const YOLO_DURATION: i64 = 3_600;

pub struct TestHub {
    pub context: ProgramTestContext,
    pub program_id: Pubkey,
    pub operator: Keypair,
    pub treasury: Pubkey,
    pub sponsor_wallet: Keypair,
    /// Funded wallets for creators, participants and beneficiaries
    pub users: Vec<Keypair>,
}

fn fund(program_test: &mut ProgramTest, key: &Pubkey) {
    program_test.add_account(
        *key,
        Account::new(STARTING_LAMPORTS, 0, &system_program::id()),
    );
}

pub async fn start(user_count: usize) -> TestHub {
    let program_id = Pubkey::new_unique();
    let mut program_test = ProgramTest::new("rafflehub", program_id, processor!(process_instruction));
    program_test.set_compute_max_units(1_400_000);

    let operator = Keypair::new();
    let treasury = Pubkey::new_unique();
    let sponsor_wallet = Keypair::new();
    let users: Vec<Keypair> = (0..user_count).map(|_| Keypair::new()).collect();
    fund(&mut program_test, &operator.pubkey());
    fund(&mut program_test, &treasury);
    fund(&mut program_test, &sponsor_wallet.pubkey());
    for user in users.iter() {
        fund(&mut program_test, &user.pubkey());
    }

    let context = program_test.start_with_context().await;
    TestHub {
        context,
        program_id,
        operator,
        treasury,
        sponsor_wallet,
        users,
    }
}

/// Signs with the context payer plus `signers` and submits on a fresh blockhash
pub async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = context
        .banks_client
        .get_new_latest_blockhash(&context.last_blockhash)
        .await
        .unwrap();
    context.last_blockhash = blockhash;
    let mut all_signers: Vec<&Keypair> = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

pub fn assert_hub_error(result: Result<(), BanksClientError>, expected: HubError) {
    match result.unwrap_err().unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(code, expected as u32, "expected {:?}", expected)
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

pub fn settings(hub: &TestHub) -> HubSettings {
    let (winner_requester, _) = find_requester_address(&hub.program_id, RequesterKind::WinnerSelection.seed());
    HubSettings {
        operator: hub.operator.pubkey(),
        treasury: hub.treasury,
        raffle_cut: RAFFLE_CUT,
        yolo_raffle_cut: YOLO_RAFFLE_CUT,
        cancellation_fee: CANCELLATION_FEE,
        yolo_duration: YOLO_DURATION,
        winner_requester,
    }
}

pub async fn initialize_hub(hub: &mut TestHub) {
    let admin = hub.context.payer.pubkey();
    let ix = instruction::initialize_hub(&hub.program_id, &admin, settings(hub)).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
}

/// Initializes a requester, points it at the sponsor wallet and registers `callbacks`
pub async fn initialize_requester(hub: &mut TestHub, kind: RequesterKind, callbacks: &[&str]) {
    let admin = hub.context.payer.pubkey();
    let parameters = RequestParameters {
        provider: Pubkey::new_unique(),
        sponsor: Pubkey::new_unique(),
        sponsor_wallet: hub.sponsor_wallet.pubkey(),
    };
    let mut ixs = vec![
        instruction::initialize_requester(&hub.program_id, &admin, kind).unwrap(),
        instruction::set_request_parameters(&hub.program_id, &admin, kind, parameters).unwrap(),
    ];
    for (i, callback) in callbacks.iter().enumerate() {
        ixs.push(instruction::add_new_endpoint(&hub.program_id, &admin, kind, [i as u8 + 1; 32], callback).unwrap());
    }
    process(&mut hub.context, &ixs, &[]).await.unwrap();
}

/// Hub plus a winner requester able to serve single and multi winner draws
pub async fn start_with_hub(user_count: usize) -> TestHub {
    let mut hub = start(user_count).await;
    initialize_hub(&mut hub).await;
    initialize_requester(
        &mut hub,
        RequesterKind::WinnerSelection,
        &[INDIVIDUAL_WINNER_CALLBACK, MULTIPLE_WINNERS_CALLBACK],
    )
    .await;
    hub
}

/// A random word whose value is `value`
pub fn word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Submits the provider callback for a pending request
pub async fn fulfill(hub: &mut TestHub, kind: RequesterKind, request: &Pubkey, words: Vec<[u8; 32]>) {
    let pending = fetch_request(&mut hub.context, request).await;
    let data = match kind.callback_for(&pending.selector).unwrap() {
        Callback::Single => words[0].to_vec(),
        Callback::Multiple => words.try_to_vec().unwrap(),
    };
    let ix = instruction::fulfill_request(
        &hub.program_id,
        &hub.sponsor_wallet.pubkey(),
        kind,
        request,
        pending.request_id,
        pending.selector,
        data,
    )
    .unwrap();
    process(&mut hub.context, &[ix], &[&hub.sponsor_wallet]).await.unwrap();
}

/// The participants a fulfilled winner request resolves to
pub async fn drawn_winners(hub: &mut TestHub, raffle: &Raffle) -> Vec<Pubkey> {
    let request = raffle.request.unwrap().address;
    let mut fulfilled = fetch_request(&mut hub.context, &request).await;
    let indexes = fulfilled.retrieve_results().unwrap();
    raffle.winners_for(&indexes).unwrap()
}

pub async fn fetch_raffle(hub: &mut TestHub, raffle_id: u64) -> Raffle {
    let (address, _) = find_raffle_address(&hub.program_id, raffle_id);
    let account = hub.context.banks_client.get_account(address).await.unwrap().unwrap();
    try_from_slice_unchecked::<Raffle>(&account.data).unwrap()
}

pub async fn fetch_request(context: &mut ProgramTestContext, address: &Pubkey) -> RandomnessRequest {
    let account = context.banks_client.get_account(*address).await.unwrap().unwrap();
    try_from_slice_unchecked::<RandomnessRequest>(&account.data).unwrap()
}

pub async fn now(context: &mut ProgramTestContext) -> i64 {
    let clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp
}

pub async fn warp_to(context: &mut ProgramTestContext, unix_timestamp: i64) {
    let mut clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp = unix_timestamp;
    context.set_sysvar(&clock);
}

pub async fn lamports(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    context.banks_client.get_balance(*address).await.unwrap()
}

pub async fn create_mint(context: &mut ProgramTestContext, authority: &Pubkey, decimals: u8) -> Pubkey {
    let mint = Keypair::new();
    let payer = context.payer.pubkey();
    let rent = context.banks_client.get_rent().await.unwrap();
    let ixs = [
        system_instruction::create_account(
            &payer,
            &mint.pubkey(),
            rent.minimum_balance(spl_token::state::Mint::LEN),
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint(&spl_token::id(), &mint.pubkey(), authority, None, decimals).unwrap(),
    ];
    process(context, &ixs, &[&mint]).await.unwrap();
    mint.pubkey()
}

pub async fn create_token_account(context: &mut ProgramTestContext, wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    let payer = context.payer.pubkey();
    let ix = spl_associated_token_account::instruction::create_associated_token_account(
        &payer,
        wallet,
        mint,
        &spl_token::id(),
    );
    process(context, &[ix], &[]).await.unwrap();
    get_associated_token_address(wallet, mint)
}

pub async fn mint_tokens(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Keypair,
    amount: u64,
) {
    let ix = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &authority.pubkey(),
        &[],
        amount,
    )
    .unwrap();
    process(context, &[ix], &[authority]).await.unwrap();
}

pub async fn token_balance(context: &mut ProgramTestContext, account: &Pubkey) -> u64 {
    let account = context.banks_client.get_account(*account).await.unwrap().unwrap();
    spl_token::state::Account::unpack(&account.data).unwrap().amount
}

/// A one-of-one mint held by `owner`, returning the mint and the owner's account
pub async fn create_nft(context: &mut ProgramTestContext, owner: &Pubkey) -> (Pubkey, Pubkey) {
    let authority = Keypair::new();
    let mint = create_mint(context, &authority.pubkey(), 0).await;
    let account = create_token_account(context, owner, &mint).await;
    mint_tokens(context, &mint, &account, &authority, 1).await;
    (mint, account)
}
