mod common;

use common::*;
use solana_program_test::*;
use solana_program::program_pack::Pack;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use rafflehub::{
    error::HubError,
    instruction,
    raffle_state::{
        CancelationReason, Entry, Metadata, Raffle, RaffleParams, RaffleStatus, RaffleType, TicketToken,
    },
    requester_state::RequesterKind,
    utils::{find_entry_address, find_raffle_address, find_vault_mint_address},
};

const TICKET_PRICE: u64 = 1_000_000;

fn native_params(start_time: i64, winner_number: u8) -> RaffleParams {
    RaffleParams {
        start_time,
        expected_end_time: start_time + 1_000,
        ticket_price: TICKET_PRICE,
        required_balance: 0,
        metadata: Metadata::default(),
        ticket_token: TicketToken::Native,
        winner_number,
    }
}

async fn create_raffle(hub: &mut TestHub, creator: usize, raffle_id: u64, params: RaffleParams) -> Raffle {
    let creator_key = hub.users[creator].pubkey();
    let ix = instruction::create_raffle(&hub.program_id, &creator_key, raffle_id, params).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[creator]]).await.unwrap();
    fetch_raffle(hub, raffle_id).await
}

async fn enter(hub: &mut TestHub, payer: usize, raffle_id: u64, participant: &Pubkey, tickets: u64) {
    let raffle = fetch_raffle(hub, raffle_id).await;
    let payer_key = hub.users[payer].pubkey();
    let ix = instruction::enter_raffle(&hub.program_id, &payer_key, &raffle, participant, tickets).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[payer]]).await.unwrap();
}

/// Closes an ended raffle and answers its winner request with `values`
async fn close_and_draw(hub: &mut TestHub, raffle_id: u64, request_index: u64, values: &[u64]) -> Raffle {
    let raffle = fetch_raffle(hub, raffle_id).await;
    warp_to(&mut hub.context, raffle.params.expected_end_time).await;

    let caller = hub.context.payer.pubkey();
    let ix = instruction::close_raffle(&hub.program_id, &caller, &raffle, request_index).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();

    let raffle = fetch_raffle(hub, raffle_id).await;
    assert_eq!(raffle.status, RaffleStatus::Close);
    let request = raffle.request.unwrap().address;
    fulfill(hub, RequesterKind::WinnerSelection, &request, values.iter().map(|v| word(*v)).collect()).await;
    raffle
}

#[tokio::test]
async fn test_traditional_native_raffle() {
    // users: creator, beneficiary, two participants
    let mut hub = start_with_hub(4).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();
    let beneficiary = hub.users[1].pubkey();
    let alice = hub.users[2].pubkey();
    let bob = hub.users[3].pubkey();

    let start_time = now(&mut hub.context).await;
    let raffle = create_raffle(&mut hub, 0, 1, native_params(start_time, 1)).await;
    assert_eq!(raffle.status, RaffleStatus::Uninitialized);
    assert_eq!(raffle.creator, creator);

    // only the creator configures the raffle
    let ix = instruction::set_beneficiaries(&program_id, &alice, 1, vec![beneficiary], vec![10]).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[2]]).await,
        HubError::CallerNotCreator,
    );
    let ix = instruction::set_beneficiaries(&program_id, &creator, 1, vec![beneficiary], vec![10]).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    let ix = instruction::update_beneficiary(&program_id, &creator, 1, &beneficiary, 101).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::InvalidParameter,
    );

    // at least one winner
    let ix = instruction::update_winners(&program_id, &creator, 1, 0).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::InvalidWinnerNumber,
    );

    let (nft, _) = create_nft(&mut hub.context, &creator).await;
    let ix = instruction::open_raffle(&program_id, &creator, 1, &TicketToken::Native, 0, &[(nft, 1)]).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.status, RaffleStatus::Open);
    let prizes_vault = raffle.prizes_vault.unwrap().address;
    let tickets_vault = raffle.tickets_vault.unwrap().address;
    let vault_nft = spl_associated_token_account::get_associated_token_address(&prizes_vault, &nft);
    assert_eq!(token_balance(&mut hub.context, &vault_nft).await, 1);

    // winner_number is fixed once open
    let ix = instruction::update_winners(&program_id, &creator, 1, 1).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::WrongRaffleStatus,
    );

    // alice holds tickets 0..3, bob 3..5
    enter(&mut hub, 2, 1, &alice, 3).await;
    enter(&mut hub, 3, 1, &bob, 2).await;
    assert!(lamports(&mut hub.context, &tickets_vault).await > 5 * TICKET_PRICE);

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.total_entries, 5);
    assert_eq!(raffle.total_collected, 5 * TICKET_PRICE);

    // too early to close
    let caller = hub.context.payer.pubkey();
    let ix = instruction::close_raffle(&program_id, &caller, &raffle, 0).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::RaffleNotEnded);

    let bob_nft = create_token_account(&mut hub.context, &bob, &nft).await;
    create_token_account(&mut hub.context, &alice, &nft).await;

    let raffle = close_and_draw(&mut hub, 1, 0, &[4]).await;

    // entries are closed along with the raffle
    let ix = instruction::enter_raffle(&program_id, &alice, &raffle, &alice, 1).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[2]]).await,
        HubError::WrongRaffleStatus,
    );

    let winners = drawn_winners(&mut hub, &raffle).await;
    assert_eq!(winners, vec![bob]);

    let treasury = hub.treasury;
    let before = [
        lamports(&mut hub.context, &treasury).await,
        lamports(&mut hub.context, &beneficiary).await,
        lamports(&mut hub.context, &creator).await,
    ];
    let ix = instruction::finish_raffle(&program_id, &caller, &raffle, &treasury, &winners).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
    let raffle = fetch_raffle(&mut hub, 1).await;

    // 5% cut, then 10% of the rest to the beneficiary, the remainder to the creator
    let pot = 5 * TICKET_PRICE;
    let treasury_amount = pot * RAFFLE_CUT as u64 / 100;
    let available = pot - treasury_amount;
    let beneficiary_amount = available / 10;
    assert_eq!(lamports(&mut hub.context, &treasury).await, before[0] + treasury_amount);
    assert_eq!(lamports(&mut hub.context, &beneficiary).await, before[1] + beneficiary_amount);
    assert_eq!(
        lamports(&mut hub.context, &creator).await,
        before[2] + available - beneficiary_amount
    );
    assert_eq!(token_balance(&mut hub.context, &vault_nft).await, 1);

    // the prize only goes to its winner
    let ix = instruction::claim_prize(&program_id, &alice, &raffle, 0, &alice).unwrap();
    assert!(process(&mut hub.context, &[ix], &[&hub.users[2]]).await.is_err());
    let ix = instruction::claim_prize(&program_id, &alice, &raffle, 0, &bob).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[2]]).await.unwrap();
    assert_eq!(token_balance(&mut hub.context, &bob_nft).await, 1);
    assert_eq!(token_balance(&mut hub.context, &vault_nft).await, 0);
    let ix = instruction::claim_prize(&program_id, &caller, &raffle, 0, &bob).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::NothingToClaim);

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.status, RaffleStatus::Finish);
    assert!(raffle.prizes[0].claimed);
    assert_eq!(raffle.winners, vec![bob]);
    assert_eq!(raffle.winner_indexes, vec![4]);

    // finish runs once
    let ix = instruction::finish_raffle(&program_id, &caller, &raffle, &treasury, &winners).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::WrongRaffleStatus);
}

#[tokio::test]
async fn test_token_raffle_with_multiple_winners() {
    // users: creator, three participants
    let mut hub = start_with_hub(4).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();
    let participants: Vec<Pubkey> = hub.users[1..].iter().map(|user| user.pubkey()).collect();

    let mint_authority = Keypair::new();
    let ticket_mint = create_mint(&mut hub.context, &mint_authority.pubkey(), 6).await;
    for participant in participants.iter() {
        let account = create_token_account(&mut hub.context, participant, &ticket_mint).await;
        mint_tokens(&mut hub.context, &ticket_mint, &account, &mint_authority, 100_000).await;
    }
    let treasury = hub.treasury;
    let treasury_tokens = create_token_account(&mut hub.context, &treasury, &ticket_mint).await;
    let creator_tokens = create_token_account(&mut hub.context, &creator, &ticket_mint).await;

    let prize_mint = create_mint(&mut hub.context, &mint_authority.pubkey(), 0).await;
    let creator_prizes = create_token_account(&mut hub.context, &creator, &prize_mint).await;
    mint_tokens(&mut hub.context, &prize_mint, &creator_prizes, &mint_authority, 10).await;

    let start_time = now(&mut hub.context).await;
    let ticket_token = TicketToken::Fungible { mint: ticket_mint };
    let params = RaffleParams {
        ticket_price: 1_000,
        required_balance: 5_000,
        ticket_token,
        ..native_params(start_time, 2)
    };
    create_raffle(&mut hub, 0, 1, params).await;

    // two winners need at least two prizes
    let ix = instruction::open_raffle(&program_id, &creator, 1, &ticket_token, 0, &[(prize_mint, 3)]).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::InvalidParameter,
    );
    let prizes = [(prize_mint, 3), (prize_mint, 2), (prize_mint, 1)];
    let ix = instruction::open_raffle(&program_id, &creator, 1, &ticket_token, 0, &prizes).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    assert_eq!(token_balance(&mut hub.context, &creator_prizes).await, 4);

    // tickets 0..2, 2..3, 3..6
    enter(&mut hub, 1, 1, &participants[0], 2).await;
    enter(&mut hub, 2, 1, &participants[1], 1).await;
    enter(&mut hub, 3, 1, &participants[2], 3).await;
    let first_tokens = spl_associated_token_account::get_associated_token_address(&participants[0], &ticket_mint);
    assert_eq!(token_balance(&mut hub.context, &first_tokens).await, 98_000);

    for participant in participants.iter() {
        create_token_account(&mut hub.context, participant, &prize_mint).await;
    }
    let raffle = close_and_draw(&mut hub, 1, 0, &[8, 2]).await;
    let winners = drawn_winners(&mut hub, &raffle).await;
    assert_eq!(winners, vec![participants[1], participants[1]]);

    let caller = hub.context.payer.pubkey();
    let ix = instruction::finish_raffle(&program_id, &caller, &raffle, &treasury, &winners).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();

    let raffle = fetch_raffle(&mut hub, 1).await;
    let claims: Vec<_> = (0..3u8)
        .map(|i| {
            let recipient = Raffle::prize_recipient(i as usize, &winners).unwrap();
            instruction::claim_prize(&program_id, &caller, &raffle, i, &recipient).unwrap()
        })
        .collect();
    process(&mut hub.context, &claims, &[]).await.unwrap();

    // the same participant may win every draw
    let winner_prizes = spl_associated_token_account::get_associated_token_address(&participants[1], &prize_mint);
    assert_eq!(token_balance(&mut hub.context, &winner_prizes).await, 6);
    assert_eq!(token_balance(&mut hub.context, &treasury_tokens).await, 300);
    assert_eq!(token_balance(&mut hub.context, &creator_tokens).await, 5_700);
}

#[tokio::test]
async fn test_required_balance_blocks_close() {
    let mut hub = start_with_hub(2).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();
    let alice = hub.users[1].pubkey();

    let start_time = now(&mut hub.context).await;
    let params = RaffleParams {
        required_balance: 10 * TICKET_PRICE,
        ..native_params(start_time, 1)
    };
    create_raffle(&mut hub, 0, 1, params).await;
    let (nft, _) = create_nft(&mut hub.context, &creator).await;
    let ix = instruction::open_raffle(&program_id, &creator, 1, &TicketToken::Native, 0, &[(nft, 1)]).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    enter(&mut hub, 1, 1, &alice, 2).await;

    let raffle = fetch_raffle(&mut hub, 1).await;
    warp_to(&mut hub.context, raffle.params.expected_end_time + 1).await;
    let caller = hub.context.payer.pubkey();
    let ix = instruction::close_raffle(&program_id, &caller, &raffle, 0).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::RequiredBalanceNotMet);

    let ix = instruction::enter_raffle(&program_id, &alice, &raffle, &alice, 1).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[1]]).await,
        HubError::RaffleEnded,
    );
}

#[tokio::test]
async fn test_cancel_refunds_participants() {
    // users: creator, alice, bob, a third party paying for bob
    let mut hub = start_with_hub(4).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();
    let alice = hub.users[1].pubkey();
    let bob = hub.users[2].pubkey();

    let mint_authority = Keypair::new();
    let prize_mint = create_mint(&mut hub.context, &mint_authority.pubkey(), 6).await;
    let creator_prizes = create_token_account(&mut hub.context, &creator, &prize_mint).await;
    mint_tokens(&mut hub.context, &prize_mint, &creator_prizes, &mint_authority, 50_000_000).await;

    let start_time = now(&mut hub.context).await;
    create_raffle(&mut hub, 0, 1, native_params(start_time, 1)).await;
    let ix = instruction::open_raffle(
        &program_id,
        &creator,
        1,
        &TicketToken::Native,
        0,
        &[(prize_mint, 50_000_000)],
    )
    .unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    enter(&mut hub, 1, 1, &alice, 2).await;
    enter(&mut hub, 1, 1, &alice, 1).await;
    enter(&mut hub, 3, 1, &bob, 4).await;

    let (alice_entry, _) = find_entry_address(&program_id, &find_raffle_address(&program_id, 1).0, &alice);
    let entry_account = hub.context.banks_client.get_account(alice_entry).await.unwrap().unwrap();
    let entry = Entry::unpack(&entry_account.data).unwrap();
    assert_eq!(entry.entries, 3);
    assert_eq!(entry.paid, 3 * TICKET_PRICE);

    let raffle = fetch_raffle(&mut hub, 1).await;
    let treasury = hub.treasury;

    // nothing to refund while the raffle runs
    let caller = hub.context.payer.pubkey();
    let ix = instruction::claim_refund(&program_id, &caller, &raffle, &alice).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::WrongRaffleStatus);

    // not the creator
    let ix = instruction::cancel_raffle(&program_id, &alice, &raffle, &treasury).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[1]]).await,
        HubError::CallerNotCreator,
    );

    let before = [
        lamports(&mut hub.context, &alice).await,
        lamports(&mut hub.context, &bob).await,
        lamports(&mut hub.context, &treasury).await,
    ];
    let ix = instruction::cancel_raffle(&program_id, &creator, &raffle, &treasury).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    assert_eq!(lamports(&mut hub.context, &treasury).await, before[2] + CANCELLATION_FEE);

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.status, RaffleStatus::Canceled);
    assert_eq!(raffle.cancelation, Some(CancelationReason::CreatorDecision));

    // anyone may trigger a refund, it always lands with the participant
    let ix = instruction::claim_refund(&program_id, &caller, &raffle, &alice).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
    let ix = instruction::claim_refund(&program_id, &alice, &raffle, &bob).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[1]]).await.unwrap();
    assert_eq!(lamports(&mut hub.context, &alice).await, before[0] + 3 * TICKET_PRICE);
    assert_eq!(lamports(&mut hub.context, &bob).await, before[1] + 4 * TICKET_PRICE);

    let ix = instruction::claim_refund(&program_id, &caller, &raffle, &alice).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::NothingToClaim);

    // the prize goes back to the creator
    let ix = instruction::claim_prize(&program_id, &caller, &raffle, 0, &creator).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
    assert_eq!(token_balance(&mut hub.context, &creator_prizes).await, 50_000_000);

    let ix = instruction::cancel_raffle(&program_id, &creator, &raffle, &treasury).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::WrongRaffleStatus,
    );
}

#[tokio::test]
async fn test_cancel_scales_past_one_transaction_of_refunds() {
    // users: creator, then one wallet per participant
    let participant_count = 24;
    let mut hub = start_with_hub(participant_count + 1).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();

    let start_time = now(&mut hub.context).await;
    create_raffle(&mut hub, 0, 1, native_params(start_time, 1)).await;
    let (nft, creator_nft) = create_nft(&mut hub.context, &creator).await;
    let ix = instruction::open_raffle(&program_id, &creator, 1, &TicketToken::Native, 0, &[(nft, 1)]).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    let participants: Vec<Pubkey> = hub.users[1..].iter().map(|user| user.pubkey()).collect();
    for (i, participant) in participants.iter().enumerate() {
        enter(&mut hub, i + 1, 1, participant, i as u64 % 3 + 1).await;
    }

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.participants.len(), participant_count);
    let treasury = hub.treasury;
    let ix = instruction::cancel_raffle(&program_id, &creator, &raffle, &treasury).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    let raffle = fetch_raffle(&mut hub, 1).await;

    let mut before = Vec::with_capacity(participant_count);
    for participant in participants.iter() {
        before.push(lamports(&mut hub.context, participant).await);
    }
    let caller = hub.context.payer.pubkey();
    for batch in participants.chunks(8) {
        let refunds: Vec<_> = batch
            .iter()
            .map(|participant| instruction::claim_refund(&program_id, &caller, &raffle, participant).unwrap())
            .collect();
        process(&mut hub.context, &refunds, &[]).await.unwrap();
    }
    for (i, participant) in participants.iter().enumerate() {
        let paid = (i as u64 % 3 + 1) * TICKET_PRICE;
        assert_eq!(lamports(&mut hub.context, participant).await, before[i] + paid);
    }

    let ix = instruction::claim_prize(&program_id, &caller, &raffle, 0, &creator).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
    assert_eq!(token_balance(&mut hub.context, &creator_nft).await, 1);
}

#[tokio::test]
async fn test_cancel_before_open_only_charges_fee() {
    let mut hub = start_with_hub(1).await;
    let program_id = hub.program_id;
    let creator = hub.users[0].pubkey();

    let start_time = now(&mut hub.context).await;
    let raffle = create_raffle(&mut hub, 0, 1, native_params(start_time, 1)).await;
    let treasury = hub.treasury;
    let before = lamports(&mut hub.context, &treasury).await;

    let ix = instruction::cancel_raffle(&program_id, &creator, &raffle, &treasury).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    assert_eq!(lamports(&mut hub.context, &treasury).await, before + CANCELLATION_FEE);
    assert_eq!(fetch_raffle(&mut hub, 1).await.status, RaffleStatus::Canceled);
}

#[tokio::test]
async fn test_yolo_raffle() {
    // users: alice, bob
    let mut hub = start_with_hub(2).await;
    let program_id = hub.program_id;
    let operator = hub.operator.pubkey();
    let alice = hub.users[0].pubkey();
    let bob = hub.users[1].pubkey();

    // yolo raffles are the operator's
    let ix = instruction::create_yolo_raffle(
        &program_id,
        &alice,
        1,
        0,
        TICKET_PRICE,
        TicketToken::Native,
        0,
        Metadata::default(),
    )
    .unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::AccessDenied,
    );

    let ix = instruction::create_yolo_raffle(
        &program_id,
        &operator,
        1,
        0,
        TICKET_PRICE,
        TicketToken::Native,
        0,
        Metadata::default(),
    )
    .unwrap();
    process(&mut hub.context, &[ix], &[&hub.operator]).await.unwrap();

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.raffle_type, RaffleType::Yolo);
    assert_eq!(raffle.status, RaffleStatus::Open);
    assert_eq!(raffle.params.winner_number, 1);
    assert_eq!(
        raffle.params.expected_end_time - raffle.params.start_time,
        YOLO_DURATION
    );

    let ix = instruction::set_beneficiaries(&program_id, &operator, 1, vec![bob], vec![10]).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.operator]).await,
        HubError::InvalidParameter,
    );

    // tickets 0..1 alice, 1..4 bob
    enter(&mut hub, 0, 1, &alice, 1).await;
    enter(&mut hub, 1, 1, &bob, 3).await;

    let pot_vault = raffle.prizes_vault.unwrap().address;
    let (pot_mint, _) = find_vault_mint_address(&program_id, &pot_vault);
    let bob_proof = create_token_account(&mut hub.context, &bob, &pot_mint).await;
    let alice_proof = create_token_account(&mut hub.context, &alice, &pot_mint).await;

    let raffle = close_and_draw(&mut hub, 1, 0, &[6]).await;
    let winners = drawn_winners(&mut hub, &raffle).await;
    assert_eq!(winners, vec![bob]);

    let treasury = hub.treasury;
    let before = lamports(&mut hub.context, &treasury).await;
    let caller = hub.context.payer.pubkey();
    let ix = instruction::finish_raffle(&program_id, &caller, &raffle, &treasury, &winners).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();

    let pot = 4 * TICKET_PRICE;
    let treasury_amount = pot * YOLO_RAFFLE_CUT as u64 / 100;
    assert_eq!(lamports(&mut hub.context, &treasury).await, before + treasury_amount);
    assert_eq!(token_balance(&mut hub.context, &bob_proof).await, 1);

    // the pot belongs to whoever holds its ownership token
    let ix = instruction::enable_withdraw(&program_id, &alice, &pot_vault, Some(&alice_proof)).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::CallerNotOwner,
    );

    let ix = instruction::enable_withdraw(&program_id, &bob, &pot_vault, Some(&bob_proof)).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[1]]).await.unwrap();
    let before = lamports(&mut hub.context, &bob).await;
    let ix = instruction::withdraw_native(
        &program_id,
        &bob,
        &pot_vault,
        Some(&bob_proof),
        &bob,
        pot - treasury_amount,
    )
    .unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[1]]).await.unwrap();
    assert_eq!(lamports(&mut hub.context, &bob).await, before + pot - treasury_amount);
}

#[tokio::test]
async fn test_force_recover_hands_vaults_to_operator() {
    let mut hub = start_with_hub(2).await;
    let program_id = hub.program_id;
    let operator = hub.operator.pubkey();
    let creator = hub.users[0].pubkey();
    let alice = hub.users[1].pubkey();

    let start_time = now(&mut hub.context).await;
    create_raffle(&mut hub, 0, 1, native_params(start_time, 1)).await;
    let (nft, _) = create_nft(&mut hub.context, &creator).await;
    let ix = instruction::open_raffle(&program_id, &creator, 1, &TicketToken::Native, 0, &[(nft, 1)]).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();
    enter(&mut hub, 1, 1, &alice, 2).await;

    // stuck waiting on the provider
    let raffle = fetch_raffle(&mut hub, 1).await;
    warp_to(&mut hub.context, raffle.params.expected_end_time).await;
    let caller = hub.context.payer.pubkey();
    let ix = instruction::close_raffle(&program_id, &caller, &raffle, 0).unwrap();
    process(&mut hub.context, &[ix], &[]).await.unwrap();
    let raffle = fetch_raffle(&mut hub, 1).await;

    let tickets_vault = raffle.tickets_vault.unwrap().address;
    let prizes_vault = raffle.prizes_vault.unwrap().address;
    let tickets_proof = create_token_account(
        &mut hub.context,
        &operator,
        &find_vault_mint_address(&program_id, &tickets_vault).0,
    )
    .await;
    let prizes_proof = create_token_account(
        &mut hub.context,
        &operator,
        &find_vault_mint_address(&program_id, &prizes_vault).0,
    )
    .await;

    let ix = instruction::force_recover(&program_id, &alice, &raffle).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[1]]).await,
        HubError::AccessDenied,
    );

    let ix = instruction::force_recover(&program_id, &operator, &raffle).unwrap();
    process(&mut hub.context, &[ix], &[&hub.operator]).await.unwrap();
    assert_eq!(token_balance(&mut hub.context, &tickets_proof).await, 1);
    assert_eq!(token_balance(&mut hub.context, &prizes_proof).await, 1);

    let raffle = fetch_raffle(&mut hub, 1).await;
    assert_eq!(raffle.status, RaffleStatus::Canceled);
    assert_eq!(raffle.cancelation, Some(CancelationReason::ForcedCancelation));

    // the vaults are the operator's now, not the refund path's
    let ix = instruction::claim_refund(&program_id, &caller, &raffle, &alice).unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::WrongRaffleStatus);

    // the operator runs the refund by hand
    let ix = instruction::enable_withdraw(&program_id, &operator, &tickets_vault, Some(&tickets_proof)).unwrap();
    process(&mut hub.context, &[ix], &[&hub.operator]).await.unwrap();
    let before = lamports(&mut hub.context, &alice).await;
    let ix = instruction::withdraw_native(
        &program_id,
        &operator,
        &tickets_vault,
        Some(&tickets_proof),
        &alice,
        2 * TICKET_PRICE,
    )
    .unwrap();
    process(&mut hub.context, &[ix], &[&hub.operator]).await.unwrap();
    assert_eq!(lamports(&mut hub.context, &alice).await, before + 2 * TICKET_PRICE);

    let ix = instruction::force_recover(&program_id, &operator, &raffle).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.operator]).await,
        HubError::WrongRaffleStatus,
    );
}
