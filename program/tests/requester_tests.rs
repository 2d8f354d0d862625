mod common;

use common::*;
use solana_program_test::*;
use solana_sdk::signature::{Keypair, Signer};

use rafflehub::{
    constants::{MULTIPLE_NUMBERS_CALLBACK, SINGLE_NUMBER_CALLBACK},
    error::HubError,
    instruction,
    randomness::Callback,
    requester_state::{RequestState, RequesterKind},
    utils::{find_request_address, find_requester_address},
};

async fn start_with_picker() -> TestHub {
    let mut hub = start(2).await;
    initialize_hub(&mut hub).await;
    initialize_requester(
        &mut hub,
        RequesterKind::NumberPicker,
        &[SINGLE_NUMBER_CALLBACK, MULTIPLE_NUMBERS_CALLBACK],
    )
    .await;
    hub
}

#[tokio::test]
async fn test_number_request_lifecycle() {
    let mut hub = start_with_picker().await;
    let program_id = hub.program_id;
    let consumer = hub.users[0].pubkey();
    let kind = RequesterKind::NumberPicker;
    let selector = kind.callback_selector(Callback::Multiple);
    let (requester, _) = find_requester_address(&program_id, kind.seed());
    let (request, _) = find_request_address(&program_id, &requester, 0);

    let ix = instruction::request_numbers(&program_id, &consumer, 0, selector, 10, 3).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    let pending = fetch_request(&mut hub.context, &request).await;
    assert_eq!(pending.consumer, consumer);
    assert_eq!(pending.state, RequestState::Pending);

    // results exist only after the callback
    let ix = instruction::request_results(&program_id, &consumer, &request, pending.request_id).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::RequestNotFulfilled,
    );

    // only the sponsor wallet may fulfill
    let impostor = Keypair::new();
    let ix = instruction::fulfill_request(
        &program_id,
        &impostor.pubkey(),
        kind,
        &request,
        pending.request_id,
        selector,
        vec![word(1), word(2), word(3)].iter().flatten().copied().collect(),
    )
    .unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&impostor]).await,
        HubError::AccessDenied,
    );

    fulfill(&mut hub, kind, &request, vec![word(13), word(7), word(40)]).await;

    // a second callback for the same id is rejected
    let ix = instruction::fulfill_request(
        &program_id,
        &hub.sponsor_wallet.pubkey(),
        kind,
        &request,
        pending.request_id,
        selector,
        borsh::BorshSerialize::try_to_vec(&vec![word(1), word(2), word(3)]).unwrap(),
    )
    .unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.sponsor_wallet]).await,
        HubError::RequestIdNotKnown,
    );

    // somebody else's results stay sealed
    let ix = instruction::request_results(&program_id, &hub.users[1].pubkey(), &request, pending.request_id).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[1]]).await,
        HubError::AccessDenied,
    );

    let ix = instruction::request_results(&program_id, &consumer, &request, pending.request_id).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    let finished = fetch_request(&mut hub.context, &request).await;
    assert!(finished.is_finished);
    assert_eq!(finished.results, vec![3, 7, 0]);

    let ix = instruction::request_results(&program_id, &consumer, &request, pending.request_id).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::ResultRetrieved,
    );
}

#[tokio::test]
async fn test_request_validation() {
    let mut hub = start_with_picker().await;
    let program_id = hub.program_id;
    let consumer = hub.users[0].pubkey();
    let kind = RequesterKind::NumberPicker;

    // a single word callback cannot carry three numbers
    let single = kind.callback_selector(Callback::Single);
    let ix = instruction::request_numbers(&program_id, &consumer, 0, single, 10, 3).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::InvalidParameter,
    );

    // winner selectors are unknown to the number picker
    let foreign = RequesterKind::WinnerSelection.callback_selector(Callback::Single);
    let ix = instruction::request_numbers(&program_id, &consumer, 0, foreign, 10, 1).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::NoEndpointAdded,
    );

    let ix = instruction::request_numbers(&program_id, &consumer, 0, single, 0, 1).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::InvalidParameter,
    );

    // the winner requester was never initialized
    let ix = instruction::request_winners(&program_id, &consumer, 0, foreign, 1, 5).unwrap();
    assert!(process(&mut hub.context, &[ix], &[&hub.users[0]]).await.is_err());

    let ix = instruction::request_numbers(&program_id, &consumer, 0, single, 6, 1).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    // the request index moved on
    let ix = instruction::request_numbers(&program_id, &consumer, 0, single, 6, 1).unwrap();
    assert!(process(&mut hub.context, &[ix], &[&hub.users[0]]).await.is_err());
    let ix = instruction::request_numbers(&program_id, &consumer, 1, single, 6, 1).unwrap();
    process(&mut hub.context, &[ix], &[&hub.users[0]]).await.unwrap();

    let (requester, _) = find_requester_address(&program_id, kind.seed());
    let (first, _) = find_request_address(&program_id, &requester, 0);
    let (second, _) = find_request_address(&program_id, &requester, 1);
    let first = fetch_request(&mut hub.context, &first).await;
    let second = fetch_request(&mut hub.context, &second).await;
    assert_ne!(first.request_id, second.request_id);
}

#[tokio::test]
async fn test_requester_admin_only() {
    let mut hub = start(1).await;
    initialize_hub(&mut hub).await;
    let program_id = hub.program_id;
    let outsider = hub.users[0].pubkey();

    let ix = instruction::initialize_requester(&program_id, &outsider, RequesterKind::NumberPicker).unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::AccessDenied,
    );

    initialize_requester(&mut hub, RequesterKind::NumberPicker, &[SINGLE_NUMBER_CALLBACK]).await;

    let ix = instruction::add_new_endpoint(
        &program_id,
        &outsider,
        RequesterKind::NumberPicker,
        [9; 32],
        MULTIPLE_NUMBERS_CALLBACK,
    )
    .unwrap();
    assert_hub_error(
        process(&mut hub.context, &[ix], &[&hub.users[0]]).await,
        HubError::AccessDenied,
    );

    let admin = hub.context.payer.pubkey();
    let ix = instruction::add_new_endpoint(
        &program_id,
        &admin,
        RequesterKind::NumberPicker,
        [9; 32],
        SINGLE_NUMBER_CALLBACK,
    )
    .unwrap();
    assert_hub_error(process(&mut hub.context, &[ix], &[]).await, HubError::ParameterAlreadySet);
}
