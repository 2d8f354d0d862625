use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::{REQUESTER_SEED, REQUEST_SEED},
    error::HubError,
    events::{emit, HubEvent},
    hub_processor::load_hub,
    hub_state::Role,
    raffle_state::RequestRef,
    randomness::{decode_words, derive_request_id},
    requester_state::{
        RandomnessRequest, RequestParameters, RequestParams, Requester, RequesterKind,
    },
    utils::{
        assert_address, assert_signer, assert_system_program, create_pda_account, find_request_address,
        find_requester_address, load_borsh, save_borsh,
    },
};

pub fn load_requester(program_id: &Pubkey, info: &AccountInfo) -> Result<Requester, ProgramError> {
    let requester: Requester = load_borsh(info, program_id)?;
    if !requester.is_initialized {
        return Err(ProgramError::UninitializedAccount);
    }
    let (expected, _) = find_requester_address(program_id, requester.kind.seed());
    assert_address(info, &expected)?;
    Ok(requester)
}

pub fn load_request(program_id: &Pubkey, info: &AccountInfo) -> Result<RandomnessRequest, ProgramError> {
    let request: RandomnessRequest = load_borsh(info, program_id)?;
    if !request.is_initialized {
        return Err(HubError::RequestIdNotKnown.into());
    }
    Ok(request)
}

/// Opens a request record for `consumer` and returns where it lives
pub fn issue_request<'info>(
    program_id: &Pubkey,
    requester_info: &AccountInfo<'info>,
    request_info: &AccountInfo<'info>,
    payer_info: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
    consumer: &Pubkey,
    selector: [u8; 4],
    params: RequestParams,
) -> Result<RequestRef, ProgramError> {
    let mut requester = load_requester(program_id, requester_info)?;
    if requester.kind != params.kind() {
        msg!("Requester {:?} cannot serve this request", requester.kind);
        return Err(HubError::InvalidParameter.into());
    }
    let provider = requester.parameters()?.provider;
    let endpoint = *requester.endpoint(&selector)?;
    let callback = requester
        .kind
        .callback_for(&selector)
        .ok_or(HubError::NoEndpointAdded)?;
    if !params.accepts(callback) {
        msg!("Single word callback requested for {} words", params.word_count());
        return Err(HubError::InvalidParameter.into());
    }

    let request_index = requester.request_count;
    let (request_key, request_bump) = find_request_address(program_id, requester_info.key, request_index);
    assert_address(request_info, &request_key)?;
    create_pda_account(
        payer_info,
        request_info,
        system_program_info,
        RandomnessRequest::LEN,
        program_id,
        &[
            REQUEST_SEED,
            requester_info.key.as_ref(),
            &request_index.to_le_bytes(),
            &[request_bump],
        ],
    )?;

    let request_id = derive_request_id(
        requester_info.key,
        consumer,
        &provider,
        request_index,
        &endpoint.endpoint_id,
    );
    let request = RandomnessRequest::new(request_id, *requester_info.key, *consumer, selector, params, request_bump);
    save_borsh(&request, request_info)?;

    requester.request_count = request_index
        .checked_add(1)
        .ok_or(HubError::ArithmeticOverflow)?;
    save_borsh(&requester, requester_info)?;

    let event = match requester.kind {
        RequesterKind::WinnerSelection => HubEvent::NewWinnerRequest { request_id, consumer: *consumer },
        RequesterKind::NumberPicker => HubEvent::NewPickerRequest { request_id, consumer: *consumer },
    };
    emit(event)?;
    msg!("Request {} opened for {}", request_index, consumer);

    Ok(RequestRef { request_id, address: request_key })
}

/// Hands the reduced words to the request's consumer, exactly once
pub fn retrieve_results(
    program_id: &Pubkey,
    request_info: &AccountInfo,
    consumer: &Pubkey,
) -> Result<Vec<u64>, ProgramError> {
    let mut request = load_request(program_id, request_info)?;
    if request.consumer != *consumer {
        msg!("{} is not the consumer of this request", consumer);
        return Err(HubError::AccessDenied.into());
    }
    let results = request.retrieve_results()?;
    save_borsh(&request, request_info)?;

    emit(HubEvent::ResultsDelivered {
        request_id: request.request_id,
        results: results.clone(),
    })?;
    Ok(results)
}

pub struct RequesterProcessor;

impl RequesterProcessor {
    pub fn process_initialize_requester(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        kind: RequesterKind,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let hub_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        assert_system_program(system_program_info)?;
        load_hub(program_id, hub_info)?.require(admin_info.key, Role::Admin)?;

        let (requester_key, bump) = find_requester_address(program_id, kind.seed());
        assert_address(requester_info, &requester_key)?;
        if requester_info.owner == program_id {
            msg!("Requester already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }
        create_pda_account(
            admin_info,
            requester_info,
            system_program_info,
            Requester::LEN,
            program_id,
            &[REQUESTER_SEED, &[kind.seed()], &[bump]],
        )?;
        save_borsh(&Requester::new(kind, *admin_info.key, bump), requester_info)?;

        msg!("Requester {:?} initialized at {}", kind, requester_key);
        Ok(())
    }

    pub fn process_set_request_parameters(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        parameters: RequestParameters,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        let mut requester = load_requester(program_id, requester_info)?;
        if requester.admin != *admin_info.key {
            return Err(HubError::AccessDenied.into());
        }
        if parameters.sponsor_wallet == Pubkey::default() || parameters.provider == Pubkey::default() {
            return Err(HubError::ZeroAddress.into());
        }
        requester.parameters = Some(parameters);
        save_borsh(&requester, requester_info)?;

        emit(HubEvent::RequestParametersSet {
            requester: *requester_info.key,
            provider: parameters.provider,
            sponsor: parameters.sponsor,
            sponsor_wallet: parameters.sponsor_wallet,
        })?;
        msg!("Request parameters set, provider {}", parameters.provider);
        Ok(())
    }

    pub fn process_add_new_endpoint(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        endpoint_id: [u8; 32],
        signature: String,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;

        assert_signer(admin_info)?;
        let mut requester = load_requester(program_id, requester_info)?;
        if requester.admin != *admin_info.key {
            return Err(HubError::AccessDenied.into());
        }
        let selector = requester.add_endpoint(endpoint_id, &signature)?;
        save_borsh(&requester, requester_info)?;

        emit(HubEvent::EndpointAdded {
            requester: *requester_info.key,
            endpoint_id,
            selector,
        })?;
        msg!("Endpoint added for {}", signature);
        Ok(())
    }

    /// Direct requests where the signer is the consumer
    pub fn process_request(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        selector: [u8; 4],
        params: RequestParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let consumer_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(consumer_info)?;
        assert_system_program(system_program_info)?;
        issue_request(
            program_id,
            requester_info,
            request_info,
            consumer_info,
            system_program_info,
            consumer_info.key,
            selector,
            params,
        )?;
        Ok(())
    }

    /// Provider callback, submitted by the sponsor wallet
    pub fn process_fulfill(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: [u8; 32],
        selector: [u8; 4],
        data: Vec<u8>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let fulfiller_info = next_account_info(account_info_iter)?;
        let requester_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;

        assert_signer(fulfiller_info)?;
        let requester = load_requester(program_id, requester_info)?;
        if requester.parameters()?.sponsor_wallet != *fulfiller_info.key {
            msg!("{} is not the sponsor wallet", fulfiller_info.key);
            return Err(HubError::AccessDenied.into());
        }

        let mut request = load_request(program_id, request_info)?;
        if request.requester != *requester_info.key || request.request_id != request_id {
            return Err(HubError::RequestIdNotKnown.into());
        }
        request.assert_pending()?;
        requester.endpoint(&selector)?;
        if request.selector != selector {
            msg!("Callback selector does not match the request");
            return Err(HubError::InvalidParameter.into());
        }
        let callback = requester
            .kind
            .callback_for(&selector)
            .ok_or(HubError::NoEndpointAdded)?;
        let words = decode_words(callback, &data)?;
        let endpoint = requester.before_fulfillment(&mut request, &selector, words)?;
        save_borsh(&request, request_info)?;

        emit(HubEvent::RequestFulfilled {
            request_id,
            endpoint_id: endpoint.endpoint_id,
        })?;
        msg!("Request fulfilled");
        Ok(())
    }

    pub fn process_request_results(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: [u8; 32],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let consumer_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;

        assert_signer(consumer_info)?;
        if load_request(program_id, request_info)?.request_id != request_id {
            return Err(HubError::RequestIdNotKnown.into());
        }
        let results = retrieve_results(program_id, request_info, consumer_info.key)?;
        msg!("Results: {:?}", results);
        Ok(())
    }
}
