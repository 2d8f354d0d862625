use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    constants::{
        INDIVIDUAL_WINNER_CALLBACK, MAX_ENDPOINTS, MAX_RANDOM_WORDS, MULTIPLE_NUMBERS_CALLBACK,
        MULTIPLE_WINNERS_CALLBACK, SINGLE_NUMBER_CALLBACK,
    },
    error::HubError,
    randomness::{reduce, selector_of, Callback, RandomWord},
};

/// The two ways random words are interpreted
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequesterKind {
    /// Words become zero-based winner indexes out of a raffle's entries
    WinnerSelection,
    /// Words become plain numbers below a cap
    NumberPicker,
}

impl RequesterKind {
    pub fn seed(&self) -> u8 {
        match self {
            RequesterKind::WinnerSelection => 0,
            RequesterKind::NumberPicker => 1,
        }
    }

    pub fn callback_signature(&self, callback: Callback) -> &'static str {
        match (self, callback) {
            (RequesterKind::WinnerSelection, Callback::Single) => INDIVIDUAL_WINNER_CALLBACK,
            (RequesterKind::WinnerSelection, Callback::Multiple) => MULTIPLE_WINNERS_CALLBACK,
            (RequesterKind::NumberPicker, Callback::Single) => SINGLE_NUMBER_CALLBACK,
            (RequesterKind::NumberPicker, Callback::Multiple) => MULTIPLE_NUMBERS_CALLBACK,
        }
    }

    pub fn callback_selector(&self, callback: Callback) -> [u8; 4] {
        selector_of(self.callback_signature(callback))
    }

    /// Which payload layout a selector stands for, if any
    pub fn callback_for(&self, selector: &[u8; 4]) -> Option<Callback> {
        [Callback::Single, Callback::Multiple]
            .into_iter()
            .find(|callback| self.callback_selector(*callback) == *selector)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub endpoint_id: [u8; 32],
    pub selector: [u8; 4],
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestParameters {
    /// Randomness provider the requests are addressed to
    pub provider: Pubkey,
    pub sponsor: Pubkey,
    /// The only key allowed to submit fulfillments
    pub sponsor_wallet: Pubkey,
}

/// Oracle-facing configuration of one requester kind
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Requester {
    pub is_initialized: bool,
    pub kind: RequesterKind,
    pub admin: Pubkey,
    pub parameters: Option<RequestParameters>,
    /// Ordered registry, looked up by selector
    pub endpoints: Vec<Endpoint>,
    pub request_count: u64,
    pub bump: u8,
}

impl Requester {
    pub const LEN: usize = 1 + 1 + 32 + (1 + 32 * 3) + (4 + MAX_ENDPOINTS * (32 + 4)) + 8 + 1;

    pub fn new(kind: RequesterKind, admin: Pubkey, bump: u8) -> Self {
        Self {
            is_initialized: true,
            kind,
            admin,
            parameters: None,
            endpoints: Vec::new(),
            request_count: 0,
            bump,
        }
    }

    pub fn parameters(&self) -> Result<&RequestParameters, HubError> {
        self.parameters.as_ref().ok_or(HubError::ParameterNotSet)
    }

    /// Registers a callback the provider may invoke and returns its selector
    pub fn add_endpoint(&mut self, endpoint_id: [u8; 32], signature: &str) -> Result<[u8; 4], HubError> {
        let selector = selector_of(signature);
        if self.kind.callback_for(&selector).is_none() {
            return Err(HubError::InvalidParameter);
        }
        if self.endpoint_index(&selector).is_some() {
            return Err(HubError::ParameterAlreadySet);
        }
        if self.endpoints.len() >= MAX_ENDPOINTS {
            return Err(HubError::InvalidParameter);
        }
        self.endpoints.push(Endpoint { endpoint_id, selector });
        Ok(selector)
    }

    pub fn endpoint_index(&self, selector: &[u8; 4]) -> Option<usize> {
        self.endpoints
            .iter()
            .position(|endpoint| endpoint.selector == *selector)
    }

    pub fn endpoint(&self, selector: &[u8; 4]) -> Result<&Endpoint, HubError> {
        self.endpoint_index(selector)
            .map(|index| &self.endpoints[index])
            .ok_or(HubError::NoEndpointAdded)
    }

    /// Marks a pending request fulfilled through the endpoint registered for `selector`
    pub fn before_fulfillment(
        &self,
        request: &mut RandomnessRequest,
        selector: &[u8; 4],
        words: Vec<RandomWord>,
    ) -> Result<Endpoint, HubError> {
        request.assert_pending()?;
        let endpoint = *self.endpoint(selector)?;
        request.fulfill(endpoint.endpoint_id, words)?;
        Ok(endpoint)
    }
}

/// What a request asks for
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestParams {
    Winners { total_entries: u64, total_winners: u64 },
    Numbers { cap: u64, count: u64 },
}

impl RequestParams {
    pub fn winners(total_winners: u64, total_entries: u64) -> Result<Self, HubError> {
        if total_winners == 0 || total_entries == 0 {
            return Err(HubError::InvalidParameter);
        }
        if total_winners > total_entries {
            return Err(HubError::InvalidWinnerNumber);
        }
        if total_winners > MAX_RANDOM_WORDS as u64 {
            return Err(HubError::InvalidParameter);
        }
        Ok(RequestParams::Winners { total_entries, total_winners })
    }

    pub fn numbers(cap: u64, count: u64) -> Result<Self, HubError> {
        if cap == 0 || count == 0 || count > MAX_RANDOM_WORDS as u64 {
            return Err(HubError::InvalidParameter);
        }
        Ok(RequestParams::Numbers { cap, count })
    }

    pub fn word_count(&self) -> u64 {
        match self {
            RequestParams::Winners { total_winners, .. } => *total_winners,
            RequestParams::Numbers { count, .. } => *count,
        }
    }

    pub fn modulus(&self) -> u64 {
        match self {
            RequestParams::Winners { total_entries, .. } => *total_entries,
            RequestParams::Numbers { cap, .. } => *cap,
        }
    }

    pub fn kind(&self) -> RequesterKind {
        match self {
            RequestParams::Winners { .. } => RequesterKind::WinnerSelection,
            RequestParams::Numbers { .. } => RequesterKind::NumberPicker,
        }
    }

    /// A single-word callback can only serve one-word requests
    pub fn accepts(&self, callback: Callback) -> bool {
        callback == Callback::Multiple || self.word_count() == 1
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Fulfilled {
        endpoint_id: [u8; 32],
        words: Vec<RandomWord>,
    },
}

/// One outstanding or answered request
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct RandomnessRequest {
    pub is_initialized: bool,
    pub request_id: [u8; 32],
    pub requester: Pubkey,
    /// Signs `request_results`; a raffle PDA for winner requests issued at close
    pub consumer: Pubkey,
    pub selector: [u8; 4],
    pub params: RequestParams,
    pub state: RequestState,
    pub results: Vec<u64>,
    pub is_finished: bool,
    pub bump: u8,
}

impl RandomnessRequest {
    pub const LEN: usize = 1
        + 32
        + 32
        + 32
        + 4
        + (1 + 16)
        + (1 + 32 + 4 + MAX_RANDOM_WORDS * 32)
        + (4 + MAX_RANDOM_WORDS * 8)
        + 1
        + 1;

    pub fn new(
        request_id: [u8; 32],
        requester: Pubkey,
        consumer: Pubkey,
        selector: [u8; 4],
        params: RequestParams,
        bump: u8,
    ) -> Self {
        Self {
            is_initialized: true,
            request_id,
            requester,
            consumer,
            selector,
            params,
            state: RequestState::Pending,
            results: Vec::new(),
            is_finished: false,
            bump,
        }
    }

    /// Guard for callbacks: only outstanding requests are known
    pub fn assert_pending(&self) -> Result<(), HubError> {
        match self.state {
            RequestState::Pending => Ok(()),
            RequestState::Fulfilled { .. } => Err(HubError::RequestIdNotKnown),
        }
    }

    /// Guard for consumers: results exist only after the callback
    pub fn assert_fulfilled(&self) -> Result<(), HubError> {
        match self.state {
            RequestState::Fulfilled { .. } => Ok(()),
            RequestState::Pending => Err(HubError::RequestNotFulfilled),
        }
    }

    fn fulfill(&mut self, endpoint_id: [u8; 32], words: Vec<RandomWord>) -> Result<(), HubError> {
        if words.len() as u64 != self.params.word_count() {
            return Err(HubError::InvalidParameter);
        }
        self.state = RequestState::Fulfilled { endpoint_id, words };
        Ok(())
    }

    /// Reduces the delivered words once. A second call fails without touching state.
    pub fn retrieve_results(&mut self) -> Result<Vec<u64>, HubError> {
        if self.is_finished {
            return Err(HubError::ResultRetrieved);
        }
        let modulus = self.params.modulus();
        let results = match &self.state {
            RequestState::Pending => return Err(HubError::RequestNotFulfilled),
            RequestState::Fulfilled { words, .. } => words
                .iter()
                .map(|word| reduce(word, modulus))
                .collect::<Result<Vec<u64>, HubError>>()?,
        };
        self.results = results.clone();
        self.is_finished = true;
        Ok(results)
    }
}
