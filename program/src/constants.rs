// PDA seeds
pub const HUB_SEED: &[u8] = b"hub";
pub const FACTORY_SEED: &[u8] = b"factory";
pub const VAULT_SEED: &[u8] = b"vault";
pub const VAULT_MINT_SEED: &[u8] = b"vault_mint";
pub const RAFFLE_SEED: &[u8] = b"raffle";
pub const ENTRY_SEED: &[u8] = b"entry";
pub const REQUESTER_SEED: &[u8] = b"requester";
pub const REQUEST_SEED: &[u8] = b"request";
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";

/// Shares and cuts are whole percentages
pub const TOTAL_PCT: u8 = 100;

/// Price feed values carry 18 decimals
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

// Capacities. Account space is allocated once at these bounds, and the widest
// open, finish and cancel instructions must still fit in one transaction.
pub const MAX_PRIZES: usize = 4;
pub const MAX_WINNERS: usize = 4;
pub const MAX_BENEFICIARIES: usize = 10;
pub const MAX_PARTICIPANT_SLOTS: usize = 100;
pub const MAX_ENDPOINTS: usize = 8;
pub const MAX_RANDOM_WORDS: usize = 16;
pub const MAX_BATCH_RECIPIENTS: usize = 16;

// Callback signatures the randomness provider invokes on fulfillment
pub const INDIVIDUAL_WINNER_CALLBACK: &str = "individual_winner(request_id,data)";
pub const MULTIPLE_WINNERS_CALLBACK: &str = "multiple_winners(request_id,data)";
pub const SINGLE_NUMBER_CALLBACK: &str = "single_number(request_id,data)";
pub const MULTIPLE_NUMBERS_CALLBACK: &str = "multiple_numbers(request_id,data)";
