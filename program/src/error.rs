use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

/// Errors that may be returned by the RaffleHub program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    // Authorization
    /// Caller does not operate the vault
    #[error("Caller is not the vault owner")]
    CallerNotOwner,
    /// Only the raffle creator can perform this action
    #[error("Caller is not the raffle creator")]
    CallerNotCreator,
    /// Caller lacks the hub role required for this action
    #[error("Access denied")]
    AccessDenied,

    // Invalid parameters
    #[error("Invalid parameter")]
    InvalidParameter,
    #[error("Invalid array length")]
    InvalidArrayLength,
    #[error("Batch length mismatch")]
    BatchLengthMismatch,
    #[error("Invalid winner number")]
    InvalidWinnerNumber,
    #[error("Zero address")]
    ZeroAddress,

    // State conflicts
    #[error("Parameter already set")]
    ParameterAlreadySet,
    #[error("Parameter not set")]
    ParameterNotSet,
    #[error("Vault withdraws already enabled")]
    VaultWithdrawsEnabled,
    #[error("Vault withdraws are disabled")]
    WithdrawsDisabled,
    #[error("Raffle is in the wrong status for this action")]
    WrongRaffleStatus,
    #[error("Raffle has not started yet")]
    RaffleNotStarted,
    #[error("Raffle has already ended")]
    RaffleEnded,
    #[error("Raffle has not ended yet")]
    RaffleNotEnded,
    #[error("Raffle participant list is full")]
    RaffleFull,
    #[error("Raffle pot is below the required balance")]
    RequiredBalanceNotMet,
    /// The refund or prize was already paid out
    #[error("Nothing left to claim")]
    NothingToClaim,

    // Randomness protocol
    #[error("Request id not known")]
    RequestIdNotKnown,
    #[error("Request not fulfilled")]
    RequestNotFulfilled,
    #[error("No endpoint added for selector")]
    NoEndpointAdded,
    #[error("Results already retrieved")]
    ResultRetrieved,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Insufficient funds for operation")]
    InsufficientFunds,
    #[error("Invalid price feed")]
    InvalidPriceFeed,
}

impl From<HubError> for ProgramError {
    fn from(e: HubError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for HubError {
    fn type_of() -> &'static str {
        "RaffleHub Error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_declaration_order() {
        assert_eq!(ProgramError::from(HubError::InvalidInstructionData), ProgramError::Custom(0));
        assert_eq!(ProgramError::from(HubError::CallerNotOwner), ProgramError::Custom(1));
        assert_eq!(
            ProgramError::from(HubError::ResultRetrieved),
            ProgramError::Custom(HubError::ResultRetrieved as u32)
        );
    }
}
