use crate::{
    error::FaucetError,
    state::{store::FaucetStore, types::ReservationState},
};

/// Checks that the counter equals the number of confirmed reservations and
/// that every record is stored under its own identifier.
pub fn assert_counter_consistency(store: &FaucetStore) -> Result<(), FaucetError> {
    let state = store.load_state()?;
    let mut confirmed = 0u64;
    for record in store.reservations()? {
        if !store.contains_account(&record.account_id)? {
            return Err(FaucetError::InvariantViolation(format!(
                "record for '{}' is stored under a foreign key",
                record.account_id
            )));
        }
        if record.state == ReservationState::Confirmed {
            confirmed += 1;
        }
    }

    if confirmed != state.num_created_accounts {
        return Err(FaucetError::InvariantViolation(format!(
            "num_created_accounts={} but {} confirmed reservations",
            state.num_created_accounts, confirmed
        )));
    }

    Ok(())
}
