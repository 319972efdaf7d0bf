pub mod controller;
pub mod proof_of_work;

pub use controller::{AdmissionController, AdmittedRequest, CreatedAccountIndex};
pub use proof_of_work::{
    find_salt, leading_zero_bits, proof_of_work_difficulty, proof_of_work_message,
};
