pub mod canonical;
pub mod equivalence;

pub use canonical::{canonicalize, format_round3, round3, CanonicalPayload};
pub use equivalence::{
    compare_canonical, compare_payloads, is_equivalent, token_diff, CategoryDrift,
    EquivalenceReport, TokenCategory,
};
