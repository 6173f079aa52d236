//! Deterministic A/B assignment of ticket variants.

use crate::rng::{RandomSource, RngError, SeededRng};
use crate::state::Variant;

/// Number of variants every ticket must offer.
pub const EXPECTED_VARIANT_COUNT: usize = 2;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VariantError {
    #[error("expected exactly {expected} variants, received {received}")]
    InvalidVariantCount { expected: usize, received: usize },

    #[error(transparent)]
    Rng(#[from] RngError),
}

/// Picks one of exactly two variants for `ticket_id`.
///
/// The choice depends only on `seed` and `ticket_id`, so the same player seed
/// always sees the same variant for a given ticket.
pub fn select_variant<'a>(
    seed: &str,
    ticket_id: &str,
    variants: &'a [Variant],
) -> Result<&'a Variant, VariantError> {
    if variants.len() != EXPECTED_VARIANT_COUNT {
        return Err(VariantError::InvalidVariantCount {
            expected: EXPECTED_VARIANT_COUNT,
            received: variants.len(),
        });
    }

    let mut rng = SeededRng::new(&format!("{seed}:{ticket_id}"));
    let index = rng.next_int(0, variants.len() as i64)?;
    variants
        .get(index as usize)
        .ok_or(VariantError::InvalidVariantCount {
            expected: EXPECTED_VARIANT_COUNT,
            received: variants.len(),
        })
}
