//! Aligning many pairs with one configuration.
//!
//! Serially, a single aligner is reused for every pair. With the
//! `parallel` feature each rayon worker builds its own aligner on first
//! use and reuses it for the pairs it picks up. Either way the results
//! come back in input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::aligner::{Alignment, WavefrontAligner};
use crate::attributes::AlignerAttributes;
use crate::error::Result;

/// Align `pattern` against `text` with the aligner in `slot`, building it
/// on first use and resizing it to this pair otherwise.
fn align_with(
    slot: &mut Option<WavefrontAligner>,
    attributes: &AlignerAttributes,
    pattern: &[u8],
    text: &[u8],
) -> Result<Alignment> {
    let aligner = match slot.take() {
        Some(mut aligner) => {
            aligner.clear_resize(pattern.len(), text.len())?;
            aligner
        }
        None => WavefrontAligner::new(pattern.len(), text.len(), attributes)?,
    };
    slot.insert(aligner).align(pattern, text).cloned()
}

/// Align every `(pattern, text)` pair, returning one result per pair in
/// input order.
#[cfg(feature = "parallel")]
pub fn align_batch<P, T>(attributes: &AlignerAttributes, pairs: &[(P, T)]) -> Vec<Result<Alignment>>
where
    P: AsRef<[u8]> + Sync,
    T: AsRef<[u8]> + Sync,
{
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("align_batch", pairs = pairs.len(), parallel = true);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();
    pairs
        .par_iter()
        .map_init(
            || None,
            |slot, (pattern, text)| align_with(slot, attributes, pattern.as_ref(), text.as_ref()),
        )
        .collect()
}

/// Align every `(pattern, text)` pair, returning one result per pair in
/// input order.
#[cfg(not(feature = "parallel"))]
pub fn align_batch<P, T>(attributes: &AlignerAttributes, pairs: &[(P, T)]) -> Vec<Result<Alignment>>
where
    P: AsRef<[u8]> + Sync,
    T: AsRef<[u8]> + Sync,
{
    align_batch_serial(attributes, pairs)
}

/// Serial twin of [`align_batch`], always available.
pub fn align_batch_serial<P, T>(
    attributes: &AlignerAttributes,
    pairs: &[(P, T)],
) -> Vec<Result<Alignment>>
where
    P: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    #[cfg(feature = "tracing")]
    let span = tracing::info_span!("align_batch", pairs = pairs.len(), parallel = false);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();
    let mut slot = None;
    pairs
        .iter()
        .map(|(pattern, text)| align_with(&mut slot, attributes, pattern.as_ref(), text.as_ref()))
        .collect()
}
