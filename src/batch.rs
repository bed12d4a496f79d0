//! Decode many independent messages in parallel.

use rayon::prelude::*;

use crate::protobuf::{DecodeError, DecodePolicy, ParseOptions, Parser};
use crate::threading::thread_pool;

/// Decode each buffer in `inputs` with a fresh policy from `make_policy`.
///
/// Buffers are decoded in parallel using the pool returned by
/// [`thread_pool`]. Each message is decoded by a single thread. The result
/// contains one entry per input, in input order, holding either the policy
/// with the values it accumulated or the error which stopped decoding. A
/// failure to decode one input does not affect the others.
///
/// ```
/// use protoscan::batch::parse_batch;
/// use protoscan::policies::FieldCollector;
/// use protoscan::protobuf::ParseOptions;
///
/// let inputs = [vec![0x08, 0x01], vec![0x08], vec![0x10, 0x02]];
/// let results = parse_batch(&inputs, ParseOptions::default(), FieldCollector::root_fields);
///
/// assert_eq!(results.len(), 3);
/// assert_eq!(results[0].as_ref().unwrap().fields()[0].as_u64(), Some(1));
/// assert!(results[1].is_err());
/// assert_eq!(results[2].as_ref().unwrap().fields()[0].number(), 2);
/// ```
pub fn parse_batch<B, P, F>(
    inputs: &[B],
    options: ParseOptions,
    make_policy: F,
) -> Vec<Result<P, DecodeError>>
where
    B: AsRef<[u8]> + Sync,
    P: DecodePolicy + Send,
    F: Fn() -> P + Sync,
{
    let results: Vec<Result<P, DecodeError>> = thread_pool().run(|| {
        inputs
            .par_iter()
            .map(|buf| -> Result<P, DecodeError> {
                let mut policy = make_policy();
                Parser::with_options(buf.as_ref(), options).parse(&mut policy)?;
                Ok(policy)
            })
            .collect()
    });

    let failed = results.iter().filter(|result| result.is_err()).count();
    tracing::debug!(inputs = inputs.len(), failed, "batch decode complete");

    results
}
