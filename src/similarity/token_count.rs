//! Token-count distance: a cheap, order-insensitive secondary score

use crate::tokenizer::CanonicalStream;

/// Euclidean distance between the L2-normalized symbol histograms of two
/// streams, scaled into `[0, 1]`.
///
/// Two non-empty streams with the same symbol proportions score 0; streams
/// sharing no symbol score 1. An empty stream is at distance 0 from another
/// empty stream and 1 from anything else.
pub fn token_count_distance(a: &CanonicalStream, b: &CanonicalStream) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 0.0,
        (true, false) | (false, true) => return 1.0,
        _ => {}
    }

    let ha = a.histogram();
    let hb = b.histogram();
    let norm = |h: &ahash::AHashMap<u32, usize>| {
        h.values()
            .map(|&c| (c as f64) * (c as f64))
            .sum::<f64>()
            .sqrt()
    };
    let na = norm(&ha);
    let nb = norm(&hb);

    let mut sum = 0.0;
    for (symbol, &ca) in &ha {
        let cb = hb.get(symbol).copied().unwrap_or(0);
        let d = ca as f64 / na - cb as f64 / nb;
        sum += d * d;
    }
    for (symbol, &cb) in &hb {
        if !ha.contains_key(symbol) {
            let d = cb as f64 / nb;
            sum += d * d;
        }
    }

    (sum.sqrt() / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
}
