//! Binary logarithmic market scoring rule in fixed point.
//!
//! Cost function: `C(q) = b * ln(e^(q_yes/b) + e^(q_no/b))`.
//! Every value carrying a fractional part is scaled by [`SCALE`] (1e9).
//! Probabilities leave this module in parts per million to match
//! `Market::current_yes_probability`.

use anchor_lang::prelude::*;

use crate::errors::MarketError;

pub const SCALE: u128 = 1_000_000_000;
pub const PROBABILITY_SCALE: u64 = 1_000_000;
pub const EVEN_PROBABILITY: u64 = PROBABILITY_SCALE / 2;

const SCALE_I: i128 = SCALE as i128;
const LN_2: i128 = 693_147_181;

// e^60 * SCALE still fits in u128 after the power-of-two shift
const MAX_EXP_ARG: i128 = 60 * SCALE_I;
// below e^-40 the result is smaller than one unit of SCALE
const MIN_EXP_ARG: i128 = -40 * SCALE_I;
const PRICE_EXP_CLAMP: i128 = 40 * SCALE_I;
const SERIES_TERMS: u32 = 40;

/// `e^x` for a scaled `x`.
pub fn exp_fixed(x: i128) -> Result<u128> {
    if x > MAX_EXP_ARG {
        return err!(MarketError::ArithmeticOverflow);
    }
    if x < MIN_EXP_ARG {
        return Ok(0);
    }

    // x = k * ln2 + r with 0 <= r < ln2, so e^x = 2^k * e^r
    let k = x.div_euclid(LN_2);
    let r = x.rem_euclid(LN_2) as u128;

    let mut term = SCALE;
    let mut sum = SCALE;
    for i in 1..=SERIES_TERMS {
        term = term * r / (SCALE * i as u128);
        if term == 0 {
            break;
        }
        sum += term;
    }

    if k >= 0 {
        Ok(sum << k as u32)
    } else {
        Ok(sum >> (-k) as u32)
    }
}

/// Natural log of a scaled, strictly positive `x`.
pub fn ln_fixed(x: u128) -> Result<i128> {
    require!(x > 0, MarketError::ArithmeticOverflow);

    // x = 2^k * y with 1 <= y < 2
    let mut k: i128 = 0;
    let mut y = x;
    while y >= 2 * SCALE {
        y >>= 1;
        k += 1;
    }
    while y < SCALE {
        y <<= 1;
        k -= 1;
    }

    // ln(y) = 2 * atanh((y - 1) / (y + 1)), t < 1/3 converges quickly
    let t = (y - SCALE) * SCALE / (y + SCALE);
    let t_squared = t * t / SCALE;
    let mut power = t;
    let mut sum: u128 = 0;
    let mut n: u128 = 1;
    while power > 0 && n < 2 * SERIES_TERMS as u128 {
        sum += power / n;
        power = power * t_squared / SCALE;
        n += 2;
    }

    Ok(k * LN_2 + 2 * sum as i128)
}

/// Scaled price of the side holding `own` shares against `other`.
fn side_price(own: u64, other: u64, liquidity_param: u64) -> Result<u128> {
    require!(liquidity_param > 0, MarketError::InvalidLiquidity);

    let diff = other as i128 - own as i128;
    let exponent = (diff * SCALE_I / liquidity_param as i128)
        .clamp(-PRICE_EXP_CLAMP, PRICE_EXP_CLAMP);
    let growth = exp_fixed(exponent)?;

    Ok(SCALE * SCALE / (SCALE + growth))
}

/// LMSR probability of YES, in parts per million.
pub fn yes_probability_ppm(yes_shares: u64, no_shares: u64, liquidity_param: u64) -> Result<u64> {
    let price = side_price(yes_shares, no_shares, liquidity_param)?;
    let ppm = price * PROBABILITY_SCALE as u128 / SCALE;
    Ok(u64::try_from(ppm).map_err(|_| MarketError::ArithmeticOverflow)?)
}

/// Shares received for spending `amount` lamports on one side.
///
/// Solves `C(q + delta) - C(q) = amount`, which for two outcomes reduces to
/// `delta = b * ln((e^(amount/b) - (1 - p)) / p)` with `p` the current price
/// of the side being bought.
pub fn shares_for_amount(
    amount: u64,
    is_yes: bool,
    total_yes: u64,
    total_no: u64,
    liquidity_param: u64,
) -> Result<u64> {
    require!(amount > 0, MarketError::InvalidAmount);
    require!(liquidity_param > 0, MarketError::InvalidLiquidity);

    let (own, other) = if is_yes {
        (total_yes, total_no)
    } else {
        (total_no, total_yes)
    };
    let price = side_price(own, other, liquidity_param)?.max(1);

    let amount_over_b = amount as u128 * SCALE / liquidity_param as u128;
    if amount_over_b > MAX_EXP_ARG as u128 {
        return err!(MarketError::ArithmeticOverflow);
    }
    let growth = exp_fixed(amount_over_b as i128)?;

    let numerator = growth
        .checked_sub(SCALE - price)
        .ok_or(MarketError::ArithmeticOverflow)?;
    let ratio = match numerator.checked_mul(SCALE) {
        Some(scaled) => scaled / price,
        None => (numerator / price)
            .checked_mul(SCALE)
            .ok_or(MarketError::ArithmeticOverflow)?,
    };

    let log_ratio = ln_fixed(ratio)?.max(0) as u128;
    let shares = (liquidity_param as u128)
        .checked_mul(log_ratio)
        .ok_or(MarketError::ArithmeticOverflow)?
        / SCALE;

    // truncation can leave a share a hair under one lamport when p is ~1
    let shares = shares.max(amount as u128);

    Ok(u64::try_from(shares).map_err(|_| MarketError::ArithmeticOverflow)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: u64 = 1_000_000_000;

    fn assert_close(actual: i128, expected: i128, tolerance: i128) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(exp_fixed(0).unwrap(), SCALE);
        assert_close(exp_fixed(SCALE_I).unwrap() as i128, 2_718_281_828, 20);
        assert_close(exp_fixed(-SCALE_I).unwrap() as i128, 367_879_441, 20);
        assert_close(exp_fixed(10 * SCALE_I).unwrap() as i128, 22_026_465_794_806, 500_000);
    }

    #[test]
    fn test_exp_bounds() {
        assert_eq!(exp_fixed(MIN_EXP_ARG - 1).unwrap(), 0);
        assert!(exp_fixed(MAX_EXP_ARG).is_ok());
        assert!(exp_fixed(MAX_EXP_ARG + 1).is_err());
    }

    #[test]
    fn test_ln_known_values() {
        assert_close(ln_fixed(SCALE).unwrap(), 0, 2);
        assert_close(ln_fixed(2 * SCALE).unwrap(), LN_2, 5);
        assert_close(ln_fixed(2_718_281_828).unwrap(), SCALE_I, 10);
        assert_close(ln_fixed(SCALE / 10).unwrap(), -2_302_585_093, 50);
        assert!(ln_fixed(0).is_err());
    }

    #[test]
    fn test_ln_inverts_exp() {
        for x in [-5 * SCALE_I, -SCALE_I / 3, SCALE_I / 7, 3 * SCALE_I, 25 * SCALE_I] {
            let roundtrip = ln_fixed(exp_fixed(x).unwrap()).unwrap();
            assert_close(roundtrip, x, 1_000);
        }
    }

    #[test]
    fn test_even_market_prices_at_half() {
        assert_eq!(yes_probability_ppm(0, 0, B).unwrap(), EVEN_PROBABILITY);
        assert_eq!(yes_probability_ppm(5_000, 5_000, B).unwrap(), EVEN_PROBABILITY);
    }

    #[test]
    fn test_probability_follows_shares() {
        let yes_heavy = yes_probability_ppm(2 * B, 0, B).unwrap();
        let no_heavy = yes_probability_ppm(0, 2 * B, B).unwrap();
        // 1 / (1 + e^-2) = 0.8808
        assert_close(yes_heavy as i128, 880_797, 2);
        assert_close(no_heavy as i128, 119_202, 2);
        assert!(yes_probability_ppm(u64::MAX, 0, 1).unwrap() <= PROBABILITY_SCALE);
        assert_eq!(yes_probability_ppm(0, u64::MAX, 1).unwrap(), 0);
    }

    #[test]
    fn test_probability_rejects_zero_liquidity() {
        assert!(yes_probability_ppm(0, 0, 0).is_err());
    }

    #[test]
    fn test_small_bet_at_even_odds_doubles() {
        let shares = shares_for_amount(1_000, true, 0, 0, B).unwrap();
        assert!((1_995..=2_005).contains(&shares), "got {shares}");
    }

    #[test]
    fn test_sides_are_symmetric() {
        let yes = shares_for_amount(250_000_000, true, 0, 0, B).unwrap();
        let no = shares_for_amount(250_000_000, false, 0, 0, B).unwrap();
        assert_eq!(yes, no);
    }

    #[test]
    fn test_shares_never_below_amount() {
        let states = [(0, 0), (10 * B, 0), (0, 10 * B), (40 * B, 0)];
        for (yes, no) in states {
            for amount in [1, 1_000, B, 5 * B] {
                let shares = shares_for_amount(amount, true, yes, no, B).unwrap();
                assert!(shares >= amount, "yes={yes} no={no} amount={amount} shares={shares}");
            }
        }
    }

    #[test]
    fn test_buying_moves_price_toward_bought_side() {
        let shares = shares_for_amount(B / 2, true, 0, 0, B).unwrap();
        assert!(yes_probability_ppm(shares, 0, B).unwrap() > EVEN_PROBABILITY);

        let shares = shares_for_amount(B / 2, false, 0, 0, B).unwrap();
        assert!(yes_probability_ppm(0, shares, B).unwrap() < EVEN_PROBABILITY);
    }

    #[test]
    fn test_cost_of_bought_shares_matches_amount() {
        // C(q') - C(q) recomputed from the cost function
        let amount = 300_000_000;
        let shares = shares_for_amount(amount, true, 0, 0, B).unwrap();
        let x = shares as i128 * SCALE_I / B as i128;
        let cost_after = ln_fixed(exp_fixed(x).unwrap() + SCALE).unwrap();
        let cost_before = ln_fixed(2 * SCALE).unwrap();
        let spent = (cost_after - cost_before) * B as i128 / SCALE_I;
        assert_close(spent, amount as i128, 50);
    }

    #[test]
    fn test_expensive_side_yields_fewer_shares() {
        let cheap = shares_for_amount(B / 10, false, 3 * B, 0, B).unwrap();
        let dear = shares_for_amount(B / 10, true, 3 * B, 0, B).unwrap();
        assert!(cheap > dear);
    }

    #[test]
    fn test_oversized_bet_is_rejected() {
        assert!(shares_for_amount(61 * B, true, 0, 0, B).is_err());
        assert!(shares_for_amount(0, true, 0, 0, B).is_err());
    }
}
