use super::Paise;

/// Divide `amount` into `shares` charges that sum to exactly `amount`.
///
/// Every share gets `amount / shares` rounded toward negative infinity, and the
/// leftover paise go one each to the first shares in order. Negative amounts
/// (credits) follow the same rule. Returns an empty list when `shares` is zero.
pub fn split_evenly(amount: Paise, shares: usize) -> Vec<Paise> {
    if shares == 0 {
        return Vec::new();
    }

    let n = shares as i64;
    let base = amount.div_euclid(n);
    let leftover = amount.rem_euclid(n) as usize;

    (0..shares)
        .map(|i| if i < leftover { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact() {
        assert_eq!(split_evenly(1000, 2), vec![500, 500]);
    }

    #[test]
    fn test_split_with_leftover() {
        assert_eq!(split_evenly(1000, 3), vec![334, 333, 333]);
    }

    #[test]
    fn test_split_negative_amount() {
        let shares = split_evenly(-1000, 3);
        assert_eq!(shares, vec![-333, -333, -334]);
        assert_eq!(shares.iter().sum::<Paise>(), -1000);
    }

    #[test]
    fn test_split_smaller_than_share_count() {
        assert_eq!(split_evenly(2, 3), vec![1, 1, 0]);
    }

    #[test]
    fn test_split_no_shares() {
        assert!(split_evenly(1000, 0).is_empty());
    }

    #[test]
    fn test_split_always_sums_to_amount() {
        for amount in [-1001, -7, 0, 1, 99, 100, 12345] {
            for shares in 1..=7 {
                let total: Paise = split_evenly(amount, shares).iter().sum();
                assert_eq!(total, amount, "amount {} over {} shares", amount, shares);
            }
        }
    }
}
