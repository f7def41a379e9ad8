//! # Batch Demand
//!
//! Sums requested quantities per product across every voucher of a batch.
//!
//! ```text
//! voucher A: [ (7 × 6), (3 × 1) ]
//! voucher B: [ (7 × 6) ]              ──►  { 3: 1, 7: 12 }
//! ```
//!
//! Stock is validated against these sums, never per line. Two vouchers
//! asking for 6 each of a product with 10 on the shelf fail together.
//!
//! The map is a `BTreeMap` so iteration is in ascending product id. The
//! coordinator locks rows in that order.

use std::collections::BTreeMap;

use crate::types::VoucherRequest;

/// Consolidated per-product quantities of a batch, ascending by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDemand(BTreeMap<i64, i64>);

impl BatchDemand {
    /// Collects demand from every line of every request.
    pub fn collect(requests: &[VoucherRequest]) -> Self {
        let mut demand = BTreeMap::new();
        for line in requests.iter().flat_map(|r| r.items.iter()) {
            *demand.entry(line.product_id).or_insert(0) += line.quantity;
        }
        BatchDemand(demand)
    }

    /// Product ids in ascending order.
    pub fn product_ids(&self) -> Vec<i64> {
        self.0.keys().copied().collect()
    }

    /// `(product_id, quantity)` pairs in ascending product id.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().map(|(id, qty)| (*id, *qty))
    }
}

/// Distinct customer ids referenced by a batch, ascending.
pub fn customer_ids(requests: &[VoucherRequest]) -> Vec<i64> {
    let mut ids: Vec<i64> = requests.iter().filter_map(|r| r.customer_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherLineRequest;

    fn request(lines: &[(i64, i64)], customer_id: Option<i64>) -> VoucherRequest {
        VoucherRequest {
            items: lines
                .iter()
                .map(|&(product_id, quantity)| VoucherLineRequest { product_id, quantity })
                .collect(),
            customer_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_sums_across_requests() {
        let demand = BatchDemand::collect(&[
            request(&[(7, 6), (3, 1)], None),
            request(&[(7, 6)], None),
        ]);
        assert_eq!(demand.iter().collect::<Vec<_>>(), vec![(3, 1), (7, 12)]);
    }

    #[test]
    fn test_ids_are_ascending() {
        let demand = BatchDemand::collect(&[request(&[(9, 1), (2, 1), (5, 1), (2, 2)], None)]);
        assert_eq!(demand.product_ids(), vec![2, 5, 9]);
        assert_eq!(demand.iter().collect::<Vec<_>>(), vec![(2, 3), (5, 1), (9, 1)]);
    }

    #[test]
    fn test_customer_ids_deduplicated() {
        let ids = customer_ids(&[
            request(&[(1, 1)], Some(4)),
            request(&[(1, 1)], None),
            request(&[(1, 1)], Some(2)),
            request(&[(1, 1)], Some(4)),
        ]);
        assert_eq!(ids, vec![2, 4]);
    }
}
