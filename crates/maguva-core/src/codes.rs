//! # Business Code Generators
//!
//! Human-facing codes for products, units and orders.
//!
//! ## Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product SKU     NIG-6757                     type prefix + 4 digits    │
//! │  Unit SKU        NIG-6757-M-FF5733-a1b2c3     sku-size-colour-6 hex     │
//! │  Barcode         BC-0123456789                10 digits                 │
//! │  Order number    Xk3P9aQ2mZ                   10 alphanumeric           │
//! │  Tailor order    Qw8Er2Ty                     8 alphanumeric            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generators are random, not sequential. Uniqueness is enforced by the
//! database; callers retry on a unique-constraint collision.

use rand::distributions::{Alphanumeric, Distribution, Uniform};
use rand::Rng;

use crate::types::{ProductType, Size};

/// How many times callers regenerate a code after a collision.
pub const CODE_RETRY_ATTEMPTS: usize = 5;

fn digits<R: Rng>(rng: &mut R, len: usize) -> String {
    let dist = Uniform::from(b'0'..=b'9');
    (0..len).map(|_| dist.sample(rng) as char).collect()
}

/// Product SKU: first three letters of the type plus four digits.
///
/// ## Example
/// ```rust
/// use maguva_core::codes::product_sku;
/// use maguva_core::types::ProductType;
///
/// let sku = product_sku(&mut rand::thread_rng(), ProductType::Nighty);
/// assert!(sku.starts_with("NIG-"));
/// assert_eq!(sku.len(), 8);
/// ```
pub fn product_sku<R: Rng>(rng: &mut R, product_type: ProductType) -> String {
    format!("{}-{}", product_type.sku_prefix(), digits(rng, 4))
}

/// Unit SKU: product SKU, size, colour without `#`, and 6 random hex chars.
pub fn inventory_sku<R: Rng>(
    rng: &mut R,
    product_sku: &str,
    size: Size,
    color_code: &str,
) -> String {
    let color = color_code.trim_start_matches('#');
    let suffix: u32 = rng.gen_range(0..0x0100_0000);
    format!("{}-{}-{}-{:06x}", product_sku, size.code(), color, suffix)
}

/// Unit barcode: `BC-` and ten digits.
pub fn barcode<R: Rng>(rng: &mut R) -> String {
    format!("BC-{}", digits(rng, 10))
}

/// Random alphanumeric order number of the given length.
pub fn order_number<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| Alphanumeric.sample(rng) as char)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ORDER_NUMBER_LEN, TAILOR_ORDER_NUMBER_LEN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_product_sku_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let sku = product_sku(&mut rng, ProductType::Kurti);
        let (prefix, number) = sku.split_once('-').unwrap();
        assert_eq!(prefix, "KUR");
        assert_eq!(number.len(), 4);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_inventory_sku_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let sku = inventory_sku(&mut rng, "NIG-6757", Size::Medium, "#FF5733");
        assert!(sku.starts_with("NIG-6757-M-FF5733-"));
        let suffix = sku.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        let no_size = inventory_sku(&mut rng, "DUP-0001", Size::NoSize, "#000000");
        assert!(no_size.starts_with("DUP-0001--000000-"));
    }

    #[test]
    fn test_barcode_and_order_numbers() {
        let mut rng = StdRng::seed_from_u64(42);
        let code = barcode(&mut rng);
        assert_eq!(code.len(), 13);
        assert!(code[3..].chars().all(|c| c.is_ascii_digit()));

        let order = order_number(&mut rng, ORDER_NUMBER_LEN);
        assert_eq!(order.len(), 10);
        assert!(order.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(order_number(&mut rng, TAILOR_ORDER_NUMBER_LEN).len(), 8);
    }
}
