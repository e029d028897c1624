//! Mapping from storefront products to raw listings.

use trendscout_core::RawListing;

use super::types::{StoreImage, StoreProduct, StoreVariant};

/// Convert one storefront product into a raw listing.
///
/// Nothing is validated here; a product with no image simply yields a raw
/// listing without `image_url`, which ingestion then discards.
#[must_use]
pub fn product_to_raw_listing(product: StoreProduct, origin: &str) -> RawListing {
    let product_url = (!product.handle.trim().is_empty())
        .then(|| format!("{origin}/products/{}", product.handle.trim()));

    let price = default_variant(&product.variants).and_then(|v| v.price.clone());
    let image_url = primary_image(product.image.as_ref(), &product.images).map(|i| i.src.clone());

    RawListing {
        title: Some(product.title),
        price,
        image_url,
        product_url,
        source: None,
        sold_count: None,
        rating: None,
    }
}

/// The position-1 variant, or the first one when no positions are present.
fn default_variant(variants: &[StoreVariant]) -> Option<&StoreVariant> {
    variants
        .iter()
        .find(|v| v.position == Some(1))
        .or_else(|| variants.first())
}

fn primary_image<'a>(
    featured: Option<&'a StoreImage>,
    gallery: &'a [StoreImage],
) -> Option<&'a StoreImage> {
    featured.or_else(|| gallery.iter().min_by_key(|i| i.position.unwrap_or(i32::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i64, price: &str, position: Option<i32>) -> StoreVariant {
        StoreVariant {
            id,
            price: Some(price.to_owned()),
            position,
        }
    }

    fn image(src: &str, position: Option<i32>) -> StoreImage {
        StoreImage {
            src: src.to_owned(),
            position,
        }
    }

    fn product(variants: Vec<StoreVariant>, images: Vec<StoreImage>) -> StoreProduct {
        StoreProduct {
            id: 42,
            title: "Ice Roller for Face".to_owned(),
            handle: "ice-roller-for-face".to_owned(),
            image: None,
            images,
            variants,
        }
    }

    #[test]
    fn builds_product_url_from_origin_and_handle() {
        let raw = product_to_raw_listing(
            product(vec![variant(1, "19.00", Some(1))], vec![]),
            "https://cozyhome.example.com",
        );
        assert_eq!(
            raw.product_url.as_deref(),
            Some("https://cozyhome.example.com/products/ice-roller-for-face")
        );
        assert_eq!(raw.title.as_deref(), Some("Ice Roller for Face"));
    }

    #[test]
    fn price_comes_from_position_one_variant() {
        let raw = product_to_raw_listing(
            product(
                vec![variant(1, "24.00", Some(2)), variant(2, "19.00", Some(1))],
                vec![],
            ),
            "https://s.example.com",
        );
        assert_eq!(raw.price.as_deref(), Some("19.00"));
    }

    #[test]
    fn price_falls_back_to_first_variant() {
        let raw = product_to_raw_listing(
            product(vec![variant(1, "12.50", None), variant(2, "9.99", None)], vec![]),
            "https://s.example.com",
        );
        assert_eq!(raw.price.as_deref(), Some("12.50"));
    }

    #[test]
    fn featured_image_wins_over_gallery() {
        let mut p = product(vec![], vec![image("https://cdn/gallery.jpg", Some(1))]);
        p.image = Some(image("https://cdn/featured.jpg", None));
        let raw = product_to_raw_listing(p, "https://s.example.com");
        assert_eq!(raw.image_url.as_deref(), Some("https://cdn/featured.jpg"));
    }

    #[test]
    fn gallery_image_with_lowest_position_is_used() {
        let raw = product_to_raw_listing(
            product(
                vec![],
                vec![
                    image("https://cdn/2.jpg", Some(2)),
                    image("https://cdn/1.jpg", Some(1)),
                ],
            ),
            "https://s.example.com",
        );
        assert_eq!(raw.image_url.as_deref(), Some("https://cdn/1.jpg"));
    }

    #[test]
    fn missing_media_and_handle_leave_fields_empty() {
        let mut p = product(vec![], vec![]);
        p.handle = String::new();
        let raw = product_to_raw_listing(p, "https://s.example.com");
        assert!(raw.image_url.is_none());
        assert!(raw.product_url.is_none());
        assert!(raw.price.is_none());
    }
}
