//! CSV rendering for the product export.
//!
//! Fields are wrapped in double quotes and otherwise written verbatim:
//! a quote or newline inside a name is not escaped.

use futures_util::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::error::ProductResult;
use crate::models::Product;

pub const CSV_HEADER: &str = "Name,Price,Category\n";
pub const CSV_FILENAME: &str = "products.csv";

pub fn csv_row(product: &Product) -> String {
    format!(
        "\"{}\",\"{}\",\"{}\"\n",
        product.name,
        product.price,
        product.category.as_deref().unwrap_or_default()
    )
}

/// Header line followed by one line per product, as the products arrive.
pub fn csv_lines<S>(products: S) -> BoxStream<'static, ProductResult<String>>
where
    S: Stream<Item = ProductResult<Product>> + Send + 'static,
{
    stream::once(async { Ok(CSV_HEADER.to_string()) })
        .chain(products.map_ok(|product| csv_row(&product)))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use uuid::Uuid;

    fn product(name: &str, price: f64, category: Option<&str>) -> Product {
        CreateProduct {
            name: Some(name.to_string()),
            price: Some(price),
            image: Some("/img.png".to_string()),
            category: category.map(str::to_string),
            ..Default::default()
        }
        .into_product(Uuid::now_v7())
        .unwrap()
    }

    #[test]
    fn test_csv_row_formats_numbers_like_json() {
        assert_eq!(
            csv_row(&product("Lamp", 20.0, Some("lighting"))),
            "\"Lamp\",\"20\",\"lighting\"\n"
        );
        assert_eq!(
            csv_row(&product("Mug", 9.99, None)),
            "\"Mug\",\"9.99\",\"\"\n"
        );
    }

    #[tokio::test]
    async fn test_csv_lines_header_then_rows() {
        let products = vec![
            Ok(product("Lamp", 20.0, None)),
            Ok(product("Mug", 9.5, None)),
        ];
        let lines: Vec<String> = csv_lines(stream::iter(products))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Name,Price,Category\n");
        assert!(lines[1].starts_with("\"Lamp\""));
        assert!(lines[2].starts_with("\"Mug\""));
    }

    #[tokio::test]
    async fn test_csv_lines_empty_catalog_is_header_only() {
        let lines: Vec<String> = csv_lines(stream::empty::<ProductResult<Product>>())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(lines, vec![CSV_HEADER.to_string()]);
    }
}
