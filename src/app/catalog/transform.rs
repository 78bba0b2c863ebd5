//! Projection of catalog detail records into product and image records
//!
//! Detail records are loosely shaped JSON. Missing fields are rendered as the
//! catalog's "N/A" placeholder rather than rejected.

use serde_json::Value;

use crate::app::client::value_as_identifier;
use crate::app::models::{
    Attribute, Categories, CategoryPath, ImageRecord, ImageRef, ProductRecord,
};
use crate::constants::catalog::NOT_AVAILABLE;

/// Project one detail record into its product and image records
///
/// Returns `None` for values that are not JSON objects.
pub fn project(detail: &Value) -> Option<(ProductRecord, ImageRecord)> {
    if !detail.is_object() {
        return None;
    }

    let product_name = string_or_na(detail.get("description"));
    let sku = detail
        .get("win")
        .and_then(value_as_identifier)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let attributes = extract_attributes(detail.get("attributes"));

    let product = ProductRecord {
        product_name: product_name.clone(),
        brand_name: string_or_na(detail.pointer("/brand/description")),
        sku: sku.clone(),
        upc_code: detail
            .get("upc")
            .and_then(value_as_identifier)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        global_product_type: attribute_value(&attributes, "Global Product Type"),
        full_description: full_description(detail),
        list_price: format_list_price(detail.get("listPrice"), detail.get("uom")),
        categories: extract_categories(detail.get("categoryBreadcrumb")),
        attributes: attributes.clone(),
        category_number: None,
    };

    let more_images = detail
        .get("moreImages")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .map(|image| ImageRef {
                    url: format_image_url(image.get("url").and_then(Value::as_str)),
                })
                .collect()
        })
        .unwrap_or_default();

    let image = ImageRecord {
        sku,
        product_name,
        image: ImageRef {
            url: format_image_url(detail.pointer("/image/url").and_then(Value::as_str)),
        },
        more_images,
        category_number: attribute_value(&attributes, "Category Number"),
    };

    Some((product, image))
}

/// Prefix protocol-relative URLs with `https:`; missing URLs become "N/A"
pub fn format_image_url(url: Option<&str>) -> String {
    match url {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(url) if url == NOT_AVAILABLE => NOT_AVAILABLE.to_string(),
        Some(url) if url.starts_with("//") => format!("https:{}", url),
        Some(url) => url.to_string(),
    }
}

/// `$<price>/<uom>` with two decimals; zero or missing prices are "N/A"
pub fn format_list_price(price: Option<&Value>, uom: Option<&Value>) -> String {
    let price = match price.and_then(Value::as_f64) {
        Some(price) if price != 0.0 => price,
        _ => return NOT_AVAILABLE.to_string(),
    };

    match uom.and_then(Value::as_str).filter(|u| !u.is_empty()) {
        Some(uom) => format!("${:.2}/{}", price, uom),
        None => format!("${:.2}", price),
    }
}

/// Flatten the category breadcrumb to one entry per top-level category
pub fn extract_categories(breadcrumb: Option<&Value>) -> Categories {
    let entries = match breadcrumb.and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Categories::NotAvailable(NOT_AVAILABLE.to_string()),
    };

    let paths = entries
        .iter()
        .map(|entry| {
            let subs = sub_categories(entry);
            let sub_category = subs
                .first()
                .map(|sub| string_or_na(sub.get("description")))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let deeper_category = subs
                .iter()
                .flat_map(sub_categories)
                .next()
                .map(|deep| string_or_na(deep.get("description")))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            CategoryPath {
                primary_category: string_or_na(entry.get("description")),
                sub_category,
                deeper_category,
            }
        })
        .collect();

    Categories::List(paths)
}

/// Every attribute as a name/value pair
pub fn extract_attributes(attributes: Option<&Value>) -> Vec<Attribute> {
    attributes
        .and_then(Value::as_array)
        .map(|attributes| {
            attributes
                .iter()
                .map(|attr| Attribute {
                    name: plain_string(attr.get("name")),
                    value: plain_string(attr.get("value")),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn sub_categories(entry: &Value) -> &[Value] {
    entry
        .get("subCategories")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn full_description(detail: &Value) -> String {
    if let Some(copy) = detail
        .get("sellingCopy")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return copy.to_string();
    }

    match detail.get("sellingPoints").and_then(Value::as_array) {
        Some(points) => points
            .iter()
            .map(|point| plain_string(Some(point)))
            .collect::<Vec<_>>()
            .join(" "),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn attribute_value(attributes: &[Attribute], name: &str) -> String {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.clone())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn string_or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn plain_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
