use std::collections::BTreeMap;

use super::*;
use crate::ops::parse::parse_stack;

fn key(project: &str, id: &str, raw: &str, format: &str) -> CacheKey {
    CacheKey::compute(project, id, &parse_stack(raw).unwrap(), format)
}

const BASE: &str = "resize@width:200,height:100;rotate@angle:90";

#[test]
fn stable_across_calls() {
    let a = key("p", "i", BASE, "png");
    let b = key("p", "i", BASE, "png");
    assert_eq!(a, b);
    assert_eq!(a.to_hex().len(), 64);
    assert_eq!(a.to_string(), a.to_hex());
}

#[test]
fn every_field_changes_the_key() {
    let base = key("p", "i", BASE, "png");
    let variants = [
        key("q", "i", BASE, "png"),
        key("p", "j", BASE, "png"),
        key("p", "i", BASE, "jpg"),
        key("p", "i", "resize@width:200,height:100;rotate@angle:91", "png"),
        key("p", "i", "resize@width:200,height:100;flatten@angle:90", "png"),
        key("p", "i", "rotate@angle:90;resize@width:200,height:100", "png"),
        key("p", "i", "resize@width:200,height:100", "png"),
        key("p", "i", "resize@width:200,height:100,fit:cover;rotate@angle:90", "png"),
    ];
    for (i, v) in variants.iter().enumerate() {
        assert_ne!(&base, v, "variant {i}");
    }
}

#[test]
fn option_construction_order_is_irrelevant() {
    let mut forward = BTreeMap::new();
    forward.insert("width".to_string(), "200".to_string());
    forward.insert("height".to_string(), "100".to_string());

    let mut backward = BTreeMap::new();
    backward.insert("height".to_string(), "100".to_string());
    backward.insert("width".to_string(), "200".to_string());

    let a = CacheKey::compute(
        "p",
        "i",
        &[Operation {
            kind: "resize".to_string(),
            options: forward,
        }],
        "png",
    );
    let b = CacheKey::compute(
        "p",
        "i",
        &[Operation {
            kind: "resize".to_string(),
            options: backward,
        }],
        "png",
    );
    assert_eq!(a, b);
    assert_eq!(a, key("p", "i", "resize@height:100,width:200", "png"));
}

#[test]
fn field_boundaries_are_unambiguous() {
    assert_ne!(key("ab", "c", "", "png"), key("a", "bc", "", "png"));
    assert_ne!(
        key("p", "i", "crop@left:1", "png"),
        key("p", "i", "crop@le:ft1", "png")
    );
}

#[test]
fn info_key_differs_from_rendition_key() {
    assert_ne!(CacheKey::for_info("p", "i"), key("p", "i", "", "json"));
    assert_eq!(CacheKey::for_info("p", "i"), CacheKey::for_info("p", "i"));
}
