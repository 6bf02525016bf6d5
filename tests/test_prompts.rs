//! Tests for the shipped datasets and prompt file.

use std::fs;
use std::path::Path;

use support_bot::knowledge::{FaqIndex, KnowledgeStore, OrderIndex};
use support_bot::session::load_primer;

#[test]
fn test_system_prompt_file_exists() {
    let path = "config/prompts/system.txt";
    assert!(fs::metadata(path).is_ok(), "system.txt prompt file missing");
}

#[test]
fn test_system_prompt_mentions_order_command() {
    let primer = load_primer(Some(Path::new("config/prompts/system.txt")));
    assert!(primer.contains("/order"), "primer should point users at /order");
}

#[test]
fn test_shipped_knowledge_loads() {
    let store = KnowledgeStore::load(Path::new("data/faq.json"), Path::new("data/orders.json"))
        .expect("shipped datasets must load");
    assert!(!store.faq.is_empty());
    assert!(!store.orders.is_empty());
}

#[test]
fn test_shipped_faq_has_password_entry() {
    let faq = FaqIndex::load(Path::new("data/faq.json")).unwrap();
    assert_eq!(faq.lookup("  HOW DO I RESET MY PASSWORD?  "), Some("Visit /reset."));
}

#[test]
fn test_shipped_orders_have_status() {
    let orders = OrderIndex::load(Path::new("data/orders.json")).unwrap();
    let order = orders.get("10002").expect("order 10002 present");
    assert!(!order.status.is_empty());
    assert!(orders.get("12345").is_none());
}
