//! Basic usage of category-tree.
//!
//! Run with `RUST_LOG=category_tree=trace` to see routing decisions.

use category_tree::{Category, CategoryTree, Config, DuplicatePolicy, Error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "category_tree=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    example_routing()?;
    example_duplicates()?;
    example_dynamic_keys();
    Ok(())
}

fn example_routing() -> Result<(), Error> {
    println!("=== Routing by key category ===\n");

    let mut tree: CategoryTree<String> = CategoryTree::new();
    tree.insert(-7i32, "signed".to_string())?;
    tree.insert(7u64, "unsigned".to_string())?;
    tree.insert(0.5f32, "float".to_string())?;
    tree.insert("b", "P1".to_string())?;
    tree.insert("a", "P2".to_string())?;
    tree.insert("c", "P3".to_string())?;

    println!("-7   = {:?}", tree.search(-7i64));
    println!("7u   = {:?}", tree.search(7u8));
    println!("0.5  = {:?}", tree.search(0.5f64));
    println!("\"a\"  = {:?}", tree.search("a"));

    for category in Category::ALL {
        let traversal = tree.traverse(category)?;
        println!("{category}: {} entries", traversal.len());
        for (key, payload) in traversal.iter() {
            println!("  {key} -> {payload}");
        }
    }

    tree.remove("b");
    println!("after removing \"b\": {:?}\n", tree.traverse(Category::String)?.keys());

    let released = tree.destroy();
    println!("released {released} entries\n");
    Ok(())
}

fn example_duplicates() -> Result<(), Error> {
    println!("=== Duplicate keys ===\n");

    let mut shadow: CategoryTree<&str> = CategoryTree::new();
    shadow.insert("k", "first")?;
    shadow.insert("k", "second")?;
    println!("shadow:    search = {:?}, len = {}", shadow.search("k"), shadow.len());

    let config = Config::default().with_duplicates(DuplicatePolicy::Overwrite);
    let mut overwrite: CategoryTree<&str> = CategoryTree::with_config(config);
    overwrite.insert("k", "first")?;
    let old = overwrite.insert("k", "second")?;
    println!(
        "overwrite: search = {:?}, replaced = {:?}, len = {}",
        overwrite.search("k"),
        old,
        overwrite.len()
    );

    let config = Config::default().with_duplicates(DuplicatePolicy::Reject);
    let mut reject: CategoryTree<&str> = CategoryTree::with_config(config);
    reject.insert("k", "first")?;
    println!("reject:    second insert = {:?}\n", reject.insert("k", "second"));
    Ok(())
}

fn example_dynamic_keys() {
    println!("=== Dynamically typed keys ===\n");

    let mut tree: CategoryTree<u32> = CategoryTree::new();
    let keys: Vec<Box<dyn std::any::Any>> = vec![
        Box::new(1i16),
        Box::new(2usize),
        Box::new(3.0f64),
        Box::new(String::from("four")),
        Box::new('5'),
        Box::new(true),
    ];

    for (i, key) in keys.iter().enumerate() {
        match tree.insert_any(&**key, i as u32) {
            Ok(_) => println!("key #{i} stored"),
            Err(err) => println!("key #{i} rejected: {err}"),
        }
    }
    println!("stored {} of {} keys", tree.len(), keys.len());
}
