//! End-to-end searches: compile, run on the in-memory executor, map
//!
//! Every test runs against the same small catalog of four products and one
//! brand.

use facetq::query::IndexedDocument;
use facetq::{
    Aggregation, ApplicationType, CompilerSettings, FacetError, Filter, FilterType,
    InMemoryExecutor, Query, Repository, SortBy,
};
use serde_json::{json, Value};

fn doc(id: &str, doc_type: &str, source: Value) -> IndexedDocument {
    let source = match source {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    IndexedDocument::new(id, doc_type, source)
}

fn setup_repository() -> Repository<InMemoryExecutor> {
    let documents = vec![
        doc("p1", "product", json!({
            "name": "Smartphone X",
            "category_id": "electronics",
            "color": "red",
            "tags": ["new", "sale"],
            "real_price": 50,
            "brand": { "id": "1", "name": "Acme" },
            "categories": [
                { "id": "electronics", "level": 1 },
                { "id": "phones", "level": 2 }
            ]
        })),
        doc("p2", "product", json!({
            "name": "Laptop Pro",
            "category_id": "electronics",
            "color": "blue",
            "tags": ["new"],
            "real_price": 150,
            "brand": { "id": "2", "name": "Globex" },
            "categories": [
                { "id": "electronics", "level": 1 },
                { "id": "laptops", "level": 2 }
            ]
        })),
        doc("p3", "product", json!({
            "name": "Garden Shears",
            "category_id": "garden",
            "color": "red",
            "tags": ["sale"],
            "real_price": 20,
            "brand": { "id": "2", "name": "Globex" },
            "categories": [
                { "id": "garden", "level": 1 },
                { "id": "tools", "level": 2 }
            ]
        })),
        doc("p4", "product", json!({
            "name": "Smartphone Y",
            "category_id": "electronics",
            "color": "green",
            "tags": [],
            "real_price": 80,
            "brand": { "id": "1", "name": "Acme" },
            "categories": [
                { "id": "electronics", "level": 1 },
                { "id": "phones", "level": 2 }
            ]
        })),
        doc("b1", "brand", json!({ "name": "Acme", "slug": "acme" })),
    ];

    Repository::new(
        InMemoryExecutor::with_documents(documents),
        CompilerSettings::default(),
    )
}

fn field_filter(name: &str, values: &[&str], application_type: ApplicationType) -> Filter {
    Filter::new(name, name, values.iter().copied(), application_type, FilterType::Field)
}

fn field_facet(name: &str, application_type: ApplicationType) -> Aggregation {
    Aggregation::new(name, name, application_type, FilterType::Field)
}

#[tokio::test]
async fn test_match_all_totals_and_entities() {
    let repository = setup_repository();

    let result = repository.search(&Query::match_all()).await.unwrap();

    assert_eq!(result.total_hits, 5);
    assert_eq!(result.total_elements, 5);
    assert_eq!(result.total_items, 4);
    assert_eq!(result.products.len(), 4);
    assert_eq!(result.brands.len(), 1);
    assert_eq!(result.brands[0].slug.as_deref(), Some("acme"));
    assert_eq!((result.min_price, result.max_price), (20, 150));
}

#[tokio::test]
async fn test_counters_sum_to_type_scope_count() {
    let repository = setup_repository();
    let query = Query::match_all()
        .aggregate_by(field_facet("category_id", ApplicationType::AT_LEAST_ONE));

    let result = repository.search(&query).await.unwrap();
    let categories = result.aggregations.aggregation("category_id").unwrap();

    assert_eq!(categories.total_counts(), result.total_items);
    assert_eq!(categories.counter("electronics").unwrap().count, 3);
    assert_eq!(categories.counter("garden").unwrap().count, 1);
    assert!(!categories.is_filtered());
}

#[tokio::test]
async fn test_range_filter_bounds_min_max() {
    let repository = setup_repository();
    let query = Query::match_all().filter_by(Filter::new(
        "price",
        "real_price",
        ["0..100"],
        ApplicationType::AT_LEAST_ONE,
        FilterType::Range,
    ));

    let result = repository.search(&query).await.unwrap();

    assert!(result.min_price >= 0 && result.max_price <= 100);
    assert_eq!((result.min_price, result.max_price), (20, 80));
    assert_eq!(result.total_hits, 3);
}

#[tokio::test]
async fn test_at_least_one_facet_ignores_own_selection() {
    let repository = setup_repository();
    let query = Query::match_all()
        .filter_by(field_filter("color", &["red"], ApplicationType::AT_LEAST_ONE))
        .aggregate_by(field_facet("color", ApplicationType::AT_LEAST_ONE));

    let result = repository.search(&query).await.unwrap();
    let colors = result.aggregations.aggregation("color").unwrap();

    assert_eq!(result.total_hits, 2);
    assert_eq!(colors.counters().len(), 3);
    assert_eq!(colors.counter("red").unwrap().count, 2);
    assert_eq!(colors.counter("blue").unwrap().count, 1);
    assert!(colors.counter("red").unwrap().is_filter_value);
    assert!(!colors.counter("green").unwrap().is_filter_value);
}

#[tokio::test]
async fn test_must_all_facet_keeps_own_selection() {
    let repository = setup_repository();
    let query = Query::match_all()
        .filter_by(field_filter("color", &["red"], ApplicationType::MUST_ALL))
        .aggregate_by(field_facet("color", ApplicationType::MUST_ALL));

    let result = repository.search(&query).await.unwrap();
    let colors = result.aggregations.aggregation("color").unwrap();

    assert_eq!(colors.counters().len(), 1);
    assert_eq!(colors.counter("red").unwrap().count, 2);
}

#[tokio::test]
async fn test_other_filters_still_narrow_facets() {
    let repository = setup_repository();
    let query = Query::match_all()
        .filter_by(field_filter("color", &["red"], ApplicationType::AT_LEAST_ONE))
        .filter_by(field_filter("category_id", &["garden"], ApplicationType::MUST_ALL))
        .aggregate_by(field_facet("color", ApplicationType::AT_LEAST_ONE));

    let result = repository.search(&query).await.unwrap();
    let colors = result.aggregations.aggregation("color").unwrap();

    assert_eq!(colors.total_doc_count, 1);
    assert_eq!(colors.counter("red").unwrap().count, 1);
    assert!(colors.counter("blue").is_none());
}

#[tokio::test]
async fn test_and_or_semantics() {
    let repository = setup_repository();

    let all = Query::match_all()
        .filter_by(field_filter("tags", &["new", "sale"], ApplicationType::MUST_ALL));
    let result = repository.search(&all).await.unwrap();
    assert_eq!(result.total_hits, 1);
    assert_eq!(result.products[0].id, "p1");

    let any = Query::match_all()
        .filter_by(field_filter("tags", &["new", "sale"], ApplicationType::AT_LEAST_ONE));
    let result = repository.search(&any).await.unwrap();
    assert_eq!(result.total_hits, 3);
}

#[tokio::test]
async fn test_empty_filters_are_no_ops() {
    let repository = setup_repository();
    let query = Query::match_all()
        .filter_by(field_filter("color", &[], ApplicationType::MUST_ALL))
        .filter_by(Filter::new(
            "brand",
            "brand.id",
            Vec::<String>::new(),
            ApplicationType::AT_LEAST_ONE,
            FilterType::Nested,
        ))
        .filter_by(Filter::new(
            "price",
            "real_price",
            Vec::<String>::new(),
            ApplicationType::AT_LEAST_ONE,
            FilterType::Range,
        ));

    let result = repository.search(&query).await.unwrap();
    assert_eq!(result.total_hits, 5);
}

#[tokio::test]
async fn test_nested_filter_and_facet() {
    let repository = setup_repository();
    let query = Query::match_all()
        .filter_by(Filter::new(
            "brand",
            "brand.id",
            ["1"],
            ApplicationType::AT_LEAST_ONE,
            FilterType::Nested,
        ))
        .aggregate_by(Aggregation::new(
            "brand",
            "brand.id",
            ApplicationType::AT_LEAST_ONE,
            FilterType::Nested,
        ));

    let result = repository.search(&query).await.unwrap();
    let brands = result.aggregations.aggregation("brand").unwrap();

    assert_eq!(result.total_hits, 2);
    assert_eq!(brands.counter("1").unwrap().count, 2);
    assert_eq!(brands.counter("2").unwrap().count, 2);
}

#[tokio::test]
async fn test_range_facet_buckets() {
    let repository = setup_repository();
    let query = Query::match_all().aggregate_by(
        Aggregation::new("price", "real_price", ApplicationType::AT_LEAST_ONE, FilterType::Range)
            .with_subgroup(["..50", "50..100", "100.."]),
    );

    let result = repository.search(&query).await.unwrap();
    let prices = result.aggregations.aggregation("price").unwrap();

    assert_eq!(prices.counter("..50").unwrap().count, 1);
    assert_eq!(prices.counter("50..100").unwrap().count, 2);
    assert_eq!(prices.counter("100..").unwrap().count, 1);
}

#[tokio::test]
async fn test_level_facet_is_pruned() {
    let repository = setup_repository();
    let levels = ApplicationType::MUST_ALL | ApplicationType::MUST_ALL_WITH_LEVELS;
    let query = Query::match_all()
        .filter_by(Filter::new(
            "categories",
            "categories.id",
            ["electronics"],
            levels,
            FilterType::Nested,
        ))
        .aggregate_by(Aggregation::new(
            "categories",
            "categories.id|categories.level",
            levels,
            FilterType::Nested,
        ));

    let result = repository.search(&query).await.unwrap();
    let categories = result.aggregations.aggregation("categories").unwrap();
    let keys: Vec<&str> = categories.counters().iter().map(|c| c.key.as_str()).collect();

    assert_eq!(keys, vec!["electronics~~1", "phones~~2", "laptops~~2"]);
    let selected = categories.counter("electronics~~1").unwrap();
    assert!(selected.is_filter_value);
    assert_eq!(selected.level, Some(1));
    assert_eq!(selected.value(), "electronics");
}

#[tokio::test]
async fn test_at_least_one_level_facet_hides_unselected_branches() {
    let repository = setup_repository();
    let levels = ApplicationType::AT_LEAST_ONE | ApplicationType::MUST_ALL_WITH_LEVELS;
    let query = Query::match_all()
        .filter_by(Filter::new(
            "categories",
            "categories.id",
            ["electronics"],
            levels,
            FilterType::Nested,
        ))
        .aggregate_by(Aggregation::new(
            "categories",
            "categories.id|categories.level",
            levels,
            FilterType::Nested,
        ));

    let result = repository.search(&query).await.unwrap();
    let categories = result.aggregations.aggregation("categories").unwrap();
    let keys: Vec<&str> = categories.counters().iter().map(|c| c.key.as_str()).collect();

    // tools~~2 sits under the unselected garden branch
    assert_eq!(keys, vec!["electronics~~1", "phones~~2", "laptops~~2"]);
    assert!(categories.counter("tools~~2").is_none());
    assert!(categories.counter("garden~~1").is_none());
}

#[tokio::test]
async fn test_level_facet_without_selection_shows_top_level() {
    let repository = setup_repository();
    let levels = ApplicationType::MUST_ALL | ApplicationType::MUST_ALL_WITH_LEVELS;
    let query = Query::match_all().aggregate_by(Aggregation::new(
        "categories",
        "categories.id|categories.level",
        levels,
        FilterType::Nested,
    ));

    let result = repository.search(&query).await.unwrap();
    let categories = result.aggregations.aggregation("categories").unwrap();

    assert!(categories.counters().iter().all(|c| c.level == Some(1)));
    assert_eq!(categories.counters().len(), 2);
}

#[tokio::test]
async fn test_composite_facet_keys() {
    let repository = setup_repository();
    let query = Query::match_all().aggregate_by(field_facet_composite());

    let result = repository.search(&query).await.unwrap();
    let pairs = result.aggregations.aggregation("category_color").unwrap();

    assert_eq!(pairs.counter("electronics~~red").unwrap().count, 1);
    assert_eq!(pairs.counter("garden~~red").unwrap().values, vec!["garden", "red"]);
    assert_eq!(pairs.counters().len(), 4);
}

fn field_facet_composite() -> Aggregation {
    Aggregation::new(
        "category_color",
        "category_id|color",
        ApplicationType::AT_LEAST_ONE,
        FilterType::Field,
    )
}

#[tokio::test]
async fn test_free_text_and_pagination() {
    let repository = setup_repository();

    let result = repository.search(&Query::create("acme")).await.unwrap();
    assert_eq!(result.total_hits, 3);

    let query = Query::create("smartphone")
        .sort_by(SortBy::asc("real_price"))
        .page(2, 1);
    let result = repository.search(&query).await.unwrap();
    assert_eq!(result.total_hits, 2);
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products[0].id, "p4");
}

#[tokio::test]
async fn test_malformed_range_fails_the_request() {
    let repository = setup_repository();
    let query = Query::match_all().filter_by(Filter::new(
        "price",
        "real_price",
        ["cheap..expensive"],
        ApplicationType::AT_LEAST_ONE,
        FilterType::Range,
    ));

    let err = repository.search(&query).await.unwrap_err();
    assert!(matches!(err, FacetError::MalformedRange { .. }));
}
