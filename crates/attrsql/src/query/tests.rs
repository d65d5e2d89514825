use super::{expr, DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use crate::driver::mock::MockDriver;
use crate::entity::{unknown_attribute, Entity};
use crate::error::{OrmError, OrmResult};
use crate::mapping::fixtures::StaticMapper;
use crate::row::Row;
use crate::value::Value;

#[derive(Debug, Default, PartialEq)]
struct Customer {
    id: i64,
    name: String,
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn get(&self, attribute: &str) -> OrmResult<Value> {
        match attribute {
            "id" => Ok(self.id.into()),
            "name" => Ok(self.name.as_str().into()),
            other => Err(unknown_attribute(Self::NAME, other)),
        }
    }

    fn set(&mut self, attribute: &str, value: Value) -> OrmResult<()> {
        match attribute {
            "id" => {
                self.id = value
                    .as_i64()
                    .ok_or_else(|| OrmError::decode("id", "not an integer"))?
            }
            "name" => {
                self.name = value
                    .as_str()
                    .ok_or_else(|| OrmError::decode("name", "not text"))?
                    .to_string()
            }
            other => return Err(unknown_attribute(Self::NAME, other)),
        }
        Ok(())
    }
}

fn customer_row(id: i64, name: &str) -> Row {
    Row::from_pairs([
        ("id", Value::Int(id)),
        ("name", Value::Text(name.to_string())),
    ])
}

fn select<'a>(
    driver: &'a MockDriver,
    mapper: &'a StaticMapper,
    attrs: &[&str],
) -> SelectQuery<'a, MockDriver> {
    SelectQuery::new(driver, mapper, attrs.iter().copied())
}

#[test]
fn insert_maps_attributes_to_columns() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = InsertQuery::new(&driver, &mapper, "Order", ["customerId", "total"])
        .unwrap()
        .values([Value::from(42), Value::from(19.99)]);

    let (sql, args) = query.generate().unwrap();
    assert_eq!(
        sql,
        "INSERT INTO order (order_customer_id, order_total) VALUES (?, ?)"
    );
    assert_eq!(args, [Value::Int(42), Value::Float(19.99)]);
}

#[test]
fn insert_defaults_to_every_non_generated_column() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = InsertQuery::new(&driver, &mapper, "Order", Vec::<String>::new())
        .unwrap()
        .values([Value::from(42), Value::from(19.99)]);

    let (sql, _) = query.generate().unwrap();
    assert_eq!(
        sql,
        "INSERT INTO order (order_customer_id, order_total) VALUES (?, ?)"
    );
}

#[test]
fn insert_renders_one_group_per_values_call() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = InsertQuery::new(&driver, &mapper, "Order", ["customerId", "total"])
        .unwrap()
        .values([Value::from(1), Value::from(2.0)])
        .values([Value::from(3), Value::from(4.0)]);

    let (sql, args) = query.generate().unwrap();
    assert!(sql.ends_with("VALUES (?, ?), (?, ?)"));
    assert_eq!(args.len(), 4);
}

#[test]
fn insert_value_expressions_override_the_placeholder() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = InsertQuery::new(&driver, &mapper, "Customer", ["name"])
        .unwrap()
        .values([expr("LOWER(?)", "ABC")]);

    let (sql, args) = query.generate().unwrap();
    assert_eq!(sql, "INSERT INTO customer (customer_name) VALUES (LOWER(?))");
    assert_eq!(args, [Value::Text("ABC".to_string())]);
}

#[test]
fn insert_without_values_is_rejected() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = InsertQuery::new(&driver, &mapper, "Order", ["customerId"]).unwrap();
    assert!(matches!(
        query.generate().unwrap_err(),
        OrmError::Validation(_)
    ));
}

#[test]
fn insert_rejects_unknown_entities_at_construction() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let err = InsertQuery::new(&driver, &mapper, "Ghost", ["x"]).err().unwrap();
    assert!(err.is_mapping());
}

#[test]
fn star_expands_to_bare_aliases_with_one_class() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, args) = select(&driver, &mapper, &["*"])
        .from("Order")
        .generate()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT order_id AS \"id\", order_customer_id AS \"customerId\", \
         order_total AS \"total\" FROM order"
    );
    assert!(args.is_empty());
}

#[test]
fn star_expands_qualified_with_several_classes() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &["*"])
        .from("Order AS o")
        .from("Customer AS c")
        .generate()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT o.order_id AS \"o.id\", o.order_customer_id AS \"o.customerId\", \
         o.order_total AS \"o.total\", c.customer_id AS \"c.id\", \
         c.customer_name AS \"c.name\" FROM order AS o, customer AS c"
    );
}

#[test]
fn empty_select_list_means_star() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &[])
        .from("Customer")
        .generate()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT customer_id AS \"id\", customer_name AS \"name\" FROM customer"
    );
}

#[test]
fn exact_attributes_are_aliased_to_themselves() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &["customerId"])
        .from("Order")
        .generate()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT order_customer_id AS \"customerId\" FROM order"
    );
}

#[test]
fn explicit_aliases_resolve_the_expression() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &["COUNT(id) AS nb"])
        .from("Order")
        .generate()
        .unwrap();
    assert_eq!(sql, "SELECT COUNT(order_id) AS \"nb\" FROM order");
}

#[test]
fn leading_connector_on_the_first_condition_is_stripped() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, args) = select(&driver, &mapper, &["id"])
        .from("Order")
        .and_where("id = ?", 7)
        .generate()
        .unwrap();

    assert_eq!(sql, "SELECT order_id AS \"id\" FROM order WHERE order_id = ?");
    assert_eq!(args, [Value::Int(7)]);
}

#[test]
fn conditions_chain_with_their_connectors() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, args) = select(&driver, &mapper, &["id"])
        .from("Order")
        .where_cond("id = ?", 7)
        .or_where("total > ?", 5.0)
        .and_where("customerId = ?", 42)
        .generate()
        .unwrap();

    assert!(sql.ends_with(
        "WHERE order_id = ? OR order_total > ? AND order_customer_id = ?"
    ));
    assert_eq!(args, [Value::Int(7), Value::Float(5.0), Value::Int(42)]);
}

#[test]
fn order_by_resolves_and_joins_directions() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &["id"])
        .from("Order")
        .order_by_desc("total")
        .order_by_asc("id")
        .generate()
        .unwrap();
    assert!(sql.ends_with(" ORDER BY order_total DESC, order_id ASC"));
}

#[test]
fn limit_renderings() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();

    let (sql, _) = select(&driver, &mapper, &["id"])
        .from("Order")
        .limit(10)
        .generate()
        .unwrap();
    assert!(sql.ends_with(" LIMIT 10"));

    let (sql, _) = select(&driver, &mapper, &["id"])
        .from("Order")
        .limit_at(10, 5)
        .generate()
        .unwrap();
    assert!(sql.ends_with(" LIMIT 5, 10"));

    // start = 0 falls back to the plain form; later calls overwrite.
    let (sql, _) = select(&driver, &mapper, &["id"])
        .from("Order")
        .limit(10)
        .limit_at(3, 0)
        .generate()
        .unwrap();
    assert!(sql.ends_with(" LIMIT 3"));
}

#[test]
fn joins_render_in_call_order_with_conditions() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, args) = select(&driver, &mapper, &["o.id"])
        .from("Order AS o")
        .where_cond("o.total > ?", 10.0)
        .left_join("Customer AS c")
        .on("o.customerId = c.id", ())
        .and_on("c.name = ?", "bob")
        .generate()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT o.order_id AS \"o.id\" FROM order AS o \
         LEFT JOIN customer AS c ON o.order_customer_id = c.customer_id \
         AND c.customer_name = ? WHERE o.order_total > ?"
    );
    // JOIN placeholders precede WHERE placeholders, so JOIN arguments do
    // too, regardless of the order the caller chained the calls in.
    assert_eq!(args, [Value::Text("bob".to_string()), Value::Float(10.0)]);
}

#[test]
fn natural_join_with_using() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let (sql, _) = select(&driver, &mapper, &["id"])
        .from("Order")
        .natural_left_join("Customer")
        .using_cols("id")
        .generate()
        .unwrap();
    assert!(sql.contains(" NATURAL LEFT JOIN customer USING (customer_id)"));
}

#[test]
fn select_without_from_is_rejected() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    assert!(matches!(
        select(&driver, &mapper, &["id"]).generate().unwrap_err(),
        OrmError::Validation(_)
    ));
}

#[test]
fn generate_is_idempotent() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = select(&driver, &mapper, &["*"])
        .from("Order")
        .where_cond("id = ?", 7)
        .limit(1);
    assert_eq!(query.generate().unwrap(), query.generate().unwrap());
}

#[test]
fn display_appends_the_argument_list() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = select(&driver, &mapper, &["id"])
        .from("Order")
        .where_cond("id = ? AND total > ?", [Value::from(7), Value::from(1.5)]);
    assert_eq!(
        query.to_string(),
        "SELECT order_id AS \"id\" FROM order WHERE order_id = ? AND order_total > ? [ 7, 1.5 ]"
    );
}

#[test]
fn update_orders_set_arguments_before_where_arguments() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = UpdateQuery::new(&driver, &mapper, "Order")
        .and_where("id = ?", 3)
        .set("total", 5.0)
        .set_rule("customerId", 10, "customerId + ?");

    let (sql, args) = query.generate().unwrap();
    assert_eq!(
        sql,
        "UPDATE order SET order_total = ?, \
         order_customer_id = order_customer_id + ? WHERE order_id = ?"
    );
    assert_eq!(args, [Value::Float(5.0), Value::Int(10), Value::Int(3)]);
}

#[test]
fn update_without_set_is_rejected() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = UpdateQuery::new(&driver, &mapper, "Order").where_cond("id = ?", 1);
    assert!(matches!(
        query.generate().unwrap_err(),
        OrmError::Validation(_)
    ));
}

#[test]
fn delete_renders_filters_order_and_limit() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    let query = DeleteQuery::new(&driver, &mapper, "Order")
        .where_cond("id = ?", 3)
        .order_by_desc("total")
        .limit(1);

    let (sql, args) = query.generate().unwrap();
    assert_eq!(
        sql,
        "DELETE FROM order WHERE order_id = ? ORDER BY order_total DESC LIMIT 1"
    );
    assert_eq!(args, [Value::Int(3)]);
}

#[tokio::test]
async fn exec_hands_the_generated_statement_to_the_driver() {
    let driver = MockDriver::default();
    let mapper = StaticMapper::new();
    select(&driver, &mapper, &["id"])
        .from("Order")
        .where_cond("id = ?", 7)
        .exec()
        .await
        .unwrap();

    let executed = driver.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0].0,
        "SELECT order_id AS \"id\" FROM order WHERE order_id = ?"
    );
    assert_eq!(executed[0].1, [Value::Int(7)]);
}

#[tokio::test]
async fn get_objects_reconstructs_one_entity_per_row() {
    let mapper = StaticMapper::new();
    let driver = MockDriver::with_rows(vec![vec![
        customer_row(1, "ada"),
        customer_row(2, "grace"),
    ]]);

    let customers: Vec<Customer> = select(&driver, &mapper, &["*"])
        .from("Customer")
        .get_objects()
        .await
        .unwrap();
    assert_eq!(
        customers,
        [
            Customer {
                id: 1,
                name: "ada".to_string()
            },
            Customer {
                id: 2,
                name: "grace".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn get_objects_by_keys_entities_by_the_index_attribute_text() {
    let mapper = StaticMapper::new();
    let driver = MockDriver::with_rows(vec![vec![
        customer_row(1, "ada"),
        customer_row(2, "grace"),
    ]]);

    let by_id = select(&driver, &mapper, &["*"])
        .from("Customer")
        .get_objects_by::<Customer>("id")
        .await
        .unwrap();
    assert_eq!(by_id.len(), 2);
    assert_eq!(by_id["1"].name, "ada");
    assert_eq!(by_id["2"].name, "grace");
}

#[tokio::test]
async fn get_one_object_requires_exactly_one_row() {
    let mapper = StaticMapper::new();

    let empty = MockDriver::default();
    let err = select(&empty, &mapper, &["*"])
        .from("Customer")
        .get_one_object::<Customer>()
        .await
        .unwrap_err();
    assert!(err.is_bad_count());

    let two = MockDriver::with_rows(vec![vec![
        customer_row(1, "ada"),
        customer_row(2, "grace"),
    ]]);
    let err = select(&two, &mapper, &["*"])
        .from("Customer")
        .get_one_object::<Customer>()
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::BadCount { expected: 1, got: 2 }));

    let one = MockDriver::with_rows(vec![vec![customer_row(1, "ada")]]);
    let customer = select(&one, &mapper, &["*"])
        .from("Customer")
        .get_one_object::<Customer>()
        .await
        .unwrap();
    assert_eq!(
        customer,
        Customer {
            id: 1,
            name: "ada".to_string()
        }
    );
}

#[tokio::test]
async fn get_one_result_requires_exactly_one_row() {
    let mapper = StaticMapper::new();

    let empty = MockDriver::default();
    let err = select(&empty, &mapper, &["id"])
        .from("Order")
        .get_one_result()
        .await
        .unwrap_err();
    assert!(err.is_bad_count());

    let two = MockDriver::with_rows(vec![vec![
        Row::from_pairs([("id", Value::Int(1))]),
        Row::from_pairs([("id", Value::Int(2))]),
    ]]);
    let err = select(&two, &mapper, &["id"])
        .from("Order")
        .get_one_result()
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::BadCount { expected: 1, got: 2 }));

    let one = MockDriver::with_rows(vec![vec![Row::from_pairs([("id", Value::Int(1))])]]);
    let row = select(&one, &mapper, &["id"])
        .from("Order")
        .get_one_result()
        .await
        .unwrap();
    assert_eq!(row.get("id"), Some(&Value::Int(1)));
}
