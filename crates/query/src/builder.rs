use cypherlink_client::{Connection, ResultStream};
use cypherlink_core::{BuilderError, Result, Value};
use tracing::debug;

use crate::clause::{
    Clause, Connective, Direction, NodePattern, Operator, Order, PatternKeyword, Predicate,
    RelationshipPattern, ReturnItem,
};
use crate::render::render;

/// Fluent Cypher query builder
///
/// Every method consumes the builder and returns it with one more clause
/// appended. Nothing is validated until [`render`](QueryBuilder::render),
/// so chains never fail halfway; structural problems surface as a
/// [`BuilderError`] and nothing is sent to the database.
///
/// Cloning a builder gives an independent copy, so a shared prefix can be
/// extended in several directions.
///
/// ```
/// use cypherlink_query::QueryBuilder;
///
/// let query = QueryBuilder::match_()
///     .node("Node", "from")
///     .to("Connection")
///     .node("Node", "to")
///     .render()
///     .unwrap();
/// assert_eq!(query, "MATCH (from:Node)-[:Connection]->(to:Node) RETURN from, to");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    clauses: Vec<Clause>,
}

impl QueryBuilder {
    /// A builder with no clauses
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_() -> Self {
        Self::new().and_match()
    }

    pub fn optional_match() -> Self {
        Self::new().and_optional_match()
    }

    pub fn create() -> Self {
        Self::new().and_create()
    }

    pub fn merge() -> Self {
        Self::new().and_merge()
    }

    pub fn and_match(self) -> Self {
        self.push(Clause::Keyword(PatternKeyword::Match))
    }

    pub fn and_optional_match(self) -> Self {
        self.push(Clause::Keyword(PatternKeyword::OptionalMatch))
    }

    pub fn and_create(self) -> Self {
        self.push(Clause::Keyword(PatternKeyword::Create))
    }

    pub fn and_merge(self) -> Self {
        self.push(Clause::Keyword(PatternKeyword::Merge))
    }

    /// Append a node with an optional label and variable
    pub fn node<'a>(
        self,
        label: impl Into<Option<&'a str>>,
        variable: impl Into<Option<&'a str>>,
    ) -> Self {
        let mut pattern = NodePattern::new();
        if let Some(label) = label.into() {
            pattern = pattern.label(label);
        }
        if let Some(variable) = variable.into() {
            pattern = pattern.variable(variable);
        }
        self.node_pattern(pattern)
    }

    pub fn node_pattern(self, pattern: NodePattern) -> Self {
        self.push(Clause::Node(pattern))
    }

    /// Outgoing relationship from the previous node, `-[:TYPE]->`
    pub fn to<'a>(self, rel_type: impl Into<Option<&'a str>>) -> Self {
        self.directed(Direction::Outgoing, rel_type.into())
    }

    /// Incoming relationship into the previous node, `<-[:TYPE]-`
    pub fn from<'a>(self, rel_type: impl Into<Option<&'a str>>) -> Self {
        self.directed(Direction::Incoming, rel_type.into())
    }

    /// Relationship in either direction, `-[:TYPE]-`
    pub fn related<'a>(self, rel_type: impl Into<Option<&'a str>>) -> Self {
        self.directed(Direction::Undirected, rel_type.into())
    }

    pub fn relationship(self, pattern: RelationshipPattern) -> Self {
        self.push(Clause::Relationship(pattern))
    }

    fn directed(self, direction: Direction, rel_type: Option<&str>) -> Self {
        let mut pattern = RelationshipPattern::new(direction);
        if let Some(rel_type) = rel_type {
            pattern = pattern.rel_type(rel_type);
        }
        self.relationship(pattern)
    }

    /// Filter on `item op value`; joins earlier filters with `AND`
    pub fn where_(self, item: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Connective::And, false, value_predicate(item, op, value))
    }

    pub fn and_where(self, item: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Connective::And, false, value_predicate(item, op, value))
    }

    pub fn or_where(self, item: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Connective::Or, false, value_predicate(item, op, value))
    }

    pub fn xor_where(self, item: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Connective::Xor, false, value_predicate(item, op, value))
    }

    pub fn where_not(self, item: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.filter(Connective::And, true, value_predicate(item, op, value))
    }

    /// Filter comparing two items, e.g. `a.age > b.age`
    pub fn where_property(self, item: &str, op: Operator, other: &str) -> Self {
        self.filter(
            Connective::And,
            false,
            Predicate::Property {
                item: item.to_string(),
                op,
                other: other.to_string(),
            },
        )
    }

    pub fn where_null(self, item: &str) -> Self {
        self.filter(
            Connective::And,
            false,
            Predicate::Null {
                item: item.to_string(),
                is_null: true,
            },
        )
    }

    pub fn where_not_null(self, item: &str) -> Self {
        self.filter(
            Connective::And,
            false,
            Predicate::Null {
                item: item.to_string(),
                is_null: false,
            },
        )
    }

    pub fn where_label(self, variable: &str, label: &str) -> Self {
        self.filter(
            Connective::And,
            false,
            Predicate::Label {
                variable: variable.to_string(),
                label: label.to_string(),
            },
        )
    }

    /// Filter with an explicit connective and negation
    pub fn filter(self, connective: Connective, negated: bool, predicate: Predicate) -> Self {
        self.push(Clause::Filter {
            connective,
            negated,
            predicate,
        })
    }

    /// `SET item = value`; consecutive calls share one `SET`
    pub fn set(mut self, item: &str, value: impl Into<Value>) -> Self {
        let assignment = (item.to_string(), value.into());
        if let Some(Clause::Set(assignments)) = self.clauses.last_mut() {
            assignments.push(assignment);
            return self;
        }
        self.push(Clause::Set(vec![assignment]))
    }

    pub fn delete<I, S>(self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::Delete {
            detach: false,
            variables: variables.into_iter().map(Into::into).collect(),
        })
    }

    pub fn detach_delete<I, S>(self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Clause::Delete {
            detach: true,
            variables: variables.into_iter().map(Into::into).collect(),
        })
    }

    /// `RETURN items`; consecutive return calls share one `RETURN`
    pub fn return_<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|item| ReturnItem::Item {
                item: item.into(),
                alias: None,
            })
            .collect();
        self.push_return(items)
    }

    pub fn return_aliased(self, item: &str, alias: &str) -> Self {
        self.push_return(vec![ReturnItem::Item {
            item: item.to_string(),
            alias: Some(alias.to_string()),
        }])
    }

    pub fn return_all(self) -> Self {
        self.push_return(vec![ReturnItem::All])
    }

    fn push_return(mut self, mut items: Vec<ReturnItem>) -> Self {
        if let Some(Clause::Return(existing)) = self.clauses.last_mut() {
            existing.append(&mut items);
            return self;
        }
        self.push(Clause::Return(items))
    }

    /// `ORDER BY item order`; consecutive calls share one `ORDER BY`
    pub fn order_by(mut self, item: &str, order: Order) -> Self {
        let entry = (item.to_string(), order);
        if let Some(Clause::OrderBy(entries)) = self.clauses.last_mut() {
            entries.push(entry);
            return self;
        }
        self.push(Clause::OrderBy(vec![entry]))
    }

    pub fn skip(self, n: u64) -> Self {
        self.push(Clause::Skip(n))
    }

    pub fn limit(self, n: u64) -> Self {
        self.push(Clause::Limit(n))
    }

    /// Node variables in first-use order, without duplicates
    pub fn variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for clause in &self.clauses {
            if let Clause::Node(NodePattern {
                variable: Some(variable),
                ..
            }) = clause
            {
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
        }
        variables
    }

    /// Render the query text without sending it
    pub fn render(&self) -> std::result::Result<String, BuilderError> {
        render(&self.clauses, &self.variables())
    }

    /// Render and run the query, streaming back its rows
    pub async fn execute(&self, connection: &Connection) -> Result<ResultStream> {
        let query = self.render()?;
        debug!("Built query: {}", query);
        connection.execute_and_fetch(&query).await
    }

    /// Render and run the query for its side effects
    pub async fn execute_query(&self, connection: &Connection) -> Result<()> {
        let query = self.render()?;
        debug!("Built query: {}", query);
        connection.execute_query(&query).await
    }

    fn push(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }
}

fn value_predicate(item: &str, op: Operator, value: impl Into<Value>) -> Predicate {
    Predicate::Value {
        item: item.to_string(),
        op,
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(builder: QueryBuilder) -> String {
        builder.render().unwrap()
    }

    #[test]
    fn test_connection_example() {
        let query = QueryBuilder::match_()
            .node("Node", "from")
            .to("Connection")
            .node("Node", "to");
        assert_eq!(
            rendered(query),
            "MATCH (from:Node)-[:Connection]->(to:Node) RETURN from, to"
        );
    }

    #[test]
    fn test_untyped_relationship() {
        let query = QueryBuilder::match_().node(None, "a").to(None).node(None, "b");
        assert_eq!(rendered(query), "MATCH (a)-[]->(b) RETURN a, b");
    }

    #[test]
    fn test_directions() {
        let query = QueryBuilder::match_()
            .node("A", "a")
            .from("IN")
            .node("B", "b")
            .related("ANY")
            .node("C", "c");
        assert_eq!(
            rendered(query),
            "MATCH (a:A)<-[:IN]-(b:B)-[:ANY]-(c:C) RETURN a, b, c"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let query = QueryBuilder::match_()
            .node("Person", "p")
            .where_("p.age", Operator::Gt, 30)
            .order_by("p.age", Order::Desc)
            .limit(5);
        let first = query.render().unwrap();
        assert_eq!(first, query.render().unwrap());
        assert_eq!(
            first,
            "MATCH (p:Person) WHERE p.age > 30 RETURN p ORDER BY p.age DESC LIMIT 5"
        );
    }

    #[test]
    fn test_to_before_node_is_missing_left_endpoint() {
        let err = QueryBuilder::match_()
            .to("Connection")
            .node("Node", "to")
            .render()
            .unwrap_err();
        assert_eq!(err, BuilderError::MissingLeftEndpoint);
    }

    #[test]
    fn test_trailing_relationship_is_closed() {
        let query = QueryBuilder::match_().node("A", "a").to("R");
        assert_eq!(rendered(query), "MATCH (a:A)-[:R]->() RETURN a");
    }

    #[test]
    fn test_adjacent_nodes_are_comma_separated() {
        let query = QueryBuilder::match_().node("A", "a").node("B", "b");
        assert_eq!(rendered(query), "MATCH (a:A), (b:B) RETURN a, b");
    }

    #[test]
    fn test_filters_and_connectives() {
        let query = QueryBuilder::match_()
            .node("Person", "p")
            .where_("p.name", Operator::StartsWith, "A")
            .or_where("p.age", Operator::Lt, 18)
            .xor_where("p.vip", Operator::Eq, true)
            .where_not("p.banned", Operator::Eq, true);
        assert_eq!(
            rendered(query),
            "MATCH (p:Person) WHERE p.name STARTS WITH 'A' OR p.age < 18 \
             XOR p.vip = true AND NOT p.banned = true RETURN p"
        );
    }

    #[test]
    fn test_null_label_and_property_filters() {
        let query = QueryBuilder::match_()
            .node(None, "a")
            .to("KNOWS")
            .node(None, "b")
            .where_label("a", "Admin")
            .and_where("a.id", Operator::In, vec![1, 2])
            .where_property("a.age", Operator::Gt, "b.age")
            .where_null("b.deleted")
            .where_not_null("a.email");
        assert_eq!(
            rendered(query),
            "MATCH (a)-[:KNOWS]->(b) WHERE a:Admin AND a.id IN [1, 2] AND a.age > b.age \
             AND b.deleted IS NULL AND a.email IS NOT NULL RETURN a, b"
        );
    }

    #[test]
    fn test_filter_after_trailing_relationship_closes_pattern() {
        let query = QueryBuilder::match_()
            .node(None, "a")
            .to("R")
            .where_("a.x", Operator::Eq, 1);
        assert_eq!(rendered(query), "MATCH (a)-[:R]->() WHERE a.x = 1 RETURN a");
    }

    #[test]
    fn test_patterns_with_properties() {
        let query = QueryBuilder::create()
            .node_pattern(
                NodePattern::new()
                    .variable("a")
                    .label("Person")
                    .label("User")
                    .property("name", "Ada"),
            )
            .relationship(
                RelationshipPattern::new(Direction::Outgoing)
                    .variable("r")
                    .rel_type("KNOWS")
                    .property("since", 2020),
            )
            .node_pattern(NodePattern::new().property("name", "Bob"));
        assert_eq!(
            rendered(query),
            "CREATE (a:Person:User {name: 'Ada'})-[r:KNOWS {since: 2020}]->({name: 'Bob'})"
        );
    }

    #[test]
    fn test_set_and_delete_skip_implicit_return() {
        let set = QueryBuilder::match_()
            .node("Person", "p")
            .where_("p.name", Operator::Eq, "Ada")
            .set("p.age", 37)
            .set("p.active", true);
        assert_eq!(
            rendered(set),
            "MATCH (p:Person) WHERE p.name = 'Ada' SET p.age = 37, p.active = true"
        );

        let delete = QueryBuilder::match_().node("Tmp", "t").detach_delete(["t"]);
        assert_eq!(rendered(delete), "MATCH (t:Tmp) DETACH DELETE t");
    }

    #[test]
    fn test_explicit_return_with_alias_and_modifiers() {
        let query = QueryBuilder::match_()
            .node("Person", "p")
            .return_(["p.name"])
            .return_aliased("p.age", "years")
            .order_by("p.name", Order::Asc)
            .order_by("years", Order::Desc)
            .skip(10)
            .limit(5);
        assert_eq!(
            rendered(query),
            "MATCH (p:Person) RETURN p.name, p.age AS years ORDER BY p.name ASC, years DESC \
             SKIP 10 LIMIT 5"
        );
    }

    #[test]
    fn test_variables_are_escaped_and_deduplicated() {
        let query = QueryBuilder::match_()
            .node("A", "n")
            .to(None)
            .node("B", "match")
            .and_match()
            .node(None, "n");
        assert_eq!(query.variables(), ["n", "match"]);
        assert_eq!(
            rendered(query),
            "MATCH (n:A)-[]->(`match`:B) MATCH (n) RETURN n, `match`"
        );
    }

    #[test]
    fn test_optional_match_and_merge() {
        let query = QueryBuilder::merge()
            .node("City", "c")
            .and_optional_match()
            .node("Person", "p")
            .to("LIVES_IN")
            .node(None, "c")
            .return_all();
        assert_eq!(
            rendered(query),
            "MERGE (c:City) WITH * OPTIONAL MATCH (p:Person)-[:LIVES_IN]->(c) RETURN *"
        );
    }

    #[test]
    fn test_read_after_write_carries_variables_over() {
        let create = QueryBuilder::create()
            .node("A", "a")
            .and_match()
            .node("B", "b")
            .return_(["a", "b"]);
        assert_eq!(
            rendered(create),
            "CREATE (a:A) WITH * MATCH (b:B) RETURN a, b"
        );

        let set = QueryBuilder::match_()
            .node("A", "a")
            .set("a.x", 1)
            .and_match()
            .node("B", "b");
        assert_eq!(
            rendered(set),
            "MATCH (a:A) SET a.x = 1 WITH * MATCH (b:B) RETURN a, b"
        );

        let anonymous = QueryBuilder::create()
            .node("A", None)
            .and_match()
            .node("B", "b");
        assert_eq!(anonymous.render().unwrap_err(), BuilderError::ReadAfterWrite);
    }

    #[test]
    fn test_empty_item_lists_are_rejected() {
        let base = QueryBuilder::match_().node("A", "a");
        assert_eq!(
            base.clone().return_(Vec::<String>::new()).render().unwrap_err(),
            BuilderError::EmptyItems("RETURN".to_string())
        );
        assert_eq!(
            base.clone().delete(Vec::<String>::new()).render().unwrap_err(),
            BuilderError::EmptyItems("DELETE".to_string())
        );
        assert_eq!(
            base.detach_delete(Vec::<String>::new()).render().unwrap_err(),
            BuilderError::EmptyItems("DETACH DELETE".to_string())
        );
    }

    #[test]
    fn test_modifiers_must_be_ordered_and_unique() {
        let base = QueryBuilder::match_().node("A", "a");
        assert_eq!(
            base.clone().limit(5).skip(10).render().unwrap_err(),
            BuilderError::ModifierOrder("SKIP".to_string(), "LIMIT".to_string())
        );
        assert_eq!(
            base.clone()
                .limit(5)
                .order_by("a.x", Order::Asc)
                .render()
                .unwrap_err(),
            BuilderError::ModifierOrder("ORDER BY".to_string(), "LIMIT".to_string())
        );
        assert_eq!(
            base.clone().limit(1).limit(2).render().unwrap_err(),
            BuilderError::RepeatedModifier("LIMIT".to_string())
        );
        assert_eq!(
            rendered(base.skip(2).limit(3)),
            "MATCH (a:A) RETURN a SKIP 2 LIMIT 3"
        );
    }

    #[test]
    fn test_nested_property_item_is_rejected() {
        let err = QueryBuilder::match_()
            .node("A", "a")
            .return_(["a.b.c"])
            .render()
            .unwrap_err();
        assert_eq!(err, BuilderError::InvalidItem("a.b.c".to_string()));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            QueryBuilder::new().render().unwrap_err(),
            BuilderError::EmptyQuery
        );
        assert_eq!(
            QueryBuilder::match_().render().unwrap_err(),
            BuilderError::EmptyPattern("MATCH".to_string())
        );
        assert_eq!(
            QueryBuilder::new().node("A", "a").render().unwrap_err(),
            BuilderError::PatternOutsideClause
        );
        assert_eq!(
            QueryBuilder::create()
                .node("A", "a")
                .where_("a.x", Operator::Eq, 1)
                .render()
                .unwrap_err(),
            BuilderError::MisplacedFilter
        );
        assert_eq!(
            QueryBuilder::match_()
                .node("A", "a")
                .where_("a.x", Operator::Eq, 1)
                .node("B", "b")
                .render()
                .unwrap_err(),
            BuilderError::PatternOutsideClause
        );
        assert_eq!(
            QueryBuilder::match_()
                .node("A", "a")
                .return_(["a"])
                .set("a.x", 1)
                .render()
                .unwrap_err(),
            BuilderError::ClauseAfterReturn("SET".to_string())
        );
        assert_eq!(
            QueryBuilder::create()
                .node("A", "a")
                .limit(1)
                .render()
                .unwrap_err(),
            BuilderError::MissingReturn("LIMIT".to_string())
        );
        assert_eq!(
            QueryBuilder::match_().node("A", None).render().unwrap_err(),
            BuilderError::NothingToReturn
        );
        assert_eq!(
            QueryBuilder::match_().node("", "a").render().unwrap_err(),
            BuilderError::EmptyIdentifier
        );
        assert!(matches!(
            QueryBuilder::match_()
                .node(None, "a")
                .where_("a.x", Operator::Eq, f64::NAN)
                .render()
                .unwrap_err(),
            BuilderError::UnsupportedLiteral(_)
        ));
    }

    #[test]
    fn test_clones_are_independent() {
        let base = QueryBuilder::match_().node("A", "a");
        let left = base.clone().to("R").node("B", "b");
        let right = base.clone().node("C", "c");

        assert_eq!(base.render().unwrap(), "MATCH (a:A) RETURN a");
        assert_eq!(left.render().unwrap(), "MATCH (a:A)-[:R]->(b:B) RETURN a, b");
        assert_eq!(right.render().unwrap(), "MATCH (a:A), (c:C) RETURN a, c");
    }
}
