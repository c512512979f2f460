use cypherlink_core::{Error, Node, Relationship, Result, Value};
use tracing::debug;

use super::MemgraphClient;
use crate::transport::Params;

impl MemgraphClient {
    /// Create `node` and return it as stored, with its id set
    pub async fn create_node(&self, node: &Node) -> Result<Node> {
        let mut statement = format!("CREATE (node{})", node.labels_cypher()?);
        push_clause(&mut statement, node.set_properties_cypher("node")?);
        statement.push_str(" RETURN node;");
        self.fetch_node(&statement, &Params::new()).await
    }

    pub async fn load_node_with_id(&self, id: i64) -> Result<Node> {
        self.fetch_node(
            "MATCH (node) WHERE id(node) = $id RETURN node;",
            &id_param(id),
        )
        .await
    }

    /// Load a node by id, or else by its labels and every non-null property
    pub async fn load_node(&self, node: &Node) -> Result<Node> {
        if let Some(id) = node.id {
            return self.load_node_with_id(id).await;
        }
        let mut statement = format!("MATCH (node{})", node.labels_cypher()?);
        if let Some(predicate) = node.properties_predicate_cypher("node", "AND")? {
            statement.push_str(&format!(" WHERE {predicate}"));
        }
        statement.push_str(" RETURN node;");
        self.fetch_node(&statement, &Params::new()).await
    }

    /// Overwrite the properties of the stored node with the same id
    pub async fn save_node_with_id(&self, node: &Node) -> Result<Node> {
        let id = node
            .id
            .ok_or_else(|| Error::invalid_value("node has no id to save by"))?;
        let mut statement = String::from("MATCH (node) WHERE id(node) = $id");
        push_clause(&mut statement, node.set_properties_cypher("node")?);
        statement.push_str(" RETURN node;");
        self.fetch_node(&statement, &id_param(id)).await
    }

    /// Update by id when the node has one, otherwise create it
    pub async fn save_node(&self, node: &Node) -> Result<Node> {
        match node.id {
            Some(_) => self.save_node_with_id(node).await,
            None => self.create_node(node).await,
        }
    }

    pub async fn create_relationship(&self, relationship: &Relationship) -> Result<Relationship> {
        let mut statement = format!(
            "MATCH (start), (end) WHERE id(start) = $start_id AND id(end) = $end_id \
             CREATE (start)-[relationship{}]->(end)",
            relationship.type_cypher()?
        );
        push_clause(&mut statement, relationship.set_properties_cypher("relationship")?);
        statement.push_str(" RETURN relationship;");

        self.fetch_relationship(&statement, &endpoint_params(relationship))
            .await
    }

    pub async fn load_relationship_with_id(&self, id: i64) -> Result<Relationship> {
        self.fetch_relationship(
            "MATCH ()-[relationship]->() WHERE id(relationship) = $id RETURN relationship;",
            &id_param(id),
        )
        .await
    }

    /// Load a relationship by id, or else by its endpoints, type and every
    /// non-null property
    pub async fn load_relationship(&self, relationship: &Relationship) -> Result<Relationship> {
        if let Some(id) = relationship.id {
            return self.load_relationship_with_id(id).await;
        }
        let mut statement = format!(
            "MATCH (start)-[relationship{}]->(end) \
             WHERE id(start) = $start_id AND id(end) = $end_id",
            relationship.type_cypher()?
        );
        if let Some(predicate) = relationship.properties_predicate_cypher("relationship", "AND")? {
            statement.push_str(&format!(" AND {predicate}"));
        }
        statement.push_str(" RETURN relationship;");
        self.fetch_relationship(&statement, &endpoint_params(relationship))
            .await
    }

    pub async fn save_relationship_with_id(&self, relationship: &Relationship) -> Result<Relationship> {
        let id = relationship
            .id
            .ok_or_else(|| Error::invalid_value("relationship has no id to save by"))?;
        let mut statement =
            String::from("MATCH ()-[relationship]->() WHERE id(relationship) = $id");
        push_clause(&mut statement, relationship.set_properties_cypher("relationship")?);
        statement.push_str(" RETURN relationship;");
        self.fetch_relationship(&statement, &id_param(id)).await
    }

    /// Update by id when the relationship has one, otherwise create it
    pub async fn save_relationship(&self, relationship: &Relationship) -> Result<Relationship> {
        match relationship.id {
            Some(_) => self.save_relationship_with_id(relationship).await,
            None => self.create_relationship(relationship).await,
        }
    }

    async fn fetch_node(&self, statement: &str, params: &Params) -> Result<Node> {
        match self.first_value(statement, params, "node").await? {
            Value::Node(node) => Ok(node),
            other => Err(Error::conversion(format!(
                "expected a node, got {}",
                other.type_name()
            ))),
        }
    }

    async fn fetch_relationship(&self, statement: &str, params: &Params) -> Result<Relationship> {
        match self.first_value(statement, params, "relationship").await? {
            Value::Relationship(relationship) => Ok(relationship),
            other => Err(Error::conversion(format!(
                "expected a relationship, got {}",
                other.type_name()
            ))),
        }
    }

    async fn first_value(&self, statement: &str, params: &Params, column: &str) -> Result<Value> {
        debug!("Loading {} with: {}", column, statement);
        let mut results = self
            .connection()
            .execute_and_fetch_with_params(statement, params)
            .await?;
        let row = results
            .next()
            .await?
            .ok_or_else(|| Error::not_found(format!("no {column} matched: {statement}")))?;
        row.into_map()
            .remove(column)
            .ok_or_else(|| Error::conversion(format!("missing column '{column}'")))
    }
}

fn id_param(id: i64) -> Params {
    Params::from([("id".to_string(), Value::Int(id))])
}

fn endpoint_params(relationship: &Relationship) -> Params {
    Params::from([
        ("start_id".to_string(), Value::Int(relationship.start_node_id)),
        ("end_id".to_string(), Value::Int(relationship.end_node_id)),
    ])
}

fn push_clause(statement: &mut String, clause: Option<String>) {
    if let Some(clause) = clause {
        statement.push(' ');
        statement.push_str(&clause);
    }
}
