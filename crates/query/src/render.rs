//! Turns a clause list into Cypher text

use cypherlink_core::cypher::escape_identifier;
use cypherlink_core::{BuilderError, Value};
use std::collections::BTreeMap;
use strum_macros::Display;

use crate::clause::{
    Clause, Direction, NodePattern, PatternKeyword, Predicate, RelationshipPattern, ReturnItem,
};

type RenderResult<T> = std::result::Result<T, BuilderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Node,
    Relationship,
}

/// The pattern following one MATCH/CREATE/MERGE keyword
struct Segment {
    keyword: PatternKeyword,
    text: String,
    last: Option<Element>,
    filtered: bool,
}

impl Segment {
    fn new(keyword: PatternKeyword) -> Self {
        Self {
            keyword,
            text: String::new(),
            last: None,
            filtered: false,
        }
    }

    fn close_dangling_relationship(&mut self) {
        if self.last == Some(Element::Relationship) {
            self.text.push_str("()");
            self.last = Some(Element::Node);
        }
    }

    fn finish(mut self) -> RenderResult<String> {
        if self.last.is_none() {
            return Err(BuilderError::EmptyPattern(self.keyword.to_string()));
        }
        self.close_dangling_relationship();
        Ok(format!("{} {}", self.keyword, self.text))
    }
}

/// Result modifiers, in the only order Cypher accepts them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
enum Modifier {
    #[strum(serialize = "ORDER BY")]
    OrderBy,
    #[strum(serialize = "SKIP")]
    Skip,
    #[strum(serialize = "LIMIT")]
    Limit,
}

struct Renderer<'a> {
    variables: &'a [String],
    parts: Vec<String>,
    segment: Option<Segment>,
    /// An update clause has been emitted since the last read
    pending_write: bool,
    /// Some pattern element so far binds a variable
    bound: bool,
    returned: bool,
    modifier: Option<Modifier>,
}

/// Renders `clauses` to a single Cypher statement
///
/// `variables` is the ordered, de-duplicated list of node variables used for
/// the implicit `RETURN`.
pub(crate) fn render(clauses: &[Clause], variables: &[String]) -> RenderResult<String> {
    if clauses.is_empty() {
        return Err(BuilderError::EmptyQuery);
    }

    let mut renderer = Renderer {
        variables,
        parts: Vec::new(),
        segment: None,
        pending_write: false,
        bound: false,
        returned: false,
        modifier: None,
    };
    for clause in clauses {
        renderer.clause(clause)?;
    }
    renderer.flush_segment()?;
    if !renderer.returned && !renderer.pending_write {
        renderer.implicit_return()?;
    }
    Ok(renderer.parts.join(" "))
}

impl Renderer<'_> {
    fn clause(&mut self, clause: &Clause) -> RenderResult<()> {
        match clause {
            Clause::Keyword(keyword) => {
                self.not_after_return(&keyword.to_string())?;
                self.flush_segment()?;
                if keyword.writes() {
                    self.pending_write = true;
                } else if self.pending_write {
                    self.carry_over()?;
                }
                self.segment = Some(Segment::new(*keyword));
            }
            Clause::Node(node) => {
                self.not_after_return("pattern")?;
                let segment = self.pattern_segment()?;
                if segment.last == Some(Element::Node) {
                    segment.text.push_str(", ");
                }
                segment.text.push_str(&render_node(node)?);
                segment.last = Some(Element::Node);
                self.bound |= node.variable.is_some();
            }
            Clause::Relationship(relationship) => {
                self.not_after_return("pattern")?;
                let segment = self.pattern_segment()?;
                match segment.last {
                    None => return Err(BuilderError::MissingLeftEndpoint),
                    Some(Element::Relationship) => segment.text.push_str("()"),
                    Some(Element::Node) => {}
                }
                segment.text.push_str(&render_relationship(relationship)?);
                segment.last = Some(Element::Relationship);
                self.bound |= relationship.variable.is_some();
            }
            Clause::Filter {
                connective,
                negated,
                predicate,
            } => {
                self.not_after_return("WHERE")?;
                let segment = match self.segment.as_mut() {
                    Some(segment) if segment.keyword.allows_filter() && segment.last.is_some() => {
                        segment
                    }
                    _ => return Err(BuilderError::MisplacedFilter),
                };
                segment.close_dangling_relationship();
                let keyword = if segment.filtered {
                    connective.to_string()
                } else {
                    "WHERE".to_string()
                };
                let not = if *negated { "NOT " } else { "" };
                segment.text.push_str(&format!(
                    " {keyword} {not}{}",
                    render_predicate(predicate)?
                ));
                segment.filtered = true;
            }
            Clause::Set(assignments) => {
                self.not_after_return("SET")?;
                self.flush_segment()?;
                self.pending_write = true;
                if assignments.is_empty() {
                    return Err(BuilderError::EmptyItems("SET".to_string()));
                }
                let rendered = assignments
                    .iter()
                    .map(|(item, value)| Ok(format!("{} = {}", render_item(item)?, literal(value)?)))
                    .collect::<RenderResult<Vec<_>>>()?;
                self.parts.push(format!("SET {}", rendered.join(", ")));
            }
            Clause::Delete { detach, variables } => {
                let keyword = if *detach { "DETACH DELETE" } else { "DELETE" };
                self.not_after_return(keyword)?;
                self.flush_segment()?;
                self.pending_write = true;
                if variables.is_empty() {
                    return Err(BuilderError::EmptyItems(keyword.to_string()));
                }
                let rendered = variables
                    .iter()
                    .map(|v| escape_identifier(v))
                    .collect::<RenderResult<Vec<_>>>()?;
                self.parts.push(format!("{keyword} {}", rendered.join(", ")));
            }
            Clause::Return(items) => {
                self.not_after_return("RETURN")?;
                self.flush_segment()?;
                if items.is_empty() {
                    return Err(BuilderError::EmptyItems("RETURN".to_string()));
                }
                let rendered = items
                    .iter()
                    .map(render_return_item)
                    .collect::<RenderResult<Vec<_>>>()?;
                self.parts.push(format!("RETURN {}", rendered.join(", ")));
                self.returned = true;
            }
            Clause::OrderBy(items) => {
                self.before_modifier(Modifier::OrderBy)?;
                let rendered = items
                    .iter()
                    .map(|(item, order)| Ok(format!("{} {order}", render_item(item)?)))
                    .collect::<RenderResult<Vec<_>>>()?;
                self.parts.push(format!("ORDER BY {}", rendered.join(", ")));
            }
            Clause::Skip(n) => {
                self.before_modifier(Modifier::Skip)?;
                self.parts.push(format!("SKIP {n}"));
            }
            Clause::Limit(n) => {
                self.before_modifier(Modifier::Limit)?;
                self.parts.push(format!("LIMIT {n}"));
            }
        }
        Ok(())
    }

    fn not_after_return(&self, what: &str) -> RenderResult<()> {
        if self.returned {
            Err(BuilderError::ClauseAfterReturn(what.to_string()))
        } else {
            Ok(())
        }
    }

    /// The open segment, if a pattern element may still be appended to it
    fn pattern_segment(&mut self) -> RenderResult<&mut Segment> {
        match self.segment.as_mut() {
            Some(segment) if !segment.filtered => Ok(segment),
            _ => Err(BuilderError::PatternOutsideClause),
        }
    }

    fn flush_segment(&mut self) -> RenderResult<()> {
        if let Some(segment) = self.segment.take() {
            self.parts.push(segment.finish()?);
        }
        Ok(())
    }

    /// `WITH *` between an update clause and a following read
    fn carry_over(&mut self) -> RenderResult<()> {
        if !self.bound {
            return Err(BuilderError::ReadAfterWrite);
        }
        self.parts.push("WITH *".to_string());
        self.pending_write = false;
        Ok(())
    }

    /// ORDER BY, SKIP and LIMIT need a RETURN; read queries get the implicit one
    fn before_modifier(&mut self, modifier: Modifier) -> RenderResult<()> {
        if let Some(previous) = self.modifier {
            if previous == modifier {
                return Err(BuilderError::RepeatedModifier(modifier.to_string()));
            }
            if previous > modifier {
                return Err(BuilderError::ModifierOrder(
                    modifier.to_string(),
                    previous.to_string(),
                ));
            }
        }
        self.modifier = Some(modifier);

        self.flush_segment()?;
        if self.returned {
            return Ok(());
        }
        if self.pending_write {
            return Err(BuilderError::MissingReturn(modifier.to_string()));
        }
        self.implicit_return()
    }

    fn implicit_return(&mut self) -> RenderResult<()> {
        if self.variables.is_empty() {
            return Err(BuilderError::NothingToReturn);
        }
        let rendered = self
            .variables
            .iter()
            .map(|v| escape_identifier(v))
            .collect::<RenderResult<Vec<_>>>()?;
        self.parts.push(format!("RETURN {}", rendered.join(", ")));
        self.returned = true;
        Ok(())
    }
}

fn literal(value: &Value) -> RenderResult<String> {
    value
        .to_cypher()
        .map_err(|e| BuilderError::UnsupportedLiteral(e.to_string()))
}

fn properties_literal(properties: &BTreeMap<String, Value>) -> RenderResult<Option<String>> {
    if properties.is_empty() {
        return Ok(None);
    }
    literal(&Value::Map(properties.clone())).map(Some)
}

/// `variable` or `variable.property`
fn render_item(item: &str) -> RenderResult<String> {
    let mut parts = item.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(variable), None, _) => escape_identifier(variable),
        (Some(variable), Some(property), None) => Ok(format!(
            "{}.{}",
            escape_identifier(variable)?,
            escape_identifier(property)?
        )),
        _ => Err(BuilderError::InvalidItem(item.to_string())),
    }
}

fn render_node(node: &NodePattern) -> RenderResult<String> {
    let mut inner = String::new();
    if let Some(variable) = &node.variable {
        inner.push_str(&escape_identifier(variable)?);
    }
    for label in &node.labels {
        inner.push(':');
        inner.push_str(&escape_identifier(label)?);
    }
    if let Some(properties) = properties_literal(&node.properties)? {
        if !inner.is_empty() {
            inner.push(' ');
        }
        inner.push_str(&properties);
    }
    Ok(format!("({inner})"))
}

fn render_relationship(relationship: &RelationshipPattern) -> RenderResult<String> {
    let mut inner = String::new();
    if let Some(variable) = &relationship.variable {
        inner.push_str(&escape_identifier(variable)?);
    }
    if let Some(rel_type) = &relationship.rel_type {
        inner.push(':');
        inner.push_str(&escape_identifier(rel_type)?);
    }
    if let Some(properties) = properties_literal(&relationship.properties)? {
        if !inner.is_empty() {
            inner.push(' ');
        }
        inner.push_str(&properties);
    }
    Ok(match relationship.direction {
        Direction::Outgoing => format!("-[{inner}]->"),
        Direction::Incoming => format!("<-[{inner}]-"),
        Direction::Undirected => format!("-[{inner}]-"),
    })
}

fn render_predicate(predicate: &Predicate) -> RenderResult<String> {
    match predicate {
        Predicate::Value { item, op, value } => {
            Ok(format!("{} {op} {}", render_item(item)?, literal(value)?))
        }
        Predicate::Property { item, op, other } => Ok(format!(
            "{} {op} {}",
            render_item(item)?,
            render_item(other)?
        )),
        Predicate::Null { item, is_null } => {
            let test = if *is_null { "IS NULL" } else { "IS NOT NULL" };
            Ok(format!("{} {test}", render_item(item)?))
        }
        Predicate::Label { variable, label } => Ok(format!(
            "{}:{}",
            escape_identifier(variable)?,
            escape_identifier(label)?
        )),
    }
}

fn render_return_item(item: &ReturnItem) -> RenderResult<String> {
    match item {
        ReturnItem::All => Ok("*".to_string()),
        ReturnItem::Item { item, alias: None } => render_item(item),
        ReturnItem::Item {
            item,
            alias: Some(alias),
        } => Ok(format!(
            "{} AS {}",
            render_item(item)?,
            escape_identifier(alias)?
        )),
    }
}
