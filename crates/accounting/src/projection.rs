//! Nested JSON view of a (sub)tree with its computed figures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::balance::Totals;
use crate::node::{AccountTree, NodeId};

/// Node attributes that can be selected for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeField {
    Code,
    Name,
    Note,
    InitialDebit,
    InitialCredit,
    Level,
}

impl NodeField {
    pub const ALL: [NodeField; 6] = [
        NodeField::Code,
        NodeField::Name,
        NodeField::Note,
        NodeField::InitialDebit,
        NodeField::InitialCredit,
        NodeField::Level,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NodeField::Code => "code",
            NodeField::Name => "name",
            NodeField::Note => "note",
            NodeField::InitialDebit => "initial_debit",
            NodeField::InitialCredit => "initial_credit",
            NodeField::Level => "level",
        }
    }
}

/// Serializes nodes with `balance`, `summary` and `children`, reading
/// precomputed [`Totals`] so aggregation is not run again.
#[derive(Debug, Clone)]
pub struct JsonProjector<'a> {
    tree: &'a AccountTree,
    totals: &'a Totals,
    fields: Vec<NodeField>,
}

impl<'a> JsonProjector<'a> {
    /// Projects all fields.
    pub fn new(tree: &'a AccountTree, totals: &'a Totals) -> Self {
        Self {
            tree,
            totals,
            fields: NodeField::ALL.to_vec(),
        }
    }

    /// Restricts output to `fields` (figures and children are always present).
    pub fn fields(mut self, fields: &[NodeField]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn project(&self, id: NodeId) -> Value {
        let node = self.tree.node(id);
        let mut obj = Map::new();

        for field in &self.fields {
            let value = match field {
                NodeField::Code => json!(node.code()),
                NodeField::Name => json!(node.name()),
                NodeField::Note => json!(node.note()),
                NodeField::InitialDebit => json!(node.initial_debit()),
                NodeField::InitialCredit => json!(node.initial_credit()),
                NodeField::Level => json!(self.tree.level(id)),
            };
            obj.insert(field.key().to_string(), value);
        }

        obj.insert("balance".to_string(), json!(self.totals.balance(id)));
        obj.insert("summary".to_string(), json!(self.totals.summary(id)));
        obj.insert(
            "children".to_string(),
            Value::Array(node.children().iter().map(|c| self.project(*c)).collect()),
        );
        Value::Object(obj)
    }
}
