use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::trace;

use crate::error::ReferenceError;

/// Operators sharing one binding tightness: function name → infix symbol.
pub type OperatorGroup = IndexMap<String, String>;

/// Where a custom operator goes, relative to a group holding an existing
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// Join the group containing the symbol (same precedence)
    At(String),
    /// New group binding tighter than the group containing the symbol
    Before(String),
    /// New group binding looser than the group containing the symbol
    After(String),
}

impl Insertion {
    pub fn anchor(&self) -> &str {
        match self {
            Insertion::At(symbol) | Insertion::Before(symbol) | Insertion::After(symbol) => symbol,
        }
    }
}

/// An operator added on top of the builtin table.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{CustomOperator, OperatorTable};
///
/// // `.a ?? .b` as a new precedence level just looser than `|`
/// let coalesce = CustomOperator::after("coalesce", "??", "|");
/// let table = OperatorTable::builtin().extend(&[coalesce]).unwrap();
///
/// assert_eq!(table.symbol("coalesce"), Some("??"));
/// assert_eq!(table.precedence("coalesce"), Some(table.precedence("pipe").unwrap() + 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomOperator {
    /// Function the operator calls
    pub name: String,
    /// Infix spelling
    pub symbol: String,
    pub insertion: Insertion,
    /// Repeated use collapses into one call with many arguments
    pub vararg: bool,
    /// Repeated use nests left to right instead of being rejected
    pub left_associative: bool,
}

impl CustomOperator {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, insertion: Insertion) -> Self {
        CustomOperator {
            name: name.into(),
            symbol: symbol.into(),
            insertion,
            vararg: false,
            left_associative: false,
        }
    }

    pub fn at(name: impl Into<String>, symbol: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self::new(name, symbol, Insertion::At(anchor.into()))
    }

    pub fn before(
        name: impl Into<String>,
        symbol: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        Self::new(name, symbol, Insertion::Before(anchor.into()))
    }

    pub fn after(
        name: impl Into<String>,
        symbol: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        Self::new(name, symbol, Insertion::After(anchor.into()))
    }

    pub fn vararg(mut self) -> Self {
        self.vararg = true;
        self
    }

    pub fn left_associative(mut self) -> Self {
        self.left_associative = true;
        self
    }

    /// Reads a list of descriptors in their JSON form:
    ///
    /// ```json
    /// [{ "name": "coalesce", "op": "??", "after": "|", "vararg": true }]
    /// ```
    ///
    /// Anything other than a list fails with
    /// [`ReferenceError::InvalidOperators`].
    pub fn list_from_json(json: &serde_json::Value) -> Result<Vec<CustomOperator>, ReferenceError> {
        let items = json.as_array().ok_or(ReferenceError::InvalidOperators)?;

        items
            .iter()
            .map(|item| {
                let raw: RawOperator = serde_json::from_value(item.clone())
                    .map_err(|e| ReferenceError::MalformedOperator(e.to_string()))?;
                raw.try_into()
            })
            .collect()
    }
}

/// JSON shape of a custom operator descriptor
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOperator {
    name: String,
    #[serde(alias = "symbol")]
    op: String,
    at: Option<String>,
    before: Option<String>,
    after: Option<String>,
    #[serde(default)]
    vararg: bool,
    #[serde(default, alias = "leftAssociative")]
    left_associative: bool,
}

impl TryFrom<RawOperator> for CustomOperator {
    type Error = ReferenceError;

    fn try_from(raw: RawOperator) -> Result<Self, Self::Error> {
        let insertion = match (raw.at, raw.before, raw.after) {
            (Some(anchor), None, None) => Insertion::At(anchor),
            (None, Some(anchor), None) => Insertion::Before(anchor),
            (None, None, Some(anchor)) => Insertion::After(anchor),
            _ => {
                return Err(ReferenceError::MalformedOperator(format!(
                    "operator \"{}\" needs exactly one of \"at\", \"before\" or \"after\"",
                    raw.name
                )));
            }
        };

        Ok(CustomOperator {
            name: raw.name,
            symbol: raw.op,
            insertion,
            vararg: raw.vararg,
            left_associative: raw.left_associative,
        })
    }
}

/// Ordered precedence groups plus the derived vararg and left-associative
/// name sets.
///
/// Groups are stored tightest first: index 0 is `pow`, the last group is
/// `pipe` unless custom operators were added after it. The table is a plain
/// value; extending it returns a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorTable {
    groups: Vec<OperatorGroup>,
    vararg: HashSet<String>,
    left_associative: HashSet<String>,
}

const BUILTIN_GROUPS: &[&[(&str, &str)]] = &[
    &[("pow", "^")],
    &[("multiply", "*"), ("divide", "/"), ("mod", "%")],
    &[("add", "+"), ("subtract", "-")],
    &[
        ("gt", ">"),
        ("gte", ">="),
        ("lt", "<"),
        ("lte", "<="),
        ("in", "in"),
        ("not in", "not in"),
    ],
    &[("eq", "=="), ("ne", "!=")],
    &[("and", "and")],
    &[("or", "or")],
    &[("pipe", "|")],
];

const BUILTIN_VARARG: &[&str] = &["pipe", "and", "or"];

const BUILTIN_LEFT_ASSOCIATIVE: &[&str] = &[
    "pipe", "and", "or", "multiply", "divide", "mod", "add", "subtract",
];

impl OperatorTable {
    /// The builtin operators
    pub fn builtin() -> Self {
        OperatorTable {
            groups: BUILTIN_GROUPS
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
                        .collect()
                })
                .collect(),
            vararg: BUILTIN_VARARG.iter().map(|name| name.to_string()).collect(),
            left_associative: BUILTIN_LEFT_ASSOCIATIVE
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Folds custom operators into a copy of this table, in order.
    ///
    /// Fails with [`ReferenceError::UnknownAnchor`] when no group contains
    /// an operator's anchor symbol.
    pub fn extend(&self, custom: &[CustomOperator]) -> Result<Self, ReferenceError> {
        custom
            .iter()
            .try_fold(self.clone(), |table, operator| table.with_operator(operator))
    }

    fn with_operator(mut self, operator: &CustomOperator) -> Result<Self, ReferenceError> {
        let anchor = operator.insertion.anchor();
        let contains_anchor = |group: &OperatorGroup| group.values().any(|symbol| symbol == anchor);

        let Some(index) = self.groups.iter().position(contains_anchor) else {
            return Err(ReferenceError::UnknownAnchor {
                name: operator.name.clone(),
                anchor: anchor.to_string(),
            });
        };

        trace!(
            name = %operator.name,
            symbol = %operator.symbol,
            insertion = ?operator.insertion,
            "adding custom operator"
        );

        match operator.insertion {
            Insertion::At(_) => {
                for group in self.groups.iter_mut().filter(|group| contains_anchor(group)) {
                    group.insert(operator.name.clone(), operator.symbol.clone());
                }
            }
            Insertion::Before(_) | Insertion::After(_) => {
                let position = match operator.insertion {
                    Insertion::After(_) => index + 1,
                    _ => index,
                };
                let group = OperatorGroup::from([(operator.name.clone(), operator.symbol.clone())]);
                self.groups.insert(position, group);
            }
        }

        if operator.vararg {
            self.vararg.insert(operator.name.clone());
        }
        if operator.left_associative {
            self.left_associative.insert(operator.name.clone());
        }

        Ok(self)
    }

    /// Groups from tightest to loosest binding
    pub fn groups(&self) -> &[OperatorGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Infix symbol of a function name, from the group [`precedence`]
    /// picks.
    ///
    /// [`precedence`]: OperatorTable::precedence
    pub fn symbol(&self, name: &str) -> Option<&str> {
        self.groups
            .get(self.precedence(name)?)?
            .get(name)
            .map(String::as_str)
    }

    /// Index of the tightest group listing `name`; smaller binds tighter.
    /// A name listed in several groups is written with that group's symbol.
    pub fn precedence(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.contains_key(name))
    }

    pub fn is_vararg(&self, name: &str) -> bool {
        self.vararg.contains(name)
    }

    pub fn is_left_associative(&self, name: &str) -> bool {
        self.left_associative.contains(name)
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::builtin()
    }
}
