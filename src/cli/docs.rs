//! Documentation content for the jsonquery CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "fns" => Some(Self::Functions),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"JSONQUERY DOCUMENTATION

JSON Query is a small language for querying and transforming JSON documents.
A query is a pipeline of property paths, function calls and operators that
runs against one input document.

DOCUMENTATION CATEGORIES

  syntax            Paths, literals, objects, arrays and function calls
  operators         Infix operators, precedence and custom operators
  functions         The builtin function library

QUICK REFERENCE

  .name             Property of the input
  .a.b.0            Nested path, integer keys index arrays
  f(x, y)           Function call
  { k: .x }         Object constructor
  [.x, 1]           Array constructor
  a | b             Pipe: run b on the output of a

Run 'jsonquery doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Paths, Literals and Calls

PROPERTY PATHS

  .name                     Property "name" of the input
  .address.city             Nested property
  ."first name"             Quoted property (any JSON string)
  .items.0                  Integer key: array index, or key "0" on objects
  get()                     The input itself

A missing property gives null.

LITERALS

  "text"                    JSON string, with JSON escapes
  42   -1.5   2e3           JSON numbers
  true  false  null         Keywords

FUNCTION CALLS

  sort(.age, "desc")        Name followed by arguments in parentheses
  sum()                     Calls without arguments still need ()

Arguments are queries themselves. Functions such as filter and map run their
argument against each array item instead of the input.

OBJECTS AND ARRAYS

  { name: .name, n: 1 }     Keys are names, quoted strings or integers
  [.a, .b, 3]               Items are any queries

JSON FORM

Every query has an equivalent JSON form, used by --ast:

  .a.b                      ["get", "a", "b"]
  .age > 18                 ["gt", ["get", "age"], 18]
  { n: .x }                 ["object", { "n": ["get", "x"] }]
  [1, .x]                   ["array", 1, ["get", "x"]]
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Infix Notation

Each operator is sugar for a two-argument function call. From tightest to
loosest binding:

  ^                         pow
  *   /   %                 multiply  divide  mod
  +   -                     add  subtract
  >  >=  <  <=  in  not in  gt  gte  lt  lte  in  "not in"
  ==  !=                    eq  ne
  and                       and
  or                        or
  |                         pipe

ASSOCIATIVITY

  1 - 2 - 3                 (1 - 2) - 3, for * / % + - and | and or
  .a | .b | .c              one pipe call with three arguments (| and or)
  1 == 2 == 3               rejected, write (1 == 2) == 3
  2 ^ 3 ^ 2                 rejected, write 2 ^ (3 ^ 2)

CUSTOM OPERATORS

Pass --operators with a JSON list of descriptors. Each one names the function
it calls, its symbol, and exactly one anchor symbol:

  at       join the anchor's group (same precedence)
  before   new group binding tighter than the anchor's group
  after    new group binding looser than the anchor's group

  [{ "name": "coalesce", "op": "??", "after": "|" }]

Optional "vararg" and "left_associative" flags allow chaining.
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Builtin Library

ACCESS

  get(path...)              Value at a path, null when missing
  pick(.a, .b.c)            Object with the last segment of each path as key
  object({ k: q })          Object constructor
  array(q...)               Array constructor
  pipe(q...)                Run each query on the output of the previous one
  exists(.a)                Whether the path is present

ARRAYS (input must be an array)

  filter(.age > 18)         Items for which the predicate is truthy
  map(.name)                Apply a query to every item
  sort(.age, "desc")        Stable sort, "asc" by default
  reverse()                 Items in reverse order
  groupBy(.city)            Object of arrays keyed by the query result
  keyBy(.id)                Object keyed by the query result, first item wins
  flatten()                 Flatten one level
  uniq()                    Distinct items, first occurrence kept
  uniqBy(.id)               Distinct by key
  limit(10)                 First n items
  size()                    Length of an array, object or string
  join(", ")                Concatenate item strings

OBJECTS (input must be an object)

  keys()  values()          Keys or values in order
  mapObject({ key: .value, value: .key })
  mapKeys(q)  mapValues(q)  Transform keys or values

AGGREGATES

  sum()  prod()  average()  min()  max()

LOGIC AND COMPARISON

  and(a, b...)  or(a, b...) Deciding operand, all operands evaluated
  not(a)                    Negation
  eq ne gt gte lt lte       Comparisons, only between values of one type
  if(cond, then, else)      Conditional
  in(v, [..])  notIn(v, [..])

ARITHMETIC

  add subtract multiply divide mod pow abs round(v, digits?)

TEXT

  split(text, sep?)         Split on whitespace or a separator
  substring(text, start, end?)
  regex(text, "pattern", "flags"?)
  string(v)  number(v)      Conversions
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(DocCategory::from_name("OPS"), Some(DocCategory::Operators));
        assert!(get_doc_category("functions").is_ok());
        assert!(matches!(
            get_doc_category("nope"),
            Err(CliError::UnknownCategory(name)) if name == "nope"
        ));
    }
}
