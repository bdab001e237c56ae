use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::{
    ast::{OperatorTable, Query},
    error::{SyntaxError, SyntaxErrorKind},
    lexer::Lexer,
    value::Value,
};

/// Nesting allowed by default for parentheses, call arguments, array items
/// and object values, and for calls nested in the resulting tree.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A parsed subtree and what the operator loop needs to know about it
struct Operand {
    query: Query,
    /// Calls on the longest path down from the root
    height: usize,
    /// Written in parentheses as a whole, which disables chaining on it
    parenthesized: bool,
}

impl Operand {
    fn new(query: Query, height: usize) -> Self {
        Operand {
            query,
            height,
            parenthesized: false,
        }
    }

    /// A call over `args`, one level taller than its tallest argument
    fn call(name: &str, args: Vec<Operand>) -> Self {
        let height = 1 + args.iter().map(|arg| arg.height).max().unwrap_or(0);
        let args = args.into_iter().map(|arg| arg.query).collect();
        Operand::new(Query::call(name, args), height)
    }
}

/// Precedence-climbing parser over an [`OperatorTable`].
///
/// Each precedence group is one level of the ladder, loosest outermost.
/// Below the tightest group sits the base production: a parenthesized
/// expression, a property path, a function call, an object, an array, or a
/// JSON literal.
///
/// Both the recursion of the parser itself and the height of the tree it
/// builds are capped by `max_depth`. Chains of left-associative operators
/// grow the tree without recursing, so the height is tracked separately.
pub struct Parser<'t> {
    lexer: Lexer,
    operators: &'t OperatorTable,
    query: String,
    max_depth: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(lexer: Lexer, operators: &'t OperatorTable) -> Self {
        let query = lexer.source();
        Parser {
            lexer,
            operators,
            query,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the whole input as a single query
    pub fn parse(mut self) -> Result<Query, SyntaxError> {
        let expression = self.parse_expression()?;
        self.parse_end()?;
        Ok(expression.query)
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            kind,
            position: self.lexer.position(),
            query: self.query.clone(),
        }
    }

    fn recursion_limit(&self) -> SyntaxError {
        self.error(SyntaxErrorKind::RecursionLimitExceeded {
            limit: self.max_depth,
        })
    }

    fn check_height(&self, operand: Operand) -> Result<Operand, SyntaxError> {
        if operand.height > self.max_depth {
            return Err(self.recursion_limit());
        }
        Ok(operand)
    }

    fn parse_expression(&mut self) -> Result<Operand, SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(self.recursion_limit());
        }

        self.depth += 1;
        let result = self.parse_operator(self.operators.len());
        self.depth -= 1;

        result
    }

    /// Parses at precedence `level`, where level `n` handles group `n - 1`
    /// and level 0 is the base production.
    fn parse_operator(&mut self, level: usize) -> Result<Operand, SyntaxError> {
        let Some(group) = level.checked_sub(1) else {
            return self.parse_parenthesis();
        };

        let mut left = self.parse_operator(group)?;

        loop {
            self.lexer.skip_whitespace();

            let start = self.lexer.position();
            let Some(name) = self.parse_operator_name(group) else {
                break;
            };

            let vararg = self.operators.is_vararg(name);
            let chained = !left.parenthesized && left.query.call_name() == Some(name);
            if chained && !vararg && !self.operators.is_left_associative(name) {
                // `a == b == c`: leave the second operator to the caller,
                // which reports it as unexpected
                self.lexer.reset(start);
                break;
            }

            let right = self.parse_operator(group)?;

            left = match left.query {
                Query::Call { name: head, mut args } if chained && vararg => {
                    let height = left.height.max(right.height + 1);
                    args.push(right.query);
                    Operand::new(Query::Call { name: head, args }, height)
                }
                query => Operand::call(name, vec![Operand::new(query, left.height), right]),
            };
            left = self.check_height(left)?;
        }

        Ok(left)
    }

    /// Matches an operator symbol of `group`, longest symbol first so that
    /// `<=` wins over `<`.
    fn parse_operator_name(&mut self, group: usize) -> Option<&'t str> {
        let operators = self.operators;
        let mut candidates: Vec<(&'t String, &'t String)> =
            operators.groups()[group].iter().collect();
        candidates.sort_by_key(|(_, symbol)| Reverse(symbol.chars().count()));

        for (name, symbol) in candidates {
            if self.lexer.eat_str(symbol) {
                self.lexer.skip_whitespace();
                return Some(name);
            }
        }

        None
    }

    fn parse_parenthesis(&mut self) -> Result<Operand, SyntaxError> {
        self.lexer.skip_whitespace();

        if self.lexer.eat('(') {
            let inner = self.parse_expression()?;
            self.eat_char(')')?;
            return Ok(Operand {
                parenthesized: true,
                ..inner
            });
        }

        self.parse_property()
    }

    fn parse_property(&mut self) -> Result<Operand, SyntaxError> {
        if self.lexer.current_char() != Some('.') {
            return self.parse_function();
        }

        let mut path = vec![];
        while self.lexer.eat('.') {
            let key = self.parse_key(SyntaxErrorKind::PropertyExpected)?;
            path.push(Query::Literal(Value::String(key)));
        }

        Ok(Operand::new(Query::call("get", path), 1))
    }

    fn parse_function(&mut self) -> Result<Operand, SyntaxError> {
        let start = self.lexer.position();

        if let Some(name) = self.lexer.read_identifier() {
            self.lexer.skip_whitespace();

            if self.lexer.eat('(') {
                self.lexer.skip_whitespace();

                let mut args = vec![];
                if self.lexer.current_char() != Some(')') {
                    args.push(self.parse_expression()?);
                }
                while !self.lexer.is_at_end() && self.lexer.current_char() != Some(')') {
                    self.lexer.skip_whitespace();
                    self.eat_char(',')?;
                    args.push(self.parse_expression()?);
                }
                self.eat_char(')')?;

                return self.check_height(Operand::call(&name, args));
            }
        }

        // Not a call: keywords and stray names are handled further down
        self.lexer.reset(start);
        self.parse_object()
    }

    fn parse_object(&mut self) -> Result<Operand, SyntaxError> {
        if !self.lexer.eat('{') {
            return self.parse_array();
        }
        self.lexer.skip_whitespace();

        let mut entries = IndexMap::new();
        let mut height = 0;
        let mut first = true;
        while !self.lexer.is_at_end() && self.lexer.current_char() != Some('}') {
            if first {
                first = false;
            } else {
                self.eat_char(',')?;
                self.lexer.skip_whitespace();
            }

            let key = self.parse_key(SyntaxErrorKind::KeyExpected)?;
            self.lexer.skip_whitespace();
            self.eat_char(':')?;

            let value = self.parse_expression()?;
            height = height.max(value.height);
            entries.insert(key, value.query);
        }
        self.eat_char('}')?;

        self.check_height(Operand::new(Query::object(entries), height + 1))
    }

    fn parse_array(&mut self) -> Result<Operand, SyntaxError> {
        if !self.lexer.eat('[') {
            return self.parse_literal();
        }
        self.lexer.skip_whitespace();

        let mut items = vec![];
        let mut first = true;
        while !self.lexer.is_at_end() && self.lexer.current_char() != Some(']') {
            if first {
                first = false;
            } else {
                self.eat_char(',')?;
                self.lexer.skip_whitespace();
            }

            items.push(self.parse_expression()?);
        }
        self.eat_char(']')?;

        self.check_height(Operand::call("array", items))
    }

    fn parse_literal(&mut self) -> Result<Operand, SyntaxError> {
        if let Some(string) = self.parse_string()? {
            return Ok(Operand::new(Query::Literal(Value::String(string)), 0));
        }

        if let Some(number) = self.lexer.read_number() {
            return Ok(Operand::new(Query::Literal(number), 0));
        }

        match self.lexer.read_keyword() {
            Some(keyword) => Ok(Operand::new(Query::Literal(keyword), 0)),
            None => Err(self.error(SyntaxErrorKind::ValueExpected)),
        }
    }

    /// Property or object key: a quoted string, an unquoted name, or a
    /// non-negative integer (kept as its decimal text).
    fn parse_key(&mut self, expected: SyntaxErrorKind) -> Result<String, SyntaxError> {
        if let Some(string) = self.parse_string()? {
            return Ok(string);
        }

        if let Some(name) = self.lexer.read_identifier() {
            return Ok(name);
        }

        if let Some(integer) = self.lexer.read_integer() {
            return Ok(integer);
        }

        Err(self.error(expected))
    }

    fn parse_string(&mut self) -> Result<Option<String>, SyntaxError> {
        match self.lexer.read_string() {
            Some(Ok(string)) => Ok(Some(string)),
            Some(Err(())) => Err(self.error(SyntaxErrorKind::InvalidString)),
            None => Ok(None),
        }
    }

    fn parse_end(&mut self) -> Result<(), SyntaxError> {
        self.lexer.skip_whitespace();

        if self.lexer.is_at_end() {
            Ok(())
        } else {
            Err(self.error(SyntaxErrorKind::UnexpectedPart(self.lexer.rest())))
        }
    }

    fn eat_char(&mut self, ch: char) -> Result<(), SyntaxError> {
        if self.lexer.eat(ch) {
            Ok(())
        } else {
            Err(self.error(SyntaxErrorKind::CharExpected(ch)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Query, SyntaxError> {
        Parser::new(Lexer::new(text), &OperatorTable::builtin()).parse()
    }

    #[test]
    fn test_vararg_flattens() {
        let query = parse(".a | .b | .c").unwrap();
        assert_eq!(
            query,
            Query::call("pipe", vec![Query::get(["a"]), Query::get(["b"]), Query::get(["c"])])
        );
    }

    #[test]
    fn test_parenthesized_operand_is_not_flattened() {
        let query = parse("(.a | .b) | .c").unwrap();
        assert_eq!(
            query,
            Query::call(
                "pipe",
                vec![
                    Query::call("pipe", vec![Query::get(["a"]), Query::get(["b"])]),
                    Query::get(["c"])
                ]
            )
        );
    }

    #[test]
    fn test_rejected_chain_rolls_back_to_operator() {
        let err = parse("1 == 2 == 3").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedPart("== 3".to_string()));
        assert_eq!(err.position, 7);
    }

    #[test]
    fn test_depth_limit() {
        let text = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let operators = OperatorTable::builtin();

        assert!(Parser::new(Lexer::new(&text), &operators).with_max_depth(11).parse().is_ok());

        let err = Parser::new(Lexer::new(&text), &operators)
            .with_max_depth(10)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::RecursionLimitExceeded { limit: 10 });
    }
}
