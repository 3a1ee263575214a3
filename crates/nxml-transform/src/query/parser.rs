//! Path expression parser
//!
//! Recursive descent over the token stream. The grammar is the XPath 1.0
//! subset needed to address Native XML exports:
//!
//! ```text
//! Expr      := AndExpr ('or' AndExpr)*
//! AndExpr   := Compare ('and' Compare)*
//! Compare   := Primary (('=' | '!=') Primary)?
//! Primary   := Literal | Number | '(' Expr ')' | Function | Path
//! Path      := ('/' | '//')? Step (('/' | '//') Step)*
//! Step      := '.' | '..' | '@' NameTest | NameTest | 'text()' | 'node()' ; then Predicate*
//! ```

use super::lexer::{tokenize, Token};

/// Parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(LocationPath),
    Literal(String),
    Number(f64),
    Function(Function, Vec<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// Location step in a path
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Attribute,
    SelfNode,
    Parent,
    DescendantOrSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `local == None` is the `*` wildcard
    Name {
        prefix: Option<String>,
        local: Option<String>,
    },
    Text,
    Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    String,
    Count,
    NormalizeSpace,
    Not,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Function::String),
            "count" => Some(Function::Count),
            "normalize-space" => Some(Function::NormalizeSpace),
            "not" => Some(Function::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
}

/// Parse a complete expression
pub fn parse(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;

    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected token {:?}", token)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of expression", expected)),
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.at_keyword("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_compare()?;
        while self.at_keyword("and") {
            self.pos += 1;
            let right = self.parse_compare()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> Result<Expr, String> {
        let left = self.parse_primary()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::NotEq) => CompareOp::NotEq,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_primary()?;
        Ok(Expr::Compare(Box::new(left), op, Box::new(right)))
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Literal(value)) => {
                let value = value.clone();
                self.pos += 1;
                Ok(Expr::Literal(value))
            },
            Some(Token::Number(value)) => {
                let value = *value;
                self.pos += 1;
                Ok(Expr::Number(value))
            },
            Some(Token::LeftParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            },
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LeftParen) && !is_node_type(name) =>
            {
                let name = name.clone();
                let function = Function::from_name(&name)
                    .ok_or_else(|| format!("unsupported function '{}'", name))?;
                self.pos += 2;
                let args = self.parse_arguments()?;
                Ok(Expr::Function(function, args))
            },
            Some(_) => self.parse_path().map(Expr::Path),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RightParen) {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RightParen) => return Ok(args),
                other => return Err(format!("expected ',' or ')', found {:?}", other)),
            }
        }
    }

    fn parse_path(&mut self) -> Result<LocationPath, String> {
        let mut path = LocationPath {
            absolute: false,
            steps: Vec::new(),
        };

        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                path.absolute = true;
                // A lone `/` selects the document node
                if !self.at_step_start() {
                    return Ok(path);
                }
            },
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                path.absolute = true;
                path.steps.push(descendant_or_self());
            },
            _ => {},
        }

        path.steps.push(self.parse_step()?);

        loop {
            match self.peek() {
                Some(Token::Slash) => self.pos += 1,
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    path.steps.push(descendant_or_self());
                },
                _ => return Ok(path),
            }
            path.steps.push(self.parse_step()?);
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DoubleDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn parse_step(&mut self) -> Result<Step, String> {
        let (axis, test) = match self.advance() {
            Some(Token::Dot) => return Ok(simple_step(Axis::SelfNode)),
            Some(Token::DoubleDot) => return Ok(simple_step(Axis::Parent)),
            Some(Token::At) => match self.advance() {
                Some(Token::Star) => (Axis::Attribute, wildcard()),
                Some(Token::Name(name)) => (Axis::Attribute, name_test(&name)),
                other => return Err(format!("expected attribute name, found {:?}", other)),
            },
            Some(Token::Star) => (Axis::Child, wildcard()),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LeftParen) => {
                self.pos += 1;
                self.expect(Token::RightParen)?;
                match name.as_str() {
                    "text" => (Axis::Child, NodeTest::Text),
                    "node" => (Axis::Child, NodeTest::Node),
                    _ => return Err(format!("unsupported node type '{}()'", name)),
                }
            },
            Some(Token::Name(name)) => (Axis::Child, name_test(&name)),
            Some(token) => return Err(format!("expected a location step, found {:?}", token)),
            None => return Err("expected a location step, found end of expression".to_string()),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LeftBracket) {
            self.pos += 1;
            predicates.push(self.parse_or()?);
            self.expect(Token::RightBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }
}

fn is_node_type(name: &str) -> bool {
    matches!(name, "text" | "node")
}

fn simple_step(axis: Axis) -> Step {
    Step {
        axis,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

fn descendant_or_self() -> Step {
    simple_step(Axis::DescendantOrSelf)
}

fn wildcard() -> NodeTest {
    NodeTest::Name {
        prefix: None,
        local: None,
    }
}

fn name_test(name: &str) -> NodeTest {
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local),
        None => (None, name),
    };

    NodeTest::Name {
        prefix,
        local: (local != "*").then(|| local.to_string()),
    }
}
