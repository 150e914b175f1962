//! NF-003: Build-time condition expressions.
//!
//! Directives carry optional `condition` strings such as `arch=="x86_64"`.
//! The language is small: string equality/inequality, `and`/`or`/`not`
//! (also `&&`/`||`), parentheses, quoted literals, and bare identifiers
//! that are truthy when bound to a non-empty, non-"false" value.
//! Identifiers resolve against `arch` and the recipe's variables; an
//! unbound identifier resolves to the empty string. Malformed expressions
//! are errors, never silently false.

use super::types::yaml_value_to_string;
use indexmap::IndexMap;
use regex::Regex;

/// Variable bindings a condition is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct ConditionContext {
    pub arch: String,
    pub variables: IndexMap<String, serde_yaml_ng::Value>,
}

impl ConditionContext {
    pub fn new(arch: &str) -> Self {
        Self {
            arch: arch.to_string(),
            variables: IndexMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> String {
        if name == "arch" {
            return self.arch.clone();
        }
        self.variables
            .get(name)
            .map(yaml_value_to_string)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(String),
    Eq,
    Ne,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Compare { left: Operand, eq: bool, right: Operand },
    Truthy(Operand),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Var(String),
    Lit(String),
}

impl Operand {
    fn resolve(&self, ctx: &ConditionContext) -> String {
        match self {
            Self::Var(name) => ctx.lookup(name),
            Self::Lit(s) => s.clone(),
        }
    }
}

const TOKEN_PATTERN: &str =
    r#"^\s*(?:(==)|(!=)|(&&)|(\|\|)|(\()|(\))|"([^"]*)"|'([^']*)'|([A-Za-z_][A-Za-z0-9_.]*)|(\S))"#;

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let re = Regex::new(TOKEN_PATTERN).map_err(|e| format!("lexer error: {}", e))?;
    let mut tokens = Vec::new();
    let mut rest = expr;

    while !rest.trim().is_empty() {
        let caps = re
            .captures(rest)
            .ok_or_else(|| format!("cannot tokenize condition near '{}'", rest.trim()))?;
        let all = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());

        let token = if caps.get(1).is_some() {
            Token::Eq
        } else if caps.get(2).is_some() {
            Token::Ne
        } else if caps.get(3).is_some() {
            Token::And
        } else if caps.get(4).is_some() {
            Token::Or
        } else if caps.get(5).is_some() {
            Token::LParen
        } else if caps.get(6).is_some() {
            Token::RParen
        } else if let Some(m) = caps.get(7) {
            Token::Literal(m.as_str().to_string())
        } else if let Some(m) = caps.get(8) {
            Token::Literal(m.as_str().to_string())
        } else if let Some(m) = caps.get(9) {
            match m.as_str() {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                ident => Token::Ident(ident.to_string()),
            }
        } else {
            let bad = caps.get(10).map(|m| m.as_str()).unwrap_or("?");
            return Err(format!("unexpected character '{}' in condition", bad));
        };

        tokens.push(token);
        rest = &rest[all..];
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, token: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref t) if t == token => Ok(()),
            other => Err(format!("expected {:?}, found {:?}", token, other)),
        }
    }

    // or_expr := and_expr (Or and_expr)*
    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // and_expr := unary (And unary)*
    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // unary := Not unary | primary
    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    // primary := '(' or_expr ')' | operand ((Eq | Ne) operand)?
    fn primary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::LParen) {
            self.next();
            let inner = self.or_expr()?;
            self.expect(&Token::RParen)?;
            return Ok(inner);
        }

        let left = self.operand()?;
        match self.peek() {
            Some(Token::Eq) => {
                self.next();
                let right = self.operand()?;
                Ok(Expr::Compare { left, eq: true, right })
            }
            Some(Token::Ne) => {
                self.next();
                let right = self.operand()?;
                Ok(Expr::Compare { left, eq: false, right })
            }
            _ => Ok(Expr::Truthy(left)),
        }
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(Operand::Var(name)),
            Some(Token::Literal(s)) => Ok(Operand::Lit(s)),
            other => Err(format!("expected identifier or literal, found {:?}", other)),
        }
    }
}

fn parse(expr: &str) -> Result<Expr, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty condition".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "trailing tokens in condition '{}' after position {}",
            expr, parser.pos
        ));
    }
    Ok(ast)
}

fn eval(expr: &Expr, ctx: &ConditionContext) -> bool {
    match expr {
        Expr::Compare { left, eq, right } => {
            let result = left.resolve(ctx) == right.resolve(ctx);
            if *eq {
                result
            } else {
                !result
            }
        }
        Expr::Truthy(op) => {
            let v = op.resolve(ctx);
            !v.is_empty() && v != "false"
        }
        Expr::Not(inner) => !eval(inner, ctx),
        Expr::And(a, b) => eval(a, ctx) && eval(b, ctx),
        Expr::Or(a, b) => eval(a, ctx) || eval(b, ctx),
    }
}

/// Check that a condition parses, without evaluating it.
pub fn check(expr: &str) -> Result<(), String> {
    parse(expr).map(|_| ())
}

/// Evaluate a condition against a context.
pub fn evaluate(expr: &str, ctx: &ConditionContext) -> Result<bool, String> {
    let ast = parse(expr)?;
    Ok(eval(&ast, ctx))
}
