//! EBNF parser, built on the rule language's own lexer and parser primitives.

use crate::errors::{Result, SourceContext};
use crate::syntax::lexer::{Token, TokenKind};
use crate::syntax::parser::Parser;
use crate::validation::grammar::{Expression, Grammar, Production, Symbol};

pub fn parse_grammar(source: &SourceContext) -> Result<Grammar> {
    let mut p = Parser::new(source)?;
    let mut productions = Vec::new();
    while !p.is_at_end() {
        productions.push(parse_production(&mut p)?);
    }
    Ok(Grammar { productions })
}

fn symbol(token: Token) -> Symbol {
    Symbol {
        text: token.text,
        position: token.position,
    }
}

fn peek_other(p: &Parser, text: &str) -> bool {
    p.peek()
        .is_some_and(|t| t.kind == TokenKind::Other && t.text == text)
}

fn parse_production(p: &mut Parser) -> Result<Production> {
    let name = p.next_ident()?;
    p.expect_other("=")?;
    let expr = if peek_other(p, ".") {
        None
    } else {
        Some(parse_expression(p)?)
    };
    p.expect_other(".")?;
    Ok(Production {
        name: name.text,
        position: name.position,
        expr,
    })
}

fn parse_expression(p: &mut Parser) -> Result<Expression> {
    let mut alternatives = vec![parse_sequence(p)?];
    while p.expect_other("|").is_ok() {
        alternatives.push(parse_sequence(p)?);
    }
    Ok(match alternatives.len() {
        1 => alternatives.remove(0),
        _ => Expression::Alternative(alternatives),
    })
}

fn parse_sequence(p: &mut Parser) -> Result<Expression> {
    let mut terms = Vec::new();
    while let Some(term) = parse_term(p)? {
        terms.push(term);
    }
    match terms.len() {
        0 => Err(p.error_expected("term")),
        1 => Ok(terms.remove(0)),
        _ => Ok(Expression::Sequence(terms)),
    }
}

/// `None` when the next token cannot start a term.
fn parse_term(p: &mut Parser) -> Result<Option<Expression>> {
    let Some(token) = p.peek() else {
        return Ok(None);
    };
    let (kind, text) = (token.kind, token.text.clone());
    let term = match kind {
        TokenKind::Ident => Expression::Name(symbol(p.next_ident()?)),
        TokenKind::String => {
            let begin = symbol(p.next_str()?);
            if p.expect_other("…").is_ok() {
                let end = symbol(p.next_str()?);
                Expression::Range { begin, end }
            } else {
                Expression::Token(begin)
            }
        }
        TokenKind::Other => match text.as_str() {
            "(" => Expression::Group(Box::new(parse_bracketed(p, "(", ")")?)),
            "[" => Expression::Option(Box::new(parse_bracketed(p, "[", "]")?)),
            "{" => Expression::Repetition(Box::new(parse_bracketed(p, "{", "}")?)),
            _ => return Ok(None),
        },
    };
    Ok(Some(term))
}

fn parse_bracketed(p: &mut Parser, open: &str, close: &str) -> Result<Expression> {
    p.expect_other(open)?;
    let inner = parse_expression(p)?;
    p.expect_other(close)?;
    Ok(inner)
}
