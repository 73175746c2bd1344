//! Parser for Rust-like type expressions with nested generics
//!
//! This module uses nom to parse expressions such as:
//! - `String`
//! - `Vec<Order>`
//! - `HashMap<String, Vec<shop::Order>>`
//! - `[u8; 16]`
//!
//! Module paths are reduced to their last segment. Identifiers listed as generic parameters of
//! the enclosing definition become [`TypeExpr::Param`].

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::bytes::complete::take_while;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::character::complete::digit1;
use nom::character::complete::multispace0;
use nom::combinator::map_res;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::separated_pair;
use nom::IResult;
use nom::Parser;

use super::type_expr::Primitive;
use super::type_expr::TypeExpr;
use crate::constants::TYPE_ARC;
use crate::constants::TYPE_BOX;
use crate::constants::TYPE_BTREE_MAP;
use crate::constants::TYPE_BTREE_SET;
use crate::constants::TYPE_HASH_MAP;
use crate::constants::TYPE_HASH_SET;
use crate::constants::TYPE_OPTION;
use crate::constants::TYPE_RC;
use crate::constants::TYPE_VEC;
use crate::constants::TYPE_VEC_DEQUE;

/// Syntax tree before container names and parameters are interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawType {
    Path { name: String, args: Vec<Self> },
    Array { element: Box<Self>, len: usize },
}

/// Parse an identifier (alphanumeric + underscore, not starting with digit)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Parse a module-qualified path and keep the last segment
fn type_path(input: &str) -> IResult<&str, &str> {
    let (input, path) = recognize(separated_list1(tag("::"), identifier)).parse(input)?;
    Ok((input, path.rsplit("::").next().unwrap_or(path)))
}

/// Parse generic arguments recursively
fn generics(input: &str) -> IResult<&str, Vec<RawType>> {
    delimited(
        pair(char('<'), multispace0),
        separated_list1(delimited(multispace0, char(','), multispace0), raw_type),
        pair(multispace0, char('>')),
    )
    .parse(input)
}

fn path_type(input: &str) -> IResult<&str, RawType> {
    let (input, name) = type_path(input)?;
    let (input, args) = opt(preceded(multispace0, generics)).parse(input)?;
    Ok((input, RawType::Path {
        name: name.to_string(),
        args: args.unwrap_or_default(),
    }))
}

fn array_type(input: &str) -> IResult<&str, RawType> {
    let (input, (element, len)) = delimited(
        pair(char('['), multispace0),
        separated_pair(
            raw_type,
            delimited(multispace0, char(';'), multispace0),
            map_res(digit1, str::parse::<usize>),
        ),
        pair(multispace0, char(']')),
    )
    .parse(input)?;
    Ok((input, RawType::Array {
        element: Box::new(element),
        len,
    }))
}

fn raw_type(input: &str) -> IResult<&str, RawType> { alt((array_type, path_type)).parse(input) }

/// Interpret container names, primitives and generic parameters
fn interpret(raw: RawType, params: &[String]) -> Result<TypeExpr, String> {
    let (name, args) = match raw {
        RawType::Array { element, len } => {
            return Ok(TypeExpr::array(interpret(*element, params)?, len));
        }
        RawType::Path { name, args } => (name, args),
    };

    if args.is_empty() {
        if params.iter().any(|param| *param == name) {
            return Ok(TypeExpr::param(name));
        }
        if let Ok(primitive) = name.parse::<Primitive>() {
            return Ok(TypeExpr::Primitive(primitive));
        }
    }

    let mut args = args
        .into_iter()
        .map(|arg| interpret(arg, params))
        .collect::<Result<Vec<_>, _>>()?;

    let expect_args = |count: usize, args: &[TypeExpr]| {
        if args.len() == count {
            Ok(())
        } else {
            Err(format!(
                "{name} expects {count} type argument(s), found {}",
                args.len()
            ))
        }
    };

    match name.as_str() {
        TYPE_VEC | TYPE_VEC_DEQUE => {
            expect_args(1, &args)?;
            Ok(TypeExpr::list(args.remove(0)))
        }
        TYPE_HASH_SET | TYPE_BTREE_SET => {
            expect_args(1, &args)?;
            Ok(TypeExpr::set(args.remove(0)))
        }
        TYPE_HASH_MAP | TYPE_BTREE_MAP => {
            expect_args(2, &args)?;
            let value = args.remove(1);
            Ok(TypeExpr::map(args.remove(0), value))
        }
        TYPE_OPTION => {
            expect_args(1, &args)?;
            Ok(TypeExpr::option(args.remove(0)))
        }
        TYPE_BOX | TYPE_RC | TYPE_ARC => {
            expect_args(1, &args)?;
            Ok(args.remove(0))
        }
        _ => Ok(TypeExpr::generic(name.as_str(), args)),
    }
}

/// Parse a complete type expression
pub fn parse_type_expr(input: &str, params: &[String]) -> Result<TypeExpr, String> {
    match delimited(multispace0, raw_type, multispace0).parse(input) {
        Ok((remaining, raw)) => {
            if !remaining.is_empty() {
                return Err(format!(
                    "Unexpected characters after type expression: {remaining}"
                ));
            }
            interpret(raw, params)
        }
        Err(e) => Err(format!("Failed to parse type expression '{input}': {e:?}")),
    }
}
