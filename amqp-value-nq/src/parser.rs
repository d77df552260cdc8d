use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    Finish,
    IResult,
};
use amqp_value::{Map, Str, Value};
use anyhow::{anyhow, Result};
use uuid::Uuid;

const KEY_CHARS: &str = "_-.";

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword(i: &str) -> IResult<&str, Value> {
    alt((
            value(Value::Void, tag("void")),
            value(Value::Bool(true), tag("true")),
            value(Value::Bool(false), tag("false")),
    ))(i)
}

fn float_literal(i: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), alt((
            tag("inf"),
            tag("NaN"),
            recognize(tuple((
                    digit1,
                    opt(pair(char('.'), digit0)),
                    opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
            ))),
    ))))(i)
}

fn float(i: &str) -> IResult<&str, Value> {
    let (i, literal) = float_literal(i)?;
    alt((
            map_res(tag("f32"), move |_| literal.parse().map(Value::F32)),
            map_res(tag("f64"), move |_| literal.parse().map(Value::F64)),
    ))(i)
}

fn integer(i: &str) -> IResult<&str, Value> {
    let (i, digits) = recognize(pair(opt(char('-')), digit1))(i)?;
    alt((
            map_res(tag("u8"),  move |_| digits.parse().map(Value::U8)),
            map_res(tag("u16"), move |_| digits.parse().map(Value::U16)),
            map_res(tag("u32"), move |_| digits.parse().map(Value::U32)),
            map_res(tag("u64"), move |_| digits.parse().map(Value::U64)),
            map_res(tag("i8"),  move |_| digits.parse().map(Value::I8)),
            map_res(tag("i16"), move |_| digits.parse().map(Value::I16)),
            map_res(tag("i32"), move |_| digits.parse().map(Value::I32)),
            map_res(tag("i64"), move |_| digits.parse().map(Value::I64)),
    ))(i)
}

fn quoted(i: &str) -> IResult<&str, String> {
    delimited(
            char('"'),
            map(opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                        value("\\", tag("\\")),
                        value("\"", tag("\"")),
                        value("\n", tag("n")),
                )))), Option::unwrap_or_default),
            char('"')
    )(i)
}

fn from_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(anyhow!("odd number of hex digits"));
    }
    (0..hex.len()).step_by(2)
        .map(|at| hex.get(at..at + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| anyhow!("invalid hex digits in {}", hex))
}

fn string(i: &str) -> IResult<&str, Value> {
    let (i, prefix) = opt(one_of("awxu"))(i)?;
    let (i, text) = quoted(i)?;
    let parsed = match prefix {
        None      => Ok(Value::Str(Str::utf8(text))),
        Some('a') => Str::ascii(&text).map(Value::Str).map_err(anyhow::Error::from),
        Some('w') => Ok(Value::Str(Str::utf16(&text))),
        Some('x') => from_hex(&text).map(|b| Value::Str(Str::binary(b))),
        _         => Uuid::parse_str(&text).map(Value::Uuid).map_err(anyhow::Error::from),
    };
    match parsed {
        Ok(v)  => Ok((i, v)),
        Err(_) => Err(nom::Err::Failure(nom::error::Error::new(i, nom::error::ErrorKind::MapRes))),
    }
}

fn bare_key(i: &str) -> IResult<&str, String> {
    map(recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || KEY_CHARS.contains(c)),
    )), str::to_owned)(i)
}

fn list(i: &str) -> IResult<&str, Value> {
    map(delimited(
            char('['),
            terminated(separated_list0(char(','), ws(any_value)), opt(ws(char(',')))),
            preceded(multispace0, char(']')),
    ), Value::List)(i)
}

fn map_value(i: &str) -> IResult<&str, Value> {
    let entry = separated_pair(ws(alt((quoted, bare_key))), char(':'), ws(any_value));
    map(delimited(
            char('{'),
            terminated(separated_list0(char(','), entry), opt(ws(char(',')))),
            preceded(multispace0, char('}')),
    ), |entries| Value::Map(entries.into_iter().collect::<Map>()))(i)
}

fn any_value(i: &str) -> IResult<&str, Value> {
    alt((
            keyword,
            float,
            integer,
            string,
            list,
            map_value,
    ))(i)
}

pub fn parse(i: &str) -> Result<Value> {
    Ok(all_consuming(ws(any_value))(i).finish().map_err(|e| anyhow!("{}", e))?.1)
}

#[cfg(test)]
mod tests {
    use super::parse;
    use amqp_value::{Map, Str, Value};
    use uuid::Uuid;

    fn canonical() -> Vec<Value> {
        vec![
            Value::Void,
            Value::Bool(true),
            Value::U8(255),
            Value::U16(40_000),
            Value::U32(7),
            Value::U64(u64::MAX),
            Value::I8(-128),
            Value::I16(-3),
            Value::I32(0),
            Value::I64(i64::MIN),
            Value::F32(1.5),
            Value::F32(f32::MIN),
            Value::F64(1e-300),
            Value::F64(f64::INFINITY),
            Value::from("say \"hi\"\nthen \\ leave"),
            Value::from(""),
            Value::Str(Str::ascii("plain").unwrap()),
            Value::Str(Str::utf16("Querflöte")),
            Value::Str(Str::binary(vec![0x00, 0xab, 0xff])),
            Value::Uuid(Uuid::from_u128(0xdead_beef)),
            Value::List(Vec::new()),
            Value::Map(Map::new()),
            Value::List(vec![
                Value::Map(Map::from(vec![
                    ("bare_key-1.x", Value::List(vec![Value::I32(1), Value::I32(2)])),
                    ("needs quoting", Value::Map(Map::from(vec![("inner", Value::Void)]))),
                ])),
                Value::U8(1),
            ]),
        ]
    }

    #[test]
    fn display_parses_back() {
        for value in canonical() {
            assert_eq!(value, parse(&value.to_string()).unwrap(), "{}", value);
        }
    }

    #[test]
    fn whitespace_and_trailing_commas() {
        let value = parse(" {\n  a : [ 1u8 , 2u8, ],\n  \"b c\": x\"0a\",\n}\n").unwrap();
        assert_eq!(Value::Map(Map::from(vec![
            ("a", Value::List(vec![Value::U8(1), Value::U8(2)])),
            ("b c", Value::Str(Str::binary(vec![0x0a]))),
        ])), value);
    }

    #[test]
    fn rejects() {
        assert!(parse("7").is_err());
        assert!(parse("-1u8").is_err());
        assert!(parse("256u8").is_err());
        assert!(parse("a\"ä\"").is_err());
        assert!(parse("x\"abc\"").is_err());
        assert!(parse("u\"not a uuid\"").is_err());
        assert!(parse("[1u8").is_err());
        assert!(parse("void void").is_err());
    }

}
