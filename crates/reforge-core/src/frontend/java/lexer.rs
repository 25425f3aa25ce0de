//! Tokenizer for the Java subset.
//!
//! ```text
//! trivia     = { whitespace | "//" line | "/*" ... "*/" } ;
//! identifier = ( letter | "_" | "$" ) { letter | digit | "_" | "$" } ;
//! number     = hex | floating | integer ;
//! string     = '"' { char | escape } '"' ;
//! character  = "'" { char | escape } "'" ;
//! punct      = longest operator or separator ;
//! ```
//!
//! Trivia never reaches the parser; it stays in the document and the text
//! mapper carries it through untouched.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until},
    character::complete::{
        alpha1, alphanumeric1, anychar, char, digit0, digit1, hex_digit1, multispace1, none_of,
        not_line_ending, one_of,
    },
    combinator::{map, opt, recognize, value},
    multi::{many0, many0_count},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::frontend::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Floating,
    String,
    Char,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub start: usize,
    pub end: usize,
}

impl Token<'_> {
    pub fn is(&self, text: &str) -> bool {
        self.text == text && matches!(self.kind, TokenKind::Identifier | TokenKind::Punct)
    }
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((multispace1, line_comment, block_comment))),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"), tag("$"))),
        many0(alt((alphanumeric1, tag("_"), tag("$")))),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn floating(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((
            digit1,
            char('.'),
            digit0,
            opt(exponent),
            opt(one_of("fFdD")),
        ))),
        recognize(tuple((
            char('.'),
            digit1,
            opt(exponent),
            opt(one_of("fFdD")),
        ))),
        recognize(tuple((digit1, exponent, opt(one_of("fFdD"))))),
        recognize(pair(digit1, one_of("fFdD"))),
    ))(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((tag_no_case("0x"), hex_digit1, opt(one_of("lL"))))),
        recognize(pair(digit1, opt(one_of("lL")))),
    ))(input)
}

fn quoted<'s>(input: &'s str, quote: char, forbidden: &'static str) -> IResult<&'s str, &'s str> {
    recognize(tuple((
        char(quote),
        many0_count(alt((
            value((), preceded(char('\\'), anychar)),
            value((), none_of(forbidden)),
        ))),
        char(quote),
    )))(input)
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    quoted(input, '"', "\"\\\n")
}

fn char_literal(input: &str) -> IResult<&str, &str> {
    quoted(input, '\'', "'\\\n")
}

fn punct(input: &str) -> IResult<&str, &str> {
    alt((
        alt((
            tag(">>>="),
            tag("<<="),
            tag(">>="),
            tag(">>>"),
            tag("..."),
            tag("=="),
            tag("!="),
            tag("<="),
            tag(">="),
            tag("&&"),
            tag("||"),
            tag("++"),
            tag("--"),
        )),
        alt((
            tag("+="),
            tag("-="),
            tag("*="),
            tag("/="),
            tag("%="),
            tag("&="),
            tag("|="),
            tag("^="),
            tag("<<"),
            tag(">>"),
            tag("->"),
            tag("::"),
        )),
        recognize(one_of("(){}[];,.@=<>!~?:+-*/&|^%")),
    ))(input)
}

fn token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((
        map(floating, |t| (TokenKind::Floating, t)),
        map(integer, |t| (TokenKind::Integer, t)),
        map(identifier, |t| (TokenKind::Identifier, t)),
        map(string_literal, |t| (TokenKind::String, t)),
        map(char_literal, |t| (TokenKind::Char, t)),
        map(punct, |t| (TokenKind::Punct, t)),
    ))(input)
}

/// Splits `source` into tokens, skipping trivia.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        let Ok((after_trivia, ())) = trivia(rest) else {
            let offset = source.len() - rest.len();
            return Err(ParseError::at(source, offset, "unterminated comment"));
        };
        rest = after_trivia;
        if rest.is_empty() {
            return Ok(tokens);
        }
        if rest.starts_with("/*") {
            let offset = source.len() - rest.len();
            return Err(ParseError::at(source, offset, "unterminated comment"));
        }
        let start = source.len() - rest.len();
        match token(rest) {
            Ok((after, (kind, text))) => {
                tokens.push(Token {
                    kind,
                    text,
                    start,
                    end: start + text.len(),
                });
                rest = after;
            }
            Err(_) => {
                let found = rest.chars().next().unwrap_or_default();
                return Err(ParseError::at(
                    source,
                    start,
                    format!("unexpected character `{found}`"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(source: &str) -> Vec<&str> {
        tokenize(source).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_skips_comments_and_whitespace() {
        assert_eq!(
            texts("a /* block */ + // line\n b"),
            vec!["a", "+", "b"]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(texts("a>>>=b"), vec!["a", ">>>=", "b"]);
        assert_eq!(texts("x != y && !z"), vec!["x", "!=", "y", "&&", "!", "z"]);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("1 2L 0x1F 3.5 .5f 1e3 7d").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Floating,
                TokenKind::Floating,
                TokenKind::Floating,
                TokenKind::Floating,
            ]
        );
    }

    #[test]
    fn test_string_and_char_escapes() {
        let tokens = tokenize(r#"s = "a \"quoted\" \\ word"; c = '\'';"#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, r#""a \"quoted\" \\ word""#);
        assert_eq!(tokens[6].kind, TokenKind::Char);
        assert_eq!(tokens[6].text, r"'\''");
    }

    #[test]
    fn test_offsets_point_into_source() {
        let source = "  foo(bar)";
        for token in tokenize(source).unwrap() {
            assert_eq!(&source[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_unterminated_comment_is_an_error() {
        let error = tokenize("a /* never closed").unwrap_err();
        assert_eq!(error.offset, 2);
    }
}
