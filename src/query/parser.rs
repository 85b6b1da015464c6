use crate::core::error::{Error, ErrorKind, Result};
use crate::index::vector::decode_vector;
use crate::query::ast::{AstNode, LogicOp};
use crate::query::lexer::{tokenize, Token};
use crate::query::params::QueryParams;

/// Parse query text into an AST. A blank query yields `AstNode::Empty`;
/// any syntax error leaves no partial state behind.
pub fn parse(query: &str, params: &QueryParams) -> Result<AstNode> {
    let tokens = tokenize(query)?;
    Parser {
        tokens,
        pos: 0,
        params,
    }
    .parse_query()
}

/// Recursive descent over the token stream, one method per grammar
/// production. `$name` references resolve against `params` during parsing.
struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    params: &'a QueryParams,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            other => Err(unexpected(other, &format!("{:?}", expected))),
        }
    }

    fn resolve_param(&self, name: &str) -> Result<&'a [u8]> {
        self.params
            .get(name)
            .ok_or_else(|| Error::new(ErrorKind::Parse, format!("unknown parameter: ${}", name)))
    }

    // query := ('*' | expr) ('=>' knn)?
    fn parse_query(mut self) -> Result<AstNode> {
        if self.peek().is_none() {
            return Ok(AstNode::Empty);
        }

        // A lone star matches everything; mid-expression stars are errors.
        let filter = if self.peek() == Some(&Token::Star)
            && matches!(self.peek_at(1), None | Some(Token::Arrow))
        {
            self.pos += 1;
            AstNode::Star
        } else {
            self.parse_or()?
        };

        let node = if self.peek() == Some(&Token::Arrow) {
            self.pos += 1;
            self.parse_knn(filter)?
        } else {
            filter
        };

        match self.advance() {
            None => Ok(node),
            Some(token) => Err(Error::new(
                ErrorKind::Parse,
                format!("unexpected trailing {:?}", token),
            )),
        }
    }

    // or := and ('|' and)*
    fn parse_or(&mut self) -> Result<AstNode> {
        let mut nodes = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            nodes.push(self.parse_and()?);
        }
        Ok(AstNode::logical(LogicOp::Or, nodes))
    }

    // and := unary+ (juxtaposition)
    fn parse_and(&mut self) -> Result<AstNode> {
        let mut nodes = vec![self.parse_unary()?];
        while matches!(
            self.peek(),
            Some(Token::Minus | Token::LParen | Token::At | Token::Term(_) | Token::Param(_))
        ) {
            nodes.push(self.parse_unary()?);
        }
        Ok(AstNode::logical(LogicOp::And, nodes))
    }

    // unary := '-' unary | atom
    fn parse_unary(&mut self) -> Result<AstNode> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(AstNode::negate(self.parse_unary()?));
        }
        self.parse_atom()
    }

    // atom := '(' or ')' | '@' IDENT ':' fieldexpr | TERM | PARAM
    fn parse_atom(&mut self) -> Result<AstNode> {
        match self.advance() {
            Some(Token::LParen) => {
                let node = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(node)
            }
            Some(Token::At) => {
                let field = self.parse_word("a field name")?;
                self.expect(Token::Colon)?;
                let child = self.parse_field_expr()?;
                Ok(AstNode::field(&field, child))
            }
            Some(Token::Term(word)) => Ok(AstNode::term(&word)),
            Some(Token::Param(name)) => {
                let bytes = self.resolve_param(&name)?;
                Ok(AstNode::term(&String::from_utf8_lossy(bytes)))
            }
            other => Err(unexpected(other, "a term, '(', '-' or '@'")),
        }
    }

    fn parse_word(&mut self, what: &str) -> Result<String> {
        match self.advance() {
            Some(Token::Term(word)) => Ok(word),
            other => Err(unexpected(other, what)),
        }
    }

    // fieldexpr := range | tags | TERM | PARAM
    fn parse_field_expr(&mut self) -> Result<AstNode> {
        match self.peek() {
            Some(Token::LBracket) => self.parse_range(),
            Some(Token::LBrace) => self.parse_tags(),
            Some(Token::Term(_)) | Some(Token::Param(_)) => self.parse_atom(),
            other => Err(unexpected(other.cloned(), "a term, range or tag list")),
        }
    }

    // range := '[' '('? NUMBER '('? NUMBER ']'
    fn parse_range(&mut self) -> Result<AstNode> {
        self.expect(Token::LBracket)?;
        let (lo, lo_excl) = self.parse_bound()?;
        let (hi, hi_excl) = self.parse_bound()?;
        self.expect(Token::RBracket)?;
        Ok(AstNode::Range {
            lo,
            hi,
            lo_excl,
            hi_excl,
        })
    }

    fn parse_bound(&mut self) -> Result<(f64, bool)> {
        let excl = if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            true
        } else {
            false
        };
        Ok((self.parse_number()?, excl))
    }

    fn parse_number(&mut self) -> Result<f64> {
        let negative = if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            true
        } else {
            false
        };
        let word = self.parse_word("a number")?;
        // f64 parsing accepts "inf" and "+inf"; NaN is not a usable bound.
        let value = word
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| Error::new(ErrorKind::Parse, format!("invalid number: {}", word)))?;
        Ok(if negative { -value } else { value })
    }

    // tags := '{' TAG ('|' TAG)* '}'
    fn parse_tags(&mut self) -> Result<AstNode> {
        self.expect(Token::LBrace)?;
        let mut tags = Vec::new();
        loop {
            match self.advance() {
                Some(Token::Term(tag)) => tags.push(tag.trim().to_lowercase()),
                Some(Token::Param(name)) => {
                    let bytes = self.resolve_param(&name)?;
                    tags.push(String::from_utf8_lossy(bytes).trim().to_lowercase());
                }
                other => return Err(unexpected(other, "a tag")),
            }
            match self.advance() {
                Some(Token::Pipe) => {}
                Some(Token::RBrace) => break,
                other => return Err(unexpected(other, "'|' or '}'")),
            }
        }
        Ok(AstNode::Tags { tags })
    }

    // knn := '[' KNN NUMBER '@' IDENT '$' IDENT ']'
    fn parse_knn(&mut self, filter: AstNode) -> Result<AstNode> {
        self.expect(Token::LBracket)?;
        let keyword = self.parse_word("KNN")?;
        if !keyword.eq_ignore_ascii_case("knn") {
            return Err(Error::new(
                ErrorKind::Parse,
                format!("expected KNN, found {:?}", keyword),
            ));
        }
        let limit_word = self.parse_word("a limit")?;
        let limit = limit_word.parse::<usize>().map_err(|_| {
            Error::new(
                ErrorKind::Parse,
                format!("invalid KNN limit: {}", limit_word),
            )
        })?;
        self.expect(Token::At)?;
        let field = self.parse_word("a vector field")?;
        let vector = match self.advance() {
            Some(Token::Param(name)) => decode_vector(self.resolve_param(&name)?)?,
            other => return Err(unexpected(other, "a '$' parameter")),
        };
        self.expect(Token::RBracket)?;
        Ok(AstNode::Knn {
            limit,
            field,
            vector,
            filter: Box::new(filter),
        })
    }
}

fn unexpected(found: Option<Token>, wanted: &str) -> Error {
    let found = match found {
        Some(token) => format!("{:?}", token),
        None => "end of query".to_string(),
    };
    Error::new(
        ErrorKind::Parse,
        format!("expected {} but found {}", wanted, found),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(query: &str) -> AstNode {
        parse(query, &QueryParams::new()).unwrap()
    }

    #[test]
    fn star_and_empty() {
        assert_eq!(parse_ok("*"), AstNode::Star);
        assert_eq!(parse_ok(""), AstNode::Empty);
        assert_eq!(parse_ok("   \t "), AstNode::Empty);
    }

    #[test]
    fn field_scoped_tags() {
        assert_eq!(
            parse_ok("@name:{Red | Blue}"),
            AstNode::field(
                "name",
                AstNode::Tags {
                    tags: vec!["red".to_string(), "blue".to_string()]
                }
            )
        );
    }

    #[test]
    fn numeric_ranges() {
        assert_eq!(
            parse_ok("@price:[200 1000]"),
            AstNode::field(
                "price",
                AstNode::Range {
                    lo: 200.0,
                    hi: 1000.0,
                    lo_excl: false,
                    hi_excl: false
                }
            )
        );
        assert_eq!(
            parse_ok("@price:[(200 1000]"),
            AstNode::field(
                "price",
                AstNode::Range {
                    lo: 200.0,
                    hi: 1000.0,
                    lo_excl: true,
                    hi_excl: false
                }
            )
        );
        assert_eq!(
            parse_ok("@price:[-inf (1000]"),
            AstNode::field(
                "price",
                AstNode::Range {
                    lo: f64::NEG_INFINITY,
                    hi: 1000.0,
                    lo_excl: false,
                    hi_excl: true
                }
            )
        );
    }

    #[test]
    fn implicit_and_explicit_or_and_negation() {
        assert_eq!(
            parse_ok("@name:{red} @body:phone"),
            AstNode::logical(
                LogicOp::And,
                vec![
                    AstNode::field(
                        "name",
                        AstNode::Tags {
                            tags: vec!["red".to_string()]
                        }
                    ),
                    AstNode::field("body", AstNode::term("phone")),
                ]
            )
        );
        assert_eq!(
            parse_ok("red | blue"),
            AstNode::logical(
                LogicOp::Or,
                vec![AstNode::term("red"), AstNode::term("blue")]
            )
        );
        assert_eq!(
            parse_ok("-@name:{laptop}"),
            AstNode::negate(AstNode::field(
                "name",
                AstNode::Tags {
                    tags: vec!["laptop".to_string()]
                }
            ))
        );
    }

    #[test]
    fn ast_is_stable_under_whitespace() {
        let compact = parse_ok("(red|blue) -cheap @price:[10 20]");
        let spaced = parse_ok("  ( red  |  blue )   - cheap   @price:[ 10   20 ]  ");
        assert_eq!(compact, spaced);
    }

    #[test]
    fn knn_decodes_the_parameter_vector() {
        let mut params = QueryParams::new();
        let bytes: Vec<u8> = [0.1f32, 0.0f32]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        params.set("q", bytes);

        match parse("* => [KNN 2 @vec $q]", &params).unwrap() {
            AstNode::Knn {
                limit,
                field,
                vector,
                filter,
            } => {
                assert_eq!(limit, 2);
                assert_eq!(field, "vec");
                assert_eq!(vector, [0.1, 0.0]);
                assert_eq!(*filter, AstNode::Star);
            }
            other => panic!("expected KNN node, got {:?}", other),
        }
    }

    #[test]
    fn param_as_text_term() {
        let mut params = QueryParams::new();
        params.set("t", b"Phone".to_vec());
        assert_eq!(parse("$t", &params).unwrap(), AstNode::term("phone"));
    }

    #[test]
    fn malformed_queries_are_rejected() {
        let params = QueryParams::new();
        for query in [
            "@price:[10",
            "@name:{",
            "(red",
            "red)",
            "@name red",
            "@price:[a b]",
            "* => [KNN two @vec $q]",
            "* => [KNN 2 @vec $missing]",
            "* red",
            "|",
        ] {
            assert!(parse(query, &params).is_err(), "expected error for {:?}", query);
        }
    }

    #[test]
    fn knn_with_wrong_payload_length_fails() {
        let mut params = QueryParams::new();
        params.set("q", vec![1, 2, 3]);
        assert!(parse("* => [KNN 2 @vec $q]", &params).is_err());
    }

    #[test]
    fn nan_range_bound_fails() {
        assert!(parse("@price:[nan 10]", &QueryParams::new()).is_err());
    }
}
