use logos::{Logos, Skip};

use crate::token::{Token, TokenKind};

/// Raw lexeme shapes. Keywords are listed as exact tokens so they win over
/// the identifier regex on exact matches while `lettuce` still lexes as one
/// identifier. Newlines are consumed as trivia, bumping the line counter
/// kept in `extras`; newlines inside string literals are untouched by the
/// counter, matching the original scanner.
#[derive(Debug, Logos)]
#[logos(skip r"[ \t\r]+")]
#[logos(extras = usize)]
enum RawToken<'a> {
    #[token("\n", |lex| { lex.extras += 1; Skip })]
    Newline,

    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("fn")]
    Function,
    #[token("let")]
    Let,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
    #[token("word")]
    Word,
    #[token("ref")]
    Ref,
    #[token("cpt")]
    Cpt,
    #[token("tr")]
    Tr,
    #[token("me")]
    Me,
    #[token("quote")]
    Quote,

    #[regex(r"[A-Za-z_]+")]
    Ident,

    #[regex(r"[0-9]+")]
    Int,

    // Contents are taken verbatim (no escape processing); an unterminated
    // string runs to the end of input.
    #[regex(r#""[^"]*"?"#, |lex| trim_quotes(lex.slice()))]
    Str(&'a str),
}

fn trim_quotes(slice: &str) -> &str {
    let inner = &slice[1..];
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Forward-only cursor over source text. `next_token` produces the token
/// stream terminated by `Eof`, and keeps returning `Eof` once exhausted.
pub struct Lexer<'a> {
    raw: logos::Lexer<'a, RawToken<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            raw: RawToken::lexer_with_extras(source, 1),
        }
    }

    /// Line the cursor currently sits on, 1-based.
    pub fn line(&self) -> usize {
        self.raw.extras
    }

    pub fn next_token(&mut self) -> Token {
        let Some(result) = self.raw.next() else {
            return Token::eof(self.raw.extras);
        };
        let line = self.raw.extras;

        let raw = match result {
            Ok(raw) => raw,
            Err(()) => return Token::new(TokenKind::Illegal, self.raw.slice(), line),
        };

        let kind = match raw {
            RawToken::Newline => unreachable!("newlines are skipped"),
            RawToken::Eq => TokenKind::Eq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Assign => TokenKind::Assign,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Asterisk => TokenKind::Asterisk,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Colon => TokenKind::Colon,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Function => TokenKind::Function,
            RawToken::Let => TokenKind::Let,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::Return => TokenKind::Return,
            RawToken::Word => TokenKind::Word,
            RawToken::Ref => TokenKind::Ref,
            RawToken::Cpt => TokenKind::Cpt,
            RawToken::Tr => TokenKind::Tr,
            RawToken::Me => TokenKind::Me,
            RawToken::Quote => TokenKind::Quote,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Int => TokenKind::Int,
            RawToken::Str(contents) => return Token::new(TokenKind::String, contents, line),
        };

        Token::new(kind, self.raw.slice(), line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn assert_tokens(input: &str, expected: &[(TokenKind, &str)]) {
        let mut lexer = Lexer::new(input);
        for (i, (kind, literal)) in expected.iter().enumerate() {
            let token = lexer.next_token();
            assert_eq!(token.kind, *kind, "token[{}] kind, got {:?}", i, token);
            assert_eq!(&token.literal, literal, "token[{}] literal", i);
        }
    }

    #[test]
    fn next_token() {
        let input = r#"let five = 5;
let add = fn(x, y) {
  x + y;
};
!-/*5;
5 < 10 > 5;
10 == 10;
10 != 9;
"foobar"
"foo bar"
[1, 2];
{"foo": "bar"}
me;
tr;
word;
cpt;
ref;
quote;
"#;

        assert_tokens(
            input,
            &[
                (Let, "let"),
                (Ident, "five"),
                (Assign, "="),
                (Int, "5"),
                (Semicolon, ";"),
                (Let, "let"),
                (Ident, "add"),
                (Assign, "="),
                (Function, "fn"),
                (LParen, "("),
                (Ident, "x"),
                (Comma, ","),
                (Ident, "y"),
                (RParen, ")"),
                (LBrace, "{"),
                (Ident, "x"),
                (Plus, "+"),
                (Ident, "y"),
                (Semicolon, ";"),
                (RBrace, "}"),
                (Semicolon, ";"),
                (Bang, "!"),
                (Minus, "-"),
                (Slash, "/"),
                (Asterisk, "*"),
                (Int, "5"),
                (Semicolon, ";"),
                (Int, "5"),
                (Lt, "<"),
                (Int, "10"),
                (Gt, ">"),
                (Int, "5"),
                (Semicolon, ";"),
                (Int, "10"),
                (Eq, "=="),
                (Int, "10"),
                (Semicolon, ";"),
                (Int, "10"),
                (NotEq, "!="),
                (Int, "9"),
                (Semicolon, ";"),
                (String, "foobar"),
                (String, "foo bar"),
                (LBracket, "["),
                (Int, "1"),
                (Comma, ","),
                (Int, "2"),
                (RBracket, "]"),
                (Semicolon, ";"),
                (LBrace, "{"),
                (String, "foo"),
                (Colon, ":"),
                (String, "bar"),
                (RBrace, "}"),
                (Me, "me"),
                (Semicolon, ";"),
                (Tr, "tr"),
                (Semicolon, ";"),
                (Word, "word"),
                (Semicolon, ";"),
                (Cpt, "cpt"),
                (Semicolon, ";"),
                (Ref, "ref"),
                (Semicolon, ";"),
                (Quote, "quote"),
                (Semicolon, ";"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn keywords_do_not_swallow_longer_identifiers() {
        assert_tokens(
            "lettuce iffy worded",
            &[
                (Ident, "lettuce"),
                (Ident, "iffy"),
                (Ident, "worded"),
                (Eof, ""),
            ],
        );
    }

    #[test]
    fn identifiers_exclude_digits() {
        // `x1` is not one identifier in this grammar: letters then an int.
        assert_tokens("x1", &[(Ident, "x"), (Int, "1"), (Eof, "")]);
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() {
        assert_tokens("\"abc", &[(String, "abc"), (Eof, "")]);
    }

    #[test]
    fn illegal_byte() {
        let mut lexer = Lexer::new("@");
        let token = lexer.next_token();
        assert_eq!(token.kind, Illegal);
        assert_eq!(token.literal, "@");
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("5");
        assert_eq!(lexer.next_token().kind, Int);
        assert_eq!(lexer.next_token().kind, Eof);
        assert_eq!(lexer.next_token().kind, Eof);
    }

    #[test]
    fn line_numbers() {
        let input = "\nlet five = 5;\n\n\nlet ten = 10;\n\n\n";

        let mut lexer = Lexer::new(input);
        let first = lexer.next_token();
        assert_eq!((first.kind, first.line), (Let, 2));

        // Drain the first statement, then the second starts on line 5.
        for _ in 0..4 {
            lexer.next_token();
        }
        let second = lexer.next_token();
        assert_eq!((second.kind, second.line), (Let, 5));

        while lexer.next_token().kind != Eof {}
        assert_eq!(lexer.line(), input.matches('\n').count() + 1);
    }
}
