use lingo::error::Span;
use lingo::lexer::Lexer;
use lingo::token::TokenKind;
use pretty_assertions::assert_eq;

fn kinds_and_literals(input: &str) -> Vec<(TokenKind, String)> {
    Lexer::new(input)
        .map(|token| (token.kind, token.literal))
        .collect()
}

fn expect_tokens(input: &str, expected: &[(TokenKind, &str)]) {
    let expected: Vec<(TokenKind, String)> = expected
        .iter()
        .map(|(kind, literal)| (*kind, literal.to_string()))
        .collect();
    assert_eq!(kinds_and_literals(input), expected);
}

#[test]
fn single_character_tokens() {
    use TokenKind::*;

    expect_tokens(
        "=+(){},;:[]",
        &[
            (Assign, "="),
            (Plus, "+"),
            (LParen, "("),
            (RParen, ")"),
            (LBrace, "{"),
            (RBrace, "}"),
            (Comma, ","),
            (Semicolon, ";"),
            (Colon, ":"),
            (LBracket, "["),
            (RBracket, "]"),
            (Eof, ""),
        ],
    );
}

#[test]
fn full_program() {
    use TokenKind::*;

    let input = r#"
        let five = 5;
        let ten = 10;

        let add = fn(x, y) {
            x + y;
        };

        let result = add(five, ten);
        !-/*5;
        5 < 10 > 5;

        if (5 < 10) {
            return true;
        } else {
            return false;
        }

        10 == 10;
        10 != 9;
        "foobar"
        "foo bar"
        [1, 2];
        {"foo": "bar"}
        a <= b >= c && d || e
    "#;

    expect_tokens(
        input,
        &[
            (Let, "let"),
            (Ident, "five"),
            (Assign, "="),
            (Int, "5"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "ten"),
            (Assign, "="),
            (Int, "10"),
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
            (Let, "let"),
            (Ident, "result"),
            (Assign, "="),
            (Ident, "add"),
            (LParen, "("),
            (Ident, "five"),
            (Comma, ","),
            (Ident, "ten"),
            (RParen, ")"),
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
            (If, "if"),
            (LParen, "("),
            (Int, "5"),
            (Lt, "<"),
            (Int, "10"),
            (RParen, ")"),
            (LBrace, "{"),
            (Return, "return"),
            (True, "true"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Else, "else"),
            (LBrace, "{"),
            (Return, "return"),
            (False, "false"),
            (Semicolon, ";"),
            (RBrace, "}"),
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
            (Ident, "a"),
            (LtEq, "<="),
            (Ident, "b"),
            (GtEq, ">="),
            (Ident, "c"),
            (And, "&&"),
            (Ident, "d"),
            (Or, "||"),
            (Ident, "e"),
            (Eof, ""),
        ],
    );
}

#[test]
fn keywords_need_an_exact_match() {
    use TokenKind::*;

    expect_tokens(
        "letter fnord if_ _else returned true_ falsey",
        &[
            (Ident, "letter"),
            (Ident, "fnord"),
            (Ident, "if_"),
            (Ident, "_else"),
            (Ident, "returned"),
            (Ident, "true_"),
            (Ident, "falsey"),
            (Eof, ""),
        ],
    );
}

#[test]
fn integers_are_maximal_digit_runs() {
    use TokenKind::*;

    expect_tokens(
        "123abc 0 42",
        &[
            (Int, "123"),
            (Ident, "abc"),
            (Int, "0"),
            (Int, "42"),
            (Eof, ""),
        ],
    );
}

#[test]
fn comments_are_skipped() {
    use TokenKind::*;

    expect_tokens(
        "1 // one\n// whole line\n2 / 3 // trailing",
        &[
            (Int, "1"),
            (Int, "2"),
            (Slash, "/"),
            (Int, "3"),
            (Eof, ""),
        ],
    );
}

#[test]
fn string_escapes_are_decoded() {
    use TokenKind::*;

    expect_tokens(
        r#""a\"b" "tab\there" "line\n" "back\\slash" "odd\q""#,
        &[
            (String, "a\"b"),
            (String, "tab\there"),
            (String, "line\n"),
            (String, "back\\slash"),
            (String, "odd\\q"),
            (Eof, ""),
        ],
    );
}

#[test]
fn unterminated_string_is_illegal() {
    use TokenKind::*;

    expect_tokens("\"abc", &[(Illegal, "\"abc"), (Eof, "")]);
}

#[test]
fn unknown_characters_are_illegal() {
    use TokenKind::*;

    expect_tokens(
        "a && b & c | d @ é",
        &[
            (Ident, "a"),
            (And, "&&"),
            (Ident, "b"),
            (Illegal, "&"),
            (Ident, "c"),
            (Illegal, "|"),
            (Ident, "d"),
            (Illegal, "@"),
            (Illegal, "é"),
            (Eof, ""),
        ],
    );
}

#[test]
fn spans_cover_the_source_text() {
    let spans: Vec<Span> = Lexer::new("let x = \"hi\";").map(|t| t.span).collect();

    assert_eq!(
        spans,
        vec![
            Span::new(0, 3),
            Span::new(4, 5),
            Span::new(6, 7),
            Span::new(8, 12),
            Span::new(12, 13),
            Span::new(13, 14),
        ]
    );
}

#[test]
fn iterator_stops_after_eof() {
    let mut lexer = Lexer::new("a");

    assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Ident));
    assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.next(), None);
}

#[test]
fn next_token_keeps_returning_eof() {
    let mut lexer = Lexer::new("");

    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
